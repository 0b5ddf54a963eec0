//! Process-wide logging setup shared by skuforge binaries.

pub mod tracing;

pub use self::tracing::{LogFormat, ParseLogFormatError, init};
