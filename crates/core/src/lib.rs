//! `skuforge-core` — shared domain vocabulary.
//!
//! Aggregate and entity traits, the common error type and UUID-backed
//! identifiers. No IO, no engine logic.

pub mod aggregate;
pub mod error;
pub mod id;
pub mod model;

pub use aggregate::{Aggregate, AggregateRoot};
pub use error::{DomainError, DomainResult};
pub use id::{AggregateId, AttributeId, OptionValueId};
pub use model::{Entity, ValueObject};
