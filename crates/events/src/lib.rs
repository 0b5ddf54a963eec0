//! Commands, events and the deterministic execution helper shared by aggregates.

pub mod command;
pub mod event;
pub mod handler;

pub use command::Command;
pub use event::Event;
pub use handler::execute;
