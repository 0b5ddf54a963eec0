//! Errors shared by every domain crate.

use thiserror::Error;

pub type DomainResult<T> = Result<T, DomainError>;

/// Deterministic rule violations. Anything caused by a collaborator (catalog,
/// storage) is reported by the calling crate instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Input that can never be accepted as given.
    #[error("invalid value: {0}")]
    Validation(String),

    /// State that should be unreachable; indicates a bug, not bad input.
    #[error("broken invariant: {0}")]
    InvariantViolation(String),

    #[error("malformed identifier: {0}")]
    InvalidId(String),

    /// The command was addressed to a different aggregate.
    #[error("conflict: {0}")]
    Conflict(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }
}
