//! Engine error model.

use thiserror::Error;

use skuforge_core::{AttributeId, DomainError, OptionValueId};

use crate::fields::ValidationError;
use crate::key::VariantKey;
use crate::product::ProductId;

/// Result type used by the variant engine.
pub type VariantResult<T> = Result<T, VariantError>;

/// Failures reported by external collaborators (catalog, persistence).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CollaboratorError {
    #[error("product {0} not found")]
    ProductNotFound(ProductId),

    #[error("submission rejected: {0}")]
    Rejected(String),

    #[error("collaborator unavailable: {0}")]
    Unavailable(String),
}

/// Structural errors stop the requested operation. Field validation problems are
/// not errors here; they live in the field store's validation map.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VariantError {
    /// The attribute has no enumerable options.
    #[error("attribute {attribute_id} is of type `{kind}` and cannot vary the product")]
    NotSelectable {
        attribute_id: AttributeId,
        kind: &'static str,
    },

    #[error("dimension {0} is not registered")]
    UnknownDimension(AttributeId),

    #[error("no variant for combination `{0}`")]
    UnknownVariant(VariantKey),

    #[error("attribute {attribute_id} lists option {option_id} more than once")]
    DuplicateOption {
        attribute_id: AttributeId,
        option_id: OptionValueId,
    },

    #[error("submission blocked by {} invalid field(s)", errors.len())]
    SubmissionBlocked { errors: Vec<ValidationError> },

    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),

    #[error(transparent)]
    Domain(#[from] DomainError),
}
