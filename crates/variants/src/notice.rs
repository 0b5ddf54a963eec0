use serde::{Deserialize, Serialize};

use skuforge_core::AttributeId;

/// Recoverable, user-facing notices. None of these change the combination set
/// on their own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "notice", rename_all = "snake_case")]
pub enum Notice {
    /// The attribute is already registered; re-adding it did nothing.
    DuplicateDimension { dimension_id: AttributeId, name: String },
    /// The attribute has no option values; adding it did nothing.
    EmptyDimension { dimension_id: AttributeId, name: String },
    /// Removing a dimension collapsed variants whose edited fields were dropped
    /// in favour of the first variant for each reduced key.
    EditsDiscarded { dimension_id: AttributeId, discarded: usize },
}

impl core::fmt::Display for Notice {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Notice::DuplicateDimension { name, .. } => {
                write!(f, "\"{name}\" is already used to vary this product")
            }
            Notice::EmptyDimension { name, .. } => {
                write!(f, "\"{name}\" has no option values and was not added")
            }
            Notice::EditsDiscarded { discarded, .. } => {
                write!(f, "{discarded} edited variant(s) were merged away")
            }
        }
    }
}
