//! Payload handed to the persistence collaborator.

use serde::{Deserialize, Serialize};

use skuforge_core::{AttributeId, OptionValueId};

use crate::combination::CombinationSet;
use crate::error::{VariantError, VariantResult};
use crate::fields::FieldStore;
use crate::variant::Variant;

/// Reference back to the catalog attribute and option a variant was built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeRef {
    pub attribute_id: AttributeId,
    pub option_id: OptionValueId,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantSubmission {
    pub sku: String,
    pub price: i64,
    pub offer_price: Option<i64>,
    pub quantity: i64,
    pub weight: Option<i64>,
    pub attributes: Vec<AttributeRef>,
}

impl From<&Variant> for VariantSubmission {
    fn from(variant: &Variant) -> Self {
        Self {
            sku: variant.sku().to_string(),
            price: variant.price(),
            offer_price: variant.offer_price(),
            quantity: variant.quantity(),
            weight: variant.weight(),
            attributes: variant
                .key()
                .parts()
                .iter()
                .map(|p| AttributeRef {
                    attribute_id: p.dimension_id,
                    option_id: p.option_id,
                    value: p.value.clone(),
                })
                .collect(),
        }
    }
}

/// Ordered payload for every variant, or `SubmissionBlocked` listing the
/// offending fields.
pub fn build_submission(set: &CombinationSet, fields: &FieldStore) -> VariantResult<Vec<VariantSubmission>> {
    if !fields.is_valid() {
        return Err(VariantError::SubmissionBlocked {
            errors: fields.errors(set),
        });
    }
    Ok(set.iter().map(VariantSubmission::from).collect())
}
