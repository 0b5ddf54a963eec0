use serde::{Deserialize, Serialize};

use skuforge_core::AggregateId;

use crate::identifier::BaseIdentity;
use crate::variant::VariantFields;

/// Product identifier. The product is the aggregate an editing session works on.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub AggregateId);

impl ProductId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for ProductId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// What the product collaborator hands to an editing session: identity plus the
/// base field values every freshly seeded variant starts from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductBase {
    pub id: ProductId,
    pub name: String,
    pub sku: String,
    /// Falls back to the kebab-cased product name when empty.
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub defaults: VariantFields,
}

impl ProductBase {
    pub fn identity(&self) -> BaseIdentity {
        BaseIdentity::new(&self.sku, &self.slug, &self.name)
    }
}
