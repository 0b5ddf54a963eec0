use serde::{Deserialize, Serialize};

use skuforge_core::Entity;

use crate::fields::FieldValue;
use crate::key::{KeyPart, VariantKey};

/// Editable per-variant values.
///
/// Amounts are in the smallest currency unit, weight in grams. Values are stored
/// as entered, so they may be invalid; the field store tracks which ones are.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantFields {
    pub price: i64,
    #[serde(default)]
    pub offer_price: Option<i64>,
    pub quantity: i64,
    #[serde(default)]
    pub weight: Option<i64>,
}

/// One purchasable combination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Variant {
    key: VariantKey,
    sku: String,
    slug: String,
    #[serde(flatten)]
    fields: VariantFields,
    sku_manually_edited: bool,
    /// Key the current SKU and slug were derived from.
    #[serde(skip)]
    synthesized_for: Option<VariantKey>,
}

impl Variant {
    pub(crate) fn seeded(key: VariantKey, fields: VariantFields) -> Self {
        Self {
            key,
            sku: String::new(),
            slug: String::new(),
            fields,
            sku_manually_edited: false,
            synthesized_for: None,
        }
    }

    /// Child variant for `part`. Field values are inherited; a manual SKU is only
    /// carried over when `keep_identity` is set.
    pub(crate) fn descendant(&self, part: KeyPart, keep_identity: bool) -> Self {
        let mut child = Self::seeded(self.key.extended(part), self.fields);
        if keep_identity && self.sku_manually_edited {
            child.sku = self.sku.clone();
            child.sku_manually_edited = true;
        }
        child
    }

    pub(crate) fn rekeyed(mut self, key: VariantKey) -> Self {
        self.key = key;
        self
    }

    pub fn key(&self) -> &VariantKey {
        &self.key
    }

    pub fn sku(&self) -> &str {
        &self.sku
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn fields(&self) -> &VariantFields {
        &self.fields
    }

    pub fn price(&self) -> i64 {
        self.fields.price
    }

    pub fn offer_price(&self) -> Option<i64> {
        self.fields.offer_price
    }

    pub fn quantity(&self) -> i64 {
        self.fields.quantity
    }

    pub fn weight(&self) -> Option<i64> {
        self.fields.weight
    }

    pub fn sku_manually_edited(&self) -> bool {
        self.sku_manually_edited
    }

    /// True when the key or SKU changed since identifiers were last synthesized,
    /// unless the SKU is a manual override.
    pub(crate) fn needs_sku(&self) -> bool {
        !self.sku_manually_edited && (self.sku.is_empty() || !self.is_current())
    }

    /// Slugs have no manual override and follow the key.
    pub(crate) fn needs_slug(&self) -> bool {
        self.slug.is_empty() || !self.is_current()
    }

    fn is_current(&self) -> bool {
        self.synthesized_for.as_ref() == Some(&self.key)
    }

    pub(crate) fn set_identifiers(&mut self, sku: Option<String>, slug: Option<String>) {
        if let Some(sku) = sku {
            self.sku = sku;
        }
        if let Some(slug) = slug {
            self.slug = slug;
        }
        self.synthesized_for = Some(self.key.clone());
    }

    pub(crate) fn invalidate_identifiers(&mut self) {
        self.synthesized_for = None;
    }

    /// Store `value`. An empty SKU drops the manual override.
    pub(crate) fn assign(&mut self, value: FieldValue) {
        match value {
            FieldValue::Sku(sku) => {
                let sku = sku.trim();
                if sku.is_empty() {
                    self.sku.clear();
                    self.sku_manually_edited = false;
                } else {
                    self.sku = sku.to_string();
                    self.sku_manually_edited = true;
                }
            }
            FieldValue::Price(v) => self.fields.price = v,
            FieldValue::OfferPrice(v) => self.fields.offer_price = v,
            FieldValue::Quantity(v) => self.fields.quantity = v,
            FieldValue::Weight(v) => self.fields.weight = v,
        }
    }
}

impl Entity for Variant {
    type Id = VariantKey;

    fn id(&self) -> &Self::Id {
        &self.key
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skuforge_core::{AttributeId, OptionValueId};

    fn part(dimension: u128, option: u128, value: &str) -> KeyPart {
        KeyPart {
            dimension_id: AttributeId::from_u128(dimension),
            option_id: OptionValueId::from_u128(option),
            value: value.to_string(),
        }
    }

    fn fields() -> VariantFields {
        VariantFields {
            price: 1000,
            offer_price: None,
            quantity: 3,
            weight: None,
        }
    }

    #[test]
    fn descendant_inherits_fields_but_not_synthesized_sku() {
        let mut parent = Variant::seeded(VariantKey::empty().extended(part(1, 10, "Red")), fields());
        parent.set_identifiers(Some("SHIRT-RED".into()), Some("shirt-red".into()));

        let child = parent.descendant(part(2, 20, "S"), true);
        assert!(!child.is_same_entity(&parent));
        assert_eq!(child.fields(), parent.fields());
        assert_eq!(child.sku(), "");
        assert!(child.needs_sku());
        assert!(child.needs_slug());
    }

    #[test]
    fn manual_sku_survives_on_identity_keeping_descendant_only() {
        let mut parent = Variant::seeded(VariantKey::empty().extended(part(1, 10, "Red")), fields());
        parent.assign(FieldValue::Sku("CUSTOM-RED".into()));

        let first = parent.descendant(part(2, 20, "S"), true);
        let second = parent.descendant(part(2, 21, "M"), false);
        assert_eq!(first.sku(), "CUSTOM-RED");
        assert!(first.sku_manually_edited());
        assert!(!first.needs_sku());
        assert!(first.needs_slug());
        assert_eq!(second.sku(), "");
        assert!(!second.sku_manually_edited());
    }

    #[test]
    fn blank_sku_clears_manual_override() {
        let mut variant = Variant::seeded(VariantKey::empty(), fields());
        variant.assign(FieldValue::Sku("  MINE ".into()));
        assert_eq!(variant.sku(), "MINE");
        assert!(variant.sku_manually_edited());

        variant.assign(FieldValue::Sku("   ".into()));
        assert_eq!(variant.sku(), "");
        assert!(!variant.sku_manually_edited());
        assert!(variant.needs_sku());
    }

    #[test]
    fn rekeying_makes_identifiers_stale() {
        let mut variant = Variant::seeded(VariantKey::empty().extended(part(1, 10, "Red")), fields());
        variant.set_identifiers(Some("SHIRT-RED".into()), Some("shirt-red".into()));
        assert!(!variant.needs_sku());

        let original = variant.clone();
        let variant = variant.rekeyed(VariantKey::empty());
        assert!(!variant.is_same_entity(&original));
        assert!(variant.needs_sku());
        assert!(variant.needs_slug());
    }
}
