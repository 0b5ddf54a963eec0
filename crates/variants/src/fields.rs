//! Per-variant editable fields and their validation.
//!
//! Edits are stored as entered. Each `(variant, field)` pair carries at most one
//! validation error and errors never block edits to other fields or variants.
//! Submission is refused while any error is outstanding.

use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use skuforge_core::DomainError;

use crate::combination::CombinationSet;
use crate::error::{VariantError, VariantResult};
use crate::key::VariantKey;
use crate::variant::{Variant, VariantFields};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantField {
    Sku,
    Price,
    OfferPrice,
    Quantity,
    Weight,
}

impl VariantField {
    pub const ALL: [VariantField; 5] = [
        VariantField::Sku,
        VariantField::Price,
        VariantField::OfferPrice,
        VariantField::Quantity,
        VariantField::Weight,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VariantField::Sku => "sku",
            VariantField::Price => "price",
            VariantField::OfferPrice => "offer_price",
            VariantField::Quantity => "quantity",
            VariantField::Weight => "weight",
        }
    }
}

impl core::fmt::Display for VariantField {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VariantField {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VariantField::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| DomainError::validation(format!("unknown variant field `{s}`")))
    }
}

/// A typed value for one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    /// Manual SKU override; blank clears it.
    Sku(String),
    Price(i64),
    OfferPrice(Option<i64>),
    Quantity(i64),
    Weight(Option<i64>),
}

impl FieldValue {
    pub fn field(&self) -> VariantField {
        match self {
            FieldValue::Sku(_) => VariantField::Sku,
            FieldValue::Price(_) => VariantField::Price,
            FieldValue::OfferPrice(_) => VariantField::OfferPrice,
            FieldValue::Quantity(_) => VariantField::Quantity,
            FieldValue::Weight(_) => VariantField::Weight,
        }
    }

    /// Parse form input. Amounts are decimals with at most two fractional
    /// digits; quantity and weight (grams) are whole numbers. Blank input clears
    /// optional fields.
    pub fn parse(field: VariantField, raw: &str) -> Result<FieldValue, FieldErrorKind> {
        let input = raw.trim();
        let invalid_amount = || FieldErrorKind::InvalidAmount {
            input: input.to_string(),
        };
        let not_integer = || FieldErrorKind::NotAnInteger {
            input: input.to_string(),
        };

        match field {
            VariantField::Sku => Ok(FieldValue::Sku(input.to_string())),
            VariantField::Price => parse_amount(input).map(FieldValue::Price).ok_or_else(invalid_amount),
            VariantField::OfferPrice if input.is_empty() => Ok(FieldValue::OfferPrice(None)),
            VariantField::OfferPrice => parse_amount(input)
                .map(|v| FieldValue::OfferPrice(Some(v)))
                .ok_or_else(invalid_amount),
            VariantField::Quantity => input
                .parse::<i64>()
                .map(FieldValue::Quantity)
                .map_err(|_| not_integer()),
            VariantField::Weight if input.is_empty() => Ok(FieldValue::Weight(None)),
            VariantField::Weight => input
                .parse::<i64>()
                .map(|v| FieldValue::Weight(Some(v)))
                .map_err(|_| not_integer()),
        }
    }
}

/// Minor units from `"12"`, `"12.5"`, `"-0.99"`.
fn parse_amount(input: &str) -> Option<i64> {
    let (negative, digits) = match input.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, input),
    };
    let (whole, frac) = digits.split_once('.').unwrap_or((digits, ""));

    if whole.is_empty() && frac.is_empty() {
        return None;
    }
    if frac.len() > 2
        || !whole.chars().all(|c| c.is_ascii_digit())
        || !frac.chars().all(|c| c.is_ascii_digit())
    {
        return None;
    }

    let whole: i64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
    let frac: i64 = match frac.len() {
        0 => 0,
        1 => frac.parse::<i64>().ok()? * 10,
        _ => frac.parse().ok()?,
    };
    let amount = whole.checked_mul(100)?.checked_add(frac)?;
    Some(if negative { -amount } else { amount })
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldErrorKind {
    #[error("must not be negative")]
    Negative,

    #[error("offer price {offer} must be lower than price {price}")]
    OfferNotBelowPrice { offer: i64, price: i64 },

    #[error("`{input}` is not a whole number")]
    NotAnInteger { input: String },

    #[error("`{input}` is not a valid amount")]
    InvalidAmount { input: String },

    #[error("SKU `{sku}` is already used by another variant")]
    DuplicateSku { sku: String },
}

impl FieldErrorKind {
    /// Raised by unparseable input rather than by a stored value.
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::NotAnInteger { .. } | Self::InvalidAmount { .. })
    }
}

/// A validation problem scoped to one field of one variant.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{field} of `{key}`: {kind}")]
pub struct ValidationError {
    pub key: VariantKey,
    pub field: VariantField,
    pub kind: FieldErrorKind,
}

/// Value rules: `price >= 0`, `0 <= offer_price < price`, `quantity >= 0`,
/// `weight >= 0`.
pub fn check_fields(fields: &VariantFields) -> Vec<(VariantField, FieldErrorKind)> {
    let mut problems = Vec::new();

    if fields.price < 0 {
        problems.push((VariantField::Price, FieldErrorKind::Negative));
    }
    if let Some(offer) = fields.offer_price {
        if offer < 0 {
            problems.push((VariantField::OfferPrice, FieldErrorKind::Negative));
        } else if offer >= fields.price {
            problems.push((
                VariantField::OfferPrice,
                FieldErrorKind::OfferNotBelowPrice {
                    offer,
                    price: fields.price,
                },
            ));
        }
    }
    if fields.quantity < 0 {
        problems.push((VariantField::Quantity, FieldErrorKind::Negative));
    }
    if fields.weight.is_some_and(|w| w < 0) {
        problems.push((VariantField::Weight, FieldErrorKind::Negative));
    }

    problems
}

/// Edits and the validation map for one combination set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldStore {
    errors: BTreeMap<(VariantKey, VariantField), FieldErrorKind>,
}

impl FieldStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` on the variant at `key` and revalidate that variant.
    ///
    /// Returns the error now attached to the edited field, if any. Only an
    /// unknown key fails the call. SKU edits are not resynthesized here; the
    /// editor does that after storing the value.
    pub(crate) fn set_field(
        &mut self,
        set: &mut CombinationSet,
        key: &VariantKey,
        value: FieldValue,
    ) -> VariantResult<Option<ValidationError>> {
        let field = value.field();
        let variant = set
            .get_mut(key)
            .ok_or_else(|| VariantError::UnknownVariant(key.clone()))?;
        variant.assign(value);

        self.errors.remove(&(key.clone(), field));
        if let Some(variant) = set.get(key) {
            self.revalidate_variant(variant);
        }
        if field == VariantField::Sku {
            self.revalidate_skus(set);
        }

        Ok(self.error(key, field))
    }

    /// Parse `input` and store it. Unparseable input leaves the stored value
    /// alone and records an error for the field.
    pub(crate) fn set_field_input(
        &mut self,
        set: &mut CombinationSet,
        key: &VariantKey,
        field: VariantField,
        input: &str,
    ) -> VariantResult<Option<ValidationError>> {
        match FieldValue::parse(field, input) {
            Ok(value) => self.set_field(set, key, value),
            Err(kind) => self.record_input_error(set, key, field, kind).map(Some),
        }
    }

    pub(crate) fn record_input_error(
        &mut self,
        set: &CombinationSet,
        key: &VariantKey,
        field: VariantField,
        kind: FieldErrorKind,
    ) -> VariantResult<ValidationError> {
        if !set.contains(key) {
            return Err(VariantError::UnknownVariant(key.clone()));
        }
        self.errors.insert((key.clone(), field), kind.clone());
        Ok(ValidationError {
            key: key.clone(),
            field,
            kind,
        })
    }

    /// Recompute value errors for one variant, keeping input errors on fields
    /// that have not been re-entered since.
    fn revalidate_variant(&mut self, variant: &Variant) {
        let key = variant.key();
        for field in [
            VariantField::Price,
            VariantField::OfferPrice,
            VariantField::Quantity,
            VariantField::Weight,
        ] {
            let slot = (key.clone(), field);
            if self.errors.get(&slot).is_some_and(|k| !k.is_input_error()) {
                self.errors.remove(&slot);
            }
        }

        for (field, kind) in check_fields(variant.fields()) {
            self.errors.entry((key.clone(), field)).or_insert(kind);
        }
    }

    /// Flag manual SKUs that equal any other variant's SKU.
    pub(crate) fn revalidate_skus(&mut self, set: &CombinationSet) {
        self.errors
            .retain(|_, kind| !matches!(kind, FieldErrorKind::DuplicateSku { .. }));

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for variant in set.iter().filter(|v| !v.sku().is_empty()) {
            *counts.entry(variant.sku()).or_default() += 1;
        }

        for variant in set.iter().filter(|v| v.sku_manually_edited()) {
            if counts.get(variant.sku()).copied().unwrap_or(0) > 1 {
                self.errors.insert(
                    (variant.key().clone(), VariantField::Sku),
                    FieldErrorKind::DuplicateSku {
                        sku: variant.sku().to_string(),
                    },
                );
            }
        }
    }

    /// Rebuild the whole map after a structural change. Input errors are
    /// dropped since the keys they were recorded against may be gone.
    pub fn revalidate(&mut self, set: &CombinationSet) {
        self.errors.clear();
        for variant in set.iter() {
            self.revalidate_variant(variant);
        }
        self.revalidate_skus(set);
    }

    pub fn error(&self, key: &VariantKey, field: VariantField) -> Option<ValidationError> {
        self.errors
            .get(&(key.clone(), field))
            .map(|kind| ValidationError {
                key: key.clone(),
                field,
                kind: kind.clone(),
            })
    }

    pub fn errors_for(&self, key: &VariantKey) -> Vec<ValidationError> {
        VariantField::ALL
            .into_iter()
            .filter_map(|field| self.error(key, field))
            .collect()
    }

    /// All outstanding errors, in combination order.
    pub fn errors(&self, set: &CombinationSet) -> Vec<ValidationError> {
        set.keys().flat_map(|key| self.errors_for(key)).collect()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dimension::{DimensionRegistry, Registration};
    use crate::testing::{color, size};

    fn fields() -> VariantFields {
        VariantFields {
            price: 2000,
            offer_price: Some(1500),
            quantity: 4,
            weight: Some(250),
        }
    }

    fn set() -> CombinationSet {
        let mut registry = DimensionRegistry::new();
        let mut set = CombinationSet::new();
        for attribute in [color(), size()] {
            let Registration::Registered(dim) = registry.add_dimension(attribute).unwrap() else {
                panic!("Expected registration");
            };
            set = set.expand(&dim, &fields());
        }
        set
    }

    fn key(set: &CombinationSet, values: &[&str]) -> VariantKey {
        set.find_by_values(values).unwrap().key().clone()
    }

    #[test]
    fn parses_amounts_into_minor_units() {
        assert_eq!(parse_amount("12"), Some(1200));
        assert_eq!(parse_amount("12.5"), Some(1250));
        assert_eq!(parse_amount("12.05"), Some(1205));
        assert_eq!(parse_amount(".99"), Some(99));
        assert_eq!(parse_amount("-3.10"), Some(-310));
        assert_eq!(parse_amount("1.234"), None);
        assert_eq!(parse_amount("abc"), None);
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("."), None);
    }

    #[test]
    fn parses_form_input_per_field() {
        assert_eq!(
            FieldValue::parse(VariantField::OfferPrice, "  "),
            Ok(FieldValue::OfferPrice(None))
        );
        assert_eq!(
            FieldValue::parse(VariantField::Quantity, "7"),
            Ok(FieldValue::Quantity(7))
        );
        assert_eq!(
            FieldValue::parse(VariantField::Quantity, "7.5"),
            Err(FieldErrorKind::NotAnInteger {
                input: "7.5".to_string()
            })
        );
        assert_eq!(
            FieldValue::parse(VariantField::Price, "ten"),
            Err(FieldErrorKind::InvalidAmount {
                input: "ten".to_string()
            })
        );
    }

    #[test]
    fn field_names_round_trip() {
        for field in VariantField::ALL {
            assert_eq!(field.as_str().parse::<VariantField>().unwrap(), field);
        }
        assert!("colour".parse::<VariantField>().is_err());
    }

    #[test]
    fn check_fields_applies_value_rules() {
        assert!(check_fields(&fields()).is_empty());

        let bad = VariantFields {
            price: 1000,
            offer_price: Some(1000),
            quantity: -1,
            weight: Some(-5),
        };
        let problems = check_fields(&bad);
        assert_eq!(
            problems,
            vec![
                (
                    VariantField::OfferPrice,
                    FieldErrorKind::OfferNotBelowPrice {
                        offer: 1000,
                        price: 1000
                    }
                ),
                (VariantField::Quantity, FieldErrorKind::Negative),
                (VariantField::Weight, FieldErrorKind::Negative),
            ]
        );
    }

    #[test]
    fn offer_at_or_above_price_is_scoped_to_one_variant() {
        let mut set = set();
        let mut store = FieldStore::new();
        let red_s = key(&set, &["Red", "S"]);

        let error = store
            .set_field(&mut set, &red_s, FieldValue::OfferPrice(Some(2500)))
            .unwrap()
            .unwrap();
        assert_eq!(error.field, VariantField::OfferPrice);
        assert_eq!(store.len(), 1);
        assert!(store.errors_for(&key(&set, &["Blue", "M"])).is_empty());

        // Sibling variants stay editable.
        let blue_m = key(&set, &["Blue", "M"]);
        assert!(store
            .set_field(&mut set, &blue_m, FieldValue::Quantity(12))
            .unwrap()
            .is_none());
        assert_eq!(set.get(&blue_m).unwrap().quantity(), 12);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn raising_price_clears_offer_error() {
        let mut set = set();
        let mut store = FieldStore::new();
        let red_s = key(&set, &["Red", "S"]);

        store
            .set_field(&mut set, &red_s, FieldValue::OfferPrice(Some(2500)))
            .unwrap();
        assert!(!store.is_valid());

        store.set_field(&mut set, &red_s, FieldValue::Price(3000)).unwrap();
        assert!(store.is_valid());
    }

    #[test]
    fn unparseable_input_keeps_value_and_records_error() {
        let mut set = set();
        let mut store = FieldStore::new();
        let red_m = key(&set, &["Red", "M"]);

        let error = store
            .set_field_input(&mut set, &red_m, VariantField::Quantity, "lots")
            .unwrap()
            .unwrap();
        assert!(error.kind.is_input_error());
        assert_eq!(set.get(&red_m).unwrap().quantity(), 4);

        // Editing another field keeps the input error around.
        store
            .set_field_input(&mut set, &red_m, VariantField::Price, "21.00")
            .unwrap();
        assert!(store.error(&red_m, VariantField::Quantity).is_some());

        // Re-entering the field clears it.
        assert!(store
            .set_field_input(&mut set, &red_m, VariantField::Quantity, "6")
            .unwrap()
            .is_none());
        assert!(store.is_valid());
    }

    #[test]
    fn unknown_variant_is_a_structural_error() {
        let mut set = set();
        let mut store = FieldStore::new();
        let err = store
            .set_field(&mut set, &VariantKey::empty(), FieldValue::Price(1))
            .unwrap_err();
        assert_eq!(err, VariantError::UnknownVariant(VariantKey::empty()));
    }

    #[test]
    fn duplicate_manual_sku_is_flagged_until_changed() {
        let mut set = set();
        let mut store = FieldStore::new();
        let red_s = key(&set, &["Red", "S"]);
        let red_m = key(&set, &["Red", "M"]);

        store.set_field(&mut set, &red_s, FieldValue::Sku("TAKEN".into())).unwrap();
        let error = store
            .set_field(&mut set, &red_m, FieldValue::Sku("TAKEN".into()))
            .unwrap();
        assert!(matches!(
            error.map(|e| e.kind),
            Some(FieldErrorKind::DuplicateSku { .. })
        ));
        assert_eq!(store.len(), 2);

        store.set_field(&mut set, &red_m, FieldValue::Sku("OTHER".into())).unwrap();
        assert!(store.is_valid());
    }

    #[test]
    fn errors_are_listed_in_combination_order() {
        let mut set = set();
        let mut store = FieldStore::new();
        let blue_m = key(&set, &["Blue", "M"]);
        let red_s = key(&set, &["Red", "S"]);

        store.set_field(&mut set, &blue_m, FieldValue::Price(-1)).unwrap();
        store.set_field(&mut set, &red_s, FieldValue::Weight(Some(-1))).unwrap();

        let errors = store.errors(&set);
        assert_eq!(errors[0].key, red_s);
        assert_eq!(errors[0].field, VariantField::Weight);
        assert_eq!(errors.last().unwrap().key, blue_m);
    }
}
