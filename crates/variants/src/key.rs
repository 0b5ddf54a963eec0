//! Combination keys.

use serde::{Deserialize, Serialize};

use skuforge_core::{AttributeId, DomainError, DomainResult, OptionValueId, ValueObject};

use crate::attribute::OptionValue;
use crate::dimension::Dimension;

/// One `(dimension, option value)` pair of a key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct KeyPart {
    pub dimension_id: AttributeId,
    pub option_id: OptionValueId,
    pub value: String,
}

impl KeyPart {
    pub fn new(dimension: &Dimension, option: &OptionValue) -> Self {
        Self {
            dimension_id: dimension.id(),
            option_id: option.id,
            value: option.value.clone(),
        }
    }
}

/// Combinatorial identity of a variant.
///
/// Parts are ordered by the addition order of their dimensions, which is the
/// canonical form: two keys naming the same options are equal only in that
/// order. Each dimension appears at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariantKey(Vec<KeyPart>);

impl VariantKey {
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Build a key from parts already in canonical order.
    pub fn new(parts: Vec<KeyPart>) -> DomainResult<Self> {
        for (i, part) in parts.iter().enumerate() {
            if parts[..i].iter().any(|p| p.dimension_id == part.dimension_id) {
                return Err(DomainError::validation(format!(
                    "dimension {} appears twice in a combination key",
                    part.dimension_id
                )));
            }
        }
        Ok(Self(parts))
    }

    pub fn parts(&self) -> &[KeyPart] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// This key followed by `part`.
    pub fn extended(&self, part: KeyPart) -> Self {
        debug_assert!(!self.contains_dimension(part.dimension_id));
        let mut parts = Vec::with_capacity(self.0.len() + 1);
        parts.extend(self.0.iter().cloned());
        parts.push(part);
        Self(parts)
    }

    /// This key with the part for `dimension_id` dropped.
    pub fn without(&self, dimension_id: AttributeId) -> Self {
        Self(
            self.0
                .iter()
                .filter(|p| p.dimension_id != dimension_id)
                .cloned()
                .collect(),
        )
    }

    pub fn contains_dimension(&self, dimension_id: AttributeId) -> bool {
        self.0.iter().any(|p| p.dimension_id == dimension_id)
    }

    pub fn part_for(&self, dimension_id: AttributeId) -> Option<&KeyPart> {
        self.0.iter().find(|p| p.dimension_id == dimension_id)
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|p| p.value.as_str())
    }

    /// True when the option values match `values` in key order.
    pub fn matches_values<S: AsRef<str>>(&self, values: &[S]) -> bool {
        self.0.len() == values.len()
            && self
                .values()
                .zip(values)
                .all(|(have, want)| have == want.as_ref())
    }
}

impl ValueObject for VariantKey {}

/// Displays as a variant title, e.g. `Red / M`.
impl core::fmt::Display for VariantKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        for (i, value) in self.values().enumerate() {
            if i > 0 {
                f.write_str(" / ")?;
            }
            f.write_str(value)?;
        }
        Ok(())
    }
}
