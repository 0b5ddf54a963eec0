//! The materialized cartesian product of all active dimensions.
//!
//! A [`CombinationSet`] is an ordered arena of variants indexed by canonical key.
//! Structural changes consume the set and return the next one, so there is never
//! a second live copy to drift out of sync.

use indexmap::IndexMap;
use serde::Serialize;

use skuforge_core::AttributeId;

use crate::dimension::Dimension;
use crate::key::VariantKey;
use crate::variant::{Variant, VariantFields};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CombinationSet {
    variants: IndexMap<VariantKey, Variant>,
}

/// A variant dropped during contraction because an earlier variant already
/// claimed its reduced key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscardedVariant {
    /// Key before contraction.
    pub key: VariantKey,
    /// Reduced key, now owned by the surviving variant.
    pub survivor: VariantKey,
    /// The discarded variant held values the survivor does not.
    pub lost_edits: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contraction {
    pub set: CombinationSet,
    pub discarded: Vec<DiscardedVariant>,
}

impl Contraction {
    pub fn lost_edits(&self) -> usize {
        self.discarded.iter().filter(|d| d.lost_edits).count()
    }
}

impl CombinationSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    /// Whether the product currently has any variants at all.
    pub fn has_variants(&self) -> bool {
        !self.variants.is_empty()
    }

    /// Variants in combination order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &Variant> {
        self.variants.values()
    }

    pub fn keys(&self) -> impl ExactSizeIterator<Item = &VariantKey> {
        self.variants.keys()
    }

    pub fn get(&self, key: &VariantKey) -> Option<&Variant> {
        self.variants.get(key)
    }

    pub fn get_index(&self, index: usize) -> Option<&Variant> {
        self.variants.get_index(index).map(|(_, v)| v)
    }

    pub fn position(&self, key: &VariantKey) -> Option<usize> {
        self.variants.get_index_of(key)
    }

    pub fn contains(&self, key: &VariantKey) -> bool {
        self.variants.contains_key(key)
    }

    /// Look a variant up by its option values in key order, e.g. `["Red", "M"]`.
    pub fn find_by_values<S: AsRef<str>>(&self, values: &[S]) -> Option<&Variant> {
        self.variants.values().find(|v| v.key().matches_values(values))
    }

    pub(crate) fn get_mut(&mut self, key: &VariantKey) -> Option<&mut Variant> {
        self.variants.get_mut(key)
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Variant> {
        self.variants.values_mut()
    }

    /// Multiply every combination by the options of `dimension`.
    ///
    /// An empty set is seeded with one variant per option, using `defaults`.
    /// Otherwise each existing variant (outer loop, current order) yields one
    /// descendant per option (inner loop, option order) that starts from the
    /// parent's current field values. Only the first descendant keeps a manual
    /// SKU override, the rest get synthesized SKUs.
    pub fn expand(self, dimension: &Dimension, defaults: &VariantFields) -> Self {
        if dimension.options().is_empty() {
            tracing::warn!(dimension = %dimension.id(), "refusing to expand by a dimension without options");
            return self;
        }
        if self
            .variants
            .keys()
            .next()
            .is_some_and(|k| k.contains_dimension(dimension.id()))
        {
            tracing::warn!(dimension = %dimension.id(), "dimension already part of every key; expansion skipped");
            return self;
        }

        let options = dimension.options().len();
        let mut next = IndexMap::with_capacity(self.variants.len().max(1) * options);

        if self.variants.is_empty() {
            for part in dimension.key_parts() {
                let key = VariantKey::empty().extended(part);
                next.insert(key.clone(), Variant::seeded(key, *defaults));
            }
        } else {
            for parent in self.variants.values() {
                for (i, part) in dimension.key_parts().enumerate() {
                    let child = parent.descendant(part, i == 0);
                    next.insert(child.key().clone(), child);
                }
            }
        }

        tracing::debug!(
            dimension = %dimension.id(),
            before = self.variants.len(),
            after = next.len(),
            "expanded combination set"
        );

        Self { variants: next }
    }

    /// Drop `dimension_id` from every key, keeping the first variant that lands
    /// on each reduced key. Removing the last dimension empties the set.
    pub fn contract(self, dimension_id: AttributeId) -> Contraction {
        let before = self.variants.len();
        let mut next: IndexMap<VariantKey, Variant> = IndexMap::with_capacity(before);
        let mut discarded = Vec::new();

        for (key, variant) in self.variants {
            if !key.contains_dimension(dimension_id) {
                next.insert(key, variant);
                continue;
            }

            let reduced = key.without(dimension_id);
            if reduced.is_empty() {
                continue;
            }

            match next.get(&reduced) {
                Some(survivor) => {
                    let lost_edits = survivor.fields() != variant.fields()
                        || variant.sku_manually_edited();
                    discarded.push(DiscardedVariant {
                        key,
                        survivor: reduced,
                        lost_edits,
                    });
                }
                None => {
                    next.insert(reduced.clone(), variant.rekeyed(reduced));
                }
            }
        }

        tracing::debug!(
            dimension = %dimension_id,
            before,
            after = next.len(),
            discarded = discarded.len(),
            "contracted combination set"
        );

        Contraction {
            set: Self { variants: next },
            discarded,
        }
    }
}

/// Serializes as the ordered list of variants.
impl Serialize for CombinationSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.variants.values())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dimension::{DimensionRegistry, Registration};
    use crate::fields::FieldValue;
    use crate::testing::{color, material, size};

    fn defaults() -> VariantFields {
        VariantFields {
            price: 1000,
            offer_price: None,
            quantity: 5,
            weight: None,
        }
    }

    fn register(registry: &mut DimensionRegistry, attribute: crate::ProductAttribute) -> Dimension {
        match registry.add_dimension(attribute).unwrap() {
            Registration::Registered(d) => d,
            other => panic!("Expected registration, got {other:?}"),
        }
    }

    fn titles(set: &CombinationSet) -> Vec<String> {
        set.keys().map(|k| k.to_string()).collect()
    }

    #[test]
    fn seeds_empty_set_in_option_order() {
        let mut registry = DimensionRegistry::new();
        let color = register(&mut registry, color());

        let set = CombinationSet::new().expand(&color, &defaults());
        assert_eq!(titles(&set), vec!["Red", "Blue"]);
        assert!(set.iter().all(|v| *v.fields() == defaults()));
    }

    #[test]
    fn expansion_is_outer_existing_inner_new() {
        let mut registry = DimensionRegistry::new();
        let color = register(&mut registry, color());
        let size = register(&mut registry, size());

        let set = CombinationSet::new()
            .expand(&color, &defaults())
            .expand(&size, &defaults());
        assert_eq!(titles(&set), vec!["Red / S", "Red / M", "Blue / S", "Blue / M"]);
    }

    #[test]
    fn expansion_propagates_parent_edits() {
        let mut registry = DimensionRegistry::new();
        let color = register(&mut registry, color());
        let size = register(&mut registry, size());

        let mut set = CombinationSet::new().expand(&color, &defaults());
        let blue = set.keys().nth(1).unwrap().clone();
        set.get_mut(&blue).unwrap().assign(FieldValue::Price(4200));

        let set = set.expand(&size, &defaults());
        assert_eq!(set.find_by_values(&["Blue", "S"]).unwrap().price(), 4200);
        assert_eq!(set.find_by_values(&["Blue", "M"]).unwrap().price(), 4200);
        assert_eq!(set.find_by_values(&["Red", "M"]).unwrap().price(), 1000);
    }

    #[test]
    fn contraction_keeps_first_encountered() {
        let mut registry = DimensionRegistry::new();
        let color = register(&mut registry, color());
        let size = register(&mut registry, size());

        let mut set = CombinationSet::new()
            .expand(&color, &defaults())
            .expand(&size, &defaults());
        let red_s = set.find_by_values(&["Red", "S"]).unwrap().key().clone();
        let red_m = set.find_by_values(&["Red", "M"]).unwrap().key().clone();
        set.get_mut(&red_s).unwrap().assign(FieldValue::Quantity(1));
        set.get_mut(&red_m).unwrap().assign(FieldValue::Quantity(99));

        let contraction = set.contract(size.id());
        assert_eq!(titles(&contraction.set), vec!["Red", "Blue"]);
        assert_eq!(contraction.set.find_by_values(&["Red"]).unwrap().quantity(), 1);
        assert_eq!(contraction.discarded.len(), 2);
        assert_eq!(contraction.lost_edits(), 1);
    }

    #[test]
    fn contracting_the_first_dimension_keeps_later_order() {
        let mut registry = DimensionRegistry::new();
        let color = register(&mut registry, color());
        let size = register(&mut registry, size());

        let set = CombinationSet::new()
            .expand(&color, &defaults())
            .expand(&size, &defaults());
        let contraction = set.contract(color.id());
        assert_eq!(titles(&contraction.set), vec!["S", "M"]);
        assert_eq!(contraction.lost_edits(), 0);
    }

    #[test]
    fn removing_last_dimension_empties_set() {
        let mut registry = DimensionRegistry::new();
        let color = register(&mut registry, color());

        let set = CombinationSet::new().expand(&color, &defaults());
        assert!(set.has_variants());

        let contraction = set.contract(color.id());
        assert!(contraction.set.is_empty());
        assert!(!contraction.set.has_variants());
    }

    #[test]
    fn contracting_unknown_dimension_changes_nothing() {
        let mut registry = DimensionRegistry::new();
        let color = register(&mut registry, color());
        let material = register(&mut registry, material());

        let set = CombinationSet::new().expand(&color, &defaults());
        let contraction = set.clone().contract(material.id());
        assert_eq!(contraction.set, set);
        assert!(contraction.discarded.is_empty());
    }

    #[test]
    fn expanding_twice_by_same_dimension_is_skipped() {
        let mut registry = DimensionRegistry::new();
        let color = register(&mut registry, color());

        let set = CombinationSet::new().expand(&color, &defaults());
        let again = set.clone().expand(&color, &defaults());
        assert_eq!(again, set);
    }

    #[test]
    fn serializes_as_ordered_list() {
        let mut registry = DimensionRegistry::new();
        let color = register(&mut registry, color());

        let set = CombinationSet::new().expand(&color, &defaults());
        let json = serde_json::to_value(&set).unwrap();
        let list = json.as_array().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0]["price"], 1000);
        assert_eq!(list[1]["key"][0]["value"], "Blue");
    }

    mod proptest_tests {
        use super::*;
        use crate::testing::attribute;
        use proptest::prelude::*;

        fn build(counts: &[usize]) -> (DimensionRegistry, Vec<Dimension>, CombinationSet) {
            let mut registry = DimensionRegistry::new();
            let mut dims = Vec::new();
            let mut set = CombinationSet::new();
            for (i, count) in counts.iter().enumerate() {
                let names: Vec<String> = (0..*count).map(|o| format!("V{i}-{o}")).collect();
                let refs: Vec<&str> = names.iter().map(String::as_str).collect();
                let dim = register(&mut registry, attribute(10 + i as u128, &format!("D{i}"), &refs));
                set = set.expand(&dim, &defaults());
                dims.push(dim);
            }
            (registry, dims, set)
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 256,
                ..ProptestConfig::default()
            })]

            /// Property: cardinality is the product of option counts and keys are distinct.
            #[test]
            fn cardinality_matches_product(counts in prop::collection::vec(1usize..5, 1..5)) {
                let (registry, _, set) = build(&counts);
                let expected: usize = counts.iter().product();
                prop_assert_eq!(set.len(), expected);
                prop_assert_eq!(registry.expected_cardinality(), expected);

                let mut keys: Vec<&VariantKey> = set.keys().collect();
                keys.sort();
                keys.dedup();
                prop_assert_eq!(keys.len(), expected);
            }

            /// Property: contraction never grows the set and matches the remaining product.
            #[test]
            fn contraction_matches_remaining_product(
                counts in prop::collection::vec(1usize..5, 1..5),
                pick in any::<prop::sample::Index>()
            ) {
                let (_, dims, set) = build(&counts);
                let removed = pick.index(dims.len());
                let before = set.len();

                let contraction = set.contract(dims[removed].id());
                let remaining: Vec<usize> = counts
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| *i != removed)
                    .map(|(_, c)| *c)
                    .collect();
                let expected = if remaining.is_empty() { 0 } else { remaining.iter().product() };

                prop_assert!(contraction.set.len() <= before);
                prop_assert_eq!(contraction.set.len(), expected);
                prop_assert_eq!(contraction.set.len() + contraction.discarded.len(), if expected == 0 { 0 } else { before });
                prop_assert!(contraction.set.keys().all(|k| !k.contains_dimension(dims[removed].id())));
            }

            /// Property: removing then re-adding a dimension restores cardinality.
            #[test]
            fn remove_then_readd_restores_cardinality(
                counts in prop::collection::vec(1usize..5, 1..4),
                pick in any::<prop::sample::Index>()
            ) {
                let (_, dims, set) = build(&counts);
                let removed = &dims[pick.index(dims.len())];
                let before = set.len();

                let set = set.contract(removed.id()).set.expand(removed, &defaults());
                prop_assert_eq!(set.len(), before);
            }

            /// Property: the same additions produce the same ordered keys.
            #[test]
            fn expansion_is_deterministic(counts in prop::collection::vec(1usize..4, 1..4)) {
                let (_, _, first) = build(&counts);
                let (_, _, second) = build(&counts);
                let a: Vec<&VariantKey> = first.keys().collect();
                let b: Vec<&VariantKey> = second.keys().collect();
                prop_assert_eq!(a, b);
            }
        }
    }
}
