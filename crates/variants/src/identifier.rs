//! SKU and slug synthesis.
//!
//! `SKU = base + sep + SEGMENT(value)...` where each segment is the option value
//! upper-cased with whitespace removed and cut to a bounded prefix.
//! `slug = kebab(base) + "-" + kebab(value)...` with separators collapsed.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::combination::CombinationSet;
use crate::config::EngineConfig;
use crate::key::VariantKey;

/// Product-level identifiers every variant identifier is derived from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseIdentity {
    pub sku: String,
    pub slug: String,
}

impl BaseIdentity {
    /// An empty `slug` falls back to the kebab-cased product `name`.
    pub fn new(sku: &str, slug: &str, name: &str) -> Self {
        let slug = if slug.trim().is_empty() { kebab(name) } else { kebab(slug) };
        Self {
            sku: sku.trim().to_string(),
            slug,
        }
    }
}

/// Two variants asked for the same identifier; the later one got a suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkuCollision {
    pub key: VariantKey,
    pub requested: String,
    pub assigned: String,
}

pub fn sanitize_segment(value: &str, max_len: usize) -> String {
    value
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .take(max_len)
        .collect()
}

/// Lower-case, alphanumeric runs joined by single `-`.
pub fn kebab(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut pending_dash = false;

    for c in value.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }

    out
}

pub struct IdentifierSynthesizer<'a> {
    base: &'a BaseIdentity,
    config: &'a EngineConfig,
}

impl<'a> IdentifierSynthesizer<'a> {
    pub fn new(base: &'a BaseIdentity, config: &'a EngineConfig) -> Self {
        Self { base, config }
    }

    pub fn sku_for(&self, key: &VariantKey) -> String {
        let sep = self.config.separator.to_string();
        let segments = key
            .values()
            .map(|v| sanitize_segment(v, self.config.sku_segment_len))
            .filter(|s| !s.is_empty());

        std::iter::once(self.base.sku.clone())
            .filter(|s| !s.is_empty())
            .chain(segments)
            .collect::<Vec<_>>()
            .join(&sep)
    }

    pub fn slug_for(&self, key: &VariantKey) -> String {
        std::iter::once(self.base.slug.as_str())
            .chain(key.values())
            .map(kebab)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("-")
    }

    /// Fill in identifiers for every variant that lacks them or whose key
    /// changed since they were derived. Manual SKUs are left alone.
    ///
    /// Identifiers already in place are reserved first; a synthesized identifier
    /// that is already taken gets a numeric suffix starting at the variant's
    /// 1-based position in the set.
    pub fn synthesize(&self, set: &mut CombinationSet) -> Vec<SkuCollision> {
        let mut taken_skus: HashSet<String> = set
            .iter()
            .filter(|v| !v.needs_sku() && !v.sku().is_empty())
            .map(|v| v.sku().to_string())
            .collect();
        let mut taken_slugs: HashSet<String> = set
            .iter()
            .filter(|v| !v.needs_slug())
            .map(|v| v.slug().to_string())
            .collect();

        let sep = self.config.separator;
        let mut collisions = Vec::new();

        for (position, variant) in set.iter_mut().enumerate() {
            let (needs_sku, needs_slug) = (variant.needs_sku(), variant.needs_slug());
            if !needs_sku && !needs_slug {
                continue;
            }

            let sku = needs_sku.then(|| {
                let requested = self.sku_for(variant.key());
                let assigned = disambiguate(&requested, position, sep, &taken_skus);
                if assigned != requested {
                    tracing::debug!(
                        variant = %variant.key(),
                        requested = %requested,
                        assigned = %assigned,
                        "resolved SKU collision"
                    );
                    collisions.push(SkuCollision {
                        key: variant.key().clone(),
                        requested,
                        assigned: assigned.clone(),
                    });
                }
                taken_skus.insert(assigned.clone());
                assigned
            });

            let slug = needs_slug.then(|| {
                let requested = self.slug_for(variant.key());
                let assigned = disambiguate(&requested, position, '-', &taken_slugs);
                taken_slugs.insert(assigned.clone());
                assigned
            });

            variant.set_identifiers(sku, slug);
        }

        collisions
    }
}

fn disambiguate(requested: &str, position: usize, sep: char, taken: &HashSet<String>) -> String {
    if !requested.is_empty() && !taken.contains(requested) {
        return requested.to_string();
    }

    let mut n = position + 1;
    loop {
        let candidate = if requested.is_empty() {
            n.to_string()
        } else {
            format!("{requested}{sep}{n}")
        };
        if !taken.contains(&candidate) {
            return candidate;
        }
        n += 1;
    }
}
