//! Engine configuration.

use serde::{Deserialize, Serialize};

use skuforge_core::{DomainError, DomainResult};

pub const SKU_SEGMENT_LEN_ENV: &str = "SKUFORGE_SKU_SEGMENT_LEN";
pub const SKU_SEPARATOR_ENV: &str = "SKUFORGE_SKU_SEPARATOR";

/// Identifier synthesis settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum characters kept from each option value in a synthesized SKU.
    pub sku_segment_len: usize,
    /// Joins the base SKU and the option segments.
    pub separator: char,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sku_segment_len: 10,
            separator: '-',
        }
    }
}

impl EngineConfig {
    /// Defaults overridden by `SKUFORGE_SKU_SEGMENT_LEN` / `SKUFORGE_SKU_SEPARATOR`.
    ///
    /// Unparseable values are ignored with a warning.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(raw) = std::env::var(SKU_SEGMENT_LEN_ENV) {
            match raw.trim().parse::<usize>() {
                Ok(len) => config.sku_segment_len = len,
                Err(e) => tracing::warn!("ignoring {SKU_SEGMENT_LEN_ENV}={raw:?}: {e}"),
            }
        }

        if let Ok(raw) = std::env::var(SKU_SEPARATOR_ENV) {
            let mut chars = raw.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => config.separator = c,
                _ => tracing::warn!("ignoring {SKU_SEPARATOR_ENV}={raw:?}: expected one character"),
            }
        }

        config
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.sku_segment_len == 0 {
            return Err(DomainError::validation("sku_segment_len must be at least 1"));
        }
        if self.separator.is_alphanumeric() || self.separator.is_whitespace() {
            return Err(DomainError::validation(format!(
                "separator {:?} would be indistinguishable from SKU content",
                self.separator
            )));
        }
        Ok(())
    }
}
