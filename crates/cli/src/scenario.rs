//! JSON scenario files: a product, its catalog attributes and a list of edits.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use skuforge_variants::{
    EngineConfig, InMemoryCatalog, Notice, ProductAttribute, ProductBase, ProductCatalog, ValidationError,
    VariantEditor, VariantField, VariantFields,
};

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub product: ProductBase,
    #[serde(default)]
    pub attributes: Vec<ProductAttribute>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// One edit. Attributes are referenced by name, variants by option values in
/// key order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    AddDimension {
        attribute: String,
    },
    RemoveDimension {
        attribute: String,
    },
    SetField {
        variant: Vec<String>,
        field: VariantField,
        value: String,
    },
    SetBaseIdentity {
        sku: String,
        #[serde(default)]
        slug: String,
    },
    /// New seed values for the next time the combination set starts empty.
    SetBaseDefaults {
        defaults: VariantFields,
    },
}

/// Editor state after every step ran.
#[derive(Debug)]
pub struct Replay {
    pub editor: VariantEditor,
    pub notices: Vec<Notice>,
    /// Field edits that left an error behind, in step order.
    pub rejected: Vec<ValidationError>,
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).with_context(|| format!("reading scenario {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing scenario {}", path.display()))
    }

    fn catalog(&self) -> InMemoryCatalog {
        let mut catalog = InMemoryCatalog::new();
        catalog.insert(self.product.id, self.attributes.clone());
        catalog
    }

    pub fn replay(&self, config: EngineConfig) -> Result<Replay> {
        let catalog = self.catalog();
        let mut editor = VariantEditor::new(self.product.clone(), config)?;
        let mut rejected = Vec::new();

        for (n, step) in self.steps.iter().enumerate() {
            let n = n + 1;
            match step {
                Step::AddDimension { attribute } => {
                    let found = catalog
                        .selectable_dimensions(editor.product_id())?
                        .into_iter()
                        .find(|a| a.name.eq_ignore_ascii_case(attribute))
                        .ok_or_else(|| anyhow!("step {n}: no attribute named `{attribute}`"))?;
                    editor
                        .add_dimension(found)
                        .with_context(|| format!("step {n}: adding `{attribute}`"))?;
                }
                Step::RemoveDimension { attribute } => {
                    let id = editor
                        .list_dimensions()
                        .iter()
                        .find(|d| d.name().eq_ignore_ascii_case(attribute))
                        .map(|d| d.id())
                        .ok_or_else(|| anyhow!("step {n}: `{attribute}` is not a dimension"))?;
                    editor
                        .remove_dimension(id)
                        .with_context(|| format!("step {n}: removing `{attribute}`"))?;
                }
                Step::SetField { variant, field, value } => {
                    let key = editor
                        .combinations()
                        .find_by_values(variant.as_slice())
                        .map(|v| v.key().clone())
                        .ok_or_else(|| anyhow!("step {n}: no variant {}", variant.join(" / ")))?;
                    if let Some(error) = editor
                        .set_field_input(&key, *field, value)
                        .with_context(|| format!("step {n}: setting {field}"))?
                    {
                        tracing::warn!(step = n, "{error}");
                        rejected.push(error);
                    }
                }
                Step::SetBaseIdentity { sku, slug } => {
                    editor
                        .set_base_identity(sku, slug)
                        .with_context(|| format!("step {n}: changing base identity"))?;
                }
                Step::SetBaseDefaults { defaults } => {
                    editor
                        .set_base_defaults(*defaults)
                        .with_context(|| format!("step {n}: changing base defaults"))?;
                }
            }
        }

        let notices = editor.take_notices();
        Ok(Replay {
            editor,
            notices,
            rejected,
        })
    }
}
