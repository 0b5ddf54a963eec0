//! Product attributes as handed over by the product catalog.
//!
//! Only option-bearing attributes can vary a product. The distinction is carried
//! by [`AttributeKind`] and enforced once, when converting into a
//! [`SelectableAttribute`].

use serde::{Deserialize, Serialize};

use skuforge_core::{AttributeId, OptionValueId, ValueObject};

use crate::error::VariantError;

/// One concrete value of an attribute (e.g. "Red").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionValue {
    pub id: OptionValueId,
    pub value: String,
    #[serde(default)]
    pub display_order: i32,
}

impl OptionValue {
    pub fn new(id: OptionValueId, value: impl Into<String>, display_order: i32) -> Self {
        Self {
            id,
            value: value.into(),
            display_order,
        }
    }
}

impl ValueObject for OptionValue {}

/// Attribute type as exposed by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum AttributeKind {
    /// Single choice out of an enumerable list.
    Options { options: Vec<OptionValue> },
    /// Several choices out of an enumerable list.
    MultipleSelect { options: Vec<OptionValue> },
    /// Free text, no options.
    Text,
    /// Long-form description, no options.
    Description,
}

impl AttributeKind {
    /// Capability bit: can this attribute be used as a variation dimension?
    pub fn is_selectable(&self) -> bool {
        matches!(self, Self::Options { .. } | Self::MultipleSelect { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Options { .. } => "options",
            Self::MultipleSelect { .. } => "multiple-select",
            Self::Text => "text",
            Self::Description => "description",
        }
    }
}

/// A product attribute (selectable or not).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductAttribute {
    pub id: AttributeId,
    pub name: String,
    pub kind: AttributeKind,
}

impl ProductAttribute {
    pub fn options(id: AttributeId, name: impl Into<String>, options: Vec<OptionValue>) -> Self {
        Self {
            id,
            name: name.into(),
            kind: AttributeKind::Options { options },
        }
    }

    pub fn text(id: AttributeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            kind: AttributeKind::Text,
        }
    }

    pub fn is_selectable(&self) -> bool {
        self.kind.is_selectable()
    }
}

/// An attribute proven to carry enumerable options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectableAttribute {
    pub id: AttributeId,
    pub name: String,
    pub multiple: bool,
    pub options: Vec<OptionValue>,
}

impl TryFrom<ProductAttribute> for SelectableAttribute {
    type Error = VariantError;

    fn try_from(attribute: ProductAttribute) -> Result<Self, Self::Error> {
        let (multiple, options) = match attribute.kind {
            AttributeKind::Options { options } => (false, options),
            AttributeKind::MultipleSelect { options } => (true, options),
            other => {
                return Err(VariantError::NotSelectable {
                    attribute_id: attribute.id,
                    kind: other.label(),
                });
            }
        };

        Ok(Self {
            id: attribute.id,
            name: attribute.name,
            multiple,
            options,
        })
    }
}
