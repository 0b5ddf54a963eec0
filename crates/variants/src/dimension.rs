//! Dimension registry: the ordered set of attributes currently varying a product.

use serde::Serialize;

use skuforge_core::{AttributeId, Entity};

use crate::attribute::{OptionValue, ProductAttribute, SelectableAttribute};
use crate::error::{VariantError, VariantResult};
use crate::key::{KeyPart, VariantKey};
use crate::notice::Notice;

/// A registered variation dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dimension {
    id: AttributeId,
    name: String,
    options: Vec<OptionValue>,
    addition_order: u64,
}

impl Dimension {
    pub fn id(&self) -> AttributeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Options in display order.
    pub fn options(&self) -> &[OptionValue] {
        &self.options
    }

    pub fn addition_order(&self) -> u64 {
        self.addition_order
    }

    pub fn key_parts(&self) -> impl Iterator<Item = KeyPart> + '_ {
        self.options.iter().map(|o| KeyPart::new(self, o))
    }
}

impl Entity for Dimension {
    type Id = AttributeId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Result of asking the registry to add a dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    Registered(Dimension),
    /// Nothing changed; the notice says why.
    Ignored(Notice),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DimensionRegistry {
    dimensions: Vec<Dimension>,
    next_order: u64,
}

impl DimensionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decide whether `attribute` can be registered as-is.
    ///
    /// `Ok(Some(notice))` means registering would be a no-op.
    pub fn check(&self, attribute: &SelectableAttribute) -> VariantResult<Option<Notice>> {
        if self.contains(attribute.id) {
            return Ok(Some(Notice::DuplicateDimension {
                dimension_id: attribute.id,
                name: attribute.name.clone(),
            }));
        }

        if attribute.options.is_empty() {
            return Ok(Some(Notice::EmptyDimension {
                dimension_id: attribute.id,
                name: attribute.name.clone(),
            }));
        }

        for (i, option) in attribute.options.iter().enumerate() {
            if attribute.options[..i].iter().any(|o| o.id == option.id) {
                return Err(VariantError::DuplicateOption {
                    attribute_id: attribute.id,
                    option_id: option.id,
                });
            }
        }

        Ok(None)
    }

    /// Register `attribute` as the newest dimension.
    pub fn add_dimension(&mut self, attribute: ProductAttribute) -> VariantResult<Registration> {
        let attribute = SelectableAttribute::try_from(attribute)?;
        if let Some(notice) = self.check(&attribute)? {
            return Ok(Registration::Ignored(notice));
        }
        Ok(Registration::Registered(self.insert(attribute).clone()))
    }

    /// Append without checking. Callers go through [`Self::check`] first.
    pub(crate) fn insert(&mut self, attribute: SelectableAttribute) -> &Dimension {
        let mut options = attribute.options;
        // Stable: equal display orders keep catalog order.
        options.sort_by_key(|o| o.display_order);

        self.dimensions.push(Dimension {
            id: attribute.id,
            name: attribute.name,
            options,
            addition_order: self.next_order,
        });
        self.next_order += 1;

        &self.dimensions[self.dimensions.len() - 1]
    }

    pub fn remove_dimension(&mut self, id: AttributeId) -> VariantResult<Dimension> {
        let pos = self
            .dimensions
            .iter()
            .position(|d| d.id == id)
            .ok_or(VariantError::UnknownDimension(id))?;
        Ok(self.dimensions.remove(pos))
    }

    /// Dimensions in addition order.
    pub fn list_dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    pub fn get(&self, id: AttributeId) -> Option<&Dimension> {
        self.dimensions.iter().find(|d| d.id == id)
    }

    pub fn contains(&self, id: AttributeId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.dimensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dimensions.is_empty()
    }

    /// Number of variants a complete combination set has for these dimensions.
    pub fn expected_cardinality(&self) -> usize {
        if self.dimensions.is_empty() {
            return 0;
        }
        self.dimensions.iter().map(|d| d.options.len()).product()
    }

    /// Order `parts` canonically and check they name one option of every
    /// registered dimension.
    pub fn canonical_key(&self, parts: impl IntoIterator<Item = KeyPart>) -> VariantResult<VariantKey> {
        let mut parts: Vec<KeyPart> = parts.into_iter().collect();

        for part in &parts {
            let dimension = self
                .get(part.dimension_id)
                .ok_or(VariantError::UnknownDimension(part.dimension_id))?;
            if !dimension.options.iter().any(|o| o.id == part.option_id) {
                return Err(skuforge_core::DomainError::validation(format!(
                    "option {} does not belong to dimension \"{}\"",
                    part.option_id, dimension.name
                ))
                .into());
            }
        }

        parts.sort_by_key(|p| {
            self.get(p.dimension_id)
                .map(|d| d.addition_order)
                .unwrap_or(u64::MAX)
        });
        let key = VariantKey::new(parts)?;

        if key.len() != self.dimensions.len() {
            return Err(skuforge_core::DomainError::validation(format!(
                "combination names {} of {} dimensions",
                key.len(),
                self.dimensions.len()
            ))
            .into());
        }

        Ok(key)
    }
}
