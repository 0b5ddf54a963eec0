//! Contracts with the product catalog and the persistence layer, plus in-memory
//! implementations for tests and offline tooling.

use std::collections::HashMap;

use crate::attribute::ProductAttribute;
use crate::error::CollaboratorError;
use crate::product::ProductId;
use crate::submission::VariantSubmission;

/// Source of attributes a product may be varied by.
pub trait ProductCatalog {
    /// Every attribute of the product. [`ProductAttribute::is_selectable`]
    /// tells option-bearing attributes from free-form ones.
    fn selectable_dimensions(&self, product_id: ProductId) -> Result<Vec<ProductAttribute>, CollaboratorError>;
}

/// Receives the variant payload on submit.
pub trait VariantSink {
    fn persist(&mut self, product_id: ProductId, variants: &[VariantSubmission]) -> Result<(), CollaboratorError>;
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    products: HashMap<ProductId, Vec<ProductAttribute>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, product_id: ProductId, attributes: Vec<ProductAttribute>) {
        self.products.insert(product_id, attributes);
    }
}

impl ProductCatalog for InMemoryCatalog {
    fn selectable_dimensions(&self, product_id: ProductId) -> Result<Vec<ProductAttribute>, CollaboratorError> {
        self.products
            .get(&product_id)
            .cloned()
            .ok_or(CollaboratorError::ProductNotFound(product_id))
    }
}

/// Records submissions; optionally fails every call.
#[derive(Debug, Clone, Default)]
pub struct InMemorySink {
    submissions: Vec<(ProductId, Vec<VariantSubmission>)>,
    failure: Option<CollaboratorError>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(error: CollaboratorError) -> Self {
        Self {
            submissions: Vec::new(),
            failure: Some(error),
        }
    }

    pub fn submissions(&self) -> &[(ProductId, Vec<VariantSubmission>)] {
        &self.submissions
    }

    pub fn last(&self) -> Option<&[VariantSubmission]> {
        self.submissions.last().map(|(_, v)| v.as_slice())
    }
}

impl VariantSink for InMemorySink {
    fn persist(&mut self, product_id: ProductId, variants: &[VariantSubmission]) -> Result<(), CollaboratorError> {
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        self.submissions.push((product_id, variants.to_vec()));
        Ok(())
    }
}
