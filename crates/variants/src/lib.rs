//! `skuforge-variants` — variant combination engine.
//!
//! A product is varied by *dimensions* (selectable attributes such as Color or
//! Size). The engine keeps the full cartesian product of their option values as
//! an ordered [`CombinationSet`], synthesizes a SKU and slug for every variant,
//! validates per-variant fields and builds the payload handed to persistence.
//!
//! [`VariantEditor`] is the entry point: a deterministic aggregate that turns
//! editing commands into events and applies them.

pub mod attribute;
pub mod collaborator;
pub mod combination;
pub mod config;
pub mod dimension;
pub mod editor;
pub mod error;
pub mod fields;
pub mod identifier;
pub mod key;
pub mod notice;
pub mod product;
pub mod submission;
pub mod variant;

#[cfg(test)]
mod testing;

pub use attribute::{AttributeKind, OptionValue, ProductAttribute, SelectableAttribute};
pub use collaborator::{InMemoryCatalog, InMemorySink, ProductCatalog, VariantSink};
pub use combination::{CombinationSet, Contraction, DiscardedVariant};
pub use config::EngineConfig;
pub use dimension::{Dimension, DimensionRegistry, Registration};
pub use editor::{EditorCommand, EditorEvent, VariantEditor};
pub use error::{CollaboratorError, VariantError, VariantResult};
pub use fields::{FieldErrorKind, FieldStore, FieldValue, ValidationError, VariantField};
pub use identifier::{BaseIdentity, IdentifierSynthesizer, SkuCollision};
pub use key::{KeyPart, VariantKey};
pub use notice::Notice;
pub use product::{ProductBase, ProductId};
pub use submission::{AttributeRef, VariantSubmission, build_submission};
pub use variant::{Variant, VariantFields};
