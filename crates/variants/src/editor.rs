//! Variant editing session for one product (deterministic aggregate).
//!
//! Flow: dimension change -> combination set -> identifiers -> field store.
//! The session owns all of it; nothing here performs IO. Collaborators are only
//! reached through [`VariantEditor::submit`] and
//! [`VariantEditor::available_attributes`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use skuforge_core::{Aggregate, AggregateId, AggregateRoot, AttributeId, DomainError};
use skuforge_events::{Command, Event, execute};

use crate::attribute::{ProductAttribute, SelectableAttribute};
use crate::collaborator::{ProductCatalog, VariantSink};
use crate::combination::CombinationSet;
use crate::config::EngineConfig;
use crate::dimension::{Dimension, DimensionRegistry, Registration};
use crate::error::{VariantError, VariantResult};
use crate::fields::{FieldErrorKind, FieldStore, FieldValue, ValidationError, VariantField};
use crate::identifier::{BaseIdentity, IdentifierSynthesizer};
use crate::key::VariantKey;
use crate::notice::Notice;
use crate::product::{ProductBase, ProductId};
use crate::submission::{VariantSubmission, build_submission};
use crate::variant::VariantFields;

/// Aggregate root: VariantEditor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantEditor {
    id: ProductId,
    product: ProductBase,
    identity: BaseIdentity,
    config: EngineConfig,
    registry: DimensionRegistry,
    combinations: CombinationSet,
    fields: FieldStore,
    notices: Vec<Notice>,
    version: u64,
}

impl VariantEditor {
    /// Start a session with no dimensions and an empty combination set.
    pub fn new(product: ProductBase, config: EngineConfig) -> VariantResult<Self> {
        config.validate()?;
        Ok(Self {
            id: product.id,
            identity: product.identity(),
            product,
            config,
            registry: DimensionRegistry::new(),
            combinations: CombinationSet::new(),
            fields: FieldStore::new(),
            notices: Vec::new(),
            version: 0,
        })
    }

    pub fn product_id(&self) -> ProductId {
        self.id
    }

    pub fn product(&self) -> &ProductBase {
        &self.product
    }

    pub fn identity(&self) -> &BaseIdentity {
        &self.identity
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &DimensionRegistry {
        &self.registry
    }

    /// Dimensions in addition order.
    pub fn list_dimensions(&self) -> &[Dimension] {
        self.registry.list_dimensions()
    }

    /// The live, ordered combination set.
    pub fn combinations(&self) -> &CombinationSet {
        &self.combinations
    }

    pub fn validation(&self) -> &FieldStore {
        &self.fields
    }

    /// Outstanding validation errors in combination order.
    pub fn validation_errors(&self) -> Vec<ValidationError> {
        self.fields.errors(&self.combinations)
    }

    pub fn has_variants(&self) -> bool {
        self.combinations.has_variants()
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Hand pending notices to the presentation layer.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn add_dimension(&mut self, attribute: ProductAttribute) -> VariantResult<Registration> {
        let dimension_id = attribute.id;
        let command = EditorCommand::AddDimension(AddDimension {
            product_id: self.id,
            attribute,
            occurred_at: Utc::now(),
        });

        let events = execute(self, &command).inspect_err(|err| {
            tracing::warn!(product = %self.id, dimension = %dimension_id, "dimension rejected: {err}");
        })?;

        match events.into_iter().next() {
            Some(EditorEvent::DimensionIgnored(e)) => Ok(Registration::Ignored(e.notice)),
            Some(EditorEvent::DimensionAdded(_)) => self
                .registry
                .get(dimension_id)
                .cloned()
                .map(Registration::Registered)
                .ok_or(VariantError::UnknownDimension(dimension_id)),
            _ => Err(DomainError::invariant("add_dimension produced no outcome").into()),
        }
    }

    pub fn remove_dimension(&mut self, dimension_id: AttributeId) -> VariantResult<Dimension> {
        let dimension = self
            .registry
            .get(dimension_id)
            .cloned()
            .ok_or(VariantError::UnknownDimension(dimension_id))?;

        execute(
            self,
            &EditorCommand::RemoveDimension(RemoveDimension {
                product_id: self.id,
                dimension_id,
                occurred_at: Utc::now(),
            }),
        )?;

        Ok(dimension)
    }

    /// Returns the error now attached to the edited field, if any.
    pub fn set_field(&mut self, key: &VariantKey, value: FieldValue) -> VariantResult<Option<ValidationError>> {
        let field = value.field();
        execute(
            self,
            &EditorCommand::SetVariantField(SetVariantField {
                product_id: self.id,
                key: key.clone(),
                value,
                occurred_at: Utc::now(),
            }),
        )?;
        Ok(self.fields.error(key, field))
    }

    /// Like [`Self::set_field`] but from raw form input.
    pub fn set_field_input(
        &mut self,
        key: &VariantKey,
        field: VariantField,
        input: &str,
    ) -> VariantResult<Option<ValidationError>> {
        execute(
            self,
            &EditorCommand::SetVariantFieldInput(SetVariantFieldInput {
                product_id: self.id,
                key: key.clone(),
                field,
                input: input.to_string(),
                occurred_at: Utc::now(),
            }),
        )?;
        Ok(self.fields.error(key, field))
    }

    /// Change the base SKU/slug and resynthesize every non-manual identifier.
    pub fn set_base_identity(&mut self, sku: &str, slug: &str) -> VariantResult<()> {
        execute(
            self,
            &EditorCommand::ChangeBaseIdentity(ChangeBaseIdentity {
                product_id: self.id,
                sku: sku.to_string(),
                slug: slug.to_string(),
                occurred_at: Utc::now(),
            }),
        )?;
        Ok(())
    }

    /// Replace the base field values that seed an empty combination set.
    /// Existing variants keep their fields.
    pub fn set_base_defaults(&mut self, defaults: VariantFields) -> VariantResult<()> {
        execute(
            self,
            &EditorCommand::ChangeBaseDefaults(ChangeBaseDefaults {
                product_id: self.id,
                defaults,
                occurred_at: Utc::now(),
            }),
        )?;
        Ok(())
    }

    /// Selectable attributes of this product that are not registered yet.
    pub fn available_attributes(&self, catalog: &dyn ProductCatalog) -> VariantResult<Vec<ProductAttribute>> {
        let attributes = catalog.selectable_dimensions(self.id)?;
        Ok(attributes
            .into_iter()
            .filter(|a| a.is_selectable() && !self.registry.contains(a.id))
            .collect())
    }

    pub fn submission(&self) -> VariantResult<Vec<VariantSubmission>> {
        build_submission(&self.combinations, &self.fields)
    }

    /// Hand the payload to `sink`. On failure the session is unchanged and can
    /// be resubmitted.
    pub fn submit(&self, sink: &mut dyn VariantSink) -> VariantResult<usize> {
        let payload = self.submission().inspect_err(|err| {
            tracing::warn!(product = %self.id, "submission refused: {err}");
        })?;

        sink.persist(self.id, &payload).inspect_err(|err| {
            tracing::warn!(product = %self.id, "persisting variants failed: {err}");
        })?;

        tracing::info!(product = %self.id, variants = payload.len(), "variants submitted");
        Ok(payload.len())
    }

    fn synthesize_identifiers(&mut self) {
        let synthesizer = IdentifierSynthesizer::new(&self.identity, &self.config);
        let collisions = synthesizer.synthesize(&mut self.combinations);
        if !collisions.is_empty() {
            tracing::debug!(
                product = %self.id,
                collisions = collisions.len(),
                "auto-resolved SKU collisions"
            );
        }
    }
}

impl AggregateRoot for VariantEditor {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: AddDimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddDimension {
    pub product_id: ProductId,
    pub attribute: ProductAttribute,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RemoveDimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveDimension {
    pub product_id: ProductId,
    pub dimension_id: AttributeId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: SetVariantField.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetVariantField {
    pub product_id: ProductId,
    pub key: VariantKey,
    pub value: FieldValue,
    pub occurred_at: DateTime<Utc>,
}

/// Command: SetVariantFieldInput (raw form text).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetVariantFieldInput {
    pub product_id: ProductId,
    pub key: VariantKey,
    pub field: VariantField,
    pub input: String,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ChangeBaseIdentity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeBaseIdentity {
    pub product_id: ProductId,
    pub sku: String,
    pub slug: String,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ChangeBaseDefaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeBaseDefaults {
    pub product_id: ProductId,
    pub defaults: VariantFields,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditorCommand {
    AddDimension(AddDimension),
    RemoveDimension(RemoveDimension),
    SetVariantField(SetVariantField),
    SetVariantFieldInput(SetVariantFieldInput),
    ChangeBaseIdentity(ChangeBaseIdentity),
    ChangeBaseDefaults(ChangeBaseDefaults),
}

impl EditorCommand {
    pub fn product_id(&self) -> ProductId {
        match self {
            EditorCommand::AddDimension(c) => c.product_id,
            EditorCommand::RemoveDimension(c) => c.product_id,
            EditorCommand::SetVariantField(c) => c.product_id,
            EditorCommand::SetVariantFieldInput(c) => c.product_id,
            EditorCommand::ChangeBaseIdentity(c) => c.product_id,
            EditorCommand::ChangeBaseDefaults(c) => c.product_id,
        }
    }
}

impl Command for EditorCommand {
    fn target_aggregate_id(&self) -> AggregateId {
        self.product_id().0
    }
}

/// Event: DimensionAdded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionAdded {
    pub product_id: ProductId,
    pub attribute: SelectableAttribute,
    pub occurred_at: DateTime<Utc>,
}

/// Event: DimensionIgnored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionIgnored {
    pub product_id: ProductId,
    pub notice: Notice,
    pub occurred_at: DateTime<Utc>,
}

/// Event: DimensionRemoved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionRemoved {
    pub product_id: ProductId,
    pub dimension_id: AttributeId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: VariantFieldSet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantFieldSet {
    pub product_id: ProductId,
    pub key: VariantKey,
    pub value: FieldValue,
    pub occurred_at: DateTime<Utc>,
}

/// Event: VariantFieldInputRejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantFieldInputRejected {
    pub product_id: ProductId,
    pub key: VariantKey,
    pub field: VariantField,
    pub input: String,
    pub error: FieldErrorKind,
    pub occurred_at: DateTime<Utc>,
}

/// Event: BaseIdentityChanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseIdentityChanged {
    pub product_id: ProductId,
    pub identity: BaseIdentity,
    pub occurred_at: DateTime<Utc>,
}

/// Event: BaseDefaultsChanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseDefaultsChanged {
    pub product_id: ProductId,
    pub defaults: VariantFields,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditorEvent {
    DimensionAdded(DimensionAdded),
    DimensionIgnored(DimensionIgnored),
    DimensionRemoved(DimensionRemoved),
    VariantFieldSet(VariantFieldSet),
    VariantFieldInputRejected(VariantFieldInputRejected),
    BaseIdentityChanged(BaseIdentityChanged),
    BaseDefaultsChanged(BaseDefaultsChanged),
}

impl Event for EditorEvent {
    fn event_type(&self) -> &'static str {
        match self {
            EditorEvent::DimensionAdded(_) => "variants.dimension.added",
            EditorEvent::DimensionIgnored(_) => "variants.dimension.ignored",
            EditorEvent::DimensionRemoved(_) => "variants.dimension.removed",
            EditorEvent::VariantFieldSet(_) => "variants.field.set",
            EditorEvent::VariantFieldInputRejected(_) => "variants.field.rejected",
            EditorEvent::BaseIdentityChanged(_) => "variants.identity.changed",
            EditorEvent::BaseDefaultsChanged(_) => "variants.defaults.changed",
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            EditorEvent::DimensionAdded(e) => e.occurred_at,
            EditorEvent::DimensionIgnored(e) => e.occurred_at,
            EditorEvent::DimensionRemoved(e) => e.occurred_at,
            EditorEvent::VariantFieldSet(e) => e.occurred_at,
            EditorEvent::VariantFieldInputRejected(e) => e.occurred_at,
            EditorEvent::BaseIdentityChanged(e) => e.occurred_at,
            EditorEvent::BaseDefaultsChanged(e) => e.occurred_at,
        }
    }
}

impl Aggregate for VariantEditor {
    type Command = EditorCommand;
    type Event = EditorEvent;
    type Error = VariantError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            EditorEvent::DimensionAdded(e) => {
                let dimension = self.registry.insert(e.attribute.clone()).clone();
                let defaults = self.product.defaults;
                self.combinations = std::mem::take(&mut self.combinations).expand(&dimension, &defaults);
                self.synthesize_identifiers();
                self.fields.revalidate(&self.combinations);

                tracing::info!(
                    product = %self.id,
                    dimension = %dimension.id(),
                    name = dimension.name(),
                    variants = self.combinations.len(),
                    "dimension added"
                );
            }
            EditorEvent::DimensionIgnored(e) => {
                tracing::warn!(product = %self.id, "dimension ignored: {}", e.notice);
                self.notices.push(e.notice.clone());
            }
            EditorEvent::DimensionRemoved(e) => {
                if let Err(err) = self.registry.remove_dimension(e.dimension_id) {
                    tracing::warn!(product = %self.id, "replaying dimension removal: {err}");
                }

                let contraction = std::mem::take(&mut self.combinations).contract(e.dimension_id);
                let lost = contraction.lost_edits();
                self.combinations = contraction.set;
                if lost > 0 {
                    let notice = Notice::EditsDiscarded {
                        dimension_id: e.dimension_id,
                        discarded: lost,
                    };
                    tracing::warn!(product = %self.id, "{notice}");
                    self.notices.push(notice);
                }
                self.synthesize_identifiers();
                self.fields.revalidate(&self.combinations);

                tracing::info!(
                    product = %self.id,
                    dimension = %e.dimension_id,
                    variants = self.combinations.len(),
                    "dimension removed"
                );
            }
            EditorEvent::VariantFieldSet(e) => {
                match self.fields.set_field(&mut self.combinations, &e.key, e.value.clone()) {
                    Ok(_) if e.value.field() == VariantField::Sku => {
                        self.synthesize_identifiers();
                        self.fields.revalidate_skus(&self.combinations);
                    }
                    Ok(_) => {}
                    Err(err) => tracing::warn!(product = %self.id, "replaying field edit: {err}"),
                }
            }
            EditorEvent::VariantFieldInputRejected(e) => {
                if let Err(err) =
                    self.fields
                        .record_input_error(&self.combinations, &e.key, e.field, e.error.clone())
                {
                    tracing::warn!(product = %self.id, "replaying rejected input: {err}");
                }
            }
            EditorEvent::BaseIdentityChanged(e) => {
                self.identity = e.identity.clone();
                for variant in self.combinations.iter_mut() {
                    variant.invalidate_identifiers();
                }
                self.synthesize_identifiers();
                self.fields.revalidate_skus(&self.combinations);
            }
            EditorEvent::BaseDefaultsChanged(e) => {
                self.product.defaults = e.defaults;
                tracing::debug!(product = %self.id, "base defaults changed");
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        self.ensure_product_id(command.product_id())?;
        match command {
            EditorCommand::AddDimension(cmd) => self.handle_add_dimension(cmd),
            EditorCommand::RemoveDimension(cmd) => self.handle_remove_dimension(cmd),
            EditorCommand::SetVariantField(cmd) => self.handle_set_field(cmd),
            EditorCommand::SetVariantFieldInput(cmd) => self.handle_set_field_input(cmd),
            EditorCommand::ChangeBaseIdentity(cmd) => self.handle_change_identity(cmd),
            EditorCommand::ChangeBaseDefaults(cmd) => self.handle_change_defaults(cmd),
        }
    }
}

impl VariantEditor {
    fn ensure_product_id(&self, product_id: ProductId) -> Result<(), VariantError> {
        if self.id != product_id {
            return Err(DomainError::conflict("product_id mismatch").into());
        }
        Ok(())
    }

    fn ensure_variant(&self, key: &VariantKey) -> Result<(), VariantError> {
        if !self.combinations.contains(key) {
            return Err(VariantError::UnknownVariant(key.clone()));
        }
        Ok(())
    }

    fn handle_add_dimension(&self, cmd: &AddDimension) -> Result<Vec<EditorEvent>, VariantError> {
        let attribute = SelectableAttribute::try_from(cmd.attribute.clone())?;

        match self.registry.check(&attribute)? {
            Some(notice) => Ok(vec![EditorEvent::DimensionIgnored(DimensionIgnored {
                product_id: cmd.product_id,
                notice,
                occurred_at: cmd.occurred_at,
            })]),
            None => Ok(vec![EditorEvent::DimensionAdded(DimensionAdded {
                product_id: cmd.product_id,
                attribute,
                occurred_at: cmd.occurred_at,
            })]),
        }
    }

    fn handle_remove_dimension(&self, cmd: &RemoveDimension) -> Result<Vec<EditorEvent>, VariantError> {
        if !self.registry.contains(cmd.dimension_id) {
            return Err(VariantError::UnknownDimension(cmd.dimension_id));
        }

        Ok(vec![EditorEvent::DimensionRemoved(DimensionRemoved {
            product_id: cmd.product_id,
            dimension_id: cmd.dimension_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_set_field(&self, cmd: &SetVariantField) -> Result<Vec<EditorEvent>, VariantError> {
        self.ensure_variant(&cmd.key)?;

        Ok(vec![EditorEvent::VariantFieldSet(VariantFieldSet {
            product_id: cmd.product_id,
            key: cmd.key.clone(),
            value: cmd.value.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_set_field_input(&self, cmd: &SetVariantFieldInput) -> Result<Vec<EditorEvent>, VariantError> {
        self.ensure_variant(&cmd.key)?;

        let event = match FieldValue::parse(cmd.field, &cmd.input) {
            Ok(value) => EditorEvent::VariantFieldSet(VariantFieldSet {
                product_id: cmd.product_id,
                key: cmd.key.clone(),
                value,
                occurred_at: cmd.occurred_at,
            }),
            Err(error) => EditorEvent::VariantFieldInputRejected(VariantFieldInputRejected {
                product_id: cmd.product_id,
                key: cmd.key.clone(),
                field: cmd.field,
                input: cmd.input.clone(),
                error,
                occurred_at: cmd.occurred_at,
            }),
        };
        Ok(vec![event])
    }

    fn handle_change_identity(&self, cmd: &ChangeBaseIdentity) -> Result<Vec<EditorEvent>, VariantError> {
        Ok(vec![EditorEvent::BaseIdentityChanged(BaseIdentityChanged {
            product_id: cmd.product_id,
            identity: BaseIdentity::new(&cmd.sku, &cmd.slug, &self.product.name),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_change_defaults(&self, cmd: &ChangeBaseDefaults) -> Result<Vec<EditorEvent>, VariantError> {
        Ok(vec![EditorEvent::BaseDefaultsChanged(BaseDefaultsChanged {
            product_id: cmd.product_id,
            defaults: cmd.defaults,
            occurred_at: cmd.occurred_at,
        })])
    }
}
