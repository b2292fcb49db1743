//! Field registry - merges static catalogs with tenant custom properties.
//!
//! The registry is the single resolution point for field ids. A field that
//! does not resolve here does not exist as far as the engine is concerned,
//! whether it was never defined or belongs to another organization.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use crate::catalog::{static_fields, EntityTypeCatalog};
use crate::error::Error;
use crate::store::StoreError;
use crate::tenant::OrgId;
use reportql_proto::{DataType, EntityType, FieldDescriptor};

/// Data type of a tenant-defined custom property, as stored by the
/// administration surface that owns the definitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomPropertyType {
    /// Free-text input.
    Text,
    /// Numeric input.
    Number,
    /// Calendar date input.
    Date,
    /// Checkbox.
    Checkbox,
    /// Single-select dropdown.
    Select,
    /// Monetary amount input.
    Money,
}

impl CustomPropertyType {
    /// The engine data type this property type reports as.
    pub fn data_type(&self) -> DataType {
        match self {
            CustomPropertyType::Text => DataType::String,
            CustomPropertyType::Number => DataType::Number,
            CustomPropertyType::Date => DataType::Date,
            CustomPropertyType::Checkbox => DataType::Boolean,
            CustomPropertyType::Select => DataType::Enum,
            CustomPropertyType::Money => DataType::Currency,
        }
    }
}

/// A tenant-defined custom property.
///
/// Definitions are owned and persisted outside this engine; the registry
/// only consumes them through a [`CustomPropertySource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomPropertyDefinition {
    /// Definition id, unique within the organization.
    pub id: String,
    /// Owning organization.
    pub organization_id: OrgId,
    /// Entity type the property attaches to.
    pub entity_type: EntityType,
    /// Property data type.
    pub property_type: CustomPropertyType,
    /// Human-readable label.
    pub label: String,
}

impl CustomPropertyDefinition {
    /// The field id this property resolves under.
    pub fn field_id(&self) -> String {
        format!("custom.{}", self.id)
    }

    /// Build the catalog descriptor for this property.
    pub fn to_descriptor(&self) -> FieldDescriptor {
        let data_type = self.property_type.data_type();
        let mut descriptor =
            FieldDescriptor::new(self.field_id(), self.label.clone(), data_type, "Custom Fields")
                .filterable()
                .sortable()
                .groupable()
                .custom();
        if data_type.is_numeric() {
            descriptor = descriptor.aggregatable();
        }
        descriptor
    }
}

/// Provider of custom property definitions for an organization.
pub trait CustomPropertySource: Send + Sync {
    /// Fetch the definitions for one `(organization, entity type)` pair.
    fn properties_for(
        &self,
        org: OrgId,
        entity: EntityType,
    ) -> Result<Vec<CustomPropertyDefinition>, StoreError>;
}

/// A source with no custom properties.
pub struct NoCustomProperties;

impl CustomPropertySource for NoCustomProperties {
    fn properties_for(
        &self,
        _org: OrgId,
        _entity: EntityType,
    ) -> Result<Vec<CustomPropertyDefinition>, StoreError> {
        Ok(vec![])
    }
}

/// Resolves field ids against the merged static + custom catalog.
pub struct FieldRegistry {
    source: Arc<dyn CustomPropertySource>,
    cache: Option<DashMap<(OrgId, EntityType), Arc<EntityTypeCatalog>>>,
}

impl FieldRegistry {
    /// Create a registry over a custom property source. Resolution is
    /// uncached: every call re-reads the source.
    pub fn new(source: Arc<dyn CustomPropertySource>) -> Self {
        Self {
            source,
            cache: None,
        }
    }

    /// Create a registry with no custom properties at all.
    pub fn without_custom_properties() -> Self {
        Self::new(Arc::new(NoCustomProperties))
    }

    /// Enable the resolved-catalog cache. Callers that mutate custom
    /// property definitions must call [`FieldRegistry::invalidate`]
    /// afterwards or resolution will serve stale catalogs.
    pub fn with_cache(mut self) -> Self {
        self.cache = Some(DashMap::new());
        self
    }

    /// Resolve the full catalog for an `(organization, entity type)` pair.
    pub fn catalog(
        &self,
        org: OrgId,
        entity: EntityType,
    ) -> Result<Arc<EntityTypeCatalog>, Error> {
        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.get(&(org, entity)) {
                return Ok(Arc::clone(&hit));
            }
        }

        let catalog = self.resolve(org, entity)?;
        if let Some(cache) = &self.cache {
            cache.insert((org, entity), Arc::clone(&catalog));
        }
        Ok(catalog)
    }

    /// Resolve a single field id.
    ///
    /// A miss returns [`Error::UnknownField`] whether the field never
    /// existed or belongs to another tenant; callers cannot tell the two
    /// apart.
    pub fn resolve_field(
        &self,
        org: OrgId,
        entity: EntityType,
        field_id: &str,
    ) -> Result<FieldDescriptor, Error> {
        self.catalog(org, entity)?
            .field(field_id)
            .cloned()
            .ok_or_else(|| Error::UnknownField {
                entity,
                field: field_id.to_string(),
            })
    }

    /// Drop the cached catalog for one `(organization, entity type)` pair.
    pub fn invalidate(&self, org: OrgId, entity: EntityType) {
        if let Some(cache) = &self.cache {
            cache.remove(&(org, entity));
            debug!(%org, %entity, "invalidated resolved catalog");
        }
    }

    fn resolve(&self, org: OrgId, entity: EntityType) -> Result<Arc<EntityTypeCatalog>, Error> {
        let mut fields = static_fields(entity).to_vec();
        for definition in self.source.properties_for(org, entity)? {
            fields.push(definition.to_descriptor());
        }
        debug!(%org, %entity, field_count = fields.len(), "resolved catalog");
        Ok(Arc::new(EntityTypeCatalog::new(entity, fields)))
    }
}
