//! Static field catalogs for the reportable entity types.
//!
//! One module per entity type declares its built-in reportable fields.
//! The tables are pure data, materialized once at process start; the
//! [`crate::registry::FieldRegistry`] merges them with tenant custom
//! properties into the resolved catalog a request actually sees.

mod attestations;
mod cases;
mod disclosures;
mod policies;
mod risks;
mod tasks;
mod trainings;

use std::collections::HashMap;
use std::sync::OnceLock;

use reportql_proto::{EntityType, FieldDescriptor};

/// Get the static field catalog for an entity type.
pub fn static_fields(entity: EntityType) -> &'static [FieldDescriptor] {
    static CATALOGS: OnceLock<HashMap<EntityType, Vec<FieldDescriptor>>> = OnceLock::new();
    let catalogs = CATALOGS.get_or_init(|| {
        EntityType::ALL
            .into_iter()
            .map(|entity| (entity, build_fields(entity)))
            .collect()
    });
    catalogs.get(&entity).map(Vec::as_slice).unwrap_or(&[])
}

fn build_fields(entity: EntityType) -> Vec<FieldDescriptor> {
    match entity {
        EntityType::Cases => cases::fields(),
        EntityType::Disclosures => disclosures::fields(),
        EntityType::Policies => policies::fields(),
        EntityType::Attestations => attestations::fields(),
        EntityType::Trainings => trainings::fields(),
        EntityType::Risks => risks::fields(),
        EntityType::Tasks => tasks::fields(),
    }
}

/// A resolved field catalog for one `(entity type, organization)` pair.
///
/// Holds the merged static and custom descriptors with an id index for
/// lookup. This is the whitelist every report reference is checked
/// against.
#[derive(Debug, Clone)]
pub struct EntityTypeCatalog {
    entity_type: EntityType,
    fields: Vec<FieldDescriptor>,
    index: HashMap<String, usize>,
}

impl EntityTypeCatalog {
    /// Build a catalog from a field list. Field ids must be unique.
    pub fn new(entity_type: EntityType, fields: Vec<FieldDescriptor>) -> Self {
        let mut index = HashMap::with_capacity(fields.len());
        for (i, field) in fields.iter().enumerate() {
            let previous = index.insert(field.field_id.clone(), i);
            debug_assert!(previous.is_none(), "duplicate field id {}", field.field_id);
        }
        Self {
            entity_type,
            fields,
            index,
        }
    }

    /// The entity type this catalog describes.
    pub fn entity_type(&self) -> EntityType {
        self.entity_type
    }

    /// All descriptors, static first, in declaration order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Look up a descriptor by field id.
    pub fn field(&self, field_id: &str) -> Option<&FieldDescriptor> {
        self.index.get(field_id).map(|&i| &self.fields[i])
    }

    /// Whether a field id is in this catalog.
    pub fn contains(&self, field_id: &str) -> bool {
        self.index.contains_key(field_id)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the catalog has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
