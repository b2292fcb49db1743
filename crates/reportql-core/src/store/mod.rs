//! Storage abstraction the executor runs plans against.
//!
//! - [`EntityQuery`] - per-entity query surface a backend implements
//! - [`StoreRegistry`] - maps entity types to their backends
//! - [`memory`] - in-memory reference backend
//!
//! Backends receive already-validated plans: predicates are typed, field
//! ids resolved, pagination normalized. A backend's only job is to
//! produce matching rows, counts, and group buckets for one organization.

pub mod memory;

pub use memory::MemoryStore;

use std::collections::BTreeMap;
use std::sync::Arc;

use thiserror::Error;

use crate::query::predicate::Predicate;
use crate::tenant::OrgId;
use reportql_proto::{Aggregation, EntityType, JoinHop, Pagination, SortSpec, Value};

/// Error from a storage backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend failed to execute the request.
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// One stored entity row, flattened to the reportable field surface.
///
/// Joined fields appear under their dotted field ids (`assignee.name`),
/// exactly as the catalog names them; backends resolve relation hops
/// before rows reach the executor.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityRecord {
    /// Backend row id.
    pub id: String,
    /// Field values keyed by catalog field id.
    pub fields: BTreeMap<String, Value>,
}

impl EntityRecord {
    /// Create an empty record.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Set a field value.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Set a field value, builder style.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(field, value);
        self
    }

    /// Read a field value.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }
}

/// Row-fetch request for list-mode execution.
#[derive(Debug, Clone)]
pub struct RowQuery {
    /// Row filter.
    pub predicate: Predicate,
    /// Fields to materialize on each returned record.
    pub fields: Vec<String>,
    /// Relation paths the fields require.
    pub joins: Vec<Vec<JoinHop>>,
    /// Ordering, missing values last.
    pub sort: Option<SortSpec>,
    /// Window over the matching rows.
    pub pagination: Pagination,
}

/// Bucket request for aggregate-mode execution.
#[derive(Debug, Clone)]
pub struct GroupQuery {
    /// Row filter.
    pub predicate: Predicate,
    /// Grouping dimensions.
    pub group_by: Vec<String>,
    /// Aggregations to compute per bucket.
    pub aggregations: Vec<Aggregation>,
    /// Relation paths the dimensions and targets require.
    pub joins: Vec<Vec<JoinHop>>,
}

/// One group bucket as produced by a backend.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupRow {
    /// Grouping dimension values, keyed by field id.
    pub key: BTreeMap<String, Value>,
    /// Aggregate values, keyed by [`Aggregation::result_key`].
    pub aggregates: BTreeMap<String, Value>,
}

/// Query surface a backend implements per entity type.
pub trait EntityQuery: Send + Sync {
    /// Fetch the rows matching the predicate, ordered and windowed.
    fn find_many(&self, org: OrgId, query: &RowQuery) -> Result<Vec<EntityRecord>, StoreError>;

    /// Count all rows matching the predicate, ignoring pagination.
    fn count(&self, org: OrgId, predicate: &Predicate) -> Result<u64, StoreError>;

    /// Bucket matching rows and compute aggregates per bucket.
    fn group_by(&self, org: OrgId, query: &GroupQuery) -> Result<Vec<GroupRow>, StoreError>;
}

/// Maps each entity type to the backend that serves it.
#[derive(Clone)]
pub struct StoreRegistry {
    cases: Arc<dyn EntityQuery>,
    disclosures: Arc<dyn EntityQuery>,
    policies: Arc<dyn EntityQuery>,
    attestations: Arc<dyn EntityQuery>,
    trainings: Arc<dyn EntityQuery>,
    risks: Arc<dyn EntityQuery>,
    tasks: Arc<dyn EntityQuery>,
}

impl StoreRegistry {
    /// Create a registry that serves every entity type from one backend.
    pub fn uniform(store: Arc<dyn EntityQuery>) -> Self {
        Self {
            cases: Arc::clone(&store),
            disclosures: Arc::clone(&store),
            policies: Arc::clone(&store),
            attestations: Arc::clone(&store),
            trainings: Arc::clone(&store),
            risks: Arc::clone(&store),
            tasks: store,
        }
    }

    /// Replace the backend for one entity type.
    pub fn with_store(mut self, entity: EntityType, store: Arc<dyn EntityQuery>) -> Self {
        match entity {
            EntityType::Cases => self.cases = store,
            EntityType::Disclosures => self.disclosures = store,
            EntityType::Policies => self.policies = store,
            EntityType::Attestations => self.attestations = store,
            EntityType::Trainings => self.trainings = store,
            EntityType::Risks => self.risks = store,
            EntityType::Tasks => self.tasks = store,
        }
        self
    }

    /// The backend serving an entity type.
    pub fn for_entity(&self, entity: EntityType) -> &Arc<dyn EntityQuery> {
        match entity {
            EntityType::Cases => &self.cases,
            EntityType::Disclosures => &self.disclosures,
            EntityType::Policies => &self.policies,
            EntityType::Attestations => &self.attestations,
            EntityType::Trainings => &self.trainings,
            EntityType::Risks => &self.risks,
            EntityType::Tasks => &self.tasks,
        }
    }
}
