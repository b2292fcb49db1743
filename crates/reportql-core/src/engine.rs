//! The report executor.
//!
//! [`ReportEngine::run`] is the one entry point: resolve the catalog for
//! the requesting organization, validate the spec into a plan, then hand
//! the plan to the entity's storage backend. Validation failures return
//! before any backend call is made.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::diagnostics::ExecutionObserver;
use crate::error::Error;
use crate::query::{build_predicate, PlanMode, ReportPlan, ReportPlanner};
use crate::registry::FieldRegistry;
use crate::store::{EntityRecord, GroupQuery, RowQuery, StoreRegistry};
use crate::tenant::OrgId;
use reportql_proto::{
    ComputedKind, EntityType, FieldDescriptor, GroupBucket, GroupPage, ReportQuerySpec,
    ReportResult, ReportRow, RowPage, Value,
};

/// Validates and executes report queries for one deployment.
pub struct ReportEngine {
    registry: Arc<FieldRegistry>,
    stores: StoreRegistry,
}

impl ReportEngine {
    /// Create an engine over a field registry and storage backends.
    pub fn new(registry: Arc<FieldRegistry>, stores: StoreRegistry) -> Self {
        Self { registry, stores }
    }

    /// List the fields an organization may reference for an entity type,
    /// custom properties included. This is what report builders render as
    /// the available-columns picker.
    pub fn field_catalog(
        &self,
        org: OrgId,
        entity_type: EntityType,
    ) -> Result<Vec<FieldDescriptor>, Error> {
        let catalog = self.registry.catalog(org, entity_type)?;
        Ok(catalog.fields().to_vec())
    }

    /// Run one report for an organization.
    pub fn run(&self, org: OrgId, spec: &ReportQuerySpec) -> Result<ReportResult, Error> {
        let catalog = self.registry.catalog(org, spec.entity_type)?;
        let predicate = build_predicate(&catalog, &spec.filter)?;
        let plan = ReportPlanner::plan(&catalog, spec, predicate)?;
        self.execute(org, &plan)
    }

    fn execute(&self, org: OrgId, plan: &ReportPlan) -> Result<ReportResult, Error> {
        let observer = ExecutionObserver::start(org, plan);
        let store = self.stores.for_entity(plan.entity_type);

        match &plan.mode {
            PlanMode::List { columns } => {
                let query = RowQuery {
                    predicate: plan.predicate.clone(),
                    fields: plan.fetch_fields.clone(),
                    joins: plan.joins.clone(),
                    sort: plan.sort.clone(),
                    pagination: plan.pagination,
                };
                let records = store.find_many(org, &query)?;
                let total_count = store.count(org, &plan.predicate)?;

                // One clock reading per execution, so every computed value
                // in the page agrees on what "today" is.
                let now = Utc::now();
                let rows: Vec<ReportRow> = records
                    .into_iter()
                    .map(|record| project_row(record, columns, &plan.computed, now))
                    .collect();

                let truncated =
                    total_count > plan.pagination.offset as u64 + rows.len() as u64;
                Ok(ReportResult::Rows(RowPage {
                    rows,
                    total_count,
                    truncated,
                    execution_duration_ms: observer.finish(),
                }))
            }
            PlanMode::Aggregate {
                group_by,
                aggregations,
            } => {
                let query = GroupQuery {
                    predicate: plan.predicate.clone(),
                    group_by: group_by.clone(),
                    aggregations: aggregations.clone(),
                    joins: plan.joins.clone(),
                };
                let groups = store
                    .group_by(org, &query)?
                    .into_iter()
                    .map(|group| GroupBucket {
                        key: group.key,
                        aggregates: group.aggregates,
                    })
                    .collect();
                Ok(ReportResult::Groups(GroupPage {
                    groups,
                    execution_duration_ms: observer.finish(),
                }))
            }
        }
    }
}

fn project_row(
    record: EntityRecord,
    columns: &[String],
    computed: &[(String, ComputedKind)],
    now: DateTime<Utc>,
) -> ReportRow {
    let mut row = ReportRow::new();
    for column in columns {
        if let Some((_, kind)) = computed.iter().find(|(field, _)| field == column) {
            row.insert(column.clone(), evaluate_computed(kind, &record, now));
        } else if let Some(value) = record.get(column) {
            row.insert(column.clone(), value.clone());
        }
    }
    row
}

fn evaluate_computed(kind: &ComputedKind, record: &EntityRecord, now: DateTime<Utc>) -> Value {
    let source = match record.get(kind.source_field()) {
        Some(Value::Timestamp(ts)) => *ts,
        _ => return Value::Null,
    };
    let days = match kind {
        ComputedKind::DaysSince { .. } => (now - source).num_days(),
        ComputedKind::DaysUntil { .. } => (source - now).num_days(),
    };
    Value::Int(days)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::{Duration, TimeZone};
    use reportql_proto::{
        Aggregation, EntityType, FilterCondition, Pagination, SortSpec,
    };

    fn engine_with(store: MemoryStore) -> ReportEngine {
        ReportEngine::new(
            Arc::new(FieldRegistry::without_custom_properties()),
            StoreRegistry::uniform(Arc::new(store)),
        )
    }

    fn case(id: &str, status: &str, severity: &str, cost: i64) -> EntityRecord {
        EntityRecord::new(id)
            .with("case_number", format!("C-{id}"))
            .with("status", status)
            .with("severity", severity)
            .with("remediation_cost", Value::Int(cost))
            .with(
                "created_at",
                Value::Timestamp(Utc.with_ymd_and_hms(2026, 1, 15, 9, 0, 0).unwrap()),
            )
    }

    #[test]
    fn test_list_report_filters_and_sorts() {
        let store = MemoryStore::new();
        store.insert_many(
            OrgId::new(1),
            vec![
                case("1", "open", "HIGH", 300),
                case("2", "open", "LOW", 100),
                case("3", "closed", "HIGH", 200),
            ],
        );
        let engine = engine_with(store);

        let spec = ReportQuerySpec::new(EntityType::Cases)
            .select("case_number")
            .select("remediation_cost")
            .with_clause(FilterCondition::eq("status", "open"))
            .with_sort(SortSpec::desc("remediation_cost"));

        let result = engine.run(OrgId::new(1), &spec).unwrap();
        let page = result.as_rows().unwrap();
        assert_eq!(page.total_count, 2);
        assert!(!page.truncated);
        assert_eq!(
            page.rows[0].get("case_number"),
            Some(&Value::from("C-1"))
        );
        assert_eq!(
            page.rows[1].get("case_number"),
            Some(&Value::from("C-2"))
        );
    }

    #[test]
    fn test_truncated_flag_when_limit_cuts_rows() {
        let store = MemoryStore::new();
        store.insert_many(
            OrgId::new(1),
            vec![
                case("1", "open", "HIGH", 300),
                case("2", "open", "LOW", 100),
                case("3", "open", "HIGH", 200),
            ],
        );
        let engine = engine_with(store);

        let spec = ReportQuerySpec::new(EntityType::Cases)
            .select("case_number")
            .with_pagination(Pagination::limit(2));

        let page = engine.run(OrgId::new(1), &spec).unwrap();
        let page = page.as_rows().unwrap();
        assert_eq!(page.rows.len(), 2);
        assert_eq!(page.total_count, 3);
        assert!(page.truncated);
    }

    #[test]
    fn test_computed_column_uses_single_clock() {
        let store = MemoryStore::new();
        let created = Utc::now() - Duration::days(10);
        store.insert(
            OrgId::new(1),
            EntityRecord::new("1")
                .with("case_number", "C-1")
                .with("created_at", Value::Timestamp(created)),
        );
        let engine = engine_with(store);

        let spec = ReportQuerySpec::new(EntityType::Cases)
            .select("case_number")
            .select("days_open");

        let page = engine.run(OrgId::new(1), &spec).unwrap();
        let page = page.as_rows().unwrap();
        assert_eq!(page.rows[0].get("days_open"), Some(&Value::Int(10)));
    }

    #[test]
    fn test_computed_column_null_without_source() {
        let store = MemoryStore::new();
        store.insert(
            OrgId::new(1),
            EntityRecord::new("1").with("case_number", "C-1"),
        );
        let engine = engine_with(store);

        let spec = ReportQuerySpec::new(EntityType::Cases)
            .select("case_number")
            .select("days_open");

        let page = engine.run(OrgId::new(1), &spec).unwrap();
        let page = page.as_rows().unwrap();
        assert_eq!(page.rows[0].get("days_open"), Some(&Value::Null));
    }

    #[test]
    fn test_grouped_report_buckets_and_counts() {
        let store = MemoryStore::new();
        store.insert_many(
            OrgId::new(1),
            vec![
                case("1", "open", "HIGH", 300),
                case("2", "open", "LOW", 100),
                case("3", "closed", "HIGH", 200),
            ],
        );
        let engine = engine_with(store);

        let spec = ReportQuerySpec::new(EntityType::Cases)
            .group_by("status")
            .with_aggregation(Aggregation::count())
            .with_aggregation(Aggregation::sum("remediation_cost"));

        let result = engine.run(OrgId::new(1), &spec).unwrap();
        let page = result.as_groups().unwrap();
        assert_eq!(page.groups.len(), 2);

        let open = page
            .groups
            .iter()
            .find(|g| g.key.get("status") == Some(&Value::from("open")))
            .unwrap();
        assert_eq!(open.count(), Some(2));
        assert_eq!(
            open.aggregates.get("remediation_cost_sum"),
            Some(&Value::Int(400))
        );
    }

    #[test]
    fn test_field_catalog_lists_static_fields() {
        let engine = engine_with(MemoryStore::new());
        let fields = engine
            .field_catalog(OrgId::new(1), EntityType::Cases)
            .unwrap();
        assert!(fields.iter().any(|f| f.field_id == "case_number"));
        assert!(fields.iter().any(|f| f.field_id == "days_open"));
    }

    #[test]
    fn test_validation_error_before_execution() {
        let engine = engine_with(MemoryStore::new());
        let spec = ReportQuerySpec::new(EntityType::Cases).select("not_a_field");

        let err = engine.run(OrgId::new(1), &spec).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_organizations_do_not_see_each_other() {
        let store = MemoryStore::new();
        store.insert(OrgId::new(1), case("1", "open", "HIGH", 300));
        let engine = engine_with(store);

        let spec = ReportQuerySpec::new(EntityType::Cases).select("case_number");
        let page = engine.run(OrgId::new(2), &spec).unwrap();
        assert_eq!(page.as_rows().unwrap().total_count, 0);
    }
}
