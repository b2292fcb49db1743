//! In-memory backend, used as the reference implementation and by tests.
//!
//! Rows live in a per-organization table behind an `RwLock`. Relation
//! hops are not resolved here; joined field values are stored flat under
//! their dotted field ids when rows are inserted.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use parking_lot::RwLock;

use crate::query::predicate::{compare_values, Predicate};
use crate::store::{EntityQuery, EntityRecord, GroupQuery, GroupRow, RowQuery, StoreError};
use crate::tenant::OrgId;
use reportql_proto::{AggregateFunction, Aggregation, OrderDirection, SortSpec, Value};

/// In-memory entity table.
#[derive(Default)]
pub struct MemoryStore {
    rows: RwLock<HashMap<OrgId, Vec<EntityRecord>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert one row for an organization.
    pub fn insert(&self, org: OrgId, record: EntityRecord) {
        self.rows.write().entry(org).or_default().push(record);
    }

    /// Insert a batch of rows for an organization.
    pub fn insert_many(&self, org: OrgId, records: impl IntoIterator<Item = EntityRecord>) {
        self.rows.write().entry(org).or_default().extend(records);
    }

    /// Total rows stored for an organization.
    pub fn row_count(&self, org: OrgId) -> usize {
        self.rows.read().get(&org).map_or(0, Vec::len)
    }

    fn matching(&self, org: OrgId, predicate: &Predicate) -> Vec<EntityRecord> {
        self.rows
            .read()
            .get(&org)
            .map(|rows| {
                rows.iter()
                    .filter(|row| predicate.matches(row))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl EntityQuery for MemoryStore {
    fn find_many(&self, org: OrgId, query: &RowQuery) -> Result<Vec<EntityRecord>, StoreError> {
        let mut rows = self.matching(org, &query.predicate);
        if let Some(sort) = &query.sort {
            sort_rows(&mut rows, sort);
        }

        let offset = query.pagination.offset as usize;
        let limit = query.pagination.limit as usize;
        let rows = rows
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|row| project(row, &query.fields))
            .collect();
        Ok(rows)
    }

    fn count(&self, org: OrgId, predicate: &Predicate) -> Result<u64, StoreError> {
        let count = self
            .rows
            .read()
            .get(&org)
            .map_or(0, |rows| rows.iter().filter(|row| predicate.matches(row)).count());
        Ok(count as u64)
    }

    fn group_by(&self, org: OrgId, query: &GroupQuery) -> Result<Vec<GroupRow>, StoreError> {
        let rows = self.matching(org, &query.predicate);

        // Buckets keyed by the serialized dimension map so that
        // `(status=open, severity=null)` collapses deterministically.
        let mut buckets: BTreeMap<String, (BTreeMap<String, Value>, Vec<EntityRecord>)> =
            BTreeMap::new();
        for row in rows {
            let mut key = BTreeMap::new();
            for dimension in &query.group_by {
                let value = row.get(dimension).cloned().unwrap_or(Value::Null);
                key.insert(dimension.clone(), value);
            }
            let serialized = serde_json::to_string(&key)
                .map_err(|e| StoreError::Backend(format!("group key serialization: {e}")))?;
            buckets.entry(serialized).or_insert_with(|| (key, vec![])).1.push(row);
        }

        let mut groups = Vec::with_capacity(buckets.len());
        for (_, (key, members)) in buckets {
            let mut aggregates = BTreeMap::new();
            for aggregation in &query.aggregations {
                aggregates.insert(aggregation.result_key(), aggregate(aggregation, &members));
            }
            groups.push(GroupRow { key, aggregates });
        }
        Ok(groups)
    }
}

fn project(row: EntityRecord, fields: &[String]) -> EntityRecord {
    if fields.is_empty() {
        return row;
    }
    let mut projected = EntityRecord::new(row.id);
    for field in fields {
        if let Some(value) = row.fields.get(field) {
            projected.insert(field.clone(), value.clone());
        }
    }
    projected
}

/// Stable sort with null and missing values last, in either direction.
fn sort_rows(rows: &mut [EntityRecord], sort: &SortSpec) {
    let descending = sort.direction == OrderDirection::Desc;
    rows.sort_by(|a, b| {
        let left = a.get(&sort.field).filter(|v| !matches!(v, Value::Null));
        let right = b.get(&sort.field).filter(|v| !matches!(v, Value::Null));
        match (left, right) {
            (Some(x), Some(y)) => {
                let ordering = compare_values(x, y).unwrap_or(Ordering::Equal);
                if descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            }
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    });
}

fn aggregate(aggregation: &Aggregation, members: &[EntityRecord]) -> Value {
    let values = || {
        members.iter().filter_map(|row| {
            aggregation
                .field
                .as_deref()
                .and_then(|field| row.get(field))
                .filter(|v| !matches!(v, Value::Null))
        })
    };

    match aggregation.function {
        AggregateFunction::Count => match aggregation.field {
            Some(_) => Value::Int(values().count() as i64),
            None => Value::Int(members.len() as i64),
        },
        AggregateFunction::Sum => {
            let mut sum = 0.0;
            let mut all_int = true;
            for value in values() {
                match value {
                    Value::Int(n) => sum += *n as f64,
                    Value::Float(f) => {
                        sum += f;
                        all_int = false;
                    }
                    _ => {}
                }
            }
            if all_int {
                Value::Int(sum as i64)
            } else {
                Value::Float(sum)
            }
        }
        AggregateFunction::Avg => {
            let mut sum = 0.0;
            let mut count = 0u64;
            for value in values() {
                match value {
                    Value::Int(n) => {
                        sum += *n as f64;
                        count += 1;
                    }
                    Value::Float(f) => {
                        sum += f;
                        count += 1;
                    }
                    _ => {}
                }
            }
            if count == 0 {
                Value::Null
            } else {
                Value::Float(sum / count as f64)
            }
        }
        AggregateFunction::Min => fold_extreme(values(), Ordering::Less),
        AggregateFunction::Max => fold_extreme(values(), Ordering::Greater),
    }
}

fn fold_extreme<'a>(values: impl Iterator<Item = &'a Value>, keep: Ordering) -> Value {
    let mut extreme: Option<&Value> = None;
    for value in values {
        extreme = match extreme {
            None => Some(value),
            Some(current) => match compare_values(value, current) {
                Some(ordering) if ordering == keep => Some(value),
                _ => Some(current),
            },
        };
    }
    extreme.cloned().unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::predicate::Condition;
    use reportql_proto::Pagination;

    fn org() -> OrgId {
        OrgId::new(1)
    }

    fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        store.insert_many(
            org(),
            vec![
                EntityRecord::new("c1")
                    .with("status", "open")
                    .with("severity", "HIGH")
                    .with("remediation_cost", Value::Int(100)),
                EntityRecord::new("c2")
                    .with("status", "open")
                    .with("severity", "LOW")
                    .with("remediation_cost", Value::Int(40)),
                EntityRecord::new("c3")
                    .with("status", "closed")
                    .with("severity", "HIGH"),
            ],
        );
        store
    }

    fn status_open() -> Predicate {
        Predicate::new(vec![vec![Condition::Eq {
            field: "status".into(),
            value: "open".into(),
        }]])
    }

    fn row_query(predicate: Predicate) -> RowQuery {
        RowQuery {
            predicate,
            fields: vec!["status".into(), "remediation_cost".into()],
            joins: vec![],
            sort: None,
            pagination: Pagination::default(),
        }
    }

    #[test]
    fn test_find_many_filters_and_projects() {
        let store = seeded();
        let rows = store.find_many(org(), &row_query(status_open())).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].get("severity").is_none());
        assert_eq!(rows[0].get("status"), Some(&Value::from("open")));
    }

    #[test]
    fn test_count_ignores_pagination() {
        let store = seeded();
        let mut query = row_query(status_open());
        query.pagination = Pagination::new(1, 0);
        assert_eq!(store.find_many(org(), &query).unwrap().len(), 1);
        assert_eq!(store.count(org(), &query.predicate).unwrap(), 2);
    }

    #[test]
    fn test_sort_puts_missing_values_last() {
        let store = seeded();
        let mut query = row_query(Predicate::always());
        query.fields = vec!["remediation_cost".into()];
        query.sort = Some(SortSpec::desc("remediation_cost"));

        let rows = store.find_many(org(), &query).unwrap();
        assert_eq!(rows[0].get("remediation_cost"), Some(&Value::Int(100)));
        assert_eq!(rows[1].get("remediation_cost"), Some(&Value::Int(40)));
        assert!(rows[2].get("remediation_cost").is_none());
    }

    #[test]
    fn test_rows_are_tenant_scoped() {
        let store = seeded();
        let other = OrgId::new(99);
        assert!(store.find_many(other, &row_query(Predicate::always())).unwrap().is_empty());
        assert_eq!(store.count(other, &Predicate::always()).unwrap(), 0);
    }

    #[test]
    fn test_group_by_counts_and_sums() {
        let store = seeded();
        let query = GroupQuery {
            predicate: Predicate::always(),
            group_by: vec!["status".into()],
            aggregations: vec![Aggregation::count(), Aggregation::sum("remediation_cost")],
            joins: vec![],
        };

        let groups = store.group_by(org(), &query).unwrap();
        assert_eq!(groups.len(), 2);

        let open = groups
            .iter()
            .find(|g| g.key.get("status") == Some(&Value::from("open")))
            .unwrap();
        assert_eq!(open.aggregates.get("count"), Some(&Value::Int(2)));
        assert_eq!(
            open.aggregates.get("remediation_cost_sum"),
            Some(&Value::Int(140))
        );

        let closed = groups
            .iter()
            .find(|g| g.key.get("status") == Some(&Value::from("closed")))
            .unwrap();
        assert_eq!(closed.aggregates.get("count"), Some(&Value::Int(1)));
        assert_eq!(
            closed.aggregates.get("remediation_cost_sum"),
            Some(&Value::Int(0))
        );
    }

    #[test]
    fn test_avg_skips_missing_values() {
        let store = seeded();
        let query = GroupQuery {
            predicate: Predicate::always(),
            group_by: vec![],
            aggregations: vec![Aggregation::avg("remediation_cost")],
            joins: vec![],
        };

        let groups = store.group_by(org(), &query).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(
            groups[0].aggregates.get("remediation_cost_avg"),
            Some(&Value::Float(70.0))
        );
    }

    #[test]
    fn test_avg_of_no_values_is_null() {
        let store = MemoryStore::new();
        store.insert(org(), EntityRecord::new("r1").with("status", "open"));
        let query = GroupQuery {
            predicate: Predicate::always(),
            group_by: vec!["status".into()],
            aggregations: vec![Aggregation::avg("remediation_cost")],
            joins: vec![],
        };

        let groups = store.group_by(org(), &query).unwrap();
        assert_eq!(
            groups[0].aggregates.get("remediation_cost_avg"),
            Some(&Value::Null)
        );
    }

    #[test]
    fn test_min_max_over_mixed_presence() {
        let store = seeded();
        let query = GroupQuery {
            predicate: Predicate::always(),
            group_by: vec![],
            aggregations: vec![
                Aggregation::min("remediation_cost"),
                Aggregation::max("remediation_cost"),
            ],
            joins: vec![],
        };

        let groups = store.group_by(org(), &query).unwrap();
        assert_eq!(
            groups[0].aggregates.get("remediation_cost_min"),
            Some(&Value::Int(40))
        );
        assert_eq!(
            groups[0].aggregates.get("remediation_cost_max"),
            Some(&Value::Int(100))
        );
    }

    #[test]
    fn test_missing_dimension_groups_under_null() {
        let store = MemoryStore::new();
        store.insert_many(
            org(),
            vec![
                EntityRecord::new("r1").with("status", "open"),
                EntityRecord::new("r2"),
            ],
        );
        let query = GroupQuery {
            predicate: Predicate::always(),
            group_by: vec!["status".into()],
            aggregations: vec![Aggregation::count()],
            joins: vec![],
        };

        let groups = store.group_by(org(), &query).unwrap();
        assert_eq!(groups.len(), 2);
        assert!(groups
            .iter()
            .any(|g| g.key.get("status") == Some(&Value::Null)));
    }
}
