//! Report query specification types.
//!
//! A [`ReportQuerySpec`] is the client-authored description of one report
//! run. It arrives as untrusted JSON from the report-builder UI; filter
//! values stay as raw [`serde_json::Value`]s here and are coerced against
//! the field catalog during validation, before anything reaches storage.

use crate::entity::EntityType;
use serde::{Deserialize, Serialize};

/// Comparison operator in a filter condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterOperator {
    /// Field equals value.
    Eq,
    /// Field not equals value.
    Neq,
    /// Field greater than value.
    Gt,
    /// Field greater than or equal to value.
    Gte,
    /// Field less than value.
    Lt,
    /// Field less than or equal to value.
    Lte,
    /// Field contains substring (case-insensitive).
    Contains,
    /// Field is in a set of values.
    In,
    /// Field is not in a set of values.
    NotIn,
    /// Field is null or absent.
    IsNull,
    /// Field is present and non-null.
    IsNotNull,
    /// Field is within an inclusive range.
    Between,
}

impl FilterOperator {
    /// Whether this operator takes no value payload.
    pub fn is_nullary(&self) -> bool {
        matches!(self, FilterOperator::IsNull | FilterOperator::IsNotNull)
    }

    /// Whether this operator requires a totally ordered field type.
    pub fn requires_ordering(&self) -> bool {
        matches!(
            self,
            FilterOperator::Gt
                | FilterOperator::Gte
                | FilterOperator::Lt
                | FilterOperator::Lte
                | FilterOperator::Between
        )
    }

    /// The camelCase wire name of this operator.
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Eq => "eq",
            FilterOperator::Neq => "neq",
            FilterOperator::Gt => "gt",
            FilterOperator::Gte => "gte",
            FilterOperator::Lt => "lt",
            FilterOperator::Lte => "lte",
            FilterOperator::Contains => "contains",
            FilterOperator::In => "in",
            FilterOperator::NotIn => "notIn",
            FilterOperator::IsNull => "isNull",
            FilterOperator::IsNotNull => "isNotNull",
            FilterOperator::Between => "between",
        }
    }
}

impl std::fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One field comparison in a filter.
///
/// The `value` is raw client JSON; its shape depends on the operator
/// (scalar for `eq`, array for `in`, two-element array for `between`,
/// absent for `isNull`/`isNotNull`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCondition {
    /// Field id from the entity's catalog.
    pub field: String,
    /// Comparison operator.
    pub operator: FilterOperator,
    /// Raw comparison value, absent for nullary operators.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
}

impl FilterCondition {
    /// Create a condition with an explicit operator and value.
    pub fn new(
        field: impl Into<String>,
        operator: FilterOperator,
        value: serde_json::Value,
    ) -> Self {
        Self {
            field: field.into(),
            operator,
            value: Some(value),
        }
    }

    /// Create an equality condition.
    pub fn eq(field: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Self::new(field, FilterOperator::Eq, value.into())
    }

    /// Create a not-equal condition.
    pub fn neq(field: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Self::new(field, FilterOperator::Neq, value.into())
    }

    /// Create a greater-than condition.
    pub fn gt(field: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Self::new(field, FilterOperator::Gt, value.into())
    }

    /// Create a greater-than-or-equal condition.
    pub fn gte(field: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Self::new(field, FilterOperator::Gte, value.into())
    }

    /// Create a less-than condition.
    pub fn lt(field: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Self::new(field, FilterOperator::Lt, value.into())
    }

    /// Create a less-than-or-equal condition.
    pub fn lte(field: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Self::new(field, FilterOperator::Lte, value.into())
    }

    /// Create a substring-containment condition.
    pub fn contains(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, FilterOperator::Contains, value.into().into())
    }

    /// Create a set-membership condition.
    pub fn in_values(field: impl Into<String>, values: Vec<serde_json::Value>) -> Self {
        Self::new(field, FilterOperator::In, serde_json::Value::Array(values))
    }

    /// Create a negated set-membership condition.
    pub fn not_in_values(field: impl Into<String>, values: Vec<serde_json::Value>) -> Self {
        Self::new(field, FilterOperator::NotIn, serde_json::Value::Array(values))
    }

    /// Create an is-null condition.
    pub fn is_null(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            operator: FilterOperator::IsNull,
            value: None,
        }
    }

    /// Create an is-not-null condition.
    pub fn is_not_null(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            operator: FilterOperator::IsNotNull,
            value: None,
        }
    }

    /// Create an inclusive range condition.
    pub fn between(
        field: impl Into<String>,
        low: impl Into<serde_json::Value>,
        high: impl Into<serde_json::Value>,
    ) -> Self {
        Self::new(
            field,
            FilterOperator::Between,
            serde_json::Value::Array(vec![low.into(), high.into()]),
        )
    }
}

/// A disjunction of conditions.
///
/// The top-level filter of a [`ReportQuerySpec`] is a conjunction of
/// clauses; within one clause, any matching condition suffices. There is
/// no deeper nesting by design.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterClause {
    /// Conditions of which at least one must hold.
    pub any_of: Vec<FilterCondition>,
}

impl FilterClause {
    /// Create a clause from a set of alternative conditions.
    pub fn any_of(conditions: Vec<FilterCondition>) -> Self {
        Self { any_of: conditions }
    }

    /// Create a single-condition clause.
    pub fn single(condition: FilterCondition) -> Self {
        Self {
            any_of: vec![condition],
        }
    }
}

impl From<FilterCondition> for FilterClause {
    fn from(condition: FilterCondition) -> Self {
        Self::single(condition)
    }
}

/// Aggregate function types for grouped reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AggregateFunction {
    /// Count of rows in the group.
    Count,
    /// Sum of numeric values.
    Sum,
    /// Average of numeric values.
    Avg,
    /// Minimum value.
    Min,
    /// Maximum value.
    Max,
}

impl AggregateFunction {
    /// Whether this function requires a numeric target field.
    pub fn requires_numeric(&self) -> bool {
        matches!(self, AggregateFunction::Sum | AggregateFunction::Avg)
    }

    /// The lowercase name of this function, used in result keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregateFunction::Count => "count",
            AggregateFunction::Sum => "sum",
            AggregateFunction::Avg => "avg",
            AggregateFunction::Min => "min",
            AggregateFunction::Max => "max",
        }
    }
}

impl std::fmt::Display for AggregateFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single aggregation operation in a grouped report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Aggregation {
    /// Aggregate function to apply.
    pub function: AggregateFunction,
    /// Field to aggregate (None for row count).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl Aggregation {
    /// Create a row-count aggregation.
    pub fn count() -> Self {
        Self {
            function: AggregateFunction::Count,
            field: None,
        }
    }

    /// Create a SUM aggregation.
    pub fn sum(field: impl Into<String>) -> Self {
        Self {
            function: AggregateFunction::Sum,
            field: Some(field.into()),
        }
    }

    /// Create an AVG aggregation.
    pub fn avg(field: impl Into<String>) -> Self {
        Self {
            function: AggregateFunction::Avg,
            field: Some(field.into()),
        }
    }

    /// Create a MIN aggregation.
    pub fn min(field: impl Into<String>) -> Self {
        Self {
            function: AggregateFunction::Min,
            field: Some(field.into()),
        }
    }

    /// Create a MAX aggregation.
    pub fn max(field: impl Into<String>) -> Self {
        Self {
            function: AggregateFunction::Max,
            field: Some(field.into()),
        }
    }

    /// The key this aggregation's value appears under in result buckets.
    pub fn result_key(&self) -> String {
        match &self.field {
            Some(field) => format!("{}_{}", field, self.function),
            None => self.function.as_str().to_string(),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OrderDirection {
    /// Ascending order.
    Asc,
    /// Descending order.
    Desc,
}

/// Ordering specification for list-mode reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortSpec {
    /// Field to order by.
    pub field: String,
    /// Sort direction.
    pub direction: OrderDirection,
}

impl SortSpec {
    /// Create an ascending sort spec.
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: OrderDirection::Asc,
        }
    }

    /// Create a descending sort spec.
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: OrderDirection::Desc,
        }
    }
}

/// Pagination parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// Maximum number of rows to return.
    pub limit: u32,
    /// Number of rows to skip.
    pub offset: u32,
}

impl Pagination {
    /// Row limit applied when the client sends none.
    pub const DEFAULT_LIMIT: u32 = 1_000;
    /// Hard ceiling on the row limit; larger requests are clamped.
    pub const MAX_LIMIT: u32 = 10_000;

    /// Create pagination with limit and offset.
    pub fn new(limit: u32, offset: u32) -> Self {
        Self { limit, offset }
    }

    /// Create pagination with just a limit.
    pub fn limit(limit: u32) -> Self {
        Self { limit, offset: 0 }
    }

    /// Normalize the limit: zero falls back to [`Self::DEFAULT_LIMIT`],
    /// anything above [`Self::MAX_LIMIT`] is capped.
    pub fn clamped(self) -> Self {
        let limit = if self.limit == 0 {
            Self::DEFAULT_LIMIT
        } else {
            self.limit.min(Self::MAX_LIMIT)
        };
        Self {
            limit,
            offset: self.offset,
        }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: Self::DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

/// A client-authored report query.
///
/// When `group_by` is empty the report runs in list mode and returns rows;
/// otherwise it runs in aggregate mode and returns one bucket per distinct
/// grouping key combination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportQuerySpec {
    /// Entity type this report runs over.
    pub entity_type: EntityType,
    /// Field ids to return as columns (list mode).
    #[serde(default)]
    pub columns: Vec<String>,
    /// Filter clauses, all of which must hold.
    #[serde(default)]
    pub filter: Vec<FilterClause>,
    /// Grouping dimensions (aggregate mode when non-empty).
    #[serde(default)]
    pub group_by: Vec<String>,
    /// Aggregations to compute per group.
    #[serde(default)]
    pub aggregations: Vec<Aggregation>,
    /// Ordering specification (list mode).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortSpec>,
    /// Pagination parameters (list mode).
    #[serde(default)]
    pub pagination: Pagination,
}

impl ReportQuerySpec {
    /// Create a new report query for an entity type.
    pub fn new(entity_type: EntityType) -> Self {
        Self {
            entity_type,
            columns: vec![],
            filter: vec![],
            group_by: vec![],
            aggregations: vec![],
            sort: None,
            pagination: Pagination::default(),
        }
    }

    /// Set the columns to return.
    pub fn with_columns(mut self, columns: Vec<String>) -> Self {
        self.columns = columns;
        self
    }

    /// Add a column to return.
    pub fn select(mut self, field: impl Into<String>) -> Self {
        self.columns.push(field.into());
        self
    }

    /// Add a filter clause.
    pub fn with_clause(mut self, clause: impl Into<FilterClause>) -> Self {
        self.filter.push(clause.into());
        self
    }

    /// Add a grouping dimension.
    pub fn group_by(mut self, field: impl Into<String>) -> Self {
        self.group_by.push(field.into());
        self
    }

    /// Add an aggregation.
    pub fn with_aggregation(mut self, aggregation: Aggregation) -> Self {
        self.aggregations.push(aggregation);
        self
    }

    /// Set the ordering.
    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Set the pagination.
    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = pagination;
        self
    }

    /// Whether this query runs in aggregate mode.
    pub fn is_grouped(&self) -> bool {
        !self.group_by.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_list_query_builder() {
        let spec = ReportQuerySpec::new(EntityType::Cases)
            .select("case_number")
            .select("severity")
            .with_clause(FilterCondition::eq("severity", "HIGH"))
            .with_sort(SortSpec::desc("created_at"))
            .with_pagination(Pagination::limit(50));

        assert_eq!(spec.entity_type, EntityType::Cases);
        assert_eq!(spec.columns.len(), 2);
        assert_eq!(spec.filter.len(), 1);
        assert!(!spec.is_grouped());
        assert_eq!(spec.pagination.limit, 50);
    }

    #[test]
    fn test_grouped_query_builder() {
        let spec = ReportQuerySpec::new(EntityType::Cases)
            .with_clause(FilterCondition::eq("severity", "HIGH"))
            .group_by("status")
            .with_aggregation(Aggregation::count());

        assert!(spec.is_grouped());
        assert_eq!(spec.aggregations[0].result_key(), "count");
        assert_eq!(Aggregation::sum("amount").result_key(), "amount_sum");
    }

    #[test]
    fn test_clause_is_disjunction() {
        let clause = FilterClause::any_of(vec![
            FilterCondition::eq("status", "open"),
            FilterCondition::eq("status", "pending"),
        ]);
        assert_eq!(clause.any_of.len(), 2);
    }

    #[test]
    fn test_operator_predicates() {
        assert!(FilterOperator::IsNull.is_nullary());
        assert!(FilterOperator::IsNotNull.is_nullary());
        assert!(!FilterOperator::Eq.is_nullary());

        assert!(FilterOperator::Gt.requires_ordering());
        assert!(FilterOperator::Between.requires_ordering());
        assert!(!FilterOperator::Contains.requires_ordering());
    }

    #[test]
    fn test_pagination_clamp() {
        assert_eq!(Pagination::default().limit, 1_000);
        assert_eq!(Pagination::limit(50_000).clamped().limit, 10_000);
        assert_eq!(Pagination::limit(0).clamped().limit, 1_000);
        assert_eq!(Pagination::new(200, 400).clamped().offset, 400);
    }

    #[test]
    fn test_spec_deserializes_from_camel_case() {
        let spec: ReportQuerySpec = serde_json::from_value(json!({
            "entityType": "cases",
            "columns": ["case_number"],
            "filter": [
                {"anyOf": [{"field": "severity", "operator": "eq", "value": "HIGH"}]},
                {"anyOf": [{"field": "closed_at", "operator": "isNull"}]}
            ],
            "groupBy": ["status"],
            "aggregations": [{"function": "count"}]
        }))
        .unwrap();

        assert_eq!(spec.entity_type, EntityType::Cases);
        assert_eq!(spec.filter.len(), 2);
        assert_eq!(spec.filter[1].any_of[0].operator, FilterOperator::IsNull);
        assert!(spec.filter[1].any_of[0].value.is_none());
        assert_eq!(spec.pagination.limit, Pagination::DEFAULT_LIMIT);
    }

    #[test]
    fn test_between_condition_shape() {
        let cond = FilterCondition::between("created_at", "2026-01-01", "2026-01-31");
        let arr = cond.value.as_ref().unwrap().as_array().unwrap();
        assert_eq!(arr.len(), 2);
        assert_eq!(cond.operator.as_str(), "between");
    }
}
