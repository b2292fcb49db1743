//! Builds typed predicates from client filter clauses.
//!
//! Every condition is checked against the resolved catalog before any
//! storage access: the field must exist and be filterable, the operator
//! must fit the field's data type, and the raw JSON value must coerce to
//! a typed [`Value`]. Nothing is silently dropped; the first violation
//! fails the whole filter.

use chrono::{DateTime, NaiveDate, Utc};

use crate::catalog::EntityTypeCatalog;
use crate::error::Error;
use crate::query::predicate::{Condition, Predicate};
use reportql_proto::{
    DataType, FieldDescriptor, FilterClause, FilterCondition, FilterOperator, Value,
};

/// Which end of a day a date-only literal should resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DayBound {
    Start,
    End,
}

/// Build a predicate from client filter clauses, validating every
/// condition against the catalog.
pub fn build_predicate(
    catalog: &EntityTypeCatalog,
    filter: &[FilterClause],
) -> Result<Predicate, Error> {
    let mut clauses = Vec::with_capacity(filter.len());
    for clause in filter {
        if clause.any_of.is_empty() {
            return Err(Error::EmptyFilterClause);
        }
        let mut conditions = Vec::with_capacity(clause.any_of.len());
        for condition in &clause.any_of {
            conditions.push(build_condition(catalog, condition)?);
        }
        clauses.push(conditions);
    }
    Ok(Predicate::new(clauses))
}

fn build_condition(
    catalog: &EntityTypeCatalog,
    condition: &FilterCondition,
) -> Result<Condition, Error> {
    let descriptor = catalog
        .field(&condition.field)
        .ok_or_else(|| Error::UnknownField {
            entity: catalog.entity_type(),
            field: condition.field.clone(),
        })?;
    if !descriptor.capabilities.filterable {
        return Err(Error::NotFilterable {
            field: condition.field.clone(),
        });
    }

    let operator = condition.operator;
    if operator.requires_ordering() && !descriptor.data_type.is_ordered() {
        return Err(Error::InvalidOperator {
            field: condition.field.clone(),
            operator,
            data_type: descriptor.data_type,
        });
    }
    if operator == FilterOperator::Contains && descriptor.data_type != DataType::String {
        return Err(Error::InvalidOperator {
            field: condition.field.clone(),
            operator,
            data_type: descriptor.data_type,
        });
    }

    if operator.is_nullary() {
        if condition.value.is_some() {
            return Err(Error::InvalidValue {
                field: condition.field.clone(),
                reason: format!("operator '{operator}' takes no value"),
            });
        }
        return Ok(match operator {
            FilterOperator::IsNull => Condition::IsNull {
                field: condition.field.clone(),
            },
            _ => Condition::IsNotNull {
                field: condition.field.clone(),
            },
        });
    }

    let raw = condition.value.as_ref().ok_or_else(|| Error::InvalidValue {
        field: condition.field.clone(),
        reason: format!("operator '{operator}' requires a value"),
    })?;

    let field = condition.field.clone();
    match operator {
        FilterOperator::Eq => Ok(Condition::Eq {
            value: coerce_scalar(descriptor, raw, DayBound::Start)?,
            field,
        }),
        FilterOperator::Neq => Ok(Condition::Neq {
            value: coerce_scalar(descriptor, raw, DayBound::Start)?,
            field,
        }),
        FilterOperator::Gt => Ok(Condition::Gt {
            value: coerce_scalar(descriptor, raw, DayBound::Start)?,
            field,
        }),
        FilterOperator::Gte => Ok(Condition::Gte {
            value: coerce_scalar(descriptor, raw, DayBound::Start)?,
            field,
        }),
        FilterOperator::Lt => Ok(Condition::Lt {
            value: coerce_scalar(descriptor, raw, DayBound::Start)?,
            field,
        }),
        // A date-only bound on lte means "through that day".
        FilterOperator::Lte => Ok(Condition::Lte {
            value: coerce_scalar(descriptor, raw, DayBound::End)?,
            field,
        }),
        FilterOperator::Contains => match raw.as_str() {
            Some(needle) => Ok(Condition::Contains {
                needle: needle.to_string(),
                field,
            }),
            None => Err(Error::InvalidValue {
                field,
                reason: "contains requires a string".into(),
            }),
        },
        FilterOperator::In | FilterOperator::NotIn => {
            let items = raw.as_array().ok_or_else(|| Error::InvalidValue {
                field: field.clone(),
                reason: format!("operator '{operator}' requires an array of values"),
            })?;
            if items.is_empty() {
                return Err(Error::InvalidValue {
                    field,
                    reason: format!("operator '{operator}' requires a non-empty array"),
                });
            }
            let values = items
                .iter()
                .map(|item| coerce_scalar(descriptor, item, DayBound::Start))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(if operator == FilterOperator::In {
                Condition::In { field, values }
            } else {
                Condition::NotIn { field, values }
            })
        }
        FilterOperator::Between => {
            let items = raw.as_array().ok_or_else(|| Error::InvalidValue {
                field: field.clone(),
                reason: "between requires a two-element array".into(),
            })?;
            let [low, high] = items.as_slice() else {
                return Err(Error::InvalidValue {
                    field,
                    reason: format!("between requires exactly two values, got {}", items.len()),
                });
            };
            Ok(Condition::Between {
                low: coerce_scalar(descriptor, low, DayBound::Start)?,
                high: coerce_scalar(descriptor, high, DayBound::End)?,
                field,
            })
        }
        FilterOperator::IsNull | FilterOperator::IsNotNull => unreachable!("handled above"),
    }
}

/// Coerce a raw JSON scalar to the field's data type.
fn coerce_scalar(
    descriptor: &FieldDescriptor,
    raw: &serde_json::Value,
    bound: DayBound,
) -> Result<Value, Error> {
    let field = &descriptor.field_id;
    match descriptor.data_type {
        DataType::String | DataType::Enum => match raw.as_str() {
            Some(s) => Ok(Value::String(s.to_string())),
            None => Err(coercion_error(field, raw, "a string")),
        },
        DataType::Number | DataType::Currency => {
            if let Some(i) = raw.as_i64() {
                Ok(Value::Int(i))
            } else if let Some(f) = raw.as_f64() {
                Ok(Value::Float(f))
            } else {
                Err(coercion_error(field, raw, "a number"))
            }
        }
        DataType::Boolean => match raw.as_bool() {
            Some(b) => Ok(Value::Bool(b)),
            None => Err(coercion_error(field, raw, "a boolean")),
        },
        DataType::Date => match raw.as_str() {
            Some(s) => parse_date(field, s, bound),
            None => Err(coercion_error(field, raw, "a date string")),
        },
    }
}

/// Parse an RFC 3339 timestamp or a `YYYY-MM-DD` date.
///
/// A date-only literal resolves to midnight, or to the last instant of
/// the day when it is the upper bound of a range, so calendar ranges are
/// inclusive on both ends.
fn parse_date(field: &str, s: &str, bound: DayBound) -> Result<Value, Error> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(s) {
        return Ok(Value::Timestamp(timestamp.with_timezone(&Utc)));
    }
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| Error::InvalidValue {
        field: field.to_string(),
        reason: format!("'{s}' is not an RFC 3339 timestamp or YYYY-MM-DD date"),
    })?;
    let naive = match bound {
        DayBound::Start => date.and_hms_opt(0, 0, 0),
        DayBound::End => date.and_hms_milli_opt(23, 59, 59, 999),
    }
    .ok_or_else(|| Error::InvalidValue {
        field: field.to_string(),
        reason: format!("'{s}' is out of range"),
    })?;
    Ok(Value::Timestamp(naive.and_utc()))
}

fn coercion_error(field: &str, raw: &serde_json::Value, expected: &str) -> Error {
    Error::InvalidValue {
        field: field.to_string(),
        reason: format!("expected {expected}, got {}", json_type_name(raw)),
    }
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::static_fields;
    use chrono::TimeZone;
    use reportql_proto::EntityType;
    use serde_json::json;

    fn cases_catalog() -> EntityTypeCatalog {
        EntityTypeCatalog::new(EntityType::Cases, static_fields(EntityType::Cases).to_vec())
    }

    fn single(condition: FilterCondition) -> Vec<FilterClause> {
        vec![FilterClause::single(condition)]
    }

    #[test]
    fn test_simple_filter_builds() {
        let catalog = cases_catalog();
        let predicate =
            build_predicate(&catalog, &single(FilterCondition::eq("severity", "HIGH"))).unwrap();

        assert_eq!(predicate.clause_count(), 1);
        assert_eq!(
            predicate.clauses()[0][0],
            Condition::Eq {
                field: "severity".into(),
                value: Value::String("HIGH".into()),
            }
        );
    }

    #[test]
    fn test_unknown_field_rejected() {
        let catalog = cases_catalog();
        let err = build_predicate(&catalog, &single(FilterCondition::eq("salary", 1)))
            .unwrap_err();
        match err {
            Error::UnknownField { field, entity } => {
                assert_eq!(field, "salary");
                assert_eq!(entity, EntityType::Cases);
            }
            other => panic!("expected UnknownField, got {other:?}"),
        }
    }

    #[test]
    fn test_unfilterable_field_rejected() {
        let catalog = cases_catalog();
        // days_open is computed and carries no filter capability
        let err = build_predicate(&catalog, &single(FilterCondition::gt("days_open", 30)))
            .unwrap_err();
        assert!(matches!(err, Error::NotFilterable { .. }));
    }

    #[test]
    fn test_operator_type_matrix() {
        let catalog = cases_catalog();

        // ordering on an enum
        let err = build_predicate(&catalog, &single(FilterCondition::gt("severity", "LOW")))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidOperator { .. }));

        // contains on a boolean
        let err = build_predicate(
            &catalog,
            &single(FilterCondition::contains("is_anonymous", "tr")),
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidOperator { .. }));

        // between on a string
        let err = build_predicate(
            &catalog,
            &single(FilterCondition::between("title", "a", "b")),
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidOperator { .. }));

        // ordering on currency is fine
        assert!(build_predicate(
            &catalog,
            &single(FilterCondition::gte("remediation_cost", 1000))
        )
        .is_ok());
    }

    #[test]
    fn test_nullary_operator_rejects_value() {
        let catalog = cases_catalog();
        let condition = FilterCondition::new("closed_at", FilterOperator::IsNull, json!(true));
        let err = build_predicate(&catalog, &single(condition)).unwrap_err();
        assert!(matches!(err, Error::InvalidValue { .. }));

        assert!(
            build_predicate(&catalog, &single(FilterCondition::is_null("closed_at"))).is_ok()
        );
    }

    #[test]
    fn test_value_coercion_failures() {
        let catalog = cases_catalog();

        let err = build_predicate(&catalog, &single(FilterCondition::eq("severity", 5)))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidValue { .. }));

        let err = build_predicate(
            &catalog,
            &single(FilterCondition::eq("created_at", "not-a-date")),
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidValue { .. }));

        let err = build_predicate(
            &catalog,
            &single(FilterCondition::new(
                "severity",
                FilterOperator::In,
                json!("HIGH"),
            )),
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidValue { .. }));
    }

    #[test]
    fn test_between_date_extends_upper_bound() {
        let catalog = cases_catalog();
        let predicate = build_predicate(
            &catalog,
            &single(FilterCondition::between(
                "created_at",
                "2026-01-01",
                "2026-01-31",
            )),
        )
        .unwrap();

        let Condition::Between { low, high, .. } = &predicate.clauses()[0][0] else {
            panic!("expected Between");
        };
        assert_eq!(
            low.as_timestamp().unwrap(),
            Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
        );
        let high = high.as_timestamp().unwrap();
        assert_eq!(
            high,
            Utc.with_ymd_and_hms(2026, 1, 31, 23, 59, 59).unwrap()
                + chrono::Duration::milliseconds(999)
        );
    }

    #[test]
    fn test_between_arity_checked() {
        let catalog = cases_catalog();
        let condition = FilterCondition::new(
            "created_at",
            FilterOperator::Between,
            json!(["2026-01-01"]),
        );
        let err = build_predicate(&catalog, &single(condition)).unwrap_err();
        assert!(matches!(err, Error::InvalidValue { .. }));
    }

    #[test]
    fn test_rfc3339_accepted() {
        let catalog = cases_catalog();
        let predicate = build_predicate(
            &catalog,
            &single(FilterCondition::gte("created_at", "2026-03-01T12:30:00Z")),
        )
        .unwrap();

        let Condition::Gte { value, .. } = &predicate.clauses()[0][0] else {
            panic!("expected Gte");
        };
        assert_eq!(
            value.as_timestamp().unwrap(),
            Utc.with_ymd_and_hms(2026, 3, 1, 12, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_empty_clause_rejected() {
        let catalog = cases_catalog();
        let err = build_predicate(&catalog, &[FilterClause { any_of: vec![] }]).unwrap_err();
        assert!(matches!(err, Error::EmptyFilterClause));
    }

    #[test]
    fn test_empty_in_list_rejected() {
        let catalog = cases_catalog();
        let err = build_predicate(
            &catalog,
            &single(FilterCondition::in_values("severity", vec![])),
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidValue { .. }));
    }
}
