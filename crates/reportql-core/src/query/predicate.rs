//! Typed filter predicates and row evaluation.
//!
//! A [`Predicate`] is the validated, coerced form of a client filter: a
//! conjunction of clauses, each a disjunction of [`Condition`]s. Storage
//! backends receive predicates as-is; the in-memory backend evaluates
//! them with [`Predicate::matches`].

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::store::EntityRecord;
use reportql_proto::Value;

/// One typed field comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Field equals value.
    Eq {
        /// Target field id.
        field: String,
        /// Comparison value.
        value: Value,
    },
    /// Field not equals value.
    Neq {
        /// Target field id.
        field: String,
        /// Comparison value.
        value: Value,
    },
    /// Field greater than value.
    Gt {
        /// Target field id.
        field: String,
        /// Comparison value.
        value: Value,
    },
    /// Field greater than or equal to value.
    Gte {
        /// Target field id.
        field: String,
        /// Comparison value.
        value: Value,
    },
    /// Field less than value.
    Lt {
        /// Target field id.
        field: String,
        /// Comparison value.
        value: Value,
    },
    /// Field less than or equal to value.
    Lte {
        /// Target field id.
        field: String,
        /// Comparison value.
        value: Value,
    },
    /// Field contains substring, case-insensitive.
    Contains {
        /// Target field id.
        field: String,
        /// Substring to search for.
        needle: String,
    },
    /// Field is in a set of values.
    In {
        /// Target field id.
        field: String,
        /// Allowed values.
        values: Vec<Value>,
    },
    /// Field is not in a set of values.
    NotIn {
        /// Target field id.
        field: String,
        /// Excluded values.
        values: Vec<Value>,
    },
    /// Field is null or absent.
    IsNull {
        /// Target field id.
        field: String,
    },
    /// Field is present and non-null.
    IsNotNull {
        /// Target field id.
        field: String,
    },
    /// Field is within an inclusive range.
    Between {
        /// Target field id.
        field: String,
        /// Lower bound, inclusive.
        low: Value,
        /// Upper bound, inclusive.
        high: Value,
    },
}

impl Condition {
    /// The field id this condition targets.
    pub fn field(&self) -> &str {
        match self {
            Condition::Eq { field, .. }
            | Condition::Neq { field, .. }
            | Condition::Gt { field, .. }
            | Condition::Gte { field, .. }
            | Condition::Lt { field, .. }
            | Condition::Lte { field, .. }
            | Condition::Contains { field, .. }
            | Condition::In { field, .. }
            | Condition::NotIn { field, .. }
            | Condition::IsNull { field }
            | Condition::IsNotNull { field }
            | Condition::Between { field, .. } => field,
        }
    }

    /// Evaluate this condition against a record.
    ///
    /// A missing field never matches, with two exceptions: `NotIn` treats
    /// an absent value as outside every set, and `IsNull` treats absence
    /// as null.
    pub fn matches(&self, record: &EntityRecord) -> bool {
        match self {
            Condition::Eq { field, value } => {
                Self::compare(record, field, |fv| values_equal(fv, value))
            }
            Condition::Neq { field, value } => {
                Self::compare(record, field, |fv| !values_equal(fv, value))
            }
            Condition::Gt { field, value } => Self::compare(record, field, |fv| {
                compare_values(fv, value).map(Ordering::is_gt).unwrap_or(false)
            }),
            Condition::Gte { field, value } => Self::compare(record, field, |fv| {
                compare_values(fv, value).map(Ordering::is_ge).unwrap_or(false)
            }),
            Condition::Lt { field, value } => Self::compare(record, field, |fv| {
                compare_values(fv, value).map(Ordering::is_lt).unwrap_or(false)
            }),
            Condition::Lte { field, value } => Self::compare(record, field, |fv| {
                compare_values(fv, value).map(Ordering::is_le).unwrap_or(false)
            }),
            Condition::Contains { field, needle } => Self::compare(record, field, |fv| match fv {
                Value::String(s) => s.to_lowercase().contains(&needle.to_lowercase()),
                _ => false,
            }),
            Condition::In { field, values } => match record.get(field) {
                Some(fv) => values.iter().any(|v| values_equal(fv, v)),
                None => false,
            },
            Condition::NotIn { field, values } => match record.get(field) {
                Some(fv) => !values.iter().any(|v| values_equal(fv, v)),
                None => true, // an absent value is in no set
            },
            Condition::IsNull { field } => {
                matches!(record.get(field), None | Some(Value::Null))
            }
            Condition::IsNotNull { field } => {
                !matches!(record.get(field), None | Some(Value::Null))
            }
            Condition::Between { field, low, high } => Self::compare(record, field, |fv| {
                let above = compare_values(fv, low).map(Ordering::is_ge).unwrap_or(false);
                let below = compare_values(fv, high).map(Ordering::is_le).unwrap_or(false);
                above && below
            }),
        }
    }

    fn compare<F>(record: &EntityRecord, field: &str, check: F) -> bool
    where
        F: FnOnce(&Value) -> bool,
    {
        match record.get(field) {
            Some(Value::Null) | None => false,
            Some(fv) => check(fv),
        }
    }
}

/// A validated filter: AND of clauses, OR within a clause.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Predicate {
    clauses: Vec<Vec<Condition>>,
}

impl Predicate {
    /// The always-true predicate.
    pub fn always() -> Self {
        Self::default()
    }

    /// Create a predicate from clauses. Every clause must be non-empty.
    pub fn new(clauses: Vec<Vec<Condition>>) -> Self {
        debug_assert!(clauses.iter().all(|c| !c.is_empty()));
        Self { clauses }
    }

    /// The clauses, outer ANDed, inner ORed.
    pub fn clauses(&self) -> &[Vec<Condition>] {
        &self.clauses
    }

    /// Number of clauses.
    pub fn clause_count(&self) -> usize {
        self.clauses.len()
    }

    /// Whether this predicate matches everything.
    pub fn is_always(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Evaluate the predicate against a record.
    pub fn matches(&self, record: &EntityRecord) -> bool {
        self.clauses
            .iter()
            .all(|clause| clause.iter().any(|condition| condition.matches(record)))
    }

    /// All field ids referenced anywhere in the predicate.
    pub fn referenced_fields(&self) -> HashSet<&str> {
        self.clauses
            .iter()
            .flatten()
            .map(Condition::field)
            .collect()
    }
}

/// Check two values for equality, widening across integer and float.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Int(a), Value::Int(b)) => a == b,
        (Value::Float(a), Value::Float(b)) => a == b,
        (Value::Int(a), Value::Float(b)) => (*a as f64) == *b,
        (Value::Float(a), Value::Int(b)) => *a == (*b as f64),
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Timestamp(a), Value::Timestamp(b)) => a == b,
        _ => false,
    }
}

/// Compare two values, returning their ordering if comparable.
pub fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
        (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
        (Value::Int(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
        (Value::Float(a), Value::Int(b)) => a.partial_cmp(&(*b as f64)),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Timestamp(a), Value::Timestamp(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn record(fields: Vec<(&str, Value)>) -> EntityRecord {
        let mut rec = EntityRecord::new("r1");
        for (name, value) in fields {
            rec.insert(name, value);
        }
        rec
    }

    #[test]
    fn test_eq_and_neq() {
        let rec = record(vec![("severity", "HIGH".into()), ("score", Value::Int(7))]);

        assert!(Condition::Eq {
            field: "severity".into(),
            value: "HIGH".into()
        }
        .matches(&rec));
        assert!(!Condition::Eq {
            field: "severity".into(),
            value: "LOW".into()
        }
        .matches(&rec));
        assert!(Condition::Neq {
            field: "score".into(),
            value: Value::Int(9)
        }
        .matches(&rec));
    }

    #[test]
    fn test_ordering_conditions() {
        let rec = record(vec![("score", Value::Int(75))]);

        assert!(Condition::Gt {
            field: "score".into(),
            value: Value::Int(50)
        }
        .matches(&rec));
        assert!(!Condition::Gt {
            field: "score".into(),
            value: Value::Int(75)
        }
        .matches(&rec));
        assert!(Condition::Gte {
            field: "score".into(),
            value: Value::Int(75)
        }
        .matches(&rec));
        assert!(Condition::Lte {
            field: "score".into(),
            value: Value::Float(75.0)
        }
        .matches(&rec));
    }

    #[test]
    fn test_between_is_inclusive() {
        let low = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let high = Utc.with_ymd_and_hms(2026, 1, 31, 23, 59, 59).unwrap();

        let on_low = record(vec![("created_at", Value::Timestamp(low))]);
        let on_high = record(vec![("created_at", Value::Timestamp(high))]);
        let outside = record(vec![(
            "created_at",
            Value::Timestamp(Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap()),
        )]);

        let condition = Condition::Between {
            field: "created_at".into(),
            low: Value::Timestamp(low),
            high: Value::Timestamp(high),
        };
        assert!(condition.matches(&on_low));
        assert!(condition.matches(&on_high));
        assert!(!condition.matches(&outside));
    }

    #[test]
    fn test_contains_is_case_insensitive() {
        let rec = record(vec![("title", "Expense Fraud Investigation".into())]);

        assert!(Condition::Contains {
            field: "title".into(),
            needle: "fraud".into()
        }
        .matches(&rec));
        assert!(!Condition::Contains {
            field: "title".into(),
            needle: "bribery".into()
        }
        .matches(&rec));
    }

    #[test]
    fn test_missing_field_semantics() {
        let rec = record(vec![("status", "open".into())]);

        assert!(!Condition::Eq {
            field: "severity".into(),
            value: "HIGH".into()
        }
        .matches(&rec));
        assert!(Condition::NotIn {
            field: "severity".into(),
            values: vec!["HIGH".into()]
        }
        .matches(&rec));
        assert!(Condition::IsNull {
            field: "severity".into()
        }
        .matches(&rec));
        assert!(!Condition::IsNotNull {
            field: "severity".into()
        }
        .matches(&rec));
    }

    #[test]
    fn test_null_value_semantics() {
        let rec = record(vec![("closed_at", Value::Null)]);

        assert!(Condition::IsNull {
            field: "closed_at".into()
        }
        .matches(&rec));
        assert!(!Condition::Gt {
            field: "closed_at".into(),
            value: Value::Int(0)
        }
        .matches(&rec));
    }

    #[test]
    fn test_predicate_and_of_ors() {
        let rec = record(vec![("status", "open".into()), ("severity", "HIGH".into())]);

        let predicate = Predicate::new(vec![
            vec![
                Condition::Eq {
                    field: "status".into(),
                    value: "open".into(),
                },
                Condition::Eq {
                    field: "status".into(),
                    value: "pending".into(),
                },
            ],
            vec![Condition::Eq {
                field: "severity".into(),
                value: "HIGH".into(),
            }],
        ]);
        assert!(predicate.matches(&rec));

        let rejecting = Predicate::new(vec![
            vec![Condition::Eq {
                field: "status".into(),
                value: "closed".into(),
            }],
            vec![Condition::Eq {
                field: "severity".into(),
                value: "HIGH".into(),
            }],
        ]);
        assert!(!rejecting.matches(&rec));
    }

    #[test]
    fn test_always_predicate() {
        let rec = record(vec![]);
        assert!(Predicate::always().matches(&rec));
        assert!(Predicate::always().is_always());
    }

    #[test]
    fn test_referenced_fields() {
        let predicate = Predicate::new(vec![
            vec![
                Condition::Eq {
                    field: "status".into(),
                    value: "open".into(),
                },
                Condition::IsNull {
                    field: "closed_at".into(),
                },
            ],
            vec![Condition::Eq {
                field: "status".into(),
                value: "open".into(),
            }],
        ]);
        let fields = predicate.referenced_fields();
        assert_eq!(fields.len(), 2);
        assert!(fields.contains("status"));
        assert!(fields.contains("closed_at"));
    }

    #[test]
    fn test_cross_width_numeric_comparison() {
        assert!(values_equal(&Value::Int(100), &Value::Float(100.0)));
        assert_eq!(
            compare_values(&Value::Float(1.5), &Value::Int(2)),
            Some(Ordering::Less)
        );
        assert_eq!(compare_values(&Value::Int(1), &Value::String("1".into())), None);
    }
}
