//! Result types for report executions.

use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One result row in a list-mode report.
///
/// Keys are the requested column field ids. A `BTreeMap` keeps the JSON
/// rendering stable across runs.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ReportRow {
    /// Column values keyed by field id.
    #[serde(flatten)]
    pub values: BTreeMap<String, Value>,
}

impl ReportRow {
    /// Create an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a column value, consuming and returning the row.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(field.into(), value.into());
        self
    }

    /// Insert a column value.
    pub fn insert(&mut self, field: impl Into<String>, value: Value) {
        self.values.insert(field.into(), value);
    }

    /// Get a column value.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }
}

impl FromIterator<(String, Value)> for ReportRow {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// List-mode report result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowPage {
    /// Result rows, at most the clamped limit.
    pub rows: Vec<ReportRow>,
    /// Total matching rows before pagination.
    pub total_count: u64,
    /// Whether the limit cut off further matching rows.
    pub truncated: bool,
    /// Wall-clock execution time in milliseconds.
    pub execution_duration_ms: u64,
}

/// One group in an aggregate-mode result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupBucket {
    /// Grouping key values keyed by field id.
    pub key: BTreeMap<String, Value>,
    /// Aggregate values keyed by `{field}_{function}` (or `count`).
    pub aggregates: BTreeMap<String, Value>,
}

impl GroupBucket {
    /// Create an empty bucket.
    pub fn new() -> Self {
        Self {
            key: BTreeMap::new(),
            aggregates: BTreeMap::new(),
        }
    }

    /// Set a grouping key value, consuming and returning the bucket.
    pub fn with_key(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.key.insert(field.into(), value.into());
        self
    }

    /// Set an aggregate value, consuming and returning the bucket.
    pub fn with_aggregate(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.aggregates.insert(key.into(), value.into());
        self
    }

    /// Get the row count for this bucket, if a count aggregate is present.
    pub fn count(&self) -> Option<i64> {
        self.aggregates.get("count").and_then(Value::as_i64)
    }
}

impl Default for GroupBucket {
    fn default() -> Self {
        Self::new()
    }
}

/// Aggregate-mode report result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupPage {
    /// One bucket per distinct grouping key combination.
    pub groups: Vec<GroupBucket>,
    /// Wall-clock execution time in milliseconds.
    pub execution_duration_ms: u64,
}

/// Result of one report execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "mode")]
pub enum ReportResult {
    /// List-mode result.
    Rows(RowPage),
    /// Aggregate-mode result.
    Groups(GroupPage),
}

impl ReportResult {
    /// Get the row page, if this is a list-mode result.
    pub fn as_rows(&self) -> Option<&RowPage> {
        match self {
            ReportResult::Rows(page) => Some(page),
            _ => None,
        }
    }

    /// Get the group page, if this is an aggregate-mode result.
    pub fn as_groups(&self) -> Option<&GroupPage> {
        match self {
            ReportResult::Groups(page) => Some(page),
            _ => None,
        }
    }
}
