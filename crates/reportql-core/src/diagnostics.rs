//! Execution timing and slow-query logging.
//!
//! Logs carry structural counts only. Field ids, filter values, and row
//! data never reach the log stream; report filters routinely contain
//! personal data and logs outlive the request.

use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::query::{PlanMode, ReportPlan};
use crate::tenant::OrgId;
use reportql_proto::EntityType;

/// Executions at or above this take the slow-query log path.
pub const SLOW_QUERY_THRESHOLD: Duration = Duration::from_secs(5);

/// Times one report execution.
pub struct ExecutionObserver {
    started: Instant,
    org: OrgId,
    entity: EntityType,
    clause_count: usize,
    column_count: usize,
    aggregate: bool,
}

impl ExecutionObserver {
    /// Start observing a planned execution.
    pub fn start(org: OrgId, plan: &ReportPlan) -> Self {
        let (column_count, aggregate) = match &plan.mode {
            PlanMode::List { columns } => (columns.len(), false),
            PlanMode::Aggregate {
                group_by,
                aggregations,
            } => (group_by.len() + aggregations.len(), true),
        };
        Self {
            started: Instant::now(),
            org,
            entity: plan.entity_type,
            clause_count: plan.predicate.clause_count(),
            column_count,
            aggregate,
        }
    }

    /// Stop observing, log the outcome, and return the elapsed wall-clock
    /// time in milliseconds.
    pub fn finish(self) -> u64 {
        let elapsed = self.started.elapsed();
        let elapsed_ms = elapsed.as_millis() as u64;
        debug!(
            org = %self.org,
            entity = %self.entity,
            clause_count = self.clause_count,
            column_count = self.column_count,
            aggregate = self.aggregate,
            elapsed_ms,
            "report executed"
        );
        if elapsed >= SLOW_QUERY_THRESHOLD {
            warn!(
                org = %self.org,
                entity = %self.entity,
                clause_count = self.clause_count,
                column_count = self.column_count,
                elapsed_ms,
                "slow report execution"
            );
        }
        elapsed_ms
    }
}
