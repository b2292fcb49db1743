//! Turns a validated [`ReportQuerySpec`] into an executable [`ReportPlan`].
//!
//! The planner owns every capability check that is not about filter
//! values: column resolution, sortability, groupability, and aggregate
//! target checks. Once a plan exists, execution no longer consults the
//! catalog.

use std::collections::HashSet;

use tracing::debug;

use crate::catalog::EntityTypeCatalog;
use crate::error::Error;
use crate::query::predicate::Predicate;
use reportql_proto::{
    AggregateFunction, Aggregation, ComputedKind, EntityType, FieldDescriptor, JoinHop, Pagination,
    ReportQuerySpec, SortSpec,
};

/// Execution mode of a planned report.
#[derive(Debug, Clone, PartialEq)]
pub enum PlanMode {
    /// Fetch matching rows and project the requested columns.
    List {
        /// Columns to project, in request order.
        columns: Vec<String>,
    },
    /// Bucket matching rows by the grouping dimensions and aggregate.
    Aggregate {
        /// Grouping dimensions, in request order.
        group_by: Vec<String>,
        /// Aggregations to compute per bucket. Never empty; a grouped
        /// query with no explicit aggregations gets a row count.
        aggregations: Vec<Aggregation>,
    },
}

/// An executable report plan.
///
/// Everything in here has been resolved against the catalog: fields
/// exist, capabilities hold, and pagination is normalized. The storage
/// layer can trust the plan without re-validating.
#[derive(Debug, Clone)]
pub struct ReportPlan {
    /// Entity type the plan runs over.
    pub entity_type: EntityType,
    /// List or aggregate execution.
    pub mode: PlanMode,
    /// Row filter, already coerced to typed values.
    pub predicate: Predicate,
    /// Stored fields the executor must fetch, deduplicated in first-use
    /// order. Covers columns, filter fields, grouping dimensions,
    /// aggregation targets, the sort field, and computed-field sources.
    pub fetch_fields: Vec<String>,
    /// Relation paths required to materialize the fetch fields.
    pub joins: Vec<Vec<JoinHop>>,
    /// Computed columns to derive after fetch, as `(field id, rule)`.
    pub computed: Vec<(String, ComputedKind)>,
    /// Ordering for list mode.
    pub sort: Option<SortSpec>,
    /// Normalized pagination.
    pub pagination: Pagination,
}

/// Builds [`ReportPlan`]s from validated specs.
pub struct ReportPlanner;

impl ReportPlanner {
    /// Plan a report against a resolved catalog.
    ///
    /// `predicate` must have been built from the same spec's filter via
    /// [`build_predicate`](crate::query::build_predicate); the planner
    /// folds its referenced fields into the fetch set but does not
    /// re-check them.
    pub fn plan(
        catalog: &EntityTypeCatalog,
        spec: &ReportQuerySpec,
        predicate: Predicate,
    ) -> Result<ReportPlan, Error> {
        let mut fields = FetchFields::default();
        let mut computed = Vec::new();

        let aggregate = !spec.group_by.is_empty() || !spec.aggregations.is_empty();

        let mode = if aggregate {
            for field_id in &spec.group_by {
                let descriptor = resolve(catalog, field_id)?;
                if !descriptor.capabilities.groupable {
                    return Err(Error::NotGroupable {
                        field: field_id.clone(),
                    });
                }
                fields.add(descriptor);
            }

            let mut aggregations = spec.aggregations.clone();
            if aggregations.is_empty() {
                aggregations.push(Aggregation::count());
            }
            for aggregation in &aggregations {
                if let Some(field_id) = &aggregation.field {
                    let descriptor = resolve(catalog, field_id)?;
                    check_aggregatable(descriptor, aggregation.function)?;
                    fields.add(descriptor);
                }
            }

            PlanMode::Aggregate {
                group_by: spec.group_by.clone(),
                aggregations,
            }
        } else {
            if spec.columns.is_empty() {
                return Err(Error::NoColumns);
            }
            for field_id in &spec.columns {
                let descriptor = resolve(catalog, field_id)?;
                match &descriptor.computed {
                    Some(kind) => {
                        let source = resolve(catalog, kind.source_field())?;
                        fields.add(source);
                        computed.push((field_id.clone(), kind.clone()));
                    }
                    None => fields.add(descriptor),
                }
            }

            PlanMode::List {
                columns: spec.columns.clone(),
            }
        };

        if let Some(sort) = &spec.sort {
            let descriptor = resolve(catalog, &sort.field)?;
            if descriptor.is_computed() {
                return Err(Error::SortOnComputedField {
                    field: sort.field.clone(),
                });
            }
            if !descriptor.capabilities.sortable {
                return Err(Error::NotSortable {
                    field: sort.field.clone(),
                });
            }
            fields.add(descriptor);
        }

        for field_id in sorted_referenced(&predicate) {
            let descriptor = resolve(catalog, field_id)?;
            fields.add(descriptor);
        }

        let plan = ReportPlan {
            entity_type: catalog.entity_type(),
            mode,
            predicate,
            fetch_fields: fields.fields,
            joins: fields.joins,
            computed,
            sort: spec.sort.clone(),
            pagination: spec.pagination.clamped(),
        };
        debug!(
            entity = %plan.entity_type,
            fetch_fields = plan.fetch_fields.len(),
            joins = plan.joins.len(),
            aggregate,
            "planned report"
        );
        Ok(plan)
    }
}

/// Fetch-field accumulator with first-use ordering and join dedup.
#[derive(Default)]
struct FetchFields {
    fields: Vec<String>,
    joins: Vec<Vec<JoinHop>>,
}

impl FetchFields {
    fn add(&mut self, descriptor: &FieldDescriptor) {
        if !self.fields.iter().any(|f| f == &descriptor.field_id) {
            self.fields.push(descriptor.field_id.clone());
        }
        if descriptor.is_joined() && !self.joins.contains(&descriptor.join_path) {
            self.joins.push(descriptor.join_path.clone());
        }
    }
}

fn resolve<'a>(
    catalog: &'a EntityTypeCatalog,
    field_id: &str,
) -> Result<&'a FieldDescriptor, Error> {
    catalog.field(field_id).ok_or_else(|| Error::UnknownField {
        entity: catalog.entity_type(),
        field: field_id.to_string(),
    })
}

fn check_aggregatable(
    descriptor: &FieldDescriptor,
    function: AggregateFunction,
) -> Result<(), Error> {
    // A field-scoped count only needs the field to exist; it counts
    // rows where the field is present.
    if function == AggregateFunction::Count {
        return Ok(());
    }
    if !descriptor.capabilities.aggregatable {
        return Err(Error::NotAggregatable {
            field: descriptor.field_id.clone(),
            function,
        });
    }
    if function.requires_numeric() && !descriptor.data_type.is_numeric() {
        return Err(Error::NotAggregatable {
            field: descriptor.field_id.clone(),
            function,
        });
    }
    Ok(())
}

/// Predicate field ids in sorted order, so fetch-field order is stable
/// across runs.
fn sorted_referenced(predicate: &Predicate) -> Vec<&str> {
    let referenced: HashSet<&str> = predicate.referenced_fields();
    let mut fields: Vec<&str> = referenced.into_iter().collect();
    fields.sort_unstable();
    fields
}
