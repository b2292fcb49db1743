//! Core error types.

use crate::store::StoreError;
use reportql_proto::{
    AggregateFunction, DataType, EntityType, FilterOperator, UnknownEntityTypeError,
};
use thiserror::Error;

/// Report engine errors.
///
/// Everything except [`Error::Execution`] is a validation failure raised
/// before any storage access.
#[derive(Debug, Error)]
pub enum Error {
    /// Entity type name is not recognized.
    #[error("unknown entity type '{0}'")]
    UnknownEntityType(String),

    /// Field is not in the resolved catalog for this organization. Covers
    /// both nonexistent fields and another tenant's custom fields; the two
    /// cases are deliberately indistinguishable.
    #[error("unknown field '{field}' for entity type '{entity}'")]
    UnknownField {
        /// Entity type whose catalog was consulted.
        entity: EntityType,
        /// The unrecognized field id.
        field: String,
    },

    /// Field may not appear in filter conditions.
    #[error("field '{field}' is not filterable")]
    NotFilterable {
        /// The offending field id.
        field: String,
    },

    /// Field may not drive ordering.
    #[error("field '{field}' is not sortable")]
    NotSortable {
        /// The offending field id.
        field: String,
    },

    /// Field may not be a grouping dimension.
    #[error("field '{field}' is not groupable")]
    NotGroupable {
        /// The offending field id.
        field: String,
    },

    /// Field may not be aggregated with the requested function.
    #[error("field '{field}' cannot be aggregated with {function}")]
    NotAggregatable {
        /// The offending field id.
        field: String,
        /// The rejected aggregate function.
        function: AggregateFunction,
    },

    /// Sorting requested on a computed field, which has no storage column.
    #[error("cannot sort by computed field '{field}'")]
    SortOnComputedField {
        /// The computed field id.
        field: String,
    },

    /// Operator is incompatible with the field's data type.
    #[error("operator '{operator}' is not valid for field '{field}' of type {data_type}")]
    InvalidOperator {
        /// The field the condition targets.
        field: String,
        /// The rejected operator.
        operator: FilterOperator,
        /// The field's data type.
        data_type: DataType,
    },

    /// Filter value cannot be coerced to the field's data type, or has
    /// the wrong shape for the operator.
    #[error("invalid value for field '{field}': {reason}")]
    InvalidValue {
        /// The field the condition targets.
        field: String,
        /// What was wrong with the value.
        reason: String,
    },

    /// A filter clause with no conditions can never match anything.
    #[error("filter clause has no conditions")]
    EmptyFilterClause,

    /// A list report with no columns has nothing to return.
    #[error("list reports must request at least one column")]
    NoColumns,

    /// Storage layer failure during execution.
    #[error("execution failed: {0}")]
    Execution(#[from] StoreError),
}

impl Error {
    /// Whether this error was raised by validation, before any storage
    /// access.
    pub fn is_validation(&self) -> bool {
        !matches!(self, Error::Execution(_))
    }
}

impl From<UnknownEntityTypeError> for Error {
    fn from(err: UnknownEntityTypeError) -> Self {
        Error::UnknownEntityType(err.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_classification() {
        let err = Error::UnknownField {
            entity: EntityType::Cases,
            field: "nope".into(),
        };
        assert!(err.is_validation());

        let err = Error::Execution(StoreError::Backend("connection reset".into()));
        assert!(!err.is_validation());
    }

    #[test]
    fn test_messages_name_the_field() {
        let err = Error::NotFilterable {
            field: "description".into(),
        };
        assert!(err.to_string().contains("description"));

        let err = Error::InvalidOperator {
            field: "is_anonymous".into(),
            operator: FilterOperator::Contains,
            data_type: DataType::Boolean,
        };
        let msg = err.to_string();
        assert!(msg.contains("contains"));
        assert!(msg.contains("is_anonymous"));
        assert!(msg.contains("boolean"));
    }
}
