//! Built-in fields for conflict-of-interest and gift disclosures.

use reportql_proto::{ComputedKind, DataType, FieldDescriptor, JoinHop};

pub(super) fn fields() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::new("disclosure_number", "Disclosure Number", DataType::String, "General")
            .filterable()
            .sortable(),
        FieldDescriptor::new("summary", "Summary", DataType::String, "General").filterable(),
        FieldDescriptor::new("disclosure_type", "Type", DataType::Enum, "Classification")
            .filterable()
            .sortable()
            .groupable(),
        FieldDescriptor::new("status", "Status", DataType::Enum, "Classification")
            .filterable()
            .sortable()
            .groupable(),
        FieldDescriptor::new("decision", "Decision", DataType::Enum, "Classification")
            .filterable()
            .groupable(),
        FieldDescriptor::new("is_recurring", "Recurring", DataType::Boolean, "Classification")
            .filterable()
            .groupable(),
        FieldDescriptor::new("declared_value", "Declared Value", DataType::Currency, "Financials")
            .filterable()
            .sortable()
            .aggregatable(),
        FieldDescriptor::new("submitted_at", "Submitted", DataType::Date, "Dates")
            .filterable()
            .sortable(),
        FieldDescriptor::new("reviewed_at", "Reviewed", DataType::Date, "Dates")
            .filterable()
            .sortable(),
        FieldDescriptor::new("days_pending", "Days Pending", DataType::Number, "Dates").computed(
            ComputedKind::DaysSince {
                source_field: "submitted_at".into(),
            },
        ),
        FieldDescriptor::new("submitter.name", "Submitter", DataType::String, "People")
            .filterable()
            .groupable()
            .joined(vec![JoinHop::new("submitter", "users")]),
        FieldDescriptor::new("submitter.email", "Submitter Email", DataType::String, "People")
            .filterable()
            .joined(vec![JoinHop::new("submitter", "users")]),
        FieldDescriptor::new("reviewer.name", "Reviewer", DataType::String, "People")
            .filterable()
            .groupable()
            .joined(vec![JoinHop::new("reviewer", "users")]),
        FieldDescriptor::new("department.name", "Department", DataType::String, "People")
            .filterable()
            .groupable()
            .joined(vec![JoinHop::new("department", "departments")]),
        FieldDescriptor::new("category.name", "Category", DataType::String, "Classification")
            .filterable()
            .groupable()
            .joined(vec![JoinHop::new("category", "categories")]),
    ]
}
