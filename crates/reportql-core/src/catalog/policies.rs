//! Built-in fields for policy documents.

use reportql_proto::{ComputedKind, DataType, FieldDescriptor, JoinHop};

pub(super) fn fields() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::new("policy_number", "Policy Number", DataType::String, "General")
            .filterable()
            .sortable(),
        FieldDescriptor::new("title", "Title", DataType::String, "General")
            .filterable()
            .sortable(),
        FieldDescriptor::new("status", "Status", DataType::Enum, "Classification")
            .filterable()
            .sortable()
            .groupable(),
        FieldDescriptor::new("version", "Version", DataType::Number, "General")
            .filterable()
            .sortable(),
        FieldDescriptor::new("is_mandatory", "Mandatory", DataType::Boolean, "Classification")
            .filterable()
            .groupable(),
        FieldDescriptor::new("effective_at", "Effective", DataType::Date, "Dates")
            .filterable()
            .sortable(),
        FieldDescriptor::new("published_at", "Published", DataType::Date, "Dates")
            .filterable()
            .sortable(),
        FieldDescriptor::new("review_due_at", "Review Due", DataType::Date, "Dates")
            .filterable()
            .sortable(),
        FieldDescriptor::new("days_until_review", "Days Until Review", DataType::Number, "Dates")
            .computed(ComputedKind::DaysUntil {
                source_field: "review_due_at".into(),
            }),
        FieldDescriptor::new("owner.name", "Owner", DataType::String, "People")
            .filterable()
            .groupable()
            .joined(vec![JoinHop::new("owner", "users")]),
        FieldDescriptor::new("owner.email", "Owner Email", DataType::String, "People")
            .filterable()
            .joined(vec![JoinHop::new("owner", "users")]),
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
