//! Built-in fields for investigation cases.

use reportql_proto::{ComputedKind, DataType, FieldDescriptor, JoinHop};

pub(super) fn fields() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::new("case_number", "Case Number", DataType::String, "General")
            .filterable()
            .sortable(),
        FieldDescriptor::new("title", "Title", DataType::String, "General")
            .filterable()
            .sortable(),
        FieldDescriptor::new("description", "Description", DataType::String, "General")
            .filterable(),
        FieldDescriptor::new("status", "Status", DataType::Enum, "Classification")
            .filterable()
            .sortable()
            .groupable(),
        FieldDescriptor::new("severity", "Severity", DataType::Enum, "Classification")
            .filterable()
            .sortable()
            .groupable(),
        FieldDescriptor::new("priority", "Priority", DataType::Enum, "Classification")
            .filterable()
            .sortable()
            .groupable(),
        FieldDescriptor::new("intake_channel", "Intake Channel", DataType::Enum, "Classification")
            .filterable()
            .groupable(),
        FieldDescriptor::new("outcome", "Outcome", DataType::Enum, "Classification")
            .filterable()
            .groupable(),
        FieldDescriptor::new("is_anonymous", "Anonymous Report", DataType::Boolean, "Classification")
            .filterable()
            .groupable(),
        FieldDescriptor::new("created_at", "Created", DataType::Date, "Dates")
            .filterable()
            .sortable(),
        FieldDescriptor::new("due_at", "Due", DataType::Date, "Dates")
            .filterable()
            .sortable(),
        FieldDescriptor::new("closed_at", "Closed", DataType::Date, "Dates")
            .filterable()
            .sortable(),
        FieldDescriptor::new("days_open", "Days Open", DataType::Number, "Dates").computed(
            ComputedKind::DaysSince {
                source_field: "created_at".into(),
            },
        ),
        FieldDescriptor::new("remediation_cost", "Remediation Cost", DataType::Currency, "Financials")
            .filterable()
            .sortable()
            .aggregatable(),
        FieldDescriptor::new("category.name", "Category", DataType::String, "Classification")
            .filterable()
            .groupable()
            .joined(vec![JoinHop::new("category", "categories")]),
        FieldDescriptor::new("category.code", "Category Code", DataType::String, "Classification")
            .filterable()
            .joined(vec![JoinHop::new("category", "categories")]),
        FieldDescriptor::new("assignee.name", "Assignee", DataType::String, "People")
            .filterable()
            .groupable()
            .joined(vec![JoinHop::new("assignee", "users")]),
        FieldDescriptor::new("assignee.email", "Assignee Email", DataType::String, "People")
            .filterable()
            .joined(vec![JoinHop::new("assignee", "users")]),
        FieldDescriptor::new("department.name", "Department", DataType::String, "People")
            .filterable()
            .groupable()
            .joined(vec![JoinHop::new("department", "departments")]),
        FieldDescriptor::new("location.name", "Location", DataType::String, "People")
            .filterable()
            .groupable()
            .joined(vec![JoinHop::new("location", "locations")]),
    ]
}
