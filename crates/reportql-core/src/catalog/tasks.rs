//! Built-in fields for remediation and follow-up tasks.

use reportql_proto::{ComputedKind, DataType, FieldDescriptor, JoinHop};

pub(super) fn fields() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::new("task_number", "Task Number", DataType::String, "General")
            .filterable()
            .sortable(),
        FieldDescriptor::new("title", "Title", DataType::String, "General")
            .filterable()
            .sortable(),
        FieldDescriptor::new("status", "Status", DataType::Enum, "Classification")
            .filterable()
            .sortable()
            .groupable(),
        FieldDescriptor::new("priority", "Priority", DataType::Enum, "Classification")
            .filterable()
            .sortable()
            .groupable(),
        FieldDescriptor::new("is_blocked", "Blocked", DataType::Boolean, "Classification")
            .filterable()
            .groupable(),
        FieldDescriptor::new("estimated_hours", "Estimated Hours", DataType::Number, "General")
            .filterable()
            .sortable()
            .aggregatable(),
        FieldDescriptor::new("created_at", "Created", DataType::Date, "Dates")
            .filterable()
            .sortable(),
        FieldDescriptor::new("due_at", "Due", DataType::Date, "Dates")
            .filterable()
            .sortable(),
        FieldDescriptor::new("completed_at", "Completed", DataType::Date, "Dates")
            .filterable()
            .sortable(),
        FieldDescriptor::new("days_open", "Days Open", DataType::Number, "Dates").computed(
            ComputedKind::DaysSince {
                source_field: "created_at".into(),
            },
        ),
        FieldDescriptor::new("assignee.name", "Assignee", DataType::String, "People")
            .filterable()
            .groupable()
            .joined(vec![JoinHop::new("assignee", "users")]),
        FieldDescriptor::new("assignee.email", "Assignee Email", DataType::String, "People")
            .filterable()
            .joined(vec![JoinHop::new("assignee", "users")]),
        FieldDescriptor::new("case.case_number", "Source Case", DataType::String, "Case")
            .filterable()
            .joined(vec![JoinHop::new("case", "cases")]),
        FieldDescriptor::new("case.severity", "Case Severity", DataType::Enum, "Case")
            .filterable()
            .groupable()
            .joined(vec![JoinHop::new("case", "cases")]),
        FieldDescriptor::new("department.name", "Department", DataType::String, "People")
            .filterable()
            .groupable()
            .joined(vec![JoinHop::new("department", "departments")]),
    ]
}
