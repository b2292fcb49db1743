//! Built-in fields for training course assignments.

use reportql_proto::{ComputedKind, DataType, FieldDescriptor, JoinHop};

pub(super) fn fields() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::new("status", "Status", DataType::Enum, "Classification")
            .filterable()
            .sortable()
            .groupable(),
        FieldDescriptor::new("is_required", "Required", DataType::Boolean, "Classification")
            .filterable()
            .groupable(),
        FieldDescriptor::new("score", "Score", DataType::Number, "Progress")
            .filterable()
            .sortable()
            .aggregatable(),
        FieldDescriptor::new("progress_percent", "Progress %", DataType::Number, "Progress")
            .filterable()
            .sortable()
            .aggregatable(),
        FieldDescriptor::new("assigned_at", "Assigned", DataType::Date, "Dates")
            .filterable()
            .sortable(),
        FieldDescriptor::new("started_at", "Started", DataType::Date, "Dates")
            .filterable()
            .sortable(),
        FieldDescriptor::new("completed_at", "Completed", DataType::Date, "Dates")
            .filterable()
            .sortable(),
        FieldDescriptor::new("due_at", "Due", DataType::Date, "Dates")
            .filterable()
            .sortable(),
        FieldDescriptor::new("days_to_due", "Days to Due", DataType::Number, "Dates").computed(
            ComputedKind::DaysUntil {
                source_field: "due_at".into(),
            },
        ),
        FieldDescriptor::new("course.title", "Course", DataType::String, "Course")
            .filterable()
            .groupable()
            .joined(vec![JoinHop::new("course", "courses")]),
        FieldDescriptor::new("course.code", "Course Code", DataType::String, "Course")
            .filterable()
            .joined(vec![JoinHop::new("course", "courses")]),
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
        FieldDescriptor::new("campaign.name", "Campaign", DataType::String, "Campaign")
            .filterable()
            .groupable()
            .joined(vec![JoinHop::new("campaign", "campaigns")]),
    ]
}
