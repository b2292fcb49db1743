//! Built-in fields for policy attestation assignments.

use reportql_proto::{ComputedKind, DataType, FieldDescriptor, JoinHop};

pub(super) fn fields() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::new("status", "Status", DataType::Enum, "Classification")
            .filterable()
            .sortable()
            .groupable(),
        FieldDescriptor::new("reminder_count", "Reminders Sent", DataType::Number, "General")
            .filterable()
            .sortable()
            .aggregatable(),
        FieldDescriptor::new("assigned_at", "Assigned", DataType::Date, "Dates")
            .filterable()
            .sortable(),
        FieldDescriptor::new("due_at", "Due", DataType::Date, "Dates")
            .filterable()
            .sortable(),
        FieldDescriptor::new("completed_at", "Completed", DataType::Date, "Dates")
            .filterable()
            .sortable(),
        FieldDescriptor::new("days_past_due", "Days Past Due", DataType::Number, "Dates").computed(
            ComputedKind::DaysSince {
                source_field: "due_at".into(),
            },
        ),
        FieldDescriptor::new("policy.title", "Policy", DataType::String, "Policy")
            .filterable()
            .groupable()
            .joined(vec![JoinHop::new("policy", "policies")]),
        FieldDescriptor::new("policy.policy_number", "Policy Number", DataType::String, "Policy")
            .filterable()
            .joined(vec![JoinHop::new("policy", "policies")]),
        FieldDescriptor::new("assignee.name", "Assignee", DataType::String, "People")
            .filterable()
            .groupable()
            .joined(vec![JoinHop::new("assignee", "users")]),
        FieldDescriptor::new("assignee.email", "Assignee Email", DataType::String, "People")
            .filterable()
            .joined(vec![JoinHop::new("assignee", "users")]),
        FieldDescriptor::new(
            "assignee.department.name",
            "Assignee Department",
            DataType::String,
            "People",
        )
        .filterable()
        .groupable()
        .joined(vec![
            JoinHop::new("assignee", "users"),
            JoinHop::new("department", "departments"),
        ]),
        FieldDescriptor::new("campaign.name", "Campaign", DataType::String, "Campaign")
            .filterable()
            .groupable()
            .joined(vec![JoinHop::new("campaign", "campaigns")]),
    ]
}
