//! Built-in fields for risk register entries.

use reportql_proto::{ComputedKind, DataType, FieldDescriptor, JoinHop};

pub(super) fn fields() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::new("risk_number", "Risk Number", DataType::String, "General")
            .filterable()
            .sortable(),
        FieldDescriptor::new("title", "Title", DataType::String, "General")
            .filterable()
            .sortable(),
        FieldDescriptor::new("status", "Status", DataType::Enum, "Classification")
            .filterable()
            .sortable()
            .groupable(),
        FieldDescriptor::new("likelihood", "Likelihood", DataType::Enum, "Assessment")
            .filterable()
            .groupable(),
        FieldDescriptor::new("impact", "Impact", DataType::Enum, "Assessment")
            .filterable()
            .groupable(),
        FieldDescriptor::new("treatment", "Treatment", DataType::Enum, "Assessment")
            .filterable()
            .groupable(),
        FieldDescriptor::new("inherent_score", "Inherent Score", DataType::Number, "Assessment")
            .filterable()
            .sortable()
            .aggregatable(),
        FieldDescriptor::new("residual_score", "Residual Score", DataType::Number, "Assessment")
            .filterable()
            .sortable()
            .aggregatable(),
        FieldDescriptor::new("is_accepted", "Accepted", DataType::Boolean, "Assessment")
            .filterable()
            .groupable(),
        FieldDescriptor::new("mitigation_cost", "Mitigation Cost", DataType::Currency, "Financials")
            .filterable()
            .sortable()
            .aggregatable(),
        FieldDescriptor::new("identified_at", "Identified", DataType::Date, "Dates")
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
        FieldDescriptor::new("category.name", "Category", DataType::String, "Classification")
            .filterable()
            .groupable()
            .joined(vec![JoinHop::new("category", "categories")]),
        FieldDescriptor::new("department.name", "Department", DataType::String, "People")
            .filterable()
            .groupable()
            .joined(vec![JoinHop::new("department", "departments")]),
    ]
}
