//! Field descriptors exposed to report builders.
//!
//! A [`FieldDescriptor`] is the metadata unit for one reportable attribute.
//! The resolved set of descriptors for an `(entity type, organization)` pair
//! is the whitelist that bounds everything a report may reference.

use serde::{Deserialize, Serialize};

/// Data type of a reportable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DataType {
    /// Free-text string.
    String,
    /// Numeric value.
    Number,
    /// Calendar date / timestamp.
    Date,
    /// Boolean flag.
    Boolean,
    /// Closed set of named values.
    Enum,
    /// Monetary amount.
    Currency,
}

impl DataType {
    /// Whether values of this type have a total ordering usable by
    /// range operators (`gt`, `gte`, `lt`, `lte`, `between`).
    pub fn is_ordered(&self) -> bool {
        matches!(self, DataType::Number | DataType::Date | DataType::Currency)
    }

    /// Whether values of this type can be summed and averaged.
    pub fn is_numeric(&self) -> bool {
        matches!(self, DataType::Number | DataType::Currency)
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DataType::String => "string",
            DataType::Number => "number",
            DataType::Date => "date",
            DataType::Boolean => "boolean",
            DataType::Enum => "enum",
            DataType::Currency => "currency",
        };
        f.write_str(name)
    }
}

/// What a field may participate in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    /// Field may appear in filter conditions.
    pub filterable: bool,
    /// Field may drive storage-level ordering.
    pub sortable: bool,
    /// Field may be a group-by dimension.
    pub groupable: bool,
    /// Field may be the target of an aggregate function.
    pub aggregatable: bool,
}

/// One relation hop on the way from an entity's root to a field's data.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinHop {
    /// Relation name on the source entity (e.g. "category").
    pub relation: String,
    /// Target table/entity the relation resolves to (e.g. "categories").
    pub target: String,
}

impl JoinHop {
    /// Create a join hop.
    pub fn new(relation: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            relation: relation.into(),
            target: target.into(),
        }
    }
}

/// Where a field descriptor originates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldSource {
    /// Built-in field from the static catalog.
    Static,
    /// Tenant-defined custom property.
    Custom,
}

/// Derivation rule for a computed field.
///
/// Computed fields are evaluated after fetch, against a single `now`
/// snapshot per execution; they have no storage column and therefore can
/// never drive storage-level ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ComputedKind {
    /// Whole days elapsed since the source date field.
    DaysSince {
        /// Field id of the source date.
        source_field: String,
    },
    /// Whole days remaining until the source date field.
    DaysUntil {
        /// Field id of the source date.
        source_field: String,
    },
}

impl ComputedKind {
    /// The stored date field this computation reads.
    pub fn source_field(&self) -> &str {
        match self {
            ComputedKind::DaysSince { source_field } | ComputedKind::DaysUntil { source_field } => {
                source_field
            }
        }
    }
}

/// Metadata for one reportable attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    /// Unique id within the entity type's resolved catalog.
    pub field_id: String,
    /// Human-readable label.
    pub label: String,
    /// Field data type.
    pub data_type: DataType,
    /// UI grouping label (e.g. "Classification", "Assignment").
    pub group: String,
    /// Operations this field may participate in.
    pub capabilities: Capabilities,
    /// Ordered relation hops to reach the field's data (empty for direct fields).
    pub join_path: Vec<JoinHop>,
    /// Static catalog field or tenant custom property.
    pub source: FieldSource,
    /// Post-fetch derivation, if this is a computed field.
    pub computed: Option<ComputedKind>,
}

impl FieldDescriptor {
    /// Create a static, direct field with no capabilities set.
    pub fn new(
        field_id: impl Into<String>,
        label: impl Into<String>,
        data_type: DataType,
        group: impl Into<String>,
    ) -> Self {
        Self {
            field_id: field_id.into(),
            label: label.into(),
            data_type,
            group: group.into(),
            capabilities: Capabilities::default(),
            join_path: vec![],
            source: FieldSource::Static,
            computed: None,
        }
    }

    /// Allow this field in filter conditions.
    pub fn filterable(mut self) -> Self {
        self.capabilities.filterable = true;
        self
    }

    /// Allow storage-level ordering by this field.
    pub fn sortable(mut self) -> Self {
        self.capabilities.sortable = true;
        self
    }

    /// Allow grouping by this field.
    pub fn groupable(mut self) -> Self {
        self.capabilities.groupable = true;
        self
    }

    /// Allow aggregate functions over this field.
    pub fn aggregatable(mut self) -> Self {
        self.capabilities.aggregatable = true;
        self
    }

    /// Set the relation hops required to reach this field.
    pub fn joined(mut self, path: Vec<JoinHop>) -> Self {
        self.join_path = path;
        self
    }

    /// Mark as a tenant custom property.
    pub fn custom(mut self) -> Self {
        self.source = FieldSource::Custom;
        self
    }

    /// Set the post-fetch derivation rule. Computed fields are never
    /// sortable; the flag is cleared here so a catalog author cannot set it
    /// by accident.
    pub fn computed(mut self, kind: ComputedKind) -> Self {
        self.capabilities.sortable = false;
        self.computed = Some(kind);
        self
    }

    /// Check if this is a computed field.
    pub fn is_computed(&self) -> bool {
        self.computed.is_some()
    }

    /// Check if this field lives behind at least one relation hop.
    pub fn is_joined(&self) -> bool {
        !self.join_path.is_empty()
    }
}
