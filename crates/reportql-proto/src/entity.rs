//! Reportable entity types.

use serde::{Deserialize, Serialize};

/// The seven reportable entity types.
///
/// The engine dispatches on this enum exhaustively: every entity type has a
/// static field catalog and a storage query capability. Adding a variant
/// forces both to be extended at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    /// Investigation cases.
    Cases,
    /// Conflict-of-interest and gift disclosures.
    Disclosures,
    /// Policy documents.
    Policies,
    /// Policy attestation assignments.
    Attestations,
    /// Training course assignments.
    Trainings,
    /// Risk register entries.
    Risks,
    /// Remediation and follow-up tasks.
    Tasks,
}

impl EntityType {
    /// All supported entity types.
    pub const ALL: [EntityType; 7] = [
        EntityType::Cases,
        EntityType::Disclosures,
        EntityType::Policies,
        EntityType::Attestations,
        EntityType::Trainings,
        EntityType::Risks,
        EntityType::Tasks,
    ];

    /// The canonical snake_case name of this entity type.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Cases => "cases",
            EntityType::Disclosures => "disclosures",
            EntityType::Policies => "policies",
            EntityType::Attestations => "attestations",
            EntityType::Trainings => "trainings",
            EntityType::Risks => "risks",
            EntityType::Tasks => "tasks",
        }
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unrecognized entity type name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown entity type '{0}'")]
pub struct UnknownEntityTypeError(pub String);

impl std::str::FromStr for EntityType {
    type Err = UnknownEntityTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityType::ALL
            .into_iter()
            .find(|e| e.as_str() == s)
            .ok_or_else(|| UnknownEntityTypeError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_names() {
        for entity in EntityType::ALL {
            let parsed: EntityType = entity.as_str().parse().unwrap();
            assert_eq!(parsed, entity);
        }
    }

    #[test]
    fn test_unknown_name_fails() {
        let err = "invoices".parse::<EntityType>().unwrap_err();
        assert_eq!(err.0, "invoices");
    }

    #[test]
    fn test_serde_snake_case() {
        let json = serde_json::to_string(&EntityType::Disclosures).unwrap();
        assert_eq!(json, "\"disclosures\"");

        let parsed: EntityType = serde_json::from_str("\"cases\"").unwrap();
        assert_eq!(parsed, EntityType::Cases);
    }
}
