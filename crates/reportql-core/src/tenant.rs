//! Tenant identity.

/// Organization identifier.
///
/// Threaded through every registry and storage call as a standalone
/// parameter, never inside a filter, so tenant scoping cannot be replaced
/// by anything a client authors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OrgId(i64);

impl OrgId {
    /// Create an organization id.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// The raw id.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl From<i64> for OrgId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for OrgId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
