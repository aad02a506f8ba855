//! Typed identifier wrappers used throughout fragstore.
//!
//! Newtypes prevent mixing the two identifier kinds: a `FragmentId` is a
//! generated UUID, while an `OwnerId` is an opaque string handed to us by the
//! authentication layer. Two distinct owner values are distinct owners; the
//! core never inspects the contents.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a stored fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FragmentId(Uuid);

impl FragmentId {
    /// Generate a new random fragment ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for FragmentId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for FragmentId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<FragmentId> for Uuid {
    fn from(id: FragmentId) -> Self {
        id.0
    }
}

impl std::str::FromStr for FragmentId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl std::fmt::Display for FragmentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque identifier for the principal that owns a fragment.
///
/// All reads, writes, and deletes are scoped by this value; fragments are
/// never visible across owners.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    /// Wrap an opaque owner identifier.
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the identifier is empty (never valid for a fragment).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for OwnerId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for OwnerId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for OwnerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
