//! Entity identifiers.
//!
//! Subjects and objects share one identifier namespace: a subject may
//! itself be the object of another subject's rights, which is what
//! makes chained take/grant meaningful. Usernames double as subject
//! identifiers; created objects get random UUIDs.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identifier naming a subject or an object.
///
/// An `EntityId` is just a string key with a total order (the graph
/// stores edges in ordered maps so snapshots are deterministic).
/// Nothing in the graph layer interprets its content.
///
/// # Example
///
/// ```
/// use tgsh_types::EntityId;
///
/// let alice = EntityId::from("alice");
/// let file = EntityId::random();
///
/// assert_eq!(alice.as_str(), "alice");
/// assert_ne!(file, EntityId::random());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Wraps an existing key (a username, or an id read back from disk).
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh random identifier (UUID v4) for a created object.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// The identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl AsRef<str> for EntityId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
