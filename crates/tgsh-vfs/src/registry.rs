//! Unambiguous object identification.

use crate::VfsError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tgsh_types::EntityId;

/// The kind of an identified entity.
///
/// Subjects appear here too: a registered user is an entity like any
/// file, and may be the object of another subject's rights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    /// A simulated file with text content.
    File,
    /// A directory grouping child objects.
    Directory,
    /// A registered user acting as subject.
    Subject,
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::File => "file",
            Self::Directory => "directory",
            Self::Subject => "subject",
        };
        f.write_str(name)
    }
}

/// Metadata of one identified object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRecord {
    /// Unique entity identifier.
    pub id: EntityId,
    /// Human-readable name, unique across the registry.
    pub name: String,
    /// What the object is.
    pub kind: ObjectKind,
    /// The subject that created it.
    pub owner: EntityId,
    /// Enclosing directory, if any.
    pub parent: Option<EntityId>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Name-unique object identification.
///
/// Files and directories get random UUID identifiers; subjects keep
/// their username as identifier (subjects and objects share one
/// namespace, and the graph keys subject edges by username). Lookup
/// accepts either the id or the name.
#[derive(Debug, Default, Clone)]
pub struct ObjectRegistry {
    records: BTreeMap<EntityId, ObjectRecord>,
    names: BTreeMap<String, EntityId>,
}

impl ObjectRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a file or directory under a fresh UUID identifier.
    ///
    /// # Errors
    ///
    /// [`VfsError::NameTaken`] when the name is already registered.
    pub fn create(
        &mut self,
        name: &str,
        kind: ObjectKind,
        owner: &EntityId,
        parent: Option<EntityId>,
    ) -> Result<EntityId, VfsError> {
        let id = EntityId::random();
        self.insert(id.clone(), name, kind, owner, parent)?;
        Ok(id)
    }

    /// Registers a subject under its username as identifier.
    ///
    /// # Errors
    ///
    /// [`VfsError::NameTaken`] when the name is already registered.
    pub fn register_subject(&mut self, username: &str) -> Result<EntityId, VfsError> {
        let id = EntityId::from(username);
        self.insert(id.clone(), username, ObjectKind::Subject, &id, None)?;
        Ok(id)
    }

    /// Looks up a record by id or, failing that, by name.
    #[must_use]
    pub fn get(&self, identifier: &str) -> Option<&ObjectRecord> {
        if let Some(record) = self.records.get(&EntityId::from(identifier)) {
            return Some(record);
        }
        self.names
            .get(identifier)
            .and_then(|id| self.records.get(id))
    }

    /// Resolves an id-or-name to the canonical [`EntityId`].
    #[must_use]
    pub fn resolve(&self, identifier: &str) -> Option<EntityId> {
        self.get(identifier).map(|record| record.id.clone())
    }

    /// True iff an object with this id or name exists.
    #[must_use]
    pub fn exists(&self, identifier: &str) -> bool {
        self.get(identifier).is_some()
    }

    /// Removes a record by id or name. Returns the removed record.
    pub fn remove(&mut self, identifier: &str) -> Option<ObjectRecord> {
        let id = self.resolve(identifier)?;
        let record = self.records.remove(&id)?;
        self.names.remove(&record.name);
        Some(record)
    }

    /// Lists records, optionally filtered by kind and/or owner.
    #[must_use]
    pub fn list(&self, kind: Option<ObjectKind>, owner: Option<&EntityId>) -> Vec<&ObjectRecord> {
        self.records
            .values()
            .filter(|r| kind.map_or(true, |k| r.kind == k))
            .filter(|r| owner.map_or(true, |o| &r.owner == o))
            .collect()
    }

    /// All records owned by `owner`.
    #[must_use]
    pub fn by_owner(&self, owner: &EntityId) -> Vec<&ObjectRecord> {
        self.list(None, Some(owner))
    }

    /// Children of the given directory id.
    #[must_use]
    pub fn children(&self, directory: &EntityId) -> Vec<&ObjectRecord> {
        self.records
            .values()
            .filter(|r| r.parent.as_ref() == Some(directory))
            .collect()
    }

    fn insert(
        &mut self,
        id: EntityId,
        name: &str,
        kind: ObjectKind,
        owner: &EntityId,
        parent: Option<EntityId>,
    ) -> Result<(), VfsError> {
        if self.names.contains_key(name) {
            return Err(VfsError::NameTaken {
                name: name.to_string(),
            });
        }
        self.names.insert(name.to_string(), id.clone());
        self.records.insert(
            id.clone(),
            ObjectRecord {
                id,
                name: name.to_string(),
                kind,
                owner: owner.clone(),
                parent,
                created_at: Utc::now(),
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_and_lookup_by_id_or_name() {
        let mut registry = ObjectRegistry::new();
        let owner = EntityId::from("alice");
        let id = registry
            .create("notes.txt", ObjectKind::File, &owner, None)
            .expect("create");

        assert!(registry.exists(id.as_str()));
        assert!(registry.exists("notes.txt"));
        assert_eq!(registry.resolve("notes.txt"), Some(id.clone()));
        assert_eq!(registry.get(id.as_str()).map(|r| r.name.as_str()), Some("notes.txt"));
    }

    #[test]
    fn duplicate_name_is_rejected() {
        let mut registry = ObjectRegistry::new();
        let owner = EntityId::from("alice");
        registry
            .create("a", ObjectKind::File, &owner, None)
            .expect("first");
        let err = registry
            .create("a", ObjectKind::Directory, &owner, None)
            .unwrap_err();
        assert_eq!(err, VfsError::NameTaken { name: "a".into() });
    }

    #[test]
    fn subject_keeps_username_as_id() {
        let mut registry = ObjectRegistry::new();
        let id = registry.register_subject("alice").expect("register");
        assert_eq!(id, EntityId::from("alice"));
        assert_eq!(
            registry.get("alice").map(|r| r.kind),
            Some(ObjectKind::Subject)
        );
    }

    #[test]
    fn remove_clears_both_indices() {
        let mut registry = ObjectRegistry::new();
        let owner = EntityId::from("alice");
        let id = registry
            .create("doomed", ObjectKind::File, &owner, None)
            .expect("create");

        let removed = registry.remove("doomed").expect("remove");
        assert_eq!(removed.id, id);
        assert!(!registry.exists("doomed"));
        assert!(!registry.exists(id.as_str()));
        assert!(registry.remove("doomed").is_none());
    }

    #[test]
    fn list_filters_by_kind_and_owner() {
        let mut registry = ObjectRegistry::new();
        let alice = EntityId::from("alice");
        let bob = EntityId::from("bob");
        registry.create("f1", ObjectKind::File, &alice, None).expect("f1");
        registry.create("d1", ObjectKind::Directory, &alice, None).expect("d1");
        registry.create("f2", ObjectKind::File, &bob, None).expect("f2");

        assert_eq!(registry.list(Some(ObjectKind::File), None).len(), 2);
        assert_eq!(registry.list(None, Some(&alice)).len(), 2);
        assert_eq!(registry.list(Some(ObjectKind::File), Some(&alice)).len(), 1);
        assert_eq!(registry.by_owner(&bob).len(), 1);
    }

    #[test]
    fn children_follow_parent_links() {
        let mut registry = ObjectRegistry::new();
        let alice = EntityId::from("alice");
        let dir = registry
            .create("dir", ObjectKind::Directory, &alice, None)
            .expect("dir");
        registry
            .create("inside", ObjectKind::File, &alice, Some(dir.clone()))
            .expect("inside");
        registry.create("outside", ObjectKind::File, &alice, None).expect("outside");

        let children = registry.children(&dir);
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].name, "inside");
    }
}
