//! Kernel-gated file-system simulation.

use crate::{ObjectKind, ObjectRecord, ObjectRegistry, VfsError};
use std::collections::BTreeMap;
use tgsh_graph::RightsGraph;
use tgsh_kernel::SecurityKernel;
use tgsh_types::{EntityId, RightSet};
use tracing::{debug, warn};

/// The simulated file store.
///
/// Owns the [`ObjectRegistry`] and the file contents; borrows the
/// rights graph per call (read-only for queries, mutable where the
/// operation rewrites the protection state). Every access decision
/// is delegated to [`SecurityKernel::can_access`], so reachable but
/// not-yet-taken rights already open the door.
#[derive(Debug, Default)]
pub struct Vfs {
    registry: ObjectRegistry,
    contents: BTreeMap<EntityId, String>,
}

impl Vfs {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read access to the registry (listings, lookups).
    #[must_use]
    pub fn registry(&self) -> &ObjectRegistry {
        &self.registry
    }

    /// Mutable registry access (subject registration at login time).
    pub fn registry_mut(&mut self) -> &mut ObjectRegistry {
        &mut self.registry
    }

    /// Creates a file owned by `owner` with the full right-set on it.
    ///
    /// # Errors
    ///
    /// [`VfsError::NameTaken`] when the name is already registered.
    pub fn create_file(
        &mut self,
        graph: &mut RightsGraph,
        owner: &EntityId,
        name: &str,
        parent: Option<EntityId>,
    ) -> Result<EntityId, VfsError> {
        let id = self.registry.create(name, ObjectKind::File, owner, parent)?;
        graph.create(owner, &id, None);
        self.contents.insert(id.clone(), String::new());
        debug!(%owner, %id, name, "file created");
        Ok(id)
    }

    /// Creates a directory owned by `owner` with the full right-set.
    ///
    /// # Errors
    ///
    /// [`VfsError::NameTaken`] when the name is already registered.
    pub fn create_dir(
        &mut self,
        graph: &mut RightsGraph,
        owner: &EntityId,
        name: &str,
        parent: Option<EntityId>,
    ) -> Result<EntityId, VfsError> {
        let id = self
            .registry
            .create(name, ObjectKind::Directory, owner, parent)?;
        graph.create(owner, &id, None);
        debug!(%owner, %id, name, "directory created");
        Ok(id)
    }

    /// Reads a file's content, READ-gated.
    ///
    /// # Errors
    ///
    /// [`VfsError::NotFound`], [`VfsError::WrongKind`] or
    /// [`VfsError::AccessDenied`].
    pub fn read_file(
        &self,
        graph: &RightsGraph,
        subject: &EntityId,
        identifier: &str,
    ) -> Result<String, VfsError> {
        let record = self.file_record(identifier)?;
        self.authorize(graph, subject, &record.id, RightSet::READ)?;
        Ok(self.contents.get(&record.id).cloned().unwrap_or_default())
    }

    /// Overwrites a file's content, WRITE-gated.
    ///
    /// # Errors
    ///
    /// [`VfsError::NotFound`], [`VfsError::WrongKind`] or
    /// [`VfsError::AccessDenied`].
    pub fn write_file(
        &mut self,
        graph: &RightsGraph,
        subject: &EntityId,
        identifier: &str,
        content: &str,
    ) -> Result<(), VfsError> {
        let id = self.file_record(identifier)?.id.clone();
        self.authorize(graph, subject, &id, RightSet::WRITE)?;
        self.contents.insert(id, content.to_string());
        Ok(())
    }

    /// Simulates executing a file, EXECUTE-gated.
    ///
    /// # Errors
    ///
    /// [`VfsError::NotFound`], [`VfsError::WrongKind`] or
    /// [`VfsError::AccessDenied`].
    pub fn execute_file(
        &self,
        graph: &RightsGraph,
        subject: &EntityId,
        identifier: &str,
    ) -> Result<(), VfsError> {
        let record = self.file_record(identifier)?;
        self.authorize(graph, subject, &record.id, RightSet::EXECUTE)
    }

    /// Deletes an object: the owner, or any subject that can obtain
    /// OWN on it, may delete. Removes content, every incoming graph
    /// edge (bulk primitive) and the registry record.
    ///
    /// # Errors
    ///
    /// [`VfsError::NotFound`] or [`VfsError::AccessDenied`].
    pub fn delete_object(
        &mut self,
        graph: &mut RightsGraph,
        subject: &EntityId,
        identifier: &str,
    ) -> Result<ObjectRecord, VfsError> {
        let record = self
            .registry
            .get(identifier)
            .cloned()
            .ok_or_else(|| VfsError::NotFound {
                identifier: identifier.to_string(),
            })?;

        if &record.owner != subject {
            self.authorize(graph, subject, &record.id, RightSet::OWN)?;
        }

        self.contents.remove(&record.id);
        graph.remove_object_edges(&record.id);
        self.registry.remove(record.id.as_str());
        debug!(%subject, id = %record.id, name = %record.name, "object deleted");
        Ok(record)
    }

    /// Lists a directory's children, READ-gated on the directory.
    ///
    /// # Errors
    ///
    /// [`VfsError::NotFound`], [`VfsError::WrongKind`] or
    /// [`VfsError::AccessDenied`].
    pub fn list_directory(
        &self,
        graph: &RightsGraph,
        subject: &EntityId,
        identifier: &str,
    ) -> Result<Vec<ObjectRecord>, VfsError> {
        let record = self
            .registry
            .get(identifier)
            .ok_or_else(|| VfsError::NotFound {
                identifier: identifier.to_string(),
            })?;
        if record.kind != ObjectKind::Directory {
            return Err(VfsError::WrongKind {
                identifier: identifier.to_string(),
                expected: ObjectKind::Directory,
            });
        }
        self.authorize(graph, subject, &record.id, RightSet::READ)?;
        Ok(self
            .registry
            .children(&record.id)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Raw content lookup without an access check; a test and
    /// maintenance hook, mirrors nothing the shell exposes.
    #[must_use]
    pub fn raw_content(&self, id: &EntityId) -> Option<&str> {
        self.contents.get(id).map(String::as_str)
    }

    fn file_record(&self, identifier: &str) -> Result<&ObjectRecord, VfsError> {
        let record = self
            .registry
            .get(identifier)
            .ok_or_else(|| VfsError::NotFound {
                identifier: identifier.to_string(),
            })?;
        if record.kind != ObjectKind::File {
            return Err(VfsError::WrongKind {
                identifier: identifier.to_string(),
                expected: ObjectKind::File,
            });
        }
        Ok(record)
    }

    fn authorize(
        &self,
        graph: &RightsGraph,
        subject: &EntityId,
        object: &EntityId,
        required: RightSet,
    ) -> Result<(), VfsError> {
        if SecurityKernel::new(graph).can_access(subject, object, required) {
            Ok(())
        } else {
            warn!(%subject, %object, %required, "access denied");
            Err(VfsError::AccessDenied {
                subject: subject.clone(),
                object: object.clone(),
                required,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> EntityId {
        EntityId::from(s)
    }

    fn setup() -> (RightsGraph, Vfs, EntityId) {
        let mut graph = RightsGraph::new();
        let mut vfs = Vfs::new();
        let alice = id("alice");
        let file = vfs
            .create_file(&mut graph, &alice, "secret.txt", None)
            .expect("create");
        (graph, vfs, file)
    }

    #[test]
    fn creator_gets_all_rights_and_empty_content() {
        let (graph, vfs, file) = setup();
        assert_eq!(graph.rights(&id("alice"), &file), RightSet::ALL);
        assert_eq!(
            vfs.read_file(&graph, &id("alice"), file.as_str()).expect("read"),
            ""
        );
    }

    #[test]
    fn write_then_read_roundtrip_by_name() {
        let (graph, mut vfs, _file) = setup();
        vfs.write_file(&graph, &id("alice"), "secret.txt", "top secret")
            .expect("write");
        assert_eq!(
            vfs.read_file(&graph, &id("alice"), "secret.txt").expect("read"),
            "top secret"
        );
    }

    #[test]
    fn read_denied_without_reachable_right() {
        let (graph, vfs, file) = setup();
        let err = vfs.read_file(&graph, &id("mallory"), file.as_str()).unwrap_err();
        assert_eq!(
            err,
            VfsError::AccessDenied {
                subject: id("mallory"),
                object: file,
                required: RightSet::READ,
            }
        );
    }

    #[test]
    fn granted_subject_can_read() {
        let (mut graph, mut vfs, file) = setup();
        vfs.write_file(&graph, &id("alice"), "secret.txt", "data")
            .expect("write");
        assert!(graph.grant(&id("alice"), &file, &id("bob"), RightSet::READ));
        assert_eq!(
            vfs.read_file(&graph, &id("bob"), "secret.txt").expect("read"),
            "data"
        );
        // WRITE was not granted.
        assert!(vfs
            .write_file(&graph, &id("bob"), "secret.txt", "tamper")
            .is_err());
    }

    #[test]
    fn execute_requires_execute_right() {
        let (mut graph, vfs, file) = setup();
        assert!(vfs.execute_file(&graph, &id("alice"), "secret.txt").is_ok());
        graph.remove(&id("alice"), &file, RightSet::EXECUTE);
        // OWN etc. remain, but EXECUTE is gone and nothing can re-derive it.
        assert!(vfs.execute_file(&graph, &id("alice"), "secret.txt").is_err());
    }

    #[test]
    fn reading_a_directory_is_wrong_kind() {
        let (mut graph, mut vfs, _file) = setup();
        vfs.create_dir(&mut graph, &id("alice"), "docs", None)
            .expect("dir");
        let err = vfs.read_file(&graph, &id("alice"), "docs").unwrap_err();
        assert_eq!(
            err,
            VfsError::WrongKind {
                identifier: "docs".to_string(),
                expected: ObjectKind::File,
            }
        );
    }

    #[test]
    fn delete_by_owner_clears_content_edges_and_record() {
        let (mut graph, mut vfs, file) = setup();
        graph.grant(&id("alice"), &file, &id("bob"), RightSet::READ);

        vfs.delete_object(&mut graph, &id("alice"), "secret.txt")
            .expect("delete");

        assert!(!vfs.registry().exists("secret.txt"));
        assert!(vfs.raw_content(&file).is_none());
        assert!(graph.rights(&id("alice"), &file).is_empty());
        assert!(graph.rights(&id("bob"), &file).is_empty());
        assert!(graph.object_subjects(&file).is_empty());
    }

    #[test]
    fn delete_by_non_owner_requires_own_right() {
        let (mut graph, mut vfs, file) = setup();
        let err = vfs
            .delete_object(&mut graph, &id("bob"), "secret.txt")
            .unwrap_err();
        assert_eq!(
            err,
            VfsError::AccessDenied {
                subject: id("bob"),
                object: file.clone(),
                required: RightSet::OWN,
            }
        );

        graph.grant(&id("alice"), &file, &id("bob"), RightSet::OWN);
        assert!(vfs.delete_object(&mut graph, &id("bob"), "secret.txt").is_ok());
    }

    #[test]
    fn list_directory_shows_children_read_gated() {
        let (mut graph, mut vfs, _file) = setup();
        let dir = vfs
            .create_dir(&mut graph, &id("alice"), "docs", None)
            .expect("dir");
        vfs.create_file(&mut graph, &id("alice"), "inside.txt", Some(dir.clone()))
            .expect("inside");

        let listing = vfs
            .list_directory(&graph, &id("alice"), "docs")
            .expect("list");
        assert_eq!(listing.len(), 1);
        assert_eq!(listing[0].name, "inside.txt");

        assert!(vfs.list_directory(&graph, &id("bob"), "docs").is_err());
    }

    #[test]
    fn missing_object_is_not_found() {
        let (graph, vfs, _file) = setup();
        assert_eq!(
            vfs.read_file(&graph, &id("alice"), "ghost").unwrap_err(),
            VfsError::NotFound {
                identifier: "ghost".to_string()
            }
        );
    }
}
