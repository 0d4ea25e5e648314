//! The rights graph and its four rewriting operations.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tgsh_types::{EntityId, RightSet};
use tracing::debug;

/// One edge of a protection-state snapshot.
///
/// Only ever produced by [`RightsGraph::all_edges`]; edges with an
/// empty right-set do not exist in the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    /// The entity holding the rights.
    pub subject: EntityId,
    /// The entity the rights apply to.
    pub object: EntityId,
    /// The non-empty right-set on this edge.
    pub rights: RightSet,
}

impl std::fmt::Display for Edge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}: {}", self.subject, self.object, self.rights)
    }
}

/// The discretionary access-control graph of the Take-Grant model.
///
/// Three structures are kept in lockstep by every mutator:
///
/// - the primary edge map `(subject, object) -> RightSet`;
/// - a subject index `subject -> {objects it touches}`;
/// - an object index `object -> {subjects touching it}`.
///
/// Edge existence is a derived fact: an edge is stored only while its
/// right-set is non-empty, and removing the last right deletes the
/// edge and both index entries. Ordered maps make every snapshot
/// deterministic for a given edge-set.
///
/// Self-referential edges (`subject == object`) are permitted and
/// carry no special casing.
///
/// The graph provides no internal locking; a concurrent host must
/// wrap it (the app layer uses one `RwLock` around the whole graph).
///
/// # Example
///
/// ```
/// use tgsh_graph::RightsGraph;
/// use tgsh_types::{EntityId, RightSet};
///
/// let alice = EntityId::from("alice");
/// let bob = EntityId::from("bob");
/// let file = EntityId::from("file1");
///
/// let mut graph = RightsGraph::new();
/// graph.create(&alice, &file, None); // all six rights
///
/// // Alice propagates read/write to Bob through her GRANT right.
/// assert!(graph.grant(&alice, &file, &bob, RightSet::READ | RightSet::WRITE));
/// assert!(graph.has_right(&bob, &file, RightSet::READ));
/// assert!(!graph.has_right(&bob, &file, RightSet::EXECUTE));
/// ```
#[derive(Debug, Default, Clone)]
pub struct RightsGraph {
    /// Primary edge map. Key order gives deterministic snapshots.
    edges: BTreeMap<(EntityId, EntityId), RightSet>,
    /// subject -> objects it has any edge to.
    subject_index: BTreeMap<EntityId, BTreeSet<EntityId>>,
    /// object -> subjects having any edge to it.
    object_index: BTreeMap<EntityId, BTreeSet<EntityId>>,
}

impl RightsGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Unconditionally inserts `rights` into the edge's right-set,
    /// creating the edge and its index entries if absent. Idempotent.
    pub fn add_right(&mut self, subject: &EntityId, object: &EntityId, rights: RightSet) {
        if rights.is_empty() {
            return;
        }
        let entry = self
            .edges
            .entry((subject.clone(), object.clone()))
            .or_insert_with(RightSet::empty);
        *entry |= rights;

        self.subject_index
            .entry(subject.clone())
            .or_default()
            .insert(object.clone());
        self.object_index
            .entry(object.clone())
            .or_default()
            .insert(subject.clone());
    }

    /// Removes `rights` from the edge if present. When the right-set
    /// empties, the edge and both index entries disappear. A missing
    /// edge or right is a no-op, not an error.
    pub fn remove_right(&mut self, subject: &EntityId, object: &EntityId, rights: RightSet) {
        let key = (subject.clone(), object.clone());
        let Some(entry) = self.edges.get_mut(&key) else {
            return;
        };
        *entry -= rights;
        if entry.is_empty() {
            self.edges.remove(&key);
            self.unindex(subject, object);
        }
    }

    /// Removes every edge in which `object` appears as the object.
    ///
    /// This is the bulk primitive the object layer uses when an
    /// entity is deleted; the graph itself has no per-entity
    /// deletion concept.
    pub fn remove_object_edges(&mut self, object: &EntityId) {
        let subjects: Vec<EntityId> = self
            .object_index
            .get(object)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default();
        for subject in subjects {
            self.edges.remove(&(subject.clone(), object.clone()));
            self.unindex(&subject, object);
        }
    }

    /// True iff the edge exists and contains every right in `rights`.
    #[must_use]
    pub fn has_right(&self, subject: &EntityId, object: &EntityId, rights: RightSet) -> bool {
        self.edges
            .get(&(subject.clone(), object.clone()))
            .is_some_and(|held| held.contains(rights))
    }

    /// The edge's right-set, or the empty set if no edge exists.
    /// Returned by value; callers can never alias internal storage.
    #[must_use]
    pub fn rights(&self, subject: &EntityId, object: &EntityId) -> RightSet {
        self.edges
            .get(&(subject.clone(), object.clone()))
            .copied()
            .unwrap_or_else(RightSet::empty)
    }

    /// The CREATE rewrite: the subject gains `rights` on the object
    /// (all six when `None`). Unconditional in this model, so always
    /// `true`; `subject == object` is permitted.
    pub fn create(&mut self, subject: &EntityId, object: &EntityId, rights: Option<RightSet>) -> bool {
        let rights = rights.unwrap_or(RightSet::ALL);
        self.add_right(subject, object, rights);
        debug!(%subject, %object, rights = %rights, "create");
        true
    }

    /// The TAKE rewrite.
    ///
    /// Succeeds iff `subject` holds TAKE on `source` and the
    /// intersection of `rights` with what `source` holds on `target`
    /// is non-empty. On success the subject gains exactly that
    /// intersection; rights are imported, never manufactured. The
    /// operation applies the whole intersection or nothing.
    pub fn take(
        &mut self,
        subject: &EntityId,
        source: &EntityId,
        target: &EntityId,
        rights: RightSet,
    ) -> bool {
        if !self.has_right(subject, source, RightSet::TAKE) {
            debug!(%subject, %source, "take refused: no TAKE right on source");
            return false;
        }
        let available = rights & self.rights(source, target);
        if available.is_empty() {
            debug!(%subject, %source, %target, "take refused: empty intersection");
            return false;
        }
        self.add_right(subject, target, available);
        debug!(%subject, %source, %target, gained = %available, "take");
        true
    }

    /// The GRANT rewrite.
    ///
    /// Succeeds iff `subject` holds GRANT on `source` and the
    /// intersection of `rights` with the subject's own rights on
    /// `source` is non-empty. On success `target_subject` gains
    /// exactly that intersection on `source`.
    ///
    /// The graph enforces only this precondition, not intent: any
    /// principal satisfying it (including a trojan running under a
    /// legitimate user) may propagate access to a third party.
    pub fn grant(
        &mut self,
        subject: &EntityId,
        source: &EntityId,
        target_subject: &EntityId,
        rights: RightSet,
    ) -> bool {
        if !self.has_right(subject, source, RightSet::GRANT) {
            debug!(%subject, %source, "grant refused: no GRANT right on source");
            return false;
        }
        let available = rights & self.rights(subject, source);
        if available.is_empty() {
            debug!(%subject, %source, %target_subject, "grant refused: empty intersection");
            return false;
        }
        self.add_right(target_subject, source, available);
        debug!(%subject, %source, %target_subject, gained = %available, "grant");
        true
    }

    /// The REMOVE rewrite: drops `rights` from the edge via
    /// [`remove_right`](Self::remove_right).
    pub fn remove(&mut self, subject: &EntityId, object: &EntityId, rights: RightSet) {
        self.remove_right(subject, object, rights);
        debug!(%subject, %object, rights = %rights, "remove");
    }

    /// Snapshot of all non-empty edges, ordered by (subject, object).
    /// Deterministic for a given edge-set.
    #[must_use]
    pub fn all_edges(&self) -> Vec<Edge> {
        self.edges
            .iter()
            .map(|((subject, object), rights)| Edge {
                subject: subject.clone(),
                object: object.clone(),
                rights: *rights,
            })
            .collect()
    }

    /// Objects the subject has any edge to. Empty if unknown.
    #[must_use]
    pub fn subject_objects(&self, subject: &EntityId) -> BTreeSet<EntityId> {
        self.subject_index.get(subject).cloned().unwrap_or_default()
    }

    /// Subjects having any edge to the object. Empty if unknown.
    #[must_use]
    pub fn object_subjects(&self, object: &EntityId) -> BTreeSet<EntityId> {
        self.object_index.get(object).cloned().unwrap_or_default()
    }

    /// Every identifier appearing in any edge, as subject or object.
    #[must_use]
    pub fn entities(&self) -> BTreeSet<EntityId> {
        let mut all = BTreeSet::new();
        for (subject, object) in self.edges.keys() {
            all.insert(subject.clone());
            all.insert(object.clone());
        }
        all
    }

    /// Number of stored (non-empty) edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    fn unindex(&mut self, subject: &EntityId, object: &EntityId) {
        if let Some(set) = self.subject_index.get_mut(subject) {
            set.remove(object);
            if set.is_empty() {
                self.subject_index.remove(subject);
            }
        }
        if let Some(set) = self.object_index.get_mut(object) {
            set.remove(subject);
            if set.is_empty() {
                self.object_index.remove(object);
            }
        }
    }
}
