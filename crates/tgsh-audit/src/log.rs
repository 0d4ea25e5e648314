//! The in-memory audit log with JSON persistence.

use crate::{AuditError, AuditEvent, EventKind};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tgsh_types::EntityId;
use tracing::{info, warn};

/// On-disk shape of the event file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct EventFile {
    events: Vec<AuditEvent>,
}

/// Append-only event log with filtered queries.
///
/// Each appended record is also emitted on the `tracing` subscriber
/// (info for successes, warn for failures), so the structured log
/// doubles as the live operator feed.
///
/// # Example
///
/// ```
/// use tgsh_audit::{AuditLog, EventKind};
/// use tgsh_types::EntityId;
/// use serde_json::json;
///
/// let mut log = AuditLog::new();
/// log.record(EventKind::Login, &EntityId::from("alice"), json!(null));
/// log.record_failure(EventKind::Login, &EntityId::from("mallory"), json!(null));
///
/// assert_eq!(log.all_events().len(), 2);
/// assert_eq!(log.failures().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct AuditLog {
    events: Vec<AuditEvent>,
}

impl AuditLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads events from a JSON file. A missing or corrupt file
    /// yields an empty log with a warning, same policy as the user
    /// store.
    #[must_use]
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            return Self::new();
        }
        match std::fs::read_to_string(path) {
            Ok(raw) => match serde_json::from_str::<EventFile>(&raw) {
                Ok(file) => Self {
                    events: file.events,
                },
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "corrupt audit file, starting empty");
                    Self::new()
                }
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "unreadable audit file, starting empty");
                Self::new()
            }
        }
    }

    /// Saves all events to a JSON file, creating parent directories.
    ///
    /// # Errors
    ///
    /// [`AuditError::Io`] or [`AuditError::Serialize`].
    pub fn save(&self, path: &Path) -> Result<(), AuditError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = EventFile {
            events: self.events.clone(),
        };
        std::fs::write(path, serde_json::to_string_pretty(&file)?)?;
        Ok(())
    }

    /// Records a successful event.
    pub fn record(&mut self, kind: EventKind, subject: &EntityId, details: serde_json::Value) {
        self.push(kind, subject, true, details);
    }

    /// Records a failed event.
    pub fn record_failure(
        &mut self,
        kind: EventKind,
        subject: &EntityId,
        details: serde_json::Value,
    ) {
        self.push(kind, subject, false, details);
    }

    /// All events, oldest first.
    #[must_use]
    pub fn all_events(&self) -> &[AuditEvent] {
        &self.events
    }

    /// Events of one kind.
    #[must_use]
    pub fn events_by_kind(&self, kind: EventKind) -> Vec<&AuditEvent> {
        self.events.iter().filter(|e| e.kind == kind).collect()
    }

    /// Events recorded for one subject.
    #[must_use]
    pub fn events_by_subject(&self, subject: &EntityId) -> Vec<&AuditEvent> {
        self.events.iter().filter(|e| &e.subject == subject).collect()
    }

    /// All unsuccessful events.
    #[must_use]
    pub fn failures(&self) -> Vec<&AuditEvent> {
        self.events.iter().filter(|e| !e.success).collect()
    }

    /// All successful events.
    #[must_use]
    pub fn successes(&self) -> Vec<&AuditEvent> {
        self.events.iter().filter(|e| e.success).collect()
    }

    /// Denied access attempts.
    #[must_use]
    pub fn denied_accesses(&self) -> Vec<&AuditEvent> {
        self.events_by_kind(EventKind::AccessDenied)
    }

    /// Drops every event.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    fn push(&mut self, kind: EventKind, subject: &EntityId, success: bool, details: serde_json::Value) {
        let event = AuditEvent {
            timestamp: Utc::now(),
            kind,
            subject: subject.clone(),
            success,
            details,
        };
        if success {
            info!(kind = %event.kind, subject = %event.subject, details = %event.details, "audit");
        } else {
            warn!(kind = %event.kind, subject = %event.subject, details = %event.details, "audit: failed");
        }
        self.events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn id(s: &str) -> EntityId {
        EntityId::from(s)
    }

    #[test]
    fn records_keep_order_and_status() {
        let mut log = AuditLog::new();
        log.record(EventKind::Register, &id("alice"), json!(null));
        log.record(EventKind::Login, &id("alice"), json!(null));
        log.record_failure(EventKind::Login, &id("mallory"), json!(null));

        let events = log.all_events();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].kind, EventKind::Register);
        assert!(events[1].success);
        assert!(!events[2].success);
    }

    #[test]
    fn filters_by_kind_subject_and_status() {
        let mut log = AuditLog::new();
        log.record(EventKind::ReadFile, &id("alice"), json!({"object": "f1"}));
        log.record_failure(EventKind::AccessDenied, &id("bob"), json!({"object": "f1"}));
        log.record(EventKind::WriteFile, &id("alice"), json!({"object": "f1"}));

        assert_eq!(log.events_by_kind(EventKind::ReadFile).len(), 1);
        assert_eq!(log.events_by_subject(&id("alice")).len(), 2);
        assert_eq!(log.failures().len(), 1);
        assert_eq!(log.successes().len(), 2);
        assert_eq!(log.denied_accesses().len(), 1);
    }

    #[test]
    fn clear_empties_the_log() {
        let mut log = AuditLog::new();
        log.record(EventKind::Login, &id("alice"), json!(null));
        log.clear();
        assert!(log.all_events().is_empty());
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("data").join("audit.json");

        let mut log = AuditLog::new();
        log.record(EventKind::Take, &id("alice"), json!({"source": "p", "target": "f"}));
        log.record_failure(EventKind::Grant, &id("bob"), json!(null));
        log.save(&path).expect("save");

        let loaded = AuditLog::load(&path);
        assert_eq!(loaded.all_events(), log.all_events());
    }

    #[test]
    fn load_missing_file_starts_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let log = AuditLog::load(&dir.path().join("nope.json"));
        assert!(log.all_events().is_empty());
    }
}
