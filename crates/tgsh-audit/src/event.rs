//! Audit event types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tgsh_types::EntityId;

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A user logged in.
    Login,
    /// A user logged out.
    Logout,
    /// A new user registered.
    Register,
    /// A file or directory was created.
    CreateObject,
    /// An object was deleted.
    DeleteObject,
    /// A file was read.
    ReadFile,
    /// A file was written.
    WriteFile,
    /// A file was executed.
    ExecuteFile,
    /// A take rewrite was attempted.
    Take,
    /// A grant rewrite was attempted.
    Grant,
    /// An access check came back positive.
    AccessGranted,
    /// An access check or gated operation was denied.
    AccessDenied,
    /// An administrative action ran.
    AdminAction,
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Login => "login",
            Self::Logout => "logout",
            Self::Register => "register",
            Self::CreateObject => "create_object",
            Self::DeleteObject => "delete_object",
            Self::ReadFile => "read_file",
            Self::WriteFile => "write_file",
            Self::ExecuteFile => "execute_file",
            Self::Take => "take",
            Self::Grant => "grant",
            Self::AccessGranted => "access_granted",
            Self::AccessDenied => "access_denied",
            Self::AdminAction => "admin_action",
        };
        f.write_str(name)
    }
}

/// One recorded event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// When it happened.
    pub timestamp: DateTime<Utc>,
    /// What happened.
    pub kind: EventKind,
    /// The subject that acted (or tried to).
    pub subject: EntityId,
    /// Whether the operation succeeded.
    pub success: bool,
    /// Free-form details: object ids, right symbols, targets.
    pub details: serde_json::Value,
}

impl std::fmt::Display for AuditEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = if self.success { "ok" } else { "FAILED" };
        write!(
            f,
            "[{}] {} {} subject={}",
            self.timestamp.to_rfc3339(),
            status,
            self.kind,
            self.subject
        )?;
        if !self.details.is_null() {
            write!(f, " {}", self.details)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn kind_serializes_snake_case() {
        let json = serde_json::to_string(&EventKind::AccessDenied).expect("serialize");
        assert_eq!(json, "\"access_denied\"");
    }

    #[test]
    fn display_includes_status_and_subject() {
        let event = AuditEvent {
            timestamp: Utc::now(),
            kind: EventKind::ReadFile,
            subject: EntityId::from("alice"),
            success: false,
            details: json!({"object": "secret.txt"}),
        };
        let line = event.to_string();
        assert!(line.contains("FAILED"), "got: {line}");
        assert!(line.contains("read_file"), "got: {line}");
        assert!(line.contains("alice"), "got: {line}");
        assert!(line.contains("secret.txt"), "got: {line}");
    }
}
