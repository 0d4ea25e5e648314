//! Admin-only command handlers.
//!
//! Admin commands bypass the rewrite rules and edit the protection
//! state directly, which is exactly what makes them admin-only. Every
//! one of them lands in the audit trail as an [`EventKind::AdminAction`].

use crate::{AdminCommand, App, AppError};
use serde_json::json;
use tgsh_audit::EventKind;
use tgsh_auth::AuthError;
use tgsh_types::{EntityId, RightSet};
use tgsh_vfs::ObjectKind;

impl App {
    pub(crate) fn execute_admin(&mut self, command: AdminCommand) -> Result<String, AppError> {
        let admin = self.require_admin()?.subject();
        match command {
            AdminCommand::ListUsers => Ok(self.render_users()),
            AdminCommand::ListObjects => Ok(self.render_objects()),
            AdminCommand::Matrix => Ok(self.render_matrix()),
            AdminCommand::Grant {
                subject,
                object,
                rights,
            } => self.edit_edge(&admin, &subject, &object, rights, true),
            AdminCommand::Revoke {
                subject,
                object,
                rights,
            } => self.edit_edge(&admin, &subject, &object, rights, false),
            AdminCommand::SetAdmin { username, admin: flag } => {
                self.set_admin(&admin, &username, flag)
            }
            AdminCommand::DeleteUser { username } => self.delete_user(&admin, &username),
        }
    }

    fn render_users(&self) -> String {
        let lines: Vec<String> = self
            .users()
            .list_users()
            .iter()
            .map(|name| {
                if self.users().is_admin(name) {
                    format!("{name} (admin)")
                } else {
                    (*name).to_string()
                }
            })
            .collect();
        if lines.is_empty() {
            "(no users)".to_string()
        } else {
            lines.join("\n")
        }
    }

    fn render_objects(&self) -> String {
        let registry = self.vfs().registry();
        let lines: Vec<String> = registry
            .list(None, None)
            .iter()
            .map(|r| format!("{} {} owner={} [{}]", r.kind, r.name, r.owner, r.id))
            .collect();
        if lines.is_empty() {
            "(no objects)".to_string()
        } else {
            lines.join("\n")
        }
    }

    /// Renders every edge of the graph, one line per edge, in the
    /// graph's deterministic order.
    fn render_matrix(&self) -> String {
        let edges = self.graph().all_edges();
        if edges.is_empty() {
            return "(no edges)".to_string();
        }
        edges
            .iter()
            .map(|e| {
                format!(
                    "{} -> {}: {}",
                    self.name_of(&e.subject),
                    self.name_of(&e.object),
                    e.rights
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn edit_edge(
        &mut self,
        admin: &EntityId,
        subject: &str,
        object: &str,
        rights: RightSet,
        add: bool,
    ) -> Result<String, AppError> {
        let subject_id = self.resolve(subject)?;
        let object_id = self.resolve(object)?;
        {
            let mut graph = self.graph_mut();
            if add {
                graph.add_right(&subject_id, &object_id, rights);
            } else {
                graph.remove(&subject_id, &object_id, rights);
            }
        }
        let action = if add { "grant" } else { "revoke" };
        self.audit_mut().record(
            EventKind::AdminAction,
            admin,
            json!({
                "action": action,
                "subject": subject_id.as_str(),
                "object": object_id.as_str(),
                "rights": rights.to_string(),
            }),
        );
        Ok(format!("{action}: {subject} {rights} on {object}"))
    }

    fn set_admin(
        &mut self,
        admin: &EntityId,
        username: &str,
        flag: bool,
    ) -> Result<String, AppError> {
        self.users_mut().set_admin(username, flag)?;
        self.audit_mut().record(
            EventKind::AdminAction,
            admin,
            json!({ "action": "set_admin", "username": username, "admin": flag }),
        );
        // The flag is read at login, so a live session keeps its old
        // privileges until the user logs in again.
        Ok(format!(
            "{username} is {} admin from next login",
            if flag { "an" } else { "no longer an" }
        ))
    }

    fn delete_user(&mut self, admin: &EntityId, username: &str) -> Result<String, AppError> {
        if !self.users().contains(username) {
            return Err(AppError::Auth(AuthError::UnknownUser {
                username: username.to_string(),
            }));
        }
        let id = EntityId::from(username);
        let owns_objects = self
            .vfs()
            .registry()
            .by_owner(&id)
            .iter()
            .any(|r| r.kind != ObjectKind::Subject);
        if owns_objects {
            return Err(AppError::OperationDenied {
                operation: "rmuser",
                reason: format!("{username} still owns objects, delete them first"),
            });
        }

        {
            let mut graph = self.graph_mut();
            let outgoing: Vec<EntityId> = graph.subject_objects(&id).into_iter().collect();
            for object in outgoing {
                graph.remove(&id, &object, RightSet::ALL);
            }
            graph.remove_object_edges(&id);
        }
        self.users_mut().remove(username);
        self.registry_mut().remove(username);
        if self.session().is_some_and(|s| s.username() == username) {
            // An admin removing their own account ends the session.
            let _ = self.execute(crate::Command::Logout);
        }
        self.audit_mut().record(
            EventKind::AdminAction,
            admin,
            json!({ "action": "delete_user", "username": username }),
        );
        Ok(format!("removed user {username}"))
    }
}
