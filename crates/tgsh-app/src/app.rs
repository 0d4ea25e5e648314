//! The shell application state and command dispatch.

use crate::command::HELP;
use crate::{AppError, AuditFilter, Command};
use parking_lot::{RwLock, RwLockReadGuard};
use serde_json::json;
use std::path::Path;
use tgsh_audit::{AuditLog, EventKind};
use tgsh_auth::{Session, UserStore};
use tgsh_graph::RightsGraph;
use tgsh_kernel::SecurityKernel;
use tgsh_types::{EntityId, RightSet};
use tgsh_vfs::{Vfs, VfsError};
use tracing::info;

const USERS_FILE: &str = "users.json";
const AUDIT_FILE: &str = "audit.json";

/// The assembled shell: rights graph, object store, user store,
/// audit trail and the current session.
///
/// The graph sits behind a lock so the kernel can hold a read view
/// while unrelated state mutates. The protection state itself is
/// ephemeral; only users and the audit trail persist across runs.
///
/// The first user to register receives the admin flag, so a fresh
/// installation can be bootstrapped from the prompt.
pub struct App {
    graph: RwLock<RightsGraph>,
    vfs: Vfs,
    users: UserStore,
    audit: AuditLog,
    session: Option<Session>,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    /// Creates an empty shell with no users and no objects.
    #[must_use]
    pub fn new() -> Self {
        Self {
            graph: RwLock::new(RightsGraph::new()),
            vfs: Vfs::new(),
            users: UserStore::new(),
            audit: AuditLog::new(),
            session: None,
        }
    }

    /// Creates a shell restoring users and audit trail from
    /// `data_dir`. Missing files start empty.
    #[must_use]
    pub fn load(data_dir: &Path) -> Self {
        Self {
            graph: RwLock::new(RightsGraph::new()),
            vfs: Vfs::new(),
            users: UserStore::load(&data_dir.join(USERS_FILE)),
            audit: AuditLog::load(&data_dir.join(AUDIT_FILE)),
            session: None,
        }
    }

    /// Persists users and audit trail under `data_dir`.
    ///
    /// # Errors
    ///
    /// Propagates the store's i/o and serialization errors.
    pub fn save(&self, data_dir: &Path) -> Result<(), AppError> {
        self.users.save(&data_dir.join(USERS_FILE))?;
        self.audit.save(&data_dir.join(AUDIT_FILE))?;
        Ok(())
    }

    /// The current session, if any.
    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Read access to the rights graph.
    #[must_use]
    pub fn graph(&self) -> RwLockReadGuard<'_, RightsGraph> {
        self.graph.read()
    }

    /// Read access to the object store.
    #[must_use]
    pub fn vfs(&self) -> &Vfs {
        &self.vfs
    }

    /// Read access to the user store.
    #[must_use]
    pub fn users(&self) -> &UserStore {
        &self.users
    }

    /// Read access to the audit trail.
    #[must_use]
    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    /// The REPL prompt for the current session.
    #[must_use]
    pub fn prompt(&self) -> String {
        match &self.session {
            Some(session) => format!("{}@tgsh> ", session.username()),
            None => "tgsh> ".to_string(),
        }
    }

    /// Parses and executes one line of shell input.
    ///
    /// # Errors
    ///
    /// Parse errors and every [`AppError`] the command can raise.
    pub fn execute_line(&mut self, line: &str) -> Result<String, AppError> {
        let command = Command::parse(line)?;
        self.execute(command)
    }

    /// Executes one parsed command, returning the text to print.
    ///
    /// # Errors
    ///
    /// See the individual command sections of [`AppError`].
    pub fn execute(&mut self, command: Command) -> Result<String, AppError> {
        match command {
            Command::Register { username, password } => self.register(&username, &password),
            Command::Login { username, password } => self.login(&username, &password),
            Command::Logout => self.logout(),
            Command::Whoami => Ok(match &self.session {
                Some(session) => session.to_string(),
                None => "not logged in".to_string(),
            }),
            Command::CreateFile { name, parent } => self.create_object(&name, parent, true),
            Command::CreateDir { name, parent } => self.create_object(&name, parent, false),
            Command::Read { identifier } => self.read(&identifier),
            Command::Write {
                identifier,
                content,
            } => self.write(&identifier, &content),
            Command::Execute { identifier } => self.exec(&identifier),
            Command::Delete { identifier } => self.delete(&identifier),
            Command::List { directory } => self.list(directory.as_deref()),
            Command::Take {
                source,
                target,
                rights,
            } => self.take(&source, &target, rights),
            Command::Grant {
                source,
                target_subject,
                rights,
            } => self.grant(&source, &target_subject, rights),
            Command::Check { object, rights } => self.check(&object, rights),
            Command::Admin(admin) => self.execute_admin(admin),
            Command::Audit(filter) => self.show_audit(filter),
            Command::Help => Ok(HELP.to_string()),
            Command::Exit => {
                if self.session.is_some() {
                    let _ = self.logout();
                }
                Ok("bye".to_string())
            }
        }
    }

    fn register(&mut self, username: &str, password: &str) -> Result<String, AppError> {
        if self.users.contains(username) {
            return Err(AppError::Auth(tgsh_auth::AuthError::UserExists {
                username: username.to_string(),
            }));
        }
        let first = self.users.list_users().is_empty();
        let subject = self.vfs.registry_mut().register_subject(username)?;
        self.users.register(username, password)?;
        if first {
            self.users.set_admin(username, true)?;
            info!(username, "first user registered as admin");
        }
        self.audit
            .record(EventKind::Register, &subject, json!(null));
        Ok(if first {
            format!("registered {username} (admin)")
        } else {
            format!("registered {username}")
        })
    }

    fn login(&mut self, username: &str, password: &str) -> Result<String, AppError> {
        match self.users.login(username, password) {
            Ok(session) => {
                // Restore the subject record when the registry was
                // rebuilt from an empty run.
                if !self.vfs.registry().exists(username) {
                    self.vfs.registry_mut().register_subject(username)?;
                }
                let subject = session.subject();
                let greeting = format!("welcome, {session}");
                self.session = Some(session);
                self.audit.record(EventKind::Login, &subject, json!(null));
                Ok(greeting)
            }
            Err(e) => {
                self.audit.record_failure(
                    EventKind::Login,
                    &EntityId::from(username),
                    json!(null),
                );
                Err(e.into())
            }
        }
    }

    fn logout(&mut self) -> Result<String, AppError> {
        let session = self.session.take().ok_or(AppError::NotLoggedIn)?;
        self.audit
            .record(EventKind::Logout, &session.subject(), json!(null));
        Ok(format!("goodbye, {}", session.username()))
    }

    fn create_object(
        &mut self,
        name: &str,
        parent: Option<String>,
        file: bool,
    ) -> Result<String, AppError> {
        let subject = self.require_session()?.subject();
        let parent_id = match parent {
            Some(p) => Some(self.resolve(&p)?),
            None => None,
        };
        let mut graph = self.graph.write();
        let id = if file {
            self.vfs.create_file(&mut graph, &subject, name, parent_id)?
        } else {
            self.vfs.create_dir(&mut graph, &subject, name, parent_id)?
        };
        drop(graph);
        self.audit.record(
            EventKind::CreateObject,
            &subject,
            json!({ "name": name, "id": id.as_str() }),
        );
        Ok(format!(
            "created {} {name} [{id}]",
            if file { "file" } else { "directory" }
        ))
    }

    fn read(&mut self, identifier: &str) -> Result<String, AppError> {
        let subject = self.require_session()?.subject();
        let graph = self.graph.read();
        match self.vfs.read_file(&graph, &subject, identifier) {
            Ok(content) => {
                drop(graph);
                self.audit.record(
                    EventKind::ReadFile,
                    &subject,
                    json!({ "object": identifier }),
                );
                Ok(content)
            }
            Err(e) => {
                drop(graph);
                self.audit_denial(&subject, &e, identifier);
                Err(e.into())
            }
        }
    }

    fn write(&mut self, identifier: &str, content: &str) -> Result<String, AppError> {
        let subject = self.require_session()?.subject();
        let graph = self.graph.read();
        match self.vfs.write_file(&graph, &subject, identifier, content) {
            Ok(()) => {
                drop(graph);
                self.audit.record(
                    EventKind::WriteFile,
                    &subject,
                    json!({ "object": identifier, "bytes": content.len() }),
                );
                Ok(format!("wrote {} bytes to {identifier}", content.len()))
            }
            Err(e) => {
                drop(graph);
                self.audit_denial(&subject, &e, identifier);
                Err(e.into())
            }
        }
    }

    fn exec(&mut self, identifier: &str) -> Result<String, AppError> {
        let subject = self.require_session()?.subject();
        let graph = self.graph.read();
        match self.vfs.execute_file(&graph, &subject, identifier) {
            Ok(()) => {
                drop(graph);
                self.audit.record(
                    EventKind::ExecuteFile,
                    &subject,
                    json!({ "object": identifier }),
                );
                Ok(format!("executed {identifier}"))
            }
            Err(e) => {
                drop(graph);
                self.audit_denial(&subject, &e, identifier);
                Err(e.into())
            }
        }
    }

    fn delete(&mut self, identifier: &str) -> Result<String, AppError> {
        let subject = self.require_session()?.subject();
        let mut graph = self.graph.write();
        match self.vfs.delete_object(&mut graph, &subject, identifier) {
            Ok(record) => {
                drop(graph);
                self.audit.record(
                    EventKind::DeleteObject,
                    &subject,
                    json!({ "name": record.name, "id": record.id.as_str() }),
                );
                Ok(format!("deleted {} {}", record.kind, record.name))
            }
            Err(e) => {
                drop(graph);
                self.audit_denial(&subject, &e, identifier);
                Err(e.into())
            }
        }
    }

    fn list(&mut self, directory: Option<&str>) -> Result<String, AppError> {
        let subject = self.require_session()?.subject();
        let records: Vec<String> = match directory {
            Some(dir) => {
                let graph = self.graph.read();
                match self.vfs.list_directory(&graph, &subject, dir) {
                    Ok(children) => children
                        .iter()
                        .map(|r| format!("{} {} [{}]", r.kind, r.name, r.id))
                        .collect(),
                    Err(e) => {
                        drop(graph);
                        self.audit_denial(&subject, &e, dir);
                        return Err(e.into());
                    }
                }
            }
            None => self
                .vfs
                .registry()
                .by_owner(&subject)
                .iter()
                .filter(|r| r.kind != tgsh_vfs::ObjectKind::Subject)
                .map(|r| format!("{} {} [{}]", r.kind, r.name, r.id))
                .collect(),
        };
        if records.is_empty() {
            Ok("(empty)".to_string())
        } else {
            Ok(records.join("\n"))
        }
    }

    fn take(&mut self, source: &str, target: &str, rights: RightSet) -> Result<String, AppError> {
        let subject = self.require_session()?.subject();
        let source_id = self.resolve(source)?;
        let target_id = self.resolve(target)?;
        let fired = self
            .graph
            .write()
            .take(&subject, &source_id, &target_id, rights);
        let details = json!({
            "source": source_id.as_str(),
            "target": target_id.as_str(),
            "rights": rights.to_string(),
        });
        if fired {
            self.audit.record(EventKind::Take, &subject, details);
            Ok(format!("took {rights} on {target} via {source}"))
        } else {
            self.audit.record_failure(EventKind::Take, &subject, details);
            Err(AppError::OperationDenied {
                operation: "take",
                reason: format!(
                    "requires t on {source} and an overlap with {source}'s rights on {target}"
                ),
            })
        }
    }

    fn grant(
        &mut self,
        source: &str,
        target_subject: &str,
        rights: RightSet,
    ) -> Result<String, AppError> {
        let subject = self.require_session()?.subject();
        let source_id = self.resolve(source)?;
        let target_id = self.resolve(target_subject)?;
        let fired = self
            .graph
            .write()
            .grant(&subject, &source_id, &target_id, rights);
        let details = json!({
            "source": source_id.as_str(),
            "target_subject": target_id.as_str(),
            "rights": rights.to_string(),
        });
        if fired {
            self.audit.record(EventKind::Grant, &subject, details);
            Ok(format!("granted {rights} on {source} to {target_subject}"))
        } else {
            self.audit
                .record_failure(EventKind::Grant, &subject, details);
            Err(AppError::OperationDenied {
                operation: "grant",
                reason: format!(
                    "requires g on {source} and an overlap with your own rights on {source}"
                ),
            })
        }
    }

    fn check(&mut self, object: &str, rights: RightSet) -> Result<String, AppError> {
        let subject = self.require_session()?.subject();
        let object_id = self.resolve(object)?;
        let reachable = {
            let graph = self.graph.read();
            SecurityKernel::new(&graph).can_access(&subject, &object_id, rights)
        };
        let details = json!({ "object": object_id.as_str(), "rights": rights.to_string() });
        if reachable {
            self.audit
                .record(EventKind::AccessGranted, &subject, details);
            Ok(format!("granted: {subject} can obtain {rights} on {object}"))
        } else {
            self.audit
                .record_failure(EventKind::AccessDenied, &subject, details);
            Ok(format!("denied: {subject} cannot obtain {rights} on {object}"))
        }
    }

    fn show_audit(&mut self, filter: AuditFilter) -> Result<String, AppError> {
        self.require_admin()?;
        let lines: Vec<String> = match filter {
            AuditFilter::All => self.audit.all_events().iter().map(ToString::to_string).collect(),
            AuditFilter::Failed => self.audit.failures().iter().map(ToString::to_string).collect(),
            AuditFilter::Success => self.audit.successes().iter().map(ToString::to_string).collect(),
        };
        if lines.is_empty() {
            Ok("(no events)".to_string())
        } else {
            Ok(lines.join("\n"))
        }
    }

    pub(crate) fn require_session(&self) -> Result<&Session, AppError> {
        self.session.as_ref().ok_or(AppError::NotLoggedIn)
    }

    pub(crate) fn require_admin(&self) -> Result<&Session, AppError> {
        let session = self.require_session()?;
        if session.is_admin() {
            Ok(session)
        } else {
            Err(AppError::AdminOnly)
        }
    }

    /// Resolves a name-or-id to the canonical entity id.
    pub(crate) fn resolve(&self, identifier: &str) -> Result<EntityId, AppError> {
        self.vfs
            .registry()
            .resolve(identifier)
            .ok_or_else(|| {
                AppError::Vfs(VfsError::NotFound {
                    identifier: identifier.to_string(),
                })
            })
    }

    /// The display name for an id, falling back to the id itself.
    pub(crate) fn name_of(&self, id: &EntityId) -> String {
        self.vfs
            .registry()
            .get(id.as_str())
            .map_or_else(|| id.to_string(), |r| r.name.clone())
    }

    /// Graph write access for the admin module.
    pub(crate) fn graph_mut(&self) -> parking_lot::RwLockWriteGuard<'_, RightsGraph> {
        self.graph.write()
    }

    /// Audit append access for the admin module.
    pub(crate) fn audit_mut(&mut self) -> &mut AuditLog {
        &mut self.audit
    }

    /// User store write access for the admin module.
    pub(crate) fn users_mut(&mut self) -> &mut UserStore {
        &mut self.users
    }

    /// Registry write access for the admin module.
    pub(crate) fn registry_mut(&mut self) -> &mut tgsh_vfs::ObjectRegistry {
        self.vfs.registry_mut()
    }

    fn audit_denial(&mut self, subject: &EntityId, err: &VfsError, identifier: &str) {
        if matches!(err, VfsError::AccessDenied { .. }) {
            self.audit.record_failure(
                EventKind::AccessDenied,
                subject,
                json!({ "object": identifier }),
            );
        }
    }
}
