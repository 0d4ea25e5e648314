//! The persistent user store.

use crate::{AuthError, Session};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

/// One registered user.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct UserRecord {
    password_hash: String,
    admin: bool,
    created_at: DateTime<Utc>,
}

/// On-disk shape of the user file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct UserFile {
    users: BTreeMap<String, UserRecord>,
}

/// Registered users with SHA-256 password hashes and an admin flag.
///
/// Persistence is plain JSON. Loading is lenient: a missing or
/// corrupt file yields an empty store (with a warning) rather than
/// refusing to start.
///
/// # Example
///
/// ```
/// use tgsh_auth::UserStore;
///
/// let mut store = UserStore::new();
/// store.register("alice", "password123").unwrap();
///
/// let session = store.login("alice", "password123").unwrap();
/// assert_eq!(session.username(), "alice");
/// assert!(store.login("alice", "wrong").is_err());
/// ```
#[derive(Debug, Default)]
pub struct UserStore {
    users: BTreeMap<String, UserRecord>,
}

impl UserStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the store from a JSON user file.
    ///
    /// Missing file → empty store. Unreadable or corrupt file →
    /// empty store with a warning.
    #[must_use]
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            debug!(path = %path.display(), "no user file, starting empty");
            return Self::new();
        }
        match std::fs::read_to_string(path) {
            Ok(raw) => match serde_json::from_str::<UserFile>(&raw) {
                Ok(file) => Self { users: file.users },
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "corrupt user file, starting empty");
                    Self::new()
                }
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "unreadable user file, starting empty");
                Self::new()
            }
        }
    }

    /// Saves the store to a JSON user file, creating parent
    /// directories as needed.
    ///
    /// # Errors
    ///
    /// [`AuthError::Io`] or [`AuthError::Serialize`].
    pub fn save(&self, path: &Path) -> Result<(), AuthError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = UserFile {
            users: self.users.clone(),
        };
        let json = serde_json::to_string_pretty(&file)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Registers a new user (not an admin).
    ///
    /// # Errors
    ///
    /// [`AuthError::UserExists`] when the username is taken.
    pub fn register(&mut self, username: &str, password: &str) -> Result<(), AuthError> {
        if self.users.contains_key(username) {
            return Err(AuthError::UserExists {
                username: username.to_string(),
            });
        }
        self.users.insert(
            username.to_string(),
            UserRecord {
                password_hash: hash_password(password),
                admin: false,
                created_at: Utc::now(),
            },
        );
        debug!(username, "user registered");
        Ok(())
    }

    /// Verifies credentials and opens a session.
    ///
    /// # Errors
    ///
    /// [`AuthError::InvalidCredentials`] for an unknown user or a
    /// wrong password; the two are indistinguishable on purpose.
    pub fn login(&self, username: &str, password: &str) -> Result<Session, AuthError> {
        let record = self
            .users
            .get(username)
            .ok_or(AuthError::InvalidCredentials)?;
        if record.password_hash != hash_password(password) {
            return Err(AuthError::InvalidCredentials);
        }
        Ok(Session::new(username, record.admin))
    }

    /// Whether the user exists and holds the admin flag.
    #[must_use]
    pub fn is_admin(&self, username: &str) -> bool {
        self.users.get(username).is_some_and(|r| r.admin)
    }

    /// Sets or clears the admin flag.
    ///
    /// # Errors
    ///
    /// [`AuthError::UnknownUser`] when the username is not registered.
    pub fn set_admin(&mut self, username: &str, admin: bool) -> Result<(), AuthError> {
        let record = self
            .users
            .get_mut(username)
            .ok_or_else(|| AuthError::UnknownUser {
                username: username.to_string(),
            })?;
        record.admin = admin;
        debug!(username, admin, "admin flag changed");
        Ok(())
    }

    /// True iff the username is registered.
    #[must_use]
    pub fn contains(&self, username: &str) -> bool {
        self.users.contains_key(username)
    }

    /// All usernames, sorted.
    #[must_use]
    pub fn list_users(&self) -> Vec<&str> {
        self.users.keys().map(String::as_str).collect()
    }

    /// Removes a user. Returns whether a record was removed.
    pub fn remove(&mut self, username: &str) -> bool {
        self.users.remove(username).is_some()
    }
}

fn hash_password(password: &str) -> String {
    format!("{:x}", Sha256::digest(password.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_then_login() {
        let mut store = UserStore::new();
        store.register("alice", "pw").expect("register");

        let session = store.login("alice", "pw").expect("login");
        assert_eq!(session.username(), "alice");
        assert!(!session.is_admin());
    }

    #[test]
    fn duplicate_registration_fails() {
        let mut store = UserStore::new();
        store.register("alice", "pw").expect("first");
        assert!(matches!(
            store.register("alice", "other"),
            Err(AuthError::UserExists { .. })
        ));
    }

    #[test]
    fn wrong_password_and_unknown_user_look_alike() {
        let mut store = UserStore::new();
        store.register("alice", "pw").expect("register");

        let wrong = store.login("alice", "nope").unwrap_err();
        let ghost = store.login("ghost", "pw").unwrap_err();
        assert_eq!(wrong.to_string(), ghost.to_string());
    }

    #[test]
    fn passwords_are_not_stored_in_clear() {
        let mut store = UserStore::new();
        store.register("alice", "hunter2").expect("register");
        let record = store.users.get("alice").expect("record");
        assert_ne!(record.password_hash, "hunter2");
        assert_eq!(record.password_hash.len(), 64); // sha256 hex
    }

    #[test]
    fn admin_flag_lifecycle() {
        let mut store = UserStore::new();
        store.register("root", "pw").expect("register");
        assert!(!store.is_admin("root"));

        store.set_admin("root", true).expect("promote");
        assert!(store.is_admin("root"));
        assert!(store.login("root", "pw").expect("login").is_admin());

        store.set_admin("root", false).expect("demote");
        assert!(!store.is_admin("root"));
        assert!(matches!(
            store.set_admin("ghost", true),
            Err(AuthError::UnknownUser { .. })
        ));
    }

    #[test]
    fn list_users_is_sorted() {
        let mut store = UserStore::new();
        store.register("carol", "pw").expect("carol");
        store.register("alice", "pw").expect("alice");
        assert_eq!(store.list_users(), vec!["alice", "carol"]);
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("data").join("users.json");

        let mut store = UserStore::new();
        store.register("alice", "pw").expect("register");
        store.set_admin("alice", true).expect("promote");
        store.save(&path).expect("save");

        let loaded = UserStore::load(&path);
        assert!(loaded.contains("alice"));
        assert!(loaded.is_admin("alice"));
        assert!(loaded.login("alice", "pw").is_ok());
    }

    #[test]
    fn load_missing_or_corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("nope.json");
        assert!(UserStore::load(&missing).list_users().is_empty());

        let corrupt = dir.path().join("corrupt.json");
        std::fs::write(&corrupt, "{ not json").expect("write");
        assert!(UserStore::load(&corrupt).list_users().is_empty());
    }

    #[test]
    fn remove_user() {
        let mut store = UserStore::new();
        store.register("alice", "pw").expect("register");
        assert!(store.remove("alice"));
        assert!(!store.remove("alice"));
        assert!(!store.contains("alice"));
    }
}
