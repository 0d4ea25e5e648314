//! The authenticated session value.

use serde::{Deserialize, Serialize};
use tgsh_types::EntityId;

/// An authenticated actor at the prompt.
///
/// Sessions are immutable value types produced by
/// [`UserStore::login`](crate::UserStore::login); there is no
/// default session because there is no sensible default identity.
/// The admin flag is captured at login time; promoting a user takes
/// effect at their next login, as in any real shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    username: String,
    admin: bool,
}

impl Session {
    /// Builds a session for a verified user. Only the user store
    /// calls this with `admin` taken from the record; tests may
    /// construct sessions directly.
    #[must_use]
    pub fn new(username: impl Into<String>, admin: bool) -> Self {
        Self {
            username: username.into(),
            admin,
        }
    }

    /// The authenticated username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// The username as the subject identifier used in the graph.
    #[must_use]
    pub fn subject(&self) -> EntityId {
        EntityId::from(self.username.as_str())
    }

    /// Whether the user held the admin flag at login time.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.admin
    }
}

impl std::fmt::Display for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.admin {
            write!(f, "{} (admin)", self.username)
        } else {
            f.write_str(&self.username)
        }
    }
}
