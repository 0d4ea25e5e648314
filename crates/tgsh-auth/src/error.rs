//! Authentication errors.

use tgsh_types::ErrorCode;
use thiserror::Error;

/// Failure of a user-store operation.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Registration under a username that already exists.
    #[error("user already exists: {username}")]
    UserExists {
        /// The contested username.
        username: String,
    },

    /// Login with an unknown username or a wrong password. The two
    /// cases are deliberately indistinguishable to the caller.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// An operation referenced a username that is not registered.
    #[error("no such user: {username}")]
    UnknownUser {
        /// The missing username.
        username: String,
    },

    /// Reading or writing the user file failed.
    #[error("user store i/o failed: {0}")]
    Io(#[from] std::io::Error),

    /// The user file could not be encoded.
    #[error("user store serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl ErrorCode for AuthError {
    fn code(&self) -> &'static str {
        match self {
            Self::UserExists { .. } => "AUTH_USER_EXISTS",
            Self::InvalidCredentials => "AUTH_INVALID_CREDENTIALS",
            Self::UnknownUser { .. } => "AUTH_UNKNOWN_USER",
            Self::Io(_) => "AUTH_IO",
            Self::Serialize(_) => "AUTH_SERIALIZE",
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            // The operator can pick another name or retype.
            Self::UserExists { .. } | Self::InvalidCredentials | Self::UnknownUser { .. } => true,
            Self::Io(_) | Self::Serialize(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tgsh_types::assert_error_codes;

    #[test]
    fn error_codes_follow_convention() {
        assert_error_codes(
            &[
                AuthError::UserExists {
                    username: "alice".to_string(),
                },
                AuthError::InvalidCredentials,
                AuthError::UnknownUser {
                    username: "ghost".to_string(),
                },
            ],
            "AUTH_",
        );
    }

    #[test]
    fn invalid_credentials_hides_which_part_failed() {
        let msg = AuthError::InvalidCredentials.to_string();
        assert!(!msg.contains("password only"), "got: {msg}");
        assert!(msg.contains("username or password"), "got: {msg}");
    }
}
