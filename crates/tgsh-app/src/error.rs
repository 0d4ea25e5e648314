//! Application-level errors.

use tgsh_audit::AuditError;
use tgsh_auth::AuthError;
use tgsh_types::{ErrorCode, RightParseError};
use tgsh_vfs::VfsError;
use thiserror::Error;

/// Anything a shell command can fail with.
///
/// Lower-layer errors pass through with their own codes; the variants
/// defined here cover the shell surface itself (session state, command
/// syntax, rejected rewrites).
#[derive(Debug, Error)]
pub enum AppError {
    /// The command needs an authenticated session.
    #[error("not logged in")]
    NotLoggedIn,

    /// The command needs the admin flag.
    #[error("admin privileges required")]
    AdminOnly,

    /// The command line did not match the expected shape.
    #[error("usage: {message}")]
    Usage {
        /// The expected invocation.
        message: String,
    },

    /// The first word is not a known command.
    #[error("unknown command: {verb} (try 'help')")]
    UnknownCommand {
        /// The unrecognized verb.
        verb: String,
    },

    /// A take or grant rewrite did not fire.
    #[error("{operation} denied: {reason}")]
    OperationDenied {
        /// Which rewrite was attempted.
        operation: &'static str,
        /// Why its precondition failed.
        reason: String,
    },

    /// Authentication failure.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// File-system or registry failure.
    #[error(transparent)]
    Vfs(#[from] VfsError),

    /// A right-set argument did not parse.
    #[error(transparent)]
    Rights(#[from] RightParseError),

    /// Audit persistence failure.
    #[error(transparent)]
    Audit(#[from] AuditError),
}

impl ErrorCode for AppError {
    fn code(&self) -> &'static str {
        match self {
            Self::NotLoggedIn => "APP_NOT_LOGGED_IN",
            Self::AdminOnly => "APP_ADMIN_ONLY",
            Self::Usage { .. } => "APP_USAGE",
            Self::UnknownCommand { .. } => "APP_UNKNOWN_COMMAND",
            Self::OperationDenied { .. } => "APP_OPERATION_DENIED",
            Self::Auth(e) => e.code(),
            Self::Vfs(e) => e.code(),
            Self::Rights(e) => e.code(),
            Self::Audit(e) => e.code(),
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            Self::Auth(e) => e.is_recoverable(),
            Self::Vfs(e) => e.is_recoverable(),
            Self::Rights(e) => e.is_recoverable(),
            Self::Audit(e) => e.is_recoverable(),
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tgsh_types::assert_error_code;

    #[test]
    fn shell_variants_have_app_codes() {
        assert_error_code(&AppError::NotLoggedIn, "APP_NOT_LOGGED_IN");
        assert_error_code(&AppError::AdminOnly, "APP_ADMIN_ONLY");
        assert_error_code(
            &AppError::UnknownCommand {
                verb: "frobnicate".into(),
            },
            "APP_UNKNOWN_COMMAND",
        );
    }

    #[test]
    fn wrapped_errors_keep_their_codes() {
        let err = AppError::from(AuthError::InvalidCredentials);
        assert_error_code(&err, "AUTH_INVALID_CREDENTIALS");
        assert!(err.is_recoverable());
    }
}
