//! Audit persistence errors.

use tgsh_types::ErrorCode;
use thiserror::Error;

/// Failure to persist or restore the audit log.
#[derive(Debug, Error)]
pub enum AuditError {
    /// Reading or writing the event file failed.
    #[error("audit log i/o failed: {0}")]
    Io(#[from] std::io::Error),

    /// The event file could not be encoded.
    #[error("audit log serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl ErrorCode for AuditError {
    fn code(&self) -> &'static str {
        match self {
            Self::Io(_) => "AUDIT_IO",
            Self::Serialize(_) => "AUDIT_SERIALIZE",
        }
    }

    fn is_recoverable(&self) -> bool {
        false
    }
}
