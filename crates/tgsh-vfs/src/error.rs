//! Vfs error type.

use crate::ObjectKind;
use tgsh_types::{EntityId, ErrorCode, RightSet};
use thiserror::Error;

/// Failure of a vfs operation.
///
/// `AccessDenied` carries the exact right the kernel found missing,
/// so the shell can tell the operator what was required without
/// consulting the graph again.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VfsError {
    /// The kernel denied the operation.
    #[error("access denied: {subject} lacks {required} on {object}")]
    AccessDenied {
        /// The subject that attempted the operation.
        subject: EntityId,
        /// The object the operation targeted.
        object: EntityId,
        /// The right the kernel found missing.
        required: RightSet,
    },

    /// No object with the given id or name exists.
    #[error("no such object: {identifier}")]
    NotFound {
        /// The identifier as given by the caller.
        identifier: String,
    },

    /// An object with this name already exists (names are unique).
    #[error("object name already taken: {name}")]
    NameTaken {
        /// The requested name.
        name: String,
    },

    /// The object exists but has the wrong kind for the operation,
    /// e.g. reading a directory as a file.
    #[error("{identifier} is not a {expected}")]
    WrongKind {
        /// The identifier as given by the caller.
        identifier: String,
        /// The kind the operation requires.
        expected: ObjectKind,
    },
}

impl ErrorCode for VfsError {
    fn code(&self) -> &'static str {
        match self {
            Self::AccessDenied { .. } => "VFS_ACCESS_DENIED",
            Self::NotFound { .. } => "VFS_NOT_FOUND",
            Self::NameTaken { .. } => "VFS_NAME_TAKEN",
            Self::WrongKind { .. } => "VFS_WRONG_KIND",
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            // Denials require a rights change, not a retry.
            Self::AccessDenied { .. } => false,
            Self::NotFound { .. } | Self::NameTaken { .. } | Self::WrongKind { .. } => true,
        }
    }
}
