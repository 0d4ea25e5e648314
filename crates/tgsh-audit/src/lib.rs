//! Audit trail for tgsh.
//!
//! Every shell operation (authentication, object lifecycle, file
//! access, take/grant rewrites, access checks, admin actions) is
//! recorded as a typed, timestamped [`AuditEvent`]. The log lives in
//! memory, persists to JSON, and mirrors each record onto the
//! `tracing` subscriber so operators see the trail live.
//!
//! The access-control core knows nothing about this crate; the app
//! layer records events after core operations complete.

mod error;
mod event;
mod log;

pub use error::AuditError;
pub use event::{AuditEvent, EventKind};
pub use log::AuditLog;
