//! Simulated object store for tgsh.
//!
//! Two layers:
//!
//! - [`ObjectRegistry`]: name-unique identification of files,
//!   directories and subjects (id-or-name lookup, owner/kind
//!   filters). Pure bookkeeping, no access control.
//! - [`Vfs`]: the simulated file operations (read, write, execute,
//!   create, delete, list). Every operation consults the security
//!   kernel's `can_access` decision before touching content, and the
//!   delete path uses the graph's bulk edge-removal primitive.
//!
//! The vfs consumes graph/kernel decisions; it never reaches into
//! graph internals.

mod error;
mod ops;
mod registry;

pub use error::VfsError;
pub use ops::Vfs;
pub use registry::{ObjectKind, ObjectRecord, ObjectRegistry};
