//! Registration and authentication for tgsh.
//!
//! A thin collaborator of the access-control core: it decides *who*
//! is at the prompt, never *what* they may touch; that is the rights
//! graph's job. Passwords are stored as SHA-256 hashes in a JSON
//! user file; a successful login yields an immutable [`Session`]
//! value carrying the username and admin flag.

mod error;
mod session;
mod store;

pub use error::AuthError;
pub use session::Session;
pub use store::UserStore;
