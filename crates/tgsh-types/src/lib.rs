//! Core types for tgsh.
//!
//! This crate sits at the bottom of the tgsh dependency graph and
//! defines the vocabulary every other crate speaks:
//!
//! ```text
//! tgsh-types   (EntityId, RightSet, ErrorCode)  ◄── THIS CRATE
//!     ↑
//! tgsh-graph   (RightsGraph: the Take-Grant rewrites)
//!     ↑
//! tgsh-kernel  (SecurityKernel: reachability over a RightsGraph)
//!     ↑
//! tgsh-vfs / tgsh-auth / tgsh-audit
//!     ↑
//! tgsh-app → tgsh-cli
//! ```
//!
//! # The Take-Grant domain
//!
//! A protection state is a directed graph whose nodes are entities
//! (subjects and objects share one namespace; a subject may be the
//! object of another subject's rights) and whose edges carry a
//! non-empty [`RightSet`] out of a closed six-right domain:
//! READ, WRITE, EXECUTE, TAKE, GRANT, OWN.
//!
//! Identifiers are opaque strings ([`EntityId`]); right-sets are a
//! [`bitflags`] type so that the intersection arithmetic at the heart
//! of the take/grant rewrites (`requested & available`) is a single
//! bitwise operation.
//!
//! # Boundary parsing
//!
//! Free-text right syntax (`r,w,x,t,g,o`) is decoded strictly:
//! unknown tokens are an error ([`RightParseError`]), never silently
//! dropped. The graph layer itself only ever sees well-typed
//! [`RightSet`] values.

mod error;
mod id;
mod right;

pub use error::{assert_error_code, assert_error_codes, ErrorCode};
pub use id::EntityId;
pub use right::{RightParseError, RightSet};
