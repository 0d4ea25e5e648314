//! The tgsh application layer.
//!
//! Wires the rights graph, kernel, object store, user store and
//! audit trail into one [`App`] that parses and executes shell
//! commands. The REPL binary stays thin: it reads lines, hands them
//! to [`App::execute_line`] and prints the result.

mod admin;
mod app;
mod command;
mod error;

pub use app::App;
pub use command::{AdminCommand, AuditFilter, Command};
pub use error::AppError;
