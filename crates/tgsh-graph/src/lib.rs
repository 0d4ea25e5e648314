//! The Take-Grant rights graph.
//!
//! A protection state is a directed graph: nodes are entities
//! (subjects and objects in one namespace), edges carry a non-empty
//! [`RightSet`](tgsh_types::RightSet). The state evolves only through
//! the four rewriting operations:
//!
//! | Rewrite | Precondition | Effect |
//! |---------|--------------|--------|
//! | create  | (none) | subject gains the given rights (default: all six) on the object |
//! | take    | subject holds TAKE on source; source holds at least one requested right on target | subject gains `requested ∩ source→target` on target |
//! | grant   | subject holds GRANT on source; subject holds at least one requested right on source | target subject gains `requested ∩ subject→source` on source |
//! | remove  | (none) | the given rights leave the edge; an emptied edge disappears |
//!
//! All operations are total: non-success is `false`, never an error.
//! Reachability questions ("could this subject *eventually* obtain
//! the right?") live in `tgsh-kernel`, which only reads this graph.

mod graph;

pub use graph::{Edge, RightsGraph};
