//! Reachability kernel for the Take-Grant graph.
//!
//! Answers the question the graph's direct-edge queries cannot:
//! could this subject *eventually* obtain a right it does not hold,
//! by chaining take/grant rewrites through intermediate nodes?
//!
//! The kernel only reads the graph; it never mutates it. All
//! authorization checks in the surrounding layers go through
//! [`SecurityKernel::can_access`].

mod kernel;

pub use kernel::SecurityKernel;
