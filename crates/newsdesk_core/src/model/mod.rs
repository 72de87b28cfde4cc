//! Domain model for the filed content tree.
//!
//! # Responsibility
//! - Define canonical node and date bucket structures used by core logic.
//!
//! # Invariants
//! - Every tree element is identified by a stable `NodeId`.
//! - Core never deletes nodes.

pub mod granularity;
pub mod node;
