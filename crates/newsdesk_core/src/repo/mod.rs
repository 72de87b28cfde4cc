//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the store contracts the filing pipeline depends on.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository constructors reject connections that are not fully migrated.
//! - Repository APIs return semantic errors (`NodeNotFound`) in addition to DB
//!   transport errors.

pub mod error;
pub mod node_repo;
mod schema;
pub mod settings_repo;
