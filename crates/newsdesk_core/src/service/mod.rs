//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store calls into the news filing pipeline.
//! - Keep callers decoupled from storage details.

pub mod notify;
pub mod path_resolver;
pub mod resorter;
pub mod sort_controller;
