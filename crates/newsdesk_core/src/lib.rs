//! Date-folder filing for news items in a content tree.
//!
//! Every written news item is moved below the Year/Month/Day folder matching
//! its publish date, and the touched folders get their children re-sorted
//! newest first.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::granularity::{FolderGranularity, GranularityConfig};
pub use model::node::{
    NewNode, Node, NodeId, NodeKind, NodePermissions, PUBLISH_DATE_FORMAT,
};
pub use repo::error::{StoreError, StoreResult};
pub use repo::node_repo::{
    ChildFilter, FolderLookup, FolderStore, NodeStore, SqliteNodeRepository,
};
pub use repo::settings_repo::{ConfigProvider, SqliteSettingsRepository};
pub use service::notify::{LogNotifier, TreeRefreshSignal, UiNotifier};
pub use service::path_resolver::{PathResolver, Resolution};
pub use service::resorter::{ReSorter, ResortReport};
pub use service::sort_controller::{
    FiledItem, SkipReason, SortController, SortError, SortOutcome,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
