//! Sibling re-sorting of date folders.
//!
//! # Invariants
//! - Children are ordered by title descending, byte-wise. Bucket titles are
//!   fixed width, so this puts the newest bucket first.
//! - Indexes are dense and zero-based; prior values are ignored.
//! - Ties keep the order the store returned them in.

use crate::model::node::NodeId;
use crate::repo::error::StoreResult;
use crate::repo::node_repo::{ChildFilter, NodeStore};
use log::debug;
use std::collections::HashSet;

/// Counters from one re-sort pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResortReport {
    /// Distinct folders visited.
    pub folders: usize,
    /// Sort indexes actually rewritten.
    pub updated: usize,
}

/// Rewrites `sort_index` of folder children.
pub struct ReSorter<'a, S: NodeStore + ?Sized> {
    store: &'a S,
    filter: ChildFilter,
}

impl<'a, S: NodeStore + ?Sized> ReSorter<'a, S> {
    /// Re-sorter for news folder children, the date buckets.
    pub fn new(store: &'a S) -> Self {
        Self::with_filter(store, ChildFilter::NewsFolders)
    }

    pub fn with_filter(store: &'a S, filter: ChildFilter) -> Self {
        Self { store, filter }
    }

    /// Re-sorts every folder in `folder_ids` once, in first-seen order.
    pub fn resort(&self, folder_ids: &[NodeId]) -> StoreResult<ResortReport> {
        let mut report = ResortReport::default();
        let mut seen = HashSet::new();
        for &folder_id in folder_ids {
            if !seen.insert(folder_id) {
                continue;
            }
            report.folders += 1;
            report.updated += self.resort_folder(folder_id)?;
        }
        Ok(report)
    }

    fn resort_folder(&self, folder_id: NodeId) -> StoreResult<usize> {
        let mut children = self.store.list_children(folder_id, self.filter)?;
        children.sort_by(|left, right| right.title.cmp(&left.title));

        let mut updated = 0;
        for (index, child) in children.iter().enumerate() {
            let sort_index = index as i64;
            if child.sort_index == sort_index {
                continue;
            }
            self.store.update_sort_index(child.id, sort_index)?;
            updated += 1;
        }

        debug!(
            "event=folder_resort module=service status=ok folder={} children={} updated={}",
            folder_id,
            children.len(),
            updated
        );
        Ok(updated)
    }
}
