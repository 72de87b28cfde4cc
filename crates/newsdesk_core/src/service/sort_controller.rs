//! News item filing pipeline.
//!
//! # Responsibility
//! - Decide whether a written node takes part in date filing.
//! - Drive resolve, move, re-sort and tree notification for one write.
//!
//! # Invariants
//! - Ineligible writes produce no store writes.
//! - The item's parent is rewritten on every successful resolution.
//! - The tree-changed signal is raised once per filed item.

use crate::model::node::{Node, NodeId, NodeKind};
use crate::repo::error::{StoreError, StoreResult};
use crate::repo::node_repo::{FolderStore, NodeStore};
use crate::repo::settings_repo::ConfigProvider;
use crate::service::notify::UiNotifier;
use crate::service::path_resolver::PathResolver;
use crate::service::resorter::{ReSorter, ResortReport};
use chrono::NaiveDateTime;
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Why a write was left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Node is not a news item.
    NotNewsItem,
    /// News item without publish date.
    MissingDate,
    /// Direct parent is not a news folder.
    OutsideNewsTree,
}

/// Details of one filed news item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FiledItem {
    pub item: NodeId,
    /// Parent before filing.
    pub previous_parent: Option<NodeId>,
    /// Parent after filing.
    pub target: NodeId,
    /// Folders handed to the re-sorter.
    pub touched: Vec<NodeId>,
    /// Date folders created for this item.
    pub created: Vec<NodeId>,
    pub resort: ResortReport,
}

impl FiledItem {
    /// Returns whether the item changed parent.
    pub fn moved(&self) -> bool {
        self.previous_parent != Some(self.target)
    }
}

/// Result of handling one write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortOutcome {
    Skipped(SkipReason),
    Filed(FiledItem),
}

/// Errors from the filing pipeline.
#[derive(Debug)]
pub enum SortError {
    /// Written node id does not exist.
    ItemNotFound(NodeId),
    /// Store or settings failure; remaining steps were not run.
    Store(StoreError),
}

impl Display for SortError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ItemNotFound(id) => write!(f, "news item not found: {id}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SortError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::ItemNotFound(_) => None,
        }
    }
}

impl From<StoreError> for SortError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Entry point called by the write pipeline after every node write.
pub struct SortController<S, C, N> {
    store: S,
    config: C,
    notifier: N,
}

impl<S, C, N> SortController<S, C, N>
where
    S: NodeStore + FolderStore,
    C: ConfigProvider,
    N: UiNotifier,
{
    pub fn new(store: S, config: C, notifier: N) -> Self {
        Self {
            store,
            config,
            notifier,
        }
    }

    /// Loads the node by id and files it.
    pub fn on_write_by_id(&self, id: NodeId) -> Result<SortOutcome, SortError> {
        let item = self
            .store
            .get_node(id)?
            .ok_or(SortError::ItemNotFound(id))?;
        self.on_write(&item)
    }

    /// Files one written node below its date folder.
    pub fn on_write(&self, item: &Node) -> Result<SortOutcome, SortError> {
        if item.kind != NodeKind::NewsItem {
            return Ok(SortOutcome::Skipped(SkipReason::NotNewsItem));
        }
        let Some(date) = item.publish_date else {
            return Ok(SortOutcome::Skipped(SkipReason::MissingDate));
        };

        match self.file(item, &date) {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                error!(
                    "event=news_file module=service status=error item={} error={}",
                    item.id, err
                );
                Err(err.into())
            }
        }
    }

    fn file(&self, item: &Node, date: &NaiveDateTime) -> StoreResult<SortOutcome> {
        let chain = self.news_chain(item.id)?;
        let config = self.config.granularity()?;
        let Some(resolution) = PathResolver::new(&self.store).resolve(date, &chain, &config)?
        else {
            return Ok(SortOutcome::Skipped(SkipReason::OutsideNewsTree));
        };

        self.store.update_parent(item.id, resolution.target)?;

        let resort = if resolution.touched.is_empty() {
            ResortReport::default()
        } else {
            ReSorter::new(&self.store).resort(&resolution.touched)?
        };

        self.notifier.signal_tree_changed();

        let filed = FiledItem {
            item: item.id,
            previous_parent: item.parent_id,
            target: resolution.target,
            touched: resolution.touched,
            created: resolution.created,
            resort,
        };
        info!(
            "event=news_file module=service status=ok item={} target={} moved={} created={} resorted={}",
            filed.item,
            filed.target,
            filed.moved(),
            filed.created.len(),
            filed.resort.updated
        );
        Ok(SortOutcome::Filed(filed))
    }

    /// Contiguous news-folder ancestors of `id`, root-to-leaf.
    fn news_chain(&self, id: NodeId) -> StoreResult<Vec<Node>> {
        let mut chain: Vec<Node> = self
            .store
            .get_ancestors(id)?
            .into_iter()
            .take_while(Node::is_news_folder)
            .collect();
        chain.reverse();
        Ok(chain)
    }
}
