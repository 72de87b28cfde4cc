//! Date folder resolution.
//!
//! # Responsibility
//! - Map a publish date onto the Year/Month/Day folder chain below a news root.
//! - Reuse chain folders whose title matches the expected bucket; find or
//!   create everything else.
//!
//! # Invariants
//! - The anchor (first chain entry) is never created.
//! - After the first title mismatch the rest of the chain is ignored.
//! - A folder is recorded as touched when it matched, or when its children
//!   were searched for a bucket.

use crate::model::granularity::GranularityConfig;
use crate::model::node::{Node, NodeId};
use crate::repo::error::StoreResult;
use crate::repo::node_repo::FolderStore;
use chrono::NaiveDateTime;
use log::debug;

/// Result of one resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Leaf folder the item belongs into.
    pub target: NodeId,
    /// Folders whose children need re-sorting, in insertion order.
    pub touched: Vec<NodeId>,
    /// Folders created during this resolution.
    pub created: Vec<NodeId>,
}

/// Resolves target folders against one folder store.
pub struct PathResolver<'a, S: FolderStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: FolderStore + ?Sized> PathResolver<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Resolves the folder for `date` below `chain[0]`.
    ///
    /// `chain` is ordered root-to-leaf. Returns `Ok(None)` for an empty
    /// chain. Store failures abort resolution; folders created before the
    /// failure are kept.
    pub fn resolve(
        &self,
        date: &NaiveDateTime,
        chain: &[Node],
        config: &GranularityConfig,
    ) -> StoreResult<Option<Resolution>> {
        let Some((anchor, rest)) = chain.split_first() else {
            return Ok(None);
        };

        let mut remaining = Some(rest.iter());
        let mut parent = anchor.id;
        let mut touched = Vec::new();
        let mut created = Vec::new();

        for level in config.levels() {
            let title = level.bucket_title(date);
            let expected = remaining.as_mut().and_then(|chain| chain.next());

            match expected {
                Some(folder) if folder.title == title => {
                    debug!(
                        "event=bucket_resolve module=service status=reused level={} folder={}",
                        level.as_str(),
                        folder.id
                    );
                    touched.push(folder.id);
                    parent = folder.id;
                }
                _ => {
                    remaining = None;
                    touched.push(parent);
                    let lookup = self.store.find_or_create_folder(parent, &title)?;
                    debug!(
                        "event=bucket_resolve module=service status={} level={} parent={} folder={}",
                        if lookup.created { "created" } else { "found" },
                        level.as_str(),
                        parent,
                        lookup.folder.id
                    );
                    if lookup.created {
                        created.push(lookup.folder.id);
                    }
                    parent = lookup.folder.id;
                }
            }
        }

        Ok(Some(Resolution {
            target: parent,
            touched,
            created,
        }))
    }
}
