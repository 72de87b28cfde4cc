//! Content tree node model.
//!
//! # Responsibility
//! - Define the canonical tree element shared by pages, news items and folders.
//! - Provide the predicates the filing pipeline uses to classify nodes.
//!
//! # Invariants
//! - `id` is stable and never reused for another node.
//! - `parent_id = None` means the node hangs directly below the tree root.
//! - `news_folder` is an explicit attribute; it is never derived from `title`.
//! - `publish_date` is only meaningful for `NodeKind::NewsItem`.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable tree node identifier.
pub type NodeId = Uuid;

/// Storage format of `publish_date` values.
pub const PUBLISH_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Tree node kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Regular content page.
    Page,
    /// Dated news content item, the only kind that gets filed.
    NewsItem,
    /// Grouping node that holds other nodes.
    Folder,
}

/// Access attributes of one node: owner, owning group and permission masks.
///
/// Masks are bit sets (1 show, 2 edit content, 4 delete, 8 create below,
/// 16 edit node).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodePermissions {
    pub owner_id: i64,
    pub group_id: i64,
    pub user: u8,
    pub group: u8,
    pub everybody: u8,
}

impl NodePermissions {
    /// Full access for owner and group, read access for everybody else.
    ///
    /// Applied to every date folder the filing pipeline creates.
    pub const DATE_FOLDER: Self = Self {
        owner_id: 1,
        group_id: 1,
        user: 31,
        group: 31,
        everybody: 1,
    };
}

/// Tree node read model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Stable node id.
    pub id: NodeId,
    /// Parent node id. `None` means root-level node.
    pub parent_id: Option<NodeId>,
    /// User-facing label. Date folders carry their zero-padded bucket here.
    pub title: String,
    /// Node type.
    pub kind: NodeKind,
    /// Folder belongs to a news tree.
    pub news_folder: bool,
    /// Sibling order key within one parent.
    pub sort_index: i64,
    /// Publish date of a news item, stored without timezone.
    pub publish_date: Option<NaiveDateTime>,
    /// Visibility flag.
    pub hidden: bool,
    pub permissions: NodePermissions,
    /// Epoch ms creation timestamp.
    pub created_at: i64,
    /// Epoch ms update timestamp.
    pub updated_at: i64,
}

impl Node {
    /// Returns whether this node is a folder of a news tree.
    pub fn is_news_folder(&self) -> bool {
        self.kind == NodeKind::Folder && self.news_folder
    }
}

/// Insert request for a new tree node.
///
/// `sort_index`, ids and timestamps are assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNode {
    pub parent_id: Option<NodeId>,
    pub title: String,
    pub kind: NodeKind,
    pub news_folder: bool,
    pub publish_date: Option<NaiveDateTime>,
    pub hidden: bool,
    pub permissions: NodePermissions,
}

impl NewNode {
    /// Regular page.
    pub fn page(parent_id: Option<NodeId>, title: impl Into<String>) -> Self {
        Self {
            parent_id,
            title: title.into(),
            kind: NodeKind::Page,
            news_folder: false,
            publish_date: None,
            hidden: false,
            permissions: NodePermissions::default(),
        }
    }

    /// Plain folder that is not part of a news tree.
    pub fn folder(parent_id: Option<NodeId>, title: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::Folder,
            ..Self::page(parent_id, title)
        }
    }

    /// Folder marked as news folder.
    pub fn news_folder(parent_id: Option<NodeId>, title: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::Folder,
            news_folder: true,
            ..Self::page(parent_id, title)
        }
    }

    /// Visible news folder for one date bucket, with date folder permissions.
    pub fn date_folder(parent_id: NodeId, title: impl Into<String>) -> Self {
        Self {
            permissions: NodePermissions::DATE_FOLDER,
            ..Self::news_folder(Some(parent_id), title)
        }
    }

    /// News item with optional publish date.
    pub fn news_item(
        parent_id: Option<NodeId>,
        title: impl Into<String>,
        publish_date: Option<NaiveDateTime>,
    ) -> Self {
        Self {
            kind: NodeKind::NewsItem,
            publish_date,
            ..Self::page(parent_id, title)
        }
    }
}
