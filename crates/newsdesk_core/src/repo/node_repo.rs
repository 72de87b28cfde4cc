//! Content tree store contracts and SQLite implementation.
//!
//! # Responsibility
//! - Define the store capabilities the filing pipeline calls into.
//! - Keep SQL details and child ordering inside the repository boundary.
//!
//! # Invariants
//! - Child listing is deterministic: `title DESC, node_uuid ASC`.
//! - Ancestor listing is nearest-first and excludes the node itself.
//! - Folders created through `FolderStore` are visible news folders carrying
//!   `NodePermissions::DATE_FOLDER`.

use crate::model::node::{
    NewNode, Node, NodeId, NodeKind, NodePermissions, PUBLISH_DATE_FORMAT,
};
use crate::repo::error::{StoreError, StoreResult};
use crate::repo::schema::ensure_connection_ready;
use chrono::NaiveDateTime;
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use uuid::Uuid;

/// Upper bound for ancestor walks; guards against corrupted parent cycles.
const MAX_ANCESTOR_DEPTH: i64 = 256;

const NODE_SELECT_SQL: &str = "SELECT
    n.node_uuid AS node_uuid,
    n.parent_uuid AS parent_uuid,
    n.title AS title,
    n.kind AS kind,
    n.news_folder AS news_folder,
    n.sort_index AS sort_index,
    n.publish_date AS publish_date,
    n.hidden AS hidden,
    n.perms_owner_id AS perms_owner_id,
    n.perms_group_id AS perms_group_id,
    n.perms_user AS perms_user,
    n.perms_group AS perms_group,
    n.perms_everybody AS perms_everybody,
    n.created_at AS created_at,
    n.updated_at AS updated_at
FROM nodes n";

const NODE_COLUMNS: &[&str] = &[
    "node_uuid",
    "parent_uuid",
    "title",
    "kind",
    "news_folder",
    "sort_index",
    "publish_date",
    "hidden",
    "perms_owner_id",
    "perms_group_id",
    "perms_user",
    "perms_group",
    "perms_everybody",
    "created_at",
    "updated_at",
];

/// Restricts which children `NodeStore::list_children` returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildFilter {
    /// Every direct child.
    All,
    /// Direct children that are news folders.
    NewsFolders,
    /// Direct children that are news items.
    NewsItems,
}

impl ChildFilter {
    fn sql_clause(self) -> &'static str {
        match self {
            Self::All => "",
            Self::NewsFolders => " AND n.kind = 'folder' AND n.news_folder = 1",
            Self::NewsItems => " AND n.kind = 'news_item'",
        }
    }
}

/// Outcome of a find-or-create folder lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderLookup {
    /// Matched or freshly created news folder.
    pub folder: Node,
    /// `true` when the folder did not exist before the call.
    pub created: bool,
}

/// Node read/write capabilities used by the filing pipeline.
pub trait NodeStore {
    /// Loads one node by id.
    fn get_node(&self, id: NodeId) -> StoreResult<Option<Node>>;
    /// Lists ancestors of one node, nearest parent first.
    fn get_ancestors(&self, id: NodeId) -> StoreResult<Vec<Node>>;
    /// Moves one node below `parent_id`.
    fn update_parent(&self, id: NodeId, parent_id: NodeId) -> StoreResult<()>;
    /// Overwrites the sibling order key of one node.
    fn update_sort_index(&self, id: NodeId, sort_index: i64) -> StoreResult<()>;
    /// Lists direct children ordered by title descending.
    fn list_children(&self, parent_id: NodeId, filter: ChildFilter) -> StoreResult<Vec<Node>>;
}

/// Date folder lookup and creation capabilities.
pub trait FolderStore {
    /// Finds a news folder below `parent_id` whose title equals `title`.
    fn find_child_by_title(&self, parent_id: NodeId, title: &str) -> StoreResult<Option<Node>>;
    /// Creates a visible news folder with date folder permissions below
    /// `parent_id`.
    fn create_folder(&self, parent_id: NodeId, title: &str) -> StoreResult<Node>;

    /// Returns the matching news folder, creating it when absent.
    ///
    /// Stores that can make lookup and insert atomic should override this.
    fn find_or_create_folder(&self, parent_id: NodeId, title: &str) -> StoreResult<FolderLookup> {
        if let Some(folder) = self.find_child_by_title(parent_id, title)? {
            return Ok(FolderLookup {
                folder,
                created: false,
            });
        }
        let folder = self.create_folder(parent_id, title)?;
        Ok(FolderLookup {
            folder,
            created: true,
        })
    }
}

/// SQLite-backed content tree store.
pub struct SqliteNodeRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNodeRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        ensure_connection_ready(conn, "nodes", NODE_COLUMNS)?;
        Ok(Self { conn })
    }

    /// Inserts one node at the end of its sibling list.
    ///
    /// Used by the surrounding write pipeline; folders for date buckets are
    /// created through `FolderStore` instead.
    pub fn insert_node(&self, node: &NewNode) -> StoreResult<Node> {
        insert_node(self.conn, node)
    }

    /// Changes the publish date of one node.
    pub fn update_publish_date(
        &self,
        id: NodeId,
        publish_date: Option<NaiveDateTime>,
    ) -> StoreResult<()> {
        let changed = self.conn.execute(
            "UPDATE nodes
             SET publish_date = ?2,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE node_uuid = ?1;",
            params![
                id.to_string(),
                publish_date.map(|value| value.format(PUBLISH_DATE_FORMAT).to_string()),
            ],
        )?;
        ensure_changed(changed, id)
    }
}

impl NodeStore for SqliteNodeRepository<'_> {
    fn get_node(&self, id: NodeId) -> StoreResult<Option<Node>> {
        load_node(self.conn, id)
    }

    fn get_ancestors(&self, id: NodeId) -> StoreResult<Vec<Node>> {
        if load_node(self.conn, id)?.is_none() {
            return Err(StoreError::NodeNotFound(id));
        }

        let mut stmt = self.conn.prepare(&format!(
            "WITH RECURSIVE ancestors(node_uuid, depth) AS (
                SELECT parent_uuid, 1
                FROM nodes
                WHERE node_uuid = ?1
                  AND parent_uuid IS NOT NULL
                UNION ALL
                SELECT parent.parent_uuid, ancestors.depth + 1
                FROM nodes parent
                INNER JOIN ancestors ON parent.node_uuid = ancestors.node_uuid
                WHERE parent.parent_uuid IS NOT NULL
                  AND ancestors.depth < ?2
            )
            {NODE_SELECT_SQL}
            INNER JOIN ancestors ON ancestors.node_uuid = n.node_uuid
            ORDER BY ancestors.depth ASC;"
        ))?;
        let mut rows = stmt.query(params![id.to_string(), MAX_ANCESTOR_DEPTH])?;

        let mut ancestors = Vec::new();
        while let Some(row) = rows.next()? {
            ancestors.push(parse_node_row(row)?);
        }
        Ok(ancestors)
    }

    fn update_parent(&self, id: NodeId, parent_id: NodeId) -> StoreResult<()> {
        let changed = self.conn.execute(
            "UPDATE nodes
             SET parent_uuid = ?2,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE node_uuid = ?1;",
            params![id.to_string(), parent_id.to_string()],
        )?;
        ensure_changed(changed, id)
    }

    fn update_sort_index(&self, id: NodeId, sort_index: i64) -> StoreResult<()> {
        let changed = self.conn.execute(
            "UPDATE nodes
             SET sort_index = ?2,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE node_uuid = ?1;",
            params![id.to_string(), sort_index],
        )?;
        ensure_changed(changed, id)
    }

    fn list_children(&self, parent_id: NodeId, filter: ChildFilter) -> StoreResult<Vec<Node>> {
        let mut stmt = self.conn.prepare(&format!(
            "{NODE_SELECT_SQL}
             WHERE n.parent_uuid = ?1{}
             ORDER BY n.title DESC, n.node_uuid ASC;",
            filter.sql_clause()
        ))?;
        let mut rows = stmt.query([parent_id.to_string()])?;

        let mut children = Vec::new();
        while let Some(row) = rows.next()? {
            children.push(parse_node_row(row)?);
        }
        Ok(children)
    }
}

impl FolderStore for SqliteNodeRepository<'_> {
    fn find_child_by_title(&self, parent_id: NodeId, title: &str) -> StoreResult<Option<Node>> {
        find_news_folder(self.conn, parent_id, title)
    }

    fn create_folder(&self, parent_id: NodeId, title: &str) -> StoreResult<Node> {
        insert_node(self.conn, &NewNode::date_folder(parent_id, title))
    }

    /// Runs lookup and insert atomically.
    ///
    /// Opens an IMMEDIATE transaction on an idle connection. Inside a caller's
    /// transaction it uses a savepoint instead, so the caller's commit or
    /// rollback decides whether the folder persists.
    fn find_or_create_folder(&self, parent_id: NodeId, title: &str) -> StoreResult<FolderLookup> {
        let lookup = if self.conn.is_autocommit() {
            let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
            let lookup = find_or_insert_folder(&tx, parent_id, title)?;
            tx.commit()?;
            lookup
        } else {
            self.conn.execute_batch("SAVEPOINT find_or_create;")?;
            match find_or_insert_folder(self.conn, parent_id, title) {
                Ok(lookup) => {
                    self.conn.execute_batch("RELEASE find_or_create;")?;
                    lookup
                }
                Err(err) => {
                    self.conn.execute_batch(
                        "ROLLBACK TO find_or_create;
                         RELEASE find_or_create;",
                    )?;
                    return Err(err);
                }
            }
        };

        if lookup.created {
            debug!(
                "event=folder_create module=repo status=ok parent={} folder={} title={}",
                parent_id, lookup.folder.id, lookup.folder.title
            );
        }
        Ok(lookup)
    }
}

fn find_or_insert_folder(
    conn: &Connection,
    parent_id: NodeId,
    title: &str,
) -> StoreResult<FolderLookup> {
    if let Some(folder) = find_news_folder(conn, parent_id, title)? {
        return Ok(FolderLookup {
            folder,
            created: false,
        });
    }
    let folder = insert_node(conn, &NewNode::date_folder(parent_id, title))?;
    Ok(FolderLookup {
        folder,
        created: true,
    })
}

fn insert_node(conn: &Connection, node: &NewNode) -> StoreResult<Node> {
    if let Some(parent_id) = node.parent_id {
        if load_node(conn, parent_id)?.is_none() {
            return Err(StoreError::NodeNotFound(parent_id));
        }
    }

    let id = Uuid::new_v4();
    let sort_index = next_sort_index(conn, node.parent_id)?;
    conn.execute(
        "INSERT INTO nodes (
            node_uuid,
            parent_uuid,
            title,
            kind,
            news_folder,
            sort_index,
            publish_date,
            hidden,
            perms_owner_id,
            perms_group_id,
            perms_user,
            perms_group,
            perms_everybody
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13);",
        params![
            id.to_string(),
            node.parent_id.map(|value| value.to_string()),
            node.title.as_str(),
            node_kind_to_db(node.kind),
            bool_to_int(node.news_folder),
            sort_index,
            node.publish_date
                .map(|value| value.format(PUBLISH_DATE_FORMAT).to_string()),
            bool_to_int(node.hidden),
            node.permissions.owner_id,
            node.permissions.group_id,
            node.permissions.user,
            node.permissions.group,
            node.permissions.everybody,
        ],
    )?;

    load_node(conn, id)?.ok_or(StoreError::NodeNotFound(id))
}

fn load_node(conn: &Connection, id: NodeId) -> StoreResult<Option<Node>> {
    let mut stmt = conn.prepare(&format!("{NODE_SELECT_SQL} WHERE n.node_uuid = ?1;"))?;
    let mut rows = stmt.query([id.to_string()])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_node_row(row)?));
    }
    Ok(None)
}

fn find_news_folder(conn: &Connection, parent_id: NodeId, title: &str) -> StoreResult<Option<Node>> {
    let id: Option<String> = conn
        .query_row(
            "SELECT node_uuid
             FROM nodes
             WHERE parent_uuid = ?1
               AND title = ?2
               AND kind = 'folder'
               AND news_folder = 1
             ORDER BY sort_index ASC, node_uuid ASC
             LIMIT 1;",
            params![parent_id.to_string(), title],
            |row| row.get(0),
        )
        .optional()?;

    match id {
        Some(value) => load_node(conn, parse_uuid(&value, "nodes.node_uuid")?),
        None => Ok(None),
    }
}

fn next_sort_index(conn: &Connection, parent_id: Option<NodeId>) -> StoreResult<i64> {
    let next = match parent_id {
        Some(parent_id) => conn.query_row(
            "SELECT COALESCE(MAX(sort_index), -1) + 1
             FROM nodes
             WHERE parent_uuid = ?1;",
            [parent_id.to_string()],
            |row| row.get(0),
        )?,
        None => conn.query_row(
            "SELECT COALESCE(MAX(sort_index), -1) + 1
             FROM nodes
             WHERE parent_uuid IS NULL;",
            [],
            |row| row.get(0),
        )?,
    };
    Ok(next)
}

fn ensure_changed(changed: usize, id: NodeId) -> StoreResult<()> {
    if changed == 0 {
        return Err(StoreError::NodeNotFound(id));
    }
    Ok(())
}

fn parse_node_row(row: &Row<'_>) -> StoreResult<Node> {
    let id_text: String = row.get("node_uuid")?;
    let id = parse_uuid(&id_text, "nodes.node_uuid")?;

    let parent_id = row
        .get::<_, Option<String>>("parent_uuid")?
        .map(|value| parse_uuid(&value, "nodes.parent_uuid"))
        .transpose()?;

    let kind_text: String = row.get("kind")?;
    let kind = parse_node_kind(&kind_text).ok_or_else(|| {
        StoreError::InvalidData(format!("invalid node kind `{kind_text}` in nodes.kind"))
    })?;

    let publish_date = row
        .get::<_, Option<String>>("publish_date")?
        .map(|value| {
            NaiveDateTime::parse_from_str(&value, PUBLISH_DATE_FORMAT).map_err(|_| {
                StoreError::InvalidData(format!(
                    "invalid publish date `{value}` in nodes.publish_date"
                ))
            })
        })
        .transpose()?;

    Ok(Node {
        id,
        parent_id,
        title: row.get("title")?,
        kind,
        news_folder: parse_flag(row.get("news_folder")?, "nodes.news_folder")?,
        sort_index: row.get("sort_index")?,
        publish_date,
        hidden: parse_flag(row.get("hidden")?, "nodes.hidden")?,
        permissions: NodePermissions {
            owner_id: row.get("perms_owner_id")?,
            group_id: row.get("perms_group_id")?,
            user: row.get("perms_user")?,
            group: row.get("perms_group")?,
            everybody: row.get("perms_everybody")?,
        },
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn parse_node_kind(value: &str) -> Option<NodeKind> {
    match value {
        "page" => Some(NodeKind::Page),
        "news_item" => Some(NodeKind::NewsItem),
        "folder" => Some(NodeKind::Folder),
        _ => None,
    }
}

fn node_kind_to_db(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::Page => "page",
        NodeKind::NewsItem => "news_item",
        NodeKind::Folder => "folder",
    }
}

fn parse_flag(value: i64, column: &'static str) -> StoreResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(StoreError::InvalidData(format!(
            "invalid flag value `{other}` in {column}"
        ))),
    }
}

fn bool_to_int(value: bool) -> i64 {
    i64::from(value)
}

fn parse_uuid(value: &str, column: &'static str) -> StoreResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| StoreError::InvalidData(format!("invalid uuid `{value}` in {column}")))
}
