//! # BTree Table
//!
//! A single-file table of fixed-width rows `{id, username, email}` stored
//! as a B+ tree keyed by `id`.
//!
//! ## Architecture
//!
//! - **Page Layer** (`page`): 4096-byte page buffers and the leaf/internal node layout
//! - **Storage Layer** (`storage`): positioned page reads and writes on the table file
//! - **Pager** (`buffer`): lazily loaded resident pages with dirty tracking
//! - **B-Tree Layer** (`btree`): search, insert with splits, and cursor scans
//! - **Statements** (`statement`): parsing of the line-oriented command language
//!
//! ## Usage
//!
//! ```rust,ignore
//! use btree_table::{Config, Db, ExecuteResult, Row};
//!
//! let db = Db::open(Config::new("users.db"))?;
//!
//! let row = Row::new(1, "alice", "alice@example.com")?;
//! assert_eq!(db.insert(&row)?, ExecuteResult::Success);
//! assert_eq!(db.insert(&row)?, ExecuteResult::DuplicateKey);
//!
//! for row in db.select_all()? {
//!     println!("{}", row);
//! }
//!
//! db.close()?;
//! ```

pub mod btree;
pub mod buffer;
pub mod error;
pub mod page;
pub mod row;
pub mod statement;
pub mod storage;
pub mod types;

pub use btree::{Cursor, ExecuteResult, Table};
pub use error::{Result, StorageError};
pub use row::Row;
pub use types::{BTreeConfig, PageId, PAGE_SIZE, TABLE_MAX_PAGES};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Table configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the table file
    pub path: PathBuf,
    /// Hard cap on pages in the file (default: 100)
    pub max_pages: u32,
    /// Whether to sync every page write (default: false)
    pub sync_on_write: bool,
    /// Node capacity limits; not stored in the file
    pub btree_config: BTreeConfig,
}

impl Config {
    /// Create a new configuration with default settings
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            max_pages: TABLE_MAX_PAGES,
            sync_on_write: false,
            btree_config: BTreeConfig::default(),
        }
    }

    /// Set the page cap
    pub fn max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    /// Enable sync on write for durability
    pub fn sync_on_write(mut self, enabled: bool) -> Self {
        self.sync_on_write = enabled;
        self
    }

    /// Set B-tree node limits
    pub fn btree_config(mut self, config: BTreeConfig) -> Self {
        self.btree_config = config;
        self
    }
}

/// Node type for visualization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    /// Page number
    pub page_id: u32,
    /// Whether this is a leaf node
    pub is_leaf: bool,
    /// Row ids for a leaf, stored child max keys for an internal node
    pub keys: Vec<u32>,
    /// Child nodes (only for internal nodes)
    pub children: Vec<TreeNode>,
}

/// Table statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbStats {
    /// Total number of pages in the table
    pub page_count: u32,
    /// Pages currently held in memory
    pub resident_pages: usize,
    /// Height of the B-tree
    pub tree_height: usize,
}

/// Shared handle to an open table
///
/// Every operation takes the table lock for its whole duration, so a
/// `Db` can be used from several threads.
pub struct Db {
    table: Mutex<Table>,
}

impl Db {
    /// Open or create a table
    pub fn open(config: Config) -> Result<Self> {
        let table = Table::open_with(&config)?;
        Ok(Self {
            table: Mutex::new(table),
        })
    }

    /// Node capacity limits in use
    pub fn btree_config(&self) -> BTreeConfig {
        self.table.lock().btree_config()
    }

    /// Insert a row
    pub fn insert(&self, row: &Row) -> Result<ExecuteResult> {
        self.table.lock().insert(row)
    }

    /// Get a row by id
    ///
    /// Returns `None` if no row has that id.
    pub fn get(&self, id: u32) -> Result<Option<Row>> {
        self.table.lock().get(id)
    }

    /// All rows in ascending id order
    pub fn select_all(&self) -> Result<Vec<Row>> {
        self.table.lock().select_all()
    }

    /// Indented text dump of the tree
    pub fn print_tree(&self) -> Result<String> {
        self.table.lock().print_tree()
    }

    /// Export the tree structure for visualization
    pub fn export_tree(&self) -> Result<TreeNode> {
        self.table.lock().export_tree()
    }

    /// Layout constants, one `NAME: value` per line
    pub fn describe_constants(&self) -> String {
        page::layout::describe_constants()
    }

    /// Get statistics about the table
    pub fn stats(&self) -> Result<DbStats> {
        let mut table = self.table.lock();
        Ok(DbStats {
            page_count: table.page_count(),
            resident_pages: table.resident_pages(),
            tree_height: table.height()?,
        })
    }

    /// Flush every dirty page and close the file
    pub fn close(self) -> Result<()> {
        self.table.into_inner().close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn row(id: u32) -> Row {
        Row::new(id, &format!("user{}", id), &format!("person{}@example.com", id)).unwrap()
    }

    #[test]
    fn test_basic_operations() -> Result<()> {
        let dir = tempdir().unwrap();
        let db = Db::open(Config::new(dir.path().join("test.db")))?;

        assert_eq!(db.insert(&row(1))?, ExecuteResult::Success);
        assert_eq!(db.get(1)?, Some(row(1)));
        assert_eq!(db.insert(&row(1))?, ExecuteResult::DuplicateKey);
        assert_eq!(db.get(2)?, None);
        assert_eq!(db.select_all()?, vec![row(1)]);

        Ok(())
    }

    #[test]
    fn test_stats_and_export() -> Result<()> {
        let dir = tempdir().unwrap();
        let db = Db::open(Config::new(dir.path().join("test.db")))?;

        let stats = db.stats()?;
        assert_eq!(stats.page_count, 1);
        assert_eq!(stats.tree_height, 1);

        for id in 1..=14 {
            assert_eq!(db.insert(&row(id))?, ExecuteResult::Success);
        }
        let stats = db.stats()?;
        assert_eq!(stats.page_count, 3);
        assert_eq!(stats.tree_height, 2);

        let json = serde_json::to_value(db.export_tree()?).unwrap();
        assert_eq!(json["pageId"], 0);
        assert_eq!(json["isLeaf"], false);
        assert_eq!(json["keys"], serde_json::json!([7]));
        assert_eq!(json["children"][1]["keys"][0], 8);

        Ok(())
    }

    #[test]
    fn test_close_and_reopen() -> Result<()> {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");

        let db = Db::open(Config::new(&path))?;
        for id in (1..=30).rev() {
            assert_eq!(db.insert(&row(id))?, ExecuteResult::Success);
        }
        db.close()?;

        let db = Db::open(Config::new(&path))?;
        let rows = db.select_all()?;
        assert_eq!(rows.len(), 30);
        assert_eq!(rows[0], row(1));
        assert_eq!(rows[29], row(30));
        Ok(())
    }

    #[test]
    fn test_db_is_shared_across_threads() -> Result<()> {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Db>();

        let dir = tempdir().unwrap();
        let db = Db::open(Config::new(dir.path().join("test.db")))?;

        std::thread::scope(|s| {
            for t in 0..4u32 {
                let db = &db;
                s.spawn(move || {
                    for i in 0..50 {
                        let id = i * 4 + t + 1;
                        assert_eq!(db.insert(&row(id)).unwrap(), ExecuteResult::Success);
                    }
                });
            }
        });

        let ids: Vec<u32> = db.select_all()?.iter().map(|r| r.id).collect();
        assert_eq!(ids, (1..=200).collect::<Vec<_>>());
        db.close()
    }

    #[test]
    fn test_config_builder() {
        let config = Config::new("t.db")
            .max_pages(0)
            .sync_on_write(true)
            .btree_config(BTreeConfig::new(4, 4));
        assert_eq!(config.max_pages, 1);
        assert!(config.sync_on_write);
        assert_eq!(config.btree_config.max_leaf_cells, 4);
    }

    #[test]
    fn test_describe_constants() -> Result<()> {
        let dir = tempdir().unwrap();
        let db = Db::open(Config::new(dir.path().join("test.db")))?;
        let text = db.describe_constants();
        assert!(text.starts_with("ROW_SIZE: 291\n"));
        assert!(text.contains("LEAF_NODE_MAX_CELLS: 13\n"));
        Ok(())
    }
}
