//! The table handle: root page plus the pager that owns every page.

use crate::btree::Cursor;
use crate::buffer::Pager;
use crate::error::{Result, StorageError};
use crate::row::Row;
use crate::types::{BTreeConfig, NodeType, PageId};
use crate::Config;
use std::path::Path;
use tracing::{debug, info, warn};

/// Outcome of an insert that did not hit a fatal error
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecuteResult {
    /// Row stored
    Success,
    /// A row with the same id already exists; nothing changed
    DuplicateKey,
    /// Storing the row would need more pages than the table may hold; nothing changed
    TableFull,
}

/// An open table backed by a single file
pub struct Table {
    pub(crate) pager: Pager,
    /// Always page 0; root promotion rewrites its contents in place
    pub(crate) root_page: PageId,
    pub(crate) config: BTreeConfig,
}

impl Table {
    /// Open or create a table file with default settings
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with(&Config::new(path.as_ref()))
    }

    /// Open or create a table file.
    ///
    /// A brand new file gets page 0 initialized as an empty root leaf.
    pub fn open_with(config: &Config) -> Result<Self> {
        let pager = Pager::open(&config.path, config.max_pages, config.sync_on_write)?;
        let mut table = Self {
            pager,
            root_page: PageId::ROOT,
            config: config.btree_config,
        };

        if table.pager.page_count() == 0 {
            let root = table.pager.fetch_page_mut(PageId::ROOT)?;
            root.initialize_leaf();
            root.set_root(true);
            debug!("initialized empty root leaf");
        }

        info!(
            path = %config.path.display(),
            page_count = table.pager.page_count(),
            "opened table"
        );
        Ok(table)
    }

    /// Node capacity limits in use
    pub fn btree_config(&self) -> BTreeConfig {
        self.config
    }

    /// Root page number
    pub fn root_page(&self) -> PageId {
        self.root_page
    }

    /// Logical number of pages in the table
    pub fn page_count(&self) -> u32 {
        self.pager.page_count()
    }

    /// Number of pages held in memory
    pub fn resident_pages(&self) -> usize {
        self.pager.resident_count()
    }

    /// Insert a row keyed by its id.
    ///
    /// Duplicate ids and inserts that would outgrow the page cap are
    /// rejected before anything is modified.
    pub fn insert(&mut self, row: &Row) -> Result<ExecuteResult> {
        let (page_id, cell_index) = self.find_position(row.id)?;

        let count = {
            let leaf = self.pager.fetch_page(page_id)?;
            let count = leaf.leaf_cell_count();
            if cell_index < count && leaf.leaf_key(cell_index) == row.id {
                debug!(id = row.id, "duplicate key rejected");
                return Ok(ExecuteResult::DuplicateKey);
            }
            count
        };

        let max = self.config.max_leaf_cells;
        if count > max {
            return Err(StorageError::NodeOverflow { page_id, count, max });
        }

        self.check_path_capacity(page_id)?;
        let needed = self.pages_needed_for_insert(page_id)?;
        if self.pager.page_count() + needed > self.pager.max_pages() {
            warn!(
                id = row.id,
                needed,
                page_count = self.pager.page_count(),
                max_pages = self.pager.max_pages(),
                "table full"
            );
            return Ok(ExecuteResult::TableFull);
        }

        self.leaf_insert(page_id, cell_index, row)?;
        Ok(ExecuteResult::Success)
    }

    /// Point lookup by id
    pub fn get(&mut self, id: u32) -> Result<Option<Row>> {
        let (page_id, cell_index) = self.find_position(id)?;
        let leaf = self.pager.fetch_page(page_id)?;
        if cell_index < leaf.leaf_cell_count() && leaf.leaf_key(cell_index) == id {
            return Ok(Some(Row::deserialize(leaf.leaf_value(cell_index))));
        }
        Ok(None)
    }

    /// Every row in ascending id order
    pub fn select_all(&mut self) -> Result<Vec<Row>> {
        let mut rows = Vec::new();
        let mut cursor = self.start()?;
        while let Some(row) = cursor.row()? {
            rows.push(row);
            cursor.advance()?;
        }
        Ok(rows)
    }

    /// Cursor on the first row of the table
    pub fn start(&mut self) -> Result<Cursor<'_>> {
        let (page_id, cell_index) = self.find_position(0)?;
        let count = self.pager.fetch_page(page_id)?.leaf_cell_count();
        Ok(Cursor::new(self, page_id, cell_index, count == 0))
    }

    /// Cursor at `key`, or at the position where `key` would be inserted.
    ///
    /// A position past the last row of the table is already at the end.
    pub fn find(&mut self, key: u32) -> Result<Cursor<'_>> {
        let (page_id, cell_index) = self.find_position(key)?;
        let leaf = self.pager.fetch_page(page_id)?;
        let end = cell_index >= leaf.leaf_cell_count() && leaf.leaf_next_leaf().is_none();
        Ok(Cursor::new(self, page_id, cell_index, end))
    }

    /// Number of node levels from the root down to the leaves
    pub fn height(&mut self) -> Result<usize> {
        let mut height = 1;
        let mut page_id = self.root_page;
        while self.node_type(page_id)? == NodeType::Internal {
            page_id = self.pager.fetch_page(page_id)?.internal_child(0);
            height += 1;
        }
        Ok(height)
    }

    /// Flush every dirty page and close the file
    pub fn close(self) -> Result<()> {
        info!(page_count = self.pager.page_count(), "closing table");
        self.pager.close()
    }
}
