//! Cursor over the leaf level of the table.
//!
//! A cursor is a position `(leaf page, cell index)` plus an end-of-table
//! flag. Advancing past the last cell of a leaf follows the leaf's sibling
//! link, so a scan from [`Table::start`] visits every row in key order.

use crate::btree::Table;
use crate::error::{Result, StorageError};
use crate::row::Row;
use crate::types::{NodeType, PageId};

/// A position in the table
pub struct Cursor<'a> {
    table: &'a mut Table,
    page_id: PageId,
    cell_index: usize,
    end_of_table: bool,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(table: &'a mut Table, page_id: PageId, cell_index: usize, end_of_table: bool) -> Self {
        Self {
            table,
            page_id,
            cell_index,
            end_of_table,
        }
    }

    /// Leaf page the cursor is on
    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    /// Cell position within the leaf
    pub fn cell_index(&self) -> usize {
        self.cell_index
    }

    /// Whether the cursor has moved past the last row
    pub fn is_end(&self) -> bool {
        self.end_of_table
    }

    /// Serialized row under the cursor, or `None` past the end
    pub fn value(&mut self) -> Result<Option<&[u8]>> {
        if self.end_of_table {
            return Ok(None);
        }
        let leaf = self.table.pager.fetch_page(self.page_id)?;
        if self.cell_index >= leaf.leaf_cell_count() {
            return Ok(None);
        }
        Ok(Some(leaf.leaf_value(self.cell_index)))
    }

    /// Decoded row under the cursor
    pub fn row(&mut self) -> Result<Option<Row>> {
        Ok(self.value()?.map(Row::deserialize))
    }

    /// Step to the next row, hopping to the next leaf when this one is exhausted
    pub fn advance(&mut self) -> Result<()> {
        let (count, next_leaf) = {
            let leaf = self.table.pager.fetch_page(self.page_id)?;
            (leaf.leaf_cell_count(), leaf.leaf_next_leaf())
        };

        self.cell_index += 1;
        if self.cell_index >= count {
            match next_leaf {
                Some(next) => {
                    if self.table.node_type(next)? != NodeType::Leaf {
                        return Err(StorageError::InvalidNodeType {
                            page_id: next,
                            byte: NodeType::Internal as u8,
                        });
                    }
                    self.page_id = next;
                    self.cell_index = 0;
                }
                None => self.end_of_table = true,
            }
        }
        Ok(())
    }
}
