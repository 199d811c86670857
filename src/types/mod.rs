//! Common types used throughout the storage engine.

mod page_id;

pub use page_id::PageId;

use crate::page::layout::{INTERNAL_NODE_MAX_CELLS, LEAF_NODE_MAX_CELLS};
use serde::{Deserialize, Serialize};

/// Page size in bytes (4KB)
pub const PAGE_SIZE: usize = 4096;

/// Default hard cap on the number of pages in one table file
pub const TABLE_MAX_PAGES: u32 = 100;

/// Smallest node capacity a split can work with
pub const MIN_CELLS: usize = 2;

/// Node capacity limits used by the split logic.
///
/// The defaults are the most cells the page layout can hold. Smaller
/// limits keep the same on-disk format but split earlier, which is handy
/// for exercising deep trees with few rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BTreeConfig {
    /// Maximum cells per leaf node
    pub max_leaf_cells: usize,
    /// Maximum keys per internal node
    pub max_internal_keys: usize,
}

impl Default for BTreeConfig {
    fn default() -> Self {
        Self {
            max_leaf_cells: LEAF_NODE_MAX_CELLS,
            max_internal_keys: INTERNAL_NODE_MAX_CELLS,
        }
    }
}

impl BTreeConfig {
    /// Create a config with custom limits, clamped to what a page can hold
    pub fn new(max_leaf_cells: usize, max_internal_keys: usize) -> Self {
        Self {
            max_leaf_cells: max_leaf_cells.clamp(MIN_CELLS, LEAF_NODE_MAX_CELLS),
            max_internal_keys: max_internal_keys.clamp(MIN_CELLS, INTERNAL_NODE_MAX_CELLS),
        }
    }

    /// Cells kept by the left (original) leaf after a split
    pub fn leaf_left_split_count(&self) -> usize {
        (self.max_leaf_cells + 1) - self.leaf_right_split_count()
    }

    /// Cells moved to the new right leaf after a split
    pub fn leaf_right_split_count(&self) -> usize {
        (self.max_leaf_cells + 1) / 2
    }
}

/// Kind of B-tree node stored in a page
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    /// Internal node: child pointers and separator keys
    Internal = 0,
    /// Leaf node: keys and rows
    Leaf = 1,
}

impl NodeType {
    /// Convert from byte value
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            0 => Some(Self::Internal),
            1 => Some(Self::Leaf),
            _ => None,
        }
    }
}
