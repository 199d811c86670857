//! Error types for the storage engine.
//!
//! Every variant here is fatal for the table it came from: the caller is
//! expected to stop using the handle. Recoverable insert outcomes (duplicate
//! key, table full) are reported through [`crate::ExecuteResult`] instead.

use thiserror::Error;
use crate::types::PageId;

/// Result type alias for storage operations
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur in the storage engine
#[derive(Error, Debug)]
pub enum StorageError {
    /// I/O error from the underlying file system
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File length is not a whole number of pages
    #[error("Db file is not a whole number of pages. Corrupt file ({file_length} bytes)")]
    CorruptFile { file_length: u64 },

    /// Page number is past the hard page cap
    #[error("Tried to fetch page number out of bounds: {page_id} >= {max_pages}")]
    PageOutOfBounds { page_id: PageId, max_pages: u32 },

    /// Flush requested for a page that was never loaded
    #[error("Tried to flush page {0}, which is not resident")]
    PageNotResident(PageId),

    /// Node type byte is neither leaf nor internal
    #[error("Page {page_id} has unknown node type {byte:#04x}")]
    InvalidNodeType { page_id: PageId, byte: u8 },

    /// Node holds more cells than the configured capacity allows
    #[error("Page {page_id} holds {count} cells, configured maximum is {max}")]
    NodeOverflow { page_id: PageId, count: usize, max: usize },

    /// Stored separator differs from the subtree max it should mirror
    #[error("Page {page_id} stores key {found} where subtree max {expected} was expected")]
    StaleKey { page_id: PageId, expected: u32, found: u32 },

    /// Parent pointers starting at this page never reach the root
    #[error("Parent chain from page {0} does not reach the root")]
    BrokenParentChain(PageId),

    /// Max key requested for a leaf without cells
    #[error("Page {0} is an empty leaf and has no max key")]
    EmptyNode(PageId),

    /// Row field exceeds its fixed column width
    #[error("Field {field} is {len} bytes (max: {max})")]
    FieldTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },
}

impl StorageError {
    /// Whether this error reports on-disk damage rather than an environment failure
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            Self::CorruptFile { .. }
                | Self::InvalidNodeType { .. }
                | Self::NodeOverflow { .. }
                | Self::StaleKey { .. }
                | Self::BrokenParentChain(_)
        )
    }
}
