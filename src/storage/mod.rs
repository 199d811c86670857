//! Storage layer: disk I/O for the table file.
//!
//! The table file is a plain sequence of 4096-byte pages with no file
//! header; page N lives at byte offset `N * PAGE_SIZE`.

mod disk_manager;

pub use disk_manager::{DiskManager, FileDiskManager};
