//! Page cache between the B-tree and the disk.
//!
//! The pager keeps every page it has touched in memory for the lifetime
//! of the table and writes dirty pages back when the table is closed.

mod pager;

pub use pager::Pager;
