//! Table storage as a B+ tree over fixed-size pages.
//!
//! Leaves hold rows ordered by id and are chained left to right. Internal
//! nodes route by the maximum key of each child subtree.

mod cursor;
mod table;
mod tree;

pub use cursor::Cursor;
pub use table::{ExecuteResult, Table};
