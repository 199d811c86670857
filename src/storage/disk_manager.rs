//! Disk manager implementation.
//!
//! The disk manager is responsible for reading and writing pages to the
//! table file. It abstracts the file I/O operations behind a trait
//! so that the pager can be tested with other backends.

use crate::error::Result;
use crate::types::{PageId, PAGE_SIZE};
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

/// Trait for disk I/O operations
pub trait DiskManager: Send {
    /// Current length of the backing file in bytes
    fn file_length(&self) -> Result<u64>;

    /// Read a whole page into `buf`
    fn read_page(&mut self, page_id: PageId, buf: &mut [u8]) -> Result<()>;

    /// Write a whole page
    fn write_page(&mut self, page_id: PageId, data: &[u8]) -> Result<()>;

    /// Sync all data to disk
    fn sync(&mut self) -> Result<()>;
}

/// File-based disk manager implementation
pub struct FileDiskManager {
    /// The table file
    file: File,
    /// Whether to sync on each write
    sync_on_write: bool,
}

impl FileDiskManager {
    /// Open or create a table file
    pub fn open(path: &Path, sync_on_write: bool) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        Ok(Self {
            file,
            sync_on_write,
        })
    }
}

impl DiskManager for FileDiskManager {
    fn file_length(&self) -> Result<u64> {
        Ok(self.file.metadata()?.len())
    }

    fn read_page(&mut self, page_id: PageId, buf: &mut [u8]) -> Result<()> {
        let offset = page_id.file_offset(PAGE_SIZE);
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.read_exact(&mut buf[..PAGE_SIZE])?;
        Ok(())
    }

    fn write_page(&mut self, page_id: PageId, data: &[u8]) -> Result<()> {
        let offset = page_id.file_offset(PAGE_SIZE);
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.write_all(&data[..PAGE_SIZE])?;

        if self.sync_on_write {
            self.file.sync_data()?;
        }

        Ok(())
    }

    fn sync(&mut self) -> Result<()> {
        self.file.sync_all()?;
        Ok(())
    }
}
