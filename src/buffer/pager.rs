//! Pager: the single in-memory owner of every page buffer.
//!
//! Pages are loaded lazily on first access and stay resident until the
//! pager is closed; there is no eviction. A page number past the current
//! end of the table extends the table by handing out a zeroed buffer.

use crate::error::{Result, StorageError};
use crate::page::PageBuf;
use crate::storage::{DiskManager, FileDiskManager};
use crate::types::{PageId, PAGE_SIZE};
use std::path::Path;
use tracing::{debug, info};

/// A resident page
struct Frame {
    page: Box<PageBuf>,
    /// Modified since load, or never written to disk
    dirty: bool,
}

/// Page cache over a [`DiskManager`]
pub struct Pager {
    disk_manager: Box<dyn DiskManager>,
    /// Resident frames indexed by page number; `None` means not loaded yet
    frames: Vec<Option<Frame>>,
    /// Logical number of pages in the table
    page_count: u32,
    /// Pages actually present in the file
    disk_pages: u32,
    /// Hard cap on page numbers
    max_pages: u32,
}

impl Pager {
    /// Open the table file at `path`, creating it if absent
    pub fn open(path: &Path, max_pages: u32, sync_on_write: bool) -> Result<Self> {
        let disk_manager = FileDiskManager::open(path, sync_on_write)?;
        Self::with_disk_manager(Box::new(disk_manager), max_pages)
    }

    /// Build a pager over an already opened disk manager
    pub fn with_disk_manager(disk_manager: Box<dyn DiskManager>, max_pages: u32) -> Result<Self> {
        let file_length = disk_manager.file_length()?;
        if file_length % PAGE_SIZE as u64 != 0 {
            return Err(StorageError::CorruptFile { file_length });
        }

        let page_count = u32::try_from(file_length / PAGE_SIZE as u64)
            .map_err(|_| StorageError::CorruptFile { file_length })?;
        if page_count > max_pages {
            return Err(StorageError::PageOutOfBounds {
                page_id: PageId::new(page_count - 1),
                max_pages,
            });
        }

        debug!(page_count, max_pages, "opened pager");

        Ok(Self {
            disk_manager,
            frames: Vec::new(),
            page_count,
            disk_pages: page_count,
            max_pages,
        })
    }

    /// Logical number of pages, including ones not yet written to disk
    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    /// Hard cap on the number of pages
    pub fn max_pages(&self) -> u32 {
        self.max_pages
    }

    /// Number of pages currently held in memory
    pub fn resident_count(&self) -> usize {
        self.frames.iter().filter(|f| f.is_some()).count()
    }

    /// Page number the next new node should use.
    ///
    /// Pages are never recycled, so this is always the end of the table.
    pub fn unused_page_id(&self) -> PageId {
        PageId::new(self.page_count)
    }

    /// Fetch a page for reading
    pub fn fetch_page(&mut self, page_id: PageId) -> Result<&PageBuf> {
        let frame = self.get_frame(page_id)?;
        Ok(&*frame.page)
    }

    /// Fetch a page for writing; the page will be written back on close
    pub fn fetch_page_mut(&mut self, page_id: PageId) -> Result<&mut PageBuf> {
        let frame = self.get_frame(page_id)?;
        frame.dirty = true;
        Ok(&mut *frame.page)
    }

    /// Get or load the frame for a page
    fn get_frame(&mut self, page_id: PageId) -> Result<&mut Frame> {
        if page_id.value() >= self.max_pages {
            return Err(StorageError::PageOutOfBounds {
                page_id,
                max_pages: self.max_pages,
            });
        }

        let index = page_id.index();
        if index >= self.frames.len() {
            self.frames.resize_with(index + 1, || None);
        }

        if self.frames[index].is_none() {
            let frame = self.load_frame(page_id)?;
            self.frames[index] = Some(frame);
        }

        self.frames[index]
            .as_mut()
            .ok_or(StorageError::PageNotResident(page_id))
    }

    /// Cache miss: read the page from disk, or hand out a fresh one
    fn load_frame(&mut self, page_id: PageId) -> Result<Frame> {
        let mut page = Box::new(PageBuf::new());
        let on_disk = page_id.value() < self.disk_pages;

        if on_disk {
            debug!(%page_id, "loading page from disk");
            self.disk_manager.read_page(page_id, page.as_bytes_mut())?;
        }

        if page_id.value() >= self.page_count {
            self.page_count = page_id.value() + 1;
        }

        Ok(Frame {
            page,
            dirty: !on_disk,
        })
    }

    /// Write one resident page to disk
    pub fn flush_page(&mut self, page_id: PageId) -> Result<()> {
        let frame = self
            .frames
            .get_mut(page_id.index())
            .and_then(Option::as_mut)
            .ok_or(StorageError::PageNotResident(page_id))?;

        debug!(%page_id, "flushing page");
        self.disk_manager.write_page(page_id, frame.page.as_bytes())?;
        frame.dirty = false;
        self.disk_pages = self.disk_pages.max(page_id.value() + 1);

        Ok(())
    }

    /// Write every dirty page, release all buffers, and close the file
    pub fn close(mut self) -> Result<()> {
        let mut flushed = 0usize;
        for page_num in 0..self.page_count {
            let page_id = PageId::new(page_num);
            let dirty = matches!(
                self.frames.get(page_id.index()),
                Some(Some(frame)) if frame.dirty
            );
            if dirty {
                self.flush_page(page_id)?;
                flushed += 1;
            }
        }

        self.disk_manager.sync()?;
        info!(flushed, page_count = self.page_count, "closed pager");
        Ok(())
    }
}
