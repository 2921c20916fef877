//! # Pager
//!
//! File-backed page cache over a flat array of 4096-byte pages. The
//! pager owns the file handle and a direct-mapped table of page frames
//! indexed by page id; there is no eviction because the file is capped
//! at [`MAX_PAGES`] pages (400 KiB).
//!
//! ## Frame Lifecycle
//!
//! ```text
//! uncached ──get()──> cached ──flush()──> uncached
//!              │
//!              └─ populated from disk if the page id is inside the
//!                 current file extent, zero-filled otherwise
//! ```
//!
//! A frame is read from disk at most once per open, on first access.
//! There is no dirty tracking: `close()` writes back every cached frame
//! whether or not it was mutated. Until `close()` succeeds, on-disk
//! state may lag the cache; durability is only promised across a clean
//! close.
//!
//! ## Allocation
//!
//! `allocate()` hands out the next unused page id, defined as the
//! current page count. The frame is materialized lazily: the first
//! `get()` of that id zero-fills it (reads past EOF read nothing) and
//! extends the page count by one.
//!
//! ## Concurrency
//!
//! Single-threaded by design. The pager assumes the host process owns
//! the file for its lifetime; there is no file locking, and concurrent
//! openers produce undefined results.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use eyre::{ensure, Result, WrapErr};

use crate::config::{MAX_PAGES, PAGE_SIZE};
use crate::storage::PageId;

/// One fixed-size frame of the page cache.
#[derive(Debug)]
struct PageFrame {
    cached: bool,
    data: Box<[u8]>,
}

impl PageFrame {
    fn new() -> Self {
        Self {
            cached: false,
            data: vec![0u8; PAGE_SIZE].into_boxed_slice(),
        }
    }
}

#[derive(Debug)]
pub struct Pager {
    file: File,
    file_length: u64,
    num_pages: u32,
    frames: Vec<PageFrame>,
}

impl Pager {
    /// Opens (or creates) the database file and sizes the page table
    /// from its length. All frames start uncached.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .wrap_err_with(|| format!("failed to open database file '{}'", path.display()))?;

        let file_length = file
            .metadata()
            .wrap_err_with(|| format!("failed to stat database file '{}'", path.display()))?
            .len();
        let num_pages = file_length.div_ceil(PAGE_SIZE as u64) as u32;

        Ok(Self {
            file,
            file_length,
            num_pages,
            frames: (0..MAX_PAGES).map(|_| PageFrame::new()).collect(),
        })
    }

    /// Pages currently accounted for, cached or not.
    pub fn num_pages(&self) -> u32 {
        self.num_pages
    }

    /// The next unused page id. The frame is materialized by the first
    /// `get` of this id.
    pub fn allocate(&self) -> PageId {
        self.num_pages
    }

    /// Immutable view of a page's bytes, faulting it in if necessary.
    pub fn page(&mut self, page_id: PageId) -> Result<&[u8]> {
        self.frame(page_id).map(|frame| &frame.data[..])
    }

    /// Mutable view of a page's bytes, faulting it in if necessary.
    pub fn page_mut(&mut self, page_id: PageId) -> Result<&mut [u8]> {
        self.frame(page_id).map(|frame| &mut frame.data[..])
    }

    fn frame(&mut self, page_id: PageId) -> Result<&mut PageFrame> {
        ensure!(
            (page_id as usize) < MAX_PAGES,
            "page id {} out of range (max {})",
            page_id,
            MAX_PAGES
        );

        if !self.frames[page_id as usize].cached {
            self.read_frame(page_id)
                .wrap_err_with(|| format!("failed to read page {}", page_id))?;
            if page_id == self.num_pages {
                self.num_pages += 1;
            }
            self.frames[page_id as usize].cached = true;
        }

        Ok(&mut self.frames[page_id as usize])
    }

    /// Fills the frame from disk, zero-padding whatever lies past the
    /// current file extent.
    fn read_frame(&mut self, page_id: PageId) -> Result<()> {
        let frame = &mut self.frames[page_id as usize];
        frame.data.fill(0);

        let offset = page_id as u64 * PAGE_SIZE as u64;
        let available = self.file_length.saturating_sub(offset).min(PAGE_SIZE as u64) as usize;
        if available > 0 {
            self.file.seek(SeekFrom::Start(offset))?;
            self.file.read_exact(&mut frame.data[..available])?;
        }

        Ok(())
    }

    /// Writes one cached frame back to disk and releases it.
    pub fn flush(&mut self, page_id: PageId) -> Result<()> {
        ensure!(
            (page_id as usize) < MAX_PAGES,
            "page id {} out of range (max {})",
            page_id,
            MAX_PAGES
        );
        ensure!(
            self.frames[page_id as usize].cached,
            "tried to flush uncached page {}",
            page_id
        );

        let offset = page_id as u64 * PAGE_SIZE as u64;
        self.file
            .seek(SeekFrom::Start(offset))
            .and_then(|_| self.file.write_all(&self.frames[page_id as usize].data))
            .wrap_err_with(|| format!("failed to write page {}", page_id))?;

        self.file_length = self.file_length.max(offset + PAGE_SIZE as u64);
        self.frames[page_id as usize].cached = false;
        Ok(())
    }

    /// Flushes every cached frame and syncs the file. Changes are
    /// durable only after this returns.
    pub fn close(mut self) -> Result<()> {
        for page_id in 0..MAX_PAGES as u32 {
            if self.frames[page_id as usize].cached {
                self.flush(page_id)?;
            }
        }
        self.file.sync_all().wrap_err("failed to sync database file")
    }
}
