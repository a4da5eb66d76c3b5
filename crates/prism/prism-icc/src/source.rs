//! Inbound integer stream over a memory-mapped file.
//!
//! The producer process owns all writes ([`SharedIntegerWriter`]); the
//! classifier reads through [`SharedIntegerSource`]. There is no head/tail
//! handshake between the two. The reader simply walks the region in step
//! with its own cursor, so after a wrap it may read a cell the producer has
//! not refreshed yet and see the previous lap's value again. That race is
//! part of the transport and is not masked here.
//!
//! Cells are accessed as `AtomicI32` so a single value is never torn; the
//! memory ordering only covers the cell itself, not its neighbours.

use crate::cursor::CyclicCursor;
use crate::layout::{INT_SIZE, slots_in_region};
use prism_events::SENTINEL;
use prism_mmap::{MmapFile, MmapFileMut};
use std::io;
use std::path::Path;
use std::slice;
use std::sync::atomic::{AtomicI32, Ordering};

/// A sentinel-terminated sequence of `i32`.
pub trait IntegerSource {
    /// Returns the next value, or `None` once the end-of-stream sentinel has
    /// been read. After the first `None` every later call returns `None`
    /// without touching the underlying storage.
    fn next(&mut self) -> Option<i32>;
}

/// Read side of the inbound region.
pub struct SharedIntegerSource {
    mm: MmapFile,
    cursor: CyclicCursor,
    finished: bool,
}

impl SharedIntegerSource {
    /// Maps an existing inbound file read-only. Its capacity is the file
    /// length in `i32` cells.
    ///
    /// # Errors
    /// - The file does not exist or cannot be mapped
    /// - The file length is zero or not a multiple of 4 bytes (`InvalidInput`)
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let mm = MmapFile::open_ro(path)?;
        let capacity = slots_in_region(mm.len(), INT_SIZE)?;
        Ok(Self {
            mm,
            cursor: CyclicCursor::new(capacity),
            finished: false,
        })
    }

    pub fn capacity(&self) -> usize {
        self.cursor.capacity()
    }

    pub fn position(&self) -> usize {
        self.cursor.position()
    }

    #[inline(always)]
    fn cells(&self) -> &[AtomicI32] {
        // SAFETY: the mapping is page aligned and exactly `capacity * 4` bytes
        // (checked in `open`), and it lives as long as `self`. Only loads are
        // issued, which is permitted on read-only memory for a lock-free i32.
        unsafe {
            slice::from_raw_parts(
                self.mm.as_ptr() as *const AtomicI32,
                self.cursor.capacity(),
            )
        }
    }
}

impl IntegerSource for SharedIntegerSource {
    #[inline]
    fn next(&mut self) -> Option<i32> {
        if self.finished {
            return None;
        }
        let at = self.cursor.advance();
        let value = self.cells()[at].load(Ordering::Acquire);
        if value == SENTINEL {
            self.finished = true;
            return None;
        }
        Some(value)
    }
}

/// Write side of the inbound region, used by the producer process.
pub struct SharedIntegerWriter {
    mm: MmapFileMut,
    cursor: CyclicCursor,
}

impl SharedIntegerWriter {
    /// Creates (or truncates) the inbound file at `capacity_bytes`, every cell
    /// starting as the idle value 0.
    ///
    /// # Errors
    /// `InvalidInput` if `capacity_bytes` is zero or not a multiple of 4; any
    /// file creation or mapping failure.
    pub fn create<P: AsRef<Path>>(path: P, capacity_bytes: usize) -> io::Result<Self> {
        let capacity = slots_in_region(capacity_bytes, INT_SIZE)?;
        let mm = MmapFileMut::create_rw(path, capacity_bytes as u64)?;
        Ok(Self {
            mm,
            cursor: CyclicCursor::new(capacity),
        })
    }

    pub fn capacity(&self) -> usize {
        self.cursor.capacity()
    }

    pub fn position(&self) -> usize {
        self.cursor.position()
    }

    #[inline(always)]
    fn cells(&mut self) -> &[AtomicI32] {
        let capacity = self.cursor.capacity();
        // SAFETY: read-write mapping of exactly `capacity * 4` bytes, page
        // aligned, alive for the lifetime of `self`.
        unsafe { slice::from_raw_parts(self.mm.as_mut_ptr() as *const AtomicI32, capacity) }
    }

    /// Blind overwrite of the next cell, wrapping to cell 0 at the end.
    #[inline]
    pub fn put(&mut self, value: i32) {
        let at = self.cursor.advance();
        self.cells()[at].store(value, Ordering::Release);
    }

    /// Marks end-of-stream at the current cursor.
    pub fn put_sentinel(&mut self) {
        self.put(SENTINEL);
    }
}
