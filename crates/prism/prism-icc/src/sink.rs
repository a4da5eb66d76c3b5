//! Outbound result stream over a memory-mapped file.
//!
//! The classifier owns all writes ([`SharedResultSink`]); the external
//! consumer reads through [`SharedResultReader`]. A record is two separate
//! 4-byte stores, so a reader racing the writer can observe a new number
//! next to the previous lap's tag (a torn record). There is no end marker:
//! slots the writer has not reached yet read as number 0.

use crate::cursor::CyclicCursor;
use crate::layout::{RECORD_SIZE, slots_in_region};
use prism_events::{ClassificationResult, ResultRecord};
use prism_mmap::{MmapFile, MmapFileMut};
use std::io;
use std::path::Path;
use std::slice;
use std::sync::atomic::{AtomicI32, Ordering};

/// Destination for classification verdicts.
pub trait ResultSink {
    /// Stores one verdict in the next slot. Infallible: the slot is simply
    /// overwritten, whatever it held before.
    fn write(&mut self, number: i32, is_prime: bool);
}

/// Write side of the outbound region.
pub struct SharedResultSink {
    mm: MmapFileMut,
    cursor: CyclicCursor,
}

impl SharedResultSink {
    /// Creates (or truncates) the outbound file at `capacity_bytes`.
    ///
    /// # Errors
    /// `InvalidInput` if `capacity_bytes` is zero or not a multiple of the
    /// 8-byte record; any file creation or mapping failure.
    pub fn create<P: AsRef<Path>>(path: P, capacity_bytes: usize) -> io::Result<Self> {
        let capacity = slots_in_region(capacity_bytes, RECORD_SIZE)?;
        let mm = MmapFileMut::create_rw(path, capacity_bytes as u64)?;
        Ok(Self {
            mm,
            cursor: CyclicCursor::new(capacity),
        })
    }

    /// Capacity in records.
    pub fn capacity(&self) -> usize {
        self.cursor.capacity()
    }

    pub fn position(&self) -> usize {
        self.cursor.position()
    }

    #[inline(always)]
    fn cells(&mut self) -> &[AtomicI32] {
        let len = self.cursor.capacity() * 2;
        // SAFETY: read-write mapping of exactly `capacity * 8` bytes, page
        // aligned, alive for the lifetime of `self`.
        unsafe { slice::from_raw_parts(self.mm.as_mut_ptr() as *const AtomicI32, len) }
    }
}

impl ResultSink for SharedResultSink {
    #[inline]
    fn write(&mut self, number: i32, is_prime: bool) {
        let record = ResultRecord::from(ClassificationResult::new(number, is_prime));
        let at = self.cursor.advance() * 2;
        let cells = self.cells();
        cells[at].store(record.number, Ordering::Relaxed);
        cells[at + 1].store(record.tag, Ordering::Release);
    }
}

/// Read side of the outbound region, used by the external consumer.
pub struct SharedResultReader {
    mm: MmapFile,
    cursor: CyclicCursor,
}

impl SharedResultReader {
    /// Maps an existing outbound file read-only.
    ///
    /// # Errors
    /// Missing file, mapping failure, or a length that is not a whole number
    /// of records (`InvalidInput`).
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let mm = MmapFile::open_ro(path)?;
        let capacity = slots_in_region(mm.len(), RECORD_SIZE)?;
        Ok(Self {
            mm,
            cursor: CyclicCursor::new(capacity),
        })
    }

    pub fn capacity(&self) -> usize {
        self.cursor.capacity()
    }

    #[inline(always)]
    fn cells(&self) -> &[AtomicI32] {
        // SAFETY: see `SharedIntegerSource::cells`; same mapping guarantees,
        // two cells per record.
        unsafe {
            slice::from_raw_parts(
                self.mm.as_ptr() as *const AtomicI32,
                self.cursor.capacity() * 2,
            )
        }
    }

    /// Reads the record at `slot` without moving the cursor.
    ///
    /// # Panics
    /// If `slot >= capacity()`.
    pub fn read_at(&self, slot: usize) -> ResultRecord {
        let cells = self.cells();
        let tag = cells[slot * 2 + 1].load(Ordering::Acquire);
        let number = cells[slot * 2].load(Ordering::Relaxed);
        ResultRecord { number, tag }
    }

    /// Reads the record under the cursor and advances, wrapping at the end.
    /// Returns the slot index alongside the record.
    pub fn read_next(&mut self) -> (usize, ResultRecord) {
        let slot = self.cursor.advance();
        (slot, self.read_at(slot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prism_events::{TAG_COMPOSITE, TAG_PRIME};

    #[test]
    fn writes_number_then_ascii_tag() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("primes.dat");
        let mut sink = SharedResultSink::create(&path, 4 * RECORD_SIZE).unwrap();

        sink.write(7, true);
        sink.write(8, false);

        // check the raw bytes, this is what a consumer in any language sees
        let bytes = std::fs::read(&path).unwrap();
        let word = |i: usize| i32::from_ne_bytes(bytes[i * 4..i * 4 + 4].try_into().unwrap());
        assert_eq!(word(0), 7);
        assert_eq!(word(1), 0x54);
        assert_eq!(word(2), 8);
        assert_eq!(word(3), 0x46);
        assert_eq!(word(4), 0);
    }

    #[test]
    fn reader_sees_records_and_empty_slots() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("primes.dat");
        let mut sink = SharedResultSink::create(&path, 3 * RECORD_SIZE).unwrap();
        let mut reader = SharedResultReader::open(&path).unwrap();
        assert_eq!(reader.capacity(), 3);

        sink.write(13, true);

        let (slot, rec) = reader.read_next();
        assert_eq!(slot, 0);
        assert_eq!(rec, ResultRecord { number: 13, tag: TAG_PRIME });
        let (_, rec) = reader.read_next();
        assert!(rec.is_empty());
    }

    #[test]
    fn write_cursor_wraps_to_record_zero() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("primes.dat");
        let mut sink = SharedResultSink::create(&path, 2 * RECORD_SIZE).unwrap();
        let reader = SharedResultReader::open(&path).unwrap();

        sink.write(3, true);
        sink.write(4, false);
        assert_eq!(sink.position(), 0);
        sink.write(9, false);

        assert_eq!(reader.read_at(0), ResultRecord { number: 9, tag: TAG_COMPOSITE });
        assert_eq!(reader.read_at(1), ResultRecord { number: 4, tag: TAG_COMPOSITE });
    }

    #[test]
    fn capacity_must_be_whole_records() {
        let dir = tempfile::tempdir().unwrap();
        let err = SharedResultSink::create(dir.path().join("primes.dat"), 12)
            .err()
            .unwrap();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }
}
