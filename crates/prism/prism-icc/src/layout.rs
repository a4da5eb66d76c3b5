//! Binary layout of the two mapped regions.
//!
//! Neither region carries a header. The inbound region is a flat array of
//! native-endian `i32`; the outbound region is a flat array of
//! [`ResultRecord`]s.
//!
//! ```text
//! inbound  (numbers):  ┌──────┬──────┬──────┬─────┬────────────────┐
//!                      │ i32  │ i32  │ i32  │ ... │ i32[cap - 1]   │
//!                      └──────┴──────┴──────┴─────┴────────────────┘
//!
//! outbound (results):  ┌─────────────┬─────────────┬─────┬─────────────┐
//!                      │ number│ tag │ number│ tag │ ... │ number│ tag │
//!                      │  i32  │ i32 │  i32  │ i32 │     │  i32  │ i32 │
//!                      └─────────────┴─────────────┴─────┴─────────────┘
//! ```
//!
//! A region whose byte length is not a whole number of slots is rejected
//! rather than silently truncated: the cursor wrap relies on the last slot
//! ending exactly at the end of the mapping.

use prism_events::ResultRecord;
use std::io;
use std::mem::size_of;

/// Bytes per inbound slot.
pub const INT_SIZE: usize = size_of::<i32>();

/// Bytes per outbound record.
pub const RECORD_SIZE: usize = size_of::<ResultRecord>();

/// Number of `slot_size` slots in a region of `len_bytes`.
///
/// # Errors
/// `InvalidInput` if the region is empty or not an exact multiple of `slot_size`.
pub fn slots_in_region(len_bytes: usize, slot_size: usize) -> io::Result<usize> {
    if len_bytes == 0 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "mapped region is empty",
        ));
    }
    if len_bytes % slot_size != 0 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("region of {len_bytes} bytes is not a multiple of the {slot_size}-byte slot"),
        ));
    }
    Ok(len_bytes / slot_size)
}

pub fn bytes_for_ints(capacity: usize) -> usize {
    capacity * INT_SIZE
}

pub fn bytes_for_records(capacity: usize) -> usize {
    capacity * RECORD_SIZE
}
