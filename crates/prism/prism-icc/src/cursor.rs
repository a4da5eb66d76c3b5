//! Cursor arithmetic for the fixed-size cyclic regions.
//!
//! Both mapped regions are addressed in whole slots (an `i32` inbound, an
//! 8-byte record outbound). A cursor walks the slots in order and resets to
//! slot 0 the moment it reaches the end, so a region of `capacity` slots
//! behaves like an endless sequence where slot `k` is reused every
//! `capacity` steps.

/// Position inside a region of `capacity` slots.
///
/// Unlike a power-of-two ring there is no sequence number and no mask: the
/// capacity is whatever the mapped file holds, and the wrap is an explicit
/// `position == capacity` reset.
///
/// # Example
/// ```
/// use prism_icc::CyclicCursor;
/// let mut c = CyclicCursor::new(3);
/// assert_eq!(c.advance(), 0);
/// assert_eq!(c.advance(), 1);
/// assert_eq!(c.advance(), 2);
/// assert_eq!(c.advance(), 0); // wrapped
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CyclicCursor {
    position: usize,
    capacity: usize,
}

impl CyclicCursor {
    /// Creates a cursor at slot 0.
    ///
    /// # Panics
    /// Panics if `capacity` is zero. Region constructors validate the size
    /// before building a cursor, see [`crate::slots_in_region`].
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Capacity must be non-zero");
        Self {
            position: 0,
            capacity,
        }
    }

    /// Slot the next `advance()` will hand out, always in `[0, capacity)`.
    #[inline(always)]
    pub fn position(&self) -> usize {
        self.position
    }

    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the current slot and steps past it, wrapping to 0 at the end.
    #[inline(always)]
    pub fn advance(&mut self) -> usize {
        let at = self.position;
        self.position += 1;
        if self.position == self.capacity {
            self.position = 0;
        }
        at
    }
}
