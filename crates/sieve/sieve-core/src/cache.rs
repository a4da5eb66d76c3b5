//! Set of integers already proven prime.
//!
//! The dispatch task reads it to route a known prime straight to the writer;
//! workers insert every prime they find. Entries are only ever added, never
//! removed, so the set grows for the lifetime of the process. With inputs
//! drawn from the full `i32` range that is a real memory-growth risk on long
//! runs; a bounded (LRU) variant would slot in behind the same two methods.

use parking_lot::RwLock;
use std::collections::HashSet;

#[derive(Debug, Default)]
pub struct PrimeCache {
    primes: RwLock<HashSet<i32>>,
}

impl PrimeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Membership check with no side effect. A `false` only means "not known
    /// yet"; the number is then re-tested.
    #[inline]
    pub fn contains(&self, n: i32) -> bool {
        self.primes.read().contains(&n)
    }

    /// Records `n` as prime. Idempotent; returns `true` if `n` was new.
    ///
    /// Callers must only insert values a primality test has accepted: the
    /// cache never holds a composite.
    #[inline]
    pub fn insert(&self, n: i32) -> bool {
        self.primes.write().insert(n)
    }

    pub fn len(&self) -> usize {
        self.primes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.primes.read().is_empty()
    }
}
