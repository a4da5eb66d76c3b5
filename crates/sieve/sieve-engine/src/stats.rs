use std::sync::atomic::{AtomicU64, Ordering};

/// Counters updated by the pipeline tasks. Relaxed everywhere: they are for
/// reporting and tests, nothing synchronises through them.
#[derive(Debug, Default)]
pub struct PipelineStats {
    dispatched: AtomicU64,
    cache_hits: AtomicU64,
    tested: AtomicU64,
    primes: AtomicU64,
    queued_results: AtomicU64,
    written: AtomicU64,
    faults: AtomicU64,
}

/// Point-in-time copy of [`PipelineStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineReport {
    /// Non-idle values read from the source.
    pub dispatched: u64,
    /// Values answered from the cache without touching the worker pool.
    pub cache_hits: u64,
    /// Primality test invocations by workers.
    pub tested: u64,
    /// Tests that came back prime.
    pub primes: u64,
    /// Results placed on the result queue.
    pub queued_results: u64,
    /// Results stored in the sink.
    pub written: u64,
    /// Loop iterations skipped because of a caught panic.
    pub faults: u64,
}

impl PipelineStats {
    #[inline(always)]
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_dispatched(&self) {
        Self::bump(&self.dispatched);
    }

    pub(crate) fn record_cache_hit(&self) {
        Self::bump(&self.cache_hits);
    }

    pub(crate) fn record_tested(&self) {
        Self::bump(&self.tested);
    }

    pub(crate) fn record_prime(&self) {
        Self::bump(&self.primes);
    }

    pub(crate) fn record_queued_result(&self) {
        Self::bump(&self.queued_results);
    }

    pub(crate) fn record_written(&self) {
        Self::bump(&self.written);
    }

    pub(crate) fn record_fault(&self) {
        Self::bump(&self.faults);
    }

    pub fn snapshot(&self) -> PipelineReport {
        PipelineReport {
            dispatched: self.dispatched.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            tested: self.tested.load(Ordering::Relaxed),
            primes: self.primes.load(Ordering::Relaxed),
            queued_results: self.queued_results.load(Ordering::Relaxed),
            written: self.written.load(Ordering::Relaxed),
            faults: self.faults.load(Ordering::Relaxed),
        }
    }
}
