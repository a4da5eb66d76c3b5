use prism_events::{IDLE, SENTINEL};
use prism_icc::{IntegerSource, ResultSink};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

pub fn temp_shm_path(label: &str) -> String {
    format!("/tmp/prism_bench_{}_{}", label, std::process::id())
}

/// Deterministic inputs in `[1, i32::MAX)`, the same range the generator
/// draws from.
pub fn random_corpus(len: usize, seed: u64) -> Vec<i32> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len).map(|_| rng.random_range(1..i32::MAX)).collect()
}

/// Values drawn from a small pool so most of them repeat, which is what
/// makes the cache matter.
pub fn repeating_corpus(len: usize, distinct: usize, seed: u64) -> Vec<i32> {
    let pool = random_corpus(distinct.max(1), seed);
    let mut rng = StdRng::seed_from_u64(seed ^ 0x9e37_79b9);
    (0..len)
        .map(|_| pool[rng.random_range(0..pool.len())])
        .collect()
}

/// In-memory source for driving the pipeline without a mapped file. Emits
/// the corpus once, then the sentinel.
pub struct CorpusSource {
    values: std::vec::IntoIter<i32>,
    done: bool,
}

impl CorpusSource {
    pub fn new(values: Vec<i32>) -> Self {
        Self {
            values: values.into_iter(),
            done: false,
        }
    }
}

impl IntegerSource for CorpusSource {
    fn next(&mut self) -> Option<i32> {
        if self.done {
            return None;
        }
        loop {
            match self.values.next() {
                Some(IDLE) => continue,
                Some(SENTINEL) | None => {
                    self.done = true;
                    return None;
                }
                Some(v) => return Some(v),
            }
        }
    }
}

/// Sink that only counts, so the measurement excludes the mapped write.
#[derive(Clone, Default)]
pub struct CountingSink {
    written: Arc<AtomicU64>,
}

impl CountingSink {
    pub fn written(&self) -> u64 {
        self.written.load(Ordering::Relaxed)
    }
}

impl ResultSink for CountingSink {
    fn write(&mut self, _number: i32, _is_prime: bool) {
        self.written.fetch_add(1, Ordering::Relaxed);
    }
}
