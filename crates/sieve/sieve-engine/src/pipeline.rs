//! The concurrent classification pipeline.
//!
//! ```text
//!                         cache hit
//!             ┌──────────────────────────────────────┐
//!             │                                      ▼
//! source ─► dispatch ──► work queue ──► workers ──► result queue ──► writer ──► sink
//!             │             (miss)      (N threads)                (1 thread)
//!             └── idle (0) skipped, sentinel ends the stream
//! ```
//!
//! Tasks share nothing but the two queues, the prime cache, the stop token
//! and the statistics counters.
//!
//! # Ordering
//!
//! Results are *not* written in input order. A cache hit goes straight to
//! the result queue while an earlier miss may still be inside a worker, and
//! workers finish in whatever order their tests complete.
//!
//! # Shutdown
//!
//! - End of stream: the dispatch task returns and drops the work queue
//!   sender. Workers drain the remaining work, then drop their result
//!   senders; the writer drains the result queue and exits once it is
//!   closed. Nothing is lost.
//! - External stop: every loop checks the token once per iteration. Dispatch
//!   and workers exit (a worker finishes the number it is testing first);
//!   numbers still on the work queue are abandoned. The writer keeps taking
//!   results until every result sender is gone, so anything classified,
//!   including a number a worker finishes after the stop, reaches the sink.
//!   Results are never abandoned on stop; only queued work is.

use crate::error::EngineError;
use crate::stats::{PipelineReport, PipelineStats};
use prism_core::StopToken;
use prism_events::{ClassificationResult, IDLE};
use prism_icc::{IntegerSource, ResultSink};
use sieve_core::{Offer, PrimalityTest, PrimeCache, RingChannel, RingReceiver, RingSender, Take};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Consecutive idle reads after which the dispatch task yields its time slice.
const IDLE_YIELD_EVERY: u32 = 1024;

#[derive(Debug, Clone, Copy)]
pub struct PipelineConfig {
    /// Size of the worker pool. Must be at least 1.
    pub workers: usize,
    /// Longest a blocked task waits before re-checking the stop token.
    pub poll_interval: Duration,
    /// `None` for unbounded queues.
    pub queue_capacity: Option<usize>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workers: 3,
            poll_interval: Duration::from_millis(10),
            queue_capacity: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Running,
    /// Stop requested or end of stream reached; some tasks still draining.
    Stopping,
    Stopped,
}

/// Everything the tasks need except the two endpoints.
pub struct ClassificationPipeline {
    tester: Arc<dyn PrimalityTest>,
    cache: Arc<PrimeCache>,
    config: PipelineConfig,
}

/// Running pipeline. Dropping it without `join()` detaches the threads.
pub struct PipelineHandle {
    token: StopToken,
    stats: Arc<PipelineStats>,
    dispatch: JoinHandle<()>,
    workers: Vec<JoinHandle<()>>,
    writer: JoinHandle<()>,
}

impl ClassificationPipeline {
    pub fn new(
        tester: Arc<dyn PrimalityTest>,
        cache: Arc<PrimeCache>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            tester,
            cache,
            config,
        }
    }

    /// Starts the writer, the worker pool and the dispatch task, in that
    /// order, so every consumer exists before its producer.
    ///
    /// # Errors
    /// `InvalidConfig` for an empty pool, zero poll interval or zero queue
    /// capacity; `Spawn` if a thread cannot be created, in which case the
    /// tasks already started are stopped and joined before returning.
    pub fn spawn<S, W>(
        self,
        source: S,
        sink: W,
        token: StopToken,
    ) -> Result<PipelineHandle, EngineError>
    where
        S: IntegerSource + Send + 'static,
        W: ResultSink + Send + 'static,
    {
        let cfg = self.config;
        if cfg.workers == 0 {
            return Err(EngineError::InvalidConfig(
                "worker pool needs at least one worker".into(),
            ));
        }
        if cfg.poll_interval.is_zero() {
            return Err(EngineError::InvalidConfig(
                "poll interval must be non-zero".into(),
            ));
        }
        if cfg.queue_capacity == Some(0) {
            return Err(EngineError::InvalidConfig(
                "queue capacity must be non-zero".into(),
            ));
        }

        let stats = Arc::new(PipelineStats::default());
        let (work_tx, work_rx) = RingChannel::<i32>::with_capacity(cfg.queue_capacity).split();
        let (result_tx, result_rx) =
            RingChannel::<ClassificationResult>::with_capacity(cfg.queue_capacity).split();

        let mut started: Vec<JoinHandle<()>> = Vec::with_capacity(cfg.workers + 2);
        let abort = |started: Vec<JoinHandle<()>>, err: EngineError| {
            token.stop();
            for h in started {
                let _ = h.join();
            }
            Err(err)
        };

        let writer = {
            let stats = Arc::clone(&stats);
            let token = token.clone();
            spawn_named("sieve-writer".into(), move || {
                run_writer(sink, result_rx, &stats, &token, cfg.poll_interval)
            })
        };
        match writer {
            Ok(h) => started.push(h),
            Err(e) => return abort(started, e),
        }

        for id in 0..cfg.workers {
            let worker = {
                let tester = Arc::clone(&self.tester);
                let cache = Arc::clone(&self.cache);
                let work_rx = work_rx.clone();
                let result_tx = result_tx.clone();
                let stats = Arc::clone(&stats);
                let token = token.clone();
                spawn_named(format!("sieve-worker-{id}"), move || {
                    run_worker(
                        id,
                        tester.as_ref(),
                        &cache,
                        work_rx,
                        result_tx,
                        &stats,
                        &token,
                        cfg.poll_interval,
                    )
                })
            };
            match worker {
                Ok(h) => started.push(h),
                Err(e) => {
                    // the writer only exits once every result sender is gone
                    drop(work_tx);
                    drop(result_tx);
                    return abort(started, e);
                }
            }
        }
        drop(work_rx);

        let dispatch = {
            let cache = Arc::clone(&self.cache);
            let stats = Arc::clone(&stats);
            let token = token.clone();
            spawn_named("sieve-dispatch".into(), move || {
                run_dispatch(
                    source,
                    &cache,
                    work_tx,
                    result_tx,
                    &stats,
                    &token,
                    cfg.poll_interval,
                )
            })
        };
        let dispatch = match dispatch {
            Ok(h) => h,
            Err(e) => return abort(started, e),
        };

        info!(workers = cfg.workers, "classification pipeline started");

        let writer = started.remove(0);
        Ok(PipelineHandle {
            token,
            stats,
            dispatch,
            workers: started,
            writer,
        })
    }
}

impl PipelineHandle {
    /// Raises the stop token shared by every task.
    pub fn stop(&self) {
        self.token.stop();
    }

    pub fn token(&self) -> &StopToken {
        &self.token
    }

    pub fn stats(&self) -> &Arc<PipelineStats> {
        &self.stats
    }

    pub fn state(&self) -> PipelineState {
        let stopped = self.dispatch.is_finished()
            && self.writer.is_finished()
            && self.workers.iter().all(JoinHandle::is_finished);
        if stopped {
            PipelineState::Stopped
        } else if self.token.is_stopped() || self.dispatch.is_finished() {
            PipelineState::Stopping
        } else {
            PipelineState::Running
        }
    }

    /// Waits for every task to exit and returns the final counters.
    ///
    /// # Errors
    /// `TaskPanicked` naming the first task that died from an uncaught panic.
    /// All tasks are still joined.
    pub fn join(self) -> Result<PipelineReport, EngineError> {
        let mut panicked: Option<String> = None;
        let handles = std::iter::once(self.dispatch)
            .chain(self.workers)
            .chain(std::iter::once(self.writer));
        for h in handles {
            let name = h.thread().name().unwrap_or("sieve-task").to_string();
            if h.join().is_err() {
                error!(task = %name, "pipeline task panicked");
                panicked.get_or_insert(name);
            }
        }

        let report = self.stats.snapshot();
        info!(?report, "classification pipeline stopped");
        match panicked {
            Some(name) => Err(EngineError::TaskPanicked(name)),
            None => Ok(report),
        }
    }
}

fn spawn_named<F>(name: String, f: F) -> Result<JoinHandle<()>, EngineError>
where
    F: FnOnce() + Send + 'static,
{
    thread::Builder::new()
        .name(name.clone())
        .spawn(f)
        .map_err(|source| EngineError::Spawn { name, source })
}

/// Runs one loop iteration body, turning a panic into a logged skip.
fn guarded<R>(stage: &'static str, number: Option<i32>, f: impl FnOnce() -> R) -> Option<R> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(r) => Some(r),
        Err(payload) => {
            let reason = payload
                .downcast_ref::<&str>()
                .copied()
                .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
                .unwrap_or("non-string panic payload");
            error!(stage, ?number, reason, "fault in loop iteration, skipping it");
            None
        }
    }
}

/// Enqueues `item`, retrying while a bounded queue is full. Gives up if the
/// queue is closed, or if `abandon` turns true while waiting.
fn forward<T>(
    tx: &RingSender<T>,
    mut item: T,
    poll: Duration,
    abandon: impl Fn() -> bool,
) -> bool {
    loop {
        match tx.offer_timeout(item, poll) {
            Offer::Accepted => return true,
            Offer::Full(back) => {
                if abandon() {
                    return false;
                }
                item = back;
            }
            Offer::Closed(_) => {
                warn!("downstream queue closed, dropping item");
                return false;
            }
        }
    }
}

fn run_dispatch<S: IntegerSource>(
    mut source: S,
    cache: &PrimeCache,
    work_tx: RingSender<i32>,
    result_tx: RingSender<ClassificationResult>,
    stats: &PipelineStats,
    token: &StopToken,
    poll: Duration,
) {
    let mut idle_run = 0u32;
    while !token.is_stopped() {
        let Some(next) = guarded("dispatch", None, || source.next()) else {
            stats.record_fault();
            continue;
        };
        let Some(number) = next else {
            info!("end of stream, dispatch finished");
            break;
        };

        if number == IDLE {
            idle_run = idle_run.wrapping_add(1);
            if idle_run % IDLE_YIELD_EVERY == 0 {
                thread::yield_now();
            } else {
                std::hint::spin_loop();
            }
            continue;
        }
        idle_run = 0;
        stats.record_dispatched();

        if cache.contains(number) {
            debug!(number, "cache hit");
            stats.record_cache_hit();
            let hit = ClassificationResult::new(number, true);
            if !forward(&result_tx, hit, poll, || false) {
                break;
            }
            stats.record_queued_result();
        } else if !forward(&work_tx, number, poll, || token.is_stopped()) {
            break;
        }
    }
    if token.is_stopped() {
        info!("stop requested, dispatch finished");
    }
}

#[allow(clippy::too_many_arguments)]
fn run_worker(
    id: usize,
    tester: &dyn PrimalityTest,
    cache: &PrimeCache,
    work_rx: RingReceiver<i32>,
    result_tx: RingSender<ClassificationResult>,
    stats: &PipelineStats,
    token: &StopToken,
    poll: Duration,
) {
    debug!(worker = id, "worker started");
    while !token.is_stopped() {
        let number = match work_rx.take_timeout(poll) {
            Take::Item(n) => n,
            Take::Empty => continue,
            Take::Closed => break,
        };

        stats.record_tested();
        let Some(is_prime) = guarded("worker", Some(number), || tester.is_prime(number)) else {
            stats.record_fault();
            continue;
        };
        if is_prime {
            cache.insert(number);
            stats.record_prime();
        }

        // the writer drains until closed, so a full result queue always frees up
        let result = ClassificationResult::new(number, is_prime);
        if !forward(&result_tx, result, poll, || false) {
            break;
        }
        stats.record_queued_result();
    }
    debug!(worker = id, "worker finished");
}

fn run_writer<W: ResultSink>(
    mut sink: W,
    result_rx: RingReceiver<ClassificationResult>,
    stats: &PipelineStats,
    token: &StopToken,
    poll: Duration,
) {
    // Runs until every result sender is dropped. After a stop that takes at
    // most one poll interval plus whatever test a worker is still finishing.
    loop {
        match result_rx.take_timeout(poll) {
            Take::Item(r) => {
                let written = guarded("writer", Some(r.number), || {
                    sink.write(r.number, r.is_prime)
                });
                if written.is_some() {
                    stats.record_written();
                } else {
                    stats.record_fault();
                }
            }
            Take::Empty => continue,
            Take::Closed => {
                if token.is_stopped() {
                    debug!("result queue drained after stop");
                }
                break;
            }
        }
    }
    info!("writer finished");
}
