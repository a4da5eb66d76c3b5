//! In-process handoff queues between pipeline stages.
//!
//! A thin layer over `crossbeam_channel` giving the pipeline exactly the
//! operations it uses: a single blocking-with-timeout dequeue (so a consumer
//! can poll its stop token between waits instead of spinning on
//! `is_empty()`), and an enqueue that can give up on a full bounded queue.
//! Both halves are cloneable: many workers share one receiver and each item
//! is delivered to exactly one of them.

use crossbeam_channel::{
    Receiver, RecvTimeoutError, SendTimeoutError, Sender, TryRecvError, bounded, unbounded,
};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ChannelError {
    #[error("channel closed: every receiver has been dropped")]
    Closed,
}

/// Outcome of a dequeue attempt.
#[derive(Debug, PartialEq, Eq)]
pub enum Take<T> {
    Item(T),
    /// Nothing arrived within the wait.
    Empty,
    /// Every sender is gone and the queue is drained.
    Closed,
}

/// Outcome of a bounded enqueue attempt. The value is handed back when it
/// could not be queued.
#[derive(Debug, PartialEq, Eq)]
pub enum Offer<T> {
    Accepted,
    Full(T),
    Closed(T),
}

pub struct RingChannel<T> {
    tx: RingSender<T>,
    rx: RingReceiver<T>,
}

pub struct RingSender<T> {
    inner: Sender<T>,
}

pub struct RingReceiver<T> {
    inner: Receiver<T>,
}

impl<T> RingChannel<T> {
    /// Queue with no capacity limit; enqueue never waits.
    pub fn unbounded() -> Self {
        let (tx, rx) = unbounded();
        Self::from_parts(tx, rx)
    }

    /// Queue holding at most `capacity` items.
    ///
    /// # Panics
    /// If `capacity` is zero (a rendezvous queue would stall the dispatch task).
    pub fn bounded(capacity: usize) -> Self {
        assert!(capacity > 0, "bounded queue capacity must be non-zero");
        let (tx, rx) = bounded(capacity);
        Self::from_parts(tx, rx)
    }

    /// `None` selects an unbounded queue.
    pub fn with_capacity(capacity: Option<usize>) -> Self {
        match capacity {
            Some(cap) => Self::bounded(cap),
            None => Self::unbounded(),
        }
    }

    fn from_parts(tx: Sender<T>, rx: Receiver<T>) -> Self {
        Self {
            tx: RingSender { inner: tx },
            rx: RingReceiver { inner: rx },
        }
    }

    pub fn split(self) -> (RingSender<T>, RingReceiver<T>) {
        (self.tx, self.rx)
    }
}

impl<T> Clone for RingSender<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> Clone for RingReceiver<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> RingSender<T> {
    /// Enqueues `value`, waiting for space on a full bounded queue.
    pub fn offer(&self, value: T) -> Result<(), ChannelError> {
        self.inner.send(value).map_err(|_| ChannelError::Closed)
    }

    /// Enqueues `value`, waiting at most `timeout` for space.
    pub fn offer_timeout(&self, value: T, timeout: Duration) -> Offer<T> {
        match self.inner.send_timeout(value, timeout) {
            Ok(()) => Offer::Accepted,
            Err(SendTimeoutError::Timeout(v)) => Offer::Full(v),
            Err(SendTimeoutError::Disconnected(v)) => Offer::Closed(v),
        }
    }
}

impl<T> RingReceiver<T> {
    /// Blocks for at most `timeout` waiting for an item.
    #[inline]
    pub fn take_timeout(&self, timeout: Duration) -> Take<T> {
        match self.inner.recv_timeout(timeout) {
            Ok(v) => Take::Item(v),
            Err(RecvTimeoutError::Timeout) => Take::Empty,
            Err(RecvTimeoutError::Disconnected) => Take::Closed,
        }
    }

    /// Non-blocking dequeue.
    #[inline]
    pub fn try_take(&self) -> Take<T> {
        match self.inner.try_recv() {
            Ok(v) => Take::Item(v),
            Err(TryRecvError::Empty) => Take::Empty,
            Err(TryRecvError::Disconnected) => Take::Closed,
        }
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
