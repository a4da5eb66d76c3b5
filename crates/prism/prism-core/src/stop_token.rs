use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cooperative cancellation shared by every long-running loop.
///
/// Clones observe the same flag. Loops poll `is_stopped()` once per
/// iteration; nothing is interrupted mid-item.
#[derive(Clone, Debug, Default)]
pub struct StopToken {
    stopped: Arc<AtomicBool>,
}

impl StopToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raises the flag. Idempotent.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::Release);
    }

    #[inline(always)]
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_flag() {
        let token = StopToken::new();
        let seen_by_task = token.clone();
        assert!(!seen_by_task.is_stopped());

        token.stop();
        assert!(seen_by_task.is_stopped());
        token.stop();
        assert!(token.is_stopped());
    }

    #[test]
    fn flag_crosses_threads() {
        let token = StopToken::new();
        let worker = {
            let token = token.clone();
            std::thread::spawn(move || {
                while !token.is_stopped() {
                    std::hint::spin_loop();
                }
            })
        };
        token.stop();
        worker.join().unwrap();
    }
}
