use prism_core::StopToken;
use prism_icc::SharedIntegerWriter;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::thread;
use std::time::Duration;
use tracing::info;

/// Writes random integers in `[1, i32::MAX)` into the inbound region until
/// stopped, then terminates the stream with the sentinel.
pub struct Generator {
    writer: SharedIntegerWriter,
    rng: StdRng,
    pace: Duration,
}

impl Generator {
    /// `seed = None` draws from OS entropy.
    pub fn new(writer: SharedIntegerWriter, seed: Option<u64>, pace: Duration) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_os_rng(),
        };
        Self { writer, rng, pace }
    }

    #[inline]
    fn next_number(&mut self) -> i32 {
        self.rng.random_range(1..i32::MAX)
    }

    /// Returns how many numbers were written before the sentinel.
    pub fn run(&mut self, token: &StopToken) -> u64 {
        info!(capacity = self.writer.capacity(), pace = ?self.pace, "generator started");
        let mut written = 0u64;
        while !token.is_stopped() {
            let n = self.next_number();
            self.writer.put(n);
            written += 1;
            if !self.pace.is_zero() {
                thread::sleep(self.pace);
            }
        }
        self.writer.put_sentinel();
        info!(written, "generator stopped, end-of-stream written");
        written
    }
}
