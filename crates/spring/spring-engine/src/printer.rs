use prism_core::StopToken;
use prism_events::ResultRecord;
use prism_icc::SharedResultReader;
use std::io::{self, Write};
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Prints `"<number> <true|false>"` for each record that appears in the
/// outbound region.
///
/// The region is re-scanned lap after lap. A slot is printed when its
/// content differs from what was last printed for it, so a result stays on
/// screen once even though the scan passes it many times. Slots still at
/// number 0 and records with an unreadable tag (a write caught half way) are
/// skipped until a later lap.
///
/// Records carry no sequence number, so a slot that is rewritten with the
/// same record on a later lap (the same number classified again and landing
/// in the same slot) looks unchanged and is not printed a second time.
pub struct ResultPrinter<W: Write> {
    reader: SharedResultReader,
    out: W,
    last_printed: Vec<ResultRecord>,
}

impl<W: Write> ResultPrinter<W> {
    pub fn new(reader: SharedResultReader, out: W) -> Self {
        let last_printed = vec![ResultRecord::default(); reader.capacity()];
        Self {
            reader,
            out,
            last_printed,
        }
    }

    /// One full lap over the region. Returns how many lines were printed.
    pub fn poll(&mut self) -> io::Result<usize> {
        let mut printed = 0;
        for _ in 0..self.reader.capacity() {
            let (slot, rec) = self.reader.read_next();
            if rec.is_empty() || rec == self.last_printed[slot] {
                continue;
            }
            let Some(is_prime) = rec.is_prime() else {
                continue;
            };
            writeln!(self.out, "{} {}", rec.number, is_prime)?;
            self.last_printed[slot] = rec;
            printed += 1;
        }
        Ok(printed)
    }

    /// Polls until stopped, then makes one last lap. Returns the total number
    /// of lines printed.
    pub fn run(&mut self, token: &StopToken, idle_pause: Duration) -> io::Result<u64> {
        info!(capacity = self.reader.capacity(), "printer started");
        let mut total = 0u64;
        while !token.is_stopped() {
            let printed = self.poll()?;
            total += printed as u64;
            if printed == 0 {
                thread::sleep(idle_pause);
            }
        }
        total += self.poll()? as u64;
        self.out.flush()?;
        info!(printed = total, "printer stopped");
        Ok(total)
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Waits for the classifier to create the outbound file, retrying until
/// `timeout` elapses or `token` is raised.
pub fn wait_for_results<P: AsRef<Path>>(
    path: P,
    timeout: Duration,
    token: &StopToken,
) -> io::Result<SharedResultReader> {
    let deadline = Instant::now() + timeout;
    loop {
        match SharedResultReader::open(&path) {
            Ok(reader) => return Ok(reader),
            Err(e) if Instant::now() >= deadline || token.is_stopped() => return Err(e),
            Err(e) => {
                debug!(error = %e, "outbound region not ready yet");
                thread::sleep(Duration::from_millis(10));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prism_icc::{ResultSink, SharedResultSink};

    #[test]
    fn prints_each_result_once_per_change() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("primes.dat");
        let mut sink = SharedResultSink::create(&path, 4 * 8).unwrap();
        let reader = SharedResultReader::open(&path).unwrap();
        let mut printer = ResultPrinter::new(reader, Vec::new());

        sink.write(7, true);
        sink.write(8, false);
        assert_eq!(printer.poll().unwrap(), 2);
        assert_eq!(printer.poll().unwrap(), 0);

        sink.write(9, false);
        assert_eq!(printer.poll().unwrap(), 1);

        let out = String::from_utf8(printer.into_inner()).unwrap();
        assert_eq!(out, "7 true\n8 false\n9 false\n");
    }

    #[test]
    fn overwritten_slot_is_printed_again() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("primes.dat");
        let mut sink = SharedResultSink::create(&path, 8).unwrap();
        let reader = SharedResultReader::open(&path).unwrap();
        let mut printer = ResultPrinter::new(reader, Vec::new());

        sink.write(11, true);
        printer.poll().unwrap();
        sink.write(12, false);
        printer.poll().unwrap();

        let out = String::from_utf8(printer.into_inner()).unwrap();
        assert_eq!(out, "11 true\n12 false\n");
    }

    /// An identical record written into the same slot on a later lap cannot be
    /// told apart from the old one and is not printed again.
    #[test]
    fn identical_rewrite_of_a_slot_is_not_reprinted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("primes.dat");
        let mut sink = SharedResultSink::create(&path, 2 * 8).unwrap();
        let reader = SharedResultReader::open(&path).unwrap();
        let mut printer = ResultPrinter::new(reader, Vec::new());

        sink.write(7, true);
        sink.write(8, false);
        assert_eq!(printer.poll().unwrap(), 2);

        sink.write(7, true);
        sink.write(9, false);
        assert_eq!(printer.poll().unwrap(), 1);

        let out = String::from_utf8(printer.into_inner()).unwrap();
        assert_eq!(out, "7 true\n8 false\n9 false\n");
    }

    #[test]
    fn waiting_gives_up_after_the_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let started = Instant::now();
        let res = wait_for_results(
            dir.path().join("never.dat"),
            Duration::from_millis(30),
            &StopToken::new(),
        );
        assert!(res.is_err());
        assert!(started.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn run_returns_after_stop_with_a_final_lap() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("primes.dat");
        let mut sink = SharedResultSink::create(&path, 16 * 8).unwrap();
        let reader = SharedResultReader::open(&path).unwrap();
        let mut printer = ResultPrinter::new(reader, Vec::new());

        sink.write(3, true);
        let token = StopToken::new();
        token.stop();
        assert_eq!(printer.run(&token, Duration::from_millis(1)).unwrap(), 1);
    }
}
