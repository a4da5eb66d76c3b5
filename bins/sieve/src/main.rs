use anyhow::Context;
use sieve_config::SieveConfig;
use sieve_engine::{PipelineState, SieveEngine, StopToken};
use std::time::{Duration, Instant};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let cfg = match std::env::args().nth(1) {
        Some(path) => {
            SieveConfig::load(&path).with_context(|| format!("loading config from {path}"))?
        }
        None => SieveConfig::default(),
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_thread_names(true)
        .init();

    let engine = SieveEngine::from_config(&cfg).context("setting up classifier")?;
    let handle = engine
        .start(StopToken::new())
        .context("starting classification pipeline")?;
    info!(numbers = %cfg.numbers_path, results = %cfg.results_path, "SIEVE: running");

    if let Some(secs) = cfg.run_time_secs {
        let deadline = Instant::now() + Duration::from_secs(secs);
        while handle.state() == PipelineState::Running && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(50));
        }
        handle.stop();
    }

    let report = handle.join().context("classification pipeline failed")?;
    info!(
        dispatched = report.dispatched,
        cache_hits = report.cache_hits,
        tested = report.tested,
        primes = report.primes,
        written = report.written,
        faults = report.faults,
        "SIEVE: stopped"
    );
    Ok(())
}
