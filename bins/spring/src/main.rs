use anyhow::{Context, anyhow};
use prism_core::StopToken;
use prism_icc::SharedIntegerWriter;
use spring_config::SpringConfig;
use spring_engine::{Generator, ResultPrinter, wait_for_results};
use std::thread;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let cfg = match std::env::args().nth(1) {
        Some(path) => {
            SpringConfig::load(&path).with_context(|| format!("loading config from {path}"))?
        }
        None => SpringConfig::default(),
    };

    // stdout carries the printed results, logs go to stderr
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_thread_names(true)
        .with_writer(std::io::stderr)
        .init();

    let writer = SharedIntegerWriter::create(&cfg.numbers_path, cfg.numbers_capacity_bytes)
        .with_context(|| format!("creating inbound region {}", cfg.numbers_path))?;
    info!(path = %cfg.numbers_path, capacity = writer.capacity(), "SPRING: inbound region created");

    let token = StopToken::new();

    let generator = {
        let token = token.clone();
        let mut generator =
            Generator::new(writer, cfg.seed, Duration::from_micros(cfg.pace_us));
        thread::Builder::new()
            .name("spring-generator".into())
            .spawn(move || generator.run(&token))
            .context("spawning generator")?
    };

    let printer = {
        let token = token.clone();
        let results_path = cfg.results_path.clone();
        let open_timeout = Duration::from_millis(cfg.open_timeout_ms);
        thread::Builder::new()
            .name("spring-printer".into())
            .spawn(move || -> std::io::Result<u64> {
                let reader = wait_for_results(&results_path, open_timeout, &token)?;
                let mut printer = ResultPrinter::new(reader, std::io::stdout());
                printer.run(&token, Duration::from_millis(1))
            })
            .context("spawning printer")?
    };

    thread::sleep(Duration::from_secs(cfg.run_time_secs));
    token.stop();

    let written = generator
        .join()
        .map_err(|_| anyhow!("generator thread panicked"))?;
    info!(written, "SPRING: generator stopped");

    match printer.join() {
        Ok(Ok(printed)) => info!(printed, "SPRING: printer stopped"),
        Ok(Err(e)) => warn!(error = %e, path = %cfg.results_path, "SPRING: printer gave up"),
        Err(_) => return Err(anyhow!("printer thread panicked")),
    }
    Ok(())
}
