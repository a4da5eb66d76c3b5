use serde::Deserialize;
use std::path::Path;

#[derive(Deserialize, Debug, Clone)]
pub struct SieveConfig {
    #[serde(default = "defaults::numbers_path")]
    pub numbers_path: String,
    #[serde(default = "defaults::results_path")]
    pub results_path: String,
    /// Size of the outbound file; must be a whole number of 8-byte records.
    #[serde(default = "defaults::results_capacity_bytes")]
    pub results_capacity_bytes: usize,
    #[serde(default = "defaults::workers")]
    pub workers: usize,
    #[serde(default = "defaults::poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Absent means unbounded work and result queues.
    #[serde(default)]
    pub queue_capacity: Option<usize>,
    #[serde(default)]
    pub tester: TesterKind,
    /// Absent means run until the producer writes end-of-stream.
    #[serde(default)]
    pub run_time_secs: Option<u64>,
    #[serde(default = "defaults::log_level")]
    pub log_level: String,
}

#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum TesterKind {
    #[default]
    TrialDivision,
    MillerRabin,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read '{path}'")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config")]
    Parse(#[from] toml::de::Error),
}

mod defaults {
    pub fn numbers_path() -> String {
        "/tmp/prism_numbers.dat".into()
    }

    pub fn results_path() -> String {
        "/tmp/prism_primes.dat".into()
    }

    pub fn results_capacity_bytes() -> usize {
        1024
    }

    pub fn workers() -> usize {
        3
    }

    pub fn poll_interval_ms() -> u64 {
        10
    }

    pub fn log_level() -> String {
        "info".into()
    }
}

impl SieveConfig {
    pub fn load(path: impl AsRef<Path> + ToString) -> Result<Self, ConfigError> {
        let toml_to_str = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        Self::parse(&toml_to_str)
    }

    pub fn parse(toml_str: &str) -> Result<Self, ConfigError> {
        let sieve_config: SieveConfig = toml::from_str(toml_str)?;
        Ok(sieve_config)
    }
}

impl Default for SieveConfig {
    fn default() -> Self {
        Self {
            numbers_path: defaults::numbers_path(),
            results_path: defaults::results_path(),
            results_capacity_bytes: defaults::results_capacity_bytes(),
            workers: defaults::workers(),
            poll_interval_ms: defaults::poll_interval_ms(),
            queue_capacity: None,
            tester: TesterKind::default(),
            run_time_secs: None,
            log_level: defaults::log_level(),
        }
    }
}
