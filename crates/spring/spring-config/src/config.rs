use serde::Deserialize;
use std::path::Path;

#[derive(Deserialize, Debug, Clone)]
pub struct SpringConfig {
    #[serde(default = "defaults::numbers_path")]
    pub numbers_path: String,
    #[serde(default = "defaults::results_path")]
    pub results_path: String,
    #[serde(default = "defaults::numbers_capacity_bytes")]
    pub numbers_capacity_bytes: usize,
    #[serde(default = "defaults::run_time_secs")]
    pub run_time_secs: u64,
    /// Pause after each generated number, in microseconds. 0 disables pacing.
    #[serde(default = "defaults::pace_us")]
    pub pace_us: u64,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "defaults::open_timeout_ms")]
    pub open_timeout_ms: u64,
    #[serde(default = "defaults::log_level")]
    pub log_level: String,
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

    pub fn numbers_capacity_bytes() -> usize {
        1024
    }

    pub fn run_time_secs() -> u64 {
        120
    }

    pub fn pace_us() -> u64 {
        100
    }

    pub fn open_timeout_ms() -> u64 {
        5_000
    }

    pub fn log_level() -> String {
        "info".into()
    }
}

impl SpringConfig {
    pub fn load(path: impl AsRef<Path> + ToString) -> Result<Self, ConfigError> {
        let toml_to_str = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        let spring_config: SpringConfig = toml::from_str(&toml_to_str)?;
        Ok(spring_config)
    }
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self {
            numbers_path: defaults::numbers_path(),
            results_path: defaults::results_path(),
            numbers_capacity_bytes: defaults::numbers_capacity_bytes(),
            run_time_secs: defaults::run_time_secs(),
            pace_us: defaults::pace_us(),
            seed: None,
            open_timeout_ms: defaults::open_timeout_ms(),
            log_level: defaults::log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_classifier_side() {
        let cfg: SpringConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.numbers_path, "/tmp/prism_numbers.dat");
        assert_eq!(cfg.results_path, "/tmp/prism_primes.dat");
        assert_eq!(cfg.numbers_capacity_bytes, 1024);
        assert_eq!(cfg.run_time_secs, 120);
        assert!(cfg.seed.is_none());
    }

    #[test]
    fn seed_and_pacing_can_be_set() {
        let cfg: SpringConfig = toml::from_str("seed = 42\npace_us = 0\n").unwrap();
        assert_eq!(cfg.seed, Some(42));
        assert_eq!(cfg.pace_us, 0);
    }
}
