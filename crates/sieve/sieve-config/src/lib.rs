mod config;

pub use config::{ConfigError, SieveConfig, TesterKind};
