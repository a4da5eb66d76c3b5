mod config;

pub use config::{ConfigError, SpringConfig};
