mod runner_config;

pub use runner_config::{ConfigError, DEFAULT_CONFIG_FILE, RunnerConfig};
