use log::LevelFilter;
use std::{env, str::FromStr, time::Duration};
use thiserror::Error;

pub mod client;
pub mod server;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("ENV var {key} should be {expected}, got {value:?}")]
    Invalid {
        key: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Reads `key` from the environment, falling back to `default` when unset.
pub(crate) fn env_or<T: FromStr>(
    key: &'static str,
    expected: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
            key,
            expected,
            value,
        }),
        Err(_) => Ok(default),
    }
}

pub(crate) fn env_millis(key: &'static str, default_ms: u64) -> Result<Duration, ConfigError> {
    env_or(key, "a number of milliseconds", default_ms).map(Duration::from_millis)
}

pub fn log_level() -> Result<LevelFilter, ConfigError> {
    env_or("LOG_LEVEL", "a log level", LevelFilter::Info)
}
