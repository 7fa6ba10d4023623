use crate::constants::*;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub data_path: String,
    pub store_timeout: Duration,
    pub log_filter: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidTimeout(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidTimeout(value) => {
                write!(
                    f,
                    "STORE_TIMEOUT_SECS must be a positive number of seconds, got: {}",
                    value
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let data_path = env::var("DATABASE_PATH").unwrap_or_else(|_| DEFAULT_DATA_PATH.to_string());
        let log_filter = env::var("LOG_FILTER").unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string());

        let store_timeout = match env::var("STORE_TIMEOUT_SECS") {
            Ok(raw) => parse_timeout(&raw)?,
            Err(_) => Duration::from_secs(DEFAULT_STORE_TIMEOUT_SECS),
        };

        Ok(Config {
            data_path,
            store_timeout,
            log_filter,
        })
    }
}

fn parse_timeout(raw: &str) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidTimeout(raw.to_string())),
    }
}
