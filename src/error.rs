//! Error types for the request lifecycle tracker.

use std::time::Duration;
use thiserror::Error;

/// Tracker-level errors
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Requests did not settle within {timeout:?} ({in_flight} still in flight)")]
    SettleTimeout { timeout: Duration, in_flight: usize },
}

impl From<config::ConfigError> for TrackerError {
    fn from(err: config::ConfigError) -> Self {
        TrackerError::Config(err.to_string())
    }
}
