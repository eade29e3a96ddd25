//! Configuration System
//!
//! File-backed configuration for the tracker, layered over built-in defaults
//! with the `config` crate. A config file is optional; the defaults on their
//! own describe a working tracker.

use crate::error::TrackerError;
use crate::logging::LoggingConfig;
use config::{Config, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Fallback abort-requests flag, used when neither the dispatch options
    /// nor the context decide it
    #[serde(default)]
    pub default_abort_requests: bool,

    /// Drop handles from their registry once they settle
    #[serde(default = "default_prune_settled")]
    pub prune_settled: bool,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_prune_settled() -> bool {
    true
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            default_abort_requests: false,
            prune_settled: default_prune_settled(),
            logging: LoggingConfig::default(),
        }
    }
}

impl TrackerConfig {
    /// Load configuration, layering an optional file over the defaults
    pub fn load(path: Option<&Path>) -> Result<Self, TrackerError> {
        let mut builder = Config::builder()
            .set_default("default_abort_requests", false)?
            .set_default("prune_settled", true)?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path.to_path_buf()));
        }

        let config: TrackerConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), TrackerError> {
        self.logging.validate().map_err(TrackerError::Config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = TrackerConfig::default();
        assert!(!config.default_abort_requests);
        assert!(config.prune_settled);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        let config = TrackerConfig::load(None).unwrap();
        assert!(!config.default_abort_requests);
        assert!(config.prune_settled);
    }

    #[test]
    fn test_load_from_toml_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("tracker.toml");

        std::fs::write(
            &config_file,
            r#"
default_abort_requests = true
prune_settled = false

[logging]
level = "debug"
format = "json"
"#,
        )
        .unwrap();

        let config = TrackerConfig::load(Some(&config_file)).unwrap();
        assert!(config.default_abort_requests);
        assert!(!config.prune_settled);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_load_rejects_invalid_logging() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("tracker.toml");

        std::fs::write(
            &config_file,
            r#"
[logging]
format = "yaml"
"#,
        )
        .unwrap();

        assert!(TrackerConfig::load(Some(&config_file)).is_err());
    }

    #[test]
    fn test_load_missing_file_fails() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope.toml");
        assert!(TrackerConfig::load(Some(&missing)).is_err());
    }
}
