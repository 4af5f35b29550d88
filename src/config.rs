//! Configuration management for the storage service
//!
//! Loads the storage settings from an optional `config.toml` with
//! environment overrides, falling back to built-in defaults.

use config::{Config, Environment, File};
use serde::Deserialize;

const DEFAULT_BASE_DIR: &str = "uploads";

/// Storage service configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Root directory for all stored files. Resolved to an absolute path
    /// and created at service initialization.
    pub base_dir: String,
}

impl StorageConfig {
    /// Load configuration from `config.toml` (if present) with
    /// `STRONGBOX_*` environment overrides.
    pub fn load() -> Result<Self, config::ConfigError> {
        let settings = Config::builder()
            .set_default("base_dir", DEFAULT_BASE_DIR)?
            .add_source(File::with_name("config").required(false))
            .add_source(Environment::with_prefix("STRONGBOX"))
            .build()?;

        let config: StorageConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), config::ConfigError> {
        if self.base_dir.trim().is_empty() {
            return Err(config::ConfigError::Message(
                "base_dir cannot be empty".into(),
            ));
        }
        Ok(())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            base_dir: DEFAULT_BASE_DIR.to_string(),
        }
    }
}
