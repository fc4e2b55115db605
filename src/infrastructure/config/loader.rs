use std::collections::HashSet;

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::errors::AdapterError;
use crate::domain::models::RuntimeConfig;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Duplicate adapter name: {0}")]
    DuplicateAdapterName(String),

    #[error("Invalid adapter '{name}': {source}")]
    InvalidAdapter {
        name: String,
        #[source]
        source: AdapterError,
    },

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. switchyard.yaml (project config)
    /// 3. switchyard.local.yaml (local overrides, optional)
    /// 4. Environment variables (SWITCHYARD_* prefix, highest priority)
    pub fn load() -> Result<RuntimeConfig> {
        let config: RuntimeConfig = Self::figment("switchyard.yaml")
            .merge(Yaml::file("switchyard.local.yaml"))
            .merge(Env::prefixed("SWITCHYARD_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Ok(Self::validate(config)?)
    }

    /// Load configuration from a specific file
    ///
    /// Environment variables still override values from the file.
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<RuntimeConfig> {
        let path = path.as_ref();
        if !path.is_file() {
            anyhow::bail!("Configuration file not found: {}", path.display());
        }

        let config: RuntimeConfig = Self::figment(path)
            .merge(Env::prefixed("SWITCHYARD_").split("__"))
            .extract()
            .with_context(|| format!("Failed to load config from {}", path.display()))?;

        Ok(Self::validate(config)?)
    }

    fn figment(path: impl AsRef<std::path::Path>) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(RuntimeConfig::default()))
            .merge(Yaml::file(path.as_ref()))
    }

    /// Validate configuration after loading
    ///
    /// Returns the configuration with every adapter normalised.
    pub fn validate(config: RuntimeConfig) -> Result<RuntimeConfig, ConfigError> {
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let mut seen = HashSet::new();
        for adapter in &config.adapters {
            if !seen.insert(adapter.name.as_str()) {
                return Err(ConfigError::DuplicateAdapterName(adapter.name.clone()));
            }
        }

        let RuntimeConfig { logging, adapters } = config;
        let adapters = adapters
            .into_iter()
            .map(|adapter| {
                let name = adapter.name.clone();
                adapter
                    .validated()
                    .map_err(|source| ConfigError::InvalidAdapter { name, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(RuntimeConfig { logging, adapters })
    }
}
