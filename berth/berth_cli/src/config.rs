//! Configuration for the berth CLI
//!
//! Loads pool sizing, echo server and exercise settings from a TOML file.
//! Every section and field is optional and falls back to a default.

use std::fs;
use std::path::Path;

use berth_pool::PoolConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur in configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("Failed to load configuration: {0}")]
    LoadFailed(String),

    /// The configuration file is not valid TOML for this schema
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    /// The configuration parsed but describes an unusable setup
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// The configuration could not be rendered
    #[error("Failed to serialize configuration: {0}")]
    SerializeFailed(String),
}

/// Echo server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the echo server listens on and clients dial
    #[serde(default = "default_addr")]
    pub addr: String,
}

fn default_addr() -> String {
    "127.0.0.1:8003".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_addr(),
        }
    }
}

/// Load settings for an exercise run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseConfig {
    /// Number of concurrent worker threads
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// PING/PONG exchanges per worker
    #[serde(default = "default_rounds")]
    pub rounds: usize,

    /// Read timeout on pooled connections (milliseconds)
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
}

fn default_workers() -> usize {
    4
}

fn default_rounds() -> usize {
    100
}

fn default_read_timeout_ms() -> u64 {
    5000
}

impl Default for ExerciseConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            rounds: default_rounds(),
            read_timeout_ms: default_read_timeout_ms(),
        }
    }
}

/// Top-level CLI configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BerthConfig {
    /// Pool sizing
    #[serde(default)]
    pub pool: PoolConfig,

    /// Echo server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Exercise run settings
    #[serde(default)]
    pub exercise: ExerciseConfig,
}

impl BerthConfig {
    /// Load and validate configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::LoadFailed(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the settings can drive a pool
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.pool
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        if self.exercise.workers == 0 {
            return Err(ConfigError::Invalid(
                "exercise needs at least one worker".to_string(),
            ));
        }

        if self.server.addr.is_empty() {
            return Err(ConfigError::Invalid("server address is empty".to_string()));
        }

        Ok(())
    }

    /// Render the configuration as TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::SerializeFailed(e.to_string()))
    }
}
