//! YAML configuration file support for checkpool.
//!
//! Deployments can describe the pool and the serving surface in a single
//! YAML file and load it at startup.
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! # Checkpool configuration
//! version: "1.0"
//! name: "editorial"
//!
//! pool:
//!   max_current_jobs: 8
//!   max_queued_jobs: 200
//!   strategy: "block_level"
//!   check_timeout_ms: 5000
//!
//! server:
//!   bind_addr: "0.0.0.0"
//!   port: 8080
//!   timeout_secs: 30
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use pool::{CheckStrategy, PoolConfig};

/// Errors that can occur when loading YAML configuration files
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

/// Top-level YAML configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CheckpoolConfig {
    /// Configuration format version
    pub version: String,

    /// Optional configuration name/description
    #[serde(default)]
    pub name: Option<String>,

    /// Matcher pool configuration
    #[serde(default)]
    pub pool: PoolYamlConfig,

    /// Serving surface configuration
    #[serde(default)]
    pub server: ServerYamlConfig,
}

impl CheckpoolConfig {
    /// Load a YAML configuration file from the given path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: CheckpoolConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        self.pool.validate()?;
        self.server.validate()?;
        Ok(())
    }
}

impl Default for CheckpoolConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            name: None,
            pool: PoolYamlConfig::default(),
            server: ServerYamlConfig::default(),
        }
    }
}

/// Pool section of the YAML configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolYamlConfig {
    #[serde(default = "default_max_current_jobs")]
    pub max_current_jobs: usize,

    #[serde(default = "default_max_queued_jobs")]
    pub max_queued_jobs: usize,

    /// Planning strategy: "document_per_category" or "block_level"
    #[serde(default = "default_strategy")]
    pub strategy: String,

    #[serde(default = "default_check_timeout_ms")]
    pub check_timeout_ms: u64,
}

impl PoolYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.max_current_jobs == 0 {
            return Err(ConfigLoadError::Validation(
                "pool.max_current_jobs must be >= 1".to_string(),
            ));
        }
        if self.max_queued_jobs == 0 {
            return Err(ConfigLoadError::Validation(
                "pool.max_queued_jobs must be >= 1".to_string(),
            ));
        }
        if self.check_timeout_ms == 0 {
            return Err(ConfigLoadError::Validation(
                "pool.check_timeout_ms must be >= 1".to_string(),
            ));
        }
        self.parse_strategy()?;
        Ok(())
    }

    fn parse_strategy(&self) -> Result<CheckStrategy, ConfigLoadError> {
        match self.strategy.as_str() {
            "document_per_category" => Ok(CheckStrategy::DocumentPerCategory),
            "block_level" => Ok(CheckStrategy::BlockLevel),
            other => Err(ConfigLoadError::Validation(format!(
                "pool.strategy must be one of: document_per_category, block_level (got {other:?})"
            ))),
        }
    }

    /// Convert into the engine's pool configuration.
    pub fn to_pool_config(&self) -> Result<PoolConfig, ConfigLoadError> {
        Ok(PoolConfig {
            max_current_jobs: self.max_current_jobs,
            max_queued_jobs: self.max_queued_jobs,
            strategy: self.parse_strategy()?,
            check_timeout_ms: self.check_timeout_ms,
        })
    }
}

impl Default for PoolYamlConfig {
    fn default() -> Self {
        Self {
            max_current_jobs: default_max_current_jobs(),
            max_queued_jobs: default_max_queued_jobs(),
            strategy: default_strategy(),
            check_timeout_ms: default_check_timeout_ms(),
        }
    }
}

/// Server section of the YAML configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerYamlConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ServerYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.timeout_secs == 0 {
            return Err(ConfigLoadError::Validation(
                "server.timeout_secs must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ServerYamlConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            port: default_port(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

// Helper functions for serde defaults
fn default_max_current_jobs() -> usize {
    4
}
fn default_max_queued_jobs() -> usize {
    100
}
fn default_strategy() -> String {
    "document_per_category".to_string()
}
fn default_check_timeout_ms() -> u64 {
    10_000
}
fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_timeout_secs() -> u64 {
    30
}
