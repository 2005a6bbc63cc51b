//! Configuration file parsing for the server.
//!
//! Loads bind address, storage location, limits and the provider chain from
//! TOML. The shared password comes from `APP_PASSWORD` when it is set, which
//! takes precedence over the file.

use neuroverse_llm::LlmConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Environment variable holding the shared password
pub const PASSWORD_ENV: &str = "APP_PASSWORD";

/// Server configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Missing required field
    #[error("Missing required configuration field: {0}")]
    MissingField(String),

    /// Field present but unusable
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Server configuration loaded from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1")
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Bind port (e.g., 3000)
    #[serde(default = "default_bind_port")]
    pub bind_port: u16,

    /// Shared password checked by the `auth` cookie
    #[serde(default)]
    pub app_password: String,

    /// SQLite database file (":memory:" for a throwaway store)
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Wall-clock ceiling for model work per request (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Conversation turns forwarded to the model
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Longest brain dump accepted (characters)
    #[serde(default = "default_max_dump_length")]
    pub max_dump_length: usize,

    /// Provider chain
    #[serde(default)]
    pub llm: LlmConfig,
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_bind_port() -> u16 {
    3000
}

fn default_database_path() -> String {
    "neuroverse.db".to_string()
}

/// Default request ceiling: 60 seconds
fn default_request_timeout() -> u64 {
    60
}

fn default_history_limit() -> usize {
    20
}

fn default_max_dump_length() -> usize {
    20_000
}

impl ServerConfig {
    /// Load configuration from a TOML file, then apply environment overrides
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&contents)?;
        config.with_env_overrides(|name| std::env::var(name).ok())
    }

    /// Parse configuration from a TOML string without touching the environment
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: ServerConfig = toml::from_str(toml_str)?;
        config.llm.validate().map_err(ConfigError::Invalid)?;
        Ok(config)
    }

    /// Apply environment overrides and check required fields
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(password) = lookup(PASSWORD_ENV).filter(|p| !p.is_empty()) {
            self.app_password = password;
        }
        self.validate()?;
        Ok(self)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.app_password.is_empty() {
            return Err(ConfigError::MissingField(format!(
                "app_password (or {})",
                PASSWORD_ENV
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.history_limit == 0 {
            return Err(ConfigError::Invalid(
                "history_limit must be greater than 0".to_string(),
            ));
        }
        if self.max_dump_length == 0 {
            return Err(ConfigError::Invalid(
                "max_dump_length must be greater than 0".to_string(),
            ));
        }
        self.llm.validate().map_err(ConfigError::Invalid)
    }

    /// Create a default configuration for testing
    pub fn default_test_config() -> Self {
        ServerConfig {
            bind_address: default_bind_address(),
            bind_port: default_bind_port(),
            app_password: "test-password".to_string(),
            database_path: ":memory:".to_string(),
            request_timeout_secs: default_request_timeout(),
            history_limit: default_history_limit(),
            max_dump_length: default_max_dump_length(),
            llm: LlmConfig::default(),
        }
    }

    /// Get the full bind address (address:port)
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.bind_port)
    }

    /// Request ceiling as a Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
