use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::types::Config;
use crate::provider::registry;

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

impl Config {
    /// Directory owned by the tool.
    ///
    /// Uses `~/.config/claude-switch` on Unix, or the equivalent on other
    /// platforms via `dirs::config_dir()`. Falls back to the current
    /// directory if config_dir is unavailable.
    pub fn config_dir() -> PathBuf {
        let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        config_dir.join("claude-switch")
    }

    /// Returns the path to the configuration file.
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Loads configuration from the default config file.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Loads configuration from an explicit path.
    ///
    /// - If the file doesn't exist, returns `Config::default()`.
    /// - If the file exists, parses it as TOML and validates.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// Checks:
    /// - The launch command is not empty
    /// - The API timeout is positive
    /// - Every provider override names a known provider
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.defaults.command.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                message: "defaults.command must not be empty".to_string(),
            });
        }

        if self.defaults.api_timeout_ms == 0 {
            return Err(ConfigError::ValidationError {
                message: "defaults.api_timeout_ms must be greater than zero".to_string(),
            });
        }

        if let Some(unknown) = self.providers.keys().find(|id| registry::find(id).is_none()) {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "Override for unknown provider '{}' (known: {})",
                    unknown,
                    registry::known_ids().join(", ")
                ),
            });
        }

        Ok(())
    }

    /// Directory where provider settings files live.
    pub fn settings_dir(&self) -> PathBuf {
        self.defaults
            .settings_dir
            .clone()
            .unwrap_or_else(Self::config_dir)
    }
}
