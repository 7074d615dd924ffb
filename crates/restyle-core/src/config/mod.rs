//! Configuration management for restyle.
//!
//! Configuration is loaded from a TOML file with defaults for every value.
//! Backend credentials are written as `${ENV_VAR}` references and resolved
//! once, when [`crate::service::ServiceSettings`] are built for the run.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Input/output locations
    pub general: GeneralConfig,

    /// Logging settings
    pub logging: LoggingConfig,

    /// Backend endpoints, models and credentials
    pub backends: BackendsConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// - macOS: ~/Library/Application Support/com.restyle.restyle/config.toml
    /// - Linux: ~/.config/restyle/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\restyle\config\config.toml
    ///
    /// Falls back to ~/.restyle/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "restyle", "restyle")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".restyle").join("config.toml")
            })
    }

    /// Resolved input directory (with ~ expansion).
    pub fn input_dir(&self) -> PathBuf {
        expand(&self.general.input_dir)
    }

    /// Resolved prompt file path (with ~ expansion).
    pub fn prompts_file(&self) -> PathBuf {
        expand(&self.general.prompts_file)
    }

    /// Resolved output directory (with ~ expansion).
    pub fn output_dir(&self) -> PathBuf {
        expand(&self.general.output_dir)
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

fn expand(path: &Path) -> PathBuf {
    let path_str = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(&path_str).into_owned())
}
