//! Config struct and loading logic.
//!
//! Priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables
//! 3. `.confdiff.toml` in the working directory
//! 4. `~/.config/confdiff/config.toml` (global defaults)
//! 5. Built-in defaults

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::constants::{DEFAULT_ENV_NAME, DEFAULT_SOURCE_DIR};
use crate::env::Env;

/// Errors during config loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ParseFile {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub dump: DumpConfig,
    pub scan: ScanConfig,
    pub render: RenderConfig,
}

/// Settings for the `dump` command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DumpConfig {
    /// Directory holding the configuration sources.
    pub config_dir: PathBuf,
    /// Directory for dumps written under their default name.
    pub output_dir: PathBuf,
    /// Environment identifier embedded in default dump names.
    pub env_name: String,
}

impl Default for DumpConfig {
    fn default() -> Self {
        Self {
            config_dir: PathBuf::from(DEFAULT_SOURCE_DIR),
            output_dir: PathBuf::from("."),
            env_name: DEFAULT_ENV_NAME.to_string(),
        }
    }
}

/// Variable scanner settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// File extensions (without the dot) that are scanned.
    pub extensions: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["toml".to_string()],
        }
    }
}

/// Report rendering settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub color: bool,
}

impl Config {
    /// Load configuration with proper layering.
    ///
    /// Reads from global config, the local config in `root`, then applies
    /// environment variable overrides.
    pub fn load(root: Option<&Path>, env: &Env) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                let global = Self::load_file(&global_path)?;
                config.merge(global);
            }
        }

        if let Some(root) = root {
            let local_path = root.join(crate::constants::CONFIG_FILENAME);
            if local_path.exists() {
                let local = Self::load_file(&local_path)?;
                config.merge(local);
            }
        }

        config.apply_env_vars(env);

        tracing::debug!(?config, "configuration loaded");
        Ok(config)
    }

    /// Load a config from a specific file.
    fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::ParseFile {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the global config file path.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(crate::constants::CONFIG_DIR).join("config.toml"))
    }

    /// Merge another config into this one. Only values that differ from
    /// the defaults override.
    fn merge(&mut self, other: Config) {
        let default_dump = DumpConfig::default();
        if other.dump.config_dir != default_dump.config_dir {
            self.dump.config_dir = other.dump.config_dir;
        }
        if other.dump.output_dir != default_dump.output_dir {
            self.dump.output_dir = other.dump.output_dir;
        }
        if other.dump.env_name != default_dump.env_name {
            self.dump.env_name = other.dump.env_name;
        }

        if other.scan.extensions != ScanConfig::default().extensions {
            self.scan.extensions = other.scan.extensions;
        }

        if other.render.color {
            self.render.color = true;
        }
    }

    /// Apply environment variable overrides.
    fn apply_env_vars(&mut self, env: &Env) {
        if let Ok(val) = env.var(crate::constants::ENV_NAME) {
            if !val.is_empty() {
                self.dump.env_name = val;
            }
        }
        if let Ok(val) = env.var(crate::constants::ENV_CONFIG_DIR) {
            if !val.is_empty() {
                self.dump.config_dir = PathBuf::from(val);
            }
        }
        if let Ok(val) = env.var(crate::constants::ENV_COLOR) {
            match val.to_lowercase().as_str() {
                "false" | "0" | "no" | "off" => self.render.color = false,
                "true" | "1" | "yes" | "on" => self.render.color = true,
                _ => tracing::warn!(
                    "ignoring invalid {} value: {val}",
                    crate::constants::ENV_COLOR
                ),
            }
        }
    }
}
