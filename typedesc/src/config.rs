//! Configuration management.
//!
//! Configuration is read from a `typedesc.toml` file. Every section and key
//! is optional; missing values take their defaults.
//!
//! ```toml
//! [collector]
//! private_prefix = "_"
//! model_order = "declaration"
//!
//! [resolver]
//! builtin_types = ["int", "str", "float", "bool", "Decimal"]
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;

/// Default configuration filename.
pub const CONFIG_FILENAME: &str = "typedesc.toml";

/// Main configuration structure.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Namespace scanning.
    pub collector: CollectorConfig,

    /// Annotation resolution.
    pub resolver: ResolverConfig,
}

/// Namespace scanning configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    /// Names starting with this prefix are never collected.
    pub private_prefix: String,

    /// Order in which models are inserted after the aliases.
    pub model_order: ModelOrder,
}

/// Model insertion order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelOrder {
    /// Sorted by declared class name.
    #[default]
    Alphabetical,

    /// Namespace binding order.
    Declaration,
}

/// Annotation resolution configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Type names that resolve without being bound in the namespace.
    pub builtin_types: Vec<String>,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            private_prefix: "_".to_string(),
            model_order: ModelOrder::default(),
        }
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            builtin_types: [
                "int", "str", "float", "bool", "bytes", "complex", "object", "list", "dict", "set",
                "frozenset", "tuple", "type",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

impl ResolverConfig {
    /// Whether `name` is a builtin type name.
    pub fn is_builtin(&self, name: &str) -> bool {
        self.builtin_types.iter().any(|t| t == name)
    }
}

impl CollectorConfig {
    /// Whether a binding name is private and must be skipped.
    pub fn is_private(&self, name: &str) -> bool {
        !self.private_prefix.is_empty() && name.starts_with(&self.private_prefix)
    }
}

/// Configuration manager for loading configs.
pub struct ConfigManager;

impl ConfigManager {
    /// Load configuration from a file path.
    ///
    /// If the path is None, attempts to load from the default location.
    /// If no config file exists, returns default configuration.
    pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
        let config_path = path
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILENAME));

        if !config_path.exists() {
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&config_path).map_err(|e| ConfigError::Io {
            path: config_path.clone(),
            source: e,
        })?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::invalid_toml(Some(config_path), e.to_string()))
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Config, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::invalid_toml(None, e.to_string()))
    }
}
