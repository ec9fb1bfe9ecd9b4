//! # Strata Kernel Configuration
//!
//! [`KernelConfig`] tunes kernel behaviour that the resolution algorithm
//! leaves open. It is read from JSON, TOML (`toml-config` feature) or YAML
//! (`yaml-config` feature) files; the format is picked from the extension.
//!
//! ```json
//! { "root_invoke": "reject", "trace_resolution": true }
//! ```
pub mod error;

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

pub use error::ConfigError;

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// JSON format (.json)
    Json,
    /// YAML format (.yaml, .yml) - requires "yaml-config" feature
    #[cfg(feature = "yaml-config")]
    Yaml,
    /// TOML format (.toml) - requires "toml-config" feature
    #[cfg(feature = "toml-config")]
    Toml,
}

impl ConfigFormat {
    /// Get the file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ConfigFormat::Json => "json",
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => "yaml",
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => "toml",
        }
    }

    /// Determine format from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| match ext.to_lowercase().as_str() {
                "json" => Some(ConfigFormat::Json),
                #[cfg(feature = "yaml-config")]
                "yaml" | "yml" => Some(ConfigFormat::Yaml),
                #[cfg(feature = "toml-config")]
                "toml" => Some(ConfigFormat::Toml),
                _ => None,
            })
    }
}

/// What happens when an invoke-scoped key is resolved on a root kernel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RootInvokePolicy {
    /// Build a new, uncached instance per resolution and log a warning once
    /// per key.
    #[default]
    Degrade,
    /// Fail with `Error::RootInvokeRejected`.
    Reject,
}

impl RootInvokePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            RootInvokePolicy::Degrade => "degrade",
            RootInvokePolicy::Reject => "reject",
        }
    }
}

/// Kernel-wide settings, shared by a root and all of its forks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    pub root_invoke: RootInvokePolicy,
    /// Log every resolution at debug level.
    pub trace_resolution: bool,
}

impl KernelConfig {
    /// Strict configuration: invoke scope requires a forked kernel.
    pub fn strict() -> Self {
        Self {
            root_invoke: RootInvokePolicy::Reject,
            ..Self::default()
        }
    }

    /// Read a configuration file, picking the format from its extension.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let format = ConfigFormat::from_path(path).ok_or_else(|| ConfigError::UnsupportedFormat {
            path: path.to_path_buf(),
        })?;
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&content, format)?;
        log::info!("Loaded kernel configuration from {}", path.display());
        Ok(config)
    }

    /// Parse configuration text in the given format.
    pub fn parse(content: &str, format: ConfigFormat) -> Result<Self, ConfigError> {
        let parsed: Result<Self, String> = match format {
            ConfigFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => toml::from_str(content).map_err(|e| e.to_string()),
        };
        parsed.map_err(|message| ConfigError::Deserialize {
            format: format.extension(),
            message,
        })
    }

    /// Serialize to string based on format
    pub fn serialize(&self, format: ConfigFormat) -> Result<String, ConfigError> {
        let serialized: Result<String, String> = match format {
            ConfigFormat::Json => serde_json::to_string_pretty(self).map_err(|e| e.to_string()),
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => serde_yaml::to_string(self).map_err(|e| e.to_string()),
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => toml::to_string_pretty(self).map_err(|e| e.to_string()),
        };
        serialized.map_err(|message| ConfigError::Serialize {
            format: format.extension(),
            message,
        })
    }
}
