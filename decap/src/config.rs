//! # Config
//!
//! Decoding configuration, loaded from an optional YAML file. Command line
//! flags can override individual knobs after loading.

use std::{fs::read_to_string, path::Path};

use serde::Deserialize;

#[derive(thiserror::Error, Debug)]
pub(crate) enum ConfigError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Top-level decoding configuration.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct DecodeConfig {
    /// ESP codec knobs.
    pub(crate) esp: EspConfig,
}

impl DecodeConfig {
    /// Load a configuration from a path.
    pub(crate) fn from_file(path: &Path) -> Result<DecodeConfig, ConfigError> {
        let contents = read_to_string(path)?;
        DecodeConfig::from_str(contents.as_str())
    }

    /// Load a configuration from a string.
    pub(crate) fn from_str(contents: &str) -> Result<DecodeConfig, ConfigError> {
        Ok(serde_yaml::from_str(contents)?)
    }
}

/// ESP codec configuration.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct EspConfig {
    /// Administrative switch. When unset the ESP codec leaves packets alone
    /// and reports no ESP section at all.
    pub(crate) decoding: bool,
    /// Attach the opaque payload bytes to emitted ESP sections.
    pub(crate) capture_payload: bool,
}

impl Default for EspConfig {
    fn default() -> Self {
        Self {
            decoding: true,
            capture_payload: false,
        }
    }
}
