//! Configuration file loading

use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors raised while loading configuration or secrets
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read
    #[error("Failed to read config file {path}: {source}")]
    ReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML for the expected shape
    #[error("Failed to parse config file {path}: {source}")]
    ParseError {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    /// A required secret is absent from every source
    #[error("Missing secret {0}: set it in the environment or in the secrets file")]
    MissingSecret(String),
}

/// Load and deserialize a TOML file.
pub fn load_toml<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
        path: path.display().to_string(),
        source,
    })?;

    toml::from_str(&content).map_err(|source| ConfigError::ParseError {
        path: path.display().to_string(),
        source,
    })
}

/// Load a TOML file if it exists, falling back to `T::default()` when it
/// does not. Parse errors are still reported.
pub fn load_toml_or_default<T: DeserializeOwned + Default>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    if path.exists() {
        load_toml(path)
    } else {
        tracing::debug!("Config file {} not found, using defaults", path.display());
        Ok(T::default())
    }
}
