//! Secret lookup from the environment and a TOML secrets file

use crate::config::{ConfigError, Result, load_toml};
use std::collections::HashMap;
use std::path::Path;

/// Name of the Gemini API credential
pub const GEMINI_API_KEY: &str = "GEMINI_API_KEY";

/// Default secrets file, looked up in the working directory
pub const DEFAULT_SECRETS_FILE: &str = "secrets.toml";

/// Read-only bag of secret values.
///
/// Values are captured once at startup. Environment variables win over the
/// secrets file.
#[derive(Default, Clone)]
pub struct SecretStore {
    values: HashMap<String, String>,
}

impl std::fmt::Debug for SecretStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<_> = self.values.keys().collect();
        keys.sort();
        f.debug_struct("SecretStore").field("keys", &keys).finish()
    }
}

impl SecretStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Load string entries from a TOML file. Non-string values are ignored.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let table: toml::Table = load_toml(path)?;
        let values = table
            .into_iter()
            .filter_map(|(key, value)| value.as_str().map(|s| (key, s.to_string())))
            .collect();
        Ok(Self { values })
    }

    /// Build the store used at startup.
    ///
    /// An explicitly given file must exist; the default file is optional.
    /// The listed keys are then overridden from the environment.
    pub fn load(path: Option<&Path>, env_keys: &[&str]) -> Result<Self> {
        let mut store = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_SECRETS_FILE).exists() => {
                Self::from_file(DEFAULT_SECRETS_FILE)?
            }
            None => Self::new(),
        };

        for key in env_keys {
            if let Ok(value) = std::env::var(key) {
                store = store.with_value(*key, value);
            }
        }

        Ok(store)
    }

    /// Insert or replace a value
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Look up a non-empty value
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Look up a value that must be present
    pub fn require(&self, key: &str) -> Result<String> {
        self.get(key)
            .map(ToString::to_string)
            .ok_or_else(|| ConfigError::MissingSecret(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_require_missing() {
        let store = SecretStore::new();
        let err = store.require(GEMINI_API_KEY).unwrap_err();
        assert!(matches!(err, ConfigError::MissingSecret(ref k) if k == GEMINI_API_KEY));
    }

    #[test]
    fn test_blank_value_is_missing() {
        let store = SecretStore::new().with_value(GEMINI_API_KEY, "   ");
        assert!(store.get(GEMINI_API_KEY).is_none());
        assert!(store.require(GEMINI_API_KEY).is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "GEMINI_API_KEY = \"abc123\"\nTIMEOUT = 30").unwrap();

        let store = SecretStore::from_file(file.path()).unwrap();
        assert_eq!(store.require(GEMINI_API_KEY).unwrap(), "abc123");
        assert!(store.get("TIMEOUT").is_none());
    }

    #[test]
    fn test_explicit_file_must_exist() {
        let result = SecretStore::load(Some(Path::new("/nonexistent/secrets.toml")), &[]);
        assert!(matches!(result, Err(ConfigError::ReadError { .. })));
    }

    #[test]
    fn test_debug_hides_values() {
        let store = SecretStore::new().with_value(GEMINI_API_KEY, "top-secret");
        let debug = format!("{store:?}");
        assert!(debug.contains(GEMINI_API_KEY));
        assert!(!debug.contains("top-secret"));
    }
}
