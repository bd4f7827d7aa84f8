//! Configuration for the advisory pipeline

use crate::error::{Result, StockError};
use crate::series::LookbackWindow;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default Gemini model
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
/// Ticker prefilled in the dashboard input
pub const DEFAULT_TICKER: &str = "0050.TW";

/// Configuration for the advisory pipeline
///
/// Every field has a default, so a TOML file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisorConfig {
    /// Model identifier passed to the provider
    pub model: String,

    /// History window for the chart and statistics
    pub lookback: LookbackWindow,

    /// Ticker shown in the input box on start
    pub default_ticker: String,

    /// Output token ceiling for the report
    pub max_tokens: usize,

    /// Sampling temperature; provider default when unset
    pub temperature: Option<f32>,

    /// Allow the model to look up comparison prices on the web
    pub web_search: bool,

    /// Model request timeout, in seconds
    pub request_timeout_secs: u64,

    /// Alternative API base URL
    pub api_base: Option<String>,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            lookback: LookbackWindow::OneYear,
            default_ticker: DEFAULT_TICKER.to_string(),
            max_tokens: 8192,
            temperature: None,
            web_search: true,
            request_timeout_secs: 120,
            api_base: None,
        }
    }
}

impl AdvisorConfig {
    /// Create a new configuration builder
    pub fn builder() -> AdvisorConfigBuilder {
        AdvisorConfigBuilder::default()
    }

    /// Load from a TOML file, falling back to defaults if it does not exist
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let config: Self = advisor_utils::load_toml_or_default(path)
            .map_err(|e| StockError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Request timeout as a duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(StockError::ConfigError("model must not be empty".to_string()));
        }

        if self.max_tokens == 0 {
            return Err(StockError::ConfigError(
                "max_tokens must be greater than 0".to_string(),
            ));
        }

        if let Some(t) = self.temperature {
            if !(0.0..=2.0).contains(&t) {
                return Err(StockError::ConfigError(format!(
                    "temperature must be within 0.0..=2.0, got {t}"
                )));
            }
        }

        if self.request_timeout_secs == 0 {
            return Err(StockError::ConfigError(
                "request_timeout_secs must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for AdvisorConfig
///
/// Starts from an existing configuration (defaults unless given one), so
/// command-line flags can be layered over a config file.
#[derive(Debug, Default)]
pub struct AdvisorConfigBuilder {
    base: AdvisorConfig,
}

impl AdvisorConfigBuilder {
    /// Start from an already loaded configuration
    pub fn from_config(base: AdvisorConfig) -> Self {
        Self { base }
    }

    /// Set the model
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.base.model = model.into();
        self
    }

    /// Read the model from `GEMINI_MODEL` if set
    pub fn with_env_model(mut self) -> Self {
        if let Ok(model) = std::env::var("GEMINI_MODEL") {
            if !model.trim().is_empty() {
                self.base.model = model;
            }
        }
        self
    }

    /// Set the history window
    pub fn lookback(mut self, lookback: LookbackWindow) -> Self {
        self.base.lookback = lookback;
        self
    }

    /// Set the ticker prefilled in the dashboard
    pub fn default_ticker(mut self, ticker: impl Into<String>) -> Self {
        self.base.default_ticker = ticker.into();
        self
    }

    /// Set the output token ceiling
    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.base.max_tokens = max_tokens;
        self
    }

    /// Set the sampling temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.base.temperature = Some(temperature);
        self
    }

    /// Enable or disable web search grounding
    pub fn web_search(mut self, enabled: bool) -> Self {
        self.base.web_search = enabled;
        self
    }

    /// Set the model request timeout
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.base.request_timeout_secs = timeout.as_secs();
        self
    }

    /// Set an alternative API base URL
    pub fn api_base(mut self, api_base: impl Into<String>) -> Self {
        self.base.api_base = Some(api_base.into());
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<AdvisorConfig> {
        self.base.validate()?;
        Ok(self.base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AdvisorConfig::default();
        assert_eq!(config.model, "gemini-2.5-flash");
        assert_eq!(config.lookback, LookbackWindow::OneYear);
        assert_eq!(config.default_ticker, "0050.TW");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = AdvisorConfig::builder()
            .model("gemini-2.5-pro")
            .lookback(LookbackWindow::SixMonths)
            .request_timeout(Duration::from_secs(30))
            .web_search(false)
            .build()
            .unwrap();

        assert_eq!(config.model, "gemini-2.5-pro");
        assert_eq!(config.lookback, LookbackWindow::SixMonths);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert!(!config.web_search);
    }

    #[test]
    fn test_builder_layers_over_base() {
        let base = AdvisorConfig {
            max_tokens: 2048,
            ..Default::default()
        };
        let config = AdvisorConfigBuilder::from_config(base)
            .lookback(LookbackWindow::TwoYears)
            .build()
            .unwrap();
        assert_eq!(config.max_tokens, 2048);
        assert_eq!(config.lookback, LookbackWindow::TwoYears);
    }

    #[test]
    fn test_validation() {
        assert!(AdvisorConfig::builder().model(" ").build().is_err());
        assert!(AdvisorConfig::builder().max_tokens(0).build().is_err());
        assert!(AdvisorConfig::builder().temperature(3.5).build().is_err());
        assert!(
            AdvisorConfig::builder()
                .request_timeout(Duration::from_millis(10))
                .build()
                .is_err()
        );
    }

    #[test]
    fn test_partial_toml() {
        let config: AdvisorConfig = toml_from_str("lookback = \"6mo\"\nweb_search = false");
        assert_eq!(config.lookback, LookbackWindow::SixMonths);
        assert!(!config.web_search);
        assert_eq!(config.model, DEFAULT_MODEL);
    }

    #[test]
    fn test_invalid_toml_value_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_tokens = 0").unwrap();

        let err = AdvisorConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, StockError::ConfigError(_)));
    }

    #[test]
    fn test_env_model_yields_to_explicit_model() {
        let config = AdvisorConfig::builder()
            .with_env_model()
            .model("gemini-2.5-pro")
            .default_ticker("2330.TW")
            .build()
            .unwrap();
        assert_eq!(config.model, "gemini-2.5-pro");
        assert_eq!(config.default_ticker, "2330.TW");
    }

    fn toml_from_str(s: &str) -> AdvisorConfig {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{s}").unwrap();
        AdvisorConfig::load(file.path()).unwrap()
    }
}
