//! Error types for stock analysis operations

use crate::ticker::Ticker;
use std::fmt;
use thiserror::Error;

/// Errors raised by the individual pipeline components
#[derive(Debug, Error)]
pub enum StockError {
    /// Yahoo Finance API error
    #[error("Yahoo Finance error: {0}")]
    YahooFinanceError(String),

    /// Language model call failed
    #[error("LLM error: {0}")]
    LlmError(#[from] advisor_llm::LLMError),

    /// Prompt template could not be rendered
    #[error("Prompt error: {0}")]
    PromptError(String),

    /// Invalid lookback range
    #[error("Invalid range: {0}")]
    InvalidRange(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type alias for stock operations
pub type Result<T> = std::result::Result<T, StockError>;

/// Pipeline stage that talks to an external service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Price history download
    MarketData,
    /// Advisory report generation
    Model,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MarketData => f.write_str("market data"),
            Self::Model => f.write_str("model"),
        }
    }
}

/// Coarse failure category of one analysis request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Startup configuration or secret is missing
    ConfigurationMissing,
    /// The ticker produced no price history
    DataUnavailable,
    /// An external call failed
    Transport,
}

/// Failure of one analysis request
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Required configuration or secret is missing or invalid
    #[error("Configuration missing: {0}")]
    ConfigurationMissing(String),

    /// The provider returned no history for the ticker
    #[error("No price history available for {ticker}")]
    DataUnavailable { ticker: Ticker },

    /// An external service call failed
    #[error("{stage} request failed: {message}")]
    Transport { stage: Stage, message: String },
}

impl AnalysisError {
    /// Wrap a component error raised during `stage`
    pub fn transport(stage: Stage, err: impl fmt::Display) -> Self {
        Self::Transport {
            stage,
            message: err.to_string(),
        }
    }

    /// Failure category, for callers that branch on it
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ConfigurationMissing(_) => ErrorKind::ConfigurationMissing,
            Self::DataUnavailable { .. } => ErrorKind::DataUnavailable,
            Self::Transport { .. } => ErrorKind::Transport,
        }
    }

    /// Text shown to the dashboard user
    pub fn user_message(&self) -> String {
        match self {
            Self::ConfigurationMissing(detail) => {
                format!("❌ 錯誤：找不到 Gemini API 密鑰或設定無效。{detail}")
            }
            Self::DataUnavailable { ticker } => {
                format!("⚠️ 無法取得 {ticker} 的歷史股價，可能代號有誤或資料不完整。")
            }
            Self::Transport { .. } => {
                format!("分析時發生錯誤：請檢查代號是否正確。詳細錯誤: {self}")
            }
        }
    }
}

impl From<advisor_utils::ConfigError> for AnalysisError {
    fn from(err: advisor_utils::ConfigError) -> Self {
        Self::ConfigurationMissing(err.to_string())
    }
}
