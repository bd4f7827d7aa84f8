//! Advisory report generation

use crate::advisor::MarketSnapshot;
use crate::config::AdvisorConfig;
use crate::error::{Result, StockError};
use crate::prompts::{EXPECTED_SECTIONS, SYSTEM_INSTRUCTION, analysis_prompt};
use crate::ticker::Ticker;
use advisor_llm::{CompletionRequest, LLMProvider, Message, TokenUsage};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Model commentary for one ticker and latest-close snapshot.
///
/// The text is displayed as-is; its structure is requested by the system
/// instruction but never enforced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisoryReport {
    pub ticker: Ticker,
    pub latest_close: f64,
    pub text: String,
    pub model: String,
    pub usage: TokenUsage,
    pub generated_at: DateTime<Utc>,
}

impl AdvisoryReport {
    /// Expected section headers absent from the text
    pub fn missing_sections(&self) -> Vec<&'static str> {
        EXPECTED_SECTIONS
            .into_iter()
            .filter(|header| !self.text.contains(header))
            .collect()
    }

    /// Heading shown above the report
    pub fn title(&self) -> String {
        format!("AI 深度分析 - {}", self.ticker)
    }
}

/// Sends one prompt per snapshot to the language model
pub struct ReportGenerator {
    provider: Arc<dyn LLMProvider>,
    model: String,
    system: String,
    max_tokens: usize,
    temperature: Option<f32>,
    web_search: bool,
}

impl ReportGenerator {
    /// Create a generator with the default system instruction
    pub fn new(provider: Arc<dyn LLMProvider>, config: &AdvisorConfig) -> Self {
        Self {
            provider,
            model: config.model.clone(),
            system: SYSTEM_INSTRUCTION.to_string(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            web_search: config.web_search,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Build the completion request for a snapshot
    pub fn request_for(&self, ticker: &Ticker, latest_close: f64) -> Result<CompletionRequest> {
        let prompt = analysis_prompt(ticker, latest_close)?;

        let mut builder = CompletionRequest::builder(&self.model)
            .system(&self.system)
            .add_message(Message::user(prompt))
            .max_tokens(self.max_tokens)
            .web_search(self.web_search);
        if let Some(t) = self.temperature {
            builder = builder.temperature(t);
        }

        Ok(builder.build())
    }

    /// Ask the model for a report; exactly one provider call
    #[instrument(skip(self, snapshot), fields(ticker = %snapshot.ticker, model = %self.model))]
    pub async fn generate(&self, snapshot: &MarketSnapshot) -> Result<AdvisoryReport> {
        let latest_close = snapshot.latest_close();
        let request = self.request_for(&snapshot.ticker, latest_close)?;

        let response = self.provider.complete(request).await?;
        let text = response
            .message
            .text()
            .ok_or_else(|| {
                StockError::LlmError(advisor_llm::LLMError::UnexpectedResponse(
                    "empty report text".to_string(),
                ))
            })?
            .to_string();

        debug!(
            "Report received: {} chars, {} tokens",
            text.chars().count(),
            response.usage.total()
        );

        Ok(AdvisoryReport {
            ticker: snapshot.ticker.clone(),
            latest_close,
            text,
            model: self.model.clone(),
            usage: response.usage,
            generated_at: Utc::now(),
        })
    }
}
