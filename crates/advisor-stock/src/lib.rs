//! Taiwan stock advisory pipeline
//!
//! This crate turns a free-text ticker into a price history, summary
//! statistics, a line chart and a model-written advisory report:
//!
//! - Ticker normalisation for the Taiwan listed (`.TW`) and OTC (`.TWO`) markets
//! - Daily close history from Yahoo Finance
//! - Max / min / mean statistics rounded to two decimals
//! - A ratatui line chart usable in a full-screen dashboard or as plain text
//! - A fixed persona prompt sent to a hosted language model
//!
//! # Architecture
//!
//! [`Advisor`] owns a [`MarketDataSource`] and a [`ReportGenerator`].
//! [`run_analysis`] drives one request through the pipeline and reports
//! every stage to a [`Presenter`]; nothing is kept between requests.
//!
//! # Example
//!
//! ```rust,ignore
//! use advisor_stock::{Advisor, AdvisorConfig, TextPresenter, run_analysis};
//! use advisor_utils::{GEMINI_API_KEY, SecretStore};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = AdvisorConfig::default();
//!     let secrets = SecretStore::load(None, &[GEMINI_API_KEY])?;
//!     let advisor = Advisor::from_config(&config, &secrets)?;
//!
//!     let mut presenter = TextPresenter::new(std::io::stdout());
//!     let _ = run_analysis(&advisor, &mut presenter, "2330").await;
//!     Ok(())
//! }
//! ```

pub mod advisor;
pub mod api;
pub mod chart;
pub mod config;
pub mod display;
pub mod error;
pub mod prompts;
pub mod report;
pub mod series;
pub mod stats;
pub mod ticker;

// Re-export main types for convenience
pub use advisor::{Advisor, Analysis, MarketSnapshot, run_analysis};
pub use api::{MarketDataSource, YahooFinanceClient};
pub use chart::PriceChart;
pub use config::AdvisorConfig;
pub use display::{Presenter, TextPresenter};
pub use error::{AnalysisError, ErrorKind, Result, Stage, StockError};
pub use report::{AdvisoryReport, ReportGenerator};
pub use series::{LookbackWindow, PricePoint, PriceSeries};
pub use stats::{Metric, SummaryStats};
pub use ticker::{Market, Ticker};
