//! The analysis pipeline
//!
//! One request runs normalize → fetch → stats and chart → prompt → model →
//! report. The only branch is on an empty history; any external failure ends
//! the request. Nothing survives between requests.

use crate::api::{MarketDataSource, YahooFinanceClient};
use crate::chart::PriceChart;
use crate::config::AdvisorConfig;
use crate::display::Presenter;
use crate::error::{AnalysisError, ErrorKind, Stage};
use crate::report::{AdvisoryReport, ReportGenerator};
use crate::series::{LookbackWindow, PriceSeries};
use crate::stats::SummaryStats;
use crate::ticker::Ticker;
use advisor_llm::providers::{GeminiConfig, GeminiProvider};
use advisor_utils::{GEMINI_API_KEY, SecretStore};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Price history that passed the empty-data check, with its statistics
#[derive(Debug, Clone)]
pub struct MarketSnapshot {
    pub ticker: Ticker,
    pub lookback: LookbackWindow,
    pub series: PriceSeries,
    pub stats: SummaryStats,
}

impl MarketSnapshot {
    /// `None` when the series is empty
    pub fn from_series(series: PriceSeries, lookback: LookbackWindow) -> Option<Self> {
        let stats = SummaryStats::from_series(&series)?;
        Some(Self {
            ticker: series.ticker().clone(),
            lookback,
            series,
            stats,
        })
    }

    /// Close of the most recent trading day
    pub fn latest_close(&self) -> f64 {
        self.series.latest().map_or(0.0, |p| p.close)
    }

    pub fn chart(&self) -> Option<PriceChart> {
        PriceChart::new(&self.series, self.lookback)
    }
}

/// Result of a completed analysis
#[derive(Debug, Clone)]
pub struct Analysis {
    pub snapshot: MarketSnapshot,
    pub report: AdvisoryReport,
}

/// Wires a market data source to a report generator
pub struct Advisor<S = YahooFinanceClient> {
    source: S,
    reports: ReportGenerator,
    lookback: LookbackWindow,
}

impl Advisor<YahooFinanceClient> {
    /// Build the production advisor: Yahoo Finance data and a Gemini model.
    ///
    /// Fails with [`AnalysisError::ConfigurationMissing`] when the API key is
    /// absent or the client cannot be built.
    pub fn from_config(config: &AdvisorConfig, secrets: &SecretStore) -> Result<Self, AnalysisError> {
        let api_key = secrets.require(GEMINI_API_KEY)?;

        let mut gemini = GeminiConfig::new(api_key).with_timeout(config.request_timeout_secs);
        if let Some(api_base) = &config.api_base {
            gemini = gemini.with_api_base(api_base.as_str());
        }
        let provider = GeminiProvider::with_config(gemini)
            .map_err(|e| AnalysisError::ConfigurationMissing(e.to_string()))?;

        Ok(Self::new(
            YahooFinanceClient::new(),
            ReportGenerator::new(Arc::new(provider), config),
            config.lookback,
        ))
    }
}

impl<S: MarketDataSource> Advisor<S> {
    pub fn new(source: S, reports: ReportGenerator, lookback: LookbackWindow) -> Self {
        Self {
            source,
            reports,
            lookback,
        }
    }

    pub fn lookback(&self) -> LookbackWindow {
        self.lookback
    }

    pub fn model(&self) -> &str {
        self.reports.model()
    }

    /// Normalize the input, fetch its history and compute statistics
    #[instrument(skip(self))]
    pub async fn prepare(&self, raw: &str) -> Result<MarketSnapshot, AnalysisError> {
        let ticker = Ticker::normalize(raw);
        let series = self
            .source
            .fetch_closes(&ticker, self.lookback)
            .await
            .map_err(|e| AnalysisError::transport(Stage::MarketData, e))?;

        MarketSnapshot::from_series(series, self.lookback)
            .ok_or(AnalysisError::DataUnavailable { ticker })
    }

    /// Ask the model for a report on a snapshot
    pub async fn advise(&self, snapshot: &MarketSnapshot) -> Result<AdvisoryReport, AnalysisError> {
        let report = self
            .reports
            .generate(snapshot)
            .await
            .map_err(|e| AnalysisError::transport(Stage::Model, e))?;

        let missing = report.missing_sections();
        if !missing.is_empty() {
            warn!("Report for {} lacks sections: {}", report.ticker, missing.join(" "));
        }

        Ok(report)
    }

    /// Run both stages without presenting anything
    pub async fn analyze(&self, raw: &str) -> Result<Analysis, AnalysisError> {
        let snapshot = self.prepare(raw).await?;
        let report = self.advise(&snapshot).await?;
        Ok(Analysis { snapshot, report })
    }
}

/// Run one analysis request and present each stage as it completes.
///
/// An empty history produces exactly one warning; any other failure exactly
/// one error. Nothing after the failing stage is presented.
pub async fn run_analysis<S: MarketDataSource>(
    advisor: &Advisor<S>,
    presenter: &mut dyn Presenter,
    raw: &str,
) -> Result<Analysis, AnalysisError> {
    let result = present_stages(advisor, presenter, raw).await;

    match &result {
        Ok(analysis) => info!("Analysis of {} complete", analysis.snapshot.ticker),
        Err(err) if err.kind() == ErrorKind::DataUnavailable => {
            info!("{err}");
            presenter.warning(&err.user_message());
        }
        Err(err) => {
            warn!("Analysis failed: {err}");
            presenter.error(&err.user_message());
        }
    }

    result
}

async fn present_stages<S: MarketDataSource>(
    advisor: &Advisor<S>,
    presenter: &mut dyn Presenter,
    raw: &str,
) -> Result<Analysis, AnalysisError> {
    presenter.progress(&format!("正在取得 {} 的歷史股價...", Ticker::normalize(raw)));
    let snapshot = advisor.prepare(raw).await?;

    presenter.metrics(&snapshot);
    if let Some(chart) = snapshot.chart() {
        presenter.chart(&chart);
    }

    presenter.progress(&format!("AI 顧問正在分析 {} 並尋找競爭標的...", snapshot.ticker));
    let report = advisor.advise(&snapshot).await?;
    presenter.report(&report);

    Ok(Analysis { snapshot, report })
}
