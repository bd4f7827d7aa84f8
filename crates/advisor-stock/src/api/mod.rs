//! Market data sources

mod yahoo;

pub use yahoo::YahooFinanceClient;

use crate::error::Result;
use crate::series::{LookbackWindow, PriceSeries};
use crate::ticker::Ticker;
use async_trait::async_trait;

/// Source of daily closing prices
///
/// An unknown ticker or a window without data yields an empty series, not an
/// error. Errors are reserved for transport and provider failures.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Fetch daily closes for `ticker` over `window`
    async fn fetch_closes(&self, ticker: &Ticker, window: LookbackWindow) -> Result<PriceSeries>;
}
