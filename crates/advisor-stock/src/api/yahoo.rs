//! Yahoo Finance API client

use crate::api::MarketDataSource;
use crate::error::{Result, StockError};
use crate::series::{LookbackWindow, PricePoint, PriceSeries};
use crate::ticker::Ticker;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use tracing::{debug, info, instrument};
use yahoo_finance_api as yahoo;

/// Taiwan trades in UTC+8 all year
const TAIPEI_UTC_OFFSET_SECS: i64 = 8 * 3600;

/// Bar size requested from the chart endpoint
const DAILY_INTERVAL: &str = "1d";

/// Yahoo Finance API client
#[derive(Debug, Default, Clone)]
pub struct YahooFinanceClient {}

impl YahooFinanceClient {
    /// Create a new Yahoo Finance client
    pub fn new() -> Self {
        Self {}
    }
}

#[async_trait]
impl MarketDataSource for YahooFinanceClient {
    #[instrument(skip(self), fields(ticker = %ticker, range = %window))]
    async fn fetch_closes(&self, ticker: &Ticker, window: LookbackWindow) -> Result<PriceSeries> {
        let provider = yahoo::YahooConnector::new()
            .map_err(|e| StockError::YahooFinanceError(e.to_string()))?;

        let response = provider
            .get_quote_range(ticker.as_str(), DAILY_INTERVAL, window.as_range())
            .await;

        let series = series_from_response(ticker, response)?;
        debug!("Fetched {} daily closes", series.len());
        Ok(series)
    }
}

/// Turn a chart response into a close series.
///
/// Unknown symbols and windows without bars become an empty series.
fn series_from_response(
    ticker: &Ticker,
    response: std::result::Result<yahoo::YResponse, yahoo::YahooError>,
) -> Result<PriceSeries> {
    let quotes = response.and_then(|mut response| {
        if response.chart.result.is_none() {
            if let Some(message) = response.chart.error.take() {
                return Err(yahoo::YahooError::ApiError(message));
            }
        }
        response.quotes()
    });

    match quotes {
        Ok(quotes) => {
            let points = quotes.iter().filter_map(|q| {
                trading_date(q.timestamp).map(|date| PricePoint::new(date, q.close))
            });
            Ok(PriceSeries::new(ticker.clone(), points))
        }
        Err(e) if is_no_data(&e) => {
            info!("No history returned for {ticker}: {e}");
            Ok(PriceSeries::empty(ticker.clone()))
        }
        Err(e) => Err(StockError::YahooFinanceError(e.to_string())),
    }
}

/// Whether the provider error means "nothing to show" rather than a failure
fn is_no_data(err: &yahoo::YahooError) -> bool {
    match err {
        yahoo::YahooError::NoResult | yahoo::YahooError::NoQuotes => true,
        yahoo::YahooError::ApiError(message) => message
            .code
            .as_deref()
            .is_some_and(|code| code.eq_ignore_ascii_case("not found")),
        _ => false,
    }
}

/// Taipei calendar date of a bar's Unix timestamp
fn trading_date(timestamp: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp(timestamp + TAIPEI_UTC_OFFSET_SECS, 0).map(|dt| dt.date_naive())
}
