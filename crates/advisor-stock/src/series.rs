//! Daily closing-price history

use crate::error::StockError;
use crate::ticker::Ticker;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Historical window requested from the data provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LookbackWindow {
    #[serde(rename = "1mo")]
    OneMonth,
    #[serde(rename = "3mo")]
    ThreeMonths,
    #[serde(rename = "6mo")]
    SixMonths,
    #[default]
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "2y")]
    TwoYears,
    #[serde(rename = "5y")]
    FiveYears,
}

impl LookbackWindow {
    /// Provider range string, e.g. `1y`
    pub fn as_range(self) -> &'static str {
        match self {
            Self::OneMonth => "1mo",
            Self::ThreeMonths => "3mo",
            Self::SixMonths => "6mo",
            Self::OneYear => "1y",
            Self::TwoYears => "2y",
            Self::FiveYears => "5y",
        }
    }

    /// Label used in chart titles
    pub fn label(self) -> &'static str {
        match self {
            Self::OneMonth => "近一個月",
            Self::ThreeMonths => "近三個月",
            Self::SixMonths => "近半年",
            Self::OneYear => "近一年",
            Self::TwoYears => "近兩年",
            Self::FiveYears => "近五年",
        }
    }
}

impl fmt::Display for LookbackWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_range())
    }
}

impl FromStr for LookbackWindow {
    type Err = StockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1mo" => Ok(Self::OneMonth),
            "3mo" => Ok(Self::ThreeMonths),
            "6mo" => Ok(Self::SixMonths),
            "1y" => Ok(Self::OneYear),
            "2y" => Ok(Self::TwoYears),
            "5y" => Ok(Self::FiveYears),
            other => Err(StockError::InvalidRange(other.to_string())),
        }
    }
}

/// One trading day's close
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }
}

/// Closing prices of one ticker, strictly increasing by date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    ticker: Ticker,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Build a series from unordered provider rows.
    ///
    /// Rows with a non-finite or negative close are dropped. When a date
    /// repeats, the row that came last wins.
    pub fn new(ticker: Ticker, points: impl IntoIterator<Item = PricePoint>) -> Self {
        let mut points: Vec<PricePoint> = points
            .into_iter()
            .filter(|p| p.close.is_finite() && p.close >= 0.0)
            .collect();

        // stable sort keeps provider order within a date
        points.sort_by_key(|p| p.date);
        let mut deduped: Vec<PricePoint> = Vec::with_capacity(points.len());
        for point in points {
            match deduped.last_mut() {
                Some(last) if last.date == point.date => *last = point,
                _ => deduped.push(point),
            }
        }

        Self {
            ticker,
            points: deduped,
        }
    }

    /// A series with no data, as returned for unknown tickers
    pub fn empty(ticker: Ticker) -> Self {
        Self {
            ticker,
            points: Vec::new(),
        }
    }

    pub fn ticker(&self) -> &Ticker {
        &self.ticker
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn closes(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.close)
    }

    /// Most recent close
    pub fn latest(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    #[test]
    fn test_sorted_and_deduplicated() {
        let series = PriceSeries::new(
            Ticker::normalize("2330"),
            vec![
                PricePoint::new(day(5), 105.0),
                PricePoint::new(day(3), 103.0),
                PricePoint::new(day(4), 104.0),
                PricePoint::new(day(4), 104.5),
            ],
        );

        let dates: Vec<_> = series.points().iter().map(|p| p.date).collect();
        assert_eq!(dates, vec![day(3), day(4), day(5)]);
        assert!(dates.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(series.points()[1].close, 104.5);
        assert_eq!(series.latest().unwrap().close, 105.0);
    }

    #[test]
    fn test_invalid_closes_dropped() {
        let series = PriceSeries::new(
            Ticker::normalize("0050"),
            vec![
                PricePoint::new(day(1), f64::NAN),
                PricePoint::new(day(2), -1.0),
                PricePoint::new(day(3), 0.0),
                PricePoint::new(day(4), f64::INFINITY),
            ],
        );
        assert_eq!(series.len(), 1);
        assert_eq!(series.first_date(), Some(day(3)));
    }

    #[test]
    fn test_empty_series() {
        let series = PriceSeries::empty(Ticker::normalize("9999"));
        assert!(series.is_empty());
        assert!(series.latest().is_none());
        assert_eq!(series.ticker().as_str(), "9999.TW");
    }

    #[test]
    fn test_lookback_parse_and_display() {
        assert_eq!("6MO".parse::<LookbackWindow>().unwrap(), LookbackWindow::SixMonths);
        assert_eq!(LookbackWindow::default(), LookbackWindow::OneYear);
        assert_eq!(LookbackWindow::OneYear.to_string(), "1y");
        assert!(matches!(
            "10d".parse::<LookbackWindow>(),
            Err(StockError::InvalidRange(_))
        ));
    }

    #[test]
    fn test_lookback_serde() {
        let json = serde_json::to_string(&LookbackWindow::SixMonths).unwrap();
        assert_eq!(json, "\"6mo\"");
        let parsed: LookbackWindow = serde_json::from_str("\"2y\"").unwrap();
        assert_eq!(parsed, LookbackWindow::TwoYears);
    }
}
