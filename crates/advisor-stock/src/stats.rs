//! Summary statistics over a closing-price series

use crate::series::PriceSeries;
use serde::{Deserialize, Serialize};

/// Currency label appended to displayed prices
pub const CURRENCY: &str = "TWD";

/// Max / min / mean close, each rounded to two decimals
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub max: f64,
    pub min: f64,
    pub mean: f64,
}

/// One labelled figure for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metric {
    pub label: &'static str,
    pub value: String,
}

impl SummaryStats {
    /// Compute statistics, `None` for an empty series
    pub fn from_series(series: &PriceSeries) -> Option<Self> {
        Self::from_closes(series.closes())
    }

    /// Compute statistics from raw closes, `None` when there are none
    pub fn from_closes(closes: impl IntoIterator<Item = f64>) -> Option<Self> {
        let mut count = 0_usize;
        let mut sum = 0.0;
        let mut max = f64::NEG_INFINITY;
        let mut min = f64::INFINITY;

        for close in closes {
            count += 1;
            sum += close;
            max = max.max(close);
            min = min.min(close);
        }

        if count == 0 {
            return None;
        }

        Some(Self {
            max: round2(max),
            min: round2(min),
            mean: round2(sum / count as f64),
        })
    }

    /// Highest, lowest and average close as display metrics
    pub fn metrics(&self) -> [Metric; 3] {
        [
            Metric {
                label: "📈 最高價",
                value: format_price(self.max),
            },
            Metric {
                label: "📉 最低價",
                value: format_price(self.min),
            },
            Metric {
                label: "💲 平均價",
                value: format_price(self.mean),
            },
        ]
    }
}

/// Round half away from zero to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Render a price as `123.45 TWD`
pub fn format_price(value: f64) -> String {
    format!("{value:.2} {CURRENCY}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::PricePoint;
    use crate::ticker::Ticker;
    use chrono::NaiveDate;

    fn series(closes: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        PriceSeries::new(
            Ticker::normalize("0050"),
            closes
                .iter()
                .enumerate()
                .map(|(i, &c)| PricePoint::new(start + chrono::Days::new(i as u64), c)),
        )
    }

    #[test]
    fn test_basic_stats() {
        let stats = SummaryStats::from_series(&series(&[10.0, 20.0, 30.0])).unwrap();
        assert_eq!(stats.max, 30.0);
        assert_eq!(stats.min, 10.0);
        assert_eq!(stats.mean, 20.0);
    }

    #[test]
    fn test_two_decimal_rounding() {
        let stats = SummaryStats::from_series(&series(&[100.004, 100.006])).unwrap();
        assert_eq!(format!("{:.2}", stats.max), "100.01");
        assert_eq!(format!("{:.2}", stats.min), "100.00");
        assert!(stats.min <= stats.mean && stats.mean <= stats.max);
    }

    #[test]
    fn test_ordering_holds() {
        let cases: [&[f64]; 4] = [
            &[1.0],
            &[3.333, 3.334, 3.335],
            &[512.5, 498.25, 601.125, 587.0, 575.75],
            &[0.0, 0.005, 0.004],
        ];
        for closes in cases {
            let stats = SummaryStats::from_series(&series(closes)).unwrap();
            assert!(stats.max >= stats.mean, "{closes:?}");
            assert!(stats.mean >= stats.min, "{closes:?}");
            for value in [stats.max, stats.min, stats.mean] {
                assert_eq!(round2(value), value);
            }
        }
    }

    #[test]
    fn test_empty_has_no_stats() {
        assert!(SummaryStats::from_series(&series(&[])).is_none());
    }

    #[test]
    fn test_metrics() {
        let stats = SummaryStats {
            max: 1085.0,
            min: 780.5,
            mean: 932.125,
        };
        let [high, low, avg] = stats.metrics();
        assert_eq!(high.value, "1085.00 TWD");
        assert_eq!(low.value, "780.50 TWD");
        assert!(avg.label.contains("平均價"));
    }
}
