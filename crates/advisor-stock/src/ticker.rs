//! Ticker normalisation for Taiwan-listed securities

use serde::{Deserialize, Serialize};
use std::fmt;

/// Suffix of securities listed on the Taiwan Stock Exchange
pub const LISTED_SUFFIX: &str = ".TW";
/// Suffix of securities traded on the Taipei Exchange (OTC)
pub const OTC_SUFFIX: &str = ".TWO";
/// Suffix appended when the input carries none
pub const DEFAULT_SUFFIX: &str = LISTED_SUFFIX;

/// Market a ticker trades on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Market {
    /// Taiwan Stock Exchange
    Listed,
    /// Taipei Exchange
    Otc,
}

/// An uppercase ticker ending in a recognised market suffix
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ticker(String);

impl Ticker {
    /// Normalise free-text input.
    ///
    /// Trims, uppercases and appends [`DEFAULT_SUFFIX`] unless the text already
    /// ends in `.TW` or `.TWO`. Any input is accepted; the data provider
    /// decides whether the result exists.
    pub fn normalize(raw: &str) -> Self {
        let mut symbol = raw.trim().to_uppercase();
        if !has_market_suffix(&symbol) {
            symbol.push_str(DEFAULT_SUFFIX);
        }
        Self(symbol)
    }

    /// The full provider symbol, e.g. `2330.TW`
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The security code without its market suffix, e.g. `2330`
    pub fn code(&self) -> &str {
        self.0
            .strip_suffix(OTC_SUFFIX)
            .or_else(|| self.0.strip_suffix(LISTED_SUFFIX))
            .unwrap_or(&self.0)
    }

    pub fn market(&self) -> Market {
        if self.0.ends_with(OTC_SUFFIX) {
            Market::Otc
        } else {
            Market::Listed
        }
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Ticker {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Whether the input would trigger no analysis at all
pub fn is_blank(raw: &str) -> bool {
    raw.trim().is_empty()
}

fn has_market_suffix(symbol: &str) -> bool {
    symbol.ends_with(LISTED_SUFFIX) || symbol.ends_with(OTC_SUFFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_appends_default_suffix() {
        assert_eq!(Ticker::normalize("0050").as_str(), "0050.TW");
        assert_eq!(Ticker::normalize("  2330 \n").as_str(), "2330.TW");
    }

    #[test]
    fn test_keeps_existing_suffix() {
        assert_eq!(Ticker::normalize("2330.TW").as_str(), "2330.TW");
        assert_eq!(Ticker::normalize("6488.TWO").as_str(), "6488.TWO");
    }

    #[test]
    fn test_lowercase_suffix_recognised() {
        assert_eq!(Ticker::normalize("2330.tw").as_str(), "2330.TW");
        assert_eq!(Ticker::normalize("6488.two").as_str(), "6488.TWO");
        assert_eq!(Ticker::normalize("00878.Tw").as_str(), "00878.TW");
    }

    #[test]
    fn test_idempotent() {
        for raw in ["0050", "2330.TW", "6488.two", " abc ", "", "1234.T"] {
            let once = Ticker::normalize(raw);
            let twice = Ticker::normalize(once.as_str());
            assert_eq!(once, twice, "input {raw:?}");
        }
    }

    #[test]
    fn test_suffix_appended_iff_missing() {
        for raw in ["0050", "2330.T", "AAPL", "1234.TWX", "TW"] {
            let normalized = Ticker::normalize(raw);
            assert_eq!(normalized.as_str(), format!("{}.TW", raw.to_uppercase()));
        }
    }

    #[test]
    fn test_code_and_market() {
        let listed = Ticker::normalize("2330");
        assert_eq!(listed.code(), "2330");
        assert_eq!(listed.market(), Market::Listed);

        let otc = Ticker::normalize("6488.TWO");
        assert_eq!(otc.code(), "6488");
        assert_eq!(otc.market(), Market::Otc);
    }

    #[test]
    fn test_is_blank() {
        assert!(is_blank("   "));
        assert!(!is_blank(" 0050 "));
    }
}
