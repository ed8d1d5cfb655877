//! Stock universe: the ticker choices offered by the symbol picker.
//!
//! Stored as a TOML table of `SYMBOL = "Company name"` entries so a session can
//! ship its own list.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::config::ConfigError;

/// Ticker symbol to display name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockUniverse {
    pub stocks: BTreeMap<String, String>,
}

impl StockUniverse {
    /// Load a universe from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml(&content)
    }

    /// Parse a universe from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let universe: Self = toml::from_str(content)?;
        if universe.stocks.is_empty() {
            return Err(ConfigError::Invalid("stock universe is empty".into()));
        }
        Ok(universe)
    }

    /// Symbols in display order (alphabetical).
    pub fn symbols(&self) -> Vec<&str> {
        self.stocks.keys().map(|s| s.as_str()).collect()
    }

    pub fn name_of(&self, symbol: &str) -> Option<&str> {
        self.stocks.get(symbol).map(|s| s.as_str())
    }

    pub fn position(&self, symbol: &str) -> Option<usize> {
        self.stocks.keys().position(|s| s == symbol)
    }

    pub fn len(&self) -> usize {
        self.stocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stocks.is_empty()
    }

    /// Add a symbol typed by the user; keeps an existing name if present.
    pub fn insert(&mut self, symbol: &str) {
        let symbol = symbol.trim().to_uppercase();
        if !symbol.is_empty() {
            self.stocks.entry(symbol.clone()).or_insert(symbol);
        }
    }

    /// Default list of large US equities.
    pub fn default_us() -> Self {
        let stocks = [
            ("AAPL", "Apple Inc."),
            ("AMZN", "Amazon.com Inc."),
            ("GOOG", "Alphabet Inc."),
            ("META", "Meta Platforms Inc."),
            ("MSFT", "Microsoft Corporation"),
            ("NVDA", "NVIDIA Corporation"),
            ("TSLA", "Tesla Inc."),
            ("JPM", "JPMorgan Chase & Co."),
            ("V", "Visa Inc."),
            ("WMT", "Walmart Inc."),
            ("XOM", "Exxon Mobil Corporation"),
            ("SPY", "SPDR S&P 500 ETF Trust"),
        ]
        .into_iter()
        .map(|(s, n)| (s.to_string(), n.to_string()))
        .collect();

        Self { stocks }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_universe_contains_aapl() {
        let u = StockUniverse::default_us();
        assert_eq!(u.name_of("AAPL"), Some("Apple Inc."));
        assert!(u.len() >= 10);
    }

    #[test]
    fn parses_toml_table() {
        let u = StockUniverse::from_toml(
            r#"
            [stocks]
            AAPL = "Apple"
            IBM = "International Business Machines"
            "#,
        )
        .unwrap();
        assert_eq!(u.symbols(), vec!["AAPL", "IBM"]);
        assert_eq!(u.position("IBM"), Some(1));
    }

    #[test]
    fn empty_universe_is_rejected() {
        assert!(StockUniverse::from_toml("[stocks]\n").is_err());
    }

    #[test]
    fn insert_normalizes_and_keeps_names() {
        let mut u = StockUniverse::default_us();
        let before = u.len();
        u.insert(" ibm ");
        u.insert("AAPL");
        assert_eq!(u.len(), before + 1);
        assert_eq!(u.name_of("IBM"), Some("IBM"));
        assert_eq!(u.name_of("AAPL"), Some("Apple Inc."));
    }
}
