//! Session configuration.
//!
//! Everything the dashboards used to compute at load time (default ticker,
//! default window, timeouts) lives here and is handed to the engine when a
//! session starts. Every field has a default, so an empty or partial TOML file
//! is valid.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{CategoryQuery, DateRange, SelectorState};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Per-session settings for the engine and both dashboards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Ticker selected when the session starts.
    pub default_symbol: String,
    /// Length of the default date window, ending today.
    pub default_window_weeks: u32,
    /// Column the price metrics are computed over.
    pub primary_field: String,
    /// Upper bound on a single upstream request.
    pub fetch_timeout_secs: u64,
    /// Maximum number of distinct selector states kept in the session cache.
    pub cache_capacity: usize,
    /// Moving-average overlays on the price chart.
    pub sma_periods: Vec<usize>,
    /// Initial histogram bin count.
    pub histogram_bins: usize,
    /// Optional TOML file with the ticker choices.
    pub universe_path: Option<PathBuf>,
    pub table: TableConfig,
}

/// Settings for the static-table dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// CSV to load instead of the bundled tips sample.
    pub path: Option<PathBuf>,
    /// Numeric column summed and averaged in the value boxes.
    pub value_field: String,
    /// Numerator of the average-ratio metric (ratio_field / value_field).
    pub ratio_field: Option<String>,
    /// Columns offered as categorical filters.
    pub category_fields: Vec<String>,
    /// Scatter plot axes.
    pub x_field: String,
    pub y_field: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_symbol: "AAPL".into(),
            default_window_weeks: 26,
            primary_field: "Close".into(),
            fetch_timeout_secs: 10,
            cache_capacity: 16,
            sma_periods: vec![20],
            histogram_bins: 10,
            universe_path: None,
            table: TableConfig::default(),
        }
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            path: None,
            value_field: "total_bill".into(),
            ratio_field: Some("tip".into()),
            category_fields: vec!["sex".into(), "smoker".into(), "day".into(), "time".into()],
            x_field: "total_bill".into(),
            y_field: "tip".into(),
        }
    }
}

impl SessionConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_symbol.trim().is_empty() {
            return Err(ConfigError::Invalid("default_symbol is empty".into()));
        }
        if self.default_window_weeks == 0 {
            return Err(ConfigError::Invalid("default_window_weeks must be >= 1".into()));
        }
        if self.fetch_timeout_secs == 0 {
            return Err(ConfigError::Invalid("fetch_timeout_secs must be >= 1".into()));
        }
        if self.cache_capacity == 0 {
            return Err(ConfigError::Invalid("cache_capacity must be >= 1".into()));
        }
        if self.histogram_bins == 0 {
            return Err(ConfigError::Invalid("histogram_bins must be >= 1".into()));
        }
        if self.sma_periods.iter().any(|&p| p == 0) {
            return Err(ConfigError::Invalid("sma_periods must all be >= 1".into()));
        }
        Ok(())
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// The stock dashboard's opening selector: default ticker over the default window ending `today`.
    pub fn default_selector(&self, today: NaiveDate) -> SelectorState {
        SelectorState::ticker(
            &self.default_symbol,
            DateRange::last_weeks(today, self.default_window_weeks),
        )
        .with_bins(self.histogram_bins)
    }

    /// The table dashboard's opening selector: no filters.
    pub fn default_table_selector(&self) -> SelectorState {
        SelectorState::category(CategoryQuery::new()).with_bins(self.histogram_bins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Query;

    #[test]
    fn empty_toml_gives_defaults() {
        let c = SessionConfig::from_toml("").unwrap();
        assert_eq!(c, SessionConfig::default());
        assert_eq!(c.fetch_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn partial_toml_overrides_fields() {
        let c = SessionConfig::from_toml(
            r#"
            default_symbol = "MSFT"
            sma_periods = [10, 50]

            [table]
            value_field = "bill"
            "#,
        )
        .unwrap();
        assert_eq!(c.default_symbol, "MSFT");
        assert_eq!(c.sma_periods, vec![10, 50]);
        assert_eq!(c.table.value_field, "bill");
        assert_eq!(c.table.y_field, "tip");
        assert_eq!(c.default_window_weeks, 26);
    }

    #[test]
    fn zero_values_are_rejected() {
        assert!(SessionConfig::from_toml("cache_capacity = 0").is_err());
        assert!(SessionConfig::from_toml("histogram_bins = 0").is_err());
        assert!(SessionConfig::from_toml("sma_periods = [0]").is_err());
        assert!(SessionConfig::from_toml("default_symbol = \" \"").is_err());
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        assert!(matches!(
            SessionConfig::from_toml("default_window_weeks = \"many\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn default_selector_is_26_weeks_ending_today() {
        let today = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        let s = SessionConfig::default().default_selector(today);
        match s.query {
            Query::Ticker { symbol, range } => {
                assert_eq!(symbol, "AAPL");
                assert_eq!(range.end, today);
                assert_eq!((range.end - range.start).num_days(), 26 * 7);
            }
            other => panic!("expected ticker query, got {other:?}"),
        }
        assert_eq!(s.bins, 10);
    }
}
