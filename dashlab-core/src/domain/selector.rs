//! Selector state: the user's current inputs, and the cache key derived from them.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Calendar date range `[start, end)`: the end date itself is not included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Build a range, swapping the bounds if they arrive reversed.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    /// The `weeks` weeks ending on `end`.
    pub fn last_weeks(end: NaiveDate, weeks: u32) -> Self {
        Self::new(end - Duration::weeks(weeks as i64), end)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date < self.end
    }

    /// Move the start bound by `days`, keeping at least one day in range.
    pub fn shift_start(&self, days: i64) -> Self {
        let start = (self.start + Duration::days(days)).min(self.end - Duration::days(1));
        Self { start, end: self.end }
    }

    /// Move the end bound by `days`, keeping at least one day in range.
    pub fn shift_end(&self, days: i64) -> Self {
        let end = (self.end + Duration::days(days)).max(self.start + Duration::days(1));
        Self { start: self.start, end }
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} .. {}", self.start, self.end)
    }
}

/// Inclusive numeric range for slider-style filters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    pub fn new(min: f64, max: f64) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    pub fn contains(&self, v: f64) -> bool {
        self.min <= v && v <= self.max
    }
}

/// Filters applied to a static table.
///
/// A column absent from `equals` is unconstrained; the same holds for `ranges`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CategoryQuery {
    pub equals: BTreeMap<String, String>,
    pub ranges: BTreeMap<String, ValueRange>,
}

impl CategoryQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_equal(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.equals.insert(column.into(), value.into());
        self
    }

    pub fn with_range(mut self, column: impl Into<String>, range: ValueRange) -> Self {
        self.ranges.insert(column.into(), range);
        self
    }

    /// Set or clear (`None`) the equality constraint on a column.
    pub fn set_equal(&mut self, column: &str, value: Option<String>) {
        match value {
            Some(v) => {
                self.equals.insert(column.to_string(), v);
            }
            None => {
                self.equals.remove(column);
            }
        }
    }
}

/// What to load: a ticker's price history or a filtered static table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Query {
    Ticker { symbol: String, range: DateRange },
    Category(CategoryQuery),
}

/// The full set of user inputs for one dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectorState {
    pub query: Query,
    /// Histogram bin count. Presentation-only: does not change the dataset.
    pub bins: usize,
}

impl SelectorState {
    pub fn ticker(symbol: &str, range: DateRange) -> Self {
        Self {
            query: Query::Ticker {
                symbol: symbol.trim().to_uppercase(),
                range,
            },
            bins: 10,
        }
    }

    pub fn category(query: CategoryQuery) -> Self {
        Self {
            query: Query::Category(query),
            bins: 10,
        }
    }

    pub fn with_bins(mut self, bins: usize) -> Self {
        self.bins = bins.max(1);
        self
    }

    /// Content hash of the dataset-determining inputs.
    ///
    /// Two selector states that differ only in `bins` share a key.
    pub fn cache_key(&self) -> SelectorKey {
        let bytes = serde_json::to_vec(&self.query)
            .unwrap_or_else(|_| format!("{:?}", self.query).into_bytes());
        SelectorKey(blake3::hash(&bytes).to_hex().to_string())
    }

    pub fn symbol(&self) -> Option<&str> {
        match &self.query {
            Query::Ticker { symbol, .. } => Some(symbol),
            Query::Category(_) => None,
        }
    }
}

/// Hex-encoded blake3 digest identifying a dataset request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SelectorKey(String);

impl SelectorKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SelectorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Short prefix is enough for log lines.
        write!(f, "{}", &self.0[..self.0.len().min(12)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn date_range_swaps_reversed_bounds() {
        let r = DateRange::new(d(2024, 6, 1), d(2024, 1, 1));
        assert_eq!(r.start, d(2024, 1, 1));
        assert_eq!(r.end, d(2024, 6, 1));
    }

    #[test]
    fn last_26_weeks_spans_182_days() {
        let r = DateRange::last_weeks(d(2024, 7, 1), 26);
        assert_eq!((r.end - r.start).num_days(), 182);
        assert!(!r.contains(d(2024, 7, 1)));
        assert!(r.contains(d(2024, 6, 30)));
        assert!(r.contains(r.start));
    }

    #[test]
    fn shifting_never_crosses_bounds() {
        let r = DateRange::new(d(2024, 1, 1), d(2024, 1, 10));
        assert_eq!(r.shift_start(30).start, d(2024, 1, 9));
        assert_eq!(r.shift_end(-30).end, d(2024, 1, 2));
        assert_eq!(r.shift_start(-7).start, d(2023, 12, 25));
    }

    #[test]
    fn ticker_symbol_is_normalized() {
        let s = SelectorState::ticker(" aapl ", DateRange::new(d(2024, 1, 1), d(2024, 2, 1)));
        assert_eq!(s.symbol(), Some("AAPL"));
    }

    #[test]
    fn cache_key_ignores_bins() {
        let range = DateRange::new(d(2024, 1, 1), d(2024, 2, 1));
        let a = SelectorState::ticker("AAPL", range).with_bins(5);
        let b = SelectorState::ticker("AAPL", range).with_bins(30);
        assert_eq!(a.cache_key(), b.cache_key());
    }

    #[test]
    fn cache_key_tracks_query_changes() {
        let range = DateRange::new(d(2024, 1, 1), d(2024, 2, 1));
        let aapl = SelectorState::ticker("AAPL", range);
        let msft = SelectorState::ticker("MSFT", range);
        let wider = SelectorState::ticker("AAPL", range.shift_start(-7));
        assert_ne!(aapl.cache_key(), msft.cache_key());
        assert_ne!(aapl.cache_key(), wider.cache_key());

        let male = SelectorState::category(CategoryQuery::new().with_equal("sex", "Male"));
        let female = SelectorState::category(CategoryQuery::new().with_equal("sex", "Female"));
        assert_ne!(male.cache_key(), female.cache_key());
    }

    #[test]
    fn category_key_is_order_independent() {
        let a = CategoryQuery::new()
            .with_equal("sex", "Male")
            .with_equal("day", "Sun");
        let b = CategoryQuery::new()
            .with_equal("day", "Sun")
            .with_equal("sex", "Male");
        assert_eq!(
            SelectorState::category(a).cache_key(),
            SelectorState::category(b).cache_key()
        );
    }

    #[test]
    fn set_equal_none_clears_constraint() {
        let mut q = CategoryQuery::new().with_equal("sex", "Male");
        q.set_equal("sex", None);
        assert!(q.equals.is_empty());
    }
}
