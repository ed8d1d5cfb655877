//! Bar: one daily OHLCV observation returned by a price provider.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Daily OHLCV bar for a single symbol.
///
/// Missing upstream fields are carried as NaN so a partially filled row still
/// occupies its date in the series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
    pub adj_close: f64,
}

impl Bar {
    /// Returns true if any OHLC field is NaN. Such a bar cannot be drawn as a candle.
    pub fn is_void(&self) -> bool {
        self.open.is_nan() || self.high.is_nan() || self.low.is_nan() || self.close.is_nan()
    }

    /// Close at or above open.
    pub fn is_up(&self) -> bool {
        self.close >= self.open
    }
}
