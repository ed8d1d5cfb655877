//! Offline provider producing deterministic random-walk bars.
//!
//! Used when the dashboard runs with `--offline` and in tests that need a
//! realistic-looking series without the network. The walk is seeded from the
//! symbol, so the same symbol always yields the same prices for a given date.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::provider::{DataError, DataProvider, DataSource, FetchResult};
use crate::domain::Bar;

/// Generates weekday bars starting from a fixed anchor date.
///
/// Bars are generated from `anchor` forward and then clipped to the requested
/// range, which keeps a symbol's price on a given date independent of the
/// window being viewed.
#[derive(Debug, Clone)]
pub struct SyntheticProvider {
    anchor: NaiveDate,
    start_price: f64,
}

impl Default for SyntheticProvider {
    fn default() -> Self {
        Self {
            anchor: NaiveDate::from_ymd_opt(2015, 1, 1).unwrap_or_default(),
            start_price: 100.0,
        }
    }
}

impl SyntheticProvider {
    pub fn new(anchor: NaiveDate, start_price: f64) -> Self {
        Self {
            anchor,
            start_price,
        }
    }

    fn generate(&self, symbol: &str, end: NaiveDate) -> Vec<Bar> {
        // Deterministic seed from symbol name
        let seed: [u8; 32] = *blake3::hash(symbol.as_bytes()).as_bytes();
        let mut rng = StdRng::from_seed(seed);

        let mut bars = Vec::new();
        let mut price = self.start_price;
        let mut current = self.anchor;

        while current < end {
            // Skip weekends (simple heuristic)
            let weekday = current.weekday();
            if weekday == Weekday::Sat || weekday == Weekday::Sun {
                current += Duration::days(1);
                continue;
            }

            let daily_return: f64 = rng.gen_range(-0.03..0.03);
            let open = price;
            let close = price * (1.0 + daily_return);
            let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
            let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
            let volume = rng.gen_range(500_000..5_000_000u64);

            bars.push(Bar {
                date: current,
                open,
                high,
                low,
                close,
                volume,
                adj_close: close,
            });

            price = close;
            current += Duration::days(1);
        }

        bars
    }
}

impl DataProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, DataError> {
        if symbol.trim().is_empty() {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }
        let bars = self
            .generate(symbol, end)
            .into_iter()
            .filter(|b| b.date >= start && b.date < end)
            .collect();
        Ok(FetchResult {
            symbol: symbol.to_string(),
            bars,
            source: DataSource::Synthetic,
        })
    }
}
