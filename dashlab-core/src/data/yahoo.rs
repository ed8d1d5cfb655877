//! Yahoo Finance data provider.
//!
//! Fetches daily OHLCV bars from Yahoo's v8 chart API. Each call is a single
//! blocking request bounded by the session's fetch timeout. Failures are
//! returned as-is; nothing here retries.

use std::time::Duration;

use chrono::NaiveDate;
use log::{debug, warn};
use reqwest::StatusCode;
use serde::Deserialize;

use super::provider::{DataError, DataProvider, DataSource, FetchResult};
use crate::domain::Bar;

/// Yahoo Finance v8 chart API response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
    adjclose: Option<Vec<AdjCloseData>>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<u64>>,
}

#[derive(Debug, Deserialize)]
struct AdjCloseData {
    adjclose: Vec<Option<f64>>,
}

impl ChartError {
    fn into_data_error(self, symbol: &str) -> DataError {
        match self.code.as_str() {
            "Not Found" => DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            },
            _ => DataError::ResponseFormatChanged(format!("{}: {}", self.code, self.description)),
        }
    }
}

impl QuoteData {
    /// Session `i` as a bar; `None` for a holiday row where every field is null.
    /// Partially missing prices become NaN so the row keeps its date.
    fn bar(&self, i: usize, date: NaiveDate, adj_close: Option<f64>) -> Option<Bar> {
        let at = |column: &[Option<f64>]| column.get(i).copied().flatten();
        let prices = [at(&self.open), at(&self.high), at(&self.low), at(&self.close)];
        let volume = self.volume.get(i).copied().flatten();
        if volume.is_none() && prices.iter().all(Option::is_none) {
            return None;
        }
        let [open, high, low, close] = prices.map(|p| p.unwrap_or(f64::NAN));
        Some(Bar {
            date,
            open,
            high,
            low,
            close,
            volume: volume.unwrap_or(0),
            adj_close: adj_close.or(prices[3]).unwrap_or(f64::NAN),
        })
    }
}

/// Calendar date (UTC) of a session timestamp.
fn session_date(ts: i64) -> Result<NaiveDate, DataError> {
    chrono::DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.date_naive())
        .ok_or_else(|| DataError::ResponseFormatChanged(format!("invalid timestamp: {ts}")))
}

/// Yahoo Finance data provider.
pub struct YahooProvider {
    client: reqwest::blocking::Client,
    timeout: Duration,
}

impl YahooProvider {
    pub fn new(timeout: Duration) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .map_err(|e| DataError::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, timeout })
    }

    /// Chart API URL; `period2` is midnight of `end`, so the end day is excluded.
    fn chart_url(symbol: &str, start: NaiveDate, end: NaiveDate) -> String {
        let midnight = |d: NaiveDate| d.and_time(chrono::NaiveTime::MIN).and_utc().timestamp();
        let (period1, period2) = (midnight(start), midnight(end));
        format!(
            "https://query2.finance.yahoo.com/v8/finance/chart/{symbol}\
             ?period1={period1}&period2={period2}&interval=1d\
             &includeAdjustedClose=true"
        )
    }

    fn parse_response(symbol: &str, resp: ChartResponse) -> Result<Vec<Bar>, DataError> {
        let ChartResult { result, error } = resp.chart;
        let data = match (result.and_then(|r| r.into_iter().next()), error) {
            (Some(data), _) => data,
            (None, Some(err)) => return Err(err.into_data_error(symbol)),
            (None, None) => {
                return Err(DataError::ResponseFormatChanged(
                    "empty result with no error".into(),
                ))
            }
        };

        // A valid symbol with no sessions in range has no timestamp array at all.
        let Some(timestamps) = data.timestamp else {
            return Ok(Vec::new());
        };

        let Indicators { quote, adjclose } = data.indicators;
        let quote = quote
            .into_iter()
            .next()
            .ok_or_else(|| DataError::ResponseFormatChanged("no quote data".into()))?;
        let adj_closes = adjclose
            .and_then(|v| v.into_iter().next())
            .map(|a| a.adjclose)
            .unwrap_or_default();

        timestamps
            .iter()
            .enumerate()
            .filter_map(|(i, &ts)| match session_date(ts) {
                Ok(date) => quote
                    .bar(i, date, adj_closes.get(i).copied().flatten())
                    .map(Ok),
                Err(e) => Some(Err(e)),
            })
            .collect()
    }

    fn request(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<Bar>, DataError> {
        let url = Self::chart_url(symbol, start, end);
        debug!("GET {url}");

        let resp = self.client.get(&url).send().map_err(|e| {
            if e.is_timeout() {
                DataError::Timeout {
                    secs: self.timeout.as_secs(),
                }
            } else {
                DataError::NetworkUnreachable(e.to_string())
            }
        })?;

        match resp.status() {
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after_secs = resp
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(60);
                return Err(DataError::RateLimited { retry_after_secs });
            }
            StatusCode::NOT_FOUND => {
                return Err(DataError::SymbolNotFound {
                    symbol: symbol.to_string(),
                })
            }
            status if !status.is_success() => {
                return Err(DataError::Other(format!("HTTP {status} for {symbol}")))
            }
            _ => {}
        }

        let chart: ChartResponse = resp.json().map_err(|e| {
            DataError::ResponseFormatChanged(format!("unreadable chart for {symbol}: {e}"))
        })?;
        Self::parse_response(symbol, chart)
    }
}

impl DataProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, DataError> {
        let mut bars = self.request(symbol, start, end).map_err(|e| {
            warn!("yahoo fetch for {symbol} failed: {e}");
            e
        })?;
        // The live session can carry a timestamp past `period2`.
        bars.retain(|b| b.date >= start && b.date < end);
        Ok(FetchResult {
            symbol: symbol.to_string(),
            bars,
            source: DataSource::YahooFinance,
        })
    }
}
