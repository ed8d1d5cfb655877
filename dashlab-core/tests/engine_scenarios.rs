//! End-to-end scenarios for the derived value engine with a counting stub provider.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use dashlab_core::data::{
    DataError, DataProvider, DataSource, FetchResult, StaticTable, SyntheticProvider,
};
use dashlab_core::domain::{Bar, CategoryQuery, DateRange, SelectorState, Value};
use dashlab_core::engine::{DerivedValueEngine, EngineError, MetricError};
use dashlab_core::view::{GridView, ValueBoxes, PLACEHOLDER};
use dashlab_core::SessionConfig;

/// Serves fixed bars for AAPL and counts every call.
struct StubProvider {
    bars: Vec<Bar>,
    calls: Arc<AtomicUsize>,
    failing: Arc<AtomicBool>,
}

impl DataProvider for StubProvider {
    fn name(&self) -> &str {
        "stub"
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, DataError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(DataError::NetworkUnreachable("connection refused".into()));
        }
        if symbol == "ZZZZ" {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }
        Ok(FetchResult {
            symbol: symbol.to_string(),
            bars: self
                .bars
                .iter()
                .filter(|b| b.date >= start && b.date < end)
                .cloned()
                .collect(),
            source: DataSource::YahooFinance,
        })
    }
}

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn today() -> NaiveDate {
    d(2024, 7, 1)
}

fn bar(date: NaiveDate, close: f64) -> Bar {
    Bar {
        date,
        open: close - 0.5,
        high: close + 1.0,
        low: close - 1.0,
        close,
        volume: 10_000,
        adj_close: close,
    }
}

/// Closes 148 (Jun 26), 150 (Jun 27), 153 (Jun 28).
fn aapl_bars() -> Vec<Bar> {
    vec![
        bar(d(2024, 6, 26), 148.0),
        bar(d(2024, 6, 27), 150.0),
        bar(d(2024, 6, 28), 153.0),
    ]
}

struct Harness {
    engine: DerivedValueEngine,
    calls: Arc<AtomicUsize>,
    failing: Arc<AtomicBool>,
}

fn harness(config: SessionConfig) -> Harness {
    let calls = Arc::new(AtomicUsize::new(0));
    let failing = Arc::new(AtomicBool::new(false));
    let provider = StubProvider {
        bars: aapl_bars(),
        calls: Arc::clone(&calls),
        failing: Arc::clone(&failing),
    };
    Harness {
        engine: DerivedValueEngine::new(config, Box::new(provider)),
        calls,
        failing,
    }
}

#[test]
fn aapl_last_26_weeks_change() {
    let mut h = harness(SessionConfig::default());
    let selector = h.engine.default_selector(today());
    assert_eq!(selector.symbol(), Some("AAPL"));

    let out = h.engine.compute(&selector).unwrap();
    let change = out.change.clone().unwrap();
    assert_eq!(change.latest, 153.0);
    assert_eq!(change.previous, 150.0);
    assert_eq!(change.delta, 3.0);
    assert!((change.percent_delta - 2.0).abs() < 1e-9);

    let boxes = ValueBoxes::from_result(&out.change);
    assert_eq!(boxes.price, "153.00");
    assert_eq!(boxes.change, "$3.00");
    assert_eq!(boxes.percent, "2.00%");
}

#[test]
fn repeated_compute_fetches_once() {
    let mut h = harness(SessionConfig::default());
    let selector = h.engine.default_selector(today());

    let first = h.engine.compute(&selector).unwrap();
    let second = h.engine.compute(&selector).unwrap();
    let change = h.engine.change(&selector).unwrap();

    assert_eq!(first, second);
    assert_eq!(Ok(change), first.change);
    assert_eq!(h.calls.load(Ordering::SeqCst), 1);
    assert_eq!(h.engine.cache_stats().hits, 2);
}

#[test]
fn single_row_range_is_insufficient() {
    let mut h = harness(SessionConfig::default());
    let selector = SelectorState::ticker("AAPL", DateRange::new(d(2024, 6, 28), d(2024, 6, 30)));

    let out = h.engine.compute(&selector).unwrap();
    assert_eq!(out.dataset.len(), 1);
    assert_eq!(
        out.change,
        Err(MetricError::InsufficientData {
            rows: 1,
            required: 2
        })
    );
    assert_eq!(out.delta(), None);
    assert_eq!(ValueBoxes::from_result(&out.change).change, PLACEHOLDER);
    // The grid still shows the one row.
    assert_eq!(GridView::from_dataset(&out.dataset).len(), 1);

    assert!(h.engine.change(&selector).unwrap_err().is_insufficient_data());
}

#[test]
fn end_date_is_excluded_from_the_range() {
    // Mon 2024-01-08 .. Tue 2024-01-09 covers the Monday session only.
    let mut engine =
        DerivedValueEngine::new(SessionConfig::default(), Box::new(SyntheticProvider::default()));
    let selector = SelectorState::ticker("AAPL", DateRange::new(d(2024, 1, 8), d(2024, 1, 9)));

    let out = engine.compute(&selector).unwrap();
    assert_eq!(out.dataset.len(), 1);
    assert!(matches!(out.change, Err(MetricError::InsufficientData { .. })));

    // Ending on today leaves today's session out.
    let mut h = harness(SessionConfig::default());
    let through_friday =
        SelectorState::ticker("AAPL", DateRange::new(d(2024, 6, 26), d(2024, 6, 28)));
    let change = h.engine.change(&through_friday).unwrap();
    assert_eq!(change.latest, 150.0);
    assert_eq!(change.previous, 148.0);
}

#[test]
fn upstream_failure_is_not_cached() {
    let mut h = harness(SessionConfig::default());
    let selector = h.engine.default_selector(today());

    h.failing.store(true, Ordering::SeqCst);
    let err = h.engine.compute(&selector).unwrap_err();
    assert!(matches!(
        err,
        EngineError::UpstreamFetch(DataError::NetworkUnreachable(_))
    ));
    assert_eq!(h.engine.cached_entries(), 0);

    // Next read retries the fetch.
    h.failing.store(false, Ordering::SeqCst);
    assert!(h.engine.compute(&selector).is_ok());
    assert_eq!(h.calls.load(Ordering::SeqCst), 2);
}

#[test]
fn unknown_symbol_is_an_upstream_error() {
    let mut h = harness(SessionConfig::default());
    let selector = SelectorState::ticker("zzzz", DateRange::last_weeks(today(), 26));
    assert!(matches!(
        h.engine.compute(&selector),
        Err(EngineError::UpstreamFetch(DataError::SymbolNotFound { symbol })) if symbol == "ZZZZ"
    ));
}

#[test]
fn bin_count_change_reuses_dataset() {
    let mut h = harness(SessionConfig::default());
    let base = h.engine.default_selector(today());
    let a = h.engine.compute(&base.clone().with_bins(5)).unwrap();
    let b = h.engine.compute(&base.with_bins(40)).unwrap();
    assert!(Arc::ptr_eq(&a.dataset, &b.dataset));
    assert_eq!(h.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn range_change_refetches() {
    let mut h = harness(SessionConfig::default());
    let range = DateRange::last_weeks(today(), 26);
    h.engine
        .compute(&SelectorState::ticker("AAPL", range))
        .unwrap();
    h.engine
        .compute(&SelectorState::ticker("AAPL", range.shift_start(-7)))
        .unwrap();
    assert_eq!(h.calls.load(Ordering::SeqCst), 2);
}

#[test]
fn oldest_selector_is_evicted_at_capacity() {
    let config = SessionConfig {
        cache_capacity: 2,
        ..SessionConfig::default()
    };
    let mut h = harness(config);
    let range = DateRange::last_weeks(today(), 26);
    for symbol in ["AAPL", "MSFT", "NVDA", "AAPL"] {
        h.engine
            .compute(&SelectorState::ticker(symbol, range))
            .unwrap();
    }
    assert_eq!(h.calls.load(Ordering::SeqCst), 4);
    assert_eq!(h.engine.cache_stats().evictions, 2);
    assert_eq!(h.engine.cached_entries(), 2);
}

#[test]
fn refresh_refetches_unchanged_selector() {
    let mut h = harness(SessionConfig::default());
    let selector = h.engine.default_selector(today());
    h.engine.compute(&selector).unwrap();
    h.engine.invalidate();
    h.engine.compute(&selector).unwrap();
    assert_eq!(h.calls.load(Ordering::SeqCst), 2);
}

#[test]
fn tips_male_sunday_sum_of_bills() {
    let table = StaticTable::tips().unwrap();
    let expected: f64 = {
        let data = table.data();
        let sex = data.column_index("sex").unwrap();
        let day = data.column_index("day").unwrap();
        let bill = data.column_index("total_bill").unwrap();
        data.rows()
            .iter()
            .filter(|r| {
                r[sex] == Value::Text("Male".into()) && r[day] == Value::Text("Sun".into())
            })
            .map(|r| r[bill].as_f64().unwrap())
            .sum()
    };

    let mut h = harness(SessionConfig::default());
    h.engine = h.engine.with_table(table);
    let selector = SelectorState::category(
        CategoryQuery::new()
            .with_equal("sex", "Male")
            .with_equal("day", "Sun"),
    );
    let summary = h.engine.summary(&selector).unwrap();
    assert!(summary.rows > 0);
    assert_eq!(summary.sum, expected);

    // Table reads never hit the remote provider.
    assert_eq!(h.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn category_filter_with_no_match_is_insufficient() {
    let mut h = harness(SessionConfig::default());
    h.engine = h.engine.with_table(StaticTable::tips().unwrap());
    let selector = SelectorState::category(CategoryQuery::new().with_equal("day", "Mon"));
    let err = h.engine.summary(&selector).unwrap_err();
    assert!(err.is_insufficient_data());
}
