//! Derived value engine.
//!
//! One session-scoped object that turns a `SelectorState` into a dataset and
//! the metrics derived from it. The dataset is the only memoized node: every
//! derived value (change, summary, chart models) is a pure function of it, so
//! they all share one upstream read per distinct selector state.

use std::sync::Arc;

use chrono::NaiveDate;
use log::{info, warn};

use super::error::{EngineError, MetricError};
use super::memo::{CacheStats, SelectorCache};
use super::metrics::{PriceChange, TableSummary};
use crate::config::SessionConfig;
use crate::data::{DataProvider, StaticTable};
use crate::domain::{Dataset, Query, SelectorState};

/// Output of `DerivedValueEngine::compute`.
///
/// The dataset is present whenever the upstream read succeeded; the change is
/// a separate result so a short dataset still renders its chart and grid
/// while the value boxes show a placeholder.
#[derive(Debug, Clone, PartialEq)]
pub struct Derived {
    pub dataset: Arc<Dataset>,
    pub field: String,
    pub change: Result<PriceChange, MetricError>,
}

impl Derived {
    pub fn latest(&self) -> Option<f64> {
        self.change.as_ref().ok().map(|c| c.latest)
    }

    pub fn delta(&self) -> Option<f64> {
        self.change.as_ref().ok().map(|c| c.delta)
    }
}

/// Memoized selector-state -> dataset -> metrics pipeline for one session.
pub struct DerivedValueEngine {
    config: SessionConfig,
    remote: Box<dyn DataProvider>,
    table: Option<StaticTable>,
    cache: SelectorCache<Arc<Dataset>>,
}

impl DerivedValueEngine {
    pub fn new(config: SessionConfig, remote: Box<dyn DataProvider>) -> Self {
        let cache = SelectorCache::new(config.cache_capacity);
        Self {
            config,
            remote,
            table: None,
            cache,
        }
    }

    /// Attach the static table answering category queries.
    pub fn with_table(mut self, table: StaticTable) -> Self {
        self.table = Some(table);
        self
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn table(&self) -> Option<&StaticTable> {
        self.table.as_ref()
    }

    pub fn provider_name(&self) -> &str {
        self.remote.name()
    }

    pub fn default_selector(&self, today: NaiveDate) -> SelectorState {
        self.config.default_selector(today)
    }

    /// Column the change metrics are computed over for this query.
    pub fn primary_field(&self, query: &Query) -> &str {
        match query {
            Query::Ticker { .. } => &self.config.primary_field,
            Query::Category(_) => &self.config.table.value_field,
        }
    }

    /// The dataset for a selector state, fetched or filtered at most once per
    /// distinct state while it stays in the cache. Failures are not cached.
    pub fn dataset(&mut self, selector: &SelectorState) -> Result<Arc<Dataset>, EngineError> {
        let key = selector.cache_key();
        if let Some(ds) = self.cache.get(&key) {
            return Ok(ds);
        }

        let ds = Arc::new(self.load(&selector.query)?);
        self.cache.insert(key, Arc::clone(&ds));
        Ok(ds)
    }

    fn load(&self, query: &Query) -> Result<Dataset, EngineError> {
        match query {
            Query::Ticker { symbol, range } => {
                info!("fetching {symbol} {range} via {}", self.remote.name());
                let res = self
                    .remote
                    .fetch(symbol, range.start, range.end)
                    .map_err(|e| {
                        warn!("fetch {symbol} failed: {e}");
                        e
                    })?;
                info!("{symbol}: {} rows from {:?}", res.bars.len(), res.source);
                Ok(Dataset::from_bars(&res.bars))
            }
            Query::Category(q) => {
                let table = self.table.as_ref().ok_or(EngineError::NoStaticTable)?;
                let ds = table.filter(q)?;
                info!("{}: {} of {} rows match", table.name(), ds.len(), table.data().len());
                Ok(ds)
            }
        }
    }

    /// Latest, previous, delta and percent delta of the primary field.
    pub fn change(&mut self, selector: &SelectorState) -> Result<PriceChange, EngineError> {
        let ds = self.dataset(selector)?;
        let field = self.primary_field(&selector.query);
        Ok(PriceChange::from_dataset(&ds, field)?)
    }

    /// Row count, sum, mean and mean ratio of the table value field.
    pub fn summary(&mut self, selector: &SelectorState) -> Result<TableSummary, EngineError> {
        let ds = self.dataset(selector)?;
        let table = &self.config.table;
        Ok(TableSummary::from_dataset(
            &ds,
            &table.value_field,
            table.ratio_field.as_deref(),
        )?)
    }

    /// Dataset plus change metrics. Upstream failures are an `Err`; a dataset
    /// too short for a change is an `Ok` carrying the metric error.
    pub fn compute(&mut self, selector: &SelectorState) -> Result<Derived, EngineError> {
        let dataset = self.dataset(selector)?;
        let field = self.primary_field(&selector.query).to_string();
        let change = PriceChange::from_dataset(&dataset, &field);
        Ok(Derived {
            dataset,
            field,
            change,
        })
    }

    /// Forget every memoized dataset; the next read re-fetches.
    pub fn invalidate(&mut self) {
        info!("session cache invalidated");
        self.cache.clear();
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn cached_entries(&self) -> usize {
        self.cache.len()
    }
}
