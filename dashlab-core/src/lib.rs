//! Dashlab Core: data adapters, selector state, the memoized derived value
//! engine, and the chart/table models the dashboards render.
//!
//! - Domain types (bars, datasets, selector state and its cache key)
//! - Adapters: remote price providers and a static CSV table
//! - `DerivedValueEngine`: selector state -> dataset -> change metrics, memoized per session
//! - Indicators (SMA, histogram, trend line) and presentation models

pub mod config;
pub mod data;
pub mod domain;
pub mod engine;
pub mod indicators;
pub mod view;

pub use config::{ConfigError, SessionConfig, TableConfig};
pub use engine::{Derived, DerivedValueEngine, EngineError, MetricError};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: values handed to the presentation layer are Send + Sync,
    /// so a renderer may move them to another thread.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<domain::Dataset>();
        require_sync::<domain::Dataset>();
        require_send::<domain::SelectorState>();
        require_sync::<domain::SelectorState>();
        require_send::<engine::Derived>();
        require_sync::<engine::Derived>();
        require_send::<view::PriceChartView>();
        require_sync::<view::PriceChartView>();
        require_send::<view::GridView>();
        require_sync::<view::GridView>();
    }
}
