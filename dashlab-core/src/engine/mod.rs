//! Derived value engine: memoized selector-state -> dataset -> metrics.

pub mod derived;
pub mod error;
pub mod memo;
pub mod metrics;

pub use derived::{Derived, DerivedValueEngine};
pub use error::{EngineError, MetricError};
pub use memo::{CacheStats, SelectorCache};
pub use metrics::{PriceChange, TableSummary};
