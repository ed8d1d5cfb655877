//! Domain types: bars, tabular datasets, selector state.

pub mod bar;
pub mod dataset;
pub mod selector;

pub use bar::Bar;
pub use dataset::{Dataset, Value};
pub use selector::{CategoryQuery, DateRange, Query, SelectorKey, SelectorState, ValueRange};
