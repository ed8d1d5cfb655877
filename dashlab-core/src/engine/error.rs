//! Engine error types.

use thiserror::Error;

use crate::data::DataError;

/// Failure of a pure metric over a dataset.
///
/// `Clone + PartialEq` so a memoized failure can be handed out repeatedly and
/// compared in tests.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MetricError {
    #[error("insufficient data: {rows} row(s), need at least {required}")]
    InsufficientData { rows: usize, required: usize },

    #[error("missing column '{0}'")]
    MissingColumn(String),

    #[error("column '{column}' is not numeric at row {row}")]
    NotNumeric { column: String, row: usize },

    #[error("previous value is zero, percent change is undefined")]
    ZeroBaseline,
}

/// Failure of a `DerivedValueEngine` read.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Metric(#[from] MetricError),

    #[error("upstream fetch failed: {0}")]
    UpstreamFetch(#[from] DataError),

    #[error("no static table loaded for a category query")]
    NoStaticTable,
}

impl EngineError {
    /// True when the failure is recoverable by widening the selection.
    pub fn is_insufficient_data(&self) -> bool {
        matches!(
            self,
            EngineError::Metric(MetricError::InsufficientData { .. })
        )
    }
}
