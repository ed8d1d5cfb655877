//! Pure metrics over a dataset.
//!
//! `PriceChange` is the latest/previous/delta/percent quadruple shown in the
//! value boxes. `TableSummary` is its counterpart for the static table.

use serde::Serialize;

use super::error::MetricError;
use crate::domain::Dataset;

/// Latest value of a field against the observation before it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceChange {
    pub latest: f64,
    pub previous: f64,
    /// `latest - previous`
    pub delta: f64,
    /// `delta / previous * 100`
    pub percent_delta: f64,
}

impl PriceChange {
    /// Compute from the last two entries of `values`.
    ///
    /// `column` is only used to label a `NotNumeric` error.
    pub fn from_series(values: &[f64], column: &str) -> Result<Self, MetricError> {
        let n = values.len();
        if n < 2 {
            return Err(MetricError::InsufficientData {
                rows: n,
                required: 2,
            });
        }

        for row in [n - 2, n - 1] {
            if !values[row].is_finite() {
                return Err(MetricError::NotNumeric {
                    column: column.to_string(),
                    row,
                });
            }
        }

        let previous = values[n - 2];
        let latest = values[n - 1];
        if previous == 0.0 {
            return Err(MetricError::ZeroBaseline);
        }

        let delta = latest - previous;
        Ok(Self {
            latest,
            previous,
            delta,
            percent_delta: delta / previous * 100.0,
        })
    }

    /// Compute over the named numeric column of a dataset.
    pub fn from_dataset(dataset: &Dataset, field: &str) -> Result<Self, MetricError> {
        // Row count is checked before the column so an empty fetch reads as
        // insufficient data, not a missing column.
        if dataset.len() < 2 {
            return Err(MetricError::InsufficientData {
                rows: dataset.len(),
                required: 2,
            });
        }
        let values = dataset.numbers(field)?;
        Self::from_series(&values, field)
    }

    /// Up when the latest value did not fall.
    pub fn is_up(&self) -> bool {
        self.delta >= 0.0
    }
}

/// Aggregates over a filtered static table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TableSummary {
    pub rows: usize,
    /// Sum of the value field over rows where it is present.
    pub sum: f64,
    pub mean: f64,
    /// Mean of `ratio / value * 100` per row, when a ratio field is configured.
    pub mean_ratio_pct: Option<f64>,
}

impl TableSummary {
    pub fn from_dataset(
        dataset: &Dataset,
        value_field: &str,
        ratio_field: Option<&str>,
    ) -> Result<Self, MetricError> {
        if dataset.is_empty() {
            return Err(MetricError::InsufficientData {
                rows: 0,
                required: 1,
            });
        }

        let values = dataset.numbers(value_field)?;
        let present: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if present.is_empty() {
            return Err(MetricError::InsufficientData {
                rows: 0,
                required: 1,
            });
        }
        let sum: f64 = present.iter().sum();
        let mean = sum / present.len() as f64;

        let mean_ratio_pct = match ratio_field {
            Some(field) => {
                let ratios = dataset.numbers(field)?;
                let pcts: Vec<f64> = values
                    .iter()
                    .zip(&ratios)
                    .filter(|(v, r)| v.is_finite() && r.is_finite() && **v != 0.0)
                    .map(|(v, r)| r / v * 100.0)
                    .collect();
                if pcts.is_empty() {
                    None
                } else {
                    Some(pcts.iter().sum::<f64>() / pcts.len() as f64)
                }
            }
            None => None,
        };

        Ok(Self {
            rows: dataset.len(),
            sum,
            mean,
            mean_ratio_pct,
        })
    }
}
