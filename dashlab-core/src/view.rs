//! Presentation models.
//!
//! Plain data built from engine outputs, ready for any renderer: formatted
//! value boxes, the price chart (candles, moving averages, volume), the
//! scatter plot, the histogram and the data grid. Nothing here draws.

use serde::Serialize;

use crate::domain::dataset::DATE;
use crate::domain::{Bar, Dataset};
use crate::engine::{MetricError, PriceChange, TableSummary};
use crate::indicators::{Histogram, Sma, TrendLine};

/// Shown in a value box when the metric is undefined.
pub const PLACEHOLDER: &str = "--";

/// Arrow shown next to the change value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn arrow(&self) -> &'static str {
        match self {
            Direction::Up => "▲",
            Direction::Down => "▼",
        }
    }
}

/// Current price, change and percent change, formatted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueBoxes {
    pub price: String,
    pub change: String,
    pub percent: String,
    /// `None` when the change is undefined.
    pub direction: Option<Direction>,
}

impl ValueBoxes {
    pub fn placeholder() -> Self {
        Self {
            price: PLACEHOLDER.into(),
            change: PLACEHOLDER.into(),
            percent: PLACEHOLDER.into(),
            direction: None,
        }
    }

    pub fn from_change(change: &PriceChange) -> Self {
        Self {
            price: format!("{:.2}", change.latest),
            change: format!("${:.2}", change.delta),
            percent: format!("{:.2}%", change.percent_delta),
            direction: Some(if change.is_up() {
                Direction::Up
            } else {
                Direction::Down
            }),
        }
    }

    /// Any metric failure renders as placeholders.
    pub fn from_result(change: &Result<PriceChange, MetricError>) -> Self {
        match change {
            Ok(c) => Self::from_change(c),
            Err(_) => Self::placeholder(),
        }
    }
}

/// Row count, total, average and average ratio of a filtered table, formatted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryBoxes {
    pub rows: String,
    pub total: String,
    pub mean: String,
    pub mean_ratio: String,
}

impl SummaryBoxes {
    pub fn placeholder() -> Self {
        Self {
            rows: "0".into(),
            total: PLACEHOLDER.into(),
            mean: PLACEHOLDER.into(),
            mean_ratio: PLACEHOLDER.into(),
        }
    }

    pub fn from_summary(summary: &TableSummary) -> Self {
        Self {
            rows: summary.rows.to_string(),
            total: format!("${:.2}", summary.sum),
            mean: format!("${:.2}", summary.mean),
            mean_ratio: summary
                .mean_ratio_pct
                .map(|p| format!("{p:.2}%"))
                .unwrap_or_else(|| PLACEHOLDER.into()),
        }
    }

    /// Any failure (metric or upstream) renders as placeholders.
    pub fn from_result<E>(summary: &Result<TableSummary, E>) -> Self {
        match summary {
            Ok(s) => Self::from_summary(s),
            Err(_) => Self::placeholder(),
        }
    }
}

/// One moving-average overlay.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SmaLine {
    pub label: String,
    pub period: usize,
    /// Aligned with the candles; NaN during warmup.
    pub values: Vec<f64>,
}

/// Candles, moving averages and volume for one ticker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceChartView {
    pub symbol: String,
    pub candles: Vec<Bar>,
    pub sma: Vec<SmaLine>,
}

impl PriceChartView {
    pub fn from_dataset(
        dataset: &Dataset,
        symbol: &str,
        sma_periods: &[usize],
    ) -> Result<Self, MetricError> {
        let candles: Vec<Bar> = dataset
            .to_bars()?
            .into_iter()
            .filter(|b| !b.is_void())
            .collect();
        let closes: Vec<f64> = candles.iter().map(|b| b.close).collect();
        let sma = sma_periods
            .iter()
            .map(|&p| {
                let ind = Sma::new(p);
                SmaLine {
                    label: ind.name().to_string(),
                    period: ind.period(),
                    values: ind.compute(&closes),
                }
            })
            .collect();
        Ok(Self {
            symbol: symbol.to_string(),
            candles,
            sma,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    /// Lowest low and highest high across the candles and finite SMA points.
    pub fn price_range(&self) -> Option<(f64, f64)> {
        let lows = self.candles.iter().map(|b| b.low);
        let highs = self.candles.iter().map(|b| b.high);
        let sma = self.sma.iter().flat_map(|l| l.values.iter().copied());
        min_max(lows.chain(highs).chain(sma))
    }

    pub fn max_volume(&self) -> u64 {
        self.candles.iter().map(|b| b.volume).max().unwrap_or(0)
    }
}

/// Two numeric columns plotted against each other.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterView {
    pub x_field: String,
    pub y_field: String,
    /// Rows where both values are finite.
    pub points: Vec<(f64, f64)>,
    pub trend: Option<TrendLine>,
}

impl ScatterView {
    pub fn from_dataset(dataset: &Dataset, x_field: &str, y_field: &str) -> Result<Self, MetricError> {
        let xs = dataset.numbers(x_field)?;
        let ys = dataset.numbers(y_field)?;
        let points = xs
            .iter()
            .zip(&ys)
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .map(|(&x, &y)| (x, y))
            .collect();
        Ok(Self {
            x_field: x_field.to_string(),
            y_field: y_field.to_string(),
            points,
            trend: TrendLine::fit(&xs, &ys),
        })
    }

    pub fn x_bounds(&self) -> Option<(f64, f64)> {
        min_max(self.points.iter().map(|p| p.0))
    }

    pub fn y_bounds(&self) -> Option<(f64, f64)> {
        min_max(self.points.iter().map(|p| p.1))
    }
}

/// Distribution of one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramView {
    pub field: String,
    pub histogram: Histogram,
}

impl HistogramView {
    pub fn from_dataset(dataset: &Dataset, field: &str, bins: usize) -> Result<Self, MetricError> {
        let values = dataset.numbers(field)?;
        Ok(Self {
            field: field.to_string(),
            histogram: Histogram::compute(&values, bins),
        })
    }
}

/// The dataset as display strings.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct GridView {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl GridView {
    /// Numbers are shown with two decimals except in integer-valued columns.
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let integral: Vec<bool> = dataset
            .columns()
            .iter()
            .map(|c| {
                dataset
                    .numbers(c)
                    .map(|v| v.iter().all(|x| !x.is_finite() || x.fract() == 0.0))
                    .unwrap_or(false)
            })
            .collect();

        let rows = dataset
            .rows()
            .iter()
            .map(|row| {
                row.iter()
                    .zip(&integral)
                    .map(|(cell, &int)| match cell.as_f64() {
                        Some(n) if !int => format!("{n:.2}"),
                        _ => cell.to_string(),
                    })
                    .collect()
            })
            .collect();

        Self {
            headers: dataset.columns().to_vec(),
            rows,
        }
    }

    /// Newest rows first, for price tables.
    pub fn newest_first(mut self) -> Self {
        if self.headers.first().map(|h| h.as_str()) == Some(DATE) {
            self.rows.reverse();
        }
        self
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn min_max(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}
