//! Dataset: the tabular result handed from an adapter to the engine.
//!
//! Rows are observations in source order; columns are named fields. A dataset
//! is immutable once built: filtering produces a new dataset rather than
//! editing in place.

use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use super::bar::Bar;
use crate::data::provider::DataError;
use crate::engine::error::MetricError;

/// Column names used for price-history datasets.
pub const DATE: &str = "Date";
pub const OPEN: &str = "Open";
pub const HIGH: &str = "High";
pub const LOW: &str = "Low";
pub const CLOSE: &str = "Close";
pub const VOLUME: &str = "Volume";
pub const ADJ_CLOSE: &str = "Adj Close";

/// A single cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Value {
    Number(f64),
    Text(String),
    Date(NaiveDate),
    Null,
}

impl Value {
    /// Guess the type of a raw text cell: empty -> Null, then number, then date, else text.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() {
            return Value::Null;
        }
        if let Ok(n) = raw.parse::<f64>() {
            return Value::Number(n);
        }
        if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            return Value::Date(d);
        }
        Value::Text(raw.to_string())
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{n}"),
            Value::Text(s) => write!(f, "{s}"),
            Value::Date(d) => write!(f, "{d}"),
            Value::Null => write!(f, ""),
        }
    }
}

/// Ordered observations with named columns.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Dataset {
    /// Empty dataset with the given header.
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Build a dataset, checking that every row matches the header width.
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self, DataError> {
        let mut ds = Self::new(columns);
        for row in rows {
            ds.push_row(row)?;
        }
        Ok(ds)
    }

    /// Price-history dataset with the standard Date/Open/High/Low/Close/Volume/Adj Close header.
    pub fn from_bars(bars: &[Bar]) -> Self {
        let columns = [DATE, OPEN, HIGH, LOW, CLOSE, VOLUME, ADJ_CLOSE]
            .iter()
            .map(|c| c.to_string())
            .collect();
        let rows = bars
            .iter()
            .map(|b| {
                vec![
                    Value::Date(b.date),
                    number_or_null(b.open),
                    number_or_null(b.high),
                    number_or_null(b.low),
                    number_or_null(b.close),
                    Value::Number(b.volume as f64),
                    number_or_null(b.adj_close),
                ]
            })
            .collect();
        Self { columns, rows }
    }

    pub fn push_row(&mut self, row: Vec<Value>) -> Result<(), DataError> {
        if row.len() != self.columns.len() {
            return Err(DataError::ValidationError(format!(
                "row {} has {} cells but the header has {} columns",
                self.rows.len(),
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cell at `row` in the named column.
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(idx))
    }

    /// All values of a numeric column. Null cells become NaN; text cells are an error.
    pub fn numbers(&self, column: &str) -> Result<Vec<f64>, MetricError> {
        let idx = self
            .column_index(column)
            .ok_or_else(|| MetricError::MissingColumn(column.to_string()))?;
        self.rows
            .iter()
            .enumerate()
            .map(|(i, row)| match &row[idx] {
                Value::Number(n) => Ok(*n),
                Value::Null => Ok(f64::NAN),
                _ => Err(MetricError::NotNumeric {
                    column: column.to_string(),
                    row: i,
                }),
            })
            .collect()
    }

    /// Sorted distinct display values of a column (empty if the column is missing).
    pub fn distinct(&self, column: &str) -> Vec<String> {
        let Some(idx) = self.column_index(column) else {
            return Vec::new();
        };
        self.rows
            .iter()
            .map(|r| r[idx].to_string())
            .filter(|s| !s.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// New dataset holding only the rows accepted by `keep`, in original order.
    pub fn retain_rows(&self, mut keep: impl FnMut(&[Value]) -> bool) -> Dataset {
        Dataset {
            columns: self.columns.clone(),
            rows: self.rows.iter().filter(|r| keep(r)).cloned().collect(),
        }
    }

    /// Read the rows back as bars. Requires the price-history header.
    pub fn to_bars(&self) -> Result<Vec<Bar>, MetricError> {
        let date_idx = self
            .column_index(DATE)
            .ok_or_else(|| MetricError::MissingColumn(DATE.to_string()))?;
        let open = self.numbers(OPEN)?;
        let high = self.numbers(HIGH)?;
        let low = self.numbers(LOW)?;
        let close = self.numbers(CLOSE)?;
        let volume = self.numbers(VOLUME)?;
        let adj_close = self.numbers(ADJ_CLOSE).unwrap_or_else(|_| close.clone());

        self.rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let date = row[date_idx].as_date().ok_or_else(|| MetricError::NotNumeric {
                    column: DATE.to_string(),
                    row: i,
                })?;
                Ok(Bar {
                    date,
                    open: open[i],
                    high: high[i],
                    low: low[i],
                    close: close[i],
                    volume: if volume[i].is_finite() { volume[i] as u64 } else { 0 },
                    adj_close: adj_close[i],
                })
            })
            .collect()
    }
}

fn number_or_null(v: f64) -> Value {
    if v.is_nan() {
        Value::Null
    } else {
        Value::Number(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bars() -> Vec<Bar> {
        vec![
            Bar {
                date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                open: 149.0,
                high: 151.0,
                low: 148.0,
                close: 150.0,
                volume: 1_000,
                adj_close: 150.0,
            },
            Bar {
                date: NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
                open: 150.0,
                high: 154.0,
                low: 149.5,
                close: 153.0,
                volume: 1_200,
                adj_close: f64::NAN,
            },
        ]
    }

    #[test]
    fn value_parse_guesses_types() {
        assert_eq!(Value::parse("16.99"), Value::Number(16.99));
        assert_eq!(Value::parse(" Male "), Value::Text("Male".into()));
        assert_eq!(
            Value::parse("2024-01-02"),
            Value::Date(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap())
        );
        assert_eq!(Value::parse(""), Value::Null);
    }

    #[test]
    fn from_bars_uses_price_header() {
        let ds = Dataset::from_bars(&bars());
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.columns()[4], CLOSE);
        assert_eq!(ds.numbers(CLOSE).unwrap(), vec![150.0, 153.0]);
        // NaN prices are stored as Null
        assert_eq!(ds.value(1, ADJ_CLOSE), Some(&Value::Null));
    }

    #[test]
    fn bars_survive_dataset_conversion() {
        let ds = Dataset::from_bars(&bars());
        let back = ds.to_bars().unwrap();
        assert_eq!(back.len(), 2);
        assert_eq!(back[1].close, 153.0);
        assert_eq!(back[1].volume, 1_200);
        assert!(back[1].adj_close.is_nan());
    }

    #[test]
    fn ragged_row_is_rejected() {
        let mut ds = Dataset::new(vec!["a".into(), "b".into()]);
        assert!(ds.push_row(vec![Value::Number(1.0)]).is_err());
        assert!(ds.is_empty());
    }

    #[test]
    fn numbers_rejects_text_and_missing_column() {
        let ds = Dataset::from_rows(
            vec!["x".into()],
            vec![vec![Value::Number(1.0)], vec![Value::Text("oops".into())]],
        )
        .unwrap();
        assert_eq!(
            ds.numbers("x"),
            Err(MetricError::NotNumeric {
                column: "x".into(),
                row: 1
            })
        );
        assert_eq!(
            ds.numbers("y"),
            Err(MetricError::MissingColumn("y".into()))
        );
    }

    #[test]
    fn distinct_is_sorted_and_skips_nulls() {
        let ds = Dataset::from_rows(
            vec!["day".into()],
            vec![
                vec![Value::Text("Sun".into())],
                vec![Value::Text("Sat".into())],
                vec![Value::Null],
                vec![Value::Text("Sun".into())],
            ],
        )
        .unwrap();
        assert_eq!(ds.distinct("day"), vec!["Sat".to_string(), "Sun".to_string()]);
        assert!(ds.distinct("missing").is_empty());
    }
}
