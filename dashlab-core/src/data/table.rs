//! Static in-memory table adapter.
//!
//! Loads a CSV once (header row with column names, one observation per line)
//! and answers category/range filters against it. Cell types are guessed per
//! cell: empty -> null, numeric, ISO date, otherwise text.

use std::io::Read;
use std::path::Path;

use log::debug;

use super::provider::DataError;
use crate::domain::{CategoryQuery, Dataset, Value};

/// First 102 rows of the 244-row restaurant tips dataset.
const TIPS_CSV: &str = include_str!("../../data/tips.csv");

/// A fixed dataset that can be filtered by categorical fields.
#[derive(Debug, Clone)]
pub struct StaticTable {
    name: String,
    data: Dataset,
}

impl StaticTable {
    pub fn new(name: impl Into<String>, data: Dataset) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    /// Parse a CSV stream with a header row.
    pub fn from_reader<R: Read>(name: impl Into<String>, reader: R) -> Result<Self, DataError> {
        let mut rdr = csv::Reader::from_reader(reader);
        let columns: Vec<String> = rdr
            .headers()
            .map_err(|e| DataError::Csv(format!("reading headers: {e}")))?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut data = Dataset::new(columns);
        for (row_no, record) in rdr.records().enumerate() {
            let record = record.map_err(|e| DataError::Csv(format!("row {row_no}: {e}")))?;
            data.push_row(record.iter().map(Value::parse).collect())?;
        }

        let name = name.into();
        debug!("loaded table '{name}': {} rows", data.len());
        Ok(Self { name, data })
    }

    pub fn from_path(path: &Path) -> Result<Self, DataError> {
        let file = std::fs::File::open(path)
            .map_err(|e| DataError::Csv(format!("opening {}: {e}", path.display())))?;
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("table")
            .to_string();
        Self::from_reader(name, file)
    }

    /// The bundled tips sample. It holds the first 102 of the 244 rows of the
    /// restaurant tips dataset, so its totals are not those of the full set.
    pub fn tips() -> Result<Self, DataError> {
        Self::from_reader("tips sample", TIPS_CSV.as_bytes())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The unfiltered table.
    pub fn data(&self) -> &Dataset {
        &self.data
    }

    /// Distinct values of a column, for filter widgets.
    pub fn choices(&self, column: &str) -> Vec<String> {
        self.data.distinct(column)
    }

    /// Smallest and largest finite value of a numeric column.
    pub fn bounds(&self, column: &str) -> Option<(f64, f64)> {
        let values = self.data.numbers(column).ok()?;
        values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// Rows matching every equality and range constraint, in table order.
    ///
    /// Equality compares the cell's display text; ranges are inclusive and
    /// reject null or non-numeric cells.
    pub fn filter(&self, query: &CategoryQuery) -> Result<Dataset, DataError> {
        let mut equals = Vec::with_capacity(query.equals.len());
        for (column, wanted) in &query.equals {
            let idx = self
                .data
                .column_index(column)
                .ok_or_else(|| DataError::UnknownColumn(column.clone()))?;
            equals.push((idx, wanted.as_str()));
        }

        let mut ranges = Vec::with_capacity(query.ranges.len());
        for (column, range) in &query.ranges {
            let idx = self
                .data
                .column_index(column)
                .ok_or_else(|| DataError::UnknownColumn(column.clone()))?;
            ranges.push((idx, *range));
        }

        let filtered = self.data.retain_rows(|row| {
            equals
                .iter()
                .all(|(idx, wanted)| row[*idx].to_string() == *wanted)
                && ranges.iter().all(|(idx, range)| {
                    row[*idx].as_f64().is_some_and(|v| range.contains(v))
                })
        });
        Ok(filtered)
    }
}
