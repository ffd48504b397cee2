//! Tabular data models for the air quality pipeline.
//!
//! [`Table`] is the on-disk shape shared by the fetch and clean stages: the
//! timestamp column is kept as raw text and every other column is a nullable
//! numeric series. [`Dataset`] is the dashboard's view of the same file, with
//! timestamps parsed and rows sorted ascending.

use std::fs::{self, File};
use std::ops::Range;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Timestamp layout used by the history API and every CSV in the pipeline.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ---

/// One named parameter series, one entry per row.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    // ---
    pub name: String,
    pub values: Vec<Option<f64>>,
}

impl Column {
    // ---
    pub fn new(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Column {
            name: name.into(),
            values,
        }
    }

    pub fn null_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_none()).count()
    }

    /// Arithmetic mean over the non-null values, `None` when there are none.
    pub fn mean(&self) -> Option<f64> {
        // ---
        let (sum, count) = self
            .values
            .iter()
            .flatten()
            .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));

        (count > 0).then(|| sum / count as f64)
    }
}

// ---

/// Raw or cleaned readings as they are stored on disk.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    // ---
    pub timestamp_column: String,
    pub timestamps: Vec<String>,
    pub columns: Vec<Column>,
}

impl Table {
    // ---
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.name == name)
    }

    /// Header row, timestamp column first.
    pub fn headers(&self) -> Vec<&str> {
        std::iter::once(self.timestamp_column.as_str())
            .chain(self.columns.iter().map(|c| c.name.as_str()))
            .collect()
    }

    /// Build a table from the records of one station in the history API
    /// response.
    ///
    /// Column order follows first appearance across the records. A record
    /// missing a parameter key gets a null for it; a record missing the
    /// timestamp key is an error.
    pub fn from_records(records: &[Map<String, Value>], timestamp_column: &str) -> Result<Table> {
        // ---
        let mut names: Vec<&str> = Vec::new();
        for record in records {
            for key in record.keys() {
                if key != timestamp_column && !names.contains(&key.as_str()) {
                    names.push(key.as_str());
                }
            }
        }

        let mut timestamps = Vec::with_capacity(records.len());
        let mut columns: Vec<Column> = names
            .iter()
            .map(|name| Column::new(*name, Vec::with_capacity(records.len())))
            .collect();

        for (i, record) in records.iter().enumerate() {
            let row = i + 1;
            let timestamp = match record.get(timestamp_column) {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Null) | None => {
                    return Err(Error::MissingColumn {
                        source_name: format!("record {row}"),
                        column: timestamp_column.to_string(),
                    })
                }
                Some(other) => other.to_string(),
            };
            timestamps.push(timestamp);

            for column in columns.iter_mut() {
                let value = match record.get(&column.name) {
                    Some(value) => json_cell(value, &column.name, row)?,
                    None => None,
                };
                column.values.push(value);
            }
        }

        Ok(Table {
            timestamp_column: timestamp_column.to_string(),
            timestamps,
            columns,
        })
    }

    /// Read a CSV with a header row. Every column other than
    /// `timestamp_column` must hold numbers or empty cells.
    pub fn read_csv(path: &Path, timestamp_column: &str) -> Result<Table> {
        // ---
        let file = File::open(path).map_err(|e| Error::ReadFile(path.to_path_buf(), e))?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(file);

        let headers = reader
            .headers()
            .map_err(|e| Error::Csv(path.to_path_buf(), e))?
            .clone();

        let ts_index = headers
            .iter()
            .position(|h| h == timestamp_column)
            .ok_or_else(|| Error::MissingColumn {
                source_name: path.display().to_string(),
                column: timestamp_column.to_string(),
            })?;

        let mut timestamps = Vec::new();
        let mut columns: Vec<(usize, Column)> = headers
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != ts_index)
            .map(|(i, name)| (i, Column::new(name, Vec::new())))
            .collect();

        for (i, record) in reader.records().enumerate() {
            let record = record.map_err(|e| Error::Csv(path.to_path_buf(), e))?;
            let row = i + 1;

            timestamps.push(record.get(ts_index).unwrap_or_default().to_string());
            for (index, column) in columns.iter_mut() {
                let cell = record.get(*index).unwrap_or_default();
                column.values.push(parse_cell(cell, &column.name, row)?);
            }
        }

        tracing::debug!(
            "Read {} rows x {} columns from {}",
            timestamps.len(),
            columns.len() + 1,
            path.display()
        );

        Ok(Table {
            timestamp_column: timestamp_column.to_string(),
            timestamps,
            columns: columns.into_iter().map(|(_, c)| c).collect(),
        })
    }

    /// Write the table as CSV without an index column, replacing any existing
    /// file. Missing values are written as empty cells.
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        // ---
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| Error::WriteFile(path.to_path_buf(), e))?;
        }

        let file = File::create(path).map_err(|e| Error::WriteFile(path.to_path_buf(), e))?;
        let mut writer = csv::Writer::from_writer(file);
        let csv_err = |e| Error::Csv(path.to_path_buf(), e);

        writer.write_record(self.headers()).map_err(csv_err)?;

        for (row, timestamp) in self.timestamps.iter().enumerate() {
            let mut record = Vec::with_capacity(self.columns.len() + 1);
            record.push(timestamp.clone());
            for column in &self.columns {
                record.push(column.values[row].map(|v| v.to_string()).unwrap_or_default());
            }
            writer.write_record(&record).map_err(csv_err)?;
        }

        writer
            .flush()
            .map_err(|e| Error::WriteFile(path.to_path_buf(), e))?;
        Ok(())
    }
}

/// Cell texts read as a missing value, the same set pandas treats as NA.
const NA_VALUES: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn parse_cell(cell: &str, column: &str, row: usize) -> Result<Option<f64>> {
    // ---
    let cell = cell.trim();
    if NA_VALUES.contains(&cell) || cell.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }

    cell.parse::<f64>()
        .map(Some)
        .map_err(|_| Error::InvalidNumber {
            column: column.to_string(),
            row,
            value: cell.to_string(),
        })
}

fn json_cell(value: &Value, column: &str, row: usize) -> Result<Option<f64>> {
    // ---
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => Ok(n.as_f64()),
        Value::String(s) => parse_cell(s, column, row),
        other => Err(Error::InvalidNumber {
            column: column.to_string(),
            row,
            value: other.to_string(),
        }),
    }
}

// ---

/// Readings loaded for the dashboard: parsed timestamps, sorted ascending.
///
/// Immutable after construction.
#[derive(Debug, Clone)]
pub struct Dataset {
    // ---
    timestamp_column: String,
    timestamps: Vec<NaiveDateTime>,
    columns: Vec<Column>,
}

impl Dataset {
    // ---
    /// Parse timestamps with [`TIMESTAMP_FORMAT`] and sort rows by them.
    /// Rows with equal timestamps keep their file order.
    pub fn from_table(table: Table) -> Result<Dataset> {
        // ---
        let parsed = table
            .timestamps
            .iter()
            .enumerate()
            .map(|(i, raw)| {
                NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT).map_err(|source| {
                    Error::InvalidTimestamp {
                        row: i + 1,
                        value: raw.clone(),
                        source,
                    }
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut order: Vec<usize> = (0..parsed.len()).collect();
        order.sort_by_key(|&i| parsed[i]);

        let timestamps = order.iter().map(|&i| parsed[i]).collect();
        let columns = table
            .columns
            .into_iter()
            .map(|c| {
                let values = order.iter().map(|&i| c.values[i]).collect();
                Column::new(c.name, values)
            })
            .collect();

        Ok(Dataset {
            timestamp_column: table.timestamp_column,
            timestamps,
            columns,
        })
    }

    /// Read and prepare a dataset from a CSV file.
    pub fn load(path: &Path, timestamp_column: &str) -> Result<Dataset> {
        Dataset::from_table(Table::read_csv(path, timestamp_column)?)
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn timestamp_column(&self) -> &str {
        &self.timestamp_column
    }

    pub fn timestamps(&self) -> &[NaiveDateTime] {
        &self.timestamps
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Selectable parameter names in column order.
    pub fn parameters(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Dates of the first and last reading.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (self.timestamps.first(), self.timestamps.last()) {
            (Some(first), Some(last)) => Some((first.date(), last.date())),
            _ => None,
        }
    }

    /// Row indexes with `start <= timestamp <= end`. Empty when `start > end`.
    pub fn range(&self, start: NaiveDateTime, end: NaiveDateTime) -> Range<usize> {
        // ---
        let lo = self.timestamps.partition_point(|t| *t < start);
        let hi = self.timestamps.partition_point(|t| *t <= end);
        if lo >= hi {
            lo..lo
        } else {
            lo..hi
        }
    }
}
