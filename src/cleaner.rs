//! Cleaning stage: column pruning and imputation of a raw readings table.
//!
//! Steps run in a fixed order:
//! 1. drop every parameter column that has no value at all,
//! 2. forward-fill zero readings of the temperature column,
//! 3. replace remaining nulls with the column mean rounded to 2 decimals.
//!
//! A zero in the temperature column that precedes the first valid reading has
//! nothing to fill from. It is not a null either, so the mean imputation
//! leaves it untouched and it survives into the cleaned output. The count is
//! reported in [`CleanReport::leading_zeros`]. A zero that follows a null
//! takes the null, so the mean imputation fills both.

use std::path::Path;

use crate::error::Result;
use crate::models::{Column, Table};

/// Summary of what [`clean`] changed.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CleanReport {
    // ---
    pub dropped_columns: Vec<String>,
    pub forward_filled: usize,
    pub leading_zeros: usize,
    pub imputed: usize,
}

/// Clean `table` in place.
///
/// `temperature_column` names the series whose zero readings are sensor
/// dropouts. When that column is absent the forward-fill step is skipped.
pub fn clean(table: &mut Table, temperature_column: &str) -> CleanReport {
    // ---
    let mut report = CleanReport::default();
    let rows = table.len();

    table.columns.retain(|c| {
        let empty = c.null_count() == rows;
        if empty {
            report.dropped_columns.push(c.name.clone());
        }
        !empty
    });

    if let Some(column) = table.column_mut(temperature_column) {
        let (filled, leading) = forward_fill_zeros(column);
        report.forward_filled = filled;
        report.leading_zeros = leading;
    }

    for column in table.columns.iter_mut() {
        report.imputed += impute_mean(column);
    }

    report
}

/// Read the raw CSV at `input`, clean it and write the result to `output`.
pub fn clean_file(
    input: &Path,
    output: &Path,
    timestamp_column: &str,
    temperature_column: &str,
) -> Result<CleanReport> {
    // ---
    let mut table = Table::read_csv(input, timestamp_column)?;
    tracing::info!(
        "Loaded {} rows, {} parameter columns from {}",
        table.len(),
        table.columns.len(),
        input.display()
    );

    let report = clean(&mut table, temperature_column);
    table.write_csv(output)?;

    tracing::info!(
        "Wrote {} rows, {} parameter columns to {}",
        table.len(),
        table.columns.len(),
        output.display()
    );
    Ok(report)
}

/// Replace each zero with the cell before it, after that cell's own fill.
///
/// A zero following a null becomes null and is left to mean imputation.
/// Returns `(filled, leading)`: zeros replaced and zeros left because no
/// reading came before them.
fn forward_fill_zeros(column: &mut Column) -> (usize, usize) {
    // ---
    // None until the first non-zero cell; then the value carried forward.
    let mut prior: Option<Option<f64>> = None;
    let mut filled = 0;
    let mut leading = 0;

    for value in column.values.iter_mut() {
        match (*value, prior) {
            (Some(v), Some(prev)) if v == 0.0 => {
                *value = prev;
                filled += 1;
            }
            (Some(v), None) if v == 0.0 => leading += 1,
            (current, _) => prior = Some(current),
        }
    }

    (filled, leading)
}

/// Replace nulls with the column mean rounded to 2 decimals. Returns the
/// number of values replaced.
fn impute_mean(column: &mut Column) -> usize {
    // ---
    let Some(mean) = column.mean() else {
        return 0;
    };
    let fill = round2(mean);

    let mut imputed = 0;
    for value in column.values.iter_mut().filter(|v| v.is_none()) {
        *value = Some(fill);
        imputed += 1;
    }
    imputed
}

/// Round to 2 decimals, ties to even.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}
