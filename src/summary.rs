//! Date-range filtering and descriptive statistics for one parameter.
//!
//! [`filter_and_summarize`] is a pure function of the dataset and the user's
//! selection; the HTML pages and the JSON API are thin adapters over the
//! [`Selection`] it returns.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::cleaner::round2;
use crate::error::{Error, Result};
use crate::models::Dataset;

/// One point of the line chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    // ---
    pub timestamp: NaiveDateTime,
    pub value: Option<f64>,
}

/// Descriptive statistics of the selected values, rounded to 2 decimals.
///
/// Nulls are skipped. With no values `count` is 0 and every other field is
/// NaN; with a single value `std` is NaN (sample deviation).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    // ---
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub max: f64,
}

/// A labeled statistic, one row of the statistics table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistic {
    // ---
    pub statistic: &'static str,
    pub value: f64,
}

/// Result of one filter-and-summarize pass.
#[derive(Debug, Clone)]
pub struct Selection {
    // ---
    pub parameter: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub series: Vec<SeriesPoint>,
    pub summary: Summary,
}

// ---

/// Select the readings of `parameter` between `start_date` and `end_date`
/// and describe them.
///
/// The bounds are compared as datetimes at midnight, inclusive on both ends,
/// so readings later in the day of `end_date` are left out. An inverted range
/// yields an empty selection, not an error.
pub fn filter_and_summarize(
    dataset: &Dataset,
    parameter: &str,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<Selection> {
    // ---
    let column = dataset
        .column(parameter)
        .ok_or_else(|| Error::UnknownParameter(parameter.to_string()))?;

    let rows = dataset.range(midnight(start_date), midnight(end_date));

    let series: Vec<SeriesPoint> = rows
        .map(|i| SeriesPoint {
            timestamp: dataset.timestamps()[i],
            value: column.values[i],
        })
        .collect();

    let values: Vec<f64> = series.iter().filter_map(|p| p.value).collect();
    let summary = Summary::describe(&values);

    tracing::debug!(
        parameter,
        %start_date,
        %end_date,
        rows = series.len(),
        "filter_and_summarize"
    );

    Ok(Selection {
        parameter: parameter.to_string(),
        start_date,
        end_date,
        series,
        summary,
    })
}

fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(chrono::NaiveTime::MIN)
}

impl Summary {
    // ---
    pub fn describe(values: &[f64]) -> Summary {
        // ---
        let count = values.len();
        if count == 0 {
            return Summary {
                count,
                mean: f64::NAN,
                std: f64::NAN,
                min: f64::NAN,
                p25: f64::NAN,
                p50: f64::NAN,
                p75: f64::NAN,
                max: f64::NAN,
            };
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let n = count as f64;
        let mean = values.iter().sum::<f64>() / n;
        let std = if count > 1 {
            let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
            var.sqrt()
        } else {
            f64::NAN
        };

        Summary {
            count,
            mean: round2(mean),
            std: round2(std),
            min: round2(sorted[0]),
            p25: round2(quantile(&sorted, 0.25)),
            p50: round2(quantile(&sorted, 0.50)),
            p75: round2(quantile(&sorted, 0.75)),
            max: round2(sorted[count - 1]),
        }
    }

    /// Statistics in display order, labeled as in the table and bar chart.
    pub fn statistics(&self) -> Vec<Statistic> {
        // ---
        [
            ("count", self.count as f64),
            ("mean", self.mean),
            ("std", self.std),
            ("min", self.min),
            ("25%", self.p25),
            ("50%", self.p50),
            ("75%", self.p75),
            ("max", self.max),
        ]
        .into_iter()
        .map(|(statistic, value)| Statistic { statistic, value })
        .collect()
    }
}

/// Linear-interpolated quantile of an ascending, non-empty slice.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    // ---
    let pos = q * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::models::{Column, Table};

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn dataset(timestamps: &[&str], columns: Vec<Column>) -> Dataset {
        // ---
        Dataset::from_table(Table {
            timestamp_column: "DATETIMEDATA".into(),
            timestamps: timestamps.iter().map(|s| s.to_string()).collect(),
            columns,
        })
        .unwrap()
    }

    fn three_days() -> Dataset {
        dataset(
            &[
                "2024-01-01 00:00:00",
                "2024-01-02 00:00:00",
                "2024-01-03 00:00:00",
            ],
            vec![
                Column::new("X", vec![Some(10.0), Some(20.0), Some(30.0)]),
                Column::new("Y", vec![Some(1.0), Some(2.0), Some(3.0)]),
            ],
        )
    }

    #[test]
    fn test_two_day_window() {
        // ---
        let ds = three_days();
        let sel = filter_and_summarize(&ds, "X", date("2024-01-01"), date("2024-01-02")).unwrap();

        let points: Vec<(NaiveDateTime, Option<f64>)> =
            sel.series.iter().map(|p| (p.timestamp, p.value)).collect();
        assert_eq!(
            points,
            vec![
                (midnight(date("2024-01-01")), Some(10.0)),
                (midnight(date("2024-01-02")), Some(20.0)),
            ]
        );

        assert_eq!(sel.summary.count, 2);
        assert_eq!(sel.summary.mean, 15.0);
        assert_eq!(sel.summary.min, 10.0);
        assert_eq!(sel.summary.max, 20.0);
        assert_eq!(sel.summary.p50, 15.0);
        assert_eq!(sel.summary.p25, 12.5);
        assert_eq!(sel.summary.p75, 17.5);
        assert_eq!(sel.summary.std, 7.07);
    }

    #[test]
    fn test_inverted_range_is_empty_not_error() {
        // ---
        let ds = three_days();
        let sel = filter_and_summarize(&ds, "X", date("2024-01-03"), date("2024-01-01")).unwrap();

        assert!(sel.series.is_empty());
        assert_eq!(sel.summary.count, 0);
        assert!(sel.summary.mean.is_nan());
        assert!(sel.summary.p50.is_nan());
        assert!(sel.summary.max.is_nan());
        assert_eq!(sel.summary.statistics().len(), 8);
    }

    #[test]
    fn test_full_range_matches_direct_computation() {
        // ---
        let ds = three_days();
        let (start, end) = ds.date_bounds().unwrap();
        let sel = filter_and_summarize(&ds, "X", start, end).unwrap();

        assert_eq!(sel.series.len(), ds.len());
        assert_eq!(
            sel.summary,
            Summary::describe(&[10.0, 20.0, 30.0])
        );
        assert_eq!(sel.summary.mean, 20.0);
        assert_eq!(sel.summary.std, 10.0);
    }

    #[test]
    fn test_end_date_excludes_later_readings_that_day() {
        // ---
        let ds = dataset(
            &[
                "2024-01-01 00:00:00",
                "2024-01-01 23:00:00",
                "2024-01-02 00:00:00",
                "2024-01-02 01:00:00",
            ],
            vec![Column::new("X", vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0)])],
        );

        let sel = filter_and_summarize(&ds, "X", date("2024-01-01"), date("2024-01-02")).unwrap();
        assert_eq!(sel.series.len(), 3);
        assert_eq!(sel.summary.max, 3.0);

        let same_day = filter_and_summarize(&ds, "X", date("2024-01-02"), date("2024-01-02")).unwrap();
        assert_eq!(same_day.series.len(), 1);
    }

    #[test]
    fn test_switching_parameter_keeps_rows() {
        // ---
        let ds = three_days();
        let x = filter_and_summarize(&ds, "X", date("2024-01-02"), date("2024-01-03")).unwrap();
        let y = filter_and_summarize(&ds, "Y", date("2024-01-02"), date("2024-01-03")).unwrap();

        let ts = |s: &Selection| s.series.iter().map(|p| p.timestamp).collect::<Vec<_>>();
        assert_eq!(ts(&x), ts(&y));
        assert_eq!(y.summary.mean, 2.5);
        assert_eq!(x.summary.mean, 25.0);
    }

    #[test]
    fn test_unknown_parameter() {
        // ---
        let ds = three_days();
        let err = filter_and_summarize(&ds, "NOPE", date("2024-01-01"), date("2024-01-03")).unwrap_err();
        assert!(matches!(err, Error::UnknownParameter(p) if p == "NOPE"));
    }

    #[test]
    fn test_nulls_are_charted_but_not_counted() {
        // ---
        let ds = dataset(
            &["2024-01-01 00:00:00", "2024-01-02 00:00:00"],
            vec![Column::new("X", vec![None, Some(4.0)])],
        );
        let sel = filter_and_summarize(&ds, "X", date("2024-01-01"), date("2024-01-02")).unwrap();

        assert_eq!(sel.series.len(), 2);
        assert_eq!(sel.summary.count, 1);
        assert_eq!(sel.summary.mean, 4.0);
        assert!(sel.summary.std.is_nan());
    }

    #[test]
    fn test_statistics_labels() {
        // ---
        let labels: Vec<&str> = Summary::describe(&[1.0])
            .statistics()
            .iter()
            .map(|s| s.statistic)
            .collect();
        assert_eq!(
            labels,
            vec!["count", "mean", "std", "min", "25%", "50%", "75%", "max"]
        );
    }
}
