//! Plotly figures for a [`Selection`].

use plotly::common::{Mode, Title};
use plotly::layout::Axis;
use plotly::{Bar, Layout, Plot, Scatter};

use crate::models::TIMESTAMP_FORMAT;
use crate::summary::Selection;

/// Line chart of the selected parameter over time.
pub fn line_chart(selection: &Selection, title: &str, color: &'static str) -> Plot {
    // ---
    let x: Vec<String> = selection
        .series
        .iter()
        .map(|p| p.timestamp.format(TIMESTAMP_FORMAT).to_string())
        .collect();
    let y: Vec<Option<f64>> = selection.series.iter().map(|p| p.value).collect();

    let trace = Scatter::new(x, y)
        .mode(Mode::Lines)
        .name(selection.parameter.as_str());

    let layout = Layout::new()
        .title(Title::with_text(title))
        .x_axis(Axis::new().title(Title::with_text("Datetime")))
        .y_axis(Axis::new().title(Title::with_text(selection.parameter.as_str())))
        .colorway(vec![color]);

    let mut plot = Plot::new();
    plot.add_trace(trace);
    plot.set_layout(layout);
    plot
}

/// Bar chart with one bar per summary statistic.
///
/// Each statistic is its own trace so it gets its own colour and legend entry.
pub fn stats_chart(selection: &Selection) -> Plot {
    // ---
    let mut plot = Plot::new();
    for stat in selection.summary.statistics() {
        let trace = Bar::new(vec![stat.statistic], vec![stat.value]).name(stat.statistic);
        plot.add_trace(trace);
    }

    let title = stats_title(selection);
    let layout = Layout::new()
        .title(Title::with_text(title.as_str()))
        .x_axis(Axis::new().title(Title::with_text("Statistic")))
        .y_axis(Axis::new().title(Title::with_text("Value")))
        .plot_background_color("#F5F5F5");

    plot.set_layout(layout);
    plot
}

/// Heading shared by the statistics chart and table.
pub fn stats_title(selection: &Selection) -> String {
    format!(
        "Statistics - {} ({}-{})",
        selection.parameter, selection.start_date, selection.end_date
    )
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::summary::{SeriesPoint, Summary};
    use chrono::NaiveDate;

    fn selection(values: &[f64]) -> Selection {
        // ---
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        Selection {
            parameter: "PM25".into(),
            start_date: day,
            end_date: day,
            series: values
                .iter()
                .map(|v| SeriesPoint {
                    timestamp: day.and_hms_opt(0, 0, 0).unwrap(),
                    value: Some(*v),
                })
                .collect(),
            summary: Summary::describe(values),
        }
    }

    #[test]
    fn test_line_chart_json() {
        // ---
        let plot = line_chart(&selection(&[10.0]), "PM25 over Time", "#E26868");
        let json: serde_json::Value = serde_json::from_str(&plot.to_json()).unwrap();

        assert_eq!(json["data"][0]["x"][0], "2024-01-01 00:00:00");
        assert_eq!(json["data"][0]["y"][0], 10.0);
        assert_eq!(json["data"][0]["name"], "PM25");
        assert_eq!(json["layout"]["title"]["text"], "PM25 over Time");
    }

    #[test]
    fn test_stats_chart_empty_selection_serializes() {
        // ---
        let plot = stats_chart(&selection(&[]));
        let json: serde_json::Value = serde_json::from_str(&plot.to_json()).unwrap();

        assert_eq!(json["data"].as_array().unwrap().len(), 8);
        assert_eq!(json["data"][0]["y"][0], 0.0);
        // NaN statistics serialize as null
        assert!(json["data"][1]["y"][0].is_null());
    }

    #[test]
    fn test_stats_chart_one_trace_per_statistic() {
        // ---
        let plot = stats_chart(&selection(&[1.0, 2.0, 3.0]));
        let json: serde_json::Value = serde_json::from_str(&plot.to_json()).unwrap();

        let names: Vec<&str> = json["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|trace| trace["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, ["count", "mean", "std", "min", "25%", "50%", "75%", "max"]);

        assert_eq!(json["data"][1]["x"], serde_json::json!(["mean"]));
        assert_eq!(json["data"][1]["y"], serde_json::json!([2.0]));
        assert_eq!(json["data"][7]["y"][0], 3.0);
    }

    #[test]
    fn test_stats_title() {
        // ---
        assert_eq!(
            stats_title(&selection(&[1.0])),
            "Statistics - PM25 (2024-01-01-2024-01-01)"
        );
    }
}
