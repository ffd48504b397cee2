//! HTML pages: `/` for the historical readings, `/prediction` for forecasts.
//!
//! Each request recomputes the selection and renders the whole page. The
//! parameter selector and date inputs submit the form on change, so the
//! browser round-trips through the same handler.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use tracing::{debug, warn};

use super::{AppState, SelectionQuery};
use crate::charts::{line_chart, stats_chart, stats_title};
use crate::context::DatasetKind;
use crate::summary::{filter_and_summarize, Selection};
use crate::Dataset;

const TITLE: &str = "Air Quality Analytics: Understand Air Quality!";
const PLOTLY_JS: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";
const FONTS_CSS: &str = "https://fonts.googleapis.com/css2?family=Lato:wght@400;700&display=swap";

/// What differs between the two pages.
struct Page {
    // ---
    path: &'static str,
    kind: DatasetKind,
    line_title: fn(&str) -> String,
    line_color: &'static str,
}

const HOME: Page = Page {
    path: "/",
    kind: DatasetKind::Historical,
    line_title: history_title,
    line_color: "#E26868",
};

const PREDICTION: Page = Page {
    path: "/prediction",
    kind: DatasetKind::Prediction,
    line_title: prediction_title,
    line_color: "#579AF5",
};

fn history_title(parameter: &str) -> String {
    format!("{parameter} over Time")
}

fn prediction_title(parameter: &str) -> String {
    format!("{parameter} Prediction")
}

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new()
        .route(HOME.path, get(home))
        .route(PREDICTION.path, get(prediction))
}

async fn home(Query(params): Query<SelectionQuery>, State(state): State<AppState>) -> Response {
    render(&HOME, &params, &state)
}

async fn prediction(
    Query(params): Query<SelectionQuery>,
    State(state): State<AppState>,
) -> Response {
    render(&PREDICTION, &params, &state)
}

fn render(page: &Page, params: &SelectionQuery, (data, config): &AppState) -> Response {
    // ---
    let dataset = data.dataset(page.kind);
    let (parameter, start, end) = params.resolve(dataset, &config.default_parameter);
    debug!("GET {} {} {}..{}", page.path, parameter, start, end);

    match filter_and_summarize(dataset, &parameter, start, end) {
        Ok(selection) => Html(page_html(page, dataset, &selection)).into_response(),
        Err(e) => {
            warn!("Rejected page request: {}", e);
            (StatusCode::BAD_REQUEST, e.to_string()).into_response()
        }
    }
}

// ---

fn page_html(page: &Page, dataset: &Dataset, selection: &Selection) -> String {
    // ---
    let line_title = (page.line_title)(&selection.parameter);
    let line = script_json(&line_chart(selection, &line_title, page.line_color).to_json());
    let stats = script_json(&stats_chart(selection).to_json());

    let (min, max) = dataset.date_bounds().unwrap_or_default();

    let options: String = dataset
        .parameters()
        .into_iter()
        .map(|p| {
            let selected = if p == selection.parameter { " selected" } else { "" };
            format!(r#"<option value="{0}"{1}>{0}</option>"#, escape(p), selected)
        })
        .collect();

    let rows: String = selection
        .summary
        .statistics()
        .into_iter()
        .map(|stat| {
            format!(
                "<tr><td>{}</td><td>{}</td></tr>",
                escape(stat.statistic),
                format_value(stat.value)
            )
        })
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{title}</title>
<link href="{fonts}" rel="stylesheet">
<script src="{plotly}" charset="utf-8"></script>
<style>{css}</style>
</head>
<body>
<div class="navbar"><nav class="nav"><a href="/">Home</a><a href="/prediction">Prediction</a></nav></div>
<div class="header">
<p class="header-emoji">&#127774;</p>
<h1 class="header-title">Air Quality Analytics</h1>
<p class="header-description">Analyze the air quality data</p>
</div>
<form class="menu" method="get" action="{action}">
<div><div class="menu-title">Parameter</div>
<select name="parameter" id="parameter-filter" class="dropdown" onchange="this.form.submit()">{options}</select></div>
<div><div class="menu-title">Date Range</div>
<input type="date" name="start_date" min="{min}" max="{max}" value="{start}" onchange="this.form.submit()">
<input type="date" name="end_date" min="{min}" max="{max}" value="{end}" onchange="this.form.submit()"></div>
</form>
<div class="wrapper"><div class="card"><div id="line-chart"></div></div></div>
<div class="wrapper">
<div class="card" style="width: 48%; float: right;">
<div class="font-title">{stats_title}</div>
<table class="custom-table"><thead><tr><th>Statistic</th><th>Value</th></tr></thead><tbody>{rows}</tbody></table>
</div>
<div class="card" style="width: 50%; float: left;"><div id="stats-chart"></div></div>
</div>
<script>
var line = {line};
Plotly.newPlot("line-chart", line.data, line.layout, {{displayModeBar: false}});
var stats = {stats};
Plotly.newPlot("stats-chart", stats.data, stats.layout);
</script>
</body>
</html>
"#,
        title = TITLE,
        fonts = FONTS_CSS,
        plotly = PLOTLY_JS,
        css = CSS,
        action = page.path,
        start = selection.start_date,
        end = selection.end_date,
        stats_title = escape(&stats_title(selection)),
    )
}

/// Figure JSON that is safe inside a `<script>` element.
fn script_json(json: &str) -> String {
    json.replace("</", "<\\/")
}

fn format_value(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else {
        value.to_string()
    }
}

fn escape(text: &str) -> String {
    // ---
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

const CSS: &str = r#"
body { font-family: "Lato", sans-serif; margin: 0; background-color: #F7F7F7; }
.navbar { background-color: #222222; }
.nav a { color: #FFFFFF; display: inline-block; padding: 14px 16px; text-decoration: none; }
.nav a:hover { background-color: #444444; }
.header { background-color: #222222; height: 256px; display: flex; flex-direction: column; justify-content: center; }
.header-emoji { font-size: 48px; margin: 0 auto; text-align: center; }
.header-title { color: #FFFFFF; font-size: 48px; font-weight: bold; text-align: center; margin: 4px auto; }
.header-description { color: #CFCFCF; margin: 4px auto; text-align: center; max-width: 384px; }
.wrapper { margin-right: auto; margin-left: auto; max-width: 1024px; padding-right: 10px; padding-left: 10px; margin-top: 32px; overflow: hidden; }
.card { margin-bottom: 24px; box-shadow: 0 4px 6px 0 rgba(0, 0, 0, 0.18); background-color: #FFFFFF; }
.menu { height: 112px; width: 912px; display: flex; justify-content: space-evenly; padding-top: 24px; margin: -80px auto 0 auto; background-color: #FFFFFF; box-shadow: 0 4px 6px 0 rgba(0, 0, 0, 0.18); }
.menu-title { margin-bottom: 6px; font-weight: bold; color: #079A82; }
.dropdown { width: 12rem; height: 2rem; }
.font-title { font-weight: bold; padding: 12px; }
.custom-table { width: 100%; border-collapse: collapse; }
.custom-table th, .custom-table td { border: 1px solid #DDDDDD; padding: 8px; text-align: left; }
.custom-table tbody tr:nth-child(odd) { background-color: #F2F2F2; }
.custom-table tbody tr:hover { background-color: #E8E8E8; }
"#;
