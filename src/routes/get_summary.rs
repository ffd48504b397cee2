use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, warn};

use super::{AppState, SelectionQuery};
use crate::context::DatasetKind;
use crate::summary::{filter_and_summarize, SeriesPoint, Statistic};

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new()
        .route("/api/{dataset}/summary", get(summary_handler))
        .route("/api/{dataset}/parameters", get(parameters_handler))
}

#[derive(Debug, Serialize)]
struct SummaryResponse<'a> {
    parameter: &'a str,
    start_date: NaiveDate,
    end_date: NaiveDate,
    series: &'a [SeriesPoint],
    statistics: Vec<Statistic>,
}

#[derive(Debug, Serialize)]
struct ParametersResponse<'a> {
    parameters: Vec<&'a str>,
    min_date: Option<NaiveDate>,
    max_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

/// Handle `GET /api/{dataset}/summary`.
async fn summary_handler(
    Path(kind): Path<DatasetKind>,
    Query(params): Query<SelectionQuery>,
    State((data, config)): State<AppState>,
) -> Response {
    // ---
    let dataset = data.dataset(kind);
    let (parameter, start, end) = params.resolve(dataset, &config.default_parameter);
    debug!("GET /api/{:?}/summary {} {}..{}", kind, parameter, start, end);

    match filter_and_summarize(dataset, &parameter, start, end) {
        Ok(selection) => {
            let body = SummaryResponse {
                parameter: &selection.parameter,
                start_date: selection.start_date,
                end_date: selection.end_date,
                series: &selection.series,
                statistics: selection.summary.statistics(),
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => {
            warn!("Rejected summary request: {}", e);
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// Handle `GET /api/{dataset}/parameters`.
async fn parameters_handler(
    Path(kind): Path<DatasetKind>,
    State((data, _config)): State<AppState>,
) -> Response {
    // ---
    let dataset = data.dataset(kind);
    let bounds = dataset.date_bounds();

    let body = ParametersResponse {
        parameters: dataset.parameters(),
        min_date: bounds.map(|(min, _)| min),
        max_date: bounds.map(|(_, max)| max),
    };
    (StatusCode::OK, Json(body)).into_response()
}
