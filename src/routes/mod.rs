use std::sync::Arc;

use axum::{http::StatusCode, response::IntoResponse, Router};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::{Config, DataContext, Dataset};

mod get_summary;
mod health;
mod pages;

// ---

/// Shared router state: the loaded datasets and the configuration snapshot.
pub type AppState = (Arc<DataContext>, Config);

pub fn router(data: Arc<DataContext>, config: Config) -> Router {
    // ---
    Router::new()
        .merge(pages::router())
        .merge(get_summary::router())
        .merge(health::router())
        .fallback(not_found)
        .with_state((data, config))
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "404 Page Not Found")
}

// ---

/// Query parameters accepted by the pages and the summary API.
#[derive(Debug, Default, Deserialize)]
pub struct SelectionQuery {
    parameter: Option<String>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
}

impl SelectionQuery {
    // ---
    /// Fill in what the request left out: the configured default parameter
    /// (or the first column when the dataset lacks it) and the dataset's
    /// first and last dates.
    fn resolve(&self, dataset: &Dataset, default_parameter: &str) -> (String, NaiveDate, NaiveDate) {
        // ---
        let parameter = self.parameter.clone().unwrap_or_else(|| {
            let parameters = dataset.parameters();
            if parameters.contains(&default_parameter) {
                default_parameter.to_string()
            } else {
                parameters.first().map(|p| p.to_string()).unwrap_or_default()
            }
        });

        let (min, max) = dataset.date_bounds().unwrap_or_default();
        (
            parameter,
            self.start_date.unwrap_or(min),
            self.end_date.unwrap_or(max),
        )
    }
}
