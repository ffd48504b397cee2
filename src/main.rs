//! Application entry point for the air quality dashboard.
//!
//! This binary orchestrates the startup sequence:
//! - Loading configuration from environment variables or `.env`
//! - Initializing structured logging/tracing
//! - Loading the cleaned and prediction CSV files into memory
//! - Mounting the pages and API routes via the `routes` gateway
//! - Binding the Axum HTTP server and serving requests
//!
//! # Environment Variables
//! - `CLEANED_CSV_PATH` (optional) – historical dataset (default: `cleaned_data.csv`)
//! - `PREDICTION_CSV_PATH` (optional) – prediction dataset
//! - `LISTEN_ADDR` (optional) – bind address (default: `0.0.0.0:8080`)
//! - `AXUM_LOG_LEVEL` (optional) – log verbosity (default: `debug`)
//! - `AXUM_SPAN_EVENTS` (optional) – span event mode for tracing
//!
//! Run `fetch` then `clean` first to produce the cleaned CSV.
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use dotenvy::dotenv;

use airquality_analytics::{config, routes, telemetry, DataContext};

// ---

#[tokio::main]
async fn main() -> Result<()> {
    // ---
    dotenv().ok();
    telemetry::init_tracing();

    let cfg = config::load_from_env()?;
    cfg.log_config();

    let data = DataContext::load(
        &cfg.cleaned_csv_path,
        &cfg.prediction_csv_path,
        &cfg.timestamp_column,
    )
    .context("Failed to load dashboard data")?;

    let addr = cfg.listen_addr;
    let app: Router = routes::router(Arc::new(data), cfg);

    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
