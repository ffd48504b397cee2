//! Fetch historical readings from the air4thai API into the raw CSV.
//!
//! One request, no retry. Any failure ends the process with an error.
use anyhow::{Context, Result};
use dotenvy::dotenv;

use airquality_analytics::{config, fetcher, telemetry};

#[tokio::main]
async fn main() -> Result<()> {
    // ---
    dotenv().ok();
    telemetry::init_tracing();

    let cfg = config::load_from_env()?;
    cfg.log_config();

    let client = reqwest::Client::new();
    let rows = fetcher::fetch_to_csv(
        &client,
        &cfg.history,
        &cfg.timestamp_column,
        &cfg.raw_csv_path,
    )
    .await
    .with_context(|| format!("Failed to fetch station {}", cfg.history.station_id))?;

    tracing::info!("Fetched {} readings into {}", rows, cfg.raw_csv_path.display());
    Ok(())
}
