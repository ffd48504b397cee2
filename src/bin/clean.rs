//! Clean the raw CSV into the dataset served by the dashboard.
use anyhow::{Context, Result};
use dotenvy::dotenv;

use airquality_analytics::{cleaner, config, telemetry};

fn main() -> Result<()> {
    // ---
    dotenv().ok();
    telemetry::init_tracing();

    let cfg = config::load_from_env()?;
    cfg.log_config();

    let report = cleaner::clean_file(
        &cfg.raw_csv_path,
        &cfg.cleaned_csv_path,
        &cfg.timestamp_column,
        &cfg.temperature_column,
    )
    .with_context(|| format!("Failed to clean {}", cfg.raw_csv_path.display()))?;

    tracing::info!(
        dropped = ?report.dropped_columns,
        forward_filled = report.forward_filled,
        imputed = report.imputed,
        "Cleaning complete"
    );

    if report.leading_zeros > 0 {
        tracing::warn!(
            "{} zero readings in {} precede the first valid reading and were kept as 0",
            report.leading_zeros,
            cfg.temperature_column
        );
    }

    Ok(())
}
