//! Configuration loader for the air quality pipeline.
//!
//! This module centralizes all runtime configuration values and their defaults,
//! loading from environment variables (with optional `.env` file support
//! provided by the caller). The fetch, clean and dashboard binaries all read
//! the same snapshot so the file paths and column names they share cannot
//! drift apart.
//!
use std::{env, net::SocketAddr, path::PathBuf};

use anyhow::{anyhow, Result};
use chrono::NaiveDate;

/// Parse an optional environment variable with a default value.
macro_rules! parse_env {
    ($var_name:expr, $ty:ty, $default:expr) => {
        env::var($var_name)
            .ok()
            .map(|v| v.parse::<$ty>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
            .unwrap_or($default)
    };
}

/// Read an optional string environment variable with a default value.
macro_rules! env_or {
    ($var_name:expr, $default:expr) => {
        env::var($var_name).unwrap_or_else(|_| String::from($default))
    };
}

/// Query sent to the air4thai history endpoint.
#[derive(Debug, Clone)]
pub struct HistoryQuery {
    // ---
    /// History endpoint URL.
    pub api_url: String,

    /// Station identifier, e.g. `44t`.
    pub station_id: String,

    /// Comma-separated parameter codes.
    pub params: String,

    /// Aggregation granularity (`hr` for hourly).
    pub data_type: String,

    pub start_date: NaiveDate,
    pub end_date: NaiveDate,

    /// Start and end hour, two digits.
    pub start_time: String,
    pub end_time: String,
}

/// Strongly typed application configuration.
///
/// All fields are immutable after loading, ensuring a consistent configuration
/// snapshot for the lifetime of the application.
#[derive(Debug, Clone)]
pub struct Config {
    // ---
    pub history: HistoryQuery,

    /// Fetcher output, cleaner input.
    pub raw_csv_path: PathBuf,

    /// Cleaner output, dashboard historical dataset.
    pub cleaned_csv_path: PathBuf,

    /// Externally produced forecasts shown on the prediction page.
    pub prediction_csv_path: PathBuf,

    /// Name of the timestamp column in every CSV.
    pub timestamp_column: String,

    /// Column whose zero readings are forward-filled by the cleaner.
    pub temperature_column: String,

    /// Parameter preselected on the dashboard.
    pub default_parameter: String,

    /// Dashboard listen address.
    pub listen_addr: SocketAddr,
}

/// Load configuration from environment variables with defaults.
///
/// Optional:
/// - `AIR4THAI_API_URL`, `AIR4THAI_STATION_ID`, `AIR4THAI_PARAMS`,
///   `AIR4THAI_DATA_TYPE`, `AIR4THAI_START_DATE`, `AIR4THAI_END_DATE`,
///   `AIR4THAI_START_TIME`, `AIR4THAI_END_TIME` – history query
/// - `RAW_CSV_PATH` (default: `hatyai.csv`)
/// - `CLEANED_CSV_PATH` (default: `cleaned_data.csv`)
/// - `PREDICTION_CSV_PATH` (default: `predict_data/merged_predict_data.csv`)
/// - `TIMESTAMP_COLUMN` (default: `DATETIMEDATA`)
/// - `TEMPERATURE_COLUMN` (default: `TEMP`)
/// - `DEFAULT_PARAMETER` (default: `PM25`)
/// - `LISTEN_ADDR` (default: `0.0.0.0:8080`)
///
/// Returns an error if any variable is set but cannot be parsed.
pub fn load_from_env() -> Result<Config> {
    // ---
    let history = HistoryQuery {
        api_url: env_or!(
            "AIR4THAI_API_URL",
            "http://air4thai.com/forweb/getHistoryData.php"
        ),
        station_id: env_or!("AIR4THAI_STATION_ID", "44t"),
        params: env_or!("AIR4THAI_PARAMS", "PM25,PM10,O3,CO,NO2,SO2,WS,TEMP,RH,WD"),
        data_type: env_or!("AIR4THAI_DATA_TYPE", "hr"),
        start_date: parse_env!("AIR4THAI_START_DATE", NaiveDate, default_date(2023, 12, 1)?),
        end_date: parse_env!("AIR4THAI_END_DATE", NaiveDate, default_date(2024, 3, 10)?),
        start_time: env_or!("AIR4THAI_START_TIME", "00"),
        end_time: env_or!("AIR4THAI_END_TIME", "23"),
    };

    Ok(Config {
        history,
        raw_csv_path: PathBuf::from(env_or!("RAW_CSV_PATH", "hatyai.csv")),
        cleaned_csv_path: PathBuf::from(env_or!("CLEANED_CSV_PATH", "cleaned_data.csv")),
        prediction_csv_path: PathBuf::from(env_or!(
            "PREDICTION_CSV_PATH",
            "predict_data/merged_predict_data.csv"
        )),
        timestamp_column: env_or!("TIMESTAMP_COLUMN", "DATETIMEDATA"),
        temperature_column: env_or!("TEMPERATURE_COLUMN", "TEMP"),
        default_parameter: env_or!("DEFAULT_PARAMETER", "PM25"),
        listen_addr: parse_env!(
            "LISTEN_ADDR",
            SocketAddr,
            SocketAddr::from(([0, 0, 0, 0], 8080))
        ),
    })
}

fn default_date(year: i32, month: u32, day: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| anyhow!("Invalid default date {year}-{month}-{day}"))
}

impl Config {
    /// Log the loaded configuration for debugging purposes.
    pub fn log_config(&self) {
        // ---
        let h = &self.history;
        tracing::info!("Configuration loaded:");
        tracing::info!("  AIR4THAI_API_URL    : {}", h.api_url);
        tracing::info!("  AIR4THAI_STATION_ID : {}", h.station_id);
        tracing::info!("  AIR4THAI_PARAMS     : {}", h.params);
        tracing::info!("  AIR4THAI_DATA_TYPE  : {}", h.data_type);
        tracing::info!("  AIR4THAI window     : {} {} .. {} {}", h.start_date, h.start_time, h.end_date, h.end_time);
        tracing::info!("  RAW_CSV_PATH        : {}", self.raw_csv_path.display());
        tracing::info!("  CLEANED_CSV_PATH    : {}", self.cleaned_csv_path.display());
        tracing::info!("  PREDICTION_CSV_PATH : {}", self.prediction_csv_path.display());
        tracing::info!("  TIMESTAMP_COLUMN    : {}", self.timestamp_column);
        tracing::info!("  TEMPERATURE_COLUMN  : {}", self.temperature_column);
        tracing::info!("  DEFAULT_PARAMETER   : {}", self.default_parameter);
        tracing::info!("  LISTEN_ADDR         : {}", self.listen_addr);
    }
}
