//! Error type shared by the fetch, clean and dashboard stages.

use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced by the library. Binaries wrap these in `anyhow`.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to read '{0}'")]
    ReadFile(PathBuf, #[source] std::io::Error),

    #[error("Failed to write '{0}'")]
    WriteFile(PathBuf, #[source] std::io::Error),

    #[error("CSV error in '{0}'")]
    Csv(PathBuf, #[source] csv::Error),

    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("Response from {0} is not valid JSON")]
    InvalidJson(String, #[source] serde_json::Error),

    #[error("Response from {0} has no stations[0].data array")]
    MissingStationData(String),

    #[error("Required column '{column}' not found in {source_name}")]
    MissingColumn { source_name: String, column: String },

    #[error("Invalid number '{value}' in column '{column}' at row {row}")]
    InvalidNumber {
        column: String,
        row: usize,
        value: String,
    },

    #[error("Invalid timestamp '{value}' at row {row}")]
    InvalidTimestamp {
        row: usize,
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("Unknown parameter '{0}'")]
    UnknownParameter(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
