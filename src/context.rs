//! Read-only data shared by the dashboard handlers.
//!
//! Built once on startup from `main.rs` and handed to the router as state;
//! nothing mutates it afterwards.

use std::path::Path;

use serde::Deserialize;

use crate::error::Result;
use crate::models::Dataset;

/// Which dataset a page or API call reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetKind {
    Historical,
    Prediction,
}

/// Historical and prediction readings, sorted and immutable.
#[derive(Debug, Clone)]
pub struct DataContext {
    // ---
    pub historical: Dataset,
    pub prediction: Dataset,
}

impl DataContext {
    // ---
    /// Load both CSV files. A missing file or an unparseable timestamp is an
    /// error; startup should not continue without data.
    pub fn load(historical: &Path, prediction: &Path, timestamp_column: &str) -> Result<Self> {
        // ---
        let historical = Dataset::load(historical, timestamp_column)?;
        tracing::info!(
            rows = historical.len(),
            parameters = ?historical.parameters(),
            "Loaded historical dataset"
        );

        let prediction = Dataset::load(prediction, timestamp_column)?;
        tracing::info!(
            rows = prediction.len(),
            parameters = ?prediction.parameters(),
            "Loaded prediction dataset"
        );

        Ok(DataContext {
            historical,
            prediction,
        })
    }

    pub fn dataset(&self, kind: DatasetKind) -> &Dataset {
        match kind {
            DatasetKind::Historical => &self.historical,
            DatasetKind::Prediction => &self.prediction,
        }
    }
}
