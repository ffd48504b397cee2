//! Air quality pipeline: fetch readings from the air4thai history API, clean
//! them into a CSV dataset, and serve a dashboard over that dataset.
//!
//! The three stages share only files on disk:
//! - `fetch` writes the raw CSV ([`fetcher`]),
//! - `clean` writes the cleaned CSV ([`cleaner`]),
//! - the default binary loads the cleaned and prediction CSVs into a
//!   [`DataContext`] and serves [`routes::router`].

pub mod charts;
pub mod cleaner;
pub mod config;
pub mod context;
pub mod error;
pub mod fetcher;
pub mod models;
pub mod routes;
pub mod summary;
pub mod telemetry;

pub use config::Config;
pub use context::{DataContext, DatasetKind};
pub use error::Error;
pub use models::{Column, Dataset, Table};
pub use summary::{filter_and_summarize, Selection, Summary};
