//! Dataset error types.

use thiserror::Error;

/// Errors from loading or analyzing a dataset.
#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid URL scheme '{0}'. Only HTTP and HTTPS are supported")]
    UnsupportedScheme(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to fetch CSV: HTTP {0}")]
    Status(u16),

    #[error("Invalid upload encoding: {0}")]
    Encoding(String),

    #[error("Dataset has no columns")]
    Empty,

    #[error("Malformed dataset: {0}")]
    Malformed(String),

    #[error("Column '{0}' not found")]
    ColumnNotFound(String),

    #[error("Column '{0}' is not numeric")]
    NotNumeric(String),
}
