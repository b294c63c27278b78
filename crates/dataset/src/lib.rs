//! # Dataset
//!
//! Typed, column-oriented tables built from CSV bytes or an HTTP(S) URL, plus the fixed
//! catalogue of deterministic analyzers run over them.
//!
//! ## Modules
//!
//! - [`frame`] – [`Dataset`], [`Column`], [`ColumnKind`]
//! - [`loader`] – [`DatasetLoader`]: bytes, URL and [`DatasetSource`](chat_core::DatasetSource) rehydration
//! - [`analyzers`] – basic info, summary statistics, missing values, column profile, histogram, preview
//! - [`stats`] – descriptive statistics and Pearson correlation
//! - [`sample`] – seeded downsampling for large datasets
//!
//! Datasets are never persisted; only their source reference is.

pub mod analyzers;
mod error;
pub mod frame;
pub mod loader;
pub mod sample;
pub mod stats;

pub use analyzers::{
    basic_info, column_profile, histogram, missing_values, preview, summary, summary_stats,
    BasicInfo, ColumnDetail, ColumnProfile, DatasetSummary, HistogramBin, HistogramData,
    MissingDetail, MissingValues, Preview, SummaryStats, ValueCount, DEFAULT_HISTOGRAM_BINS,
    DEFAULT_PREVIEW_ROWS,
};
pub use error::DatasetError;
pub use frame::{Column, ColumnKind, Dataset};
pub use loader::{upload_source, validate_url, DatasetLoader};
pub use sample::downsample;
pub use stats::{correlation_matrix, describe, pearson, DescriptiveStats};
