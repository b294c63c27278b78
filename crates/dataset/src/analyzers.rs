//! Deterministic analyzers over a [`Dataset`].
//!
//! Each analyzer returns a serializable payload; the query router wraps it in an
//! [`AnalysisResult`](chat_core::AnalysisResult). Analyzers that take a column name fail with
//! [`DatasetError`] when the column is missing or has the wrong type.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::DatasetError;
use crate::frame::Dataset;
use crate::stats::{describe, DescriptiveStats};

pub const DEFAULT_HISTOGRAM_BINS: usize = 10;
pub const DEFAULT_PREVIEW_ROWS: usize = 10;

/// Number of most frequent values reported for a categorical column.
const TOP_VALUES: usize = 10;

#[derive(Debug, Clone, Serialize)]
pub struct BasicInfo {
    pub rows: usize,
    pub columns: usize,
    pub column_names: Vec<String>,
    pub dtypes: IndexMap<String, String>,
    pub memory_usage: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryStats {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub numeric_columns: Vec<String>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub statistics: IndexMap<String, DescriptiveStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MissingDetail {
    pub count: usize,
    /// Share of rows missing, rounded to two decimals.
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MissingValues {
    pub total_missing: usize,
    pub columns_with_missing: usize,
    /// Only columns with at least one missing cell.
    pub details: IndexMap<String, MissingDetail>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueCount {
    pub value: String,
    pub count: usize,
}

/// Type-specific part of a [`ColumnProfile`].
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ColumnDetail {
    Numeric {
        min: Option<f64>,
        q1: Option<f64>,
        median: Option<f64>,
        q3: Option<f64>,
        max: Option<f64>,
        mean: Option<f64>,
        std: Option<f64>,
    },
    Categorical {
        top_values: Vec<ValueCount>,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct ColumnProfile {
    pub name: String,
    pub dtype: String,
    pub non_null_count: usize,
    pub null_count: usize,
    pub unique_values: usize,
    #[serde(flatten)]
    pub detail: ColumnDetail,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub range: String,
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistogramData {
    pub column: String,
    pub bins: usize,
    pub data: Vec<HistogramBin>,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Preview {
    pub rows: usize,
    pub data: Vec<Map<String, Value>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DatasetSummary {
    pub basic_info: BasicInfo,
    pub stats: SummaryStats,
    pub missing: MissingValues,
}

/// Shape, column names, types and approximate memory usage.
pub fn basic_info(dataset: &Dataset) -> BasicInfo {
    let bytes: usize = dataset.columns().iter().map(|c| c.approximate_bytes()).sum();
    BasicInfo {
        rows: dataset.row_count(),
        columns: dataset.column_count(),
        column_names: dataset.column_names(),
        dtypes: dataset
            .columns()
            .iter()
            .map(|c| (c.name().to_string(), c.kind().as_str().to_string()))
            .collect(),
        memory_usage: format!("{:.2} KB", bytes as f64 / 1024.0),
    }
}

/// Descriptive statistics for every numeric column.
pub fn summary_stats(dataset: &Dataset) -> SummaryStats {
    let numeric = dataset.numeric_columns();
    if numeric.is_empty() {
        return SummaryStats {
            numeric_columns: Vec::new(),
            statistics: IndexMap::new(),
            message: Some("No numeric columns found".to_string()),
        };
    }

    let statistics = numeric
        .iter()
        .map(|c| {
            let values = c.numeric_values().unwrap_or_default();
            (c.name().to_string(), describe(&values))
        })
        .collect();

    SummaryStats {
        numeric_columns: numeric.iter().map(|c| c.name().to_string()).collect(),
        statistics,
        message: None,
    }
}

pub fn missing_values(dataset: &Dataset) -> MissingValues {
    let rows = dataset.row_count();
    let mut total_missing = 0;
    let mut details = IndexMap::new();
    for column in dataset.columns() {
        let count = column.null_count();
        total_missing += count;
        if count > 0 {
            let percentage = if rows == 0 {
                0.0
            } else {
                round2(count as f64 / rows as f64 * 100.0)
            };
            details.insert(column.name().to_string(), MissingDetail { count, percentage });
        }
    }
    MissingValues {
        total_missing,
        columns_with_missing: details.len(),
        details,
    }
}

/// Profile of one column: counts plus quartiles (numeric) or top values (categorical).
pub fn column_profile(dataset: &Dataset, name: &str) -> Result<ColumnProfile, DatasetError> {
    let column = dataset
        .column(name)
        .ok_or_else(|| DatasetError::ColumnNotFound(name.to_string()))?;

    let detail = match column.numeric_values() {
        Some(values) => {
            let stats = describe(&values);
            ColumnDetail::Numeric {
                min: stats.min,
                q1: stats.q1,
                median: stats.median,
                q3: stats.q3,
                max: stats.max,
                mean: stats.mean,
                std: stats.std,
            }
        }
        None => ColumnDetail::Categorical {
            top_values: column
                .value_counts()
                .into_iter()
                .take(TOP_VALUES)
                .map(|(value, count)| ValueCount { value, count })
                .collect(),
        },
    };

    Ok(ColumnProfile {
        name: column.name().to_string(),
        dtype: column.kind().as_str().to_string(),
        non_null_count: column.non_null_count(),
        null_count: column.null_count(),
        unique_values: column.unique_count(),
        detail,
    })
}

/// Equal-width histogram of a numeric column.
///
/// Bins are right-closed, the first bin also includes the minimum. The lowest edge is pushed
/// down by 0.1% of the range; a constant column gets a ±0.1% band around its value.
pub fn histogram(dataset: &Dataset, name: &str, bins: usize) -> Result<HistogramData, DatasetError> {
    let column = dataset
        .column(name)
        .ok_or_else(|| DatasetError::ColumnNotFound(name.to_string()))?;
    let values = column
        .numeric_values()
        .ok_or_else(|| DatasetError::NotNumeric(name.to_string()))?;
    if values.is_empty() {
        return Err(DatasetError::Malformed(format!(
            "column '{}' has no values to bin",
            name
        )));
    }

    let bins = bins.max(1);
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let edges = bin_edges(min, max, bins);

    let mut counts = vec![0usize; bins];
    for value in &values {
        counts[bin_index(&edges, *value)] += 1;
    }

    let data = counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            range: format!("{:.2} - {:.2}", edges[i], edges[i + 1]),
            lower: edges[i],
            upper: edges[i + 1],
            count,
        })
        .collect();

    Ok(HistogramData {
        column: column.name().to_string(),
        bins,
        data,
        min,
        max,
    })
}

/// First `n` rows as JSON records.
pub fn preview(dataset: &Dataset, n: usize) -> Preview {
    let rows = n.min(dataset.row_count());
    Preview {
        rows,
        data: (0..rows).map(|i| dataset.record(i)).collect(),
    }
}

/// Basic info, statistics and missing values together.
pub fn summary(dataset: &Dataset) -> DatasetSummary {
    DatasetSummary {
        basic_info: basic_info(dataset),
        stats: summary_stats(dataset),
        missing: missing_values(dataset),
    }
}

fn bin_edges(min: f64, max: f64, bins: usize) -> Vec<f64> {
    let (lo, hi) = if min == max {
        let pad = |v: f64| if v == 0.0 { 0.001 } else { 0.001 * v.abs() };
        (min - pad(min), max + pad(max))
    } else {
        (min, max)
    };
    let step = (hi - lo) / bins as f64;
    let mut edges: Vec<f64> = (0..=bins).map(|i| lo + step * i as f64).collect();
    edges[bins] = hi;
    if min != max {
        edges[0] -= (max - min) * 0.001;
    }
    edges
}

fn bin_index(edges: &[f64], value: f64) -> usize {
    let bins = edges.len() - 1;
    (0..bins)
        .find(|&i| value <= edges[i + 1])
        .unwrap_or(bins - 1)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
