//! Chart descriptions handed to a renderer.
//!
//! Serializing a [`ChartSpec`] yields the chart fields of a visualization payload
//! (`chartKind` plus summary fields). Raw plotted points are kept out of the payload.

use dataset::{HistogramBin, ValueCount};
use serde::Serialize;

/// Five-number summary of one column in a box plot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxSummary {
    pub column: String,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "chartKind", rename_all = "camelCase")]
pub enum ChartSpec {
    #[serde(rename_all = "camelCase")]
    Histogram {
        column: String,
        bins: Vec<HistogramBin>,
        mean: Option<f64>,
        median: Option<f64>,
        std: Option<f64>,
    },
    #[serde(rename_all = "camelCase")]
    Bar {
        column: String,
        categories: Vec<ValueCount>,
    },
    #[serde(rename_all = "camelCase")]
    Scatter {
        x: String,
        y: String,
        /// Pearson coefficient over complete pairs.
        correlation: Option<f64>,
        point_count: usize,
        #[serde(skip)]
        points: Vec<(f64, f64)>,
    },
    #[serde(rename_all = "camelCase")]
    BoxPlot { columns: Vec<BoxSummary> },
    #[serde(rename_all = "camelCase")]
    Heatmap {
        columns: Vec<String>,
        matrix: Vec<Vec<Option<f64>>>,
    },
}

impl ChartSpec {
    /// Payload value of `chartKind`.
    pub fn kind_name(&self) -> &'static str {
        match self {
            ChartSpec::Histogram { .. } => "histogram",
            ChartSpec::Bar { .. } => "bar",
            ChartSpec::Scatter { .. } => "scatter",
            ChartSpec::BoxPlot { .. } => "boxPlot",
            ChartSpec::Heatmap { .. } => "heatmap",
        }
    }

    /// Default chart title.
    pub fn title(&self) -> String {
        match self {
            ChartSpec::Histogram { column, .. } | ChartSpec::Bar { column, .. } => {
                format!("Distribution of {}", column)
            }
            ChartSpec::Scatter { x, y, .. } => format!("{} vs {}", y, x),
            ChartSpec::BoxPlot { .. } => "Box Plot of Numeric Columns".to_string(),
            ChartSpec::Heatmap { .. } => "Correlation Heatmap".to_string(),
        }
    }

    /// One-line description used as the result message.
    pub fn describe(&self) -> String {
        match self {
            ChartSpec::Histogram { column, .. } => format!("Histogram created for {}", column),
            ChartSpec::Bar { column, .. } => format!("Bar chart created for {}", column),
            ChartSpec::Scatter { x, y, .. } => {
                format!("Scatter plot created for {} vs {}", x, y)
            }
            ChartSpec::BoxPlot { columns } => {
                format!("Box plot created for {} columns", columns.len())
            }
            ChartSpec::Heatmap { columns, .. } => {
                format!("Correlation heatmap created for {} columns", columns.len())
            }
        }
    }
}
