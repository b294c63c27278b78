//! Maps a free-text request plus the dataset schema to exactly one chart.
//!
//! Keyword families are checked in a fixed order (histogram, bar, scatter, box, heatmap); a
//! family that matches but cannot build its chart falls through to the default histogram of the
//! first numeric column, or to the histogram of the requested column when the caller already
//! picked one. Every outcome is an [`AnalysisResult`] of kind `visualization`.

use std::sync::Arc;

use chat_core::{AnalysisKind, AnalysisResult};
use dataset::{correlation_matrix, describe, histogram, pearson, Column, Dataset, ValueCount};
use serde_json::Value;
use tracing::{debug, warn};

use crate::chart::{BoxSummary, ChartSpec};
use crate::renderer::{ChartRenderer, SvgChartRenderer};

const HISTOGRAM_WORDS: &[&str] = &["histogram", "distribution", "frequency"];
const BAR_WORDS: &[&str] = &["bar", "count", "category"];
const SCATTER_WORDS: &[&str] = &["scatter", "correlation", "relationship", "vs", "versus"];
const BOX_WORDS: &[&str] = &["box", "outlier", "quartile"];
const HEATMAP_WORDS: &[&str] = &["heatmap", "correlations"];

pub const HISTOGRAM_BINS: usize = 10;
/// Most frequent values shown in a bar chart.
pub const BAR_TOP_N: usize = 20;
/// Columns shown side by side in a box plot.
pub const BOX_MAX_COLUMNS: usize = 5;

/// Outcome of choosing a chart, before rendering.
enum Choice {
    Chart(ChartSpec),
    Reject(String),
    /// The family matched but has nothing to draw; try the default.
    Fallthrough,
}

/// Chooses and renders a chart for a query.
#[derive(Clone)]
pub struct VisualizationSelector {
    renderer: Arc<dyn ChartRenderer>,
}

impl VisualizationSelector {
    pub fn new(renderer: Arc<dyn ChartRenderer>) -> Self {
        Self { renderer }
    }

    /// Builds the chart the query asks for and renders it.
    ///
    /// Invalid requests produce `success = false` envelopes; nothing here fails hard.
    pub fn select(&self, dataset: &Dataset, query: &str) -> AnalysisResult {
        let spec = match choose_family(dataset, query) {
            Choice::Chart(spec) => Ok(spec),
            Choice::Reject(message) => Err(message),
            Choice::Fallthrough => default_chart(dataset),
        };
        self.finish(query, spec)
    }

    /// Like [`select`](Self::select), but a query that names no chart family draws the histogram
    /// of `column`, which must be numeric.
    pub fn select_for_column(&self, dataset: &Dataset, query: &str, column: &str) -> AnalysisResult {
        let spec = match choose_family(dataset, query) {
            Choice::Chart(spec) => Ok(spec),
            Choice::Reject(message) => Err(message),
            Choice::Fallthrough => column_histogram(dataset, column),
        };
        self.finish(query, spec)
    }

    fn finish(&self, query: &str, spec: Result<ChartSpec, String>) -> AnalysisResult {
        match spec {
            Ok(spec) => self.render(spec),
            Err(message) => {
                debug!(query = %query, reason = %message, "Visualization request rejected");
                AnalysisResult::failure(AnalysisKind::Visualization, message)
            }
        }
    }

    fn render(&self, spec: ChartSpec) -> AnalysisResult {
        let image = match self.renderer.render(&spec) {
            Ok(image) => image,
            Err(e) => {
                warn!(chart = spec.kind_name(), error = %e, "Chart rendering failed");
                return AnalysisResult::failure(
                    AnalysisKind::Visualization,
                    format!("Error creating {}: {}", spec.kind_name(), e),
                );
            }
        };

        let mut payload = match serde_json::to_value(&spec) {
            Ok(Value::Object(map)) => map,
            Ok(_) | Err(_) => serde_json::Map::new(),
        };
        payload.insert("chartKind".to_string(), Value::from(spec.kind_name()));
        payload.insert("title".to_string(), Value::from(spec.title()));
        payload.insert("renderedImage".to_string(), Value::from(image));

        AnalysisResult::ok(AnalysisKind::Visualization, Value::Object(payload))
            .with_message(spec.describe())
    }
}

impl Default for VisualizationSelector {
    fn default() -> Self {
        Self::new(Arc::new(SvgChartRenderer::new()))
    }
}

/// Histogram of the first numeric column.
fn default_chart(dataset: &Dataset) -> Result<ChartSpec, String> {
    let Some(column) = dataset.numeric_columns().first().copied() else {
        return Err("Could not determine appropriate visualization for the data".to_string());
    };
    match histogram_spec(dataset, column) {
        Choice::Chart(spec) => Ok(spec),
        Choice::Reject(message) => Err(message),
        Choice::Fallthrough => {
            Err("Could not determine appropriate visualization for the data".to_string())
        }
    }
}

/// Histogram of a named column; non-numeric or unknown columns are rejected.
fn column_histogram(dataset: &Dataset, name: &str) -> Result<ChartSpec, String> {
    let column = dataset
        .column(name)
        .filter(|c| c.is_numeric())
        .ok_or_else(|| {
            format!(
                "Please specify a numeric column for histogram ('{}' is not numeric)",
                name
            )
        })?;
    match histogram_spec(dataset, column) {
        Choice::Chart(spec) => Ok(spec),
        Choice::Reject(message) => Err(message),
        Choice::Fallthrough => Err(format!("Could not draw a histogram of '{}'", name)),
    }
}

/// First keyword family that matches the query; `Fallthrough` when none matches or the family
/// has nothing to draw.
fn choose_family(dataset: &Dataset, query: &str) -> Choice {
    let query_lower = query.to_lowercase();
    let mentioned = dataset.mentioned_columns(query);

    if contains_any(&query_lower, HISTOGRAM_WORDS) {
        choose_histogram(dataset, &mentioned)
    } else if contains_any(&query_lower, BAR_WORDS) {
        choose_bar(dataset, &mentioned)
    } else if contains_any(&query_lower, SCATTER_WORDS) {
        choose_scatter(dataset, &mentioned)
    } else if contains_any(&query_lower, BOX_WORDS) {
        choose_box(dataset)
    } else if contains_any(&query_lower, HEATMAP_WORDS) {
        choose_heatmap(dataset)
    } else {
        Choice::Fallthrough
    }
}

fn contains_any(haystack: &str, words: &[&str]) -> bool {
    words.iter().any(|w| haystack.contains(w))
}

fn choose_histogram(dataset: &Dataset, mentioned: &[&Column]) -> Choice {
    if let Some(column) = mentioned.iter().find(|c| c.is_numeric()) {
        return histogram_spec(dataset, column);
    }
    if let Some(column) = mentioned.first() {
        return Choice::Reject(format!(
            "Column '{}' is not numeric. Please specify a numeric column for histogram",
            column.name()
        ));
    }
    match dataset.numeric_columns().first() {
        Some(column) => histogram_spec(dataset, column),
        None => Choice::Fallthrough,
    }
}

fn histogram_spec(dataset: &Dataset, column: &Column) -> Choice {
    match histogram(dataset, column.name(), HISTOGRAM_BINS) {
        Ok(data) => {
            let stats = describe(&column.numeric_values().unwrap_or_default());
            Choice::Chart(ChartSpec::Histogram {
                column: data.column,
                bins: data.data,
                mean: stats.mean,
                median: stats.median,
                std: stats.std,
            })
        }
        Err(e) => Choice::Reject(format!("Error creating histogram: {}", e)),
    }
}

fn choose_bar(dataset: &Dataset, mentioned: &[&Column]) -> Choice {
    let column = match mentioned.first() {
        Some(column) => *column,
        None => match dataset.categorical_columns().first() {
            Some(column) => *column,
            None => return Choice::Fallthrough,
        },
    };
    let categories: Vec<ValueCount> = column
        .value_counts()
        .into_iter()
        .take(BAR_TOP_N)
        .map(|(value, count)| ValueCount { value, count })
        .collect();
    Choice::Chart(ChartSpec::Bar {
        column: column.name().to_string(),
        categories,
    })
}

fn choose_scatter(dataset: &Dataset, mentioned: &[&Column]) -> Choice {
    let numeric = dataset.numeric_columns();
    if numeric.len() < 2 {
        return Choice::Reject(
            "Need at least 2 numeric columns for a scatter plot".to_string(),
        );
    }

    let named: Vec<&Column> = mentioned.iter().copied().filter(|c| c.is_numeric()).collect();
    let (x, y) = match named.as_slice() {
        [first, second, ..] => (*first, *second),
        [only] => {
            let other = numeric
                .iter()
                .copied()
                .find(|c| c.name() != only.name())
                .unwrap_or(numeric[1]);
            (*only, other)
        }
        [] => (numeric[0], numeric[1]),
    };

    let (xs, ys) = match (x.numeric_cells(), y.numeric_cells()) {
        (Some(xs), Some(ys)) => (xs, ys),
        _ => return Choice::Reject("Both columns must be numeric".to_string()),
    };
    let points: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys.iter())
        .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
        .collect();

    Choice::Chart(ChartSpec::Scatter {
        x: x.name().to_string(),
        y: y.name().to_string(),
        correlation: pearson(xs, ys),
        point_count: points.len(),
        points,
    })
}

fn choose_box(dataset: &Dataset) -> Choice {
    let columns: Vec<BoxSummary> = dataset
        .numeric_columns()
        .into_iter()
        .take(BOX_MAX_COLUMNS)
        .filter_map(|column| {
            let stats = describe(&column.numeric_values()?);
            Some(BoxSummary {
                column: column.name().to_string(),
                min: stats.min?,
                q1: stats.q1?,
                median: stats.median?,
                q3: stats.q3?,
                max: stats.max?,
            })
        })
        .collect();
    if columns.is_empty() {
        Choice::Fallthrough
    } else {
        Choice::Chart(ChartSpec::BoxPlot { columns })
    }
}

fn choose_heatmap(dataset: &Dataset) -> Choice {
    let (columns, matrix) = correlation_matrix(dataset);
    if columns.len() < 2 {
        return Choice::Reject(
            "Need at least 2 numeric columns for correlation heatmap".to_string(),
        );
    }
    Choice::Chart(ChartSpec::Heatmap { columns, matrix })
}
