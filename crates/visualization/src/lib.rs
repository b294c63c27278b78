//! # Visualization
//!
//! Picks one chart for a free-text request and renders it through a [`ChartRenderer`].
//!
//! - [`VisualizationSelector`]: keyword families mapped to chart operations
//! - [`ChartSpec`]: what to draw (histogram, bar, scatter, box plot, heatmap)
//! - [`SvgChartRenderer`]: default renderer producing `data:image/svg+xml;base64,...`
//!
//! ## Logging
//!
//! Rejected requests are logged at `debug`, renderer failures at `warn`.

mod chart;
mod error;
mod renderer;
mod selector;

pub use chart::{BoxSummary, ChartSpec};
pub use error::RenderError;
pub use renderer::{ChartRenderer, SvgChartRenderer};
pub use selector::{VisualizationSelector, BAR_TOP_N, BOX_MAX_COLUMNS, HISTOGRAM_BINS};
