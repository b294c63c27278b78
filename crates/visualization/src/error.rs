use thiserror::Error;

/// Errors raised by a [`ChartRenderer`](crate::ChartRenderer).
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("No data to plot: {0}")]
    NoData(String),

    #[error("Rendering failed: {0}")]
    Failed(String),
}
