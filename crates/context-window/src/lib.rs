//! # Context Window
//!
//! Bounds the conversation history handed to the model before every completion call.
//!
//! - [`estimator`]: per-message token cost (words × 1.3, images 765, dataset payloads, +4 overhead)
//! - [`window`]: three-constraint eviction (message count, preserved prefix, token budget)
//! - [`summary`]: usage summary and warning text for the current history
//! - [`config`]: [`WindowConfig`] loaded from environment
//!
//! Every function here is total: pathological inputs produce a structurally valid result.

pub mod config;
pub mod estimator;
pub mod summary;
mod types;
pub mod window;

pub use config::WindowConfig;
pub use estimator::{estimate_message_tokens, estimate_tokens, estimate_total_tokens};
pub use summary::{context_warning, summarize_context};
pub use types::{ContextSummary, ContextWindowResult};
pub use window::{apply_window, ContextWindow};

#[cfg(test)]
mod tests;
