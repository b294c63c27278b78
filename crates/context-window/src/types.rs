//! Result types for windowing and context summaries.

use chat_core::Message;
use serde::Serialize;

/// Outcome of [`apply_window`](crate::apply_window).
///
/// `kept_count + removed_count == total_count`, `preserved_count <= kept_count`, and
/// `kept_messages` is a subsequence of the input in its original order.
#[derive(Debug, Clone, Default)]
pub struct ContextWindowResult {
    pub kept_messages: Vec<Message>,
    pub total_count: usize,
    pub kept_count: usize,
    pub removed_count: usize,
    pub estimated_tokens: usize,
    pub window_applied: bool,
    pub preserved_count: usize,
}

/// Usage of the current history against the configured limits.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContextSummary {
    pub total_messages: usize,
    pub estimated_tokens: usize,
    pub max_messages: usize,
    pub token_limit: usize,
    pub within_limits: bool,
    pub needs_optimization: bool,
    pub token_usage_percent: f64,
    pub message_usage_percent: f64,
}
