//! Context usage summary and warning text.

use chat_core::Message;

use crate::config::WindowConfig;
use crate::estimator::estimate_total_tokens;
use crate::types::ContextSummary;

/// Measures `messages` against `config` without modifying them.
pub fn summarize_context(messages: &[Message], config: &WindowConfig) -> ContextSummary {
    let total_messages = messages.len();
    let estimated_tokens = estimate_total_tokens(messages);
    let needs_optimization =
        total_messages > config.max_messages || estimated_tokens > config.token_limit;

    ContextSummary {
        total_messages,
        estimated_tokens,
        max_messages: config.max_messages,
        token_limit: config.token_limit,
        within_limits: !needs_optimization,
        needs_optimization,
        token_usage_percent: percent(estimated_tokens, config.token_limit),
        message_usage_percent: percent(total_messages, config.max_messages),
    }
}

/// Returns a human-readable warning when the summary is over either limit.
pub fn context_warning(summary: &ContextSummary) -> Option<String> {
    if !summary.needs_optimization {
        return None;
    }

    let mut warnings = Vec::new();
    if summary.total_messages > summary.max_messages {
        warnings.push(format!(
            "Message count ({}) exceeds limit ({})",
            summary.total_messages, summary.max_messages
        ));
    }
    if summary.estimated_tokens > summary.token_limit {
        warnings.push(format!(
            "Token count (~{}) exceeds limit ({})",
            summary.estimated_tokens, summary.token_limit
        ));
    }

    if warnings.is_empty() {
        None
    } else {
        Some(format!(
            "Context window optimization needed: {}",
            warnings.join("; ")
        ))
    }
}

fn percent(value: usize, limit: usize) -> f64 {
    if limit == 0 {
        0.0
    } else {
        value as f64 / limit as f64 * 100.0
    }
}
