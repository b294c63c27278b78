//! Sliding-window eviction over conversation history.
//!
//! The first `preserve_first` messages anchor the conversation and are never dropped while any
//! other message remains. The most recent messages fill the remaining slots. If the result is
//! still over the token budget, messages are removed from the middle of the non-preserved region
//! until it fits or only the anchors plus two messages are left.

use chat_core::Message;
use tracing::{debug, info};

use crate::config::WindowConfig;
use crate::estimator::{estimate_message_tokens, estimate_total_tokens};
use crate::types::ContextWindowResult;

/// Window manager bound to a [`WindowConfig`].
#[derive(Debug, Clone)]
pub struct ContextWindow {
    config: WindowConfig,
}

impl ContextWindow {
    pub fn new(config: WindowConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &WindowConfig {
        &self.config
    }

    /// Applies the configured window. When windowing is disabled the history passes through.
    pub fn apply(&self, messages: &[Message]) -> ContextWindowResult {
        if !self.config.enabled {
            debug!(
                message_count = messages.len(),
                "Sliding window disabled, passing history through"
            );
            return unmodified(messages, self.config.preserve_first);
        }
        apply_window(
            messages,
            self.config.max_messages,
            self.config.preserve_first,
            self.config.token_limit,
        )
    }
}

impl Default for ContextWindow {
    fn default() -> Self {
        Self::new(WindowConfig::default())
    }
}

/// Trims `messages` to at most `max_messages` and (where possible) `token_limit` tokens,
/// always keeping the first `preserve_first` messages.
pub fn apply_window(
    messages: &[Message],
    max_messages: usize,
    preserve_first: usize,
    token_limit: usize,
) -> ContextWindowResult {
    if messages.is_empty() {
        return ContextWindowResult::default();
    }

    let total_count = messages.len();
    let preserve_first = preserve_first.min(total_count);
    if total_count <= max_messages && estimate_total_tokens(messages) <= token_limit {
        return unmodified(messages, preserve_first);
    }

    info!(
        total_count,
        max_messages, preserve_first, token_limit, "Applying sliding window"
    );

    let (preserved, rest) = messages.split_at(preserve_first);

    let mut kept: Vec<Message> = preserved.to_vec();
    let available_slots = max_messages.saturating_sub(preserved.len());
    if available_slots > 0 {
        let take = available_slots.min(rest.len());
        kept.extend_from_slice(&rest[rest.len() - take..]);
    }

    let mut tokens = estimate_total_tokens(&kept);
    while tokens > token_limit && kept.len() > preserve_first + 2 {
        let remove_index = preserve_first + (kept.len() - preserve_first) / 2;
        let removed = kept.remove(remove_index);
        tokens -= estimate_message_tokens(&removed);
        debug!(
            removed_id = %removed.id,
            remove_index,
            tokens_remaining = tokens,
            "Removed message to meet token limit"
        );
    }

    let kept_count = kept.len();
    let removed_count = total_count - kept_count;

    info!(
        kept_count,
        total_count,
        estimated_tokens = tokens,
        "Sliding window applied"
    );

    ContextWindowResult {
        kept_messages: kept,
        total_count,
        kept_count,
        removed_count,
        estimated_tokens: tokens,
        window_applied: removed_count > 0,
        preserved_count: preserve_first.min(kept_count),
    }
}

fn unmodified(messages: &[Message], preserve_first: usize) -> ContextWindowResult {
    let total_count = messages.len();
    ContextWindowResult {
        kept_messages: messages.to_vec(),
        total_count,
        kept_count: total_count,
        removed_count: 0,
        estimated_tokens: estimate_total_tokens(messages),
        window_applied: false,
        preserved_count: preserve_first.min(total_count),
    }
}
