//! Token estimation for messages.
//!
//! A rough, deterministic approximation of model-context cost. No tokenizer and no I/O.

use chat_core::{ContentItem, Message};

/// Fixed cost of one image item (vision models bill a tile set per image).
pub const IMAGE_TOKENS: usize = 765;

/// Structural overhead added once per message for role and framing.
pub const MESSAGE_OVERHEAD_TOKENS: usize = 4;

const TOKENS_PER_WORD: f64 = 1.3;

/// Estimates the token count for plain text: `round(words * 1.3)`; empty text costs 0.
pub fn estimate_tokens(text: &str) -> usize {
    let words = text.split_whitespace().count();
    if words == 0 {
        return 0;
    }
    (words as f64 * TOKENS_PER_WORD).round() as usize
}

/// Estimates a single content item. Empty blobs and absent payloads cost nothing.
pub fn estimate_item_tokens(item: &ContentItem) -> usize {
    match item {
        ContentItem::Text { body } => estimate_tokens(body),
        ContentItem::Image { encoded_blob } if encoded_blob.is_empty() => 0,
        ContentItem::Image { .. } => IMAGE_TOKENS,
        ContentItem::Dataset { result, .. } => result
            .payload
            .as_ref()
            .and_then(|payload| serde_json::to_string_pretty(payload).ok())
            .map(|text| estimate_tokens(&text))
            .unwrap_or(0),
    }
}

/// Estimates a whole message: sum of its items plus [`MESSAGE_OVERHEAD_TOKENS`].
pub fn estimate_message_tokens(message: &Message) -> usize {
    message
        .content
        .iter()
        .map(estimate_item_tokens)
        .sum::<usize>()
        + MESSAGE_OVERHEAD_TOKENS
}

/// Sum of [`estimate_message_tokens`] over `messages`.
pub fn estimate_total_tokens(messages: &[Message]) -> usize {
    messages.iter().map(estimate_message_tokens).sum()
}
