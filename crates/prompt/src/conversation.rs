//! Stored messages to model messages.

use chat_core::{ContentItem, Message, MessageRole as StoredRole};

use crate::analysis::format_analysis_for_context;
use crate::{ChatMessage, ContentPart, MessageContent, MessageRole};

/// Converts windowed history into model messages, in order.
///
/// Messages with no usable content (e.g. only empty text) are skipped.
pub fn format_conversation(messages: &[Message]) -> Vec<ChatMessage> {
    messages.iter().filter_map(format_message).collect()
}

/// Converts one stored message; `None` when nothing in it can be sent.
pub fn format_message(message: &Message) -> Option<ChatMessage> {
    let parts: Vec<ContentPart> = message
        .content
        .iter()
        .filter_map(|item| match item {
            ContentItem::Text { body } if !body.is_empty() => Some(ContentPart::Text {
                text: body.clone(),
            }),
            ContentItem::Text { .. } => None,
            ContentItem::Image { encoded_blob } if !encoded_blob.is_empty() => {
                Some(ContentPart::ImageUrl {
                    url: image_data_url(encoded_blob),
                })
            }
            ContentItem::Image { .. } => None,
            ContentItem::Dataset { result, .. } => Some(ContentPart::Text {
                text: format_analysis_for_context(result),
            }),
        })
        .collect();

    if parts.is_empty() {
        return None;
    }

    let role = match message.role {
        StoredRole::User => MessageRole::User,
        StoredRole::Assistant => MessageRole::Assistant,
        StoredRole::System => MessageRole::System,
    };

    let single_text = match parts.as_slice() {
        [ContentPart::Text { text }] => Some(text.clone()),
        _ => None,
    };
    let content = match single_text {
        Some(text) => MessageContent::Text(text),
        None => MessageContent::Parts(parts),
    };

    Some(ChatMessage { role, content })
}

/// Returns `blob` as a data URL, prefixing bare base64 as JPEG.
pub fn image_data_url(blob: &str) -> String {
    if blob.starts_with("data:image") {
        blob.to_string()
    } else {
        format!("data:image/jpeg;base64,{}", blob)
    }
}
