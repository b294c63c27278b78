mod summary_test;

use chat_core::{ContentItem, Message, MessageRole};
use chrono::{Duration, TimeZone, Utc};

/// Builds a text message whose body is `words` copies of "word".
pub(crate) fn text_message(index: usize, words: usize) -> Message {
    let body = vec!["word"; words].join(" ");
    Message {
        id: format!("m{}", index),
        conversation_id: "conv".to_string(),
        role: if index % 2 == 0 {
            MessageRole::User
        } else {
            MessageRole::Assistant
        },
        content: vec![ContentItem::text(body)],
        timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
            + Duration::seconds(index as i64),
    }
}

pub(crate) fn ids(messages: &[Message]) -> Vec<String> {
    messages.iter().map(|m| m.id.clone()).collect()
}
