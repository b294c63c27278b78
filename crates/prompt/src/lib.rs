//! # Prompt
//!
//! Formats stored conversation history into the message list sent to a chat model.
//!
//! ## Format
//!
//! - **Text** items become text parts.
//! - **Image** items become image URL parts; bare base64 is prefixed with
//!   `data:image/jpeg;base64,`.
//! - **Dataset** items become a readable "Dataset analysis" text block (see
//!   [`format_analysis_for_context`]). Rendered chart images are never inlined.
//! - A message whose only part is text is sent as plain text content.
//!
//! ## External interactions
//!
//! - **AI models**: output is converted to OpenAI chat messages by `llm-client`.

use serde::{Deserialize, Serialize};

mod analysis;
mod conversation;

pub use analysis::format_analysis_for_context;
pub use conversation::{format_conversation, format_message, image_data_url};

/// Role of a message, one-to-one with OpenAI Chat Completions API `role` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System instruction (API `role: "system"`).
    System,
    /// User message (API `role: "user"`).
    User,
    /// Assistant message (API `role: "assistant"`).
    Assistant,
}

/// One part of a multi-part message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { url: String },
}

/// Message content: plain text, or ordered parts when images are involved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

impl MessageContent {
    /// All text parts joined with newlines.
    pub fn text(&self) -> String {
        match self {
            MessageContent::Text(text) => text.clone(),
            MessageContent::Parts(parts) => parts
                .iter()
                .filter_map(|p| match p {
                    ContentPart::Text { text } => Some(text.as_str()),
                    ContentPart::ImageUrl { .. } => None,
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

/// A single chat message, one-to-one with one element of OpenAI `messages` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: MessageContent,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: MessageContent::Text(content.into()),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: MessageContent::Text(content.into()),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: MessageContent::Text(content.into()),
        }
    }

    /// Text content of the message (image parts skipped).
    pub fn text(&self) -> String {
        self.content.text()
    }
}

/// Default system instruction when no custom system prompt is configured.
pub const DEFAULT_SYSTEM_MESSAGE: &str = "You are a helpful AI assistant integrated into a chat application.

You can:
1. Have multi-turn conversations with users
2. Analyze and discuss images that users upload
3. Analyze tabular datasets (CSV) and answer questions about them
4. Help with data analysis tasks like summarizing data, computing statistics, and identifying patterns

When discussing images, be specific about what you observe.
When analyzing datasets, provide clear, actionable insights.
Be concise but informative in your responses.";

/// Title line of a dataset analysis block.
pub const SECTION_DATASET: &str = "Dataset analysis:";
