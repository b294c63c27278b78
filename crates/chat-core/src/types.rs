//! Core conversation types: roles, content items, messages and dataset references.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisResult;

/// Author of a message; serialized as `user` / `assistant` / `system`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

/// One piece of message content. Order within a message is the order the model sees.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentItem {
    Text {
        body: String,
    },
    /// Base64 image, either a bare payload or a `data:image/...;base64,` URL.
    Image {
        encoded_blob: String,
    },
    /// Analysis of the active dataset; `source_ref` names where the data came from.
    Dataset {
        source_ref: String,
        result: AnalysisResult,
    },
}

impl ContentItem {
    pub fn text(body: impl Into<String>) -> Self {
        Self::Text { body: body.into() }
    }

    pub fn image(encoded_blob: impl Into<String>) -> Self {
        Self::Image {
            encoded_blob: encoded_blob.into(),
        }
    }

    pub fn dataset(source_ref: impl Into<String>, result: AnalysisResult) -> Self {
        Self::Dataset {
            source_ref: source_ref.into(),
            result,
        }
    }
}

/// A persisted message. Immutable once stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub conversation_id: String,
    pub role: MessageRole,
    pub content: Vec<ContentItem>,
    /// Strictly increasing within a conversation.
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Concatenates all text items with newlines (images and datasets are skipped).
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|item| match item {
                ContentItem::Text { body } => Some(body.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A message before the store assigns id and timestamp.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub role: MessageRole,
    pub content: Vec<ContentItem>,
}

impl NewMessage {
    pub fn new(role: MessageRole, content: Vec<ContentItem>) -> Self {
        Self { role, content }
    }

    pub fn user_text(body: impl Into<String>) -> Self {
        Self::new(MessageRole::User, vec![ContentItem::text(body)])
    }

    pub fn assistant_text(body: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, vec![ContentItem::text(body)])
    }
}

/// Re-loadable reference to a dataset, stored in conversation metadata instead of the data itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DatasetSource {
    Url { url: String },
    /// Uploaded bytes, kept base64-encoded so the dataset can be rebuilt on later turns.
    Upload { filename: String, data_base64: String },
}

impl DatasetSource {
    /// Short human-readable reference used as `ContentItem::Dataset::source_ref`.
    pub fn describe(&self) -> String {
        match self {
            DatasetSource::Url { url } => url.clone(),
            DatasetSource::Upload { filename, .. } => format!("upload:{}", filename),
        }
    }
}
