//! Conversation record.

use chat_core::DatasetSource;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

pub const DEFAULT_TITLE: &str = "New Conversation";

/// Metadata key holding the active [`DatasetSource`].
pub const DATASET_SOURCE_KEY: &str = "dataset_source";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    /// Bumped on every appended message and metadata change.
    pub updated_at: DateTime<Utc>,
    pub message_count: usize,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl Conversation {
    pub fn new(id: String, title: String, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title,
            created_at: now,
            updated_at: now,
            message_count: 0,
            metadata: Map::new(),
        }
    }

    /// The dataset last attached to this conversation, if any.
    pub fn dataset_source(&self) -> Option<DatasetSource> {
        let value = self.metadata.get(DATASET_SOURCE_KEY)?;
        match serde_json::from_value(value.clone()) {
            Ok(source) => Some(source),
            Err(e) => {
                warn!(conversation_id = %self.id, error = %e, "Ignoring unreadable dataset source");
                None
            }
        }
    }
}
