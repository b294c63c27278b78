//! Per-conversation analyst sessions: the prepared (possibly downsampled) dataset and the
//! context text built from it.

use dataset::Dataset;
use indexmap::IndexMap;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// What the analyst keeps for a conversation.
#[derive(Debug, Clone)]
pub struct PreparedDataset {
    /// Identifies the source dataset; a mismatch means the conversation switched datasets.
    pub fingerprint: String,
    pub dataset: Dataset,
    pub original_rows: usize,
    pub sampled: bool,
    /// Schema, statistics and sample rows as sent to the model.
    pub context: String,
}

/// Snapshot of the cache for introspection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalystCacheInfo {
    pub cached_conversations: Vec<String>,
    pub cache_size: usize,
    pub max_dataframe_size: usize,
    pub available: bool,
}

/// Hex SHA-256 over the shape, column names and types, and the first rows of `dataset`.
pub fn fingerprint(dataset: &Dataset) -> String {
    let mut hasher = Sha256::new();
    hasher.update(dataset.row_count().to_le_bytes());
    for column in dataset.columns() {
        hasher.update(column.name().as_bytes());
        hasher.update([0u8]);
        hasher.update(column.kind().as_str().as_bytes());
        hasher.update([0u8]);
    }
    if let Ok(head) = dataset.to_csv_string(5) {
        hasher.update(head.as_bytes());
    }
    hex::encode(hasher.finalize())
}

/// Bounded by conversation count; the oldest insertion is evicted on overflow.
#[derive(Debug)]
pub struct AnalystCache {
    capacity: usize,
    sessions: Mutex<IndexMap<String, Arc<PreparedDataset>>>,
}

impl AnalystCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            sessions: Mutex::new(IndexMap::new()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The session for `conversation_id` if it was prepared from a dataset with `fingerprint`.
    pub async fn get(&self, conversation_id: &str, fingerprint: &str) -> Option<Arc<PreparedDataset>> {
        let sessions = self.sessions.lock().await;
        sessions
            .get(conversation_id)
            .filter(|s| s.fingerprint == fingerprint)
            .cloned()
    }

    pub async fn insert(&self, conversation_id: &str, prepared: Arc<PreparedDataset>) {
        if self.capacity == 0 {
            return;
        }
        let mut sessions = self.sessions.lock().await;
        if sessions.contains_key(conversation_id) {
            sessions.insert(conversation_id.to_string(), prepared);
            return;
        }
        while sessions.len() >= self.capacity {
            if let Some((evicted, _)) = sessions.shift_remove_index(0) {
                debug!(conversation_id = %evicted, "Analyst session evicted");
            }
        }
        sessions.insert(conversation_id.to_string(), prepared);
    }

    /// Drops one conversation's session; returns whether it existed.
    pub async fn evict(&self, conversation_id: &str) -> bool {
        let removed = self.sessions.lock().await.shift_remove(conversation_id).is_some();
        if removed {
            info!(conversation_id = %conversation_id, "Analyst session cleared");
        }
        removed
    }

    pub async fn clear(&self) {
        let mut sessions = self.sessions.lock().await;
        info!(count = sessions.len(), "Analyst cache cleared");
        sessions.clear();
    }

    pub async fn conversation_ids(&self) -> Vec<String> {
        self.sessions.lock().await.keys().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
