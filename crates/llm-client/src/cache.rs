//! Bounded completion response cache keyed by SHA-256 of the request.

use indexmap::IndexMap;
use prompt::ChatMessage;
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;
use tracing::debug;

/// Hex SHA-256 over the system prompt and the serialized message list.
pub fn cache_key(system_prompt: Option<&str>, messages: &[ChatMessage]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(system_prompt.unwrap_or_default().as_bytes());
    hasher.update([0u8]);
    hasher.update(serde_json::to_vec(messages).unwrap_or_default());
    hex::encode(hasher.finalize())
}

/// Insertion-ordered cache; the oldest entry is evicted when full. Capacity 0 disables caching.
#[derive(Debug)]
pub struct ResponseCache {
    capacity: usize,
    entries: Mutex<IndexMap<String, String>>,
}

impl ResponseCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Mutex::new(IndexMap::new()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().await.get(key).cloned()
    }

    pub async fn insert(&self, key: String, value: String) {
        if self.capacity == 0 {
            return;
        }
        let mut entries = self.entries.lock().await;
        if entries.contains_key(&key) {
            entries.insert(key, value);
            return;
        }
        while entries.len() >= self.capacity {
            if let Some((evicted, _)) = entries.shift_remove_index(0) {
                debug!(key = %evicted, "Response cache evicted oldest entry");
            }
        }
        entries.insert(key, value);
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn clear(&self) {
        self.entries.lock().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_depends_on_prompt_and_history() {
        let history = vec![ChatMessage::user("hi")];
        let a = cache_key(Some("sys"), &history);
        assert_eq!(a.len(), 64);
        assert_eq!(a, cache_key(Some("sys"), &history));
        assert_ne!(a, cache_key(Some("other"), &history));
        assert_ne!(a, cache_key(Some("sys"), &[ChatMessage::user("hello")]));
    }

    #[tokio::test]
    async fn test_evicts_oldest_insertion() {
        let cache = ResponseCache::new(2);
        cache.insert("a".into(), "1".into()).await;
        cache.insert("b".into(), "2".into()).await;
        cache.insert("c".into(), "3".into()).await;
        assert_eq!(cache.len().await, 2);
        assert!(cache.get("a").await.is_none());
        assert_eq!(cache.get("c").await.as_deref(), Some("3"));
    }

    #[tokio::test]
    async fn test_zero_capacity_disables() {
        let cache = ResponseCache::new(0);
        cache.insert("a".into(), "1".into()).await;
        assert!(cache.is_empty().await);
    }
}
