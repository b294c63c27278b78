//! In-memory [`DocumentStore`].
//!
//! Data is lost on restart. All state sits behind one `Arc<RwLock<..>>`, so the store is cheap
//! to clone and safe to share across tasks.

use async_trait::async_trait;
use chat_core::{ChatError, Message, NewMessage, Result};
use chrono::{DateTime, Duration, Utc};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::model::Conversation;
use crate::store::DocumentStore;

#[derive(Debug, Default)]
struct State {
    conversations: HashMap<String, Conversation>,
    messages: HashMap<String, Vec<Message>>,
    /// Last timestamp handed out; every new one is strictly later.
    clock: Option<DateTime<Utc>>,
}

impl State {
    fn tick(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let next = match self.clock {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.clock = Some(next);
        next
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryDocumentStore {
    state: Arc<RwLock<State>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn conversation_count(&self) -> usize {
        self.state.read().await.conversations.len()
    }
}

fn not_found(id: &str) -> ChatError {
    ChatError::NotFound(format!("conversation {}", id))
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn create_conversation(&self, title: &str) -> Result<Conversation> {
        let mut state = self.state.write().await;
        let now = state.tick();
        let conversation = Conversation::new(Uuid::new_v4().to_string(), title.to_string(), now);
        state
            .conversations
            .insert(conversation.id.clone(), conversation.clone());
        state.messages.insert(conversation.id.clone(), Vec::new());
        info!(conversation_id = %conversation.id, "Conversation created");
        Ok(conversation)
    }

    async fn get_conversation(&self, id: &str) -> Result<Option<Conversation>> {
        Ok(self.state.read().await.conversations.get(id).cloned())
    }

    async fn append_message(&self, conversation_id: &str, message: NewMessage) -> Result<Message> {
        let mut state = self.state.write().await;
        if !state.conversations.contains_key(conversation_id) {
            return Err(not_found(conversation_id));
        }
        let timestamp = state.tick();
        let stored = Message {
            id: Uuid::new_v4().to_string(),
            conversation_id: conversation_id.to_string(),
            role: message.role,
            content: message.content,
            timestamp,
        };
        state
            .messages
            .entry(conversation_id.to_string())
            .or_default()
            .push(stored.clone());
        if let Some(conversation) = state.conversations.get_mut(conversation_id) {
            conversation.message_count += 1;
            conversation.updated_at = timestamp;
        }
        debug!(
            conversation_id = %conversation_id,
            message_id = %stored.id,
            items = stored.content.len(),
            "Message appended"
        );
        Ok(stored)
    }

    async fn fetch_messages(&self, conversation_id: &str, limit: Option<usize>) -> Result<Vec<Message>> {
        let state = self.state.read().await;
        if !state.conversations.contains_key(conversation_id) {
            return Err(not_found(conversation_id));
        }
        let messages = state
            .messages
            .get(conversation_id)
            .map(Vec::as_slice)
            .unwrap_or_default();
        let take = limit.unwrap_or(messages.len()).min(messages.len());
        Ok(messages[..take].to_vec())
    }

    async fn merge_metadata(&self, conversation_id: &str, patch: Map<String, Value>) -> Result<bool> {
        let mut state = self.state.write().await;
        if !state.conversations.contains_key(conversation_id) {
            return Ok(false);
        }
        let now = state.tick();
        if let Some(conversation) = state.conversations.get_mut(conversation_id) {
            for (key, value) in patch {
                conversation.metadata.insert(key, value);
            }
            conversation.updated_at = now;
        }
        Ok(true)
    }

    async fn update_title(&self, conversation_id: &str, title: &str) -> Result<bool> {
        let mut state = self.state.write().await;
        if !state.conversations.contains_key(conversation_id) {
            return Ok(false);
        }
        let now = state.tick();
        if let Some(conversation) = state.conversations.get_mut(conversation_id) {
            conversation.title = title.to_string();
            conversation.updated_at = now;
        }
        Ok(true)
    }

    async fn list_conversations(&self, limit: usize) -> Result<Vec<Conversation>> {
        let state = self.state.read().await;
        let mut conversations: Vec<Conversation> = state.conversations.values().cloned().collect();
        conversations.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        conversations.truncate(limit);
        Ok(conversations)
    }

    async fn delete_conversation(&self, id: &str) -> Result<bool> {
        let mut state = self.state.write().await;
        state.messages.remove(id);
        let removed = state.conversations.remove(id).is_some();
        if removed {
            info!(conversation_id = %id, "Conversation deleted");
        }
        Ok(removed)
    }
}
