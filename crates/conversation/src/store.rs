//! Storage interface for conversations and messages.

use async_trait::async_trait;
use chat_core::{Message, NewMessage, Result};
use serde_json::{Map, Value};

use crate::model::Conversation;

/// Document-style storage for conversations.
///
/// Operations on a missing conversation return [`ChatError::NotFound`](chat_core::ChatError)
/// unless documented otherwise.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn create_conversation(&self, title: &str) -> Result<Conversation>;

    /// `None` when no conversation has this id.
    async fn get_conversation(&self, id: &str) -> Result<Option<Conversation>>;

    /// Stores `message`, assigning id and a timestamp strictly after the previous message's.
    async fn append_message(&self, conversation_id: &str, message: NewMessage) -> Result<Message>;

    /// Messages in chronological order; at most the first `limit` when given.
    async fn fetch_messages(&self, conversation_id: &str, limit: Option<usize>) -> Result<Vec<Message>>;

    /// Shallow-merges `patch` into the conversation metadata. Returns false if it does not exist.
    async fn merge_metadata(&self, conversation_id: &str, patch: Map<String, Value>) -> Result<bool>;

    /// Renames a conversation. Returns false if it does not exist.
    async fn update_title(&self, conversation_id: &str, title: &str) -> Result<bool>;

    /// Most recently updated first.
    async fn list_conversations(&self, limit: usize) -> Result<Vec<Conversation>>;

    /// Removes the conversation and its messages. Returns false if it did not exist.
    async fn delete_conversation(&self, id: &str) -> Result<bool>;
}
