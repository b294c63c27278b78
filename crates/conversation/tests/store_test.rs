//! Integration tests for InMemoryDocumentStore.
//!
//! Covers conversation lifecycle, message ordering and limits, metadata merging and listing order.

use chat_core::{ChatError, MessageRole, NewMessage};
use conversation::{DocumentStore, InMemoryDocumentStore, DEFAULT_TITLE};
use serde_json::{json, Map};

/// **Test: Appended messages get strictly increasing timestamps and update the conversation.**
#[tokio::test]
async fn test_append_orders_messages_and_counts() {
    let store = InMemoryDocumentStore::new();
    let conversation = store.create_conversation(DEFAULT_TITLE).await.unwrap();

    for i in 0..5 {
        store
            .append_message(&conversation.id, NewMessage::user_text(format!("msg {}", i)))
            .await
            .unwrap();
    }

    let messages = store.fetch_messages(&conversation.id, None).await.unwrap();
    assert_eq!(messages.len(), 5);
    assert!(messages.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
    assert_eq!(messages[0].text(), "msg 0");
    assert!(messages.iter().all(|m| m.role == MessageRole::User));

    let limited = store.fetch_messages(&conversation.id, Some(2)).await.unwrap();
    assert_eq!(limited.len(), 2);
    assert_eq!(limited[1].text(), "msg 1");

    let stored = store.get_conversation(&conversation.id).await.unwrap().unwrap();
    assert_eq!(stored.message_count, 5);
    assert_eq!(stored.updated_at, messages[4].timestamp);
}

/// **Test: Operations on a missing conversation report NotFound or false.**
#[tokio::test]
async fn test_missing_conversation() {
    let store = InMemoryDocumentStore::new();

    let err = store
        .append_message("nope", NewMessage::user_text("hi"))
        .await
        .unwrap_err();
    assert!(matches!(err, ChatError::NotFound(_)));
    assert!(matches!(
        store.fetch_messages("nope", None).await.unwrap_err(),
        ChatError::NotFound(_)
    ));
    assert!(store.get_conversation("nope").await.unwrap().is_none());
    assert!(!store.merge_metadata("nope", Map::new()).await.unwrap());
    assert!(!store.delete_conversation("nope").await.unwrap());
}

/// **Test: Metadata patches merge shallowly.**
#[tokio::test]
async fn test_merge_metadata() {
    let store = InMemoryDocumentStore::new();
    let conversation = store.create_conversation("data").await.unwrap();

    let mut first = Map::new();
    first.insert("a".to_string(), json!(1));
    first.insert("b".to_string(), json!({"x": 1}));
    assert!(store.merge_metadata(&conversation.id, first).await.unwrap());

    let mut second = Map::new();
    second.insert("b".to_string(), json!({"y": 2}));
    assert!(store.merge_metadata(&conversation.id, second).await.unwrap());

    let stored = store.get_conversation(&conversation.id).await.unwrap().unwrap();
    assert_eq!(stored.metadata["a"], 1);
    assert_eq!(stored.metadata["b"], json!({"y": 2}));
}

/// **Test: Listing returns the most recently updated conversation first, then deletion removes it.**
#[tokio::test]
async fn test_list_and_delete() {
    let store = InMemoryDocumentStore::new();
    let older = store.create_conversation("older").await.unwrap();
    let newer = store.create_conversation("newer").await.unwrap();
    store
        .append_message(&older.id, NewMessage::user_text("bump"))
        .await
        .unwrap();

    let listed = store.list_conversations(10).await.unwrap();
    assert_eq!(listed[0].id, older.id);
    assert_eq!(listed[1].id, newer.id);
    assert_eq!(store.list_conversations(1).await.unwrap().len(), 1);

    assert!(store.update_title(&newer.id, "renamed").await.unwrap());
    assert_eq!(store.list_conversations(10).await.unwrap()[0].title, "renamed");

    assert!(store.delete_conversation(&older.id).await.unwrap());
    assert_eq!(store.conversation_count().await, 1);
}
