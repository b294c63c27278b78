//! Integration tests for CompletionService.
//!
//! Covers system prompt handling, response caching, timeouts, and streaming into an mpsc sink.
//! Uses MockLlmClient from tests/common.

mod common;

use chat_core::MessageRole;
use common::{message, Behavior, MockLlmClient};
use llm_client::CompletionService;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

fn history() -> Vec<chat_core::Message> {
    vec![
        message(0, MessageRole::User, "hello"),
        message(1, MessageRole::Assistant, "hi there"),
        message(2, MessageRole::User, "summarize the data"),
    ]
}

/// **Test: The default system prompt is sent ahead of the formatted history.**
#[tokio::test]
async fn test_complete_sends_system_prompt_and_history() {
    let mock = Arc::new(MockLlmClient::replying("Sure."));
    let service = CompletionService::new(mock.clone());

    let reply = service.complete(&history()).await;

    assert_eq!(reply, "Sure.");
    assert_eq!(mock.calls(), 1);
    assert_eq!(
        mock.last_system_prompt().as_deref(),
        Some(prompt::DEFAULT_SYSTEM_MESSAGE)
    );
    let sent = mock.last_messages();
    assert_eq!(sent.len(), 3);
    assert_eq!(sent[2].text(), "summarize the data");
}

/// **Test: A blank custom system prompt keeps the default.**
#[tokio::test]
async fn test_blank_system_prompt_ignored() {
    let mock = Arc::new(MockLlmClient::replying("ok"));
    let service = CompletionService::new(mock).with_system_prompt("   ");
    assert_eq!(service.system_prompt(), prompt::DEFAULT_SYSTEM_MESSAGE);
}

/// **Test: Identical history is answered from the cache on the second call.**
#[tokio::test]
async fn test_cache_hit_skips_upstream() {
    let mock = Arc::new(MockLlmClient::replying("cached answer"));
    let service = CompletionService::new(mock.clone()).with_cache_capacity(4);

    let first = service.complete(&history()).await;
    let second = service.complete(&history()).await;

    assert_eq!(first, second);
    assert_eq!(mock.calls(), 1);
    assert_eq!(service.cache().unwrap().len().await, 1);
}

/// **Test: Upstream errors become an apology reply, never an error.**
#[tokio::test]
async fn test_upstream_error_returns_apology() {
    let mock = Arc::new(MockLlmClient::new(Behavior::FailAfter(
        vec![],
        "invalid api key".to_string(),
    )));
    let service = CompletionService::new(mock).with_cache_capacity(4);

    let reply = service.complete(&history()).await;

    assert!(reply.starts_with("I apologize, but I encountered an error"));
    assert!(reply.contains("invalid api key"));
    assert!(service.cache().unwrap().is_empty().await);
}

/// **Test: A slow upstream is cut off by the timeout.**
#[tokio::test]
async fn test_timeout_returns_apology() {
    let mock = Arc::new(MockLlmClient::new(Behavior::Hang(Duration::from_secs(5))));
    let service = CompletionService::new(mock).with_timeout(Duration::from_millis(50));

    let reply = service.complete(&history()).await;

    assert!(reply.contains("timed out"));
}

/// **Test: Streamed fragments reach the sink in order and the full text is returned.**
#[tokio::test]
async fn test_stream_delivers_fragments() {
    let mock = Arc::new(MockLlmClient::new(Behavior::Reply(vec![
        "The ".to_string(),
        "mean ".to_string(),
        "is 42.".to_string(),
    ])));
    let service = CompletionService::new(mock);
    let (tx, mut rx) = mpsc::channel(16);

    let reply = service.complete_stream(&history(), tx).await;

    let mut received = Vec::new();
    while let Some(fragment) = rx.recv().await {
        received.push(fragment);
    }
    assert_eq!(reply, "The mean is 42.");
    assert_eq!(received, vec!["The ", "mean ", "is 42."]);
}

/// **Test: Closing the sink stops the stream and keeps the partial text.**
#[tokio::test]
async fn test_stream_closed_sink_keeps_partial() {
    let mock = Arc::new(MockLlmClient::new(Behavior::Reply(vec![
        "one ".to_string(),
        "two ".to_string(),
        "three".to_string(),
    ])));
    let service = CompletionService::new(mock);
    let (tx, rx) = mpsc::channel(16);
    drop(rx);

    let reply = service.complete_stream(&history(), tx).await;

    assert_eq!(reply, "");
}

/// **Test: A mid-stream failure keeps what was already delivered.**
#[tokio::test]
async fn test_stream_failure_after_output_keeps_partial() {
    let mock = Arc::new(MockLlmClient::new(Behavior::FailAfter(
        vec!["partial ".to_string(), "answer".to_string()],
        "connection reset".to_string(),
    )));
    let service = CompletionService::new(mock);
    let (tx, mut rx) = mpsc::channel(16);

    let reply = service.complete_stream(&history(), tx).await;

    assert_eq!(reply, "partial answer");
    let mut received = Vec::new();
    while let Some(fragment) = rx.recv().await {
        received.push(fragment);
    }
    assert_eq!(received.concat(), "partial answer");
}

/// **Test: A failure before any output sends the apology through the sink.**
#[tokio::test]
async fn test_stream_failure_without_output_sends_apology() {
    let mock = Arc::new(MockLlmClient::new(Behavior::FailAfter(
        vec![],
        "rate limited".to_string(),
    )));
    let service = CompletionService::new(mock);
    let (tx, mut rx) = mpsc::channel(16);

    let reply = service.complete_stream(&history(), tx).await;

    assert!(reply.contains("rate limited"));
    assert_eq!(rx.recv().await.as_deref(), Some(reply.as_str()));
}
