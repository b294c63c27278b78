//! Shared test utilities for llm-client integration tests.
//!
//! Provides MockLlmClient (LlmClient) with scripted replies, failures and delays.

use anyhow::Result;
use async_trait::async_trait;
use chat_core::{ContentItem, Message, MessageRole};
use chrono::{Duration as ChronoDuration, Utc};
use llm_client::{LlmClient, StreamChunk, StreamChunkCallback};
use prompt::ChatMessage;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// What the mock does when called.
#[allow(dead_code)]
pub enum Behavior {
    /// Reply with these fragments (joined for `complete`).
    Reply(Vec<String>),
    /// Stream these fragments, then fail.
    FailAfter(Vec<String>, String),
    /// Sleep longer than any test timeout before replying.
    Hang(Duration),
}

pub struct MockLlmClient {
    behavior: Behavior,
    calls: AtomicUsize,
    last_system_prompt: Mutex<Option<String>>,
    last_messages: Mutex<Vec<ChatMessage>>,
}

#[allow(dead_code)]
impl MockLlmClient {
    pub fn new(behavior: Behavior) -> Self {
        Self {
            behavior,
            calls: AtomicUsize::new(0),
            last_system_prompt: Mutex::new(None),
            last_messages: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(text: &str) -> Self {
        Self::new(Behavior::Reply(vec![text.to_string()]))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_system_prompt(&self) -> Option<String> {
        self.last_system_prompt.lock().unwrap().clone()
    }

    pub fn last_messages(&self) -> Vec<ChatMessage> {
        self.last_messages.lock().unwrap().clone()
    }

    fn record(&self, system_prompt: Option<&str>, messages: Vec<ChatMessage>) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_system_prompt.lock().unwrap() = system_prompt.map(str::to_string);
        *self.last_messages.lock().unwrap() = messages;
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(
        &self,
        system_prompt: Option<&str>,
        messages: Vec<ChatMessage>,
    ) -> Result<String> {
        self.record(system_prompt, messages);
        match &self.behavior {
            Behavior::Reply(fragments) => Ok(fragments.concat()),
            Behavior::FailAfter(_, error) => anyhow::bail!("{}", error),
            Behavior::Hang(delay) => {
                tokio::time::sleep(*delay).await;
                Ok("too late".to_string())
            }
        }
    }

    async fn complete_stream(
        &self,
        system_prompt: Option<&str>,
        messages: Vec<ChatMessage>,
        callback: &mut StreamChunkCallback,
    ) -> Result<String> {
        self.record(system_prompt, messages);
        let (fragments, error) = match &self.behavior {
            Behavior::Reply(fragments) => (fragments.clone(), None),
            Behavior::FailAfter(fragments, error) => (fragments.clone(), Some(error.clone())),
            Behavior::Hang(delay) => {
                tokio::time::sleep(*delay).await;
                (vec!["too late".to_string()], None)
            }
        };
        let mut full = String::new();
        for fragment in fragments {
            full.push_str(&fragment);
            callback(StreamChunk {
                content: fragment,
                done: false,
            })
            .await?;
        }
        if let Some(error) = error {
            anyhow::bail!("{}", error);
        }
        callback(StreamChunk {
            content: String::new(),
            done: true,
        })
        .await?;
        Ok(full)
    }
}

/// Builds a stored message with increasing timestamps.
#[allow(dead_code)]
pub fn message(index: i64, role: MessageRole, body: &str) -> Message {
    Message {
        id: format!("m{}", index),
        conversation_id: "conv".to_string(),
        role,
        content: vec![ContentItem::text(body)],
        timestamp: Utc::now() + ChronoDuration::milliseconds(index),
    }
}
