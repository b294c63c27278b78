//! Shared test utilities for conversation integration tests.
//!
//! Provides ScriptedLlm (LlmClient) and a ChatService wired to the in-memory store.

use anyhow::Result;
use async_trait::async_trait;
use conversation::{ChatService, InMemoryDocumentStore};
use llm_client::{CompletionService, LlmClient, StreamChunk, StreamChunkCallback};
use prompt::ChatMessage;
use query_router::QueryRouter;
use std::sync::{Arc, Mutex};

pub const CSV: &str = "age,salary,dept\n22,40000,eng\n30,52000,eng\n41,70000,\n55,91000,ops\n60,99000,ops\n";

/// Replies with a fixed text and records every request it receives.
pub struct ScriptedLlm {
    reply: String,
    requests: Mutex<Vec<Vec<ChatMessage>>>,
}

#[allow(dead_code)]
impl ScriptedLlm {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> Vec<ChatMessage> {
        self.requests.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn complete(
        &self,
        _system_prompt: Option<&str>,
        messages: Vec<ChatMessage>,
    ) -> Result<String> {
        self.requests.lock().unwrap().push(messages);
        Ok(self.reply.clone())
    }

    async fn complete_stream(
        &self,
        _system_prompt: Option<&str>,
        messages: Vec<ChatMessage>,
        callback: &mut StreamChunkCallback,
    ) -> Result<String> {
        self.requests.lock().unwrap().push(messages);
        for word in self.reply.split_inclusive(' ') {
            callback(StreamChunk {
                content: word.to_string(),
                done: false,
            })
            .await?;
        }
        callback(StreamChunk {
            content: String::new(),
            done: true,
        })
        .await?;
        Ok(self.reply.clone())
    }
}

/// ChatService over a fresh in-memory store, the default router and `llm`.
#[allow(dead_code)]
pub fn service(llm: Arc<ScriptedLlm>) -> (ChatService, InMemoryDocumentStore) {
    let store = InMemoryDocumentStore::new();
    let completion = CompletionService::new(llm);
    let service = ChatService::new(
        Arc::new(store.clone()),
        Arc::new(QueryRouter::default()),
        Arc::new(completion),
    );
    (service, store)
}
