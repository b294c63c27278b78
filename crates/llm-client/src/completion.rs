//! Completion service: windowed history in, assistant reply out.

use chat_core::Message;
use prompt::{format_conversation, ChatMessage, DEFAULT_SYSTEM_MESSAGE};
use std::fmt::Display;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, instrument, warn};

use crate::cache::{cache_key, ResponseCache};
use crate::{LlmClient, StreamChunk, StreamChunkCallback};

pub const DEFAULT_COMPLETION_TIMEOUT: Duration = Duration::from_secs(60);

/// Reply text used when the model could not be reached.
pub fn apology(err: impl Display) -> String {
    format!(
        "I apologize, but I encountered an error: {}. Please check your API key and try again.",
        err
    )
}

/// Returned from the stream callback when the receiving side of the sink is gone.
#[derive(Debug, thiserror::Error)]
#[error("stream sink closed")]
struct SinkClosed;

type ChunkFuture = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send>>;

/// Formats history, applies the system prompt, and calls the [`LlmClient`] under a timeout.
///
/// Failures never surface as errors: the caller always gets reply text (an apology when the
/// upstream call failed or timed out).
pub struct CompletionService {
    llm: Arc<dyn LlmClient>,
    system_prompt: String,
    timeout: Duration,
    cache: Option<ResponseCache>,
}

impl CompletionService {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self {
            llm,
            system_prompt: DEFAULT_SYSTEM_MESSAGE.to_string(),
            timeout: DEFAULT_COMPLETION_TIMEOUT,
            cache: None,
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        let system_prompt = system_prompt.into();
        if !system_prompt.trim().is_empty() {
            self.system_prompt = system_prompt;
        }
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Enables the response cache; capacity 0 leaves it disabled.
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache = (capacity > 0).then(|| ResponseCache::new(capacity));
        self
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn cache(&self) -> Option<&ResponseCache> {
        self.cache.as_ref()
    }

    async fn cached(&self, key: &str) -> Option<String> {
        match &self.cache {
            Some(cache) => cache.get(key).await,
            None => None,
        }
    }

    async fn remember(&self, key: String, reply: &str) {
        if let Some(cache) = &self.cache {
            if !reply.is_empty() {
                cache.insert(key, reply.to_string()).await;
            }
        }
    }

    fn prepare(&self, history: &[Message]) -> (Vec<ChatMessage>, String) {
        let messages = format_conversation(history);
        let key = cache_key(Some(&self.system_prompt), &messages);
        (messages, key)
    }

    /// Full reply for `history`.
    #[instrument(skip(self, history), fields(history_len = history.len()))]
    pub async fn complete(&self, history: &[Message]) -> String {
        let (messages, key) = self.prepare(history);
        if let Some(hit) = self.cached(&key).await {
            debug!("Response cache hit");
            return hit;
        }

        let call = self.llm.complete(Some(&self.system_prompt), messages);
        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(reply)) => {
                info!(reply_len = reply.len(), "Completion finished");
                self.remember(key, &reply).await;
                reply
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Completion failed");
                apology(e)
            }
            Err(_) => {
                warn!(timeout_secs = self.timeout.as_secs(), "Completion timed out");
                apology(format!("request timed out after {}s", self.timeout.as_secs()))
            }
        }
    }

    /// Streams fragments into `sink` as they arrive and returns the reply text.
    ///
    /// A closed sink stops the stream; the text delivered so far is returned. When the upstream
    /// call fails before anything was delivered, the apology is sent and returned instead.
    #[instrument(skip(self, history, sink), fields(history_len = history.len()))]
    pub async fn complete_stream(&self, history: &[Message], sink: mpsc::Sender<String>) -> String {
        let (messages, key) = self.prepare(history);
        if let Some(hit) = self.cached(&key).await {
            debug!("Response cache hit (stream)");
            let _ = sink.send(hit.clone()).await;
            return hit;
        }

        let delivered = Arc::new(Mutex::new(String::new()));
        let mut callback: Box<StreamChunkCallback> = {
            let sink = sink.clone();
            let delivered = Arc::clone(&delivered);
            Box::new(move |chunk: StreamChunk| -> ChunkFuture {
                let sink = sink.clone();
                let delivered = Arc::clone(&delivered);
                Box::pin(async move {
                    if chunk.content.is_empty() {
                        return Ok(());
                    }
                    sink.send(chunk.content.clone())
                        .await
                        .map_err(|_| SinkClosed)?;
                    delivered.lock().await.push_str(&chunk.content);
                    Ok(())
                })
            })
        };

        let call = self
            .llm
            .complete_stream(Some(&self.system_prompt), messages, &mut *callback);
        let outcome = tokio::time::timeout(self.timeout, call).await;
        let partial = delivered.lock().await.clone();

        let failure = match outcome {
            Ok(Ok(reply)) => {
                info!(reply_len = reply.len(), "Streamed completion finished");
                self.remember(key, &reply).await;
                return reply;
            }
            Ok(Err(e)) if e.downcast_ref::<SinkClosed>().is_some() => {
                info!(partial_len = partial.len(), "Stream sink closed, keeping partial reply");
                return partial;
            }
            Ok(Err(e)) => {
                warn!(error = %e, partial_len = partial.len(), "Streamed completion failed");
                e.to_string()
            }
            Err(_) => {
                warn!(
                    timeout_secs = self.timeout.as_secs(),
                    partial_len = partial.len(),
                    "Streamed completion timed out"
                );
                format!("request timed out after {}s", self.timeout.as_secs())
            }
        };

        if !partial.is_empty() {
            return partial;
        }
        let reply = apology(failure);
        let _ = sink.send(reply.clone()).await;
        reply
    }
}
