//! [`LlmClient`] backed by openai-client.

use anyhow::Result;
use async_trait::async_trait;
use openai_client::{CompletionOptions, StreamChunk as OpenAIStreamChunk};
use prompt::ChatMessage;
use tracing::instrument;

use super::{to_openai_messages, LlmClient, StreamChunk, StreamChunkCallback};
use crate::config::LlmConfig;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// LlmClient implementation over the OpenAI chat completions API.
#[derive(Clone)]
pub struct OpenAILlmClient {
    client: openai_client::OpenAIClient,
    model: String,
}

impl OpenAILlmClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: openai_client::OpenAIClient::new(api_key),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            client: openai_client::OpenAIClient::with_base_url(api_key, base_url),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Client configured from an [`LlmConfig`] (key, base URL, model, sampling options).
    pub fn from_config(config: &dyn LlmConfig) -> Self {
        Self::with_base_url(config.api_key().to_string(), config.base_url().to_string())
            .with_model(config.model().to_string())
            .with_options(CompletionOptions {
                max_tokens: config.max_tokens(),
                temperature: config.temperature(),
            })
    }

    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    pub fn with_options(mut self, options: CompletionOptions) -> Self {
        self.client = self.client.with_options(options);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl LlmClient for OpenAILlmClient {
    #[instrument(skip(self, system_prompt, messages), fields(model = %self.model))]
    async fn complete(
        &self,
        system_prompt: Option<&str>,
        messages: Vec<ChatMessage>,
    ) -> Result<String> {
        let openai_messages = to_openai_messages(system_prompt, &messages)?;
        self.client
            .chat_completion(&self.model, openai_messages)
            .await
    }

    #[instrument(skip(self, system_prompt, messages, callback), fields(model = %self.model))]
    async fn complete_stream(
        &self,
        system_prompt: Option<&str>,
        messages: Vec<ChatMessage>,
        callback: &mut StreamChunkCallback,
    ) -> Result<String> {
        let openai_messages = to_openai_messages(system_prompt, &messages)?;
        self.client
            .chat_completion_stream(&self.model, openai_messages, |chunk: OpenAIStreamChunk| {
                callback(StreamChunk {
                    content: chunk.content,
                    done: chunk.done,
                })
            })
            .await
    }
}
