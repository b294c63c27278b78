//! # LLM client abstraction
//!
//! Defines the [`LlmClient`] trait, an OpenAI implementation, and [`CompletionService`], which
//! turns windowed conversation history into a reply (cached, time-bounded, optionally streamed).
//!
//! The stream method uses a boxed callback so that [`LlmClient`] is object-safe (dyn compatible).

use anyhow::Result;
use async_trait::async_trait;
use openai_client::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestMessageContentPartImageArgs,
    ChatCompletionRequestMessageContentPartTextArgs, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, ChatCompletionRequestUserMessageContentPart,
    ImageUrlArgs,
};
use prompt::{ChatMessage, ContentPart, MessageContent, MessageRole};
use std::future::Future;
use std::pin::Pin;

mod cache;
mod completion;
mod config;
mod openai_llm;

pub use cache::{cache_key, ResponseCache};
pub use completion::{apology, CompletionService, DEFAULT_COMPLETION_TIMEOUT};
pub use config::{EnvLlmConfig, LlmConfig};
pub use openai_llm::OpenAILlmClient;

/// A chunk of streamed LLM output; aligned with `openai_client::StreamChunk`.
#[derive(Debug, Clone)]
pub struct StreamChunk {
    pub content: String,
    pub done: bool,
}

/// Type-erased callback for stream chunks so that [`LlmClient`] is dyn compatible.
pub type StreamChunkCallback =
    dyn FnMut(StreamChunk) -> Pin<Box<dyn Future<Output = Result<()>> + Send>> + Send;

/// LLM client interface: completion or streamed completion from a list of messages.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Returns the model reply text. `system_prompt`, when given, is sent first.
    async fn complete(
        &self,
        system_prompt: Option<&str>,
        messages: Vec<ChatMessage>,
    ) -> Result<String>;

    /// Streamed completion: invokes `callback` for each chunk and returns the full reply text.
    /// An error returned by `callback` stops the stream and is propagated.
    async fn complete_stream(
        &self,
        system_prompt: Option<&str>,
        messages: Vec<ChatMessage>,
        callback: &mut StreamChunkCallback,
    ) -> Result<String>;
}

/// Converts a single [`ChatMessage`] into OpenAI API message format.
///
/// Only user messages may carry image parts; for system and assistant messages the text parts
/// are joined.
fn chat_message_to_openai(msg: &ChatMessage) -> Result<ChatCompletionRequestMessage> {
    let openai_msg: ChatCompletionRequestMessage = match (msg.role, &msg.content) {
        (MessageRole::User, MessageContent::Parts(parts)) => {
            let mut converted: Vec<ChatCompletionRequestUserMessageContentPart> = Vec::new();
            for part in parts {
                converted.push(match part {
                    ContentPart::Text { text } => ChatCompletionRequestMessageContentPartTextArgs::default()
                        .text(text.clone())
                        .build()?
                        .into(),
                    ContentPart::ImageUrl { url } => {
                        ChatCompletionRequestMessageContentPartImageArgs::default()
                            .image_url(ImageUrlArgs::default().url(url.clone()).build()?)
                            .build()?
                            .into()
                    }
                });
            }
            ChatCompletionRequestUserMessageArgs::default()
                .content(converted)
                .build()?
                .into()
        }
        (MessageRole::User, content) => ChatCompletionRequestUserMessageArgs::default()
            .content(content.text())
            .build()?
            .into(),
        (MessageRole::System, content) => ChatCompletionRequestSystemMessageArgs::default()
            .content(content.text())
            .build()?
            .into(),
        (MessageRole::Assistant, content) => ChatCompletionRequestAssistantMessageArgs::default()
            .content(content.text())
            .build()?
            .into(),
    };
    Ok(openai_msg)
}

/// Builds the OpenAI request message list: optional system prompt, then `messages`.
fn to_openai_messages(
    system_prompt: Option<&str>,
    messages: &[ChatMessage],
) -> Result<Vec<ChatCompletionRequestMessage>> {
    let mut openai_messages = Vec::with_capacity(messages.len() + 1);
    if let Some(system) = system_prompt.filter(|s| !s.trim().is_empty()) {
        openai_messages.push(
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system.to_string())
                .build()?
                .into(),
        );
    }
    for msg in messages {
        openai_messages.push(chat_message_to_openai(msg)?);
    }
    Ok(openai_messages)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_prepended() {
        let msgs = to_openai_messages(Some("be brief"), &[ChatMessage::user("hi")]).unwrap();
        assert_eq!(msgs.len(), 2);
        assert!(matches!(msgs[0], ChatCompletionRequestMessage::System(_)));
        assert!(matches!(msgs[1], ChatCompletionRequestMessage::User(_)));
    }

    #[test]
    fn test_blank_system_prompt_skipped() {
        let msgs = to_openai_messages(Some("  "), &[ChatMessage::assistant("ok")]).unwrap();
        assert_eq!(msgs.len(), 1);
        assert!(matches!(msgs[0], ChatCompletionRequestMessage::Assistant(_)));
    }

    #[test]
    fn test_user_parts_become_array_content() {
        let msg = ChatMessage {
            role: MessageRole::User,
            content: MessageContent::Parts(vec![
                ContentPart::Text {
                    text: "what is this?".to_string(),
                },
                ContentPart::ImageUrl {
                    url: "data:image/jpeg;base64,aGVsbG8=".to_string(),
                },
            ]),
        };
        let converted = chat_message_to_openai(&msg).unwrap();
        let json = serde_json::to_value(&converted).unwrap();
        assert_eq!(json["role"], "user");
        assert_eq!(json["content"][0]["type"], "text");
        assert_eq!(json["content"][1]["type"], "image_url");
        assert_eq!(
            json["content"][1]["image_url"]["url"],
            "data:image/jpeg;base64,aGVsbG8="
        );
    }
}
