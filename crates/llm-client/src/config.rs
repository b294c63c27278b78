//! LLM configuration: trait and env-based implementation.

use anyhow::{Context, Result};
use chat_core::env::parse_env;
use std::env;
use std::time::Duration;

/// LLM configuration interface for OpenAI-compatible APIs.
pub trait LlmConfig: Send + Sync {
    fn api_key(&self) -> &str;
    fn base_url(&self) -> &str;
    fn model(&self) -> &str;
    fn system_prompt(&self) -> Option<&str>;
    fn completion_timeout(&self) -> Duration;
    fn response_cache_capacity(&self) -> usize;
    fn max_tokens(&self) -> u32;
    fn temperature(&self) -> f32;
}

/// LLM config loaded from environment variables.
#[derive(Debug, Clone)]
pub struct EnvLlmConfig {
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub llm_model: String,
    pub llm_system_prompt: Option<String>,
    pub completion_timeout_secs: u64,
    pub response_cache_capacity: usize,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl LlmConfig for EnvLlmConfig {
    fn api_key(&self) -> &str {
        &self.openai_api_key
    }
    fn base_url(&self) -> &str {
        &self.openai_base_url
    }
    fn model(&self) -> &str {
        &self.llm_model
    }
    fn system_prompt(&self) -> Option<&str> {
        self.llm_system_prompt.as_deref()
    }
    fn completion_timeout(&self) -> Duration {
        Duration::from_secs(self.completion_timeout_secs)
    }
    fn response_cache_capacity(&self) -> usize {
        self.response_cache_capacity
    }
    fn max_tokens(&self) -> u32 {
        self.max_tokens
    }
    fn temperature(&self) -> f32 {
        self.temperature
    }
}

impl EnvLlmConfig {
    /// Load from environment variables.
    pub fn from_env() -> Result<Self> {
        let openai_api_key = env::var("OPENAI_API_KEY").context("OPENAI_API_KEY not set")?;
        let openai_base_url = env::var("OPENAI_BASE_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1".to_string());
        let llm_model = env::var("MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());
        let llm_system_prompt = env::var("LLM_SYSTEM_PROMPT")
            .or_else(|_| env::var("SYSTEM_PROMPT"))
            .ok()
            .filter(|s| !s.trim().is_empty());
        Ok(Self {
            openai_api_key,
            openai_base_url,
            llm_model,
            llm_system_prompt,
            completion_timeout_secs: parse_env("COMPLETION_TIMEOUT_SECS").unwrap_or(60),
            response_cache_capacity: parse_env("RESPONSE_CACHE_CAPACITY").unwrap_or(100),
            max_tokens: parse_env("MAX_TOKENS").unwrap_or(1024),
            temperature: parse_env("TEMPERATURE").unwrap_or(0.7),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const KEYS: &[&str] = &[
        "OPENAI_API_KEY",
        "OPENAI_BASE_URL",
        "MODEL",
        "LLM_SYSTEM_PROMPT",
        "SYSTEM_PROMPT",
        "COMPLETION_TIMEOUT_SECS",
        "RESPONSE_CACHE_CAPACITY",
        "MAX_TOKENS",
        "TEMPERATURE",
    ];

    fn clear() {
        for key in KEYS {
            env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn test_from_env_requires_api_key() {
        clear();
        assert!(EnvLlmConfig::from_env().is_err());
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        clear();
        env::set_var("OPENAI_API_KEY", "sk-test");
        let config = EnvLlmConfig::from_env().unwrap();
        assert_eq!(config.model(), "gpt-4o-mini");
        assert_eq!(config.base_url(), "https://api.openai.com/v1");
        assert_eq!(config.completion_timeout(), Duration::from_secs(60));
        assert_eq!(config.response_cache_capacity(), 100);
        assert_eq!(config.max_tokens(), 1024);
        assert!(config.system_prompt().is_none());
        clear();
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        clear();
        env::set_var("OPENAI_API_KEY", "sk-test");
        env::set_var("MODEL", "gpt-4o");
        env::set_var("COMPLETION_TIMEOUT_SECS", "5");
        env::set_var("TEMPERATURE", "0.2");
        env::set_var("LLM_SYSTEM_PROMPT", "Answer in French.");
        env::set_var("MAX_TOKENS", "not-a-number");
        let config = EnvLlmConfig::from_env().unwrap();
        assert_eq!(config.model(), "gpt-4o");
        assert_eq!(config.completion_timeout(), Duration::from_secs(5));
        assert!((config.temperature() - 0.2).abs() < f32::EPSILON);
        assert_eq!(config.system_prompt(), Some("Answer in French."));
        assert_eq!(config.max_tokens(), 1024);
        clear();
    }
}
