//! AppConfig: log file plus the configs owned by each crate. Loaded from env (call
//! `dotenvy::dotenv()` first).

use anyhow::{Context, Result};
use context_window::WindowConfig;
use llm_client::EnvLlmConfig;
use query_router::RouterConfig;
use std::env;

pub const DEFAULT_LOG_FILE: &str = "logs/datachat.log";

pub struct AppConfig {
    /// LOG_FILE
    pub log_file: String,
    pub window: WindowConfig,
    pub router: RouterConfig,
    /// `None` when OPENAI_API_KEY is not set.
    pub llm: Option<EnvLlmConfig>,
}

impl AppConfig {
    pub fn load() -> Self {
        Self {
            log_file: env::var("LOG_FILE")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_LOG_FILE.to_string()),
            window: WindowConfig::from_env(),
            router: RouterConfig::from_env(),
            llm: EnvLlmConfig::from_env().ok(),
        }
    }

    /// LLM config or an error naming the missing variable.
    pub fn require_llm(&self) -> Result<&EnvLlmConfig> {
        self.llm
            .as_ref()
            .context("OPENAI_API_KEY is required for this command. Set it in .env or environment.")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use llm_client::LlmConfig;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_load_without_api_key() {
        env::remove_var("OPENAI_API_KEY");
        env::remove_var("LOG_FILE");
        let config = AppConfig::load();
        assert_eq!(config.log_file, DEFAULT_LOG_FILE);
        assert!(config.llm.is_none());
        assert!(config.require_llm().is_err());
    }

    #[test]
    #[serial]
    fn test_load_with_api_key() {
        env::set_var("OPENAI_API_KEY", "sk-test");
        env::set_var("LOG_FILE", "/tmp/datachat-test.log");
        let config = AppConfig::load();
        env::remove_var("OPENAI_API_KEY");
        env::remove_var("LOG_FILE");
        assert_eq!(config.log_file, "/tmp/datachat-test.log");
        assert_eq!(config.require_llm().unwrap().api_key(), "sk-test");
    }
}
