//! Window configuration loaded from environment variables.

use chat_core::env::{parse_env, parse_env_bool};

/// Limits applied to conversation history before each model call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowConfig {
    /// SLIDING_WINDOW_ENABLED
    pub enabled: bool,
    /// SLIDING_WINDOW_MAX_MESSAGES
    pub max_messages: usize,
    /// SLIDING_WINDOW_PRESERVE_FIRST; negative values are clamped to 0
    pub preserve_first: usize,
    /// SLIDING_WINDOW_TOKEN_LIMIT
    pub token_limit: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_messages: 20,
            preserve_first: 2,
            token_limit: 100_000,
        }
    }
}

impl WindowConfig {
    /// Loads from environment, falling back to [`WindowConfig::default`] per field.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let enabled = parse_env_bool("SLIDING_WINDOW_ENABLED").unwrap_or(defaults.enabled);
        let max_messages =
            parse_env("SLIDING_WINDOW_MAX_MESSAGES").unwrap_or(defaults.max_messages);
        let preserve_first = parse_env::<i64>("SLIDING_WINDOW_PRESERVE_FIRST")
            .map(|n| n.max(0) as usize)
            .unwrap_or(defaults.preserve_first);
        let token_limit = parse_env("SLIDING_WINDOW_TOKEN_LIMIT").unwrap_or(defaults.token_limit);
        Self {
            enabled,
            max_messages,
            preserve_first,
            token_limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    fn clear_env() {
        for key in [
            "SLIDING_WINDOW_ENABLED",
            "SLIDING_WINDOW_MAX_MESSAGES",
            "SLIDING_WINDOW_PRESERVE_FIRST",
            "SLIDING_WINDOW_TOKEN_LIMIT",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        clear_env();
        assert_eq!(WindowConfig::from_env(), WindowConfig::default());
    }

    #[test]
    #[serial]
    fn test_from_env_overrides_and_clamps_negative_preserve() {
        clear_env();
        env::set_var("SLIDING_WINDOW_ENABLED", "false");
        env::set_var("SLIDING_WINDOW_MAX_MESSAGES", "8");
        env::set_var("SLIDING_WINDOW_PRESERVE_FIRST", "-3");
        env::set_var("SLIDING_WINDOW_TOKEN_LIMIT", "500");
        let config = WindowConfig::from_env();
        clear_env();
        assert!(!config.enabled);
        assert_eq!(config.max_messages, 8);
        assert_eq!(config.preserve_first, 0);
        assert_eq!(config.token_limit, 500);
    }
}
