//! Router configuration loaded from environment variables.

use chat_core::env::{parse_env, parse_env_bool};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterConfig {
    /// GENERATIVE_ENABLED
    pub generative_enabled: bool,
    /// GENERATIVE_TIMEOUT_SECS
    pub generative_timeout: Duration,
    /// GENERATIVE_MAX_ROWS: larger datasets are downsampled before reaching the analyst
    pub generative_max_rows: usize,
    /// GENERATIVE_CACHE_CAPACITY: conversations with a prepared analyst session
    pub generative_cache_capacity: usize,
    /// PREVIEW_ROWS
    pub preview_rows: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            generative_enabled: true,
            generative_timeout: Duration::from_secs(30),
            generative_max_rows: 10_000,
            generative_cache_capacity: 64,
            preview_rows: dataset::DEFAULT_PREVIEW_ROWS,
        }
    }
}

impl RouterConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            generative_enabled: parse_env_bool("GENERATIVE_ENABLED")
                .unwrap_or(defaults.generative_enabled),
            generative_timeout: parse_env::<u64>("GENERATIVE_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.generative_timeout),
            generative_max_rows: parse_env::<usize>("GENERATIVE_MAX_ROWS")
                .filter(|n| *n > 0)
                .unwrap_or(defaults.generative_max_rows),
            generative_cache_capacity: parse_env("GENERATIVE_CACHE_CAPACITY")
                .unwrap_or(defaults.generative_cache_capacity),
            preview_rows: parse_env("PREVIEW_ROWS").unwrap_or(defaults.preview_rows),
        }
    }
}
