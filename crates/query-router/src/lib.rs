//! # Query router
//!
//! Turns a free-text question about a [`Dataset`](dataset::Dataset) into one
//! [`AnalysisResult`](chat_core::AnalysisResult).
//!
//! ## Tiers
//!
//! - **Generative**: complex analytical questions go to a [`GenerativeAnalyst`] under a timeout.
//!   Any failure falls back to the rules.
//! - **Deterministic**: an ordered list of keyword rules; the first match wins.
//!
//! ## Modules
//!
//! - [`intent`] – simple/complex vocabularies
//! - [`rules`] – the deterministic cascade
//! - [`generative`] – [`GenerativeAnalyst`] and the LLM-backed [`LlmAnalyst`]
//! - [`cache`] – per-conversation analyst sessions

pub mod cache;
mod config;
pub mod generative;
pub mod intent;
mod router;
pub mod rules;

pub use cache::{AnalystCache, AnalystCacheInfo, PreparedDataset};
pub use config::RouterConfig;
pub use generative::{GenerativeAnalyst, LlmAnalyst, ANALYST_SYSTEM_PROMPT};
pub use intent::should_use_generative;
pub use router::QueryRouter;
