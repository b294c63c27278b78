//! # chat-core
//!
//! Core types shared by every datachat crate: [`Message`], [`ContentItem`], the uniform
//! [`AnalysisResult`] envelope, [`DatasetSource`] references and the error taxonomy. Also
//! tracing initialization and the [`env`] parsing helpers used by config loaders.
//! Transport- and storage-agnostic.

pub mod analysis;
pub mod env;
pub mod error;
pub mod logger;
pub mod types;

pub use analysis::{AnalysisKind, AnalysisMetadata, AnalysisMethod, AnalysisResult};
pub use error::{ChatError, Result};
pub use logger::init_tracing;
pub use types::{ContentItem, DatasetSource, Message, MessageRole, NewMessage};
