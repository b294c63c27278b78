//! # Conversation
//!
//! Conversation persistence and the chat turn that ties every other crate together.
//!
//! - [`DocumentStore`]: conversations, their metadata and chronological messages
//! - [`InMemoryDocumentStore`]: `Arc<RwLock<..>>` implementation for tests and the CLI
//! - [`ChatService`]: one user turn: attachments, dataset routing, windowing, completion
//!
//! ## Dataset persistence
//!
//! Datasets are never stored. The [`DatasetSource`](chat_core::DatasetSource) of the last
//! attached dataset is kept in conversation metadata under [`DATASET_SOURCE_KEY`] and the dataset
//! is rebuilt from it on later turns.

mod memory;
mod model;
mod service;
mod store;

pub use memory::InMemoryDocumentStore;
pub use model::{Conversation, DATASET_SOURCE_KEY, DEFAULT_TITLE};
pub use service::{ChatService, ChatTurn, DatasetInput, SendMessage};
pub use store::DocumentStore;
