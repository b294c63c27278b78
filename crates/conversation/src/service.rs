//! [`ChatService`]: one user turn from attachments to stored assistant reply.

use chat_core::{
    AnalysisKind, AnalysisResult, ChatError, ContentItem, DatasetSource, Message, MessageRole,
    NewMessage, Result,
};
use context_window::{context_warning, summarize_context, ContextSummary, ContextWindow};
use dataset::{upload_source, Dataset, DatasetLoader};
use llm_client::CompletionService;
use query_router::QueryRouter;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

use crate::model::{Conversation, DATASET_SOURCE_KEY};
use crate::store::DocumentStore;

/// Query used when a dataset is attached without any text.
const DEFAULT_DATASET_QUERY: &str = "summarize";

/// A dataset attached to a message.
#[derive(Debug, Clone)]
pub enum DatasetInput {
    Url(String),
    Upload { filename: String, bytes: Vec<u8> },
}

/// A user turn.
#[derive(Debug, Clone)]
pub struct SendMessage {
    pub conversation_id: String,
    pub text: String,
    /// Base64 or data URL.
    pub image: Option<String>,
    pub dataset: Option<DatasetInput>,
    pub use_generative: bool,
}

impl SendMessage {
    pub fn new(conversation_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            text: text.into(),
            image: None,
            dataset: None,
            use_generative: true,
        }
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn with_dataset(mut self, dataset: DatasetInput) -> Self {
        self.dataset = Some(dataset);
        self
    }

    pub fn with_generative(mut self, use_generative: bool) -> Self {
        self.use_generative = use_generative;
        self
    }
}

/// Everything produced by one turn.
#[derive(Debug, Clone, Serialize)]
pub struct ChatTurn {
    pub user_message: Message,
    pub assistant_message: Message,
    /// Present when a dataset was active and the question was routed.
    pub analysis: Option<AnalysisResult>,
    /// Rendered chart attached to the assistant message.
    pub visualization: Option<String>,
    /// Usage of the full history before windowing.
    pub context: ContextSummary,
    pub window_applied: bool,
    pub removed_count: usize,
}

/// User message stored, history windowed, ready for completion.
struct PreparedTurn {
    user_message: Message,
    analysis: Option<AnalysisResult>,
    chart: Option<String>,
    history: Vec<Message>,
    context: ContextSummary,
    window_applied: bool,
    removed_count: usize,
}

/// Orchestrates a chat turn over a [`DocumentStore`], [`QueryRouter`] and [`CompletionService`].
pub struct ChatService {
    store: Arc<dyn DocumentStore>,
    router: Arc<QueryRouter>,
    completion: Arc<CompletionService>,
    loader: DatasetLoader,
    window: ContextWindow,
}

impl ChatService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        router: Arc<QueryRouter>,
        completion: Arc<CompletionService>,
    ) -> Self {
        Self {
            store,
            router,
            completion,
            loader: DatasetLoader::new(),
            window: ContextWindow::default(),
        }
    }

    pub fn with_loader(mut self, loader: DatasetLoader) -> Self {
        self.loader = loader;
        self
    }

    pub fn with_window(mut self, window: ContextWindow) -> Self {
        self.window = window;
        self
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    pub fn router(&self) -> &Arc<QueryRouter> {
        &self.router
    }

    pub async fn create_conversation(&self, title: &str) -> Result<Conversation> {
        self.store.create_conversation(title).await
    }

    /// The conversation, or [`ChatError::NotFound`].
    pub async fn get_conversation(&self, id: &str) -> Result<Conversation> {
        self.store
            .get_conversation(id)
            .await?
            .ok_or_else(|| ChatError::NotFound(format!("conversation {}", id)))
    }

    pub async fn list_conversations(&self, limit: usize) -> Result<Vec<Conversation>> {
        self.store.list_conversations(limit).await
    }

    pub async fn messages(&self, conversation_id: &str, limit: Option<usize>) -> Result<Vec<Message>> {
        self.store.fetch_messages(conversation_id, limit).await
    }

    /// Deletes the conversation and drops its analyst session.
    pub async fn delete_conversation(&self, id: &str) -> Result<bool> {
        let deleted = self.store.delete_conversation(id).await?;
        self.router.clear_cache(Some(id)).await;
        Ok(deleted)
    }

    /// Context usage of the stored history against the window limits.
    pub async fn context_summary(&self, conversation_id: &str) -> Result<ContextSummary> {
        let history = self.store.fetch_messages(conversation_id, None).await?;
        Ok(summarize_context(&history, self.window.config()))
    }

    /// Runs a full turn and stores the assistant reply.
    #[instrument(skip(self, request), fields(conversation_id = %request.conversation_id))]
    pub async fn send_message(&self, request: SendMessage) -> Result<ChatTurn> {
        let conversation_id = request.conversation_id.clone();
        let prepared = self.prepare_turn(request).await?;
        let reply = self.completion.complete(&prepared.history).await;
        self.finish_turn(&conversation_id, prepared, reply).await
    }

    /// Like [`send_message`](Self::send_message), streaming reply fragments into `sink`.
    #[instrument(skip(self, request, sink), fields(conversation_id = %request.conversation_id))]
    pub async fn send_message_stream(
        &self,
        request: SendMessage,
        sink: mpsc::Sender<String>,
    ) -> Result<ChatTurn> {
        let conversation_id = request.conversation_id.clone();
        let prepared = self.prepare_turn(request).await?;
        let reply = self.completion.complete_stream(&prepared.history, sink).await;
        self.finish_turn(&conversation_id, prepared, reply).await
    }

    async fn prepare_turn(&self, request: SendMessage) -> Result<PreparedTurn> {
        let conversation = self.get_conversation(&request.conversation_id).await?;
        let conversation_id = conversation.id.as_str();

        let mut content = Vec::new();
        let text = request.text.trim();
        if !text.is_empty() {
            content.push(ContentItem::text(text));
        }
        if let Some(image) = request.image.as_deref().filter(|s| !s.trim().is_empty()) {
            content.push(ContentItem::image(image));
        }

        let newly_attached = request.dataset.is_some();
        let active = match request.dataset {
            Some(input) => Some(self.attach_dataset(conversation_id, input).await?),
            None => self.rehydrate(&conversation).await,
        };

        let mut analysis = None;
        let mut chart = None;
        if let Some((dataset, source)) = active {
            let query = if text.is_empty() && newly_attached {
                Some(DEFAULT_DATASET_QUERY)
            } else if text.is_empty() {
                None
            } else {
                Some(text)
            };
            if let Some(query) = query {
                let mut result = self
                    .router
                    .route_in_conversation(
                        Some(conversation_id),
                        &dataset,
                        query,
                        request.use_generative,
                    )
                    .await;
                chart = take_rendered_image(&mut result);
                info!(
                    kind = result.kind.as_str(),
                    success = result.success,
                    chart = chart.is_some(),
                    "Dataset question routed"
                );
                content.push(ContentItem::dataset(source.describe(), result.clone()));
                analysis = Some(result);
            }
        }

        if content.is_empty() {
            return Err(ChatError::InvalidInput(
                "message has no text, image or dataset".to_string(),
            ));
        }

        let user_message = self
            .store
            .append_message(conversation_id, NewMessage::new(MessageRole::User, content))
            .await?;

        let history = self.store.fetch_messages(conversation_id, None).await?;
        let context = summarize_context(&history, self.window.config());
        if let Some(warning) = context_warning(&context) {
            debug!(warning = %warning, "Context over limits, windowing");
        }
        let windowed = self.window.apply(&history);
        if windowed.window_applied {
            info!(
                total = windowed.total_count,
                kept = windowed.kept_count,
                removed = windowed.removed_count,
                estimated_tokens = windowed.estimated_tokens,
                "Context window applied"
            );
        }

        Ok(PreparedTurn {
            user_message,
            analysis,
            chart,
            history: windowed.kept_messages,
            context,
            window_applied: windowed.window_applied,
            removed_count: windowed.removed_count,
        })
    }

    async fn finish_turn(
        &self,
        conversation_id: &str,
        prepared: PreparedTurn,
        reply: String,
    ) -> Result<ChatTurn> {
        let mut content = vec![ContentItem::text(reply)];
        if let Some(chart) = &prepared.chart {
            content.push(ContentItem::image(chart.clone()));
        }
        let assistant_message = self
            .store
            .append_message(
                conversation_id,
                NewMessage::new(MessageRole::Assistant, content),
            )
            .await?;

        Ok(ChatTurn {
            user_message: prepared.user_message,
            assistant_message,
            analysis: prepared.analysis,
            visualization: prepared.chart,
            context: prepared.context,
            window_applied: prepared.window_applied,
            removed_count: prepared.removed_count,
        })
    }

    /// Loads a newly attached dataset and records its source in conversation metadata.
    async fn attach_dataset(
        &self,
        conversation_id: &str,
        input: DatasetInput,
    ) -> Result<(Dataset, DatasetSource)> {
        let (dataset, source) = match input {
            DatasetInput::Url(url) => {
                let dataset = self
                    .loader
                    .from_url(&url)
                    .await
                    .map_err(|e| ChatError::Dataset(e.to_string()))?;
                (dataset, DatasetSource::Url { url })
            }
            DatasetInput::Upload { filename, bytes } => {
                let dataset = DatasetLoader::from_bytes(&bytes)
                    .map_err(|e| ChatError::Dataset(format!("{}: {}", filename, e)))?;
                (dataset, upload_source(&filename, &bytes))
            }
        };

        let value = serde_json::to_value(&source)
            .map_err(|e| ChatError::Storage(format!("failed to encode dataset source: {}", e)))?;
        let mut patch = Map::new();
        patch.insert(DATASET_SOURCE_KEY.to_string(), value);
        self.store.merge_metadata(conversation_id, patch).await?;
        self.router.clear_cache(Some(conversation_id)).await;

        info!(
            conversation_id = %conversation_id,
            source = %source.describe(),
            rows = dataset.row_count(),
            columns = dataset.column_count(),
            "Dataset attached"
        );
        Ok((dataset, source))
    }

    /// Rebuilds the conversation's dataset; failures are logged and the turn continues without it.
    async fn rehydrate(&self, conversation: &Conversation) -> Option<(Dataset, DatasetSource)> {
        let source = conversation.dataset_source()?;
        match self.loader.rehydrate(&source).await {
            Ok(dataset) => Some((dataset, source)),
            Err(e) => {
                warn!(
                    conversation_id = %conversation.id,
                    source = %source.describe(),
                    error = %e,
                    "Failed to rehydrate dataset"
                );
                None
            }
        }
    }
}

/// Moves a rendered chart out of a visualization payload so the stored analysis stays small.
fn take_rendered_image(result: &mut AnalysisResult) -> Option<String> {
    if result.kind != AnalysisKind::Visualization || !result.success {
        return None;
    }
    match result.payload.as_mut()? {
        Value::Object(payload) => match payload.remove("renderedImage")? {
            Value::String(image) if !image.is_empty() => Some(image),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_take_rendered_image() {
        let mut result = AnalysisResult::ok(
            AnalysisKind::Visualization,
            json!({"chartKind": "histogram", "renderedImage": "data:image/svg+xml;base64,AA=="}),
        );
        assert_eq!(
            take_rendered_image(&mut result).as_deref(),
            Some("data:image/svg+xml;base64,AA==")
        );
        assert!(result.payload_field("renderedImage").is_none());
        assert_eq!(result.payload_field("chartKind").unwrap(), "histogram");
    }

    #[test]
    fn test_take_rendered_image_ignores_other_kinds() {
        let mut result =
            AnalysisResult::ok(AnalysisKind::Summary, json!({"renderedImage": "x"}));
        assert!(take_rendered_image(&mut result).is_none());
        assert!(result.payload_field("renderedImage").is_some());
    }
}
