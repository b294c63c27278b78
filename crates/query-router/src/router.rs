//! [`QueryRouter`]: generative tier first when warranted, deterministic cascade otherwise.

use chat_core::{AnalysisKind, AnalysisMetadata, AnalysisResult};
use dataset::Dataset;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use visualization::VisualizationSelector;

use crate::cache::AnalystCacheInfo;
use crate::config::RouterConfig;
use crate::generative::GenerativeAnalyst;
use crate::intent::should_use_generative;
use crate::rules::{evaluate, RuleInput};

/// Classifies a question and produces exactly one [`AnalysisResult`].
pub struct QueryRouter {
    config: RouterConfig,
    selector: VisualizationSelector,
    analyst: Option<Arc<dyn GenerativeAnalyst>>,
}

impl QueryRouter {
    pub fn new(config: RouterConfig) -> Self {
        Self {
            config,
            selector: VisualizationSelector::default(),
            analyst: None,
        }
    }

    pub fn with_selector(mut self, selector: VisualizationSelector) -> Self {
        self.selector = selector;
        self
    }

    pub fn with_analyst(mut self, analyst: Arc<dyn GenerativeAnalyst>) -> Self {
        self.analyst = Some(analyst);
        self
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    pub fn has_analyst(&self) -> bool {
        self.analyst.is_some()
    }

    /// Whether `query` would be sent to the generative tier.
    pub fn wants_generative(&self, query: &str, use_generative: bool) -> bool {
        use_generative
            && self.config.generative_enabled
            && self.analyst.is_some()
            && should_use_generative(query)
    }

    pub async fn route(&self, dataset: &Dataset, query: &str, use_generative: bool) -> AnalysisResult {
        self.route_in_conversation(None, dataset, query, use_generative)
            .await
    }

    /// Routes `query`; with a conversation id the generative tier reuses that conversation's
    /// prepared session and the id is recorded in the result metadata.
    #[instrument(skip(self, dataset, query), fields(rows = dataset.row_count()))]
    pub async fn route_in_conversation(
        &self,
        conversation_id: Option<&str>,
        dataset: &Dataset,
        query: &str,
        use_generative: bool,
    ) -> AnalysisResult {
        if self.wants_generative(query, use_generative) {
            if let Some(result) = self.try_generative(conversation_id, dataset, query).await {
                return result;
            }
        }

        let mut result = self.route_rules(dataset, query);
        if let (Some(id), Some(metadata)) = (conversation_id, result.metadata.as_mut()) {
            metadata.conversation_id = Some(id.to_string());
        }
        result
    }

    /// Deterministic cascade only.
    pub fn route_rules(&self, dataset: &Dataset, query: &str) -> AnalysisResult {
        let input = RuleInput::new(dataset, query, &self.selector, self.config.preview_rows);
        let (rule, result) = evaluate(&input);
        debug!(rule, kind = result.kind.as_str(), success = result.success, "Rule matched");
        result
    }

    async fn try_generative(
        &self,
        conversation_id: Option<&str>,
        dataset: &Dataset,
        query: &str,
    ) -> Option<AnalysisResult> {
        let analyst = self.analyst.as_ref()?;
        let call = async {
            match conversation_id {
                Some(id) => analyst.ask_in_conversation(id, dataset, query).await,
                None => analyst.ask(dataset, query).await,
            }
        };

        match tokio::time::timeout(self.config.generative_timeout, call).await {
            Ok(Ok(answer)) => {
                info!(answer_len = answer.len(), "Generative tier answered");
                let metadata = AnalysisMetadata {
                    conversation_id: conversation_id.map(str::to_string),
                    dataframe_size: Some(dataset.row_count()),
                    sampled: Some(dataset.row_count() > analyst.max_rows()),
                    ..AnalysisMetadata::generative(query)
                };
                Some(
                    AnalysisResult::ok(AnalysisKind::GenerativeQuery, json!({ "answer": answer }))
                        .with_metadata(metadata),
                )
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Generative tier failed, falling back to rules");
                None
            }
            Err(_) => {
                warn!(
                    timeout_secs = self.config.generative_timeout.as_secs(),
                    "Generative tier timed out, falling back to rules"
                );
                None
            }
        }
    }

    /// Drops prepared analyst sessions for one conversation, or all of them.
    pub async fn clear_cache(&self, conversation_id: Option<&str>) {
        if let Some(analyst) = &self.analyst {
            analyst.clear_sessions(conversation_id).await;
        }
    }

    pub async fn cache_info(&self) -> AnalystCacheInfo {
        match &self.analyst {
            Some(analyst) => analyst.cache_info().await,
            None => AnalystCacheInfo {
                cached_conversations: Vec::new(),
                cache_size: 0,
                max_dataframe_size: self.config.generative_max_rows,
                available: false,
            },
        }
    }
}

impl Default for QueryRouter {
    fn default() -> Self {
        Self::new(RouterConfig::default())
    }
}
