//! Generative tier: answers open-ended questions by handing a compact description of the
//! dataset to a language model.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use dataset::{describe, downsample, Dataset};
use llm_client::LlmClient;
use prompt::ChatMessage;
use std::fmt::Write as _;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::cache::{fingerprint, AnalystCache, AnalystCacheInfo, PreparedDataset};

/// Seed for downsampling so a conversation sees the same sample every turn.
const SAMPLE_SEED: u64 = 42;
/// Rows of CSV included in the model context.
const CONTEXT_SAMPLE_ROWS: usize = 20;

pub const ANALYST_SYSTEM_PROMPT: &str = "You are a data analyst. You are given a description of a \
tabular dataset: its schema, summary statistics for numeric columns and a sample of rows. Answer \
the user's question about the dataset concisely. Base every claim on the data shown and say so \
when the sample is not enough to answer.";

/// Answers free-text questions about a dataset.
#[async_trait]
pub trait GenerativeAnalyst: Send + Sync {
    async fn ask(&self, dataset: &Dataset, question: &str) -> Result<String>;

    /// Like [`ask`](Self::ask), reusing the conversation's prepared session when there is one.
    async fn ask_in_conversation(
        &self,
        conversation_id: &str,
        dataset: &Dataset,
        question: &str,
    ) -> Result<String> {
        let _ = conversation_id;
        self.ask(dataset, question).await
    }

    /// Datasets larger than this are downsampled before analysis.
    fn max_rows(&self) -> usize {
        usize::MAX
    }

    /// Drops one conversation's session, or all of them when `conversation_id` is `None`.
    async fn clear_sessions(&self, conversation_id: Option<&str>) {
        let _ = conversation_id;
    }

    async fn cache_info(&self) -> AnalystCacheInfo {
        AnalystCacheInfo {
            cached_conversations: Vec::new(),
            cache_size: 0,
            max_dataframe_size: self.max_rows(),
            available: true,
        }
    }
}

/// [`GenerativeAnalyst`] that sends schema, statistics and a CSV sample to an [`LlmClient`].
pub struct LlmAnalyst {
    llm: Arc<dyn LlmClient>,
    max_rows: usize,
    sessions: AnalystCache,
}

impl LlmAnalyst {
    pub fn new(llm: Arc<dyn LlmClient>, max_rows: usize, cache_capacity: usize) -> Self {
        Self {
            llm,
            max_rows,
            sessions: AnalystCache::new(cache_capacity),
        }
    }

    /// Downsamples when needed and renders the model context.
    pub fn prepare(&self, dataset: &Dataset) -> PreparedDataset {
        let (prepared, sampled) = downsample(dataset, self.max_rows, SAMPLE_SEED);
        let context = describe_for_model(&prepared, dataset.row_count(), sampled);
        PreparedDataset {
            fingerprint: fingerprint(dataset),
            dataset: prepared,
            original_rows: dataset.row_count(),
            sampled,
            context,
        }
    }

    async fn session(&self, conversation_id: &str, dataset: &Dataset) -> Arc<PreparedDataset> {
        let key = fingerprint(dataset);
        if let Some(session) = self.sessions.get(conversation_id, &key).await {
            debug!(conversation_id = %conversation_id, "Reusing analyst session");
            return session;
        }
        let session = Arc::new(self.prepare(dataset));
        self.sessions.insert(conversation_id, Arc::clone(&session)).await;
        session
    }

    async fn ask_prepared(&self, prepared: &PreparedDataset, question: &str) -> Result<String> {
        let content = format!("{}\nQuestion: {}", prepared.context, question.trim());
        let answer = self
            .llm
            .complete(Some(ANALYST_SYSTEM_PROMPT), vec![ChatMessage::user(content)])
            .await
            .context("Generative analysis request failed")?;
        let answer = answer.trim();
        if answer.is_empty() {
            bail!("Generative analysis returned an empty answer");
        }
        info!(
            rows = prepared.dataset.row_count(),
            sampled = prepared.sampled,
            answer_len = answer.len(),
            "Generative analysis answered"
        );
        Ok(answer.to_string())
    }
}

#[async_trait]
impl GenerativeAnalyst for LlmAnalyst {
    #[instrument(skip(self, dataset, question), fields(rows = dataset.row_count()))]
    async fn ask(&self, dataset: &Dataset, question: &str) -> Result<String> {
        let prepared = self.prepare(dataset);
        self.ask_prepared(&prepared, question).await
    }

    #[instrument(skip(self, dataset, question), fields(rows = dataset.row_count()))]
    async fn ask_in_conversation(
        &self,
        conversation_id: &str,
        dataset: &Dataset,
        question: &str,
    ) -> Result<String> {
        let prepared = self.session(conversation_id, dataset).await;
        self.ask_prepared(&prepared, question).await
    }

    fn max_rows(&self) -> usize {
        self.max_rows
    }

    async fn clear_sessions(&self, conversation_id: Option<&str>) {
        match conversation_id {
            Some(id) => {
                self.sessions.evict(id).await;
            }
            None => self.sessions.clear().await,
        }
    }

    async fn cache_info(&self) -> AnalystCacheInfo {
        AnalystCacheInfo {
            cached_conversations: self.sessions.conversation_ids().await,
            cache_size: self.sessions.len().await,
            max_dataframe_size: self.max_rows,
            available: true,
        }
    }
}

/// Schema, numeric statistics and a CSV sample.
pub fn describe_for_model(dataset: &Dataset, original_rows: usize, sampled: bool) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        "Dataset: {} rows × {} columns",
        dataset.row_count(),
        dataset.column_count()
    );
    if sampled {
        let _ = write!(out, " (random sample of {} rows)", original_rows);
    }
    out.push_str("\n\nColumns:\n");
    for column in dataset.columns() {
        let _ = writeln!(
            out,
            "- {} ({}, {} missing)",
            column.name(),
            column.kind().as_str(),
            column.null_count()
        );
    }

    let numeric = dataset.numeric_columns();
    if !numeric.is_empty() {
        out.push_str("\nStatistics:\n");
        for column in numeric {
            let stats = describe(&column.numeric_values().unwrap_or_default());
            let _ = writeln!(
                out,
                "- {}: count={} mean={} std={} min={} median={} max={}",
                column.name(),
                stats.count,
                fmt_stat(stats.mean),
                fmt_stat(stats.std),
                fmt_stat(stats.min),
                fmt_stat(stats.median),
                fmt_stat(stats.max)
            );
        }
    }

    if let Ok(sample) = dataset.to_csv_string(CONTEXT_SAMPLE_ROWS) {
        let shown = CONTEXT_SAMPLE_ROWS.min(dataset.row_count());
        let _ = write!(out, "\nFirst {} rows (CSV):\n{}", shown, sample);
    }
    out
}

fn fmt_stat(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.2}", v))
        .unwrap_or_else(|| "n/a".to_string())
}
