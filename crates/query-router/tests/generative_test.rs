//! Integration tests for LlmAnalyst.
//!
//! Covers the model context (schema, statistics, CSV sample), downsampling of large datasets and
//! per-conversation session reuse. Uses a recording LlmClient defined below.

mod common;

use anyhow::Result;
use async_trait::async_trait;
use dataset::{Column, Dataset};
use llm_client::{LlmClient, StreamChunkCallback};
use prompt::ChatMessage;
use query_router::{GenerativeAnalyst, LlmAnalyst, ANALYST_SYSTEM_PROMPT};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct RecordingLlm {
    requests: Mutex<Vec<(Option<String>, Vec<ChatMessage>)>>,
}

impl RecordingLlm {
    fn last_user_text(&self) -> String {
        let requests = self.requests.lock().unwrap();
        requests.last().unwrap().1[0].text()
    }
}

#[async_trait]
impl LlmClient for RecordingLlm {
    async fn complete(
        &self,
        system_prompt: Option<&str>,
        messages: Vec<ChatMessage>,
    ) -> Result<String> {
        self.requests
            .lock()
            .unwrap()
            .push((system_prompt.map(str::to_string), messages));
        Ok("  The average age is 39.  ".to_string())
    }

    async fn complete_stream(
        &self,
        system_prompt: Option<&str>,
        messages: Vec<ChatMessage>,
        _callback: &mut StreamChunkCallback,
    ) -> Result<String> {
        self.complete(system_prompt, messages).await
    }
}

fn numbered(n: usize) -> Dataset {
    Dataset::new(vec![Column::numeric(
        "id",
        (0..n).map(|i| Some(i as f64)).collect(),
    )])
    .unwrap()
}

/// **Test: The model sees schema, statistics, a CSV sample and the question.**
#[tokio::test]
async fn test_ask_sends_dataset_context() {
    let llm = Arc::new(RecordingLlm::default());
    let analyst = LlmAnalyst::new(llm.clone(), 10_000, 8);

    let answer = analyst
        .ask(&common::payroll(), "Why do older people earn more?")
        .await
        .unwrap();

    assert_eq!(answer, "The average age is 39.");
    let requests = llm.requests.lock().unwrap().clone();
    assert_eq!(requests[0].0.as_deref(), Some(ANALYST_SYSTEM_PROMPT));
    let text = requests[0].1[0].text();
    assert!(text.contains("Dataset: 5 rows × 3 columns"));
    assert!(text.contains("- dept (categorical, 1 missing)"));
    assert!(text.contains("- salary: count=5"));
    assert!(text.contains("age,salary,dept"));
    assert!(text.ends_with("Question: Why do older people earn more?"));
}

/// **Test: Datasets above the row limit are downsampled before reaching the model.**
#[tokio::test]
async fn test_large_dataset_downsampled() {
    let llm = Arc::new(RecordingLlm::default());
    let analyst = LlmAnalyst::new(llm.clone(), 50, 8);

    let prepared = analyst.prepare(&numbered(200));
    assert!(prepared.sampled);
    assert_eq!(prepared.original_rows, 200);
    assert_eq!(prepared.dataset.row_count(), 50);

    analyst.ask(&numbered(200), "what is the trend?").await.unwrap();
    assert!(llm
        .last_user_text()
        .contains("Dataset: 50 rows × 1 columns (random sample of 200 rows)"));
}

/// **Test: Sessions are cached per conversation and can be cleared.**
#[tokio::test]
async fn test_sessions_cached_per_conversation() {
    let llm = Arc::new(RecordingLlm::default());
    let analyst = LlmAnalyst::new(llm, 10_000, 8);
    let ds = common::people();

    analyst.ask_in_conversation("c1", &ds, "why?").await.unwrap();
    analyst.ask_in_conversation("c1", &ds, "how?").await.unwrap();
    analyst.ask_in_conversation("c2", &ds, "why?").await.unwrap();

    let info = analyst.cache_info().await;
    assert_eq!(info.cache_size, 2);
    assert_eq!(info.cached_conversations, vec!["c1", "c2"]);
    assert_eq!(info.max_dataframe_size, 10_000);

    analyst.clear_sessions(Some("c1")).await;
    assert_eq!(analyst.cache_info().await.cached_conversations, vec!["c2"]);
    analyst.clear_sessions(None).await;
    assert_eq!(analyst.cache_info().await.cache_size, 0);
}
