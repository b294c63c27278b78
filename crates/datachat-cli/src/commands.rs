//! Command implementations behind the `datachat` subcommands.

use anyhow::{Context, Result};
use chat_core::{AnalysisKind, AnalysisResult, Message};
use context_window::{context_warning, summarize_context, ContextSummary, ContextWindow, WindowConfig};
use conversation::{ChatService, DatasetInput, InMemoryDocumentStore, SendMessage};
use dataset::{Dataset, DatasetLoader};
use llm_client::{CompletionService, LlmClient, LlmConfig, OpenAILlmClient};
use query_router::{LlmAnalyst, QueryRouter};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::config::AppConfig;

/// URL inputs stay URLs; anything else is read as a local file.
pub fn dataset_input(csv: &str) -> Result<DatasetInput> {
    let trimmed = csv.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        return Ok(DatasetInput::Url(trimmed.to_string()));
    }
    let path = Path::new(trimmed);
    let bytes = std::fs::read(path).with_context(|| format!("Read CSV file {}", trimmed))?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| trimmed.to_string());
    Ok(DatasetInput::Upload { filename, bytes })
}

pub async fn load_dataset(loader: &DatasetLoader, csv: &str) -> Result<Dataset> {
    let dataset = match dataset_input(csv)? {
        DatasetInput::Url(url) => loader.from_url(&url).await?,
        DatasetInput::Upload { bytes, .. } => DatasetLoader::from_bytes(&bytes)?,
    };
    Ok(dataset)
}

/// Router with an LLM analyst attached when generative analysis is enabled and configured.
pub fn build_router(config: &AppConfig, llm: Option<Arc<dyn LlmClient>>) -> QueryRouter {
    let router = QueryRouter::new(config.router.clone());
    match llm {
        Some(llm) if config.router.generative_enabled => {
            router.with_analyst(Arc::new(LlmAnalyst::new(
                llm,
                config.router.generative_max_rows,
                config.router.generative_cache_capacity,
            )))
        }
        _ => router,
    }
}

fn build_llm(config: &AppConfig) -> Result<Arc<dyn LlmClient>> {
    let llm_config = config.require_llm()?;
    Ok(Arc::new(OpenAILlmClient::from_config(llm_config)))
}

/// `datachat analyze`: load, route once, return the envelope.
pub async fn analyze(
    config: &AppConfig,
    csv: &str,
    query: &str,
    generative: bool,
) -> Result<AnalysisResult> {
    let llm = if generative { Some(build_llm(config)?) } else { None };
    let router = build_router(config, llm);
    let dataset = load_dataset(&DatasetLoader::new(), csv).await?;
    info!(
        rows = dataset.row_count(),
        columns = dataset.column_count(),
        "Dataset loaded"
    );
    Ok(router.route(&dataset, query, generative).await)
}

/// Output of `datachat window`.
#[derive(Debug, Serialize)]
pub struct WindowReport {
    pub summary: ContextSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    pub total_count: usize,
    pub kept_count: usize,
    pub removed_count: usize,
    pub preserved_count: usize,
    pub estimated_tokens: usize,
    pub window_applied: bool,
    pub kept_ids: Vec<String>,
}

pub fn read_messages(path: &str) -> Result<Vec<Message>> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("Read message file {}", path))?;
    serde_json::from_str(&raw).with_context(|| format!("Parse messages from {}", path))
}

pub fn window_report(messages: &[Message], config: &WindowConfig) -> WindowReport {
    let summary = summarize_context(messages, config);
    let warning = context_warning(&summary);
    let result = ContextWindow::new(config.clone()).apply(messages);
    WindowReport {
        summary,
        warning,
        total_count: result.total_count,
        kept_count: result.kept_count,
        removed_count: result.removed_count,
        preserved_count: result.preserved_count,
        estimated_tokens: result.estimated_tokens,
        window_applied: result.window_applied,
        kept_ids: result.kept_messages.iter().map(|m| m.id.clone()).collect(),
    }
}

/// `datachat chat`: reads lines from stdin until EOF or `/quit`.
pub async fn chat(config: &AppConfig, csv: Option<&str>, title: &str) -> Result<()> {
    let llm_config = config.require_llm()?;
    let llm = build_llm(config)?;

    let mut completion = CompletionService::new(Arc::clone(&llm))
        .with_timeout(llm_config.completion_timeout())
        .with_cache_capacity(llm_config.response_cache_capacity());
    if let Some(system_prompt) = llm_config.system_prompt() {
        completion = completion.with_system_prompt(system_prompt);
    }

    let service = ChatService::new(
        Arc::new(InMemoryDocumentStore::new()),
        Arc::new(build_router(config, Some(llm))),
        Arc::new(completion),
    )
    .with_window(ContextWindow::new(config.window.clone()));

    let conversation = service.create_conversation(title).await?;
    let mut pending_dataset = csv.map(dataset_input).transpose()?;

    println!("Conversation {} started. Type /quit to exit.", conversation.id);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line == "/quit" {
            break;
        }
        if line.is_empty() && pending_dataset.is_none() {
            continue;
        }

        let mut request = SendMessage::new(&conversation.id, line);
        if let Some(input) = pending_dataset.take() {
            request = request.with_dataset(input);
        }

        let (tx, mut rx) = mpsc::channel::<String>(64);
        let printer = tokio::spawn(async move {
            let mut stdout = tokio::io::stdout();
            while let Some(fragment) = rx.recv().await {
                stdout.write_all(fragment.as_bytes()).await?;
                stdout.flush().await?;
            }
            Ok::<_, std::io::Error>(())
        });

        let turn = service.send_message_stream(request, tx).await;
        printer.await??;
        println!();

        match turn {
            Ok(turn) => {
                if let Some(analysis) = &turn.analysis {
                    print_analysis_note(analysis, turn.visualization.is_some());
                }
                if let Some(warning) = context_warning(&turn.context) {
                    println!("[{}]", warning);
                }
            }
            Err(e) => {
                warn!(error = %e, "Chat turn failed");
                eprintln!("Error: {}", e);
            }
        }
    }
    Ok(())
}

fn print_analysis_note(analysis: &AnalysisResult, has_chart: bool) {
    let status = if analysis.success { "ok" } else { "failed" };
    let chart = if has_chart && analysis.kind == AnalysisKind::Visualization {
        ", chart attached"
    } else {
        ""
    };
    println!("[analysis: {} ({}){}]", analysis.kind.as_str(), status, chart);
}
