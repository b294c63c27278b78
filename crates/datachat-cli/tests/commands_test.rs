//! Integration tests for the datachat commands that need no network or API key.

use chat_core::{AnalysisKind, ContentItem, Message, MessageRole};
use chrono::{Duration, Utc};
use context_window::WindowConfig;
use datachat_cli::commands::{analyze, read_messages, window_report};
use datachat_cli::AppConfig;
use query_router::RouterConfig;
use std::io::Write;

fn offline_config() -> AppConfig {
    AppConfig {
        log_file: "logs/test.log".to_string(),
        window: WindowConfig::default(),
        router: RouterConfig::default(),
        llm: None,
    }
}

fn messages(n: usize) -> Vec<Message> {
    let start = Utc::now();
    (0..n)
        .map(|i| Message {
            id: format!("m{}", i),
            conversation_id: "c".to_string(),
            role: if i % 2 == 0 {
                MessageRole::User
            } else {
                MessageRole::Assistant
            },
            content: vec![ContentItem::text(format!("message number {}", i))],
            timestamp: start + Duration::milliseconds(i as i64),
        })
        .collect()
}

/// **Test: analyze routes a question over a local CSV file.**
#[tokio::test]
async fn test_analyze_local_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"age,dept\n25,eng\n32,ops\n47,eng\n").unwrap();
    let path = file.path().to_str().unwrap().to_string();

    let result = analyze(&offline_config(), &path, "summarize the dataset", false)
        .await
        .unwrap();

    assert_eq!(result.kind, AnalysisKind::Summary);
    assert_eq!(result.payload.unwrap()["missing"]["total_missing"], 0);
}

/// **Test: analyze with the generative tier requires an API key.**
#[tokio::test]
async fn test_analyze_generative_requires_key() {
    let err = analyze(&offline_config(), "unused.csv", "why?", true)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("OPENAI_API_KEY"));
}

/// **Test: window report on a JSON message file keeps the anchors and the most recent messages.**
#[test]
fn test_window_report_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(serde_json::to_string(&messages(10)).unwrap().as_bytes())
        .unwrap();
    let loaded = read_messages(file.path().to_str().unwrap()).unwrap();
    assert_eq!(loaded.len(), 10);

    let config = WindowConfig {
        enabled: true,
        max_messages: 5,
        preserve_first: 2,
        token_limit: 100_000,
    };
    let report = window_report(&loaded, &config);

    assert!(report.window_applied);
    assert_eq!(report.total_count, 10);
    assert_eq!(report.kept_count, 5);
    assert_eq!(report.removed_count, 5);
    assert_eq!(report.preserved_count, 2);
    assert_eq!(report.kept_ids, vec!["m0", "m1", "m7", "m8", "m9"]);
    assert!(report.summary.needs_optimization);
    assert!(report.warning.unwrap().contains("Message count (10) exceeds limit (5)"));
}

/// **Test: a disabled window reports the history unchanged.**
#[test]
fn test_window_report_disabled() {
    let config = WindowConfig {
        enabled: false,
        max_messages: 2,
        preserve_first: 0,
        token_limit: 10,
    };
    let report = window_report(&messages(4), &config);
    assert!(!report.window_applied);
    assert_eq!(report.kept_count, 4);
}
