use crate::config::WindowConfig;
use crate::summary::{context_warning, summarize_context};

use super::text_message;

fn config(max_messages: usize, token_limit: usize) -> WindowConfig {
    WindowConfig {
        enabled: true,
        max_messages,
        preserve_first: 2,
        token_limit,
    }
}

#[test]
fn test_summary_within_limits_has_no_warning() {
    let messages: Vec<_> = (0..4).map(|i| text_message(i, 10)).collect();
    let summary = summarize_context(&messages, &config(10, 1000));
    assert_eq!(summary.total_messages, 4);
    assert_eq!(summary.estimated_tokens, 68);
    assert!(summary.within_limits);
    assert!((summary.message_usage_percent - 40.0).abs() < 1e-9);
    assert!(context_warning(&summary).is_none());
}

#[test]
fn test_summary_over_both_limits_warns_about_both() {
    let messages: Vec<_> = (0..4).map(|i| text_message(i, 10)).collect();
    let summary = summarize_context(&messages, &config(3, 50));
    assert!(summary.needs_optimization);
    let warning = context_warning(&summary).unwrap();
    assert!(warning.starts_with("Context window optimization needed: "));
    assert!(warning.contains("Message count (4) exceeds limit (3)"));
    assert!(warning.contains("Token count (~68) exceeds limit (50)"));
}

#[test]
fn test_summary_zero_limits_report_zero_percent() {
    let summary = summarize_context(&[], &config(0, 0));
    assert_eq!(summary.token_usage_percent, 0.0);
    assert_eq!(summary.message_usage_percent, 0.0);
    assert!(summary.within_limits);
}
