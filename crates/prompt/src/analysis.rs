//! Renders an [`AnalysisResult`] as a text block the model can read.

use chat_core::{AnalysisKind, AnalysisResult};
use serde_json::Value;

use crate::SECTION_DATASET;

/// Payload keys never shown to the model (large encoded blobs).
const HIDDEN_KEYS: &[&str] = &["renderedImage"];

/// Formats shape, column types, statistics (2 decimals) and missing values; any other
/// payload is appended as pretty JSON.
pub fn format_analysis_for_context(result: &AnalysisResult) -> String {
    let mut lines = vec![SECTION_DATASET.to_string()];

    if !result.success {
        lines.push(format!(
            "\nAnalysis failed: {}",
            result.message.as_deref().unwrap_or("unknown error")
        ));
        return lines.join("\n");
    }

    let payload = result.payload.as_ref();
    let (basic_info, stats, missing) = match result.kind {
        AnalysisKind::Summary => (
            payload.and_then(|p| p.get("basic_info")),
            payload.and_then(|p| p.get("stats")),
            payload.and_then(|p| p.get("missing")),
        ),
        AnalysisKind::BasicInfo => (payload, None, None),
        AnalysisKind::Statistics => (None, payload, None),
        AnalysisKind::MissingValues => (None, None, payload),
        _ => (None, None, None),
    };

    if let Some(info) = basic_info {
        push_basic_info(&mut lines, info);
    }
    if let Some(stats) = stats {
        push_statistics(&mut lines, stats);
    }
    if let Some(missing) = missing {
        push_missing(&mut lines, missing);
    }

    let structured = basic_info.is_some() || stats.is_some() || missing.is_some();
    if !structured {
        if let Some(payload) = payload {
            let visible = strip_hidden(payload);
            let pretty =
                serde_json::to_string_pretty(&visible).unwrap_or_else(|_| visible.to_string());
            lines.push(format!("\n{} result: {}", result.kind.as_str(), pretty));
        }
        if let Some(message) = &result.message {
            lines.push(message.clone());
        }
    }

    lines.join("\n")
}

fn push_basic_info(lines: &mut Vec<String>, info: &Value) {
    lines.push(format!(
        "\nDataset: {} rows × {} columns",
        display(info.get("rows")),
        display(info.get("columns"))
    ));
    if let Some(names) = info.get("column_names").and_then(Value::as_array) {
        let names: Vec<String> = names.iter().map(|n| display(Some(n))).collect();
        lines.push(format!("Columns: {}", names.join(", ")));
    }
    if let Some(dtypes) = info.get("dtypes").and_then(Value::as_object) {
        lines.push("\nColumn Types:".to_string());
        for (column, dtype) in dtypes {
            lines.push(format!("  - {}: {}", column, display(Some(dtype))));
        }
    }
}

fn push_statistics(lines: &mut Vec<String>, stats: &Value) {
    let Some(statistics) = stats.get("statistics").and_then(Value::as_object) else {
        if let Some(message) = stats.get("message").and_then(Value::as_str) {
            lines.push(format!("\n{}", message));
        }
        return;
    };
    lines.push("\nStatistical Summary:".to_string());
    for (column, values) in statistics {
        lines.push(format!("\n{}:", column));
        if let Some(values) = values.as_object() {
            for (name, value) in values {
                let rendered = match value.as_f64() {
                    Some(n) => format!("{:.2}", n),
                    None => display(Some(value)),
                };
                lines.push(format!("  - {}: {}", name, rendered));
            }
        }
    }
}

fn push_missing(lines: &mut Vec<String>, missing: &Value) {
    let total = missing
        .get("total_missing")
        .and_then(Value::as_u64)
        .unwrap_or(0);
    if total == 0 {
        lines.push("\nNo missing values detected".to_string());
        return;
    }
    lines.push(format!("\nMissing Values: {} total", total));
    if let Some(details) = missing.get("details").and_then(Value::as_object) {
        for (column, detail) in details {
            lines.push(format!(
                "  - {}: {} ({}%)",
                column,
                display(detail.get("count")),
                display(detail.get("percentage"))
            ));
        }
    }
}

fn strip_hidden(payload: &Value) -> Value {
    match payload {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(k, _)| !HIDDEN_KEYS.contains(&k.as_str()))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        ),
        other => other.clone(),
    }
}

fn display(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => "n/a".to_string(),
        Some(other) => other.to_string(),
    }
}
