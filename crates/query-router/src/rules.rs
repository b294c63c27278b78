//! The deterministic cascade: ordered keyword rules, first match wins.

use chat_core::{AnalysisKind, AnalysisMetadata, AnalysisResult};
use dataset::{basic_info, column_profile, missing_values, preview, summary, summary_stats, Dataset};
use serde::Serialize;
use tracing::warn;
use visualization::VisualizationSelector;

use crate::intent::contains_any;

const SUMMARY_WORDS: &[&str] = &["summarize", "summary", "overview", "describe"];
const STATISTICS_WORDS: &[&str] = &["stats", "statistics", "statistical"];
const MISSING_WORDS: &[&str] = &["missing", "null", "nan", "empty"];
const CHART_WORDS: &[&str] = &["histogram", "distribution", "plot"];
const PREVIEW_WORDS: &[&str] = &["show", "preview", "display", "head", "first"];

/// Everything a rule may look at.
pub struct RuleInput<'a> {
    pub dataset: &'a Dataset,
    pub query: &'a str,
    pub query_lower: String,
    pub selector: &'a VisualizationSelector,
    pub preview_rows: usize,
}

impl<'a> RuleInput<'a> {
    pub fn new(
        dataset: &'a Dataset,
        query: &'a str,
        selector: &'a VisualizationSelector,
        preview_rows: usize,
    ) -> Self {
        Self {
            dataset,
            query,
            query_lower: query.to_lowercase(),
            selector,
            preview_rows,
        }
    }

    fn metadata(&self) -> AnalysisMetadata {
        AnalysisMetadata::rule_based(self.query)
    }

    fn first_mentioned_column(&self) -> Option<String> {
        self.dataset
            .mentioned_columns(self.query)
            .first()
            .map(|c| c.name().to_string())
    }
}

/// One step of the cascade.
pub struct Rule {
    pub name: &'static str,
    pub matches: fn(&RuleInput) -> bool,
    pub handle: fn(&RuleInput) -> AnalysisResult,
}

/// Rules in evaluation order; [`fallback`] applies when none matches.
pub const RULES: &[Rule] = &[
    Rule {
        name: "summary",
        matches: |input| contains_any(&input.query_lower, SUMMARY_WORDS),
        handle: |input| envelope(AnalysisKind::Summary, &summary(input.dataset), input.metadata()),
    },
    Rule {
        name: "statistics",
        matches: |input| contains_any(&input.query_lower, STATISTICS_WORDS),
        handle: |input| {
            envelope(
                AnalysisKind::Statistics,
                &summary_stats(input.dataset),
                input.metadata(),
            )
        },
    },
    Rule {
        name: "missing_values",
        matches: |input| contains_any(&input.query_lower, MISSING_WORDS),
        handle: |input| {
            envelope(
                AnalysisKind::MissingValues,
                &missing_values(input.dataset),
                input.metadata(),
            )
        },
    },
    Rule {
        name: "visualization",
        matches: |input| contains_any(&input.query_lower, CHART_WORDS),
        handle: handle_chart,
    },
    Rule {
        name: "column_info",
        matches: |input| input.first_mentioned_column().is_some(),
        handle: handle_column_info,
    },
    Rule {
        name: "preview",
        matches: |input| contains_any(&input.query_lower, PREVIEW_WORDS),
        handle: |input| {
            envelope(
                AnalysisKind::Preview,
                &preview(input.dataset, input.preview_rows),
                input.metadata(),
            )
        },
    },
];

/// Applied when no rule matches: basic info.
pub fn fallback(input: &RuleInput) -> AnalysisResult {
    envelope(AnalysisKind::BasicInfo, &basic_info(input.dataset), input.metadata())
}

/// Runs the cascade and returns the first matching rule's result.
pub fn evaluate(input: &RuleInput) -> (&'static str, AnalysisResult) {
    for rule in RULES {
        if (rule.matches)(input) {
            return (rule.name, (rule.handle)(input));
        }
    }
    ("basic_info", fallback(input))
}

fn handle_chart(input: &RuleInput) -> AnalysisResult {
    let Some(column) = input.first_mentioned_column() else {
        return AnalysisResult::error("Please specify a numeric column for histogram")
            .with_metadata(input.metadata());
    };
    input
        .selector
        .select_for_column(input.dataset, input.query, &column)
        .with_metadata(input.metadata().with_column(column))
}

fn handle_column_info(input: &RuleInput) -> AnalysisResult {
    let Some(column) = input.first_mentioned_column() else {
        return fallback(input);
    };
    let metadata = input.metadata().with_column(column.as_str());
    match column_profile(input.dataset, &column) {
        Ok(profile) => envelope(AnalysisKind::ColumnInfo, &profile, metadata),
        Err(e) => AnalysisResult::failure(AnalysisKind::ColumnInfo, e.to_string())
            .with_metadata(metadata),
    }
}

/// Wraps a serializable payload in a successful envelope.
fn envelope<T: Serialize>(
    kind: AnalysisKind,
    payload: &T,
    metadata: AnalysisMetadata,
) -> AnalysisResult {
    match serde_json::to_value(payload) {
        Ok(value) => AnalysisResult::ok(kind, value).with_metadata(metadata),
        Err(e) => {
            warn!(kind = kind.as_str(), error = %e, "Failed to serialize analysis payload");
            AnalysisResult::error(format!("Failed to serialize {} result: {}", kind.as_str(), e))
                .with_metadata(metadata)
        }
    }
}
