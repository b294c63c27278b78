//! The uniform result envelope returned by every analysis and visualization operation.
//!
//! `success == false` always means `payload` is absent and `message` is present; the
//! constructors are the only way this crate builds envelopes, so the invariant holds for
//! anything produced by datachat itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What an [`AnalysisResult`] contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    Summary,
    Statistics,
    MissingValues,
    Histogram,
    ColumnInfo,
    Preview,
    BasicInfo,
    Visualization,
    GenerativeQuery,
    Error,
}

impl AnalysisKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisKind::Summary => "summary",
            AnalysisKind::Statistics => "statistics",
            AnalysisKind::MissingValues => "missing_values",
            AnalysisKind::Histogram => "histogram",
            AnalysisKind::ColumnInfo => "column_info",
            AnalysisKind::Preview => "preview",
            AnalysisKind::BasicInfo => "basic_info",
            AnalysisKind::Visualization => "visualization",
            AnalysisKind::GenerativeQuery => "generative_query",
            AnalysisKind::Error => "error",
        }
    }
}

/// Which tier produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMethod {
    RuleBased,
    Generative,
}

/// Provenance attached to a result; every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<AnalysisMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    /// Row count of the dataset handed to the generative delegate, before downsampling.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataframe_size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sampled: Option<bool>,
}

impl AnalysisMetadata {
    pub fn rule_based(query: &str) -> Self {
        Self {
            method: Some(AnalysisMethod::RuleBased),
            query: Some(query.to_string()),
            ..Self::default()
        }
    }

    pub fn generative(query: &str) -> Self {
        Self {
            method: Some(AnalysisMethod::Generative),
            query: Some(query.to_string()),
            ..Self::default()
        }
    }

    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }
}

/// `{kind, success, payload?, message?, metadata?}` plus creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub kind: AnalysisKind,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub payload: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub metadata: Option<AnalysisMetadata>,
    pub timestamp: DateTime<Utc>,
}

impl AnalysisResult {
    /// Successful result carrying `payload`.
    pub fn ok(kind: AnalysisKind, payload: Value) -> Self {
        Self {
            kind,
            success: true,
            payload: Some(payload),
            message: None,
            metadata: None,
            timestamp: Utc::now(),
        }
    }

    /// Failed result of the given kind; never carries a payload.
    pub fn failure(kind: AnalysisKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            success: false,
            payload: None,
            message: Some(message.into()),
            metadata: None,
            timestamp: Utc::now(),
        }
    }

    /// Failed result with `kind = error`.
    pub fn error(message: impl Into<String>) -> Self {
        Self::failure(AnalysisKind::Error, message)
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_metadata(mut self, metadata: AnalysisMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Provenance of this result, if recorded.
    pub fn method(&self) -> Option<AnalysisMethod> {
        self.metadata.as_ref().and_then(|m| m.method)
    }

    /// Looks up `payload[key]`.
    pub fn payload_field(&self, key: &str) -> Option<&Value> {
        self.payload.as_ref().and_then(|p| p.get(key))
    }
}
