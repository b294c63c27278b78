//! Intent classification by vocabulary membership.

/// Queries containing any of these stay in the deterministic tier.
pub const SIMPLE_PATTERNS: &[&str] = &[
    "show", "preview", "display", "head", "first", "rows", "columns", "count", "length", "size",
    "shape", "info", "describe", "stats",
];

/// Queries containing any of these are worth a generative answer.
pub const COMPLEX_PATTERNS: &[&str] = &[
    "correlation",
    "relationship",
    "pattern",
    "trend",
    "outlier",
    "insight",
    "analysis",
    "why",
    "how",
    "what if",
    "predict",
    "group by",
    "aggregate",
    "compare",
    "difference",
];

pub(crate) fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

/// True when `query` has no simple-intent term and at least one complex-intent term.
///
/// Matching is case-insensitive substring membership, so "show" already rules out "how".
pub fn should_use_generative(query: &str) -> bool {
    let query_lower = query.to_lowercase();
    if contains_any(&query_lower, SIMPLE_PATTERNS) {
        return false;
    }
    contains_any(&query_lower, COMPLEX_PATTERNS)
}
