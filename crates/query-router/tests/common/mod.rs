//! Shared test utilities for query-router integration tests.
//!
//! Provides fixture datasets and MockAnalyst (GenerativeAnalyst) with scripted outcomes.

use anyhow::Result;
use async_trait::async_trait;
use dataset::{Column, Dataset};
use query_router::GenerativeAnalyst;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// `{age: int, dept: str}` with no missing values.
#[allow(dead_code)]
pub fn people() -> Dataset {
    Dataset::new(vec![
        Column::numeric("age", vec![Some(25.0), Some(32.0), Some(47.0), Some(51.0)]),
        Column::categorical(
            "dept",
            vec![
                Some("eng".to_string()),
                Some("ops".to_string()),
                Some("eng".to_string()),
                Some("sales".to_string()),
            ],
        ),
    ])
    .unwrap()
}

/// `{age, salary, dept}` where salary grows with age.
#[allow(dead_code)]
pub fn payroll() -> Dataset {
    Dataset::new(vec![
        Column::numeric("age", vec![Some(22.0), Some(30.0), Some(41.0), Some(55.0), Some(60.0)]),
        Column::numeric(
            "salary",
            vec![
                Some(40_000.0),
                Some(52_000.0),
                Some(70_000.0),
                Some(91_000.0),
                Some(99_000.0),
            ],
        ),
        Column::categorical(
            "dept",
            vec![
                Some("eng".to_string()),
                Some("eng".to_string()),
                None,
                Some("ops".to_string()),
                Some("ops".to_string()),
            ],
        ),
    ])
    .unwrap()
}

#[allow(dead_code)]
pub enum Outcome {
    Answer(String),
    Fail(String),
    Hang(Duration),
}

pub struct MockAnalyst {
    outcome: Outcome,
    calls: AtomicUsize,
}

#[allow(dead_code)]
impl MockAnalyst {
    pub fn new(outcome: Outcome) -> Self {
        Self {
            outcome,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerativeAnalyst for MockAnalyst {
    async fn ask(&self, _dataset: &Dataset, _question: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.outcome {
            Outcome::Answer(answer) => Ok(answer.clone()),
            Outcome::Fail(error) => anyhow::bail!("{}", error),
            Outcome::Hang(delay) => {
                tokio::time::sleep(*delay).await;
                Ok("too late".to_string())
            }
        }
    }

    fn max_rows(&self) -> usize {
        3
    }
}
