//! Benchmark report type.
//!
//! A [`BenchmarkReport`] bundles every turn result of one run with the
//! per-model summaries derived from them. It is the unit written to
//! `results.json` and rendered into `summary.md`.

use crate::summary::{summarize, ModelSummary};
use chrono::{DateTime, Utc};
use llm_perfbench_core::TestResult;
use serde::{Deserialize, Serialize};

/// Complete record of one benchmark run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkReport {
    /// When the first request was issued.
    pub started_at: DateTime<Utc>,
    /// When the last turn finished.
    pub finished_at: DateTime<Utc>,
    /// Every turn result, in execution order.
    pub results: Vec<TestResult>,
    /// Per-model summaries, in order of first appearance.
    pub summaries: Vec<ModelSummary>,
}

impl BenchmarkReport {
    /// Build a report finishing now.
    pub fn new(started_at: DateTime<Utc>, results: Vec<TestResult>) -> Self {
        let summaries = summarize(&results);
        Self {
            started_at,
            finished_at: Utc::now(),
            results,
            summaries,
        }
    }

    /// Number of turns whose inference request succeeded.
    pub fn successful_tests(&self) -> usize {
        self.results.iter().filter(|r| r.success()).count()
    }
}
