//! Per-model aggregation of turn results.

use llm_perfbench_core::TestResult;
use serde::{Deserialize, Serialize};

/// Inference time of one step, `None` when the step failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepTiming {
    /// Step label ("Single-turn", "Multi-turn Turn 1", ...)
    pub label: String,
    /// Inference duration in seconds
    pub inference_secs: Option<f64>,
}

/// Running totals for one model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSummary {
    /// Model identifier
    pub model: String,
    /// Endpoint of the first result seen for this model
    pub endpoint: String,
    /// Turns attempted
    pub total_tests: usize,
    /// Turns whose inference request succeeded
    pub successful_tests: usize,
    /// Sum of inference seconds over successful turns
    pub total_inference_secs: f64,
    /// Sum of token speeds over successful turns
    pub total_token_speed: f64,
    /// Steps in turn order
    pub steps: Vec<StepTiming>,
}

impl ModelSummary {
    /// Create an empty summary.
    pub fn new(model: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            endpoint: endpoint.into(),
            total_tests: 0,
            successful_tests: 0,
            total_inference_secs: 0.0,
            total_token_speed: 0.0,
            steps: Vec::new(),
        }
    }

    /// Fold one result into the totals.
    pub fn record(&mut self, result: &TestResult) {
        self.total_tests += 1;
        if let Some(completion) = result.inference.completion() {
            self.successful_tests += 1;
            self.total_inference_secs += completion.metrics.elapsed_secs;
            self.total_token_speed += completion.metrics.token_speed;
        }
        self.steps.push(StepTiming {
            label: result.kind.label(),
            inference_secs: result.inference_secs(),
        });
    }

    /// Mean inference time over successful turns, `None` without any.
    pub fn avg_inference_secs(&self) -> Option<f64> {
        self.mean(self.total_inference_secs)
    }

    /// Mean token speed over successful turns, `None` without any.
    pub fn avg_token_speed(&self) -> Option<f64> {
        self.mean(self.total_token_speed)
    }

    fn mean(&self, total: f64) -> Option<f64> {
        if self.successful_tests == 0 {
            None
        } else {
            Some(total / self.successful_tests as f64)
        }
    }
}

/// Group results by model, in order of first appearance.
pub fn summarize(results: &[TestResult]) -> Vec<ModelSummary> {
    let mut summaries: Vec<ModelSummary> = Vec::new();
    for result in results {
        let index = match summaries.iter().position(|s| s.model == result.model) {
            Some(index) => index,
            None => {
                summaries.push(ModelSummary::new(&result.model, &result.endpoint));
                summaries.len() - 1
            }
        };
        summaries[index].record(result);
    }
    summaries
}
