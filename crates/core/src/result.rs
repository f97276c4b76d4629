// Copyright 2025 LLM Perfbench Contributors
// SPDX-License-Identifier: Apache-2.0

//! Per-turn benchmark records.
//!
//! A [`TestResult`] is created once per turn and never mutated afterwards.
//! Inference failures are carried as [`InferenceOutcome::Failed`] rather than
//! zeroed metrics, so every accessor that reports a measurement returns
//! `Option`.

use serde::{Deserialize, Serialize};

/// Which scenario a turn belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TestKind {
    /// One-shot prompt with no prior history
    SingleTurn,
    /// Turn `turn` (1-based) of the multi-turn conversation
    MultiTurn {
        /// 1-based turn number
        turn: usize,
    },
}

impl TestKind {
    /// Human-readable label used in logs and summaries.
    pub fn label(&self) -> String {
        match self {
            TestKind::SingleTurn => "Single-turn".to_string(),
            TestKind::MultiTurn { turn } => format!("Multi-turn Turn {}", turn),
        }
    }

    /// Filesystem-friendly identifier used for generated code files.
    pub fn identifier(&self) -> String {
        match self {
            TestKind::SingleTurn => "single_turn".to_string(),
            TestKind::MultiTurn { turn } => format!("multi_turn_turn_{}", turn),
        }
    }
}

impl std::fmt::Display for TestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label())
    }
}

/// System memory usage at one instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MemorySnapshot {
    /// Used memory as a percentage of total
    pub percent: f64,
    /// Used memory in GB
    pub used_gb: f64,
}

/// Measurements taken around one inference request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceMetrics {
    /// Wall-clock request duration in seconds
    pub elapsed_secs: f64,
    /// Memory sampled immediately before the request
    pub memory_before: MemorySnapshot,
    /// Memory sampled immediately after the response
    pub memory_after: MemorySnapshot,
    /// Completion tokens per second (0 when usage is unavailable)
    pub token_speed: f64,
}

/// A successful chat completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Completion {
    /// Text of the first choice's message
    pub content: String,
    /// Completion token count reported by the server
    pub completion_tokens: Option<u64>,
    /// Timing and memory measurements
    pub metrics: InferenceMetrics,
}

/// Outcome of one inference request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum InferenceOutcome {
    /// The endpoint answered with a 2xx response
    Completed(Completion),
    /// The request failed (network error, non-2xx status, bad body)
    Failed {
        /// Failure description
        reason: String,
    },
}

impl InferenceOutcome {
    /// Create a failed outcome.
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }

    /// The completion, if the request succeeded.
    pub fn completion(&self) -> Option<&Completion> {
        match self {
            InferenceOutcome::Completed(completion) => Some(completion),
            InferenceOutcome::Failed { .. } => None,
        }
    }

    /// Whether the request succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, InferenceOutcome::Completed(_))
    }
}

/// Token speed: completion tokens divided by elapsed seconds.
///
/// Returns 0 when the count is missing or the elapsed time is not positive.
pub fn token_speed(completion_tokens: Option<u64>, elapsed_secs: f64) -> f64 {
    match completion_tokens {
        Some(tokens) if elapsed_secs > 0.0 => tokens as f64 / elapsed_secs,
        _ => 0.0,
    }
}

/// How running an extracted code block ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ExecutionStatus {
    /// Interpreter exited with status 0
    Succeeded,
    /// Interpreter exited with a nonzero status (or was killed by a signal)
    Failed {
        /// Exit code, when the process exited normally
        exit_code: Option<i32>,
    },
    /// The response held no fenced block with the configured language tag
    NoCodeBlock,
    /// The interpreter ran past the timeout and was killed
    TimedOut,
    /// The interpreter executable could not be found
    InterpreterNotFound,
    /// Any other error while preparing or running the interpreter
    Errored,
}

impl std::fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionStatus::Succeeded => write!(f, "succeeded"),
            ExecutionStatus::Failed {
                exit_code: Some(code),
            } => write!(f, "failed (exit code {})", code),
            ExecutionStatus::Failed { exit_code: None } => write!(f, "failed (terminated)"),
            ExecutionStatus::NoCodeBlock => write!(f, "no code block found"),
            ExecutionStatus::TimedOut => write!(f, "timed out"),
            ExecutionStatus::InterpreterNotFound => write!(f, "interpreter not found"),
            ExecutionStatus::Errored => write!(f, "execution error"),
        }
    }
}

/// Result of extracting and running the code in one response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeExecution {
    /// How execution ended
    pub status: ExecutionStatus,
    /// Trimmed standard output
    pub output: String,
    /// Trimmed standard error, or a description of the execution failure
    pub error: String,
}

impl CodeExecution {
    /// Outcome for a response without a matching code block.
    pub fn no_code_block() -> Self {
        Self {
            status: ExecutionStatus::NoCodeBlock,
            output: String::new(),
            error: String::new(),
        }
    }

    /// Whether the code ran and exited with status 0.
    pub fn success(&self) -> bool {
        self.status == ExecutionStatus::Succeeded
    }
}

/// Record of one benchmark turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    /// Model identifier sent to the endpoint
    pub model: String,
    /// Endpoint URL
    pub endpoint: String,
    /// Scenario and turn
    pub kind: TestKind,
    /// Prompt sent on this turn
    pub prompt: String,
    /// Inference outcome
    pub inference: InferenceOutcome,
    /// Code execution result; absent when the request failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_execution: Option<CodeExecution>,
}

impl TestResult {
    /// Whether the inference request succeeded.
    pub fn success(&self) -> bool {
        self.inference.is_success()
    }

    /// Inference duration in seconds, for successful turns.
    pub fn inference_secs(&self) -> Option<f64> {
        self.inference
            .completion()
            .map(|c| c.metrics.elapsed_secs)
    }

    /// Token speed, for successful turns.
    pub fn token_speed(&self) -> Option<f64> {
        self.inference.completion().map(|c| c.metrics.token_speed)
    }

    /// Response text, empty for failed turns.
    pub fn response_content(&self) -> &str {
        self.inference
            .completion()
            .map(|c| c.content.as_str())
            .unwrap_or("")
    }

    /// Failure reason, for failed turns.
    pub fn failure_reason(&self) -> Option<&str> {
        match &self.inference {
            InferenceOutcome::Failed { reason } => Some(reason),
            InferenceOutcome::Completed(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn completed(elapsed_secs: f64, tokens: Option<u64>) -> InferenceOutcome {
        InferenceOutcome::Completed(Completion {
            content: "done".to_string(),
            completion_tokens: tokens,
            metrics: InferenceMetrics {
                elapsed_secs,
                memory_before: MemorySnapshot::default(),
                memory_after: MemorySnapshot::default(),
                token_speed: token_speed(tokens, elapsed_secs),
            },
        })
    }

    #[test]
    fn test_kind_labels_and_identifiers() {
        assert_eq!(TestKind::SingleTurn.label(), "Single-turn");
        assert_eq!(TestKind::SingleTurn.identifier(), "single_turn");
        assert_eq!(TestKind::MultiTurn { turn: 2 }.label(), "Multi-turn Turn 2");
        assert_eq!(
            TestKind::MultiTurn { turn: 2 }.identifier(),
            "multi_turn_turn_2"
        );
    }

    #[test]
    fn test_token_speed_without_usage_is_zero() {
        assert_eq!(token_speed(None, 2.0), 0.0);
    }

    #[test]
    fn test_token_speed_with_non_positive_elapsed_is_zero() {
        assert_eq!(token_speed(Some(100), 0.0), 0.0);
        assert_eq!(token_speed(Some(100), -1.0), 0.0);
    }

    #[test]
    fn test_token_speed() {
        assert_eq!(token_speed(Some(100), 2.0), 50.0);
    }

    #[test]
    fn test_failed_result_has_no_metrics() {
        let result = TestResult {
            model: "m".to_string(),
            endpoint: "http://localhost:1".to_string(),
            kind: TestKind::SingleTurn,
            prompt: "p".to_string(),
            inference: InferenceOutcome::failed("connection refused"),
            code_execution: None,
        };
        assert!(!result.success());
        assert_eq!(result.inference_secs(), None);
        assert_eq!(result.token_speed(), None);
        assert_eq!(result.response_content(), "");
        assert_eq!(result.failure_reason(), Some("connection refused"));
    }

    #[test]
    fn test_completed_result_accessors() {
        let result = TestResult {
            model: "m".to_string(),
            endpoint: "http://localhost:1".to_string(),
            kind: TestKind::MultiTurn { turn: 1 },
            prompt: "p".to_string(),
            inference: completed(4.0, Some(100)),
            code_execution: Some(CodeExecution::no_code_block()),
        };
        assert!(result.success());
        assert_eq!(result.inference_secs(), Some(4.0));
        assert_eq!(result.token_speed(), Some(25.0));
        assert_eq!(result.response_content(), "done");
        assert!(!result.code_execution.unwrap().success());
    }

    #[test]
    fn test_no_code_block_execution() {
        let execution = CodeExecution::no_code_block();
        assert!(!execution.success());
        assert_eq!(execution.output, "");
        assert_eq!(execution.status.to_string(), "no code block found");
    }
}
