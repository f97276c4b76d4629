//! Errors raised while setting up a benchmark run.

use llm_perfbench_adapters::InferenceClientError;
use thiserror::Error;

/// Errors that prevent a benchmark from starting.
///
/// Once a run has started nothing is fatal: failures are recorded on the
/// individual test results.
#[derive(Debug, Error)]
pub enum BenchmarkError {
    /// Invalid configuration
    #[error(transparent)]
    Core(#[from] llm_perfbench_core::Error),

    /// The HTTP client could not be created
    #[error(transparent)]
    Client(#[from] InferenceClientError),
}

/// Result type for benchmark setup.
pub type Result<T> = std::result::Result<T, BenchmarkError>;
