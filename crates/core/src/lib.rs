// Copyright 2025 LLM Perfbench Contributors
// SPDX-License-Identifier: Apache-2.0

//! Core types for LLM Perfbench.
//!
//! This crate holds everything the other crates agree on:
//!
//! - [`config`] - layered benchmark configuration
//! - [`message`] - chat messages and conversation history
//! - [`result`] - per-turn records and inference/execution outcomes
//! - [`log`] - the explicit, append-only benchmark log
//! - [`error`] - shared error type

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod log;
pub mod message;
pub mod result;

pub use config::{BenchConfig, ExecutionConfig, ReportConfig, TargetConfig};
pub use error::{Error, Result};
pub use log::BenchLog;
pub use message::{ChatMessage, ConversationHistory, Role};
pub use result::{
    CodeExecution, Completion, ExecutionStatus, InferenceMetrics, InferenceOutcome,
    MemorySnapshot, TestKind, TestResult,
};
