// Copyright 2025 LLM Perfbench Contributors
// SPDX-License-Identifier: Apache-2.0

//! Adapters between LLM Perfbench and the outside world.
//!
//! - [`openai`] - OpenAI-compatible chat completions client with timing
//! - [`memory`] - system memory sampling behind the [`MemoryProbe`] trait
//! - [`code`] - fenced code block extraction and interpreter execution
//!
//! # Example
//!
//! ```no_run
//! use llm_perfbench_adapters::{InferenceClient, SystemMemoryProbe};
//! use llm_perfbench_core::{BenchLog, ConversationHistory, TargetConfig};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let client = InferenceClient::new(None)?;
//! let target = TargetConfig::new("http://localhost:11434/v1/chat/completions", "qwen3:30b-a3b-q8_0");
//! let mut probe = SystemMemoryProbe::new();
//! let mut log = BenchLog::open_append("performance_test.log")?;
//!
//! let outcome = client
//!     .chat(&target, &ConversationHistory::single("Say hi"), 5000, &mut probe, &mut log)
//!     .await;
//! println!("success: {}", outcome.is_success());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod code;
pub mod memory;
pub mod openai;

pub use code::{extract_code_blocks, sanitize_identifier, CodeBlockExtractor, CodeExecutor};
pub use memory::{MemoryProbe, StaticMemoryProbe, SystemMemoryProbe};
pub use openai::{InferenceClient, InferenceClientError};
