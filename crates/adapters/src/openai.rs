// Copyright 2025 LLM Perfbench Contributors
// SPDX-License-Identifier: Apache-2.0

//! OpenAI-compatible chat completions client.
//!
//! One call to [`InferenceClient::chat`] is one benchmark turn: memory is
//! sampled, the request is sent and its body parsed, the clock is stopped,
//! and memory is sampled again. Every failure (network error, non-2xx
//! status, unparseable body) becomes [`InferenceOutcome::Failed`]; nothing is
//! propagated to the caller.
//!
//! # Wire format
//!
//! ```text
//! POST <url>
//! {"model": "...", "messages": [{"role": "user", "content": "..."}], "max_tokens": 5000}
//!
//! 200 OK
//! {"choices": [{"message": {"content": "..."}}], "usage": {"completion_tokens": 100}}
//! ```

use crate::memory::MemoryProbe;
use llm_perfbench_core::result::token_speed;
use llm_perfbench_core::{
    BenchLog, ChatMessage, Completion, ConversationHistory, InferenceMetrics, InferenceOutcome,
    TargetConfig,
};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Errors that can occur while talking to an inference endpoint.
#[derive(Debug, Error)]
pub enum InferenceClientError {
    /// The HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    /// Network-level failure (connection refused, reset, timeout, ...)
    #[error("API request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The endpoint answered with a non-2xx status
    #[error("API returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, possibly empty
        body: String,
    },

    /// The response body was not a chat completion
    #[error("Invalid response body: {0}")]
    InvalidBody(String),
}

/// Result type for inference client operations.
pub type Result<T> = std::result::Result<T, InferenceClientError>;

/// Chat completion request body.
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest<'a> {
    /// Model identifier
    pub model: &'a str,
    /// Conversation so far
    pub messages: &'a [ChatMessage],
    /// Completion token budget
    pub max_tokens: u32,
}

/// Chat completion response body.
///
/// Every field is optional on the wire; missing pieces read as empty content
/// or absent usage.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatCompletionResponse {
    /// Completion choices
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
    /// Token usage
    #[serde(default)]
    pub usage: Option<ChatUsage>,
}

/// A single completion choice.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatChoice {
    /// Generated message
    #[serde(default)]
    pub message: Option<ChatChoiceMessage>,
}

/// Message inside a completion choice.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatChoiceMessage {
    /// Generated text
    #[serde(default)]
    pub content: Option<String>,
}

/// Token usage statistics.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatUsage {
    /// Completion tokens
    #[serde(default)]
    pub completion_tokens: Option<u64>,
}

impl ChatCompletionResponse {
    /// Content of the first choice, or `""`.
    pub fn content(&self) -> &str {
        self.choices
            .first()
            .and_then(|choice| choice.message.as_ref())
            .and_then(|message| message.content.as_deref())
            .unwrap_or("")
    }

    /// Reported completion token count.
    pub fn completion_tokens(&self) -> Option<u64> {
        self.usage.as_ref().and_then(|usage| usage.completion_tokens)
    }
}

/// Client for OpenAI-compatible chat completion endpoints.
#[derive(Debug, Clone)]
pub struct InferenceClient {
    client: reqwest::Client,
}

impl InferenceClient {
    /// Create a client; `request_timeout` bounds each whole request when set.
    pub fn new(request_timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(InferenceClientError::Build)?;
        Ok(Self { client })
    }

    /// Run one chat completion exchange against `target`.
    pub async fn chat(
        &self,
        target: &TargetConfig,
        history: &ConversationHistory,
        max_tokens: u32,
        probe: &mut dyn MemoryProbe,
        log: &mut BenchLog,
    ) -> InferenceOutcome {
        let request = ChatCompletionRequest {
            model: &target.model,
            messages: history.messages(),
            max_tokens,
        };
        log.info(format!(
            "Sending request payload to {}: {}",
            target.url,
            serde_json::to_string_pretty(&request).unwrap_or_default()
        ));

        let memory_before = probe.sample();
        let start = Instant::now();
        let response = match self.send(&target.url, &request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(model = %target.model, url = %target.url, error = %e, "Inference request failed");
                log.error(format!("API request failed: {}", e));
                return InferenceOutcome::failed(e.to_string());
            }
        };
        let elapsed_secs = start.elapsed().as_secs_f64();
        let memory_after = probe.sample();

        let completion_tokens = response.completion_tokens();
        let speed = token_speed(completion_tokens, elapsed_secs);
        tracing::info!(
            model = %target.model,
            elapsed_secs,
            completion_tokens = ?completion_tokens,
            token_speed = speed,
            "Inference request completed"
        );

        InferenceOutcome::Completed(Completion {
            content: response.content().to_string(),
            completion_tokens,
            metrics: InferenceMetrics {
                elapsed_secs,
                memory_before,
                memory_after,
                token_speed: speed,
            },
        })
    }

    async fn send(
        &self,
        url: &str,
        request: &ChatCompletionRequest<'_>,
    ) -> Result<ChatCompletionResponse> {
        let response = self.client.post(url).json(request).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(InferenceClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| InferenceClientError::InvalidBody(e.to_string()))
    }
}
