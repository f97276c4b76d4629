// Copyright 2025 LLM Perfbench Contributors
// SPDX-License-Identifier: Apache-2.0

//! Chat messages and conversation history.
//!
//! A [`ConversationHistory`] is owned by the multi-turn loop of a single
//! target. The user prompt is pushed before a request is issued and the
//! assistant reply is pushed before the next request, so the history sent on
//! every turn is the full exchange so far.

use serde::{Deserialize, Serialize};

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Message written by the benchmark
    User,
    /// Message returned by the model
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// A single role-tagged chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Message author
    pub role: Role,
    /// Message text
    pub content: String,
}

impl ChatMessage {
    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Ordered conversation history for one multi-turn run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationHistory {
    messages: Vec<ChatMessage>,
}

impl ConversationHistory {
    /// Create an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a history holding a single user prompt.
    pub fn single(prompt: impl Into<String>) -> Self {
        let mut history = Self::new();
        history.push_user(prompt);
        history
    }

    /// Append a user prompt.
    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::user(content));
    }

    /// Append an assistant reply.
    ///
    /// Empty replies are not recorded; returns whether the reply was appended.
    pub fn push_assistant(&mut self, content: impl Into<String>) -> bool {
        let content = content.into();
        if content.is_empty() {
            return false;
        }
        self.messages.push(ChatMessage::assistant(content));
        true
    }

    /// Messages in the order they were exchanged.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Number of messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the history is empty.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The most recent message, if any.
    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }
}
