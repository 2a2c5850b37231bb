// SPDX-FileCopyrightText: 2026 Shiftdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the provider, prompt, and chat crates.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Which request flow the chat endpoint runs.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ChatVariant {
    /// Single completion call, `{"response": ...}`.
    #[default]
    Conversation,
    /// Conversational reply plus a drafted SQL statement, `{"response": ..., "db_response": ...}`.
    ShiftCancellation,
}

/// Whether the conversation store keeps turns between requests.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum HistoryMode {
    /// Every lookup yields a fresh, empty state.
    #[default]
    Reset,
    /// Turns are appended after each successful exchange.
    Retain,
}

/// A request to a completion provider: one fully rendered prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    /// The rendered prompt text, sent as a single user message.
    pub prompt: String,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
        }
    }
}

/// The generated text returned by a completion provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionResponse {
    /// Provider-assigned response id.
    pub id: String,
    /// Generated text.
    pub text: String,
    /// Model that produced the text.
    pub model: String,
    /// Token accounting, when the provider reports it.
    pub usage: TokenUsage,
}

/// Token usage reported by a provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}
