// SPDX-FileCopyrightText: 2026 Shiftdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};
use shiftdesk_core::{ChatVariant, HistoryMode};

/// Top-level Shiftdesk configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ShiftdeskConfig {
    /// HTTP listener and logging settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// OpenAI chat completions settings.
    #[serde(default)]
    pub openai: OpenAiConfig,

    /// Chat flow selection and prompt template overrides.
    #[serde(default)]
    pub chat: ChatConfig,

    /// Per-user conversation store settings.
    #[serde(default)]
    pub conversation: ConversationConfig,
}

impl ShiftdeskConfig {
    /// Returns a copy safe to print: secrets are replaced with a marker.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.openai.api_key.is_some() {
            copy.openai.api_key = Some("[redacted]".to_string());
        }
        copy
    }
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_log_level() -> String {
    "info".to_string()
}

/// OpenAI API configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OpenAiConfig {
    /// API key. `None` falls back to the `OPENAI_API_KEY` environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model used for every completion.
    #[serde(default = "default_model")]
    pub model: String,

    /// Base URL of the API, without the `/chat/completions` suffix.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate. `None` lets the API decide.
    #[serde(default)]
    pub max_tokens: Option<u32>,

    /// Retries on transient statuses (429, 500, 502, 503). Zero disables retry.
    #[serde(default)]
    pub max_retries: u32,

    /// Per-request timeout in seconds. `None` waits indefinitely.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl std::fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[redacted]"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("max_retries", &self.max_retries)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            base_url: default_base_url(),
            temperature: default_temperature(),
            max_tokens: None,
            max_retries: 0,
            timeout_secs: None,
        }
    }
}

fn default_model() -> String {
    "gpt-4".to_string()
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

/// Chat flow configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ChatConfig {
    /// Which request flow `POST /chat` runs.
    #[serde(default)]
    pub variant: ChatVariant,

    /// Replaces the built-in conversational prompt with the contents of this file.
    #[serde(default)]
    pub conversation_template_file: Option<String>,

    /// Replaces the built-in SQL-generation prompt with the contents of this file.
    #[serde(default)]
    pub sql_template_file: Option<String>,
}

/// Conversation store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConversationConfig {
    /// `reset` discards history on every request; `retain` accumulates it.
    #[serde(default)]
    pub history: HistoryMode,

    /// Turns kept per user in `retain` mode (oldest dropped first).
    #[serde(default = "default_max_turns")]
    pub max_turns: usize,

    /// Distinct users kept before the least recently seen is evicted. Zero is unbounded.
    #[serde(default = "default_max_users")]
    pub max_users: usize,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            history: HistoryMode::default(),
            max_turns: default_max_turns(),
            max_users: default_max_users(),
        }
    }
}

fn default_max_turns() -> usize {
    20
}

fn default_max_users() -> usize {
    10_000
}
