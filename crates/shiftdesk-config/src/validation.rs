// SPDX-FileCopyrightText: 2026 Shiftdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks semantic constraints serde attributes cannot express: bindable
//! addresses, URL schemes, numeric ranges.

use shiftdesk_core::HistoryMode;

use crate::diagnostic::ConfigError;
use crate::model::ShiftdeskConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure instead of stopping at the first one.
pub fn validate_config(config: &ShiftdeskConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    let host = config.server.host.trim();
    if host.is_empty() {
        fail("server.host must not be empty".to_string());
    } else {
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-');
        if !is_valid_ip && !is_valid_hostname {
            fail(format!(
                "server.host `{host}` is not a valid IP address or hostname"
            ));
        }
    }

    if config.server.port == 0 {
        fail("server.port must be between 1 and 65535".to_string());
    }

    if !LOG_LEVELS.contains(&config.server.log_level.as_str()) {
        fail(format!(
            "server.log_level `{}` must be one of: {}",
            config.server.log_level,
            LOG_LEVELS.join(", ")
        ));
    }

    if config.openai.model.trim().is_empty() {
        fail("openai.model must not be empty".to_string());
    }

    let base_url = &config.openai.base_url;
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        fail(format!(
            "openai.base_url `{base_url}` must start with http:// or https://"
        ));
    }

    let temperature = config.openai.temperature;
    if !(0.0..=2.0).contains(&temperature) {
        fail(format!(
            "openai.temperature must be between 0.0 and 2.0, got {temperature}"
        ));
    }

    if config.openai.max_tokens == Some(0) {
        fail("openai.max_tokens must be at least 1 when set".to_string());
    }

    if config.openai.timeout_secs == Some(0) {
        fail("openai.timeout_secs must be at least 1 when set".to_string());
    }

    if config.conversation.history == HistoryMode::Retain && config.conversation.max_turns == 0 {
        fail("conversation.max_turns must be at least 1 when history = \"retain\"".to_string());
    }

    for (key, path) in [
        (
            "chat.conversation_template_file",
            &config.chat.conversation_template_file,
        ),
        ("chat.sql_template_file", &config.chat.sql_template_file),
    ] {
        if let Some(path) = path
            && path.trim().is_empty()
        {
            fail(format!("{key} must not be empty when set"));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
