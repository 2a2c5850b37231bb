// SPDX-FileCopyrightText: 2026 Shiftdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for Shiftdesk.

use thiserror::Error;

/// The primary error type used across Shiftdesk crates.
#[derive(Debug, Error)]
pub enum ShiftdeskError {
    /// A required request field is missing or empty. The message is user-facing.
    #[error("{0}")]
    Validation(String),

    /// Prompt rendering failed (missing slot value or malformed template).
    #[error("template error: {0}")]
    Template(#[from] TemplateError),

    /// The completion service call failed (transport, auth, quota, bad payload).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration errors detected at startup.
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ShiftdeskError {
    /// Builds a provider error without an underlying source.
    pub fn provider(message: impl Into<String>) -> Self {
        ShiftdeskError::Provider {
            message: message.into(),
            source: None,
        }
    }

    /// Returns true when the error should be reported back to the caller verbatim.
    pub fn is_user_facing(&self) -> bool {
        matches!(self, ShiftdeskError::Validation(_))
    }
}

/// Errors raised while parsing or rendering a prompt template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// A placeholder in the template has no supplied value.
    #[error("missing value for template variable `{0}`")]
    MissingVariable(String),

    /// The template text itself is malformed.
    #[error("malformed template at byte {offset}: {reason}")]
    Malformed { offset: usize, reason: String },
}
