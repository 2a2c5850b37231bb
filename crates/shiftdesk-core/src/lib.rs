// SPDX-FileCopyrightText: 2026 Shiftdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for Shiftdesk.
//!
//! This crate provides the error taxonomy, the completion provider trait, and
//! the small set of types shared by the prompt, provider, chat, and gateway
//! crates.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::{ShiftdeskError, TemplateError};
pub use traits::{CompletionProvider, PluginAdapter};
pub use types::{
    ChatVariant, CompletionRequest, CompletionResponse, HealthStatus, HistoryMode, TokenUsage,
};
