// SPDX-FileCopyrightText: 2026 Shiftdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Completion provider trait for text-generation services.

use async_trait::async_trait;

use crate::error::ShiftdeskError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{CompletionRequest, CompletionResponse};

/// Adapter for an external text-completion service.
///
/// Given a fully rendered prompt, returns generated text. Implementations hold
/// no conversation state of their own.
#[async_trait]
pub trait CompletionProvider: PluginAdapter {
    /// Sends a completion request and returns the full response.
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, ShiftdeskError>;

    /// Convenience wrapper returning only the generated text.
    async fn generate(&self, prompt: &str) -> Result<String, ShiftdeskError> {
        let response = self.complete(CompletionRequest::new(prompt)).await?;
        Ok(response.text)
    }
}
