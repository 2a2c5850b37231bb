// SPDX-FileCopyrightText: 2026 Shiftdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock completion providers for deterministic testing.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use shiftdesk_core::{
    CompletionProvider, CompletionRequest, CompletionResponse, HealthStatus, PluginAdapter,
    ShiftdeskError, TokenUsage,
};

/// A mock provider that returns pre-configured responses.
///
/// Responses are popped from a FIFO queue. When the queue is empty,
/// a default "mock response" text is returned. Every prompt received is
/// recorded for later inspection. Health is `Healthy` unless overridden.
#[derive(Clone, Default)]
pub struct MockProvider {
    responses: Arc<Mutex<VecDeque<String>>>,
    prompts: Arc<Mutex<Vec<String>>>,
    health: Option<HealthStatus>,
}

impl MockProvider {
    /// Create a new mock provider with an empty response queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock provider pre-loaded with the given responses.
    pub fn with_responses(responses: Vec<String>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::from(responses))),
            prompts: Arc::default(),
            health: None,
        }
    }

    /// Report `status` from health checks instead of `Healthy`.
    pub fn with_health(mut self, status: HealthStatus) -> Self {
        self.health = Some(status);
        self
    }

    /// Add a response to the end of the queue.
    pub async fn add_response(&self, text: impl Into<String>) {
        self.responses.lock().await.push_back(text.into());
    }

    /// Prompts received so far, in call order.
    pub async fn prompts(&self) -> Vec<String> {
        self.prompts.lock().await.clone()
    }

    async fn next_response(&self) -> String {
        self.responses
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| "mock response".to_string())
    }
}

#[async_trait]
impl PluginAdapter for MockProvider {
    fn name(&self) -> &str {
        "mock-provider"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    async fn health_check(&self) -> Result<HealthStatus, ShiftdeskError> {
        Ok(self.health.clone().unwrap_or(HealthStatus::Healthy))
    }

    async fn shutdown(&self) -> Result<(), ShiftdeskError> {
        Ok(())
    }
}

#[async_trait]
impl CompletionProvider for MockProvider {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, ShiftdeskError> {
        self.prompts.lock().await.push(request.prompt);
        let text = self.next_response().await;
        Ok(CompletionResponse {
            id: format!("mock-resp-{}", uuid::Uuid::new_v4()),
            text,
            model: "mock-model".to_string(),
            usage: TokenUsage {
                prompt_tokens: 10,
                completion_tokens: 20,
            },
        })
    }
}

/// A provider whose every call fails with a provider error.
#[derive(Debug, Clone)]
pub struct FailingProvider {
    message: String,
}

impl FailingProvider {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl PluginAdapter for FailingProvider {
    fn name(&self) -> &str {
        "failing-provider"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    async fn health_check(&self) -> Result<HealthStatus, ShiftdeskError> {
        Ok(HealthStatus::Unhealthy(self.message.clone()))
    }

    async fn shutdown(&self) -> Result<(), ShiftdeskError> {
        Ok(())
    }
}

#[async_trait]
impl CompletionProvider for FailingProvider {
    async fn complete(
        &self,
        _request: CompletionRequest,
    ) -> Result<CompletionResponse, ShiftdeskError> {
        Err(ShiftdeskError::provider(self.message.clone()))
    }
}
