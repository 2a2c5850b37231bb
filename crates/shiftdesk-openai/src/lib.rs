// SPDX-FileCopyrightText: 2026 Shiftdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI chat completions provider for Shiftdesk.
//!
//! This crate implements [`CompletionProvider`] on top of the Chat Completions
//! API. Each rendered prompt is sent as a single user message.

pub mod client;
pub mod types;

use async_trait::async_trait;
use secrecy::SecretString;
use shiftdesk_config::model::OpenAiConfig;
use shiftdesk_core::{
    CompletionProvider, CompletionRequest, CompletionResponse, HealthStatus, PluginAdapter,
    ShiftdeskError, TokenUsage,
};
use tracing::{debug, info, warn};

use crate::client::OpenAiClient;
use crate::types::{ChatCompletionRequest, ChatMessage};

/// Environment variable consulted when `openai.api_key` is unset.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// OpenAI provider implementing [`CompletionProvider`].
///
/// API key resolution order: config -> `OPENAI_API_KEY` env var. A missing key
/// does not prevent startup; every completion then fails with a provider error.
pub struct OpenAiProvider {
    client: OpenAiClient,
    api_key: Option<SecretString>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
}

impl OpenAiProvider {
    /// Creates a provider from the `[openai]` config section.
    pub fn new(config: &OpenAiConfig) -> Result<Self, ShiftdeskError> {
        let api_key = resolve_api_key(config.api_key.as_deref(), std::env::var(API_KEY_ENV).ok());
        if api_key.is_none() {
            warn!(
                "OpenAI API key not found; set openai.api_key or {API_KEY_ENV}. Completions will fail until it is provided."
            );
        }

        let client = OpenAiClient::new(config)?;
        info!(
            model = config.model.as_str(),
            endpoint = client.endpoint(),
            "OpenAI provider initialized"
        );

        Ok(Self {
            client,
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    fn to_chat_request(&self, request: CompletionRequest) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::user(request.prompt)],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

#[async_trait]
impl PluginAdapter for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    async fn health_check(&self) -> Result<HealthStatus, ShiftdeskError> {
        // No API call: health checks must not spend tokens.
        Ok(match self.api_key {
            Some(_) => HealthStatus::Healthy,
            None => HealthStatus::Degraded("OpenAI API key is not configured".into()),
        })
    }

    async fn shutdown(&self) -> Result<(), ShiftdeskError> {
        debug!("OpenAI provider shutting down");
        Ok(())
    }
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, ShiftdeskError> {
        let api_key = self.api_key.as_ref().ok_or_else(|| {
            ShiftdeskError::provider(format!(
                "OpenAI API key not found. Set openai.api_key in config or {API_KEY_ENV} environment variable."
            ))
        })?;

        let api_request = self.to_chat_request(request);
        let response = self.client.create_completion(api_key, &api_request).await?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ShiftdeskError::provider("OpenAI response contained no choices"))?;
        let text = choice
            .message
            .content
            .ok_or_else(|| ShiftdeskError::provider("OpenAI response message had no content"))?;

        let usage = response.usage.map_or_else(TokenUsage::default, |u| TokenUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
        });

        Ok(CompletionResponse {
            id: response.id,
            text,
            model: response.model,
            usage,
        })
    }
}

/// Picks the configured key, falling back to the environment value.
/// Empty strings count as unset.
fn resolve_api_key(config_key: Option<&str>, env_key: Option<String>) -> Option<SecretString> {
    if let Some(key) = config_key
        && !key.is_empty()
    {
        return Some(SecretString::from(key.to_string()));
    }
    env_key
        .filter(|key| !key.is_empty())
        .map(SecretString::from)
}

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn provider_for(server: &MockServer, api_key: Option<&str>) -> OpenAiProvider {
        let config = OpenAiConfig {
            base_url: server.uri(),
            ..Default::default()
        };
        OpenAiProvider {
            client: OpenAiClient::new(&config).unwrap(),
            api_key: api_key.map(|k| SecretString::from(k.to_string())),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }

    #[test]
    fn config_key_wins_over_env() {
        let key = resolve_api_key(Some("sk-config"), Some("sk-env".into())).unwrap();
        assert_eq!(key.expose_secret(), "sk-config");
    }

    #[test]
    fn empty_config_key_falls_back_to_env() {
        let key = resolve_api_key(Some(""), Some("sk-env".into())).unwrap();
        assert_eq!(key.expose_secret(), "sk-env");
    }

    #[test]
    fn no_key_anywhere_resolves_to_none() {
        assert!(resolve_api_key(None, None).is_none());
        assert!(resolve_api_key(None, Some(String::new())).is_none());
    }

    #[tokio::test]
    async fn complete_sends_prompt_as_single_user_message() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(serde_json::json!({
                "model": "gpt-4",
                "temperature": 0.7,
                "messages": [{"role": "user", "content": "Worker: hi\nAssistant:"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "chatcmpl-42",
                "model": "gpt-4-0613",
                "choices": [{"index": 0, "message": {"role": "assistant", "content": "Hello!"}, "finish_reason": "stop"}],
                "usage": {"prompt_tokens": 12, "completion_tokens": 2}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = provider_for(&server, Some("sk-test"));
        let response = provider
            .complete(CompletionRequest::new("Worker: hi\nAssistant:"))
            .await
            .unwrap();

        assert_eq!(response.id, "chatcmpl-42");
        assert_eq!(response.text, "Hello!");
        assert_eq!(response.usage.prompt_tokens, 12);
        assert_eq!(response.usage.completion_tokens, 2);
    }

    #[tokio::test]
    async fn missing_key_fails_without_calling_the_api() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let provider = provider_for(&server, None);
        let err = provider.generate("hi").await.unwrap_err();
        assert!(matches!(err, ShiftdeskError::Provider { .. }));
        assert!(err.to_string().contains("API key not found"), "got: {err}");
        assert!(matches!(
            provider.health_check().await.unwrap(),
            HealthStatus::Degraded(_)
        ));
    }

    #[tokio::test]
    async fn empty_choices_is_a_provider_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "chatcmpl-empty",
                "model": "gpt-4",
                "choices": []
            })))
            .mount(&server)
            .await;

        let provider = provider_for(&server, Some("sk-test"));
        let err = provider.generate("hi").await.unwrap_err();
        assert!(err.to_string().contains("no choices"), "got: {err}");
    }

    #[tokio::test]
    async fn missing_usage_defaults_to_zero() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "chatcmpl-nousage",
                "model": "gpt-4",
                "choices": [{"message": {"role": "assistant", "content": "ok"}}]
            })))
            .mount(&server)
            .await;

        let provider = provider_for(&server, Some("sk-test"));
        let response = provider.complete(CompletionRequest::new("hi")).await.unwrap();
        assert_eq!(response.usage, TokenUsage::default());
    }
}
