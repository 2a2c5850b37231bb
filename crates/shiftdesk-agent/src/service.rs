// SPDX-FileCopyrightText: 2026 Shiftdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The chat request handler.
//!
//! Validates the request, looks up conversation state, runs the
//! conversational chain, and in the shift-cancellation variant runs a second
//! chain that drafts a SQL statement from the exchange.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use shiftdesk_core::{ChatVariant, CompletionProvider, HealthStatus, ShiftdeskError};
use shiftdesk_prompt::{
    Chain, DATABASE_SNAPSHOT, IdentityParser, PromptSet, PromptVars, SqlSniffer,
};
use tracing::{Instrument, debug, info, info_span};
use uuid::Uuid;

use crate::store::ConversationStore;

/// Message returned when either request field is missing or empty.
pub const REQUIRED_FIELDS_MESSAGE: &str = "user_id and message are required";

/// Incoming chat request. Both fields are optional at the wire level so that
/// absence is reported as a validation failure rather than a decode failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ChatRequest {
    pub fn new(user_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            message: Some(message.into()),
        }
    }

    fn validated(&self) -> Result<(&str, &str), ShiftdeskError> {
        match (self.user_id.as_deref(), self.message.as_deref()) {
            (Some(user_id), Some(message)) if !user_id.is_empty() && !message.is_empty() => {
                Ok((user_id, message))
            }
            _ => Err(ShiftdeskError::Validation(REQUIRED_FIELDS_MESSAGE.to_string())),
        }
    }
}

/// Successful chat reply, shaped per variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ChatReply {
    /// `{"response": ...}`
    Conversation { response: String },
    /// `{"response": ..., "db_response": ...}`; `db_response` is null when no
    /// statement was drafted.
    ShiftCancellation {
        response: String,
        db_response: Option<String>,
    },
}

/// Handles chat requests against a completion provider and a conversation store.
pub struct ChatService {
    variant: ChatVariant,
    provider: Arc<dyn CompletionProvider>,
    store: Arc<ConversationStore>,
    conversation: Chain<IdentityParser>,
    sql: Option<Chain<SqlSniffer>>,
}

impl ChatService {
    /// Builds the service for `prompts.variant`.
    ///
    /// The shift-cancellation variant requires an SQL prompt.
    pub fn new(
        prompts: PromptSet,
        provider: Arc<dyn CompletionProvider>,
        store: Arc<ConversationStore>,
    ) -> Result<Self, ShiftdeskError> {
        let sql = match (prompts.variant, prompts.sql) {
            (ChatVariant::ShiftCancellation, Some(template)) => {
                Some(Chain::new(template, Arc::clone(&provider), SqlSniffer))
            }
            (ChatVariant::ShiftCancellation, None) => {
                return Err(ShiftdeskError::Internal(
                    "shift_cancellation variant requires an SQL prompt".into(),
                ));
            }
            (ChatVariant::Conversation, _) => None,
        };

        Ok(Self {
            variant: prompts.variant,
            conversation: Chain::new(prompts.conversation, Arc::clone(&provider), IdentityParser),
            provider,
            store,
            sql,
        })
    }

    pub fn variant(&self) -> ChatVariant {
        self.variant
    }

    pub fn store(&self) -> &Arc<ConversationStore> {
        &self.store
    }

    /// Health of the completion provider. A failed check counts as unhealthy.
    pub async fn provider_health(&self) -> HealthStatus {
        match self.provider.health_check().await {
            Ok(status) => status,
            Err(e) => HealthStatus::Unhealthy(e.to_string()),
        }
    }

    /// Handles one chat request.
    ///
    /// Fails with [`ShiftdeskError::Validation`] when a field is missing or
    /// empty. Template and provider failures propagate unchanged.
    pub async fn handle(&self, request: &ChatRequest) -> Result<ChatReply, ShiftdeskError> {
        let (user_id, message) = request.validated()?;

        let request_id = Uuid::new_v4();
        let span = info_span!("chat", %request_id, user_id, variant = %self.variant);
        self.respond(user_id, message).instrument(span).await
    }

    async fn respond(&self, user_id: &str, message: &str) -> Result<ChatReply, ShiftdeskError> {
        let state = self.store.get_or_create(user_id);

        let mut vars = PromptVars::new()
            .with("history", state.render_history())
            .with("input", message);
        if self.variant == ChatVariant::ShiftCancellation {
            vars.insert("database", DATABASE_SNAPSHOT);
        }

        let Ok(response) = self.conversation.invoke(&vars).await?;
        self.store.record_exchange(user_id, message, &response);

        let Some(sql) = &self.sql else {
            info!(turns = state.turns.len(), "chat request completed");
            return Ok(ChatReply::Conversation { response });
        };

        let sql_vars = PromptVars::new()
            .with("conversation", state.transcript_with(message, &response))
            .with("database", DATABASE_SNAPSHOT);
        let db_response = match sql.invoke(&sql_vars).await? {
            Ok(statement) => Some(statement),
            Err(reason) => {
                debug!(%reason, "SQL completion rejected");
                None
            }
        };

        info!(
            turns = state.turns.len(),
            drafted_sql = db_response.is_some(),
            "chat request completed"
        );
        Ok(ChatReply::ShiftCancellation {
            response,
            db_response,
        })
    }
}

#[cfg(test)]
mod tests {
    use shiftdesk_core::HistoryMode;
    use shiftdesk_test_utils::{FailingProvider, MockProvider};
    use tracing_test::traced_test;

    use super::*;

    fn service(
        variant: ChatVariant,
        mode: HistoryMode,
        provider: Arc<dyn CompletionProvider>,
    ) -> ChatService {
        ChatService::new(
            PromptSet::builtin(variant).unwrap(),
            provider,
            Arc::new(ConversationStore::new(mode, 20, 0)),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn missing_or_empty_fields_are_rejected() {
        let provider = Arc::new(MockProvider::new());
        let svc = service(ChatVariant::Conversation, HistoryMode::Reset, provider.clone());

        let cases = [
            ChatRequest::default(),
            ChatRequest {
                user_id: None,
                message: Some("hi".into()),
            },
            ChatRequest {
                user_id: Some("001".into()),
                message: None,
            },
            ChatRequest::new("", "hi"),
            ChatRequest::new("001", ""),
        ];
        for request in &cases {
            let err = svc.handle(request).await.unwrap_err();
            assert!(matches!(err, ShiftdeskError::Validation(ref m) if m == REQUIRED_FIELDS_MESSAGE));
        }

        assert!(provider.prompts().await.is_empty());
        assert!(svc.store().is_empty());
    }

    #[tokio::test]
    async fn conversation_variant_makes_one_call() {
        let provider = Arc::new(MockProvider::with_responses(vec![
            "I'm sorry to hear that. Which shift?".into(),
        ]));
        let svc = service(ChatVariant::Conversation, HistoryMode::Reset, provider.clone());

        let reply = svc
            .handle(&ChatRequest::new("001", "I can't come in today"))
            .await
            .unwrap();

        assert_eq!(
            reply,
            ChatReply::Conversation {
                response: "I'm sorry to hear that. Which shift?".into()
            }
        );
        let prompts = provider.prompts().await;
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].ends_with("\nWorker: I can't come in today\nAssistant:"));
        assert!(svc.store().contains("001"));
    }

    #[tokio::test]
    async fn shift_cancellation_returns_trimmed_sql() {
        let provider = Arc::new(MockProvider::with_responses(vec![
            "Understood, I'll cancel it.".into(),
            "  UPDATE shifts SET status='cancelled' WHERE id=1\n".into(),
        ]));
        let svc = service(
            ChatVariant::ShiftCancellation,
            HistoryMode::Reset,
            provider.clone(),
        );

        let reply = svc
            .handle(&ChatRequest::new("001", "Cancel my 9 to 5 tomorrow"))
            .await
            .unwrap();

        assert_eq!(
            reply,
            ChatReply::ShiftCancellation {
                response: "Understood, I'll cancel it.".into(),
                db_response: Some("UPDATE shifts SET status='cancelled' WHERE id=1".into()),
            }
        );

        let prompts = provider.prompts().await;
        assert_eq!(prompts.len(), 2);
        assert!(prompts[0].contains(DATABASE_SNAPSHOT));
        assert!(prompts[1].contains(DATABASE_SNAPSHOT));
        assert!(prompts[1].contains(
            "Worker: Cancel my 9 to 5 tomorrow\nAssistant: Understood, I'll cancel it."
        ));
    }

    #[tokio::test]
    #[traced_test]
    async fn shift_cancellation_without_sql_yields_null() {
        let provider = Arc::new(MockProvider::with_responses(vec![
            "Could you tell me which shift?".into(),
            "I'm sorry, I don't understand".into(),
        ]));
        let svc = service(ChatVariant::ShiftCancellation, HistoryMode::Reset, provider);

        let reply = svc
            .handle(&ChatRequest::new("002", "hello"))
            .await
            .unwrap();

        assert_eq!(
            reply,
            ChatReply::ShiftCancellation {
                response: "Could you tell me which shift?".into(),
                db_response: None,
            }
        );
        assert!(logs_contain("SQL completion rejected"));
    }

    #[tokio::test]
    async fn reset_mode_sends_empty_history_every_time() {
        let provider = Arc::new(MockProvider::new());
        let svc = service(ChatVariant::Conversation, HistoryMode::Reset, provider.clone());

        svc.handle(&ChatRequest::new("001", "first")).await.unwrap();
        svc.handle(&ChatRequest::new("001", "second")).await.unwrap();

        let prompts = provider.prompts().await;
        assert!(!prompts[1].contains("first"));
        assert!(prompts[1].ends_with("\n\nWorker: second\nAssistant:"));
    }

    #[tokio::test]
    async fn retain_mode_feeds_history_into_next_prompt() {
        let provider = Arc::new(MockProvider::with_responses(vec![
            "Which shift?".into(),
            "Done.".into(),
        ]));
        let svc = service(ChatVariant::Conversation, HistoryMode::Retain, provider.clone());

        svc.handle(&ChatRequest::new("001", "I can't come in"))
            .await
            .unwrap();
        svc.handle(&ChatRequest::new("001", "The 9 to 5"))
            .await
            .unwrap();

        let prompts = provider.prompts().await;
        assert!(prompts[1].contains(
            "Worker: I can't come in\nAssistant: Which shift?\nWorker: The 9 to 5\nAssistant:"
        ));
    }

    #[tokio::test]
    async fn provider_failure_propagates_and_leaves_history_untouched() {
        let svc = service(
            ChatVariant::Conversation,
            HistoryMode::Retain,
            Arc::new(FailingProvider::new("invalid api key")),
        );

        let err = svc
            .handle(&ChatRequest::new("001", "hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, ShiftdeskError::Provider { .. }));
        assert!(svc.store().get_or_create("001").is_empty());
    }

    #[test]
    fn variant_without_sql_prompt_is_rejected() {
        let mut prompts = PromptSet::builtin(ChatVariant::ShiftCancellation).unwrap();
        prompts.sql = None;
        let result = ChatService::new(
            prompts,
            Arc::new(MockProvider::new()),
            Arc::new(ConversationStore::new(HistoryMode::Reset, 20, 0)),
        );
        assert!(matches!(result, Err(ShiftdeskError::Internal(_))));
    }

    #[test]
    fn replies_serialize_per_variant() {
        let conversation = ChatReply::Conversation {
            response: "hi".into(),
        };
        assert_eq!(
            serde_json::to_value(&conversation).unwrap(),
            serde_json::json!({"response": "hi"})
        );

        let cancellation = ChatReply::ShiftCancellation {
            response: "hi".into(),
            db_response: None,
        };
        assert_eq!(
            serde_json::to_value(&cancellation).unwrap(),
            serde_json::json!({"response": "hi", "db_response": null})
        );
    }

    #[tokio::test]
    async fn provider_health_is_reported() {
        let healthy = service(
            ChatVariant::Conversation,
            HistoryMode::Reset,
            Arc::new(MockProvider::new()),
        );
        assert_eq!(healthy.provider_health().await, HealthStatus::Healthy);

        let failing = service(
            ChatVariant::Conversation,
            HistoryMode::Reset,
            Arc::new(FailingProvider::new("upstream down")),
        );
        assert_eq!(
            failing.provider_health().await,
            HealthStatus::Unhealthy("upstream down".into())
        );
    }
}
