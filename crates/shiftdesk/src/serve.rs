// SPDX-FileCopyrightText: 2026 Shiftdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `shiftdesk serve` implementation.
//!
//! Wires the configured prompts, the OpenAI provider, the conversation store
//! and the chat service into the HTTP gateway, then serves until SIGINT or
//! SIGTERM.

use std::sync::Arc;

use shiftdesk_agent::{ChatService, ConversationStore, install_signal_handler};
use shiftdesk_config::ShiftdeskConfig;
use shiftdesk_core::{CompletionProvider, ShiftdeskError};
use shiftdesk_gateway::GatewayState;
use shiftdesk_openai::OpenAiProvider;
use shiftdesk_prompt::PromptSet;
use tracing::{info, warn};

/// Runs the server until a shutdown signal arrives.
pub async fn run_serve(config: ShiftdeskConfig) -> Result<(), ShiftdeskError> {
    init_tracing(&config.server.log_level);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        variant = %config.chat.variant,
        history = %config.conversation.history,
        "starting shiftdesk serve"
    );

    let prompts = PromptSet::load(&config.chat).await?;
    let provider: Arc<dyn CompletionProvider> = Arc::new(OpenAiProvider::new(&config.openai)?);
    let store = Arc::new(ConversationStore::from_config(&config.conversation));
    let chat = Arc::new(ChatService::new(prompts, Arc::clone(&provider), store)?);

    let listener = shiftdesk_gateway::bind(&config.server).await?;
    let shutdown = install_signal_handler();
    shiftdesk_gateway::serve(listener, GatewayState::new(chat), shutdown).await?;

    if let Err(e) = provider.shutdown().await {
        warn!(error = %e, "provider shutdown failed");
    }
    info!("shiftdesk stopped");
    Ok(())
}

/// Installs the global subscriber. `RUST_LOG` wins over the configured level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("shiftdesk={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
