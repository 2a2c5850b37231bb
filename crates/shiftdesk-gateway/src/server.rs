// SPDX-FileCopyrightText: 2026 Shiftdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    Router,
    routing::{get, post},
};
use shiftdesk_agent::ChatService;
use shiftdesk_config::model::ServerConfig;
use shiftdesk_core::ShiftdeskError;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::handlers;

/// Health state for the unauthenticated health endpoint.
#[derive(Clone)]
pub struct HealthState {
    /// Process start time for uptime calculation.
    pub start_time: Instant,
}

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub chat: Arc<ChatService>,
    pub health: HealthState,
}

impl GatewayState {
    pub fn new(chat: Arc<ChatService>) -> Self {
        Self {
            chat,
            health: HealthState {
                start_time: Instant::now(),
            },
        }
    }
}

/// Builds the router:
/// - POST /chat
/// - GET /health
pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/chat", post(handlers::post_chat))
        .route("/health", get(handlers::get_health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Binds the listener for `config.host:config.port`.
pub async fn bind(config: &ServerConfig) -> Result<TcpListener, ShiftdeskError> {
    let addr = format!("{}:{}", config.host, config.port);
    TcpListener::bind(&addr)
        .await
        .map_err(|e| ShiftdeskError::Internal(format!("failed to bind gateway to {addr}: {e}")))
}

/// Serves the router on `listener` until `shutdown` is cancelled, then lets
/// in-flight requests finish.
pub async fn serve(
    listener: TcpListener,
    state: GatewayState,
    shutdown: CancellationToken,
) -> Result<(), ShiftdeskError> {
    let local: Option<SocketAddr> = listener.local_addr().ok();
    info!(
        addr = local.map(|a| a.to_string()).unwrap_or_default(),
        variant = %state.chat.variant(),
        "gateway server listening"
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| ShiftdeskError::Internal(format!("gateway server error: {e}")))?;

    info!("gateway server stopped");
    Ok(())
}

/// Binds and serves in one step.
pub async fn start_server(
    config: &ServerConfig,
    state: GatewayState,
    shutdown: CancellationToken,
) -> Result<(), ShiftdeskError> {
    let listener = bind(config).await?;
    serve(listener, state, shutdown).await
}
