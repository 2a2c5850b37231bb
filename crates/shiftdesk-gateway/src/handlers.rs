// SPDX-FileCopyrightText: 2026 Shiftdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers.
//!
//! Handles POST /chat and GET /health.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use shiftdesk_agent::ChatRequest;
use shiftdesk_core::{HealthStatus, ShiftdeskError};
use tracing::{error, warn};

use crate::server::GatewayState;

/// Body sent with every 500 response.
pub const INTERNAL_ERROR_MESSAGE: &str = "internal server error";

/// Error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error description.
    pub error: String,
}

/// Response body for GET /health.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `ok`, `degraded` or `unhealthy`, from the completion provider.
    pub status: String,
    /// Why the provider is not healthy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub version: String,
    pub uptime_secs: u64,
    /// Configured chat variant.
    pub variant: String,
}

/// Maps service errors onto HTTP responses. Only validation failures are
/// shown to the caller; everything else is logged and reported as a 500.
pub struct ApiError(ShiftdeskError);

impl From<ShiftdeskError> for ApiError {
    fn from(err: ShiftdeskError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = if self.0.is_user_facing() {
            (StatusCode::BAD_REQUEST, self.0.to_string())
        } else {
            error!(error = %self.0, "chat request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                INTERNAL_ERROR_MESSAGE.to_string(),
            )
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

/// POST /chat
///
/// Body `{"user_id": string, "message": string}`. Replies with the
/// variant's JSON shape, or 400 when the body is unusable.
pub async fn post_chat(
    State(state): State<GatewayState>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            let message = rejection.body_text();
            warn!(error = %message, "rejected chat request body");
            return (StatusCode::BAD_REQUEST, Json(ErrorResponse { error: message })).into_response();
        }
    };

    match state.chat.handle(&request).await {
        Ok(reply) => (StatusCode::OK, Json(reply)).into_response(),
        Err(err) => ApiError::from(err).into_response(),
    }
}

/// GET /health
///
/// 200 while the provider is healthy or degraded, 503 once it is unhealthy.
pub async fn get_health(State(state): State<GatewayState>) -> (StatusCode, Json<HealthResponse>) {
    let (code, status, detail) = match state.chat.provider_health().await {
        HealthStatus::Healthy => (StatusCode::OK, "ok", None),
        HealthStatus::Degraded(reason) => (StatusCode::OK, "degraded", Some(reason)),
        HealthStatus::Unhealthy(reason) => {
            (StatusCode::SERVICE_UNAVAILABLE, "unhealthy", Some(reason))
        }
    };

    (
        code,
        Json(HealthResponse {
            status: status.to_string(),
            detail,
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_secs: state.health.start_time.elapsed().as_secs(),
            variant: state.chat.variant().to_string(),
        }),
    )
}
