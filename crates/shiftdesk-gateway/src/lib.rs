// SPDX-FileCopyrightText: 2026 Shiftdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for Shiftdesk.
//!
//! Exposes the chat service over axum: `POST /chat` for worker messages and
//! `GET /health` for liveness checks.

pub mod handlers;
pub mod server;

pub use handlers::{ApiError, ErrorResponse, HealthResponse};
pub use server::{GatewayState, HealthState, bind, router, serve, start_server};
