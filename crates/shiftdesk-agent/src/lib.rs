// SPDX-FileCopyrightText: 2026 Shiftdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat handling for Shiftdesk.
//!
//! [`ChatService`] turns a `{user_id, message}` request into a reply by
//! running prompt chains against a completion provider, with per-user state
//! kept in a [`ConversationStore`].

pub mod service;
pub mod shutdown;
pub mod store;

pub use service::{ChatReply, ChatRequest, ChatService, REQUIRED_FIELDS_MESSAGE};
pub use shutdown::install_signal_handler;
pub use store::{ConversationState, ConversationStore, Speaker, Turn};
