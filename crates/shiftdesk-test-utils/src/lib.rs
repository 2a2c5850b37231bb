// SPDX-FileCopyrightText: 2026 Shiftdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Shiftdesk.
//!
//! Provides completion providers that never touch the network, for unit and
//! integration tests across the workspace.

pub mod mock_provider;

pub use mock_provider::{FailingProvider, MockProvider};
