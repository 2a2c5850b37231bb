// SPDX-FileCopyrightText: 2026 Shiftdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-processing of completion text.

use std::convert::Infallible;

use thiserror::Error;

/// Keywords whose presence marks completion text as a SQL statement.
pub const SQL_KEYWORDS: [&str; 4] = ["SELECT", "INSERT", "UPDATE", "DELETE"];

/// Turns raw completion text into a typed result.
pub trait OutputParser: Send + Sync {
    type Output;
    type Error;

    fn parse(&self, text: String) -> Result<Self::Output, Self::Error>;
}

/// Returns the completion text unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityParser;

impl OutputParser for IdentityParser {
    type Output = String;
    type Error = Infallible;

    fn parse(&self, text: String) -> Result<String, Infallible> {
        Ok(text)
    }
}

/// The completion did not contain a recognizable SQL statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no SQL statement found in completion")]
pub struct NoStatementFound;

/// Accepts text containing one of [`SQL_KEYWORDS`] (case-sensitive substring
/// match, no grammar check) and returns it trimmed.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlSniffer;

impl OutputParser for SqlSniffer {
    type Output = String;
    type Error = NoStatementFound;

    fn parse(&self, text: String) -> Result<String, NoStatementFound> {
        if SQL_KEYWORDS.iter().any(|kw| text.contains(kw)) {
            Ok(text.trim().to_string())
        } else {
            Err(NoStatementFound)
        }
    }
}
