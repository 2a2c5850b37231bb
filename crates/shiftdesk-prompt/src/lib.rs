// SPDX-FileCopyrightText: 2026 Shiftdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prompt assembly and completion post-processing.
//!
//! - [`template`]: `{name}` placeholder templates and their variables
//! - [`templates`]: built-in prompts, the static shift table, and file overrides
//! - [`parser`]: identity and SQL-sniffing output parsers
//! - [`chain`]: the render -> complete -> parse pipeline

pub mod chain;
pub mod parser;
pub mod template;
pub mod templates;

pub use chain::{Chain, ChainResult};
pub use parser::{IdentityParser, NoStatementFound, OutputParser, SqlSniffer};
pub use template::{PromptTemplate, PromptVars};
pub use templates::{DATABASE_SNAPSHOT, PromptSet};
