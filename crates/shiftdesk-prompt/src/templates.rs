// SPDX-FileCopyrightText: 2026 Shiftdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Built-in prompts, the static shift table, and per-variant prompt sets.

use std::collections::BTreeSet;

use shiftdesk_config::model::ChatConfig;
use shiftdesk_core::{ChatVariant, ShiftdeskError};
use tracing::{info, warn};

use crate::template::PromptTemplate;

/// Shift-cancellation assistant prompt used by the `conversation` variant.
pub const CONVERSATION_TEMPLATE: &str = r#"You are a helpful assistant that helps determine if a worker wants to cancel a shift and what shift they want to cancel.

If the worker wants to cancel a shift, confirm with them and ask for the specific hours of the shift if not provided.

Examples:

- Worker: "I can't come to work today."
  Assistant: "I'm sorry to hear that. Do you need to cancel your shift? If so, could you please provide the hours of the shift you need to cancel?"

- Worker: "I need to cancel my shift from 9am to 5pm tomorrow."
  Assistant: "Understood, you need to cancel your shift from 9am to 5pm tomorrow. I'll process that for you."

Use the conversation history to maintain context. Be polite and helpful in your responses.

{history}
Worker: {input}
Assistant:"#;

/// Conversational prompt for the `shift_cancellation` variant; also sees the shift table.
pub const SHIFT_CANCELLATION_TEMPLATE: &str = r#"You are a helpful assistant that helps determine if a worker wants to cancel a shift and what shift they want to cancel.

If the worker wants to cancel a shift, confirm with them and ask for the specific hours of the shift if not provided. Use the shift records below to identify the shift; the worker's USERID is given in the conversation when known.

Shift records:
{database}

Examples:

- Worker: "I can't come to work today."
  Assistant: "I'm sorry to hear that. Do you need to cancel your shift? If so, could you please provide the hours of the shift you need to cancel?"

- Worker: "I need to cancel my shift from 9am to 5pm tomorrow."
  Assistant: "Understood, you need to cancel your shift from 9am to 5pm tomorrow. I'll process that for you."

Use the conversation history to maintain context. Be polite and helpful in your responses.

{history}
Worker: {input}
Assistant:"#;

/// Prompt asking for a single SQL statement reflecting the conversation.
pub const SQL_TEMPLATE: &str = r#"You translate shift-cancellation conversations into SQL.

The shifts table has the columns USERID, SHIFT, START_DATE, START_TIME and END_TIME. Its current rows are:
{database}

Conversation:
{conversation}

If the worker has clearly asked to cancel a specific shift listed above, reply with exactly one SQL statement against the shifts table that cancels it, and nothing else. If no shift should be cancelled yet, reply with the single word NONE."#;

/// Fixed shift table substituted into every `shift_cancellation` prompt.
pub const DATABASE_SNAPSHOT: &str = "\
USERID | SHIFT | START_DATE | START_TIME | END_TIME
001    | S-101 | 2024-07-01 | 09:00      | 17:00
001    | S-102 | 2024-07-02 | 09:00      | 17:00
002    | S-201 | 2024-07-01 | 13:00      | 21:00
003    | S-301 | 2024-07-03 | 06:00      | 14:00";

/// Slots each prompt is expected to declare.
pub fn conversation_slots(variant: ChatVariant) -> BTreeSet<&'static str> {
    match variant {
        ChatVariant::Conversation => BTreeSet::from(["history", "input"]),
        ChatVariant::ShiftCancellation => BTreeSet::from(["history", "input", "database"]),
    }
}

pub fn sql_slots() -> BTreeSet<&'static str> {
    BTreeSet::from(["conversation", "database"])
}

/// The parsed prompts one chat variant needs.
#[derive(Debug, Clone)]
pub struct PromptSet {
    pub variant: ChatVariant,
    pub conversation: PromptTemplate,
    /// Present only for [`ChatVariant::ShiftCancellation`].
    pub sql: Option<PromptTemplate>,
}

impl PromptSet {
    /// The built-in prompts for `variant`.
    pub fn builtin(variant: ChatVariant) -> Result<Self, ShiftdeskError> {
        let conversation = match variant {
            ChatVariant::Conversation => PromptTemplate::parse("conversation", CONVERSATION_TEMPLATE)?,
            ChatVariant::ShiftCancellation => {
                PromptTemplate::parse("conversation", SHIFT_CANCELLATION_TEMPLATE)?
            }
        };
        let sql = match variant {
            ChatVariant::Conversation => None,
            ChatVariant::ShiftCancellation => Some(PromptTemplate::parse("sql", SQL_TEMPLATE)?),
        };
        Ok(Self {
            variant,
            conversation,
            sql,
        })
    }

    /// Loads the prompts for the configured variant, applying file overrides.
    ///
    /// An override must declare exactly the slots its variant fills.
    pub async fn load(config: &ChatConfig) -> Result<Self, ShiftdeskError> {
        let mut set = Self::builtin(config.variant)?;

        if let Some(path) = &config.conversation_template_file {
            set.conversation = load_override(
                "conversation",
                path,
                &conversation_slots(config.variant),
            )
            .await?;
        }

        if let Some(path) = &config.sql_template_file {
            match config.variant {
                ChatVariant::ShiftCancellation => {
                    set.sql = Some(load_override("sql", path, &sql_slots()).await?);
                }
                ChatVariant::Conversation => {
                    warn!(
                        path = path.as_str(),
                        "chat.sql_template_file is ignored by the conversation variant"
                    );
                }
            }
        }

        Ok(set)
    }
}

async fn load_override(
    name: &str,
    path: &str,
    expected: &BTreeSet<&str>,
) -> Result<PromptTemplate, ShiftdeskError> {
    let source = tokio::fs::read_to_string(path).await.map_err(|e| {
        ShiftdeskError::Config(format!("failed to read {name} template `{path}`: {e}"))
    })?;

    let template = PromptTemplate::parse(name, &source)
        .map_err(|e| ShiftdeskError::Config(format!("{name} template `{path}`: {e}")))?;

    let declared = template.variables();
    if &declared != expected {
        return Err(ShiftdeskError::Config(format!(
            "{name} template `{path}` must use exactly the placeholders {{{}}}, found {{{}}}",
            expected.iter().copied().collect::<Vec<_>>().join("}, {"),
            declared.into_iter().collect::<Vec<_>>().join("}, {"),
        )));
    }

    info!(path, template = name, "loaded prompt template override");
    Ok(template)
}
