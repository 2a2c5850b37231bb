// SPDX-FileCopyrightText: 2026 Shiftdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The render -> complete -> parse pipeline.
//!
//! Each stage is independently substitutable: any [`PromptTemplate`], any
//! [`CompletionProvider`], any [`OutputParser`].

use std::sync::Arc;

use shiftdesk_core::{CompletionProvider, CompletionRequest, ShiftdeskError};
use tracing::debug;

use crate::parser::OutputParser;
use crate::template::{PromptTemplate, PromptVars};

/// Outcome of a chain run: the pipeline succeeded, the parser may still reject.
pub type ChainResult<P> =
    Result<Result<<P as OutputParser>::Output, <P as OutputParser>::Error>, ShiftdeskError>;

pub struct Chain<P: OutputParser> {
    template: PromptTemplate,
    provider: Arc<dyn CompletionProvider>,
    parser: P,
}

impl<P: OutputParser> Chain<P> {
    pub fn new(template: PromptTemplate, provider: Arc<dyn CompletionProvider>, parser: P) -> Self {
        Self {
            template,
            provider,
            parser,
        }
    }

    /// Renders the template, calls the provider once, and parses the text.
    ///
    /// Template and provider failures are returned as the outer error; the
    /// parser's verdict is the inner result.
    pub async fn invoke(&self, vars: &PromptVars) -> ChainResult<P> {
        let prompt = self.template.render(vars)?;
        debug!(
            template = self.template.name(),
            provider = self.provider.name(),
            prompt_len = prompt.len(),
            "invoking completion"
        );

        let response = self.provider.complete(CompletionRequest::new(prompt)).await?;
        debug!(
            template = self.template.name(),
            response_id = response.id.as_str(),
            prompt_tokens = response.usage.prompt_tokens,
            completion_tokens = response.usage.completion_tokens,
            "completion received"
        );

        Ok(self.parser.parse(response.text))
    }
}

#[cfg(test)]
mod tests {
    use shiftdesk_core::TemplateError;
    use shiftdesk_test_utils::{FailingProvider, MockProvider};

    use super::*;
    use crate::parser::{IdentityParser, NoStatementFound, SqlSniffer};

    fn template(source: &str) -> PromptTemplate {
        PromptTemplate::parse("test", source).unwrap()
    }

    #[tokio::test]
    async fn identity_chain_returns_completion() {
        let provider = Arc::new(MockProvider::with_responses(vec!["Hello!".into()]));
        let chain = Chain::new(template("Worker: {input}"), provider.clone(), IdentityParser);

        let Ok(text) = chain
            .invoke(&PromptVars::new().with("input", "hi"))
            .await
            .unwrap();
        assert_eq!(text, "Hello!");
        assert_eq!(provider.prompts().await, vec!["Worker: hi".to_string()]);
    }

    #[tokio::test]
    async fn sql_chain_reports_parse_rejection_separately() {
        let provider = Arc::new(MockProvider::with_responses(vec!["NONE".into()]));
        let chain = Chain::new(template("{conversation}"), provider, SqlSniffer);

        let outcome = chain
            .invoke(&PromptVars::new().with("conversation", "x"))
            .await
            .unwrap();
        assert_eq!(outcome, Err(NoStatementFound));
    }

    #[tokio::test]
    async fn missing_variable_skips_the_provider() {
        let provider = Arc::new(MockProvider::new());
        let chain = Chain::new(template("{history}{input}"), provider.clone(), IdentityParser);

        let err = chain
            .invoke(&PromptVars::new().with("input", "hi"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ShiftdeskError::Template(TemplateError::MissingVariable(ref v)) if v == "history"
        ));
        assert!(provider.prompts().await.is_empty());
    }

    #[tokio::test]
    async fn provider_failure_propagates() {
        let chain = Chain::new(
            template("{input}"),
            Arc::new(FailingProvider::new("connection refused")),
            IdentityParser,
        );

        let err = chain
            .invoke(&PromptVars::new().with("input", "hi"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("connection refused"));
    }
}
