//! Splits a multi-claim document into individual claims.

use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

use super::config::AgentConfig;
use super::extract::{CLAIM_LIST_STRATEGIES, extract_json};
use super::message::ConversationContext;
use super::prompt::{SPLITTER_SYSTEM_PROMPT, build_split_prompt};
use super::provider::LlmProvider;
use super::traits::{Agent, execute_and_parse};
use crate::error::ProviderError;
use crate::retry::RetryPolicy;

/// Agent that asks the reasoning provider to separate claims.
#[derive(Debug, Clone)]
pub struct ClaimSplitter {
    model: String,
    max_tokens: u32,
    retry: RetryPolicy,
}

impl ClaimSplitter {
    /// Creates a splitter from agent configuration.
    #[must_use]
    pub fn new(config: &AgentConfig) -> Self {
        Self {
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            retry: config.retry,
        }
    }

    /// Returns the claims contained in `document`, in document order.
    ///
    /// # Errors
    ///
    /// [`ProviderError::Unparsable`] when no JSON array is found and
    /// [`ProviderError::Malformed`] when the JSON is not an array.
    pub async fn split(
        &self,
        provider: &dyn LlmProvider,
        document: &str,
    ) -> Result<Vec<String>, ProviderError> {
        let prompt = build_split_prompt(document);
        let (claims, _raw) = execute_and_parse(
            self,
            provider,
            &self.retry,
            &ConversationContext::new(),
            &prompt,
            Self::parse_claims,
        )
        .await?;
        info!(claims = claims.len(), "claims file split");
        Ok(claims)
    }

    fn parse_claims(content: &str) -> Result<Vec<String>, ProviderError> {
        match extract_json(content, CLAIM_LIST_STRATEGIES)? {
            Value::Array(items) => Ok(items
                .into_iter()
                .filter_map(|v| match v {
                    Value::String(s) => Some(s.trim().to_string()),
                    _ => None,
                })
                .filter(|s| !s.is_empty())
                .collect()),
            _ => Err(ProviderError::Malformed {
                message: "claim list is not a JSON array".to_string(),
            }),
        }
    }
}

#[async_trait]
impl Agent for ClaimSplitter {
    fn name(&self) -> &'static str {
        "claim-splitter"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn system_prompt(&self) -> &str {
        SPLITTER_SYSTEM_PROMPT
    }

    fn max_tokens(&self) -> u32 {
        self.max_tokens
    }
}
