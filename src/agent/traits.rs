//! Agent trait definition.
//!
//! Each pipeline stage that talks to the reasoning provider (analysis,
//! scoring, claim splitting) is an [`Agent`] with a fixed system prompt and
//! model configuration.

use async_trait::async_trait;

use super::message::{ChatRequest, ConversationContext, TokenUsage, system_message, user_message};
use super::provider::LlmProvider;
use crate::error::ProviderError;
use crate::retry::{RetryPolicy, retry};

/// Response from an agent execution.
#[derive(Debug, Clone)]
pub struct AgentResponse {
    /// The agent's text output.
    pub content: String,
    /// Token usage for this call.
    pub usage: TokenUsage,
    /// Why the model stopped generating (e.g. `"stop"`, `"length"`).
    pub finish_reason: Option<String>,
}

/// Trait implemented by all agents in the system.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Agent name for logging and identification.
    fn name(&self) -> &'static str;

    /// Model identifier to use for this agent.
    fn model(&self) -> &str;

    /// System prompt that defines the agent's role and behavior.
    fn system_prompt(&self) -> &str;

    /// Whether to request JSON-formatted output.
    fn json_mode(&self) -> bool {
        false
    }

    /// Sampling temperature (0.0 = deterministic, higher = more creative).
    fn temperature(&self) -> f32 {
        0.0
    }

    /// Maximum tokens for the response.
    fn max_tokens(&self) -> u32 {
        2048
    }

    /// Executes the agent, replaying `history` before the new prompt.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] on API failures.
    async fn converse(
        &self,
        provider: &dyn LlmProvider,
        history: &ConversationContext,
        user_msg: &str,
    ) -> Result<AgentResponse, ProviderError> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(system_message(self.system_prompt()));
        messages.extend(history.turns().iter().cloned());
        messages.push(user_message(user_msg));

        let request = ChatRequest {
            model: self.model().to_string(),
            messages,
            temperature: Some(self.temperature()),
            max_tokens: Some(self.max_tokens()),
            json_mode: self.json_mode(),
        };

        let response = provider.chat(&request).await?;

        Ok(AgentResponse {
            content: response.content,
            usage: response.usage,
            finish_reason: response.finish_reason,
        })
    }
}

/// Calls `agent` and parses its output, retrying both under `policy`.
///
/// A response that cannot be parsed counts as a failed attempt, the same
/// as a transport error. Returns the parsed value and the raw response text.
///
/// # Errors
///
/// Returns the last [`ProviderError`] once the policy is exhausted, or the
/// first non-retryable one.
pub async fn execute_and_parse<T, P>(
    agent: &dyn Agent,
    provider: &dyn LlmProvider,
    policy: &RetryPolicy,
    history: &ConversationContext,
    prompt: &str,
    parse: P,
) -> Result<(T, String), ProviderError>
where
    P: Fn(&str) -> Result<T, ProviderError>,
{
    let parse = &parse;
    retry(policy, agent.name(), move || async move {
        let response = agent.converse(provider, history, prompt).await?;
        let parsed = parse(&response.content)?;
        Ok((parsed, response.content))
    })
    .await
}
