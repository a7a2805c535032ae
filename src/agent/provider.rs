//! Pluggable reasoning-provider trait.
//!
//! Implementations translate provider-agnostic [`ChatRequest`]/[`ChatResponse`]
//! into provider-specific SDK calls. Retry policy lives above this layer in
//! [`crate::retry`], so implementations make exactly one attempt per call.

use async_trait::async_trait;

use super::message::{ChatRequest, ChatResponse};
use crate::error::ProviderError;

/// Trait for reasoning-provider backends.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name (e.g., `"openai"`, `"gemini"`).
    fn name(&self) -> &'static str;

    /// Executes a chat completion request.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Transient`] on API or network failures.
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, ProviderError>;
}
