//! Provider-agnostic message types for reasoning-provider calls.
//!
//! These types decouple prompt construction from any specific SDK, so the
//! same stages run against `OpenAI`, Gemini's compatible endpoint, or a
//! scripted test double.

use serde::{Deserialize, Serialize};

/// Role of a chat message participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions.
    System,
    /// Prompt sent by the pipeline.
    User,
    /// Provider response.
    Assistant,
}

/// A single chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender.
    pub role: Role,
    /// Message content.
    pub content: String,
}

/// A chat completion request (provider-agnostic).
#[derive(Debug, Clone)]
pub struct ChatRequest {
    /// Model identifier (e.g., "gemini-2.0-flash").
    pub model: String,
    /// Ordered conversation messages.
    pub messages: Vec<ChatMessage>,
    /// Sampling temperature (0.0–2.0).
    pub temperature: Option<f32>,
    /// Maximum tokens to generate.
    pub max_tokens: Option<u32>,
    /// Request JSON-formatted output.
    pub json_mode: bool,
}

impl ChatRequest {
    /// The final user prompt of the request, if any.
    #[must_use]
    pub fn prompt(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
    }

    /// Number of user/assistant turns preceding the final prompt.
    #[must_use]
    pub fn history_len(&self) -> usize {
        self.messages
            .iter()
            .filter(|m| m.role != Role::System)
            .count()
            .saturating_sub(1)
    }
}

/// Token usage statistics from a completion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Tokens consumed by the prompt.
    pub prompt_tokens: u32,
    /// Tokens generated in the completion.
    pub completion_tokens: u32,
    /// Total tokens used.
    pub total_tokens: u32,
}

/// A chat completion response (provider-agnostic).
#[derive(Debug, Clone, Default)]
pub struct ChatResponse {
    /// Generated text content.
    pub content: String,
    /// Token usage statistics.
    pub usage: TokenUsage,
    /// Finish reason from the model (e.g., `"stop"`, `"length"`).
    pub finish_reason: Option<String>,
}

/// Creates a system message.
#[must_use]
pub fn system_message(content: &str) -> ChatMessage {
    ChatMessage {
        role: Role::System,
        content: content.to_string(),
    }
}

/// Creates a user message.
#[must_use]
pub fn user_message(content: &str) -> ChatMessage {
    ChatMessage {
        role: Role::User,
        content: content.to_string(),
    }
}

/// Creates an assistant message.
#[must_use]
pub fn assistant_message(content: &str) -> ChatMessage {
    ChatMessage {
        role: Role::Assistant,
        content: content.to_string(),
    }
}

/// Ordered prompt/response turns of one scoring pass.
///
/// Values are immutable: [`ConversationContext::with_exchange`] returns a
/// new context with one more exchange appended. A context belongs to a
/// single pass over a single record set and is never shared between jobs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationContext {
    turns: Vec<ChatMessage>,
}

impl ConversationContext {
    /// An empty context.
    #[must_use]
    pub const fn new() -> Self {
        Self { turns: Vec::new() }
    }

    /// Returns this context extended by a prompt and its response.
    #[must_use]
    pub fn with_exchange(mut self, prompt: &str, response: &str) -> Self {
        self.turns.push(user_message(prompt));
        self.turns.push(assistant_message(response));
        self
    }

    /// Turns in order.
    #[must_use]
    pub fn turns(&self) -> &[ChatMessage] {
        &self.turns
    }

    /// Number of turns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Returns `true` if no exchange has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_message() {
        let msg = system_message("You are a patent analyst.");
        assert_eq!(msg.role, Role::System);
        assert_eq!(msg.content, "You are a patent analyst.");
    }

    #[test]
    fn test_role_serialization() {
        let json = serde_json::to_string(&Role::Assistant).unwrap_or_default();
        assert_eq!(json, "\"assistant\"");
    }

    #[test]
    fn test_context_appends_in_order() {
        let ctx = ConversationContext::new()
            .with_exchange("p1", "r1")
            .with_exchange("p2", "r2");
        let roles: Vec<Role> = ctx.turns().iter().map(|t| t.role).collect();
        assert_eq!(
            roles,
            vec![Role::User, Role::Assistant, Role::User, Role::Assistant]
        );
        assert_eq!(ctx.turns()[2].content, "p2");
        assert_eq!(ctx.len(), 4);
    }

    #[test]
    fn test_context_extension_leaves_original() {
        let base = ConversationContext::new().with_exchange("p1", "r1");
        let extended = base.clone().with_exchange("p2", "r2");
        assert_eq!(base.len(), 2);
        assert_eq!(extended.len(), 4);
    }

    #[test]
    fn test_request_prompt_and_history() {
        let request = ChatRequest {
            model: "m".to_string(),
            messages: vec![
                system_message("sys"),
                user_message("first"),
                assistant_message("answer"),
                user_message("second"),
            ],
            temperature: None,
            max_tokens: None,
            json_mode: false,
        };
        assert_eq!(request.prompt(), Some("second"));
        assert_eq!(request.history_len(), 2);
    }
}
