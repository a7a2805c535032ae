//! `OpenAI`-compatible provider implementation using the `async-openai` crate.
//!
//! Serves both `OpenAI` and Gemini (through Google's `OpenAI`-compatible
//! endpoint) via the base URL resolved by [`AgentConfig`].

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::error::OpenAIError;
use async_openai::types::{
    ChatCompletionRequestAssistantMessage, ChatCompletionRequestAssistantMessageContent,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
    ChatCompletionRequestSystemMessageContent, ChatCompletionRequestUserMessage,
    ChatCompletionRequestUserMessageContent, CreateChatCompletionRequest, ResponseFormat,
};
use async_trait::async_trait;
use tracing::debug;

use crate::agent::config::AgentConfig;
use crate::agent::message::{ChatMessage, ChatRequest, ChatResponse, Role, TokenUsage};
use crate::agent::provider::LlmProvider;
use crate::error::ProviderError;

/// `OpenAI`-compatible reasoning provider.
pub struct OpenAiProvider {
    client: Client<OpenAIConfig>,
    name: &'static str,
}

impl OpenAiProvider {
    /// Creates a new provider from agent configuration.
    ///
    /// # Errors
    ///
    /// [`ProviderError::InvalidRequest`] if the HTTP client cannot be built.
    pub fn new(config: &AgentConfig) -> Result<Self, ProviderError> {
        let mut openai_config = OpenAIConfig::new().with_api_key(&config.api_key);

        if let Some(base_url) = config.effective_base_url() {
            openai_config = openai_config.with_api_base(base_url);
        }

        let name = if config.provider == "gemini" {
            "gemini"
        } else {
            "openai"
        };
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ProviderError::InvalidRequest {
                message: format!("cannot build HTTP client for {name}: {e}"),
            })?;

        Ok(Self {
            client: Client::with_config(openai_config).with_http_client(http),
            name,
        })
    }

    /// Converts our message type to the `OpenAI` SDK type.
    fn convert_message(msg: &ChatMessage) -> ChatCompletionRequestMessage {
        match msg.role {
            Role::System => {
                ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
                    content: ChatCompletionRequestSystemMessageContent::Text(msg.content.clone()),
                    name: None,
                })
            }
            Role::User => ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
                content: ChatCompletionRequestUserMessageContent::Text(msg.content.clone()),
                name: None,
            }),
            Role::Assistant => {
                #[allow(deprecated)]
                ChatCompletionRequestMessage::Assistant(ChatCompletionRequestAssistantMessage {
                    content: Some(ChatCompletionRequestAssistantMessageContent::Text(
                        msg.content.clone(),
                    )),
                    name: None,
                    tool_calls: None,
                    refusal: None,
                    audio: None,
                    function_call: None,
                })
            }
        }
    }

    /// Builds an `OpenAI` chat completion request from our generic request.
    fn build_request(request: &ChatRequest) -> CreateChatCompletionRequest {
        let messages: Vec<_> = request.messages.iter().map(Self::convert_message).collect();

        let response_format = if request.json_mode {
            Some(ResponseFormat::JsonObject)
        } else {
            None
        };

        CreateChatCompletionRequest {
            model: request.model.clone(),
            messages,
            temperature: request.temperature.filter(|&t| t != 0.0),
            max_completion_tokens: request.max_tokens,
            response_format,
            ..Default::default()
        }
    }

    fn map_error(&self, err: OpenAIError) -> ProviderError {
        match err {
            OpenAIError::InvalidArgument(message) => ProviderError::InvalidRequest { message },
            OpenAIError::Reqwest(e) => ProviderError::Transient {
                provider: self.name.to_string(),
                status: e.status().map(|s| s.as_u16()),
                message: e.to_string(),
            },
            other => ProviderError::Transient {
                provider: self.name.to_string(),
                message: other.to_string(),
                status: None,
            },
        }
    }
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("name", &self.name)
            .field("client", &"<async-openai::Client>")
            .finish()
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, ProviderError> {
        let openai_request = Self::build_request(request);

        let response = self
            .client
            .chat()
            .create(openai_request)
            .await
            .map_err(|e| self.map_error(e))?;

        let choice = response.choices.first();

        let content = choice
            .and_then(|c| c.message.content.as_ref())
            .cloned()
            .unwrap_or_default();

        let finish_reason = choice
            .and_then(|c| c.finish_reason.as_ref())
            .map(|r| format!("{r:?}").to_lowercase());

        let usage = response
            .usage
            .map_or_else(TokenUsage::default, |u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            });

        debug!(
            provider = self.name,
            total_tokens = usage.total_tokens,
            "chat completion received"
        );

        Ok(ChatResponse {
            content,
            usage,
            finish_reason,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::message;

    fn request(json_mode: bool, temperature: Option<f32>) -> ChatRequest {
        ChatRequest {
            model: "gemini-2.0-flash".to_string(),
            messages: vec![
                message::system_message("sys"),
                message::user_message("first"),
                message::assistant_message("reply"),
                message::user_message("second"),
            ],
            temperature,
            max_tokens: Some(100),
            json_mode,
        }
    }

    #[test]
    fn test_convert_roles() {
        let req = request(false, None);
        let converted: Vec<_> = req
            .messages
            .iter()
            .map(OpenAiProvider::convert_message)
            .collect();
        assert!(matches!(converted[0], ChatCompletionRequestMessage::System(_)));
        assert!(matches!(converted[1], ChatCompletionRequestMessage::User(_)));
        assert!(matches!(
            converted[2],
            ChatCompletionRequestMessage::Assistant(_)
        ));
    }

    #[test]
    fn test_build_request_json_mode() {
        let built = OpenAiProvider::build_request(&request(true, Some(0.0)));
        assert!(built.response_format.is_some());
        assert!(built.temperature.is_none());
        assert_eq!(built.messages.len(), 4);
        assert_eq!(built.max_completion_tokens, Some(100));
    }

    #[test]
    fn test_build_request_keeps_nonzero_temperature() {
        let built = OpenAiProvider::build_request(&request(false, Some(0.4)));
        assert!(built.response_format.is_none());
        assert_eq!(built.temperature, Some(0.4));
    }

    #[test]
    fn test_name_follows_provider() {
        let config = AgentConfig::builder()
            .api_key("k")
            .build()
            .unwrap_or_else(|_| unreachable!());
        let provider = OpenAiProvider::new(&config).unwrap_or_else(|_| unreachable!());
        assert_eq!(provider.name(), "gemini");
    }
}
