//! Reasoning-provider configuration with builder pattern and environment
//! variable support.
//!
//! Configuration is resolved in order: explicit values → environment variables → defaults.

use std::time::Duration;

use crate::error::ProviderError;
use crate::retry::RetryPolicy;

/// Default provider name.
pub const DEFAULT_PROVIDER: &str = "gemini";
/// Default model for all reasoning stages.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
/// Default number of records per scoring batch.
pub const DEFAULT_BATCH_SIZE: usize = 20;
/// Default max tokens for a single response. Scoring a full batch with
/// explanations needs several thousand tokens.
const DEFAULT_MAX_TOKENS: u32 = 8192;
/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// `OpenAI`-compatible endpoint for Gemini models.
pub const GEMINI_OPENAI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";

/// Configuration for the reasoning provider and the stages that call it.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Provider name (`"gemini"` or `"openai"`).
    pub provider: String,
    /// API key for the provider.
    pub api_key: String,
    /// Optional base URL override (for proxies or compatible APIs).
    pub base_url: Option<String>,
    /// Model used by every reasoning stage.
    pub model: String,
    /// Maximum tokens per response.
    pub max_tokens: u32,
    /// Records per scoring batch.
    pub batch_size: usize,
    /// Request timeout.
    pub timeout: Duration,
    /// Retry policy for reasoning calls.
    pub retry: RetryPolicy,
}

impl AgentConfig {
    /// Creates a new builder for `AgentConfig`.
    #[must_use]
    pub fn builder() -> AgentConfigBuilder {
        AgentConfigBuilder::default()
    }

    /// Creates configuration from environment variables with defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::ApiKeyMissing`] if no API key is found.
    pub fn from_env() -> Result<Self, ProviderError> {
        Self::builder().from_env().build()
    }

    /// Base URL the client should target: the explicit override, or the
    /// provider's compatible endpoint.
    #[must_use]
    pub fn effective_base_url(&self) -> Option<&str> {
        self.base_url.as_deref().or_else(|| {
            (self.provider == "gemini").then_some(GEMINI_OPENAI_BASE_URL)
        })
    }
}

/// Builder for [`AgentConfig`].
#[derive(Debug, Clone, Default)]
pub struct AgentConfigBuilder {
    provider: Option<String>,
    api_key: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
    max_tokens: Option<u32>,
    batch_size: Option<usize>,
    timeout: Option<Duration>,
    retry: Option<RetryPolicy>,
}

impl AgentConfigBuilder {
    /// Populates unset fields from environment variables.
    #[must_use]
    pub fn from_env(mut self) -> Self {
        if self.provider.is_none() {
            self.provider = std::env::var("CLAIMCHECK_PROVIDER").ok();
        }
        if self.api_key.is_none() {
            self.api_key = std::env::var("CLAIMCHECK_API_KEY")
                .or_else(|_| std::env::var("GOOGLE_GEMINI_API_KEY"))
                .or_else(|_| std::env::var("OPENAI_API_KEY"))
                .ok();
        }
        if self.base_url.is_none() {
            self.base_url = std::env::var("CLAIMCHECK_BASE_URL").ok();
        }
        if self.model.is_none() {
            self.model = std::env::var("CLAIMCHECK_MODEL").ok();
        }
        if self.batch_size.is_none() {
            self.batch_size = std::env::var("CLAIMCHECK_BATCH_SIZE")
                .ok()
                .and_then(|v| v.parse().ok());
        }
        if self.retry.is_none() {
            self.retry = Some(RetryPolicy::reasoning_from_env());
        }
        self
    }

    /// Sets the provider name.
    #[must_use]
    pub fn provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Sets the API key.
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the base URL override.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the model.
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Sets the response max tokens.
    #[must_use]
    pub const fn max_tokens(mut self, n: u32) -> Self {
        self.max_tokens = Some(n);
        self
    }

    /// Sets the scoring batch size.
    #[must_use]
    pub const fn batch_size(mut self, n: usize) -> Self {
        self.batch_size = Some(n);
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Sets the retry policy for reasoning calls.
    #[must_use]
    pub const fn retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = Some(policy);
        self
    }

    /// Builds the [`AgentConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::ApiKeyMissing`] if no API key was set.
    pub fn build(self) -> Result<AgentConfig, ProviderError> {
        let provider = self
            .provider
            .unwrap_or_else(|| DEFAULT_PROVIDER.to_string());
        let api_key = self
            .api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ProviderError::ApiKeyMissing {
                provider: provider.clone(),
                env_var: "CLAIMCHECK_API_KEY".to_string(),
            })?;

        Ok(AgentConfig {
            provider,
            api_key,
            base_url: self.base_url,
            model: self.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            max_tokens: self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            batch_size: self
                .batch_size
                .filter(|&n| n > 0)
                .unwrap_or(DEFAULT_BATCH_SIZE),
            timeout: self
                .timeout
                .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            retry: self.retry.unwrap_or_default(),
        })
    }
}
