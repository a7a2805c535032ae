//! Claim analysis agent.
//!
//! Turns raw claim text into a [`ClaimAnalysis`] with one reasoning call.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info};

use super::config::AgentConfig;
use super::extract::{ANALYSIS_STRATEGIES, extract_json};
use super::message::ConversationContext;
use super::prompt::{ANALYSIS_SYSTEM_PROMPT, build_analysis_prompt};
use super::provider::LlmProvider;
use super::traits::{Agent, execute_and_parse};
use crate::core::ClaimAnalysis;
use crate::error::ProviderError;
use crate::retry::RetryPolicy;

/// Agent that extracts keywords, concepts, and classification codes.
#[derive(Debug, Clone)]
pub struct ClaimAnalyzer {
    model: String,
    max_tokens: u32,
    retry: RetryPolicy,
}

/// Fields extracted from an analysis response.
#[derive(Debug, Default, PartialEq, Eq)]
struct AnalysisFields {
    keywords: Vec<String>,
    concepts: Vec<String>,
    cpc_classes: Vec<String>,
    ipc_classes: Vec<String>,
}

impl ClaimAnalyzer {
    /// Creates an analyzer from agent configuration.
    #[must_use]
    pub fn new(config: &AgentConfig) -> Self {
        Self {
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            retry: config.retry,
        }
    }

    /// Analyzes one claim.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Unparsable`] if no JSON object could be
    /// extracted once the retry policy is exhausted, or the provider's
    /// transport error.
    pub async fn analyze(
        &self,
        provider: &dyn LlmProvider,
        claim_text: &str,
        independent: bool,
    ) -> Result<ClaimAnalysis, ProviderError> {
        let prompt = build_analysis_prompt(claim_text, independent);
        let (fields, raw) = execute_and_parse(
            self,
            provider,
            &self.retry,
            &ConversationContext::new(),
            &prompt,
            Self::parse_analysis,
        )
        .await?;

        info!(
            keywords = fields.keywords.len(),
            concepts = fields.concepts.len(),
            cpc = fields.cpc_classes.len(),
            ipc = fields.ipc_classes.len(),
            "claim analyzed"
        );

        Ok(ClaimAnalysis {
            claim_text: claim_text.to_string(),
            independent,
            keywords: fields.keywords,
            concepts: fields.concepts,
            cpc_classes: fields.cpc_classes,
            ipc_classes: fields.ipc_classes,
            raw_response: raw,
        })
    }

    /// Parses the provider response. Missing or non-array fields are empty.
    fn parse_analysis(content: &str) -> Result<AnalysisFields, ProviderError> {
        let value = extract_json(content, ANALYSIS_STRATEGIES)?;
        let Value::Object(map) = value else {
            return Err(ProviderError::Malformed {
                message: "analysis response is not a JSON object".to_string(),
            });
        };
        let list = |key: &str| -> Vec<String> {
            map.get(key)
                .and_then(Value::as_array)
                .map(|items| {
                    items
                        .iter()
                        .filter_map(Value::as_str)
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(ToString::to_string)
                        .collect()
                })
                .unwrap_or_default()
        };
        let fields = AnalysisFields {
            keywords: list("keywords"),
            concepts: list("concepts"),
            cpc_classes: list("cpcClasses"),
            ipc_classes: list("ipcClasses"),
        };
        debug!(?fields, "parsed analysis response");
        Ok(fields)
    }
}

#[async_trait]
impl Agent for ClaimAnalyzer {
    fn name(&self) -> &'static str {
        "analysis"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn system_prompt(&self) -> &str {
        ANALYSIS_SYSTEM_PROMPT
    }

    fn max_tokens(&self) -> u32 {
        self.max_tokens
    }
}
