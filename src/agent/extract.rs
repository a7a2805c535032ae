//! JSON extraction from free-text provider responses.
//!
//! Providers often wrap JSON in prose or code fences. Each stage declares
//! an ordered list of [`ParseStrategy`] values; [`extract_json`] tries
//! them in turn and reports the last failure if none succeed.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::error::ProviderError;

static OBJECT_BLOCK: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").ok());
static ARRAY_BLOCK: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?s)\[.*\]").ok());

/// Result of one parse attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    /// The strategy produced a JSON value.
    Parsed(Value),
    /// The strategy did not apply or the candidate text was invalid.
    Failed(String),
}

/// One way of locating JSON inside a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStrategy {
    /// Parse the whole trimmed response.
    WholeResponse,
    /// Parse the outermost `{...}` block found by pattern match.
    ObjectBlock,
    /// Parse the text between the first `{` and the last `}`.
    BraceSpan,
    /// Parse the outermost `[...]` block found by pattern match.
    ArrayBlock,
}

/// Strategies for the claim analysis stage.
pub const ANALYSIS_STRATEGIES: &[ParseStrategy] =
    &[ParseStrategy::WholeResponse, ParseStrategy::ObjectBlock];

/// Strategies for scoring batches.
pub const SCORING_STRATEGIES: &[ParseStrategy] = &[
    ParseStrategy::WholeResponse,
    ParseStrategy::ObjectBlock,
    ParseStrategy::BraceSpan,
];

/// Strategies for claim-list splitting.
pub const CLAIM_LIST_STRATEGIES: &[ParseStrategy] =
    &[ParseStrategy::WholeResponse, ParseStrategy::ArrayBlock];

impl ParseStrategy {
    /// Short name for diagnostics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::WholeResponse => "whole response",
            Self::ObjectBlock => "object block",
            Self::BraceSpan => "brace span",
            Self::ArrayBlock => "array block",
        }
    }

    /// Applies this strategy to `response`.
    #[must_use]
    pub fn apply(self, response: &str) -> ParseOutcome {
        let text = response.trim();
        let candidate = match self {
            Self::WholeResponse => Some(strip_code_fence(text)),
            Self::ObjectBlock => find(&OBJECT_BLOCK, text),
            Self::ArrayBlock => find(&ARRAY_BLOCK, text),
            Self::BraceSpan => match (text.find('{'), text.rfind('}')) {
                (Some(start), Some(end)) if end > start => Some(&text[start..=end]),
                _ => None,
            },
        };
        let Some(candidate) = candidate else {
            return ParseOutcome::Failed(format!("{}: no candidate found", self.name()));
        };
        match serde_json::from_str(candidate) {
            Ok(value) => ParseOutcome::Parsed(value),
            Err(e) => ParseOutcome::Failed(format!("{}: {e}", self.name())),
        }
    }
}

fn find<'a>(pattern: &LazyLock<Option<Regex>>, text: &'a str) -> Option<&'a str> {
    pattern
        .as_ref()
        .and_then(|re| re.find(text))
        .map(|m| m.as_str())
}

fn strip_code_fence(text: &str) -> &str {
    if text.starts_with("```") {
        text.trim_start_matches("```json")
            .trim_start_matches("```")
            .trim_end_matches("```")
            .trim()
    } else {
        text
    }
}

/// Tries each strategy in order and returns the first parsed value.
///
/// # Errors
///
/// Returns [`ProviderError::Unparsable`] carrying the last failure reason
/// and a preview of the response.
pub fn extract_json(response: &str, strategies: &[ParseStrategy]) -> Result<Value, ProviderError> {
    if response.trim().is_empty() {
        return Err(ProviderError::unparsable("empty response", response));
    }
    let mut last_failure = String::from("no parse strategies configured");
    for strategy in strategies {
        match strategy.apply(response) {
            ParseOutcome::Parsed(value) => return Ok(value),
            ParseOutcome::Failed(reason) => last_failure = reason,
        }
    }
    Err(ProviderError::unparsable(last_failure, response))
}
