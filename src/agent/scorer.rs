//! Batched, context-preserving conflict-risk scoring.
//!
//! Records are scored in fixed-size batches within one conversation: the
//! first batch carries the claim and the scoring rubric, and every later
//! batch replays the accumulated [`ConversationContext`] so scores stay
//! consistent across the whole record set.
//!
//! A batch that still fails after its retry policy aborts the pass. Partial
//! conversation state is not checkpointed, so a rerun starts from the first
//! batch.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info};

use super::config::AgentConfig;
use super::extract::{SCORING_STRATEGIES, extract_json};
use super::message::ConversationContext;
use super::prompt::{
    SCORING_SYSTEM_PROMPT, ScoringItem, build_first_batch_prompt, build_next_batch_prompt,
};
use super::provider::LlmProvider;
use super::traits::{Agent, execute_and_parse};
use crate::core::Record;
use crate::error::ProviderError;
use crate::retry::RetryPolicy;

/// Lowest valid risk score.
pub const MIN_RISK_SCORE: u8 = 1;
/// Highest valid risk score.
pub const MAX_RISK_SCORE: u8 = 10;

/// One parsed entry of a `patentAssessments` array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assessment {
    /// Position of the assessed record in the full input list.
    pub index: usize,
    /// Risk score (1-10).
    pub risk_score: u8,
    /// Short justification.
    pub explanation: String,
}

/// Agent that assigns conflict-risk scores to records.
#[derive(Debug, Clone)]
pub struct RiskScorer {
    model: String,
    max_tokens: u32,
    batch_size: usize,
    retry: RetryPolicy,
}

impl RiskScorer {
    /// Creates a scorer from agent configuration.
    #[must_use]
    pub fn new(config: &AgentConfig) -> Self {
        Self {
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            batch_size: config.batch_size.max(1),
            retry: config.retry,
        }
    }

    /// Number of provider calls needed for `records` records.
    #[must_use]
    pub const fn batch_count(&self, records: usize) -> usize {
        records.div_ceil(self.batch_size)
    }

    /// Scores `records` against `claim_text`.
    ///
    /// Returns the records in their original order, each carrying the
    /// score whose `index` matched its position. Records the provider did
    /// not assess stay unscored. An empty list is returned unchanged
    /// without a provider call.
    ///
    /// # Errors
    ///
    /// Returns the failing batch's [`ProviderError`]; no partial result is
    /// returned.
    pub async fn score(
        &self,
        provider: &dyn LlmProvider,
        claim_text: &str,
        mut records: Vec<Record>,
    ) -> Result<Vec<Record>, ProviderError> {
        if records.is_empty() {
            debug!("no records to score");
            return Ok(records);
        }

        let total_batches = self.batch_count(records.len());
        info!(
            records = records.len(),
            batches = total_batches,
            "scoring records"
        );

        let items: Vec<ScoringItem<'_>> = records
            .iter()
            .enumerate()
            .map(|(index, r)| ScoringItem {
                index,
                patent_number: &r.patent_number,
                title: &r.title,
                abstract_text: &r.abstract_text,
            })
            .collect();

        let mut context = ConversationContext::new();
        let mut assessments = Vec::with_capacity(items.len());

        for (batch_no, batch) in items.chunks(self.batch_size).enumerate() {
            let start = batch_no * self.batch_size;
            let end = start + batch.len();
            let prompt = if batch_no == 0 {
                build_first_batch_prompt(claim_text, batch)
            } else {
                build_next_batch_prompt(batch, start, end)
            };

            debug!(
                batch = batch_no + 1,
                total_batches,
                start,
                end,
                history = context.len(),
                "scoring batch"
            );

            let (parsed, raw) = execute_and_parse(
                self,
                provider,
                &self.retry,
                &context,
                &prompt,
                Self::parse_assessments,
            )
            .await?;

            context = context.with_exchange(&prompt, &raw);
            assessments.extend(parsed);
        }

        apply_assessments(&mut records, assessments);
        Ok(records)
    }

    /// Parses one batch response.
    ///
    /// # Errors
    ///
    /// [`ProviderError::Unparsable`] if no JSON object is found;
    /// [`ProviderError::Malformed`] if `patentAssessments` is not an array.
    pub fn parse_assessments(content: &str) -> Result<Vec<Assessment>, ProviderError> {
        let value = extract_json(content, SCORING_STRATEGIES)?;
        let entries = value
            .get("patentAssessments")
            .and_then(Value::as_array)
            .ok_or_else(|| ProviderError::Malformed {
                message: "response has no patentAssessments array".to_string(),
            })?;

        let assessments = entries
            .iter()
            .filter_map(|entry| {
                let parsed = parse_entry(entry);
                if parsed.is_none() {
                    debug!(%entry, "skipping unusable assessment");
                }
                parsed
            })
            .collect();
        Ok(assessments)
    }
}

fn parse_entry(entry: &Value) -> Option<Assessment> {
    let index = lenient_u64(entry.get("index")?)?;
    let score = lenient_u64(entry.get("riskScore")?)?;
    let risk_score = u8::try_from(score)
        .ok()
        .filter(|s| (MIN_RISK_SCORE..=MAX_RISK_SCORE).contains(s))?;
    Some(Assessment {
        index: usize::try_from(index).ok()?,
        risk_score,
        explanation: entry
            .get("explanation")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
    })
}

/// Accepts integers, integral floats, and numeric strings.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn lenient_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f <= f64::from(u32::MAX))
                .map(|f| f as u64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn apply_assessments(records: &mut [Record], assessments: Vec<Assessment>) {
    let len = records.len();
    for assessment in assessments {
        if let Some(record) = records.get_mut(assessment.index) {
            record.risk_score = Some(assessment.risk_score);
            record.risk_explanation = Some(assessment.explanation);
        } else {
            debug!(
                index = assessment.index,
                records = len,
                "ignoring assessment with out-of-range index"
            );
        }
    }
}

#[async_trait]
impl Agent for RiskScorer {
    fn name(&self) -> &'static str {
        "scoring"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn system_prompt(&self) -> &str {
        SCORING_SYSTEM_PROMPT
    }

    fn max_tokens(&self) -> u32 {
        self.max_tokens
    }
}
