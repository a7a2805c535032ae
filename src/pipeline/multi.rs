//! Multi-claim jobs, checkpointed per claim.

use serde_json::Value;
use tracing::{debug, info};

use super::{ClaimResult, JobOptions, NumberedClaimResult, Pipeline};
use crate::artifact::multiple_name;
use crate::core::{Job, JobPatch, derive_job_id};
use crate::error::PipelineError;

/// Progress of a multi-claim job.
#[derive(Debug, Clone, PartialEq)]
pub enum MultiState {
    /// Nothing stored yet.
    Fresh,
    /// Some claims are done.
    InProgress {
        /// Stored results, ordered by claim number.
        results: Vec<NumberedClaimResult>,
        /// Processed claim indices (0-based, as strings) whose result is
        /// stored.
        processed: Vec<String>,
    },
    /// Every claim is done.
    Complete(Vec<NumberedClaimResult>),
}

impl MultiState {
    /// Recovers the state a stored job stopped in.
    ///
    /// A processed marker without a stored result is dropped, so that claim
    /// is analyzed again.
    ///
    /// # Errors
    ///
    /// [`PipelineError::InvalidCheckpoint`] if the payload is not a list of
    /// claim results.
    pub fn from_job(job: &Job) -> Result<Self, PipelineError> {
        let results: Vec<NumberedClaimResult> = if job.data.is_null() {
            Vec::new()
        } else {
            serde_json::from_value(job.data.clone()).map_err(|e| {
                PipelineError::InvalidCheckpoint {
                    id: job.id.clone(),
                    message: e.to_string(),
                }
            })?
        };

        Ok(if job.completed {
            Self::Complete(results)
        } else {
            let processed = job
                .processed
                .iter()
                .filter(|marker| {
                    marker.parse::<usize>().is_ok_and(|index| {
                        results.iter().any(|r| r.claim_number == index + 1)
                    })
                })
                .cloned()
                .collect();
            Self::InProgress { results, processed }
        })
    }
}

/// Inserts `entry`, replacing any result with the same claim number.
fn upsert(results: &mut Vec<NumberedClaimResult>, entry: NumberedClaimResult) {
    match results.binary_search_by_key(&entry.claim_number, |r| r.claim_number) {
        Ok(pos) => results[pos] = entry,
        Err(pos) => results.insert(pos, entry),
    }
}

impl Pipeline {
    /// Analyzes every claim of a claims document.
    ///
    /// The document is split into claims by the reasoning provider. After
    /// each claim the accumulated results are stored and the claim's index
    /// is marked processed; a resumed job re-splits the document and skips
    /// processed indices. The job identity defaults to `source_name` (the
    /// document's file name).
    ///
    /// # Errors
    ///
    /// [`PipelineError::Input`] if the document holds no claims, or the
    /// first stage failure.
    pub async fn analyze_multiple(
        &self,
        document: &str,
        source_name: &str,
        options: &JobOptions,
    ) -> Result<Vec<NumberedClaimResult>, PipelineError> {
        let explicit = options.checkpoint.as_deref().or(Some(source_name));
        let job_id = derive_job_id(explicit, document);
        let artifact = multiple_name(&job_id);

        let state = match self.store().find(&job_id)? {
            Some(job) if options.resume => MultiState::from_job(&job)?,
            _ => MultiState::Fresh,
        };

        let (mut results, processed) = match state {
            MultiState::Complete(results) => {
                info!(job_id = %job_id, claims = results.len(), "job already complete");
                self.artifacts.write(&artifact, &results)?;
                return Ok(results);
            }
            MultiState::InProgress { results, processed } => {
                info!(
                    job_id = %job_id,
                    done = processed.len(),
                    "resuming multi-claim job"
                );
                (results, processed)
            }
            MultiState::Fresh => {
                self.store().put(&Job::new(&job_id, Value::Array(Vec::new())))?;
                (Vec::new(), Vec::new())
            }
        };

        let claims = self.splitter.split(self.provider.as_ref(), document).await?;
        if claims.is_empty() {
            return Err(PipelineError::Input {
                message: "no claims found in the document".to_string(),
            });
        }
        info!(job_id = %job_id, claims = claims.len(), "claims to analyze");

        for (index, claim) in claims.iter().enumerate() {
            let marker = index.to_string();
            if processed.contains(&marker) {
                debug!(job_id = %job_id, claim = index + 1, "claim already processed");
                continue;
            }
            info!(job_id = %job_id, claim = index + 1, of = claims.len(), "analyzing claim");

            let result = self.process_claim(claim, options).await?;
            upsert(
                &mut results,
                NumberedClaimResult {
                    claim_number: index + 1,
                    result,
                },
            );

            let data = serde_json::to_value(&results)?;
            self.store().patch_field(&job_id, JobPatch::Data(data))?;
            self.store().append_processed(&job_id, &marker);
        }

        self.store().mark_completed(&job_id);
        self.artifacts.write(&artifact, &results)?;
        Ok(results)
    }

    /// Runs analysis and, if requested, search and scoring for one claim.
    ///
    /// Claims taken from a document are treated as independent.
    async fn process_claim(
        &self,
        claim_text: &str,
        options: &JobOptions,
    ) -> Result<ClaimResult, PipelineError> {
        let (analysis, query) = self
            .analyze_claim(claim_text, true, options.date_range.as_deref())
            .await?;
        let mut result = ClaimResult::analyzed(analysis, query);
        if options.execute {
            let (records, counts) = self.search_records(&result.query, options.source).await;
            let scored = self
                .score_records(claim_text, records, options.risk_threshold)
                .await?;
            result.search_results = Some(scored.records);
            result.risk_summary = Some(scored.summary);
            result.sources = Some(counts);
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(n: usize, claim: &str) -> NumberedClaimResult {
        let mut entry = NumberedClaimResult {
            claim_number: n,
            ..NumberedClaimResult::default()
        };
        entry.result.analysis.claim_text = claim.to_string();
        entry
    }

    #[test]
    fn test_upsert_orders_and_replaces() {
        let mut results = Vec::new();
        upsert(&mut results, entry(3, "c"));
        upsert(&mut results, entry(1, "a"));
        upsert(&mut results, entry(3, "c2"));
        let numbers: Vec<usize> = results.iter().map(|r| r.claim_number).collect();
        assert_eq!(numbers, vec![1, 3]);
        assert_eq!(results[1].result.analysis.claim_text, "c2");
    }

    #[test]
    fn test_state_from_in_progress_job() {
        let mut job = Job::new(
            "claims.txt",
            serde_json::to_value(vec![entry(1, "a")]).unwrap_or_default(),
        );
        job.mark_processed("0");
        let state = MultiState::from_job(&job).unwrap_or_else(|_| unreachable!());
        match state {
            MultiState::InProgress { results, processed } => {
                assert_eq!(results.len(), 1);
                assert_eq!(processed, vec!["0".to_string()]);
            }
            other => unreachable!("unexpected state {other:?}"),
        }
    }

    #[test]
    fn test_marker_without_stored_result_is_dropped() {
        let mut job = Job::new(
            "claims.txt",
            serde_json::to_value(vec![entry(1, "a")]).unwrap_or_default(),
        );
        job.mark_processed("0");
        job.mark_processed("1");
        let state = MultiState::from_job(&job).unwrap_or_else(|_| unreachable!());
        assert!(matches!(
            state,
            MultiState::InProgress { ref processed, .. } if processed == &["0".to_string()]
        ));
    }

    #[test]
    fn test_state_from_single_claim_payload_is_rejected() {
        let job = Job::new("claims.txt", json!({"analysis": {}}));
        assert!(matches!(
            MultiState::from_job(&job),
            Err(PipelineError::InvalidCheckpoint { .. })
        ));
    }

    #[test]
    fn test_numbered_result_is_flat() {
        let value = serde_json::to_value(entry(2, "x")).unwrap_or_default();
        assert_eq!(value["claim_number"], 2);
        assert_eq!(value["analysis"]["claim_text"], "x");
    }
}
