//! Single-claim job state machine.

use tracing::{debug, info};

use super::{ClaimResult, JobOptions, Pipeline};
use crate::artifact::single_name;
use crate::core::{ClaimAnalysis, Job, Record, SearchQuery, SourceCounts, derive_job_id};
use crate::error::PipelineError;

/// Progress of a single-claim job.
///
/// `Fresh → Analyzed → Searched → Scored → Complete`. The job is
/// checkpointed on entering `Analyzed` and `Scored`; `Searched` only lives
/// in memory, so a crash during scoring resumes from `Analyzed`.
#[derive(Debug, Clone, PartialEq)]
pub enum SingleState {
    /// Nothing done yet.
    Fresh,
    /// Analysis and query are stored.
    Analyzed {
        /// Stage output.
        analysis: ClaimAnalysis,
        /// Query built from the analysis.
        query: SearchQuery,
    },
    /// Records were retrieved but not yet scored.
    Searched {
        /// Stage output.
        analysis: ClaimAnalysis,
        /// Query that was searched.
        query: SearchQuery,
        /// Unscored records.
        records: Vec<Record>,
        /// Records per provider.
        counts: SourceCounts,
    },
    /// Scored result, not yet confirmed as stored.
    Scored(ClaimResult),
    /// Final result stored and the job marked completed.
    Complete(ClaimResult),
}

/// Outcome of one single-claim step.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Step {
    /// Continue from this state.
    Next(SingleState),
    /// The job stopped with this payload.
    Done(ClaimResult),
}

impl SingleState {
    /// State name, for logging.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Fresh => "fresh",
            Self::Analyzed { .. } => "analyzed",
            Self::Searched { .. } => "searched",
            Self::Scored(_) => "scored",
            Self::Complete(_) => "complete",
        }
    }

    /// Recovers the state a stored job stopped in.
    ///
    /// Only a payload holding search results counts as complete; a
    /// completed job without them resumes from `Analyzed`.
    ///
    /// # Errors
    ///
    /// [`PipelineError::InvalidCheckpoint`] if the payload is not a claim
    /// result.
    pub fn from_job(job: &Job) -> Result<Self, PipelineError> {
        if job.data.is_null() {
            return Ok(Self::Fresh);
        }
        let result: ClaimResult =
            serde_json::from_value(job.data.clone()).map_err(|e| PipelineError::InvalidCheckpoint {
                id: job.id.clone(),
                message: e.to_string(),
            })?;

        Ok(if job.completed && result.search_results.is_some() {
            Self::Complete(result)
        } else if result.search_results.is_some() {
            Self::Scored(result)
        } else {
            Self::Analyzed {
                analysis: result.analysis,
                query: result.query,
            }
        })
    }
}

/// Inputs of one single-claim run.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SingleRun<'a> {
    job_id: &'a str,
    claim_text: Option<&'a str>,
    independent: bool,
    options: &'a JobOptions,
}

impl Pipeline {
    /// Analyzes one claim and, if requested, searches and scores prior art.
    ///
    /// With `resume`, an existing checkpoint for the job identity decides
    /// where the run starts: a completed job returns its stored payload
    /// without provider calls, an analyzed job continues from the search.
    /// `claim_text` may be omitted only when resuming an existing job.
    ///
    /// # Errors
    ///
    /// [`PipelineError::Input`] when there is nothing to analyze, or the
    /// first stage failure.
    pub async fn analyze(
        &self,
        claim_text: Option<&str>,
        independent: bool,
        options: &JobOptions,
    ) -> Result<ClaimResult, PipelineError> {
        let claim_text = claim_text.map(str::trim).filter(|t| !t.is_empty());
        if claim_text.is_none() && options.checkpoint.is_none() {
            return Err(PipelineError::Input {
                message: "claim text is required unless resuming a named checkpoint".to_string(),
            });
        }
        let job_id = derive_job_id(options.checkpoint.as_deref(), claim_text.unwrap_or_default());
        info!(job_id = %job_id, "analyzing claim");

        let mut state = if options.resume {
            match self.store().find(&job_id)? {
                Some(job) => {
                    let state = SingleState::from_job(&job)?;
                    info!(job_id = %job_id, state = state.name(), "resuming from checkpoint");
                    state
                }
                None => SingleState::Fresh,
            }
        } else {
            SingleState::Fresh
        };

        let run = SingleRun {
            job_id: &job_id,
            claim_text,
            independent,
            options,
        };
        loop {
            debug!(job_id = %job_id, state = state.name(), "single-claim step");
            match self.step(run, state).await? {
                Step::Next(next) => state = next,
                Step::Done(result) => return Ok(result),
            }
        }
    }

    /// Performs one transition of the single-claim state machine.
    pub(crate) async fn step(
        &self,
        run: SingleRun<'_>,
        state: SingleState,
    ) -> Result<Step, PipelineError> {
        let SingleRun {
            job_id, options, ..
        } = run;

        match state {
            SingleState::Fresh => {
                let claim_text = run.claim_text.ok_or_else(|| PipelineError::Input {
                    message: format!("no checkpoint '{job_id}' to resume and no claim text given"),
                })?;
                let (analysis, query) = self
                    .analyze_claim(claim_text, run.independent, options.date_range.as_deref())
                    .await?;
                let result = ClaimResult::analyzed(analysis, query);
                self.store()
                    .put(&Job::new(job_id, serde_json::to_value(&result)?))?;
                Ok(Step::Next(SingleState::Analyzed {
                    analysis: result.analysis,
                    query: result.query,
                }))
            }
            SingleState::Analyzed { analysis, query } if !options.execute => {
                Ok(Step::Done(ClaimResult::analyzed(analysis, query)))
            }
            SingleState::Analyzed { analysis, query } => {
                let (records, counts) = self.search_records(&query, options.source).await;
                Ok(Step::Next(SingleState::Searched {
                    analysis,
                    query,
                    records,
                    counts,
                }))
            }
            SingleState::Searched {
                analysis,
                query,
                records,
                counts,
            } => {
                let scored = self
                    .score_records(&analysis.claim_text, records, options.risk_threshold)
                    .await?;
                Ok(Step::Next(SingleState::Scored(ClaimResult {
                    analysis,
                    query,
                    search_results: Some(scored.records),
                    risk_summary: Some(scored.summary),
                    sources: Some(counts),
                })))
            }
            SingleState::Scored(result) => {
                self.store()
                    .put(&Job::new(job_id, serde_json::to_value(&result)?))?;
                self.store().mark_completed(job_id);
                Ok(Step::Next(SingleState::Complete(result)))
            }
            SingleState::Complete(result) => {
                self.artifacts.write(&single_name(job_id), &result)?;
                Ok(Step::Done(result))
            }
        }
    }
}
