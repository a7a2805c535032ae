//! Pipeline orchestration.
//!
//! A [`Pipeline`] sequences the analysis, query, search, scoring and
//! aggregation stages for three operations:
//!
//! - [`Pipeline::analyze`]: one claim, checkpointed at stage boundaries
//!   (see [`SingleState`]).
//! - [`Pipeline::analyze_multiple`]: a claims document, checkpointed after
//!   every claim.
//! - [`Pipeline::search`]: a raw query, not checkpointed.
//!
//! Completed runs write their final payload as a result artifact; an
//! analysis-only run returns without one.

mod multi;
mod search;
mod single;

pub use multi::MultiState;
pub use search::{SearchOptions, SearchReport};
pub use single::SingleState;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::agent::{AgentConfig, ClaimAnalyzer, ClaimSplitter, LlmProvider, RiskScorer};
use crate::aggregate::{filter_by_threshold, summarize_risk};
use crate::artifact::ArtifactWriter;
use crate::checkpoint::CheckpointStore;
use crate::core::{ClaimAnalysis, Record, RiskSummary, SearchQuery, SourceCounts};
use crate::error::PipelineError;
use crate::search::{SearchOrchestrator, SourceSelector};

/// Options shared by the claim analysis operations.
#[derive(Debug, Clone, Default)]
pub struct JobOptions {
    /// Explicit job identity; derived from the input when absent.
    pub checkpoint: Option<String>,
    /// Resume from an existing checkpoint for the job identity.
    pub resume: bool,
    /// Run search, scoring and aggregation after the analysis.
    pub execute: bool,
    /// Date range appended to generated queries.
    pub date_range: Option<String>,
    /// Minimum risk score kept in returned records (0 disables).
    pub risk_threshold: u8,
    /// Record providers to query.
    pub source: SourceSelector,
}

/// Result payload for one analyzed claim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClaimResult {
    /// Structured analysis of the claim.
    pub analysis: ClaimAnalysis,
    /// Query built from the analysis.
    pub query: SearchQuery,
    /// Scored records, present once the search ran.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_results: Option<Vec<Record>>,
    /// Risk summary, present once the search ran.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_summary: Option<RiskSummary>,
    /// Records contributed by each provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<SourceCounts>,
}

impl ClaimResult {
    /// Result holding only the analysis stage output.
    #[must_use]
    pub const fn analyzed(analysis: ClaimAnalysis, query: SearchQuery) -> Self {
        Self {
            analysis,
            query,
            search_results: None,
            risk_summary: None,
            sources: None,
        }
    }
}

/// One entry of a multi-claim result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NumberedClaimResult {
    /// 1-based position of the claim in its document.
    pub claim_number: usize,
    /// The claim's result.
    #[serde(flatten)]
    pub result: ClaimResult,
}

/// Scored records after threshold filtering, with their summary.
#[derive(Debug, Clone, Default)]
pub(crate) struct Scored {
    pub records: Vec<Record>,
    pub summary: RiskSummary,
}

/// Sequences the pipeline stages over shared providers and storage.
pub struct Pipeline {
    provider: Arc<dyn LlmProvider>,
    analyzer: ClaimAnalyzer,
    scorer: RiskScorer,
    splitter: ClaimSplitter,
    search: SearchOrchestrator,
    store: Arc<dyn CheckpointStore>,
    artifacts: ArtifactWriter,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("provider", &self.provider.name())
            .field("search", &self.search)
            .field("artifacts", &self.artifacts)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    /// Creates a pipeline.
    #[must_use]
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        config: &AgentConfig,
        search: SearchOrchestrator,
        store: Arc<dyn CheckpointStore>,
        artifacts: ArtifactWriter,
    ) -> Self {
        Self {
            provider,
            analyzer: ClaimAnalyzer::new(config),
            scorer: RiskScorer::new(config),
            splitter: ClaimSplitter::new(config),
            search,
            store,
            artifacts,
        }
    }

    /// Checkpoint store backing this pipeline.
    #[must_use]
    pub fn store(&self) -> &dyn CheckpointStore {
        self.store.as_ref()
    }

    /// Runs the analysis stage and builds the query for one claim.
    async fn analyze_claim(
        &self,
        claim_text: &str,
        independent: bool,
        date_range: Option<&str>,
    ) -> Result<(ClaimAnalysis, SearchQuery), PipelineError> {
        let analysis = self
            .analyzer
            .analyze(self.provider.as_ref(), claim_text, independent)
            .await?;
        if analysis.is_empty() {
            warn!("analysis produced no search terms; query is empty");
        }
        let query = crate::query::build_query(&analysis, date_range);
        Ok((analysis, query))
    }

    /// Runs the search stage. An empty query searches nothing.
    async fn search_records(
        &self,
        query: &SearchQuery,
        source: SourceSelector,
    ) -> (Vec<Record>, SourceCounts) {
        if query.query.trim().is_empty() {
            warn!("skipping search for empty query");
            return (Vec::new(), SourceCounts::default());
        }
        let outcome = self.search.search(query, source).await;
        (outcome.records, outcome.counts)
    }

    /// Scores `records` against `claim_text` and summarizes them.
    async fn score_records(
        &self,
        claim_text: &str,
        records: Vec<Record>,
        risk_threshold: u8,
    ) -> Result<Scored, PipelineError> {
        let scored = self
            .scorer
            .score(self.provider.as_ref(), claim_text, records)
            .await?;
        let summary = summarize_risk(&scored, risk_threshold);
        let total = scored.len();
        let records = filter_by_threshold(scored, risk_threshold);
        if risk_threshold > 0 {
            info!(
                threshold = risk_threshold,
                before = total,
                after = records.len(),
                "filtered records by risk threshold"
            );
        }
        Ok(Scored { records, summary })
    }
}
