//! Raw query search.

use serde::{Deserialize, Serialize};
use tracing::info;

use super::Pipeline;
use crate::artifact::search_name;
use crate::core::{Record, RiskSummary, SearchQuery, SourceCounts, derive_job_id};
use crate::error::PipelineError;
use crate::query::with_date_range;
use crate::search::SourceSelector;

/// Options for [`Pipeline::search`].
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    /// Date range appended unless the query already contains it.
    pub date_range: Option<String>,
    /// Record providers to query.
    pub source: SourceSelector,
    /// Claim to score the results against.
    pub claim: Option<String>,
    /// Minimum risk score kept in returned records (0 disables).
    pub risk_threshold: u8,
}

/// Result payload of a raw search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchReport {
    /// Final query, date range included.
    pub query: String,
    /// Merged records.
    pub results: Vec<Record>,
    /// Present when a claim was scored against the results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_summary: Option<RiskSummary>,
    /// Records contributed by each provider.
    pub sources: SourceCounts,
}

impl Pipeline {
    /// Sends a hand-written query to the record providers.
    ///
    /// With a claim, the results are scored and summarized like an executed
    /// analysis. The report is written as artifact `search-<id>`, where the
    /// id is derived from the final query.
    ///
    /// # Errors
    ///
    /// [`PipelineError::Input`] for a blank query, or a scoring failure.
    /// Provider failures only reduce the result set.
    pub async fn search(
        &self,
        query_text: &str,
        options: &SearchOptions,
    ) -> Result<SearchReport, PipelineError> {
        if query_text.trim().is_empty() {
            return Err(PipelineError::Input {
                message: "search query is empty".to_string(),
            });
        }
        let query = with_date_range(query_text, options.date_range.as_deref());
        let search_id = derive_job_id(None, &query);
        info!(search_id = %search_id, query = %query, source = %options.source, "searching");

        let (records, sources) = self
            .search_records(&SearchQuery::new(query.clone()), options.source)
            .await;

        let claim = options.claim.as_deref().map(str::trim).filter(|c| !c.is_empty());
        let (results, risk_summary) = match claim {
            Some(claim) => {
                let scored = self
                    .score_records(claim, records, options.risk_threshold)
                    .await?;
                (scored.records, Some(scored.summary))
            }
            None => (records, None),
        };

        let report = SearchReport {
            query,
            results,
            risk_summary,
            sources,
        };
        self.artifacts.write(&search_name(&search_id), &report)?;
        Ok(report)
    }
}
