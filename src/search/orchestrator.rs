//! Multi-source search fan-out.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::config::SearchConfig;
use super::lens::LensProvider;
use super::projectpq::ProjectPqProvider;
use super::RecordProvider;
use crate::core::{Record, SearchQuery, Source, SourceCounts};
use crate::error::ProviderError;
use crate::retry::{RetryPolicy, retry};

/// Which providers a search is sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceSelector {
    /// Every registered provider.
    #[default]
    All,
    /// A single provider.
    Only(Source),
}

impl SourceSelector {
    /// Returns `true` if `source` is selected.
    #[must_use]
    pub fn includes(self, source: Source) -> bool {
        match self {
            Self::All => true,
            Self::Only(only) => only == source,
        }
    }
}

impl FromStr for SourceSelector {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        Source::parse(s)
            .map(Self::Only)
            .ok_or_else(|| format!("unknown source '{s}' (expected all, projectpq, or lens)"))
    }
}

impl fmt::Display for SourceSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Only(source) => source.fmt(f),
        }
    }
}

/// Merged records and per-source counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOutcome {
    /// Records from every selected provider, in provider order.
    pub records: Vec<Record>,
    /// How many records each provider contributed.
    pub counts: SourceCounts,
}

/// Dispatches one query to several record providers.
pub struct SearchOrchestrator {
    providers: Vec<Arc<dyn RecordProvider>>,
    retry: RetryPolicy,
}

impl fmt::Debug for SearchOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchOrchestrator")
            .field(
                "providers",
                &self.providers.iter().map(|p| p.source()).collect::<Vec<_>>(),
            )
            .field("retry", &self.retry)
            .finish()
    }
}

impl SearchOrchestrator {
    /// Creates an orchestrator over explicit providers.
    #[must_use]
    pub fn new(providers: Vec<Arc<dyn RecordProvider>>, retry: RetryPolicy) -> Self {
        Self { providers, retry }
    }

    /// Creates an orchestrator with the Project PQ and Lens providers.
    ///
    /// # Errors
    ///
    /// [`ProviderError::InvalidRequest`] if an HTTP client cannot be built.
    pub fn from_config(config: &SearchConfig) -> Result<Self, ProviderError> {
        Ok(Self::new(
            vec![
                Arc::new(ProjectPqProvider::new(config)?),
                Arc::new(LensProvider::new(config)?),
            ],
            config.retry,
        ))
    }

    /// Runs `query` against every selected provider, one after another.
    ///
    /// Each provider call is retried under this orchestrator's policy. A
    /// provider that still fails is logged and counted as zero records; it
    /// never fails the search as a whole.
    pub async fn search(&self, query: &SearchQuery, selector: SourceSelector) -> SearchOutcome {
        let mut outcome = SearchOutcome::default();

        if let SourceSelector::Only(source) = selector
            && !self.providers.iter().any(|p| p.source() == source)
        {
            warn!(%source, "selected source has no registered provider");
            outcome.counts.record(source, 0);
        }

        for provider in self.providers.iter().filter(|p| selector.includes(p.source())) {
            let source = provider.source();
            let provider = provider.as_ref();
            let result = retry(&self.retry, source.as_str(), move || provider.search(query)).await;

            match result {
                Ok(mut records) => {
                    for record in &mut records {
                        record.source = Some(source);
                    }
                    info!(%source, records = records.len(), "source search complete");
                    outcome.counts.record(source, records.len());
                    outcome.records.extend(records);
                }
                Err(e) => {
                    warn!(%source, error = %e, "source search failed, continuing without it");
                    outcome.counts.record(source, 0);
                }
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    struct Static {
        source: Source,
        count: usize,
    }

    #[async_trait]
    impl RecordProvider for Static {
        fn source(&self) -> Source {
            self.source
        }

        async fn search(&self, _query: &SearchQuery) -> Result<Vec<Record>, ProviderError> {
            Ok((0..self.count)
                .map(|i| Record {
                    patent_number: format!("{}-{i}", self.source),
                    ..Record::default()
                })
                .collect())
        }
    }

    struct Down {
        calls: AtomicU32,
    }

    #[async_trait]
    impl RecordProvider for Down {
        fn source(&self) -> Source {
            Source::Lens
        }

        async fn search(&self, _query: &SearchQuery) -> Result<Vec<Record>, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(ProviderError::Transient {
                provider: "lens".to_string(),
                message: "connection refused".to_string(),
                status: None,
            })
        }
    }

    fn fast() -> RetryPolicy {
        RetryPolicy::record_provider().with_delays(Duration::from_millis(1), Duration::from_millis(1))
    }

    #[test]
    fn test_selector_parse() {
        assert_eq!("all".parse::<SourceSelector>(), Ok(SourceSelector::All));
        assert_eq!(
            "lens".parse::<SourceSelector>(),
            Ok(SourceSelector::Only(Source::Lens))
        );
        assert!("bing".parse::<SourceSelector>().is_err());
        assert_eq!(SourceSelector::Only(Source::ProjectPq).to_string(), "projectpq");
    }

    #[tokio::test]
    async fn test_merges_and_tags() {
        let orchestrator = SearchOrchestrator::new(
            vec![
                Arc::new(Static {
                    source: Source::ProjectPq,
                    count: 2,
                }),
                Arc::new(Static {
                    source: Source::Lens,
                    count: 3,
                }),
            ],
            fast(),
        );
        let outcome = orchestrator
            .search(&SearchQuery::new("q"), SourceSelector::All)
            .await;
        assert_eq!(outcome.records.len(), 5);
        assert_eq!(outcome.counts.get(Source::ProjectPq), 2);
        assert_eq!(outcome.counts.get(Source::Lens), 3);
        assert_eq!(outcome.counts.total, 5);
        assert_eq!(outcome.records[4].source, Some(Source::Lens));
    }

    #[tokio::test]
    async fn test_failed_source_contributes_zero() {
        let down = Arc::new(Down {
            calls: AtomicU32::new(0),
        });
        let orchestrator = SearchOrchestrator::new(
            vec![
                Arc::new(Static {
                    source: Source::ProjectPq,
                    count: 4,
                }),
                down.clone(),
            ],
            fast(),
        );
        let outcome = orchestrator
            .search(&SearchQuery::new("q"), SourceSelector::All)
            .await;
        assert_eq!(down.calls.load(Ordering::SeqCst), 3);
        assert_eq!(outcome.records.len(), 4);
        assert_eq!(outcome.counts.get(Source::Lens), 0);
        assert!(outcome.counts.per_source.contains_key(&Source::Lens));
    }

    #[tokio::test]
    async fn test_single_source_selection() {
        let orchestrator = SearchOrchestrator::new(
            vec![
                Arc::new(Static {
                    source: Source::ProjectPq,
                    count: 2,
                }),
                Arc::new(Static {
                    source: Source::Lens,
                    count: 3,
                }),
            ],
            fast(),
        );
        let outcome = orchestrator
            .search(&SearchQuery::new("q"), SourceSelector::Only(Source::Lens))
            .await;
        assert_eq!(outcome.records.len(), 3);
        assert!(!outcome.counts.per_source.contains_key(&Source::ProjectPq));
    }
}
