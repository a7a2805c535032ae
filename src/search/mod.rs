//! Record providers and multi-source search.
//!
//! A [`RecordProvider`] turns a query into normalized [`Record`]s. The
//! [`SearchOrchestrator`] fans one query out to the selected providers,
//! tags every record with its provenance, and treats a provider that fails
//! all its attempts as contributing zero records.

pub mod config;
mod http;
pub mod lens;
pub mod orchestrator;
pub mod projectpq;

pub use config::SearchConfig;
pub use lens::{LensProvider, translate_query};
pub use orchestrator::{SearchOrchestrator, SearchOutcome, SourceSelector};
pub use projectpq::ProjectPqProvider;

use async_trait::async_trait;

use crate::core::{Record, SearchQuery, Source};
use crate::error::ProviderError;

/// A searchable external record source.
///
/// Implementations make one attempt per call; retries are applied by the
/// orchestrator.
#[async_trait]
pub trait RecordProvider: Send + Sync {
    /// Which source this provider represents.
    fn source(&self) -> Source;

    /// Runs `query` and returns normalized records.
    ///
    /// # Errors
    ///
    /// [`ProviderError::Transient`] for network or HTTP failures,
    /// [`ProviderError::ApiKeyMissing`] when unconfigured.
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Record>, ProviderError>;
}
