//! Record-provider configuration.
//!
//! Resolved in order: explicit values → environment variables → defaults.

use std::time::Duration;

use crate::retry::RetryPolicy;

/// Default Project PQ search endpoint.
pub const DEFAULT_PROJECT_PQ_URL: &str = "https://api.projectpq.ai/search/102";
/// Default Lens patent search endpoint.
pub const DEFAULT_LENS_URL: &str = "https://api.lens.org/patent/search";
/// Default number of results requested per provider.
pub const DEFAULT_RESULTS_COUNT: usize = 50;
/// Lens rejects page sizes above this.
pub const LENS_MAX_RESULTS: usize = 100;
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Configuration for all record providers.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Project PQ endpoint.
    pub project_pq_url: String,
    /// Project PQ API token.
    pub project_pq_api_key: Option<String>,
    /// Results requested from Project PQ.
    pub project_pq_results: usize,
    /// Lens endpoint.
    pub lens_url: String,
    /// Lens bearer token.
    pub lens_api_key: Option<String>,
    /// Results requested from Lens (capped at [`LENS_MAX_RESULTS`]).
    pub lens_results: usize,
    /// HTTP request timeout.
    pub timeout: Duration,
    /// Retry policy applied to each provider call.
    pub retry: RetryPolicy,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl SearchConfig {
    /// Creates a new builder.
    #[must_use]
    pub fn builder() -> SearchConfigBuilder {
        SearchConfigBuilder::default()
    }

    /// Creates configuration from environment variables with defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::builder().from_env().build()
    }
}

/// Builder for [`SearchConfig`].
#[derive(Debug, Clone, Default)]
pub struct SearchConfigBuilder {
    project_pq_url: Option<String>,
    project_pq_api_key: Option<String>,
    project_pq_results: Option<usize>,
    lens_url: Option<String>,
    lens_api_key: Option<String>,
    lens_results: Option<usize>,
    timeout: Option<Duration>,
    retry: Option<RetryPolicy>,
}

fn env_usize(name: &str) -> Option<usize> {
    std::env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

impl SearchConfigBuilder {
    /// Populates unset fields from environment variables.
    #[must_use]
    pub fn from_env(mut self) -> Self {
        if self.project_pq_url.is_none() {
            self.project_pq_url = std::env::var("PROJECT_PQ_API_URL").ok();
        }
        if self.project_pq_api_key.is_none() {
            self.project_pq_api_key = std::env::var("PROJECT_PQ_API_KEY").ok();
        }
        if self.project_pq_results.is_none() {
            self.project_pq_results = env_usize("PROJECT_PQ_RESULTS_COUNT");
        }
        if self.lens_url.is_none() {
            self.lens_url = std::env::var("LENS_API_URL").ok();
        }
        if self.lens_api_key.is_none() {
            self.lens_api_key = std::env::var("LENS_API_KEY").ok();
        }
        if self.lens_results.is_none() {
            self.lens_results = env_usize("LENS_RESULTS_COUNT");
        }
        self
    }

    /// Sets the Project PQ endpoint.
    #[must_use]
    pub fn project_pq_url(mut self, url: impl Into<String>) -> Self {
        self.project_pq_url = Some(url.into());
        self
    }

    /// Sets the Project PQ token.
    #[must_use]
    pub fn project_pq_api_key(mut self, key: impl Into<String>) -> Self {
        self.project_pq_api_key = Some(key.into());
        self
    }

    /// Sets the Project PQ result count.
    #[must_use]
    pub const fn project_pq_results(mut self, n: usize) -> Self {
        self.project_pq_results = Some(n);
        self
    }

    /// Sets the Lens endpoint.
    #[must_use]
    pub fn lens_url(mut self, url: impl Into<String>) -> Self {
        self.lens_url = Some(url.into());
        self
    }

    /// Sets the Lens token.
    #[must_use]
    pub fn lens_api_key(mut self, key: impl Into<String>) -> Self {
        self.lens_api_key = Some(key.into());
        self
    }

    /// Sets the Lens result count.
    #[must_use]
    pub const fn lens_results(mut self, n: usize) -> Self {
        self.lens_results = Some(n);
        self
    }

    /// Sets the HTTP timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the retry policy.
    #[must_use]
    pub const fn retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = Some(policy);
        self
    }

    /// Builds the [`SearchConfig`]. Blank keys are treated as unset.
    #[must_use]
    pub fn build(self) -> SearchConfig {
        let key = |k: Option<String>| k.filter(|k| !k.trim().is_empty());
        SearchConfig {
            project_pq_url: self
                .project_pq_url
                .unwrap_or_else(|| DEFAULT_PROJECT_PQ_URL.to_string()),
            project_pq_api_key: key(self.project_pq_api_key),
            project_pq_results: self
                .project_pq_results
                .filter(|&n| n > 0)
                .unwrap_or(DEFAULT_RESULTS_COUNT),
            lens_url: self
                .lens_url
                .unwrap_or_else(|| DEFAULT_LENS_URL.to_string()),
            lens_api_key: key(self.lens_api_key),
            lens_results: self
                .lens_results
                .filter(|&n| n > 0)
                .unwrap_or(DEFAULT_RESULTS_COUNT)
                .min(LENS_MAX_RESULTS),
            timeout: self
                .timeout
                .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            retry: self.retry.unwrap_or_else(RetryPolicy::record_provider),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SearchConfig::builder().build();
        assert_eq!(config.project_pq_url, DEFAULT_PROJECT_PQ_URL);
        assert_eq!(config.project_pq_results, 50);
        assert_eq!(config.lens_results, 50);
        assert!(config.lens_api_key.is_none());
        assert_eq!(config.retry, RetryPolicy::record_provider());
    }

    #[test]
    fn test_lens_results_capped() {
        let config = SearchConfig::builder().lens_results(500).build();
        assert_eq!(config.lens_results, LENS_MAX_RESULTS);
    }

    #[test]
    fn test_blank_key_is_unset() {
        let config = SearchConfig::builder().project_pq_api_key(" ").build();
        assert!(config.project_pq_api_key.is_none());
    }
}
