//! Project PQ record provider.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::RecordProvider;
use super::config::SearchConfig;
use super::http::{check_response, client, transport_error};
use crate::core::{Record, SearchQuery, Source};
use crate::error::ProviderError;

#[derive(Debug, Default, Deserialize)]
struct PqResponse {
    #[serde(default)]
    results: Vec<PqResult>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PqResult {
    #[serde(default)]
    patent_number: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    r#abstract: Option<String>,
    #[serde(default)]
    publication_date: Option<String>,
    #[serde(default)]
    assignee: Option<PqParty>,
    #[serde(default)]
    inventors: Option<Vec<PqParty>>,
    #[serde(default)]
    application_number: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct PqParty {
    #[serde(default)]
    name: Option<String>,
}

impl From<PqResult> for Record {
    fn from(r: PqResult) -> Self {
        Self {
            patent_number: r.patent_number.unwrap_or_default(),
            title: r.title.unwrap_or_default(),
            abstract_text: r.r#abstract.unwrap_or_default(),
            publication_date: r.publication_date.unwrap_or_default(),
            assignee: r.assignee.and_then(|a| a.name).unwrap_or_default(),
            inventors: r
                .inventors
                .unwrap_or_default()
                .into_iter()
                .filter_map(|p| p.name)
                .collect(),
            application_number: r.application_number.unwrap_or_default(),
            source: Some(Source::ProjectPq),
            ..Self::default()
        }
    }
}

/// Client for the Project PQ prior-art search API.
#[derive(Debug, Clone)]
pub struct ProjectPqProvider {
    http: reqwest::Client,
    url: String,
    api_key: Option<String>,
    results: usize,
}

impl ProjectPqProvider {
    /// Creates a provider from search configuration.
    ///
    /// # Errors
    ///
    /// [`ProviderError::InvalidRequest`] if the HTTP client cannot be built.
    pub fn new(config: &SearchConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            http: client(Source::ProjectPq.as_str(), config.timeout)?,
            url: config.project_pq_url.clone(),
            api_key: config.project_pq_api_key.clone(),
            results: config.project_pq_results,
        })
    }

    fn parse_body(body: &str) -> Result<Vec<Record>, ProviderError> {
        let response: PqResponse =
            serde_json::from_str(body).map_err(|e| ProviderError::Malformed {
                message: format!("projectpq response: {e}"),
            })?;
        Ok(response.results.into_iter().map(Record::from).collect())
    }
}

#[async_trait]
impl RecordProvider for ProjectPqProvider {
    fn source(&self) -> Source {
        Source::ProjectPq
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<Record>, ProviderError> {
        let name = Source::ProjectPq.as_str();
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ProviderError::ApiKeyMissing {
                provider: name.to_string(),
                env_var: "PROJECT_PQ_API_KEY".to_string(),
            })?;

        let n = self.results.to_string();
        let mut params: Vec<(&str, &str)> =
            vec![("q", query.query.as_str()), ("n", n.as_str()), ("token", api_key)];
        let advanced: Vec<(String, String)> = query
            .advanced
            .iter()
            .map(|(k, v)| {
                let v = v.as_str().map_or_else(|| v.to_string(), ToString::to_string);
                (k.clone(), v)
            })
            .collect();
        params.extend(advanced.iter().map(|(k, v)| (k.as_str(), v.as_str())));

        let resp = self
            .http
            .get(&self.url)
            .query(&params)
            .send()
            .await
            .map_err(|e| transport_error(name, &e))?;
        let body = check_response(name, resp)
            .await?
            .text()
            .await
            .map_err(|e| transport_error(name, &e))?;

        let records = Self::parse_body(&body)?;
        debug!(source = name, records = records.len(), "search returned");
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"{
        "results": [
            {
                "patentNumber": "US10000001B2",
                "title": "Adaptive rotor blade",
                "abstract": "A rotor blade with adjustable pitch.",
                "publicationDate": "2018-06-19",
                "assignee": {"name": "Windco"},
                "inventors": [{"name": "A. Smith"}, {"name": null}, {"name": "B. Jones"}],
                "applicationNumber": "15/123456"
            },
            {
                "title": "Sparse result"
            }
        ]
    }"#;

    #[test]
    fn test_parse_fixture() {
        let records = ProjectPqProvider::parse_body(FIXTURE).unwrap_or_default();
        assert_eq!(records.len(), 2);
        let r = &records[0];
        assert_eq!(r.patent_number, "US10000001B2");
        assert_eq!(r.assignee, "Windco");
        assert_eq!(r.inventors, vec!["A. Smith", "B. Jones"]);
        assert_eq!(r.application_number, "15/123456");
        assert_eq!(r.source, Some(Source::ProjectPq));
        assert!(!r.is_scored());
    }

    #[test]
    fn test_missing_fields_default_empty() {
        let records = ProjectPqProvider::parse_body(FIXTURE).unwrap_or_default();
        let r = &records[1];
        assert_eq!(r.title, "Sparse result");
        assert!(r.patent_number.is_empty());
        assert!(r.assignee.is_empty());
        assert!(r.inventors.is_empty());
    }

    #[test]
    fn test_missing_results_is_empty() {
        assert!(
            ProjectPqProvider::parse_body("{}")
                .unwrap_or_else(|_| unreachable!())
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_missing_key_fails_without_request() {
        let provider = ProjectPqProvider::new(&SearchConfig::builder().build())
            .unwrap_or_else(|_| unreachable!());
        let result = provider.search(&SearchQuery::new("ABST/\"x\"")).await;
        assert!(matches!(result, Err(ProviderError::ApiKeyMissing { .. })));
    }
}
