//! Lens.org record provider.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::RecordProvider;
use super::config::{LENS_MAX_RESULTS, SearchConfig};
use super::http::{check_response, client, transport_error};
use crate::core::{Record, SearchQuery, Source};
use crate::error::ProviderError;

static QUOTED_PHRASE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r#""([^"]+)""#).ok());

/// Translates a boolean query into Lens query-string syntax.
///
/// Every distinct quoted phrase becomes `(title:"p" OR abstract.text:"p")`
/// and the clauses are OR-joined. A query without quoted phrases is sent
/// verbatim.
#[must_use]
pub fn translate_query(query: &str) -> String {
    let mut phrases: Vec<&str> = Vec::new();
    if let Some(re) = QUOTED_PHRASE.as_ref() {
        for cap in re.captures_iter(query) {
            if let Some(m) = cap.get(1)
                && !phrases.contains(&m.as_str())
            {
                phrases.push(m.as_str());
            }
        }
    }
    if phrases.is_empty() {
        return query.trim().to_string();
    }
    phrases
        .iter()
        .map(|p| format!("(title:\"{p}\" OR abstract.text:\"{p}\")"))
        .collect::<Vec<_>>()
        .join(" OR ")
}

#[derive(Debug, Serialize)]
struct LensRequest<'a> {
    query: &'a str,
    size: usize,
}

#[derive(Debug, Default, Deserialize)]
struct LensResponse {
    #[serde(default)]
    data: Vec<LensPatent>,
}

#[derive(Debug, Default, Deserialize)]
struct LensPatent {
    #[serde(default)]
    doc_key: Option<String>,
    #[serde(default)]
    jurisdiction: Option<String>,
    #[serde(default)]
    doc_number: Option<String>,
    #[serde(default)]
    kind: Option<String>,
    #[serde(default)]
    date_published: Option<String>,
    #[serde(default)]
    r#abstract: Vec<LensText>,
    #[serde(default)]
    biblio: LensBiblio,
}

#[derive(Debug, Default, Deserialize)]
struct LensText {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    lang: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LensBiblio {
    #[serde(default)]
    invention_title: Vec<LensText>,
    #[serde(default)]
    parties: LensParties,
    #[serde(default)]
    application_reference: Option<LensDocRef>,
}

#[derive(Debug, Default, Deserialize)]
struct LensParties {
    #[serde(default)]
    applicants: Vec<LensParty>,
    #[serde(default)]
    inventors: Vec<LensParty>,
}

#[derive(Debug, Default, Deserialize)]
struct LensParty {
    #[serde(default)]
    extracted_name: Option<LensName>,
}

#[derive(Debug, Default, Deserialize)]
struct LensName {
    #[serde(default)]
    value: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LensDocRef {
    #[serde(default)]
    doc_number: Option<String>,
}

impl LensParty {
    fn name(&self) -> Option<&str> {
        self.extracted_name
            .as_ref()
            .and_then(|n| n.value.as_deref())
            .filter(|v| !v.is_empty())
    }
}

impl LensPatent {
    /// `US_7654321_B2_20090210` → `US 7654321 B2`, else built from parts.
    fn patent_number(&self) -> String {
        let key_parts: Vec<&str> = self.doc_key.as_deref().unwrap_or_default().split('_').collect();
        if key_parts.len() >= 3 {
            return key_parts[..3].join(" ");
        }
        [&self.jurisdiction, &self.doc_number, &self.kind]
            .iter()
            .filter_map(|p| p.as_deref())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn title(&self) -> String {
        let titles = &self.biblio.invention_title;
        titles
            .iter()
            .find(|t| t.lang.as_deref() == Some("en"))
            .or_else(|| titles.first())
            .and_then(|t| t.text.clone())
            .unwrap_or_default()
    }
}

impl From<LensPatent> for Record {
    fn from(p: LensPatent) -> Self {
        Self {
            patent_number: p.patent_number(),
            title: p.title(),
            abstract_text: p
                .r#abstract
                .first()
                .and_then(|a| a.text.clone())
                .unwrap_or_default(),
            publication_date: p.date_published.clone().unwrap_or_default(),
            assignee: p
                .biblio
                .parties
                .applicants
                .first()
                .and_then(LensParty::name)
                .unwrap_or_default()
                .to_string(),
            inventors: p
                .biblio
                .parties
                .inventors
                .iter()
                .filter_map(LensParty::name)
                .map(ToString::to_string)
                .collect(),
            application_number: p
                .biblio
                .application_reference
                .as_ref()
                .and_then(|r| r.doc_number.clone())
                .unwrap_or_default(),
            source: Some(Source::Lens),
            ..Self::default()
        }
    }
}

/// Client for the Lens patent search API.
#[derive(Debug, Clone)]
pub struct LensProvider {
    http: reqwest::Client,
    url: String,
    api_key: Option<String>,
    size: usize,
}

impl LensProvider {
    /// Creates a provider from search configuration.
    ///
    /// # Errors
    ///
    /// [`ProviderError::InvalidRequest`] if the HTTP client cannot be built.
    pub fn new(config: &SearchConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            http: client(Source::Lens.as_str(), config.timeout)?,
            url: config.lens_url.clone(),
            api_key: config.lens_api_key.clone(),
            size: config.lens_results.min(LENS_MAX_RESULTS),
        })
    }

    fn parse_body(body: &str) -> Result<Vec<Record>, ProviderError> {
        let response: LensResponse =
            serde_json::from_str(body).map_err(|e| ProviderError::Malformed {
                message: format!("lens response: {e}"),
            })?;
        Ok(response.data.into_iter().map(Record::from).collect())
    }
}

#[async_trait]
impl RecordProvider for LensProvider {
    fn source(&self) -> Source {
        Source::Lens
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<Record>, ProviderError> {
        let name = Source::Lens.as_str();
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ProviderError::ApiKeyMissing {
                provider: name.to_string(),
                env_var: "LENS_API_KEY".to_string(),
            })?;

        let lens_query = translate_query(&query.query);
        debug!(source = name, query = %lens_query, "sending lens query");

        let resp = self
            .http
            .post(&self.url)
            .bearer_auth(api_key)
            .json(&LensRequest {
                query: &lens_query,
                size: self.size,
            })
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
