//! Normalized external search records.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Record provider that produced a [`Record`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Project PQ prior-art search.
    ProjectPq,
    /// Lens.org patent search.
    Lens,
}

impl Source {
    /// Parses a source name (case-insensitive).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "projectpq" | "pq" => Some(Self::ProjectPq),
            "lens" => Some(Self::Lens),
            _ => None,
        }
    }

    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ProjectPq => "projectpq",
            Self::Lens => "lens",
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A search result normalized from any record provider.
///
/// Provider mappers fill missing fields with empty strings or lists so
/// that downstream stages never see nulls. Only the risk fields are
/// optional: they stay `None` until the scoring engine assigns them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Publication identifier (e.g. `US 7654321 B2`).
    #[serde(default)]
    pub patent_number: String,
    /// Title.
    #[serde(default)]
    pub title: String,
    /// Abstract text.
    #[serde(default)]
    pub abstract_text: String,
    /// Publication date as reported by the provider.
    #[serde(default)]
    pub publication_date: String,
    /// Primary assignee.
    #[serde(default)]
    pub assignee: String,
    /// Inventor names in provider order.
    #[serde(default)]
    pub inventors: Vec<String>,
    /// Application identifier.
    #[serde(default)]
    pub application_number: String,
    /// Provider that returned this record.
    #[serde(default)]
    pub source: Option<Source>,
    /// Conflict risk score (1-10), once scored.
    #[serde(default)]
    pub risk_score: Option<u8>,
    /// Explanation accompanying the risk score.
    #[serde(default)]
    pub risk_explanation: Option<String>,
}

impl Record {
    /// Returns `true` if the record carries a risk score.
    #[must_use]
    pub const fn is_scored(&self) -> bool {
        self.risk_score.is_some()
    }
}

/// Per-provider record counts for a merged result set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceCounts {
    /// Records contributed by each queried provider.
    pub per_source: BTreeMap<Source, usize>,
    /// Total records across providers.
    pub total: usize,
}

impl SourceCounts {
    /// Records `count` results for `source`.
    pub fn record(&mut self, source: Source, count: usize) {
        *self.per_source.entry(source).or_insert(0) += count;
        self.total += count;
    }

    /// Returns the count for `source` (zero if it was not queried).
    #[must_use]
    pub fn get(&self, source: Source) -> usize {
        self.per_source.get(&source).copied().unwrap_or(0)
    }
}
