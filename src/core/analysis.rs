//! Structured claim analysis and the query derived from it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Structured analysis of a single claim, produced by the analysis stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimAnalysis {
    /// The claim text that was analyzed.
    pub claim_text: String,
    /// Whether the claim was flagged as independent.
    pub independent: bool,
    /// Key technical terms, most relevant first.
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Broader concepts related to the claim.
    #[serde(default)]
    pub concepts: Vec<String>,
    /// Suggested CPC (primary) classification codes.
    #[serde(default)]
    pub cpc_classes: Vec<String>,
    /// Suggested IPC (secondary) classification codes.
    #[serde(default)]
    pub ipc_classes: Vec<String>,
    /// Raw provider output, retained for diagnostics.
    #[serde(default)]
    pub raw_response: String,
}

impl ClaimAnalysis {
    /// Returns `true` when no keyword, concept, or classification was extracted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
            && self.concepts.is_empty()
            && self.cpc_classes.is_empty()
            && self.ipc_classes.is_empty()
    }
}

/// A boolean search query in record-provider syntax.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// The query string.
    pub query: String,
    /// Optional structured advanced-search parameters.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub advanced: BTreeMap<String, serde_json::Value>,
}

impl SearchQuery {
    /// Creates a query with no advanced parameters.
    #[must_use]
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            advanced: BTreeMap::new(),
        }
    }
}
