//! Risk tiers and the risk summary shape.
//!
//! Tier boundaries are inclusive on the higher tier: 7 is high, 4 is medium.

use serde::{Deserialize, Serialize};

use super::record::Record;

/// Minimum score classified as [`RiskTier::High`].
pub const HIGH_RISK_MIN: u8 = 7;
/// Minimum score classified as [`RiskTier::Medium`].
pub const MEDIUM_RISK_MIN: u8 = 4;

/// Qualitative conflict risk tier, ordered from highest to lowest.
///
/// Discriminants are inverted (`High = 0`) so the derived [`Ord`] sorts
/// high-risk entries first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    /// Score 7-10.
    High = 0,
    /// Score 4-6.
    Medium = 1,
    /// Score 1-3.
    Low = 2,
}

impl RiskTier {
    /// Classifies a numeric risk score.
    #[must_use]
    pub const fn from_score(score: u8) -> Self {
        if score >= HIGH_RISK_MIN {
            Self::High
        } else if score >= MEDIUM_RISK_MIN {
            Self::Medium
        } else {
            Self::Low
        }
    }

    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A scored record as listed in a [`RiskSummary`] tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskEntry {
    /// Record identifier.
    pub patent_number: String,
    /// Record title.
    pub title: String,
    /// Risk score (1-10).
    pub risk_score: u8,
}

/// Summary statistics over a set of scored records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskSummary {
    /// Number of records that carried a risk score.
    pub total_analyzed: usize,
    /// Records scoring 7 or above.
    pub high_risk: Vec<RiskEntry>,
    /// Records scoring 4 to 6.
    pub medium_risk: Vec<RiskEntry>,
    /// Records scoring below 4.
    pub low_risk: Vec<RiskEntry>,
    /// Arithmetic mean score over the summarized records.
    pub average_score: f64,
    /// The highest-scored record (first occurrence on ties).
    pub highest_risk: Option<Record>,
    /// Qualitative overall assessment.
    pub overall_assessment: String,
}
