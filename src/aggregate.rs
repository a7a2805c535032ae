//! Risk summary over scored records.

use crate::core::{Record, RiskEntry, RiskSummary, RiskTier};

/// Message when no record carries a score.
pub const NO_RECORDS_SCORED: &str = "No patents were assessed for risk.";
/// Message when scored records exist but none carries any risk.
pub const NO_RISK_FOUND: &str = "No patents were found to have any risk.";

/// Keeps the records scored at or above `threshold`.
///
/// A threshold of zero disables filtering and returns every record,
/// scored or not.
#[must_use]
pub fn filter_by_threshold(records: Vec<Record>, threshold: u8) -> Vec<Record> {
    if threshold == 0 {
        return records;
    }
    records
        .into_iter()
        .filter(|r| r.risk_score.is_some_and(|s| s >= threshold))
        .collect()
}

/// Summarizes the scored subset of `records`.
///
/// `total_analyzed` counts every scored record; tiers, the mean and the
/// highest-risk record only consider records at or above `threshold`.
#[must_use]
pub fn summarize_risk(records: &[Record], threshold: u8) -> RiskSummary {
    let scored: Vec<(&Record, u8)> = records
        .iter()
        .filter_map(|r| r.risk_score.map(|s| (r, s)))
        .collect();
    let kept: Vec<(&Record, u8)> = scored
        .iter()
        .copied()
        .filter(|&(_, score)| score >= threshold)
        .collect();

    let mut summary = RiskSummary {
        total_analyzed: scored.len(),
        ..RiskSummary::default()
    };

    if kept.is_empty() {
        summary.overall_assessment = if scored.is_empty() {
            NO_RECORDS_SCORED.to_string()
        } else if threshold > 0 {
            format!("No patents met the minimum risk threshold of {threshold}.")
        } else {
            NO_RISK_FOUND.to_string()
        };
        return summary;
    }

    let mut highest: Option<(&Record, u8)> = None;
    let mut total: u64 = 0;
    for &(record, score) in &kept {
        let entry = RiskEntry {
            patent_number: record.patent_number.clone(),
            title: record.title.clone(),
            risk_score: score,
        };
        match RiskTier::from_score(score) {
            RiskTier::High => summary.high_risk.push(entry),
            RiskTier::Medium => summary.medium_risk.push(entry),
            RiskTier::Low => summary.low_risk.push(entry),
        }
        total += u64::from(score);
        if highest.is_none_or(|(_, best)| score > best) {
            highest = Some((record, score));
        }
    }

    #[allow(clippy::cast_precision_loss)]
    {
        summary.average_score = total as f64 / kept.len() as f64;
    }
    summary.highest_risk = highest.map(|(record, _)| record.clone());
    summary.overall_assessment = assessment(&summary);
    summary
}

fn assessment(summary: &RiskSummary) -> String {
    if !summary.high_risk.is_empty() {
        format!(
            "HIGH RISK: {} patents show significant conflict potential. Recommended action: Detailed review by patent attorney and possible claim revision.",
            summary.high_risk.len()
        )
    } else if !summary.medium_risk.is_empty() {
        format!(
            "MEDIUM RISK: {} patents show moderate conflict potential. Recommended action: Consider claim refinement to reduce overlap with existing patents.",
            summary.medium_risk.len()
        )
    } else {
        "LOW RISK: All patents show minimal conflict potential. Recommended action: Proceed with patent application, but monitor for new prior art.".to_string()
    }
}
