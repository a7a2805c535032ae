//! Output rendering for CLI results.

#![allow(clippy::format_push_string)]

use std::fmt::Write as _;

use serde::Serialize;

use crate::core::{ClaimAnalysis, Record, RiskSummary, SourceCounts};
use crate::error::CommandError;
use crate::pipeline::{ClaimResult, NumberedClaimResult, SearchReport};

/// Output format for CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable report.
    #[default]
    Text,
    /// Pretty-printed JSON payload.
    Json,
}

impl OutputFormat {
    /// Parses a format name, falling back to text.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

/// Renders `payload` as pretty JSON.
pub fn to_json<T: Serialize + ?Sized>(payload: &T) -> Result<String, CommandError> {
    serde_json::to_string_pretty(payload)
        .map_err(|e| CommandError::OutputFormat(format!("JSON serialization failed: {e}")))
}

fn heading(out: &mut String, title: &str, underline: char) {
    out.push_str(title);
    out.push('\n');
    out.extend(std::iter::repeat_n(underline, title.len()));
    out.push_str("\n\n");
}

fn list(out: &mut String, label: &str, items: &[String], always: bool) {
    if items.is_empty() && !always {
        return;
    }
    out.push_str(label);
    out.push_str(":\n");
    for item in items {
        let _ = writeln!(out, "- {item}");
    }
    out.push('\n');
}

fn analysis(out: &mut String, analysis: &ClaimAnalysis) {
    let _ = writeln!(out, "Claim Text: {}\n", analysis.claim_text);
    list(out, "Keywords", &analysis.keywords, true);
    list(out, "Concepts", &analysis.concepts, true);
    list(out, "CPC Classes", &analysis.cpc_classes, false);
    list(out, "IPC Classes", &analysis.ipc_classes, false);
}

fn records(out: &mut String, records: &[Record]) {
    if records.is_empty() {
        out.push_str("No results found.\n\n");
        return;
    }
    for (i, record) in records.iter().enumerate() {
        let _ = writeln!(out, "Result {}:", i + 1);
        let _ = writeln!(out, "Title: {}", record.title);
        let _ = writeln!(out, "Patent Number: {}", record.patent_number);
        let _ = writeln!(out, "Publication Date: {}", record.publication_date);
        let _ = writeln!(out, "Assignee: {}", record.assignee);
        let _ = writeln!(out, "Inventors: {}", record.inventors.join(", "));
        if let Some(source) = record.source {
            let _ = writeln!(out, "Source: {source}");
        }
        let _ = writeln!(out, "Abstract: {}", record.abstract_text);
        if let Some(score) = record.risk_score {
            let _ = writeln!(out, "Conflict Risk: {score}/10");
            let _ = writeln!(
                out,
                "Risk Assessment: {}",
                record.risk_explanation.as_deref().unwrap_or_default()
            );
        }
        out.push('\n');
    }
}

fn sources(out: &mut String, counts: &SourceCounts) {
    for (source, count) in &counts.per_source {
        let _ = writeln!(out, "{source}: {count} results");
    }
    let _ = writeln!(out, "Total: {} results\n", counts.total);
}

fn summary(out: &mut String, summary: &RiskSummary) {
    heading(out, "RISK SUMMARY", '=');
    let _ = writeln!(out, "Total Patents Analyzed: {}", summary.total_analyzed);
    let _ = writeln!(out, "Average Risk Score: {:.2}/10", summary.average_score);
    let _ = writeln!(out, "High Risk Patents: {}", summary.high_risk.len());
    let _ = writeln!(out, "Medium Risk Patents: {}", summary.medium_risk.len());
    let _ = writeln!(out, "Low Risk Patents: {}\n", summary.low_risk.len());
    if let Some(top) = &summary.highest_risk {
        let _ = writeln!(
            out,
            "Highest Risk Patent: {} ({}) - Risk Score: {}/10\n",
            top.patent_number,
            top.title,
            top.risk_score.unwrap_or_default()
        );
    }
    let _ = writeln!(out, "Overall Assessment: {}\n", summary.overall_assessment);
}

fn claim_body(out: &mut String, result: &ClaimResult) {
    analysis(out, &result.analysis);
    heading(out, "GENERATED QUERY", '=');
    let _ = writeln!(out, "{}\n", result.query.query);
    if let Some(found) = &result.search_results {
        heading(out, "SEARCH RESULTS", '=');
        if let Some(counts) = &result.sources {
            sources(out, counts);
        }
        records(out, found);
    }
    if let Some(risk) = &result.risk_summary {
        summary(out, risk);
    }
}

/// Renders a single-claim result.
#[must_use]
pub fn format_claim(result: &ClaimResult) -> String {
    let mut out = String::new();
    heading(&mut out, "CLAIM ANALYSIS", '=');
    claim_body(&mut out, result);
    out
}

/// Renders a multi-claim result.
#[must_use]
pub fn format_claims(results: &[NumberedClaimResult]) -> String {
    let mut out = String::new();
    heading(&mut out, "MULTIPLE CLAIM ANALYSIS", '=');
    for entry in results {
        heading(&mut out, &format!("CLAIM {}", entry.claim_number), '-');
        claim_body(&mut out, &entry.result);
    }
    out
}

/// Renders a raw search report.
#[must_use]
pub fn format_search(report: &SearchReport) -> String {
    let mut out = String::new();
    heading(&mut out, "SEARCH QUERY", '=');
    let _ = writeln!(out, "{}\n", report.query);
    heading(&mut out, "SOURCES", '=');
    sources(&mut out, &report.sources);
    heading(&mut out, "SEARCH RESULTS", '=');
    records(&mut out, &report.results);
    if let Some(risk) = &report.risk_summary {
        summary(&mut out, risk);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{SearchQuery, Source};

    fn claim_result() -> ClaimResult {
        let mut result = ClaimResult::analyzed(
            ClaimAnalysis {
                claim_text: "A rotor.".to_string(),
                keywords: vec!["rotor".to_string()],
                ..ClaimAnalysis::default()
            },
            SearchQuery::new("(ABST/\"rotor\")"),
        );
        result.search_results = Some(vec![Record {
            patent_number: "US 1 B2".to_string(),
            risk_score: Some(8),
            risk_explanation: Some("same rotor".to_string()),
            source: Some(Source::Lens),
            ..Record::default()
        }]);
        result.risk_summary = Some(crate::aggregate::summarize_risk(
            result.search_results.as_deref().unwrap_or_default(),
            0,
        ));
        result
    }

    #[test]
    fn test_format_parse() {
        assert_eq!(OutputFormat::parse("JSON"), OutputFormat::Json);
        assert_eq!(OutputFormat::parse("text"), OutputFormat::Text);
        assert_eq!(OutputFormat::parse("yaml"), OutputFormat::Text);
    }

    #[test]
    fn test_claim_text_sections() {
        let text = format_claim(&claim_result());
        assert!(text.starts_with("CLAIM ANALYSIS\n==============\n"));
        assert!(text.contains("- rotor"));
        assert!(!text.contains("CPC Classes"));
        assert!(text.contains("Conflict Risk: 8/10"));
        assert!(text.contains("Risk Assessment: same rotor"));
        assert!(text.contains("Overall Assessment: HIGH RISK"));
    }

    #[test]
    fn test_analysis_only_has_no_results_section() {
        let result = ClaimResult::analyzed(ClaimAnalysis::default(), SearchQuery::default());
        let text = format_claim(&result);
        assert!(!text.contains("SEARCH RESULTS"));
        assert!(!text.contains("RISK SUMMARY"));
    }

    #[test]
    fn test_search_report_lists_sources() {
        let mut counts = SourceCounts::default();
        counts.record(Source::ProjectPq, 0);
        let report = SearchReport {
            query: "q AND last_10_years".to_string(),
            sources: counts,
            ..SearchReport::default()
        };
        let text = format_search(&report);
        assert!(text.contains("projectpq: 0 results"));
        assert!(text.contains("No results found."));
    }

    #[test]
    fn test_json_is_pretty() {
        let json = to_json(&claim_result()).unwrap_or_default();
        assert!(json.contains("\n  \"analysis\""));
    }
}
