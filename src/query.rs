//! Boolean query construction from a claim analysis.
//!
//! Pure functions, no I/O. The query uses Project PQ field syntax:
//! `ABST/"..."` (abstract), `TTL/"..."` (title), `CPC/...`, `IPC/...`.

use crate::core::{ClaimAnalysis, SearchQuery};

/// Date range applied when the caller does not supply one.
pub const DEFAULT_DATE_RANGE: &str = "last_10_years";

/// Normalizes a date range for the query language.
///
/// Bracketed (`[2015-01-01 TO 2020-12-31]`) and named (`last_5_years`)
/// ranges pass through unchanged; anything else is wrapped in brackets.
#[must_use]
pub fn normalize_date_range(range: &str) -> String {
    let range = range.trim();
    if (range.starts_with('[') && range.ends_with(']')) || range.starts_with("last_") {
        range.to_string()
    } else {
        format!("[{range}]")
    }
}

fn or_group<I>(terms: I) -> Option<String>
where
    I: IntoIterator<Item = String>,
{
    let terms: Vec<String> = terms.into_iter().collect();
    if terms.is_empty() {
        None
    } else {
        Some(format!("({})", terms.join(" OR ")))
    }
}

/// Builds the search query for `analysis`.
///
/// Clauses appear in a fixed order (keywords, concepts, CPC codes, IPC
/// codes), each an OR group, joined with `AND`. The normalized date range
/// is appended last. An analysis with nothing to search for yields an
/// empty query, without a date clause.
#[must_use]
pub fn build_query(analysis: &ClaimAnalysis, date_range: Option<&str>) -> SearchQuery {
    let clauses: Vec<String> = [
        or_group(analysis.keywords.iter().map(|k| format!("ABST/\"{k}\""))),
        or_group(
            analysis
                .concepts
                .iter()
                .map(|c| format!("(ABST/\"{c}\" OR TTL/\"{c}\")")),
        ),
        or_group(analysis.cpc_classes.iter().map(|code| format!("CPC/{code}"))),
        or_group(analysis.ipc_classes.iter().map(|code| format!("IPC/{code}"))),
    ]
    .into_iter()
    .flatten()
    .collect();

    if clauses.is_empty() {
        return SearchQuery::default();
    }

    let mut query = clauses.join(" AND ");
    if let Some(range) = date_range.map(str::trim).filter(|r| !r.is_empty()) {
        query.push_str(" AND ");
        query.push_str(&normalize_date_range(range));
    }
    SearchQuery::new(query)
}

/// Appends ` AND <range>` to a raw query unless the range already appears
/// in it.
#[must_use]
pub fn with_date_range(query: &str, date_range: Option<&str>) -> String {
    let query = query.trim();
    match date_range.map(str::trim).filter(|r| !r.is_empty()) {
        Some(range) => {
            let range = normalize_date_range(range);
            if query.contains(&range) {
                query.to_string()
            } else if query.is_empty() {
                range
            } else {
                format!("{query} AND {range}")
            }
        }
        None => query.to_string(),
    }
}
