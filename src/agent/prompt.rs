//! System prompts and template builders for the reasoning stages.
//!
//! System prompts fix each agent's role. Template builders format the
//! per-call user message with claim text and record batches.

use std::fmt::Write;

/// System prompt for the claim analysis agent.
pub const ANALYSIS_SYSTEM_PROMPT: &str = "You are a patent search specialist. You read patent claims and extract the technical vocabulary and classification codes a prior-art search needs. You answer with JSON only.";

/// System prompt for the conflict-risk scoring agent.
pub const SCORING_SYSTEM_PROMPT: &str = "You are a patent analyst assessing how strongly existing patents conflict with a proposed claim. You score consistently across every batch of one conversation and answer with JSON only.";

/// System prompt for the claim splitting agent.
pub const SPLITTER_SYSTEM_PROMPT: &str =
    "You separate documents containing several patent claims into individual claims. You answer with a JSON array only.";

/// Builds the analysis prompt for one claim.
#[must_use]
pub fn build_analysis_prompt(claim_text: &str, independent: bool) -> String {
    format!(
        "Please analyze the following patent claim and extract key information.\n\n\
         Patent Claim:\n\"{claim_text}\"\n\n\
         Is this an independent claim: {}\n\n\
         Instructions:\n\
         1. Identify key technical terms and phrases in the claim.\n\
         2. Identify broader concepts related to the claim.\n\
         3. If possible, suggest relevant CPC (Cooperative Patent Classification) and \
         IPC (International Patent Classification) codes.\n\n\
         Provide your analysis in the following JSON format with no additional text:\n\
         {{\n  \"keywords\": [\"keyword1\", \"keyword2\", ...],\n  \
         \"concepts\": [\"concept1\", \"concept2\", ...],\n  \
         \"cpcClasses\": [\"code1\", \"code2\", ...],\n  \
         \"ipcClasses\": [\"code1\", \"code2\", ...]\n}}\n\n\
         Notes:\n\
         - Include 5-10 of the most relevant keywords\n\
         - Include 3-5 broader concepts\n\
         - Only include classification codes if you have high confidence in their accuracy\n\
         - Respond with valid, parseable JSON only",
        if independent { "Yes" } else { "No" }
    )
}

/// One record as presented to the scoring agent.
#[derive(Debug, Clone, Copy)]
pub struct ScoringItem<'a> {
    /// Position in the full record list.
    pub index: usize,
    /// Record identifier.
    pub patent_number: &'a str,
    /// Record title.
    pub title: &'a str,
    /// Record abstract (may be empty).
    pub abstract_text: &'a str,
}

fn write_batch(prompt: &mut String, batch: &[ScoringItem<'_>]) {
    for item in batch {
        let abstract_text = if item.abstract_text.trim().is_empty() {
            "No abstract available"
        } else {
            item.abstract_text
        };
        let _ = write!(
            prompt,
            "\nPATENT {number}:\n\
             Index: {index}\n\
             Patent Number: {patent}\n\
             Title: {title}\n\
             Abstract: {abstract_text}\n",
            number = item.index + 1,
            index = item.index,
            patent = item.patent_number,
            title = item.title,
        );
    }
}

/// Builds the prompt for the first scoring batch.
///
/// Carries the claim text, the scoring scale, and the exact response shape;
/// later batches rely on the conversation to carry these forward.
#[must_use]
pub fn build_first_batch_prompt(claim_text: &str, batch: &[ScoringItem<'_>]) -> String {
    let mut prompt = format!(
        "I need you to analyze the potential patent conflict risks between a proposed \
         patent claim and existing patents.\n\n\
         CLAIM TEXT:\n\"{claim_text}\"\n\n\
         I will provide patents in batches. For each patent:\n\
         1. Assess the conflict risk on a scale of 1-10, where:\n   \
         - 1-3: Low risk of conflict\n   \
         - 4-6: Medium risk of conflict\n   \
         - 7-10: High risk of conflict\n\
         2. Provide a brief explanation (1-2 sentences) for your risk assessment.\n\n\
         Here is the first batch of patents:\n"
    );
    write_batch(&mut prompt, batch);
    prompt.push_str(
        "\nIMPORTANT: Format your response as valid JSON with this EXACT structure:\n\
         {\n  \"patentAssessments\": [\n    {\n      \"index\": 0,\n      \
         \"patentNumber\": \"US1234567A\",\n      \"riskScore\": 7,\n      \
         \"explanation\": \"High overlap in core methodology and application area.\"\n    \
         }\n  ]\n}\n\n\
         Your response must:\n\
         1. Start with the opening brace {\n\
         2. End with the closing brace }\n\
         3. Contain ONLY valid JSON\n\
         4. Include ALL patents in this batch\n\
         5. Use the exact field names shown above\n\
         6. Use integers for the index and riskScore fields\n",
    );
    prompt
}

/// Builds the prompt for a later scoring batch covering indices
/// `start..end`.
#[must_use]
pub fn build_next_batch_prompt(batch: &[ScoringItem<'_>], start: usize, end: usize) -> String {
    let mut prompt = String::from(
        "Here is the next batch of patents to assess for conflict risk with the same claim:\n",
    );
    write_batch(&mut prompt, batch);
    let _ = write!(
        prompt,
        "\nPlease maintain consistency with your previous assessments. Format your response \
         as valid JSON with the same structure as before.\n\
         IMPORTANT: The \"index\" field must match the original index of each patent \
         ({start} to {last} for this batch).\n\
         Do not include any text before or after the JSON.\n",
        last = end.saturating_sub(1),
    );
    prompt
}

/// Builds the prompt that splits a multi-claim document into claims.
#[must_use]
pub fn build_split_prompt(document: &str) -> String {
    format!(
        "I have a text file containing multiple patent claims. Please identify and separate \
         each individual patent claim.\n\
         Output the claims as a JSON array of strings where each string is a separate claim.\n\
         Do not include any other text in your response, just the JSON array.\n\n\
         Here is the text:\n{document}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items() -> Vec<ScoringItem<'static>> {
        vec![
            ScoringItem {
                index: 20,
                patent_number: "US 1111111 B2",
                title: "Widget",
                abstract_text: "",
            },
            ScoringItem {
                index: 21,
                patent_number: "US 2222222 A1",
                title: "Gadget",
                abstract_text: "A gadget with a lever.",
            },
        ]
    }

    #[test]
    fn test_analysis_prompt() {
        let prompt = build_analysis_prompt("A method for sorting", false);
        assert!(prompt.contains("\"A method for sorting\""));
        assert!(prompt.contains("independent claim: No"));
        assert!(prompt.contains("\"cpcClasses\""));
    }

    #[test]
    fn test_first_batch_prompt() {
        let prompt = build_first_batch_prompt("A claim", &items());
        assert!(prompt.contains("CLAIM TEXT:\n\"A claim\""));
        assert!(prompt.contains("7-10: High risk"));
        assert!(prompt.contains("PATENT 21:"));
        assert!(prompt.contains("Abstract: No abstract available"));
        assert!(prompt.contains("\"patentAssessments\""));
    }

    #[test]
    fn test_next_batch_prompt() {
        let prompt = build_next_batch_prompt(&items(), 20, 22);
        assert!(prompt.contains("(20 to 21 for this batch)"));
        assert!(prompt.contains("Patent Number: US 2222222 A1"));
        assert!(!prompt.contains("CLAIM TEXT"));
    }

    #[test]
    fn test_split_prompt() {
        let prompt = build_split_prompt("1. A device.\n2. The device of claim 1.");
        assert!(prompt.contains("JSON array of strings"));
        assert!(prompt.ends_with("2. The device of claim 1."));
    }
}
