//! Scripted providers shared by the integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use serde_json::{Value, json};
use tempfile::TempDir;

use claimcheck::agent::prompt::{
    ANALYSIS_SYSTEM_PROMPT, SCORING_SYSTEM_PROMPT, SPLITTER_SYSTEM_PROMPT,
};
use claimcheck::agent::{AgentConfig, ChatRequest, ChatResponse, LlmProvider};
use claimcheck::artifact::ArtifactWriter;
use claimcheck::checkpoint::{CheckpointStore, FileCheckpointStore};
use claimcheck::core::{Record, SearchQuery, Source};
use claimcheck::error::ProviderError;
use claimcheck::pipeline::Pipeline;
use claimcheck::retry::RetryPolicy;
use claimcheck::search::{RecordProvider, SearchOrchestrator};

/// Which agent issued a reasoning call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Analysis,
    Scoring,
    Split,
}

/// Reasoning provider that answers each agent with canned JSON.
///
/// Scoring calls echo back every `Index: n` of the prompt with score
/// `n % 10 + 1`.
pub struct ScriptedLlm {
    analysis: Value,
    claims: Vec<String>,
    fail_on: Option<String>,
    calls: Mutex<Vec<(CallKind, usize)>>,
}

impl ScriptedLlm {
    pub fn new(analysis: Value) -> Self {
        Self {
            analysis,
            claims: Vec::new(),
            fail_on: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_claims(mut self, claims: &[&str]) -> Self {
        self.claims = claims.iter().map(|c| (*c).to_string()).collect();
        self
    }

    /// Fails, without retry, every analysis of a claim containing `text`.
    pub fn failing_on(mut self, text: &str) -> Self {
        self.fail_on = Some(text.to_string());
        self
    }

    /// Calls made so far, with the history length each one replayed.
    pub fn calls(&self) -> Vec<(CallKind, usize)> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn count(&self, kind: CallKind) -> usize {
        self.calls().iter().filter(|(k, _)| *k == kind).count()
    }

    pub fn histories(&self, kind: CallKind) -> Vec<usize> {
        self.calls()
            .into_iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, h)| h)
            .collect()
    }
}

/// A typical analysis response.
pub fn rotor_analysis() -> Value {
    json!({
        "keywords": ["rotor blade", "pitch actuator"],
        "concepts": ["wind turbine"],
        "cpcClasses": ["F03D7/02"],
        "ipcClasses": []
    })
}

#[async_trait]
impl LlmProvider for ScriptedLlm {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, ProviderError> {
        let system = request
            .messages
            .first()
            .map(|m| m.content.as_str())
            .unwrap_or_default();
        let kind = if system == SCORING_SYSTEM_PROMPT {
            CallKind::Scoring
        } else if system == SPLITTER_SYSTEM_PROMPT {
            CallKind::Split
        } else {
            assert_eq!(system, ANALYSIS_SYSTEM_PROMPT);
            CallKind::Analysis
        };
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((kind, request.history_len()));
        }

        if kind == CallKind::Analysis
            && let Some(text) = &self.fail_on
            && request.prompt().unwrap_or_default().contains(text.as_str())
        {
            return Err(ProviderError::InvalidRequest {
                message: format!("analysis of '{text}' rejected"),
            });
        }

        let content = match kind {
            CallKind::Analysis => format!("Here is the analysis:\n{}", self.analysis),
            CallKind::Split => json!(self.claims).to_string(),
            CallKind::Scoring => {
                let re = Regex::new(r"Index: (\d+)").unwrap_or_else(|_| unreachable!());
                let prompt = request.prompt().unwrap_or_default();
                let entries: Vec<Value> = re
                    .captures_iter(prompt)
                    .filter_map(|c| c[1].parse::<usize>().ok())
                    .map(|i| {
                        json!({
                            "index": i,
                            "patentNumber": format!("P{i}"),
                            "riskScore": i % 10 + 1,
                            "explanation": format!("assessment {i}")
                        })
                    })
                    .collect();
                json!({ "patentAssessments": entries }).to_string()
            }
        };
        Ok(ChatResponse {
            content,
            ..ChatResponse::default()
        })
    }
}

/// Record provider returning `count` records.
pub struct StaticRecords {
    pub source: Source,
    pub count: usize,
    pub calls: AtomicU32,
}

impl StaticRecords {
    pub fn new(source: Source, count: usize) -> Self {
        Self {
            source,
            count,
            calls: AtomicU32::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecordProvider for StaticRecords {
    fn source(&self) -> Source {
        self.source
    }

    async fn search(&self, _query: &SearchQuery) -> Result<Vec<Record>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok((0..self.count)
            .map(|i| Record {
                patent_number: format!("{}-{i}", self.source),
                title: format!("Record {i}"),
                abstract_text: format!("Abstract {i}"),
                ..Record::default()
            })
            .collect())
    }
}

/// Record provider that is always unreachable.
pub struct FailingRecords {
    pub source: Source,
    pub calls: AtomicU32,
}

impl FailingRecords {
    pub fn new(source: Source) -> Self {
        Self {
            source,
            calls: AtomicU32::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecordProvider for FailingRecords {
    fn source(&self) -> Source {
        self.source
    }

    async fn search(&self, _query: &SearchQuery) -> Result<Vec<Record>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(ProviderError::Transient {
            provider: self.source.to_string(),
            message: "service unavailable".to_string(),
            status: Some(503),
        })
    }
}

fn fast(policy: RetryPolicy) -> RetryPolicy {
    policy.with_delays(Duration::from_millis(1), Duration::from_millis(2))
}

/// A pipeline over scripted providers, storing under `dir`.
pub struct Harness {
    pub pipeline: Pipeline,
    pub store: Arc<FileCheckpointStore>,
    pub results_dir: std::path::PathBuf,
}

pub fn harness(
    dir: &TempDir,
    llm: Arc<ScriptedLlm>,
    providers: Vec<Arc<dyn RecordProvider>>,
) -> Harness {
    let config = AgentConfig::builder()
        .api_key("test-key")
        .batch_size(20)
        .retry(fast(RetryPolicy::reasoning().with_max_attempts(3)))
        .build()
        .unwrap_or_else(|_| unreachable!());
    let store = Arc::new(FileCheckpointStore::new(dir.path().join("checkpoints")));
    let results_dir = dir.path().join("results");
    let pipeline = Pipeline::new(
        llm,
        &config,
        SearchOrchestrator::new(providers, fast(RetryPolicy::record_provider())),
        Arc::clone(&store) as Arc<dyn CheckpointStore>,
        ArtifactWriter::new(&results_dir),
    );
    Harness {
        pipeline,
        store,
        results_dir,
    }
}
