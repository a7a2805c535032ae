//! Checkpointed job state and deterministic job identities.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Length of derived job identities, in hex characters.
pub const JOB_ID_HEX_LEN: usize = 8;

/// Derives a job identity.
///
/// An explicit, non-blank identity is used verbatim. Otherwise the identity
/// is the first [`JOB_ID_HEX_LEN`] hex characters of the SHA-256 of
/// `content`, so identical input always maps to the same checkpoint.
#[must_use]
pub fn derive_job_id(explicit: Option<&str>, content: &str) -> String {
    if let Some(id) = explicit.map(str::trim)
        && !id.is_empty()
    {
        return id.to_string();
    }
    let digest = Sha256::digest(content.as_bytes());
    let mut id = hex::encode(digest);
    id.truncate(JOB_ID_HEX_LEN);
    id
}

/// Milliseconds since the Unix epoch.
#[must_use]
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Persisted state of one unit of pipeline work.
///
/// Within one run, `processed` only grows and `completed` never reverts to
/// `false`; [`Job::apply`] preserves both. A full write of a new job starts
/// a new run and replaces them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    /// Job identity.
    pub id: String,
    /// Creation time (ms since epoch).
    #[serde(default)]
    pub created_at: i64,
    /// Time of the last write (ms since epoch).
    pub timestamp: i64,
    /// Accumulated stage outputs.
    #[serde(default)]
    pub data: Value,
    /// Markers of processed items, in processing order, without duplicates.
    #[serde(default)]
    pub processed: Vec<String>,
    /// Whether the job has stored its final result.
    #[serde(default)]
    pub completed: bool,
}

/// A single-field update to a [`Job`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobPatch {
    /// Replace the payload.
    Data(Value),
    /// Add processed markers (existing markers are kept).
    Processed(Vec<String>),
    /// Set the completion flag (`false` never clears a completed job).
    Completed(bool),
}

impl JobPatch {
    /// Name of the patched field, for logging.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::Data(_) => "data",
            Self::Processed(_) => "processed",
            Self::Completed(_) => "completed",
        }
    }
}

impl Job {
    /// Creates a new, incomplete job with the given payload.
    #[must_use]
    pub fn new(id: impl Into<String>, data: Value) -> Self {
        let now = now_millis();
        Self {
            id: id.into(),
            created_at: now,
            timestamp: now,
            data,
            processed: Vec::new(),
            completed: false,
        }
    }

    /// Returns `true` if `marker` has been recorded.
    #[must_use]
    pub fn is_processed(&self, marker: &str) -> bool {
        self.processed.iter().any(|m| m == marker)
    }

    /// Records a processed marker. Returns `false` if it was already present.
    pub fn mark_processed(&mut self, marker: impl Into<String>) -> bool {
        let marker = marker.into();
        if self.is_processed(&marker) {
            return false;
        }
        self.processed.push(marker);
        true
    }

    /// Applies a single-field patch and refreshes the timestamp.
    pub fn apply(&mut self, patch: JobPatch) {
        match patch {
            JobPatch::Data(data) => self.data = data,
            JobPatch::Processed(markers) => {
                for marker in markers {
                    self.mark_processed(marker);
                }
            }
            JobPatch::Completed(done) => self.completed |= done,
        }
        self.touch();
    }

    /// Sets the last-write time to now (never moving backwards).
    pub fn touch(&mut self) {
        self.timestamp = now_millis().max(self.timestamp);
    }
}
