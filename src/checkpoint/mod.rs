//! Durable job state keyed by job identity.
//!
//! [`CheckpointStore`] is the only way pipeline code reads or writes job
//! state. Two backends are provided: [`FileCheckpointStore`] (one JSON
//! document per job) and, with the `sqlite` feature, [`SqliteCheckpointStore`].
//!
//! Primary writes ([`CheckpointStore::put`], [`CheckpointStore::patch_field`])
//! propagate failures. Bookkeeping writes ([`CheckpointStore::append_processed`],
//! [`CheckpointStore::mark_completed`]) log and swallow them: a lost marker
//! only repeats work.
//!
//! There is no cross-process locking. Concurrent runs with the same job
//! identity race and the last writer wins.

mod file;
#[cfg(feature = "sqlite")]
mod sqlite;

pub use file::{DEFAULT_CHECKPOINT_DIR, FileCheckpointStore};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteCheckpointStore;

use tracing::warn;

use crate::core::{Job, JobPatch};
use crate::error::CheckpointError;

/// Key-value persistence of [`Job`] state.
pub trait CheckpointStore: Send + Sync {
    /// Returns `true` if a checkpoint exists for `id`.
    fn exists(&self, id: &str) -> Result<bool, CheckpointError>;

    /// Loads the checkpoint for `id`.
    ///
    /// # Errors
    ///
    /// Returns [`CheckpointError::NotFound`] if no checkpoint exists.
    fn get(&self, id: &str) -> Result<Job, CheckpointError>;

    /// Persists `job` under `job.id`, replacing any stored state.
    ///
    /// Markers and the completion flag are taken from `job`, so a full write
    /// starts a new run. The timestamp is refreshed. Returns the job as
    /// stored.
    fn put(&self, job: &Job) -> Result<Job, CheckpointError>;

    /// Updates a single field of an existing checkpoint.
    ///
    /// # Errors
    ///
    /// Returns [`CheckpointError::NotFound`] if no checkpoint exists.
    fn patch_field(&self, id: &str, patch: JobPatch) -> Result<Job, CheckpointError>;

    /// Records a processed marker. Failures are logged, not returned.
    fn append_processed(&self, id: &str, marker: &str) {
        if let Err(e) = self.patch_field(id, JobPatch::Processed(vec![marker.to_string()])) {
            warn!(job_id = id, marker, error = %e, "failed to record processed marker");
        }
    }

    /// Marks the job completed. Failures are logged, not returned.
    fn mark_completed(&self, id: &str) {
        if let Err(e) = self.patch_field(id, JobPatch::Completed(true)) {
            warn!(job_id = id, error = %e, "failed to mark job completed");
        }
    }

    /// Loads the checkpoint for `id` if one exists.
    fn find(&self, id: &str) -> Result<Option<Job>, CheckpointError> {
        match self.get(id) {
            Ok(job) => Ok(Some(job)),
            Err(CheckpointError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Shared contract tests run against every backend.
#[cfg(test)]
pub(crate) mod contract {
    use super::*;
    use serde_json::json;

    pub fn roundtrip(store: &dyn CheckpointStore) {
        let mut job = Job::new("round", json!({"analysis": {"keywords": ["a"]}}));
        job.mark_processed("0");
        let stored = store.put(&job).unwrap_or_else(|_| unreachable!());
        let loaded = store.get("round").unwrap_or_else(|_| unreachable!());
        assert_eq!(stored, loaded);
        assert_eq!(loaded.data, job.data);
        assert_eq!(loaded.processed, job.processed);
        assert!(!loaded.completed);
    }

    pub fn missing(store: &dyn CheckpointStore) {
        assert!(!store.exists("nope").unwrap_or(true));
        assert!(matches!(
            store.get("nope"),
            Err(CheckpointError::NotFound { .. })
        ));
        assert!(matches!(
            store.patch_field("nope", JobPatch::Completed(true)),
            Err(CheckpointError::NotFound { .. })
        ));
        assert!(store.find("nope").unwrap_or_default().is_none());
    }

    pub fn patch_touches_one_field(store: &dyn CheckpointStore) {
        let job = Job::new("patch", json!({"a": 1}));
        store.put(&job).unwrap_or_else(|_| unreachable!());
        store
            .patch_field("patch", JobPatch::Data(json!({"b": 2})))
            .unwrap_or_else(|_| unreachable!());
        let loaded = store.get("patch").unwrap_or_else(|_| unreachable!());
        assert_eq!(loaded.data, json!({"b": 2}));
        assert!(loaded.processed.is_empty());
        assert!(!loaded.completed);
        assert!(loaded.timestamp >= job.timestamp);
    }

    pub fn monotone_fields(store: &dyn CheckpointStore) {
        let job = Job::new("mono", json!(null));
        store.put(&job).unwrap_or_else(|_| unreachable!());
        store.append_processed("mono", "0");
        store.append_processed("mono", "0");
        store.append_processed("mono", "1");
        store.mark_completed("mono");
        store
            .patch_field("mono", JobPatch::Completed(false))
            .unwrap_or_else(|_| unreachable!());
        store
            .patch_field("mono", JobPatch::Processed(vec!["1".to_string()]))
            .unwrap_or_else(|_| unreachable!());

        let loaded = store.get("mono").unwrap_or_else(|_| unreachable!());
        assert_eq!(loaded.processed, vec!["0", "1"]);
        assert!(loaded.completed);
    }

    pub fn put_starts_new_run(store: &dyn CheckpointStore) {
        let job = Job::new("rerun", json!([1, 2]));
        store.put(&job).unwrap_or_else(|_| unreachable!());
        store.append_processed("rerun", "0");
        store.mark_completed("rerun");

        store
            .put(&Job::new("rerun", json!([])))
            .unwrap_or_else(|_| unreachable!());
        let loaded = store.get("rerun").unwrap_or_else(|_| unreachable!());
        assert_eq!(loaded.data, json!([]));
        assert!(loaded.processed.is_empty());
        assert!(!loaded.completed);
    }

    pub fn bookkeeping_on_missing_job_is_silent(store: &dyn CheckpointStore) {
        store.append_processed("ghost", "0");
        store.mark_completed("ghost");
        assert!(!store.exists("ghost").unwrap_or(true));
    }
}
