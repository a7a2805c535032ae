//! One JSON document per job.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use super::CheckpointStore;
use crate::core::{Job, JobPatch};
use crate::error::CheckpointError;

/// Default checkpoint directory, relative to the working directory.
pub const DEFAULT_CHECKPOINT_DIR: &str = "data/checkpoints";

/// Stores each job at `<dir>/<id>.json`.
///
/// Writes go to a temporary file in the same directory which is then
/// renamed over the target, so a crash never leaves a half-written
/// checkpoint behind.
#[derive(Debug, Clone)]
pub struct FileCheckpointStore {
    dir: PathBuf,
}

impl FileCheckpointStore {
    /// Creates a store rooted at `dir`. The directory is created lazily.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Root directory of this store.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    fn read(&self, id: &str) -> Result<Option<Job>, CheckpointError> {
        let content = match fs::read_to_string(self.path_for(id)) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(persistence(id, &e)),
        };
        Ok(Some(serde_json::from_str(&content)?))
    }

    fn write(&self, job: &Job) -> Result<(), CheckpointError> {
        fs::create_dir_all(&self.dir).map_err(|e| persistence(&job.id, &e))?;
        let json = serde_json::to_vec_pretty(job)?;

        let mut tmp =
            tempfile::NamedTempFile::new_in(&self.dir).map_err(|e| persistence(&job.id, &e))?;
        tmp.write_all(&json)
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|e| persistence(&job.id, &e))?;
        tmp.persist(self.path_for(&job.id))
            .map_err(|e| persistence(&job.id, &e.error))?;

        debug!(job_id = %job.id, bytes = json.len(), "checkpoint written");
        Ok(())
    }
}

fn persistence(id: &str, err: &std::io::Error) -> CheckpointError {
    CheckpointError::Persistence {
        id: id.to_string(),
        message: err.to_string(),
    }
}

impl CheckpointStore for FileCheckpointStore {
    fn exists(&self, id: &str) -> Result<bool, CheckpointError> {
        Ok(self.path_for(id).is_file())
    }

    fn get(&self, id: &str) -> Result<Job, CheckpointError> {
        self.read(id)?.ok_or_else(|| CheckpointError::NotFound { id: id.to_string() })
    }

    fn put(&self, job: &Job) -> Result<Job, CheckpointError> {
        let mut stored = job.clone();
        stored.touch();
        self.write(&stored)?;
        Ok(stored)
    }

    fn patch_field(&self, id: &str, patch: JobPatch) -> Result<Job, CheckpointError> {
        let mut job = self.get(id)?;
        debug!(job_id = id, field = patch.field(), "patching checkpoint");
        job.apply(patch);
        self.write(&job)?;
        Ok(job)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkpoint::contract;
    use tempfile::TempDir;

    fn store() -> (TempDir, FileCheckpointStore) {
        let dir = TempDir::new().unwrap_or_else(|_| unreachable!());
        let store = FileCheckpointStore::new(dir.path().join("checkpoints"));
        (dir, store)
    }

    #[test]
    fn test_roundtrip() {
        let (_dir, store) = store();
        contract::roundtrip(&store);
    }

    #[test]
    fn test_missing() {
        let (_dir, store) = store();
        contract::missing(&store);
    }

    #[test]
    fn test_patch_touches_one_field() {
        let (_dir, store) = store();
        contract::patch_touches_one_field(&store);
    }

    #[test]
    fn test_monotone_fields() {
        let (_dir, store) = store();
        contract::monotone_fields(&store);
    }

    #[test]
    fn test_put_starts_new_run() {
        let (_dir, store) = store();
        contract::put_starts_new_run(&store);
    }

    #[test]
    fn test_bookkeeping_on_missing_job_is_silent() {
        let (_dir, store) = store();
        contract::bookkeeping_on_missing_job_is_silent(&store);
    }

    #[test]
    fn test_file_layout() {
        let (_dir, store) = store();
        store
            .put(&Job::new("abcd1234", serde_json::json!({})))
            .unwrap_or_else(|_| unreachable!());
        let path = store.dir().join("abcd1234.json");
        assert!(path.is_file());
        let raw = fs::read_to_string(path).unwrap_or_default();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap_or_default();
        for key in ["id", "timestamp", "data", "processed", "completed"] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
    }

    #[test]
    fn test_corrupt_checkpoint_is_serialization_error() {
        let (_dir, store) = store();
        fs::create_dir_all(store.dir()).unwrap_or_default();
        fs::write(store.dir().join("bad.json"), "{not json").unwrap_or_default();
        assert!(matches!(
            store.get("bad"),
            Err(CheckpointError::Serialization(_))
        ));
    }
}
