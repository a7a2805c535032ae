//! Write-only result artifacts.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::error::ArtifactError;

/// Default results directory, relative to the working directory.
pub const DEFAULT_RESULTS_DIR: &str = "results";

/// Artifact name for a single-claim job.
#[must_use]
pub fn single_name(job_id: &str) -> String {
    job_id.to_string()
}

/// Artifact name for a multi-claim job.
#[must_use]
pub fn multiple_name(job_id: &str) -> String {
    format!("multiple-{job_id}")
}

/// Artifact name for a raw search.
#[must_use]
pub fn search_name(search_id: &str) -> String {
    format!("search-{search_id}")
}

/// Writes pretty JSON payloads to `<dir>/<name>.json`.
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    dir: PathBuf,
}

impl ArtifactWriter {
    /// Creates a writer rooted at `dir`. The directory is created on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Results directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Serializes `payload` and atomically replaces `<dir>/<name>.json`.
    ///
    /// Returns the path written.
    pub fn write<T: Serialize + ?Sized>(
        &self,
        name: &str,
        payload: &T,
    ) -> Result<PathBuf, ArtifactError> {
        let json = serde_json::to_vec_pretty(payload)?;
        let write_err = |e: &std::io::Error| ArtifactError::Write {
            name: name.to_string(),
            message: e.to_string(),
        };

        fs::create_dir_all(&self.dir).map_err(|e| write_err(&e))?;
        let path = self.dir.join(format!("{name}.json"));
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir).map_err(|e| write_err(&e))?;
        tmp.write_all(&json).map_err(|e| write_err(&e))?;
        tmp.persist(&path).map_err(|e| write_err(&e.error))?;

        info!(path = %path.display(), "results saved");
        Ok(path)
    }
}
