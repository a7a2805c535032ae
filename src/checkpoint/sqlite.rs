//! SQLite-backed checkpoint store, one row per job.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{Connection, OptionalExtension, params};
use tracing::debug;

use super::CheckpointStore;
use crate::core::{Job, JobPatch};
use crate::error::CheckpointError;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS jobs (
    id         TEXT PRIMARY KEY NOT NULL,
    created_at INTEGER NOT NULL,
    timestamp  INTEGER NOT NULL,
    data       TEXT NOT NULL,
    processed  TEXT NOT NULL,
    completed  INTEGER NOT NULL DEFAULT 0
);
";

/// Checkpoint store backed by a single SQLite database.
pub struct SqliteCheckpointStore {
    conn: Mutex<Connection>,
}

impl std::fmt::Debug for SqliteCheckpointStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteCheckpointStore").finish_non_exhaustive()
    }
}

impl SqliteCheckpointStore {
    /// Opens (or creates) a database file and ensures the schema exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CheckpointError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| CheckpointError::Persistence {
                id: path.display().to_string(),
                message: e.to_string(),
            })?;
        }
        Self::init(Connection::open(path)?)
    }

    /// Opens an in-memory database.
    pub fn in_memory() -> Result<Self, CheckpointError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, CheckpointError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, CheckpointError> {
        self.conn.lock().map_err(|e| CheckpointError::Persistence {
            id: String::new(),
            message: format!("connection lock poisoned: {e}"),
        })
    }
}

fn load(conn: &Connection, id: &str) -> Result<Option<Job>, CheckpointError> {
    let row = conn
        .query_row(
            "SELECT created_at, timestamp, data, processed, completed FROM jobs WHERE id = ?1",
            params![id],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, bool>(4)?,
                ))
            },
        )
        .optional()?;

    let Some((created_at, timestamp, data, processed, completed)) = row else {
        return Ok(None);
    };
    Ok(Some(Job {
        id: id.to_string(),
        created_at,
        timestamp,
        data: serde_json::from_str(&data)?,
        processed: serde_json::from_str(&processed)?,
        completed,
    }))
}

fn save(conn: &Connection, job: &Job) -> Result<(), CheckpointError> {
    conn.execute(
        "INSERT INTO jobs (id, created_at, timestamp, data, processed, completed)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(id) DO UPDATE SET
             timestamp = excluded.timestamp,
             data = excluded.data,
             processed = excluded.processed,
             completed = excluded.completed",
        params![
            job.id,
            job.created_at,
            job.timestamp,
            serde_json::to_string(&job.data)?,
            serde_json::to_string(&job.processed)?,
            job.completed,
        ],
    )?;
    debug!(job_id = %job.id, "checkpoint row written");
    Ok(())
}

impl CheckpointStore for SqliteCheckpointStore {
    fn exists(&self, id: &str) -> Result<bool, CheckpointError> {
        let conn = self.lock()?;
        let found: Option<i64> = conn
            .query_row("SELECT 1 FROM jobs WHERE id = ?1", params![id], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(found.is_some())
    }

    fn get(&self, id: &str) -> Result<Job, CheckpointError> {
        let conn = self.lock()?;
        load(&conn, id)?.ok_or_else(|| CheckpointError::NotFound { id: id.to_string() })
    }

    fn put(&self, job: &Job) -> Result<Job, CheckpointError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let mut stored = job.clone();
        stored.touch();
        save(&tx, &stored)?;
        tx.commit()?;
        Ok(stored)
    }

    fn patch_field(&self, id: &str, patch: JobPatch) -> Result<Job, CheckpointError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let mut job =
            load(&tx, id)?.ok_or_else(|| CheckpointError::NotFound { id: id.to_string() })?;
        job.apply(patch);
        save(&tx, &job)?;
        tx.commit()?;
        Ok(job)
    }
}
