//! SQLite Snapshot Store
//!
//! Host-side persistence for scheduler snapshots: one JSON document per
//! learner, upserted on every save.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use rusqlite::{params, Connection, OptionalExtension};

use crate::persistence::StateSink;
use crate::state::SchedulerState;

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Storage error type
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    /// Snapshot could not be encoded or decoded
    #[error("Snapshot encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Invalid timestamp
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),
    /// Initialization error
    #[error("Initialization error: {0}")]
    Init(String),
}

/// Storage result type
pub type Result<T> = std::result::Result<T, StorageError>;

/// One row of [`SnapshotStore::list_learners`]
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnerSummary {
    /// Learner the snapshot belongs to
    pub learner_id: String,
    /// Full tube rotations
    pub cycle_count: u32,
    /// Sum of all scores
    pub total_points: u64,
    /// Number of completion events
    pub completed_count: u64,
    /// Last write
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// SNAPSHOT STORE
// ============================================================================

/// SQLite-backed snapshot store
///
/// All methods take `&self`; the connection sits behind a mutex so the store
/// can be shared as `Arc<SnapshotStore>` between sinks.
pub struct SnapshotStore {
    conn: Mutex<Connection>,
    path: PathBuf,
}

impl SnapshotStore {
    /// Apply PRAGMAs to a connection
    fn configure_connection(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = 5000;",
        )?;
        Ok(())
    }

    /// Default database location for this platform
    pub fn default_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "zenjin", "helix").ok_or_else(|| {
            StorageError::Init("Could not determine project directories".to_string())
        })?;
        let data_dir = proj_dirs.data_dir();
        std::fs::create_dir_all(data_dir)?;
        // Restrict directory permissions to owner-only on Unix
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o700);
            let _ = std::fs::set_permissions(data_dir, perms);
        }
        Ok(data_dir.join("helix.db"))
    }

    /// Open (or create) the store, applying pending migrations
    pub fn open(db_path: Option<PathBuf>) -> Result<Self> {
        let path = match db_path {
            Some(p) => p,
            None => Self::default_path()?,
        };

        let conn = Connection::open(&path)?;
        Self::configure_connection(&conn)?;
        super::migrations::apply_migrations(&conn)?;

        tracing::debug!(path = %path.display(), "Snapshot store opened");

        Ok(Self {
            conn: Mutex::new(conn),
            path,
        })
    }

    /// Database file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StorageError::Init("Connection lock poisoned".into()))
    }

    /// Load a learner's snapshot
    pub fn load(&self, learner_id: &str) -> Result<Option<SchedulerState>> {
        let conn = self.lock()?;
        let json: Option<String> = conn
            .query_row(
                "SELECT state_json FROM scheduler_snapshots WHERE learner_id = ?1",
                params![learner_id],
                |row| row.get(0),
            )
            .optional()?;

        match json {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Insert or replace a learner's snapshot
    pub fn save(&self, learner_id: &str, state: &SchedulerState) -> Result<()> {
        let json = serde_json::to_string(state)?;
        let now = Utc::now().to_rfc3339();

        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO scheduler_snapshots
                (learner_id, state_json, created_at, updated_at, cycle_count, total_points, completed_count)
             VALUES (?1, ?2, ?3, ?3, ?4, ?5, ?6)
             ON CONFLICT(learner_id) DO UPDATE SET
                state_json = excluded.state_json,
                updated_at = excluded.updated_at,
                cycle_count = excluded.cycle_count,
                total_points = excluded.total_points,
                completed_count = excluded.completed_count",
            params![
                learner_id,
                json,
                now,
                state.cycle_count,
                state.total_points as i64,
                state.completed_stitches.len() as i64,
            ],
        )?;
        Ok(())
    }

    /// Remove a learner's snapshot. Returns true if one existed.
    pub fn delete(&self, learner_id: &str) -> Result<bool> {
        let conn = self.lock()?;
        let removed = conn.execute(
            "DELETE FROM scheduler_snapshots WHERE learner_id = ?1",
            params![learner_id],
        )?;
        Ok(removed > 0)
    }

    /// All learners, most recently updated first
    pub fn list_learners(&self) -> Result<Vec<LearnerSummary>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT learner_id, cycle_count, total_points, completed_count, updated_at
             FROM scheduler_snapshots
             ORDER BY updated_at DESC, learner_id ASC",
        )?;

        let rows: Vec<(String, u32, i64, i64, String)> = stmt
            .query_map([], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
            })?
            .collect::<std::result::Result<_, _>>()?;

        rows.into_iter()
            .map(|(learner_id, cycle_count, total_points, completed_count, updated_at)| {
                Ok(LearnerSummary {
                    learner_id,
                    cycle_count,
                    total_points: total_points.max(0) as u64,
                    completed_count: completed_count.max(0) as u64,
                    updated_at: parse_timestamp(&updated_at)?,
                })
            })
            .collect()
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StorageError::InvalidTimestamp(format!("{}: {}", raw, e)))
}

// ============================================================================
// SQLITE SINK
// ============================================================================

/// [`StateSink`] that writes every snapshot for one learner
///
/// Write failures are logged and dropped; the scheduler never waits on or
/// observes persistence.
#[derive(Clone)]
pub struct SqliteSink {
    store: Arc<SnapshotStore>,
    learner_id: String,
}

impl SqliteSink {
    /// Sink for `learner_id` backed by `store`
    pub fn new(store: Arc<SnapshotStore>, learner_id: impl Into<String>) -> Self {
        Self {
            store,
            learner_id: learner_id.into(),
        }
    }

    /// Learner this sink writes for
    pub fn learner_id(&self) -> &str {
        &self.learner_id
    }
}

impl StateSink for SqliteSink {
    fn save(&self, state: &SchedulerState) {
        if let Err(e) = self.store.save(&self.learner_id, state) {
            tracing::warn!("Failed to persist snapshot for {}: {}", self.learner_id, e);
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
