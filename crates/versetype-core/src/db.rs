//! SQLite persistence for progress records.

use crate::store::ProgressStore;
use crate::Result;
use rusqlite::{params, Connection};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use versetype_types::ProgressRecord;

/// How long a writer waits on a locked database before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite-based progress store.
///
/// Each call opens its own connection, so sessions never queue behind a
/// shared handle; SQLite's row upserts keep each (user, collection) write
/// atomic.
pub struct SqliteProgressStore {
    path: PathBuf,
}

impl SqliteProgressStore {
    /// Open or create the database at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let store = Self {
            path: path.to_path_buf(),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn connect(&self) -> Result<Connection> {
        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(conn)
    }

    /// Initialize database schema.
    fn init_schema(&self) -> Result<()> {
        let conn = self.connect()?;
        let _mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS progress (
                user_id TEXT NOT NULL,
                collection TEXT NOT NULL,
                current_index INTEGER NOT NULL DEFAULT 0,
                total_count INTEGER NOT NULL,
                correct INTEGER NOT NULL DEFAULT 0,
                mistakes INTEGER NOT NULL DEFAULT 0,
                updated_at TEXT NOT NULL,
                PRIMARY KEY (user_id, collection)
            );

            CREATE INDEX IF NOT EXISTS idx_progress_user ON progress(user_id);
            "#,
        )?;
        Ok(())
    }

    fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<ProgressRecord> {
        Ok(ProgressRecord {
            current_index: row.get("current_index")?,
            total_count: row.get("total_count")?,
            correct: row.get("correct")?,
            mistakes: row.get("mistakes")?,
        })
    }
}

impl ProgressStore for SqliteProgressStore {
    fn get_or_create(
        &self,
        user_id: &str,
        collection: &str,
        total_count: u32,
    ) -> Result<ProgressRecord> {
        let conn = self.connect()?;
        conn.execute(
            r#"
            INSERT INTO progress (user_id, collection, total_count, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(user_id, collection) DO NOTHING
            "#,
            params![user_id, collection, total_count, chrono::Utc::now().to_rfc3339()],
        )?;
        let record = conn.query_row(
            "SELECT * FROM progress WHERE user_id = ?1 AND collection = ?2",
            params![user_id, collection],
            Self::row_to_record,
        )?;
        Ok(record)
    }

    fn update(
        &self,
        user_id: &str,
        collection: &str,
        record: &ProgressRecord,
    ) -> Result<ProgressRecord> {
        let conn = self.connect()?;
        let merged = conn.query_row(
            r#"
            INSERT INTO progress (
                user_id, collection, current_index, total_count, correct, mistakes, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(user_id, collection) DO UPDATE SET
                current_index = MIN(MAX(current_index, excluded.current_index), excluded.total_count),
                total_count = excluded.total_count,
                correct = MAX(correct, excluded.correct),
                mistakes = MAX(mistakes, excluded.mistakes),
                updated_at = excluded.updated_at
            RETURNING current_index, total_count, correct, mistakes
            "#,
            params![
                user_id,
                collection,
                record.current_index,
                record.total_count,
                record.correct,
                record.mistakes,
                chrono::Utc::now().to_rfc3339(),
            ],
            Self::row_to_record,
        )?;
        Ok(merged)
    }

    fn list_all(&self, user_id: &str) -> Result<HashMap<String, u32>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare("SELECT * FROM progress WHERE user_id = ?1")?;
        let percents = stmt
            .query_map(params![user_id], |row| {
                let collection: String = row.get("collection")?;
                Ok((collection, Self::row_to_record(row)?.percent_complete()))
            })?
            .collect::<std::result::Result<HashMap<_, _>, _>>()?;
        Ok(percents)
    }
}
