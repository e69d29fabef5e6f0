//! Database schema and initialization

use crate::error::{Result, SemdexError};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Main database handle
///
/// One connection behind a mutex: writers and readers take turns, and a
/// write transaction never outlives a single locked section.
pub struct Database {
    conn: Mutex<Option<Connection>>,
}

pub(crate) const SCHEMA_VERSION: i32 = 1;

const CREATE_TABLES: &str = r#"
-- One row per indexed project-relative path
CREATE TABLE IF NOT EXISTS files (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    path TEXT NOT NULL UNIQUE,
    content_hash TEXT NOT NULL,
    total_chunks INTEGER NOT NULL DEFAULT 0,
    size_bytes INTEGER NOT NULL DEFAULT 0,
    updated_at TEXT NOT NULL
);

-- Line-window chunks, replaced wholesale whenever the file hash changes
CREATE TABLE IF NOT EXISTS chunks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    file_id INTEGER NOT NULL REFERENCES files(id) ON DELETE CASCADE,
    chunk_index INTEGER NOT NULL,
    start_line INTEGER NOT NULL,
    end_line INTEGER NOT NULL,
    content TEXT NOT NULL,
    embedding BLOB NOT NULL,
    UNIQUE(file_id, chunk_index)
);

-- Embedding model stamp (single row)
CREATE TABLE IF NOT EXISTS index_meta (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    embedding_model TEXT NOT NULL,
    dimensions INTEGER NOT NULL,
    created_at TEXT NOT NULL
);

-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY
);

-- Indexes
CREATE INDEX IF NOT EXISTS idx_files_path ON files(path);
CREATE INDEX IF NOT EXISTS idx_files_content_hash ON files(content_hash);
CREATE INDEX IF NOT EXISTS idx_chunks_file_id ON chunks(file_id);
"#;

impl Database {
    /// Open database at path, creating if necessary
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        Ok(Self::from_connection(conn))
    }

    /// Open in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self::from_connection(conn))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(Some(conn)),
        }
    }

    /// Initialize database schema. Safe to call on every startup.
    pub fn initialize(&self) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute_batch(
                "PRAGMA journal_mode = WAL;
                 PRAGMA synchronous = NORMAL;
                 PRAGMA foreign_keys = ON;
                 PRAGMA cache_size = -64000;
                 PRAGMA busy_timeout = 5000;",
            )?;

            conn.execute_batch(CREATE_TABLES)?;

            let current = read_schema_version(conn)?.unwrap_or(0);
            if current > SCHEMA_VERSION {
                return Err(SemdexError::Config(format!(
                    "index schema v{} is newer than supported v{}",
                    current, SCHEMA_VERSION
                )));
            }

            conn.execute(
                "INSERT OR REPLACE INTO schema_version (version) VALUES (?1)",
                params![SCHEMA_VERSION],
            )?;
            Ok(())
        })
    }

    /// Get current schema version
    pub fn schema_version(&self) -> Result<Option<i32>> {
        self.with_conn(read_schema_version)
    }

    /// Release the underlying connection. Later calls fail with `Closed`.
    pub fn close(&self) -> Result<()> {
        let conn = self.lock().take();
        if let Some(conn) = conn {
            conn.close().map_err(|(_, e)| SemdexError::Database(e))?;
        }
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.lock().is_none()
    }

    /// Run `f` against the open connection
    pub(crate) fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let guard = self.lock();
        let conn = guard.as_ref().ok_or(SemdexError::Closed)?;
        f(conn)
    }

    /// Run `f` inside `BEGIN IMMEDIATE` / `COMMIT`, rolling back on error
    pub(crate) fn with_transaction<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T>,
    ) -> Result<T> {
        self.with_conn(|conn| {
            conn.execute("BEGIN IMMEDIATE", [])?;
            let result = f(conn);

            match result {
                Ok(value) => match conn.execute("COMMIT", []) {
                    Ok(_) => Ok(value),
                    Err(e) => {
                        let _ = conn.execute("ROLLBACK", []);
                        Err(e.into())
                    }
                },
                Err(e) => {
                    let _ = conn.execute("ROLLBACK", []);
                    Err(e)
                }
            }
        })
    }

    fn lock(&self) -> MutexGuard<'_, Option<Connection>> {
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn read_schema_version(conn: &Connection) -> Result<Option<i32>> {
    let version = conn
        .query_row(
            "SELECT version FROM schema_version ORDER BY version DESC LIMIT 1",
            [],
            |row| row.get(0),
        )
        .optional()?;
    Ok(version)
}
