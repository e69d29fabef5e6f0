//! Indexed file operations
//!
//! `upsert_file` is the only write path for a file and its chunks, and
//! `remove_file` the only delete path. Both run in a single transaction.

use super::meta::read_index_meta;
use super::vectors::embedding_to_bytes;
use super::Database;
use crate::error::{Result, SemdexError};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;

/// Indexed file record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexedFile {
    pub id: i64,
    pub path: String,
    pub content_hash: String,
    pub total_chunks: usize,
    pub size_bytes: u64,
    pub updated_at: String,
}

/// One chunk with its precomputed embedding
#[derive(Debug, Clone)]
pub struct ChunkInsert {
    pub chunk_index: usize,
    pub start_line: usize,
    pub end_line: usize,
    pub content: String,
    pub embedding: Vec<f32>,
}

/// Everything needed to replace a file's index entry in one transaction
#[derive(Debug, Clone)]
pub struct FileUpsert {
    pub path: String,
    pub content_hash: String,
    pub size_bytes: u64,
    pub chunks: Vec<ChunkInsert>,
}

impl Database {
    /// Insert or update a file and replace all of its chunks atomically.
    ///
    /// Readers see either the previous chunk set or the new one, never a mix.
    /// Returns the file id.
    pub fn upsert_file(&self, file: &FileUpsert) -> Result<i64> {
        let now = Utc::now().to_rfc3339();

        self.with_transaction(|conn| {
            check_dimensions(conn, file)?;

            conn.execute(
                "INSERT INTO files (path, content_hash, total_chunks, size_bytes, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(path) DO UPDATE SET
                    content_hash = excluded.content_hash,
                    total_chunks = excluded.total_chunks,
                    size_bytes = excluded.size_bytes,
                    updated_at = excluded.updated_at",
                params![
                    file.path,
                    file.content_hash,
                    file.chunks.len() as i64,
                    file.size_bytes as i64,
                    now
                ],
            )?;

            let file_id: i64 = conn.query_row(
                "SELECT id FROM files WHERE path = ?1",
                params![file.path],
                |row| row.get(0),
            )?;

            conn.execute("DELETE FROM chunks WHERE file_id = ?1", params![file_id])?;

            let mut stmt = conn.prepare_cached(
                "INSERT INTO chunks (file_id, chunk_index, start_line, end_line, content, embedding)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for chunk in &file.chunks {
                stmt.execute(params![
                    file_id,
                    chunk.chunk_index as i64,
                    chunk.start_line as i64,
                    chunk.end_line as i64,
                    chunk.content,
                    embedding_to_bytes(&chunk.embedding),
                ])?;
            }

            Ok(file_id)
        })
    }

    /// Delete a file; its chunks go with it via ON DELETE CASCADE.
    /// Returns whether a row was removed.
    pub fn remove_file(&self, path: &str) -> Result<bool> {
        self.with_transaction(|conn| {
            let rows = conn.execute("DELETE FROM files WHERE path = ?1", params![path])?;
            Ok(rows > 0)
        })
    }

    /// Stored content hash for a path
    pub fn file_hash(&self, path: &str) -> Result<Option<String>> {
        self.with_conn(|conn| {
            let hash = conn
                .query_row(
                    "SELECT content_hash FROM files WHERE path = ?1",
                    params![path],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(hash)
        })
    }

    /// Get a file record by path
    pub fn get_file(&self, path: &str) -> Result<Option<IndexedFile>> {
        self.with_conn(|conn| {
            let file = conn
                .query_row(
                    "SELECT id, path, content_hash, total_chunks, size_bytes, updated_at
                     FROM files WHERE path = ?1",
                    params![path],
                    row_to_file,
                )
                .optional()?;
            Ok(file)
        })
    }

    /// All indexed paths, sorted
    pub fn indexed_paths(&self) -> Result<Vec<String>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT path FROM files ORDER BY path")?;
            let paths = stmt
                .query_map([], |row| row.get(0))?
                .collect::<std::result::Result<Vec<String>, _>>()?;
            Ok(paths)
        })
    }

    /// All file records, sorted by path
    pub fn list_files(&self) -> Result<Vec<IndexedFile>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, path, content_hash, total_chunks, size_bytes, updated_at
                 FROM files ORDER BY path",
            )?;
            let files = stmt
                .query_map([], row_to_file)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(files)
        })
    }

    /// Drop every file, chunk and the model stamp
    pub fn clear(&self) -> Result<usize> {
        self.with_transaction(|conn| {
            let rows = conn.execute("DELETE FROM files", [])?;
            conn.execute("DELETE FROM index_meta", [])?;
            Ok(rows)
        })
    }
}

fn check_dimensions(conn: &Connection, file: &FileUpsert) -> Result<()> {
    let Some(first) = file.chunks.first() else {
        return Ok(());
    };

    let (expected, expected_model) = match read_index_meta(conn)? {
        Some(meta) => (meta.dimensions, meta.embedding_model),
        None => (first.embedding.len(), "unstamped".to_string()),
    };

    if let Some(bad) = file.chunks.iter().find(|c| c.embedding.len() != expected) {
        return Err(SemdexError::ProviderMismatch {
            expected,
            expected_model,
            found: bad.embedding.len(),
            found_model: format!("chunk {} of {}", bad.chunk_index, file.path),
        });
    }
    Ok(())
}

fn row_to_file(row: &rusqlite::Row<'_>) -> rusqlite::Result<IndexedFile> {
    Ok(IndexedFile {
        id: row.get(0)?,
        path: row.get(1)?,
        content_hash: row.get(2)?,
        total_chunks: row.get::<_, i64>(3)? as usize,
        size_bytes: row.get::<_, i64>(4)? as u64,
        updated_at: row.get(5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();
        db.stamp_index("test-model", 3).unwrap();
        db
    }

    fn chunk(index: usize, text: &str) -> ChunkInsert {
        ChunkInsert {
            chunk_index: index,
            start_line: index * 10 + 1,
            end_line: index * 10 + 10,
            content: text.to_string(),
            embedding: vec![1.0, 0.0, 0.0],
        }
    }

    fn upsert(path: &str, hash: &str, chunks: Vec<ChunkInsert>) -> FileUpsert {
        FileUpsert {
            path: path.to_string(),
            content_hash: hash.to_string(),
            size_bytes: 100,
            chunks,
        }
    }

    fn chunk_rows(db: &Database) -> i64 {
        db.with_conn(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM chunks", [], |r| r.get(0))?))
            .unwrap()
    }

    #[test]
    fn test_insert_then_update_keeps_id() {
        let db = setup();
        let id1 = db
            .upsert_file(&upsert("src/a.rs", "h1", vec![chunk(0, "first version")]))
            .unwrap();
        let id2 = db
            .upsert_file(&upsert("src/a.rs", "h2", vec![chunk(0, "second version")]))
            .unwrap();
        assert_eq!(id1, id2);

        let file = db.get_file("src/a.rs").unwrap().unwrap();
        assert_eq!(file.content_hash, "h2");
        assert_eq!(file.total_chunks, 1);
        assert_eq!(db.file_hash("src/a.rs").unwrap().as_deref(), Some("h2"));
    }

    #[test]
    fn test_shrinking_file_leaves_no_stale_chunks() {
        let db = setup();
        db.upsert_file(&upsert(
            "a.rs",
            "h1",
            vec![chunk(0, "aaaaaaaaaaaa"), chunk(1, "bbbbbbbbbbbb"), chunk(2, "cccccccccccc")],
        ))
        .unwrap();
        assert_eq!(chunk_rows(&db), 3);

        db.upsert_file(&upsert("a.rs", "h2", vec![chunk(0, "only one left")]))
            .unwrap();
        assert_eq!(chunk_rows(&db), 1);
    }

    #[test]
    fn test_remove_cascades_to_chunks() {
        let db = setup();
        db.upsert_file(&upsert("a.rs", "h1", vec![chunk(0, "aaaaaaaaaaaa"), chunk(1, "bbbbbbbbbbbb")]))
            .unwrap();
        db.upsert_file(&upsert("b.rs", "h2", vec![chunk(0, "cccccccccccc")]))
            .unwrap();

        assert!(db.remove_file("a.rs").unwrap());
        assert!(!db.remove_file("a.rs").unwrap());
        assert_eq!(chunk_rows(&db), 1);
        assert_eq!(db.indexed_paths().unwrap(), vec!["b.rs".to_string()]);
    }

    #[test]
    fn test_wrong_dimension_rejected_and_rolled_back() {
        let db = setup();
        db.upsert_file(&upsert("a.rs", "h1", vec![chunk(0, "original chunk")]))
            .unwrap();

        let mut bad = chunk(1, "two dimensional");
        bad.embedding = vec![1.0, 0.0];
        let result = db.upsert_file(&upsert("a.rs", "h2", vec![chunk(0, "replacement"), bad]));
        assert!(matches!(result, Err(SemdexError::ProviderMismatch { .. })));

        let file = db.get_file("a.rs").unwrap().unwrap();
        assert_eq!(file.content_hash, "h1");
        assert_eq!(chunk_rows(&db), 1);
    }

    #[test]
    fn test_file_without_chunks_is_recorded() {
        let db = setup();
        db.upsert_file(&upsert("empty.rs", "h0", vec![])).unwrap();
        let file = db.get_file("empty.rs").unwrap().unwrap();
        assert_eq!(file.total_chunks, 0);
    }

    #[test]
    fn test_clear_drops_everything() {
        let db = setup();
        db.upsert_file(&upsert("a.rs", "h1", vec![chunk(0, "aaaaaaaaaaaa")]))
            .unwrap();
        assert_eq!(db.clear().unwrap(), 1);
        assert!(db.list_files().unwrap().is_empty());
        assert!(db.index_meta().unwrap().is_none());
        assert_eq!(chunk_rows(&db), 0);
    }
}
