//! Chunk retrieval

use super::vectors::bytes_to_embedding;
use super::Database;
use crate::error::Result;
use rusqlite::params_from_iter;
use serde::Serialize;

/// Stored chunk joined with its file path
#[derive(Debug, Clone, Serialize)]
pub struct StoredChunk {
    pub path: String,
    pub chunk_index: usize,
    pub start_line: usize,
    pub end_line: usize,
    pub content: String,
    #[serde(skip)]
    pub embedding: Vec<f32>,
}

const SELECT_CHUNKS: &str = "SELECT f.path, c.chunk_index, c.start_line, c.end_line, c.content, c.embedding
     FROM chunks c
     JOIN files f ON f.id = c.file_id";

impl Database {
    /// Chunks of one file in chunk order
    pub fn chunks_for_file(&self, path: &str) -> Result<Vec<StoredChunk>> {
        self.with_conn(|conn| {
            let sql = format!("{} WHERE f.path = ?1 ORDER BY c.chunk_index", SELECT_CHUNKS);
            let mut stmt = conn.prepare(&sql)?;
            let chunks = stmt
                .query_map([path], row_to_chunk)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(chunks)
        })
    }

    /// Load every chunk that can be ranked, optionally restricted to paths
    /// ending with one of `file_types`. Suffixes match literally and
    /// case-sensitively.
    ///
    /// Reads happen under one lock, so a concurrent `upsert_file` is either
    /// fully visible or not at all.
    pub fn search_candidates(&self, file_types: Option<&[String]>) -> Result<Vec<StoredChunk>> {
        let suffixes: Vec<String> = file_types
            .unwrap_or_default()
            .iter()
            .filter(|s| !s.is_empty())
            .cloned()
            .collect();

        let mut sql = SELECT_CHUNKS.to_string();
        if !suffixes.is_empty() {
            let clauses: Vec<String> = (1..=suffixes.len())
                .map(|i| format!("substr(f.path, -length(?{i})) = ?{i}"))
                .collect();
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" OR "));
        }
        sql.push_str(" ORDER BY f.path, c.chunk_index");

        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let chunks = stmt
                .query_map(params_from_iter(suffixes.iter()), row_to_chunk)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(chunks)
        })
    }
}

fn row_to_chunk(row: &rusqlite::Row<'_>) -> rusqlite::Result<StoredChunk> {
    let embedding_bytes: Vec<u8> = row.get(5)?;
    Ok(StoredChunk {
        path: row.get(0)?,
        chunk_index: row.get::<_, i64>(1)? as usize,
        start_line: row.get::<_, i64>(2)? as usize,
        end_line: row.get::<_, i64>(3)? as usize,
        content: row.get(4)?,
        embedding: bytes_to_embedding(&embedding_bytes),
    })
}
