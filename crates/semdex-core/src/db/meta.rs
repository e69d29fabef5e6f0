//! Embedding model stamp
//!
//! Every vector in the index must come from the same model with the same
//! dimensionality. The stamp records which provider built the index so a
//! provider change is detected instead of silently mixing vector spaces.

use super::Database;
use crate::error::Result;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;

/// Model that produced the stored embeddings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexMeta {
    pub embedding_model: String,
    pub dimensions: usize,
    pub created_at: String,
}

impl IndexMeta {
    /// Whether a provider reporting `model`/`dimensions` can share this index
    pub fn is_compatible(&self, model: &str, dimensions: usize) -> bool {
        self.embedding_model == model && self.dimensions == dimensions
    }
}

impl Database {
    /// Get the current stamp, if the index has one
    pub fn index_meta(&self) -> Result<Option<IndexMeta>> {
        self.with_conn(read_index_meta)
    }

    /// Record the provider that builds this index, replacing any previous stamp
    pub fn stamp_index(&self, model: &str, dimensions: usize) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO index_meta (id, embedding_model, dimensions, created_at)
                 VALUES (1, ?1, ?2, ?3)
                 ON CONFLICT(id) DO UPDATE SET
                    embedding_model = excluded.embedding_model,
                    dimensions = excluded.dimensions,
                    created_at = excluded.created_at",
                params![model, dimensions as i64, now],
            )?;
            Ok(())
        })
    }
}

pub(crate) fn read_index_meta(conn: &Connection) -> Result<Option<IndexMeta>> {
    let meta = conn
        .query_row(
            "SELECT embedding_model, dimensions, created_at FROM index_meta WHERE id = 1",
            [],
            |row| {
                Ok(IndexMeta {
                    embedding_model: row.get(0)?,
                    dimensions: row.get::<_, i64>(1)? as usize,
                    created_at: row.get(2)?,
                })
            },
        )
        .optional()?;
    Ok(meta)
}
