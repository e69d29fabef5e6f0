//! Database layer for semdex
//!
//! Provides SQLite-based storage with:
//! - One row per indexed file, keyed by project-relative path
//! - Line-window chunks with embedding BLOBs, cascading on file delete
//! - A model stamp guarding against mixed embedding dimensions

mod chunks;
mod content;
mod files;
mod meta;
mod schema;
mod stats;
pub mod vectors;

pub use chunks::StoredChunk;
pub use content::{hash_content, short_hash};
pub use files::{ChunkInsert, FileUpsert, IndexedFile};
pub use meta::IndexMeta;
pub use schema::Database;
pub use stats::IndexStats;
use std::path::PathBuf;

impl Database {
    /// Get the default database path
    pub fn default_path() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::CACHE_DIR_NAME)
            .join("index.sqlite")
    }
}
