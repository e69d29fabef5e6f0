//! Database statistics

use super::Database;
use crate::error::Result;

/// Index stats
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct IndexStats {
    pub total_files: usize,
    pub total_chunks: usize,
    /// On-disk size of the database (page count * page size)
    pub index_size_bytes: u64,
}

impl Database {
    /// Get index statistics
    pub fn get_stats(&self) -> Result<IndexStats> {
        self.with_conn(|conn| {
            let total_files: i64 =
                conn.query_row("SELECT COUNT(*) FROM files", [], |row| row.get(0))?;
            let total_chunks: i64 =
                conn.query_row("SELECT COUNT(*) FROM chunks", [], |row| row.get(0))?;
            let page_count: i64 = conn.query_row("PRAGMA page_count", [], |row| row.get(0))?;
            let page_size: i64 = conn.query_row("PRAGMA page_size", [], |row| row.get(0))?;

            Ok(IndexStats {
                total_files: total_files as usize,
                total_chunks: total_chunks as usize,
                index_size_bytes: (page_count * page_size) as u64,
            })
        })
    }

    /// Vacuum the database
    pub fn vacuum(&self) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("VACUUM", [])?;
            Ok(())
        })
    }
}
