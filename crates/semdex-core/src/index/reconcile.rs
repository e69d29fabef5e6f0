//! Removal of index entries for files that left the tracked set

use crate::db::Database;
use crate::error::Result;
use std::collections::HashSet;

/// Prunes indexed files that are no longer tracked
pub struct Reconciler<'a> {
    db: &'a Database,
}

impl<'a> Reconciler<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Remove every indexed path not in `tracked`. Returns how many were removed.
    pub fn cleanup(&self, tracked: &HashSet<String>) -> Result<usize> {
        let stale: Vec<String> = self
            .db
            .indexed_paths()?
            .into_iter()
            .filter(|path| !tracked.contains(path))
            .collect();

        let mut removed = 0;
        for path in &stale {
            if self.db.remove_file(path)? {
                tracing::debug!("Removed stale index entry: {}", path);
                removed += 1;
            }
        }

        if removed > 0 {
            tracing::info!("Reconciled index: removed {} untracked files", removed);
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{ChunkInsert, FileUpsert};

    fn index(db: &Database, path: &str) {
        db.upsert_file(&FileUpsert {
            path: path.to_string(),
            content_hash: format!("hash-{}", path),
            size_bytes: 20,
            chunks: vec![ChunkInsert {
                chunk_index: 0,
                start_line: 1,
                end_line: 2,
                content: format!("contents of {}", path),
                embedding: vec![1.0, 0.0],
            }],
        })
        .unwrap();
    }

    #[test]
    fn test_cleanup_removes_only_untracked() {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();
        index(&db, "keep.rs");
        index(&db, "gone.rs");
        index(&db, "also_gone.rs");

        let tracked: HashSet<String> = ["keep.rs".to_string(), "new.rs".to_string()].into();
        let removed = Reconciler::new(&db).cleanup(&tracked).unwrap();

        assert_eq!(removed, 2);
        assert_eq!(db.indexed_paths().unwrap(), vec!["keep.rs".to_string()]);
        assert_eq!(db.get_stats().unwrap().total_chunks, 1);
    }

    #[test]
    fn test_cleanup_noop_when_in_sync() {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();
        index(&db, "a.rs");

        let tracked: HashSet<String> = ["a.rs".to_string()].into();
        assert_eq!(Reconciler::new(&db).cleanup(&tracked).unwrap(), 0);
    }

    #[test]
    fn test_empty_tracked_set_clears_index() {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();
        index(&db, "a.rs");
        index(&db, "b.rs");

        assert_eq!(Reconciler::new(&db).cleanup(&HashSet::new()).unwrap(), 2);
        assert_eq!(db.get_stats().unwrap().total_files, 0);
    }
}
