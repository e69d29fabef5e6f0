//! Indexing orchestration
//!
//! `index_all` enumerates tracked files, filters them, prunes stale entries,
//! then indexes the remaining paths one after another. Within a file all
//! chunk embeddings are requested concurrently and written in one
//! transaction once every vector is back.

use super::chunker::chunk_by_lines;
use super::filter::{normalize_path, PathFilter};
use super::reconcile::Reconciler;
use super::tracked::TrackedFileSource;
use crate::config::{Config, ProviderChangePolicy};
use crate::db::{hash_content, ChunkInsert, Database, FileUpsert};
use crate::error::{Result, SemdexError};
use crate::llm::EmbeddingProvider;
use futures::future::try_join_all;
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Progress callback: `(path, current, total)`, called after each file
pub type ProgressFn<'a> = dyn Fn(&str, usize, usize) + Send + Sync + 'a;

/// Cooperative cancellation for a full indexing run
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Result of indexing a single file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexOutcome {
    /// Content changed (or was new) and its chunks were replaced
    Indexed { chunks: usize },
    /// Stored hash matches; nothing written
    Unchanged,
    /// Above the size ceiling; skipped
    Oversized { size_bytes: u64 },
}

/// Summary of a full indexing run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IndexReport {
    /// Eligible paths after filtering
    pub total: usize,
    pub indexed: usize,
    pub unchanged: usize,
    pub oversized: usize,
    pub failed: usize,
    /// Stale entries removed by reconciliation
    pub removed: usize,
    /// Chunks written across all indexed files
    pub chunks: usize,
    pub cancelled: bool,
}

impl IndexReport {
    /// Files visited before the run ended
    pub fn processed(&self) -> usize {
        self.indexed + self.unchanged + self.oversized + self.failed
    }
}

/// Turns a project's tracked files into stored, embedded chunks
pub struct Indexer {
    root: PathBuf,
    config: Config,
    db: Arc<Database>,
    embedder: Arc<dyn EmbeddingProvider>,
    tracked: Arc<dyn TrackedFileSource>,
    ready: AtomicBool,
}

impl Indexer {
    pub fn new(
        root: impl Into<PathBuf>,
        config: Config,
        db: Arc<Database>,
        embedder: Arc<dyn EmbeddingProvider>,
        tracked: Arc<dyn TrackedFileSource>,
    ) -> Self {
        Self {
            root: root.into(),
            config,
            db,
            embedder,
            tracked,
            ready: AtomicBool::new(false),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    /// Ready the embedding provider and reconcile it with the index stamp.
    ///
    /// A stamp written by a different model or dimensionality is rejected
    /// unless the policy is [`ProviderChangePolicy::Reindex`], which drops
    /// every stored file so the next full run rebuilds the index.
    pub async fn initialize(&self) -> Result<()> {
        if self.is_ready() {
            return Ok(());
        }

        self.embedder.initialize().await.map_err(|e| match e {
            SemdexError::ProviderInit(_) => e,
            other => SemdexError::ProviderInit(other.to_string()),
        })?;

        let model = self.embedder.model_name().to_string();
        let dimensions = self.embedder.dimensions();
        if dimensions == 0 {
            return Err(SemdexError::ProviderInit(format!(
                "{} reported zero dimensions",
                model
            )));
        }

        match self.db.index_meta()? {
            None => {
                self.db.stamp_index(&model, dimensions)?;
                tracing::info!("New index stamped for {} ({} dims)", model, dimensions);
            }
            Some(meta) if meta.is_compatible(&model, dimensions) => {}
            Some(meta) => match self.config.provider_change {
                ProviderChangePolicy::Reject => {
                    return Err(SemdexError::ProviderMismatch {
                        expected: meta.dimensions,
                        expected_model: meta.embedding_model,
                        found: dimensions,
                        found_model: model,
                    });
                }
                ProviderChangePolicy::Reindex => {
                    let dropped = self.db.clear()?;
                    self.db.stamp_index(&model, dimensions)?;
                    tracing::warn!(
                        "Embedding provider changed from {} ({} dims) to {} ({} dims), dropped {} files for reindex",
                        meta.embedding_model,
                        meta.dimensions,
                        model,
                        dimensions,
                        dropped
                    );
                }
            },
        }

        self.ready.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn ensure_ready(&self) -> Result<()> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(SemdexError::NotInitialized)
        }
    }

    /// Index one project-relative path.
    ///
    /// Nothing is written unless every chunk embedded successfully.
    pub async fn index_file(&self, path: &str) -> Result<IndexOutcome> {
        self.ensure_ready()?;
        let path = normalize_path(path);
        let full_path = self.root.join(&path);

        let size_bytes = tokio::fs::metadata(&full_path).await?.len();
        if size_bytes > self.config.max_file_bytes {
            tracing::debug!(
                "Skipping {}: {} bytes exceeds limit of {}",
                path,
                size_bytes,
                self.config.max_file_bytes
            );
            return Ok(IndexOutcome::Oversized { size_bytes });
        }

        let bytes = tokio::fs::read(&full_path).await?;
        let content = String::from_utf8(bytes)
            .map_err(|_| SemdexError::InvalidInput(format!("{} is not valid UTF-8", path)))?;

        let content_hash = hash_content(&content);
        if self.db.file_hash(&path)?.as_deref() == Some(content_hash.as_str()) {
            tracing::debug!("Unchanged: {}", path);
            return Ok(IndexOutcome::Unchanged);
        }

        let chunks = chunk_by_lines(&content, self.config.chunk_size);
        let embeddings =
            try_join_all(chunks.iter().map(|chunk| self.embedder.embed(&chunk.text))).await?;

        let chunks: Vec<ChunkInsert> = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| ChunkInsert {
                chunk_index: chunk.chunk_index,
                start_line: chunk.start_line,
                end_line: chunk.end_line,
                content: chunk.text,
                embedding,
            })
            .collect();
        let chunk_count = chunks.len();

        self.db.upsert_file(&FileUpsert {
            path: path.clone(),
            content_hash,
            size_bytes,
            chunks,
        })?;

        tracing::debug!("Indexed {} ({} chunks)", path, chunk_count);
        Ok(IndexOutcome::Indexed {
            chunks: chunk_count,
        })
    }

    /// Index every eligible tracked file.
    ///
    /// Fails only if the tracked set cannot be enumerated. Per-file errors
    /// are logged and counted in [`IndexReport::failed`].
    pub async fn index_all(
        &self,
        on_progress: Option<&ProgressFn<'_>>,
        cancel: Option<&CancellationFlag>,
    ) -> Result<IndexReport> {
        self.ensure_ready()?;

        let tracked = self.tracked.tracked_files().map_err(|e| match e {
            SemdexError::Enumeration(_) => e,
            other => SemdexError::Enumeration(other.to_string()),
        })?;

        let filter = PathFilter::load(&self.root, &self.config)?;
        let mut seen = HashSet::new();
        let eligible: Vec<String> = tracked
            .iter()
            .map(|p| normalize_path(p))
            .filter(|p| filter.is_eligible(p))
            .filter(|p| seen.insert(p.clone()))
            .collect();

        // Paths that became ineligible are pruned along with deleted ones
        let removed = Reconciler::new(&self.db).cleanup(&seen)?;

        let mut report = IndexReport {
            total: eligible.len(),
            removed,
            ..Default::default()
        };
        tracing::info!(
            "Indexing {} of {} tracked files under {}",
            report.total,
            tracked.len(),
            self.root.display()
        );

        for (idx, path) in eligible.iter().enumerate() {
            if cancel.is_some_and(|c| c.is_cancelled()) {
                report.cancelled = true;
                tracing::info!("Indexing cancelled after {} files", idx);
                break;
            }

            match self.index_file(path).await {
                Ok(IndexOutcome::Indexed { chunks }) => {
                    report.indexed += 1;
                    report.chunks += chunks;
                }
                Ok(IndexOutcome::Unchanged) => report.unchanged += 1,
                Ok(IndexOutcome::Oversized { .. }) => report.oversized += 1,
                Err(e) if e.is_transient() => {
                    tracing::warn!("Failed to index {}: {}", path, e);
                    report.failed += 1;
                }
                Err(e) => {
                    tracing::error!("Failed to index {}: {}", path, e);
                    report.failed += 1;
                }
            }

            if let Some(callback) = on_progress {
                callback(path, idx + 1, report.total);
            }
        }

        tracing::info!(
            "Indexing finished: {} indexed, {} unchanged, {} oversized, {} failed, {} removed",
            report.indexed,
            report.unchanged,
            report.oversized,
            report.failed,
            report.removed
        );
        Ok(report)
    }
}
