//! Vector similarity search
//!
//! Embeddings are L2-normalized, so the dot product is the cosine
//! similarity.

use super::{SearchOptions, SearchResult};
use crate::db::vectors::dot_product;
use crate::db::{Database, StoredChunk};
use crate::error::{Result, SemdexError};
use crate::llm::EmbeddingProvider;
use std::cmp::Ordering;
use std::sync::Arc;

/// Embeds queries and ranks stored chunks against them
pub struct Searcher {
    db: Arc<Database>,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl Searcher {
    pub fn new(db: Arc<Database>, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self { db, embedder }
    }

    /// Rank every stored chunk against `query`.
    ///
    /// This is an exhaustive scan over all candidate rows; it is fine for a
    /// single project but does not scale to millions of chunks.
    pub async fn search(&self, query: &str, options: &SearchOptions) -> Result<Vec<SearchResult>> {
        if query.trim().is_empty() {
            return Err(SemdexError::InvalidInput("empty search query".to_string()));
        }
        if !self.embedder.is_ready() {
            return Err(SemdexError::NotInitialized);
        }
        if options.limit == 0 {
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed(query).await?;

        if let Some(meta) = self.db.index_meta()? {
            if meta.dimensions != query_embedding.len() {
                return Err(SemdexError::ProviderMismatch {
                    expected: meta.dimensions,
                    expected_model: meta.embedding_model,
                    found: query_embedding.len(),
                    found_model: self.embedder.model_name().to_string(),
                });
            }
        }

        let candidates = self.db.search_candidates(options.file_types.as_deref())?;
        let scanned = candidates.len();
        let results = rank_candidates(&query_embedding, candidates, options);

        tracing::debug!(
            "Search '{}': {} of {} chunks returned",
            query,
            results.len(),
            scanned
        );
        Ok(results)
    }
}

/// Score, filter, sort and truncate candidate chunks.
///
/// Ties in similarity are broken by path, then chunk index, so results are
/// deterministic.
pub fn rank_candidates(
    query_embedding: &[f32],
    candidates: Vec<StoredChunk>,
    options: &SearchOptions,
) -> Vec<SearchResult> {
    let mut results: Vec<SearchResult> = candidates
        .into_iter()
        .filter(|chunk| chunk.embedding.len() == query_embedding.len())
        .filter_map(|chunk| {
            let similarity = dot_product(query_embedding, &chunk.embedding);
            (similarity >= options.min_score).then(|| SearchResult {
                path: chunk.path,
                chunk_index: chunk.chunk_index,
                start_line: chunk.start_line,
                end_line: chunk.end_line,
                content: chunk.content,
                similarity,
            })
        })
        .collect();

    results.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.path.cmp(&b.path))
            .then_with(|| a.chunk_index.cmp(&b.chunk_index))
    });
    results.truncate(options.limit);
    results
}
