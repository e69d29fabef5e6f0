//! Semdex Core Library
//!
//! Local semantic search over a version-controlled source tree.
//!
//! # Features
//! - Tracked-file enumeration via `git ls-files`, with allowlist, ignore
//!   globs and a project override file
//! - Fixed-size line-window chunking
//! - Embeddings from any OpenAI-compatible service
//! - SQLite storage with hash-gated, transactional per-file upserts
//! - Exhaustive dot-product ranking of stored chunks

pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod index;
pub mod llm;
pub mod search;

pub use config::{Config, EmbeddingServiceConfig, ProviderChangePolicy};
pub use db::{Database, IndexMeta, IndexStats, IndexedFile};
pub use engine::SemanticIndex;
pub use error::{Error, Result, SemdexError};
pub use index::{
    chunk_by_lines, CancellationFlag, GitTrackedFiles, IndexOutcome, IndexReport, Indexer,
    LineChunk, PathFilter, StaticTrackedFiles, TrackedFileSource,
};
pub use llm::{EmbeddingProvider, HttpEmbedder};
pub use search::{SearchOptions, SearchResult, Searcher};

/// Default cache directory name
pub const CACHE_DIR_NAME: &str = "semdex";
