//! Single entry point bundling indexing and search for one project

use crate::config::Config;
use crate::db::{Database, IndexStats};
use crate::error::Result;
use crate::index::{
    CancellationFlag, GitTrackedFiles, IndexOutcome, IndexReport, Indexer, ProgressFn,
    TrackedFileSource,
};
use crate::llm::EmbeddingProvider;
use crate::search::{SearchOptions, SearchResult, Searcher};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Semantic index of one project tree
///
/// ```no_run
/// # async fn demo() -> semdex_core::Result<()> {
/// use semdex_core::{Config, HttpEmbedder, SearchOptions, SemanticIndex};
/// use std::sync::Arc;
///
/// let config = Config::default();
/// let embedder = Arc::new(HttpEmbedder::new(config.embedding.clone())?);
/// let index = SemanticIndex::for_git_project(".", config, embedder)?;
/// index.initialize().await?;
/// index.index_all(None, None).await?;
/// let hits = index.search("user authentication", &SearchOptions::default()).await?;
/// # Ok(())
/// # }
/// ```
pub struct SemanticIndex {
    db: Arc<Database>,
    indexer: Indexer,
    searcher: Searcher,
}

impl SemanticIndex {
    /// Open (or create) the store at `config.db_path`
    pub fn open(
        root: impl Into<PathBuf>,
        config: Config,
        embedder: Arc<dyn EmbeddingProvider>,
        tracked: Arc<dyn TrackedFileSource>,
    ) -> Result<Self> {
        config.validate()?;
        let db = Database::open(&config.db_path)?;
        Self::with_database(root, config, db, embedder, tracked)
    }

    /// Open the store for a git checkout, using `git ls-files` as the tracked set
    pub fn for_git_project(
        root: impl Into<PathBuf>,
        config: Config,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Result<Self> {
        let root = root.into();
        let tracked = Arc::new(GitTrackedFiles::new(root.clone()));
        Self::open(root, config, embedder, tracked)
    }

    /// Use an already opened store
    pub fn with_database(
        root: impl Into<PathBuf>,
        config: Config,
        db: Database,
        embedder: Arc<dyn EmbeddingProvider>,
        tracked: Arc<dyn TrackedFileSource>,
    ) -> Result<Self> {
        db.initialize()?;
        let db = Arc::new(db);
        let searcher = Searcher::new(db.clone(), embedder.clone());
        let indexer = Indexer::new(root, config, db.clone(), embedder, tracked);
        Ok(Self {
            db,
            indexer,
            searcher,
        })
    }

    pub fn root(&self) -> &Path {
        self.indexer.root()
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Ready the embedding provider and check the index stamp
    pub async fn initialize(&self) -> Result<()> {
        self.indexer.initialize().await
    }

    pub async fn index_file(&self, path: &str) -> Result<IndexOutcome> {
        self.indexer.index_file(path).await
    }

    pub async fn index_all(
        &self,
        on_progress: Option<&ProgressFn<'_>>,
        cancel: Option<&CancellationFlag>,
    ) -> Result<IndexReport> {
        self.indexer.index_all(on_progress, cancel).await
    }

    pub async fn search(&self, query: &str, options: &SearchOptions) -> Result<Vec<SearchResult>> {
        if !self.indexer.is_ready() {
            return Err(crate::error::SemdexError::NotInitialized);
        }
        self.searcher.search(query, options).await
    }

    pub fn get_stats(&self) -> Result<IndexStats> {
        self.db.get_stats()
    }

    /// Release the store. Every later operation fails with `Closed`.
    pub fn close(&self) -> Result<()> {
        self.db.close()?;
        tracing::debug!("Closed index for {}", self.root().display());
        Ok(())
    }
}
