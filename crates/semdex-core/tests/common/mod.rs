//! Shared fixtures for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use semdex_core::db::vectors::l2_normalize;
use semdex_core::{
    Config, Database, EmbeddingProvider, Result, SemanticIndex, SemdexError, StaticTrackedFiles,
    TrackedFileSource,
};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

pub const VOCABULARY: &[&str] = &[
    "user",
    "authentication",
    "password",
    "login",
    "session",
    "token",
    "email",
    "format",
    "address",
    "validate",
    "database",
    "query",
    "render",
    "template",
    "cache",
    "network",
];

/// Deterministic embedder: one dimension per vocabulary word, counting
/// occurrences, then L2-normalized. Words outside the vocabulary are ignored.
pub struct BagOfWordsEmbedder {
    model: String,
    vocabulary: Vec<&'static str>,
    ready: AtomicBool,
    fail_init: bool,
    poison: Option<String>,
    pub embed_calls: AtomicUsize,
}

impl BagOfWordsEmbedder {
    pub fn new() -> Self {
        Self::with_vocabulary("bag-of-words", VOCABULARY)
    }

    pub fn with_vocabulary(model: &str, vocabulary: &[&'static str]) -> Self {
        Self {
            model: model.to_string(),
            vocabulary: vocabulary.to_vec(),
            ready: AtomicBool::new(false),
            fail_init: false,
            poison: None,
            embed_calls: AtomicUsize::new(0),
        }
    }

    /// Provider whose `initialize` always fails
    pub fn unavailable() -> Self {
        Self {
            fail_init: true,
            ..Self::new()
        }
    }

    /// Fail every embed call whose text contains `word`
    pub fn failing_on(word: &str) -> Self {
        Self {
            poison: Some(word.to_string()),
            ..Self::new()
        }
    }

    pub fn calls(&self) -> usize {
        self.embed_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingProvider for BagOfWordsEmbedder {
    async fn initialize(&self) -> Result<()> {
        if self.fail_init {
            return Err(SemdexError::ProviderInit("model weights missing".into()));
        }
        self.ready.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(poison) = &self.poison {
            if text.contains(poison.as_str()) {
                return Err(SemdexError::Embedding(format!("refused '{}'", poison)));
            }
        }

        let mut vector = vec![0.0f32; self.vocabulary.len()];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let word = word.to_lowercase();
            if let Some(pos) = self.vocabulary.iter().position(|v| *v == word) {
                vector[pos] += 1.0;
            }
        }
        l2_normalize(&mut vector);
        Ok(vector)
    }

    fn dimensions(&self) -> usize {
        self.vocabulary.len()
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Tracked-file source that cannot be queried
pub struct BrokenSource;

impl TrackedFileSource for BrokenSource {
    fn tracked_files(&self) -> Result<Vec<String>> {
        Err(SemdexError::Enumeration("fatal: not a git repository".into()))
    }
}

/// Temporary project tree
pub struct Project {
    pub dir: TempDir,
}

impl Project {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn write(&self, path: &str, content: &str) {
        let full = self.root().join(path);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(full, content).unwrap();
    }

    pub fn write_bytes(&self, path: &str, content: &[u8]) {
        std::fs::write(self.root().join(path), content).unwrap();
    }

    pub fn remove(&self, path: &str) {
        std::fs::remove_file(self.root().join(path)).unwrap();
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Index over an in-memory store
pub fn open_index(
    project: &Project,
    config: Config,
    embedder: Arc<dyn EmbeddingProvider>,
    tracked: Arc<dyn TrackedFileSource>,
) -> SemanticIndex {
    init_tracing();
    let db = Database::open_in_memory().unwrap();
    SemanticIndex::with_database(project.root(), config, db, embedder, tracked).unwrap()
}

/// Initialized index with the default embedder and a static tracked set
pub async fn ready_index(
    project: &Project,
    tracked: &Arc<StaticTrackedFiles>,
) -> SemanticIndex {
    let index = open_index(
        project,
        Config::default(),
        Arc::new(BagOfWordsEmbedder::new()),
        tracked.clone(),
    );
    index.initialize().await.unwrap();
    index
}

pub const AUTH_SOURCE: &str = r#"/// Check a user login against the stored password hash
pub fn authenticate_user(store: &Store, name: &str, password: &str) -> bool {
    // user authentication: compare password, then open a session token
    match store.find_user(name) {
        Some(user) => verify(password, &user.password_hash),
        None => false,
    }
}
"#;

pub const EMAIL_SOURCE: &str = r#"/// Validate the format of an email address
pub fn validate_email(address: &str) -> bool {
    // email format: local part, '@', domain with a dot
    let mut parts = address.splitn(2, '@');
    matches!((parts.next(), parts.next()), (Some(l), Some(d)) if !l.is_empty() && d.contains('.'))
}
"#;
