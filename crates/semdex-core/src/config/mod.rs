//! Configuration management

use crate::error::{Result, SemdexError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default number of lines per chunk
pub const DEFAULT_CHUNK_SIZE: usize = 30;

/// Files above this size are skipped (10 MiB)
pub const DEFAULT_MAX_FILE_BYTES: u64 = 10 * 1024 * 1024;

/// Name of the project-level override file
pub const DEFAULT_IGNORE_FILE: &str = ".semdexignore";

const DEFAULT_EXTENSIONS: &[&str] = &[
    "rs", "ts", "tsx", "js", "jsx", "mjs", "cjs", "py", "go", "java", "kt", "kts", "swift", "c",
    "h", "cc", "cpp", "hpp", "cs", "rb", "php", "scala", "sh", "bash", "zsh", "sql", "md", "mdx",
    "txt", "rst", "json", "yaml", "yml", "toml", "html", "css", "scss", "vue", "svelte", "lua",
    "ex", "exs", "erl", "hs", "ml", "dart", "proto", "graphql", "xml",
];

const DEFAULT_FILE_NAMES: &[&str] = &[
    "Dockerfile",
    "Makefile",
    "Rakefile",
    "Gemfile",
    "Justfile",
    "Procfile",
];

const DEFAULT_IGNORE_GLOBS: &[&str] = &[
    "**/node_modules/**",
    "**/target/**",
    "**/dist/**",
    "**/build/**",
    "**/vendor/**",
    "**/.git/**",
    "**/.venv/**",
    "**/__pycache__/**",
    "**/*.min.js",
    "**/*.min.css",
    "**/*.map",
    "**/*.lock",
    "**/package-lock.json",
];

/// What to do when the embedding provider no longer matches the index stamp
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderChangePolicy {
    /// Refuse to open the index with a different model or dimensionality
    #[default]
    Reject,
    /// Drop every stored file and chunk and rebuild on the next full run
    Reindex,
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// SQLite database location
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Lines per chunk window
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Size ceiling for indexed files
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: u64,

    /// Allowed file extensions, without the leading dot
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Allowed exact basenames for files without an extension
    #[serde(default = "default_file_names")]
    pub file_names: Vec<String>,

    /// Glob patterns that are never indexed unless force-included
    #[serde(default = "default_ignore_globs")]
    pub ignore_globs: Vec<String>,

    /// Override file name, relative to the project root
    #[serde(default = "default_ignore_file")]
    pub ignore_file: String,

    #[serde(default)]
    pub provider_change: ProviderChangePolicy,

    /// Embedding service configuration
    #[serde(default)]
    pub embedding: EmbeddingServiceConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            chunk_size: default_chunk_size(),
            max_file_bytes: default_max_file_bytes(),
            extensions: default_extensions(),
            file_names: default_file_names(),
            ignore_globs: default_ignore_globs(),
            ignore_file: default_ignore_file(),
            provider_change: ProviderChangePolicy::default(),
            embedding: EmbeddingServiceConfig::default(),
        }
    }
}

/// Embedding service configuration for external inference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingServiceConfig {
    /// Base URL of an OpenAI-compatible embeddings endpoint
    #[serde(default = "default_embedding_url")]
    pub url: String,

    /// Model name for embeddings
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Embedding dimensions (probed during initialization if not specified)
    #[serde(default)]
    pub dimensions: Option<usize>,

    /// API key (optional, for authenticated services)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for EmbeddingServiceConfig {
    fn default() -> Self {
        Self {
            url: default_embedding_url(),
            model: default_embedding_model(),
            dimensions: std::env::var("SEMDEX_EMBEDDING_DIMS")
                .ok()
                .and_then(|s| s.parse().ok()),
            api_key: std::env::var("SEMDEX_EMBEDDING_API_KEY").ok(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_db_path() -> PathBuf {
    std::env::var("SEMDEX_DB")
        .map(PathBuf::from)
        .unwrap_or_else(|_| crate::db::Database::default_path())
}

fn default_chunk_size() -> usize {
    std::env::var("SEMDEX_CHUNK_SIZE")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_CHUNK_SIZE)
}

fn default_max_file_bytes() -> u64 {
    DEFAULT_MAX_FILE_BYTES
}

fn default_extensions() -> Vec<String> {
    DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect()
}

fn default_file_names() -> Vec<String> {
    DEFAULT_FILE_NAMES.iter().map(|s| s.to_string()).collect()
}

fn default_ignore_globs() -> Vec<String> {
    DEFAULT_IGNORE_GLOBS.iter().map(|s| s.to_string()).collect()
}

fn default_ignore_file() -> String {
    DEFAULT_IGNORE_FILE.to_string()
}

fn default_embedding_url() -> String {
    std::env::var("SEMDEX_EMBEDDING_URL").unwrap_or_else(|_| "http://localhost:8000".to_string())
}

fn default_embedding_model() -> String {
    std::env::var("SEMDEX_EMBEDDING_MODEL")
        .unwrap_or_else(|_| "sentence-transformers/all-MiniLM-L6-v2".to_string())
}

fn default_timeout() -> u64 {
    30
}

impl Config {
    /// Load config from a YAML file, falling back to defaults if it is missing
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Config::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save config as YAML
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check value ranges and glob syntax
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(SemdexError::Config("chunk_size must be at least 1".into()));
        }
        if self.max_file_bytes == 0 {
            return Err(SemdexError::Config(
                "max_file_bytes must be greater than 0".into(),
            ));
        }
        for pattern in &self.ignore_globs {
            glob::Pattern::new(pattern).map_err(|e| {
                SemdexError::Config(format!("Invalid ignore glob '{}': {}", pattern, e))
            })?;
        }
        Ok(())
    }
}
