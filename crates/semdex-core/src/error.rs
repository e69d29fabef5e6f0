//! Error types for semdex

use thiserror::Error;

/// Result type alias using SemdexError
pub type Result<T> = std::result::Result<T, SemdexError>;

/// Error type alias for convenience
pub type Error = SemdexError;

/// Main error type for semdex
#[derive(Debug, Error)]
pub enum SemdexError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The tracked-file source could not be queried; a full run cannot proceed.
    #[error("Cannot enumerate tracked files: {0}")]
    Enumeration(String),

    /// The embedding provider failed to become ready.
    #[error("Embedding provider failed to initialize: {0}")]
    ProviderInit(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Vectors from a different model or dimensionality than the index stamp.
    #[error(
        "Embedding provider mismatch: index built with {expected_model} ({expected} dims), got {found_model} ({found} dims)"
    )]
    ProviderMismatch {
        expected: usize,
        expected_model: String,
        found: usize,
        found_model: String,
    },

    #[error("Index not initialized: call initialize() first")]
    NotInitialized,

    #[error("Index store is closed")]
    Closed,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Glob pattern error: {0}")]
    GlobPattern(#[from] glob::PatternError),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl SemdexError {
    /// Whether this error only affects the file being processed.
    ///
    /// `index_all` logs and skips transient errors; anything else means the
    /// store or the provider is unusable and is worth surfacing.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Io(_) | Self::Embedding(_) | Self::Http(_) | Self::InvalidInput(_)
        )
    }
}
