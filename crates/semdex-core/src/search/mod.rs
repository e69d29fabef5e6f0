//! Semantic search over indexed chunks
//!
//! Queries are embedded once and compared against every stored chunk
//! vector. There is no approximate nearest-neighbor structure: cost grows
//! linearly with the number of chunks.

mod vector;

pub use vector::*;

use serde::{Deserialize, Serialize};

/// Default number of results
pub const DEFAULT_LIMIT: usize = 10;

/// Default similarity floor
pub const DEFAULT_MIN_SCORE: f32 = 0.3;

/// Search options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchOptions {
    /// Maximum number of results
    pub limit: usize,
    /// Only consider paths ending with one of these suffixes (e.g. ".rs")
    pub file_types: Option<Vec<String>>,
    /// Minimum similarity, inclusive
    pub min_score: f32,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            file_types: None,
            min_score: DEFAULT_MIN_SCORE,
        }
    }
}

impl SearchOptions {
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_file_types<I, S>(mut self, file_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.file_types = Some(file_types.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_min_score(mut self, min_score: f32) -> Self {
        self.min_score = min_score;
        self
    }
}

/// One ranked chunk
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub path: String,
    pub chunk_index: usize,
    pub start_line: usize,
    pub end_line: usize,
    pub content: String,
    /// Dot product of unit vectors, in [-1, 1]
    pub similarity: f32,
}
