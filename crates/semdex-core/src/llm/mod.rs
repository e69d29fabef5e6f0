//! Embedding integration
//!
//! Provides the `EmbeddingProvider` trait and an HTTP implementation for
//! external OpenAI-compatible embedding services.

mod http_embedder;
mod traits;

pub use http_embedder::HttpEmbedder;
pub use traits::*;
