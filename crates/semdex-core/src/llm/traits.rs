//! Embedding provider trait

use crate::error::Result;
use async_trait::async_trait;

/// Text embedding capability
///
/// Implementations return mean-pooled, L2-normalized vectors so that
/// similarity is a plain dot product.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Ready the provider. Repeated calls after success are no-ops.
    async fn initialize(&self) -> Result<()>;

    /// Whether `initialize` has completed successfully
    fn is_ready(&self) -> bool;

    /// Generate embedding for a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embedding dimensions. Only meaningful once ready.
    fn dimensions(&self) -> usize;

    /// Get model name
    fn model_name(&self) -> &str;
}
