//! Embedding model trait

use async_trait::async_trait;

use crate::Result;

/// Trait for embedding backends
///
/// Implementations turn text into fixed-size vectors. `embed_batch` must
/// return one vector per input, in input order.
#[async_trait]
pub trait EmbeddingModel: Send + Sync {
    /// Embed a batch of passages
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Embed a single query string
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.embed_batch(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| crate::Error::Embedding("Embedding response was empty".to_string()))
    }

    /// Get the model name
    fn model_name(&self) -> &str;
}
