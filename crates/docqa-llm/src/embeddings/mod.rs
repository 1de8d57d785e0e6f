//! Embedding backends
//!
//! Selection is keyed by an embedding-provider name that is independent of
//! the completion provider.

mod fake;
mod huggingface;
mod ollama;
mod openai;

use std::sync::Arc;

use docqa_core::{EmbeddingModel, EmbeddingProviderKind, Result};

use crate::config::LlmConfig;

pub use fake::FakeEmbedding;
pub use huggingface::HuggingFaceEmbedding;
pub use ollama::OllamaEmbedding;
pub use openai::OpenAiEmbedding;

/// Build the embedding backend registered under `name`
pub fn embedding_model_for(name: &str, config: &LlmConfig) -> Result<Arc<dyn EmbeddingModel>> {
    let kind: EmbeddingProviderKind = name.parse()?;
    build_embedding_model(kind, config)
}

/// Build an embedding backend for an already-validated kind
pub fn build_embedding_model(
    kind: EmbeddingProviderKind,
    config: &LlmConfig,
) -> Result<Arc<dyn EmbeddingModel>> {
    let model: Arc<dyn EmbeddingModel> = match kind {
        EmbeddingProviderKind::OpenAi => Arc::new(OpenAiEmbedding::new(config)?),
        EmbeddingProviderKind::Ollama => Arc::new(OllamaEmbedding::new(config)?),
        EmbeddingProviderKind::HuggingFace => Arc::new(HuggingFaceEmbedding::new(config)?),
        EmbeddingProviderKind::Fake => Arc::new(FakeEmbedding::default()),
    };

    tracing::debug!(provider = %kind, model = model.model_name(), "embedding model ready");
    Ok(model)
}
