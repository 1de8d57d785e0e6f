//! Provider registry
//!
//! Maps a provider name to one concrete client. The set is closed: names are
//! parsed into [`ProviderKind`] first, so an unknown name fails before any
//! client or HTTP connection pool is built.

use async_trait::async_trait;
use std::sync::Arc;

use docqa_core::{
    EmbeddingModel, GenerationConfig, GenerationResult, LLMProvider, ProviderKind, Result,
    RetrievalLlm,
};

use crate::config::LlmConfig;
use crate::embeddings::embedding_model_for;
use crate::{GeminiClient, GroqClient, OllamaClient, OpenAiClient};

/// One client per supported vendor
#[derive(Debug, Clone)]
pub enum LlmClient {
    OpenAi(OpenAiClient),
    Groq(GroqClient),
    Gemini(GeminiClient),
    Ollama(OllamaClient),
}

/// Look up and construct the client registered under `provider`
pub fn get_llm(provider: &str, config: &LlmConfig) -> Result<LlmClient> {
    let kind: ProviderKind = provider.parse()?;
    LlmClient::build(kind, config)
}

impl LlmClient {
    pub fn build(kind: ProviderKind, config: &LlmConfig) -> Result<Self> {
        let client = match kind {
            ProviderKind::OpenAi => LlmClient::OpenAi(OpenAiClient::new(config)?),
            ProviderKind::Groq => LlmClient::Groq(GroqClient::new(config)?),
            ProviderKind::Gemini => LlmClient::Gemini(GeminiClient::new(config)?),
            ProviderKind::Ollama => LlmClient::Ollama(OllamaClient::new(config)?),
        };

        tracing::debug!(provider = %kind, model = client.model_id(), "LLM client ready");
        Ok(client)
    }

    /// Build the client named by `config.llm_provider`
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        get_llm(&config.llm_provider, config)
    }

    /// Expose this client as the answering model of the retrieval pipeline
    pub fn into_retrieval_llm(self) -> RetrievalLlm {
        RetrievalLlm::new(Arc::new(self))
    }

    /// Embedding backend registered under `embedding_provider`.
    ///
    /// The choice does not depend on which completion vendor this client
    /// talks to.
    pub fn embedding_model(
        &self,
        embedding_provider: &str,
        config: &LlmConfig,
    ) -> Result<Arc<dyn EmbeddingModel>> {
        embedding_model_for(embedding_provider, config)
    }

    fn inner(&self) -> &dyn LLMProvider {
        match self {
            LlmClient::OpenAi(client) => client,
            LlmClient::Groq(client) => client,
            LlmClient::Gemini(client) => client,
            LlmClient::Ollama(client) => client,
        }
    }
}

#[async_trait]
impl LLMProvider for LlmClient {
    async fn generate_with_config(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<GenerationResult> {
        self.inner().generate_with_config(prompt, config).await
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        self.inner().complete(prompt).await
    }

    fn retrieval_config(&self) -> GenerationConfig {
        self.inner().retrieval_config()
    }

    fn provider(&self) -> ProviderKind {
        self.inner().provider()
    }

    fn model_id(&self) -> &str {
        self.inner().model_id()
    }
}
