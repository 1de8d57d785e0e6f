//! LLM provider trait and types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::provider::ProviderKind;
use crate::Result;

/// Configuration for text generation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub model_id: String,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub stop_sequences: Vec<String>,
}

impl GenerationConfig {
    /// Vendor defaults for everything except the model.
    pub fn for_model(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            ..Default::default()
        }
    }
}

/// Result of a text generation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResult {
    pub text: String,
    pub model_id: String,
    pub tokens_used: Option<u32>,
}

/// Trait for LLM providers (OpenAI, Groq, Gemini, Ollama)
///
/// Every call is a single, non-streaming attempt. Implementations must not
/// touch the network until a generation is requested.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Generate text with custom configuration
    async fn generate_with_config(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<GenerationResult>;

    /// Single-turn completion with the provider's default settings
    async fn complete(&self, prompt: &str) -> Result<String> {
        let config = GenerationConfig::for_model(self.model_id());
        let result = self.generate_with_config(prompt, &config).await?;
        Ok(result.text)
    }

    /// Settings used when this provider answers inside the retrieval pipeline
    fn retrieval_config(&self) -> GenerationConfig {
        GenerationConfig {
            temperature: Some(0.1),
            ..GenerationConfig::for_model(self.model_id())
        }
    }

    /// Which vendor backs this provider
    fn provider(&self) -> ProviderKind;

    /// Get the model ID being used
    fn model_id(&self) -> &str;
}

/// A provider bound to the generation settings the retrieval pipeline uses
/// for answer synthesis.
#[derive(Clone)]
pub struct RetrievalLlm {
    provider: Arc<dyn LLMProvider>,
    config: GenerationConfig,
}

impl RetrievalLlm {
    pub fn new(provider: Arc<dyn LLMProvider>) -> Self {
        let config = provider.retrieval_config();
        Self { provider, config }
    }

    /// Answer a fully rendered prompt
    pub async fn answer(&self, prompt: &str) -> Result<String> {
        let result = self.provider.generate_with_config(prompt, &self.config).await?;
        Ok(result.text)
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    pub fn model_id(&self) -> &str {
        &self.config.model_id
    }
}

impl std::fmt::Debug for RetrievalLlm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetrievalLlm")
            .field("provider", &self.provider.provider())
            .field("config", &self.config)
            .finish()
    }
}
