//! Groq client (OpenAI-compatible chat completions)

use async_trait::async_trait;

use docqa_core::{GenerationConfig, GenerationResult, LLMProvider, ProviderKind, Result};

use crate::config::LlmConfig;
use crate::http::bearer_client;
use crate::openai::ChatCompletionsClient;

/// Groq chat-completions client
#[derive(Debug, Clone)]
pub struct GroqClient {
    inner: ChatCompletionsClient,
    model: String,
}

impl GroqClient {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let client = bearer_client(&config.groq_api_key, config)?;
        Ok(Self {
            inner: ChatCompletionsClient::new(client, &config.groq_base_url, "Groq"),
            model: config.groq_model.clone(),
        })
    }
}

#[async_trait]
impl LLMProvider for GroqClient {
    async fn generate_with_config(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<GenerationResult> {
        self.inner.create(prompt, config).await
    }

    fn provider(&self) -> ProviderKind {
        ProviderKind::Groq
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}
