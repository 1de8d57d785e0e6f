//! Ollama client (`/api/generate`)

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use docqa_core::{
    Error, GenerationConfig, GenerationResult, LLMProvider, ProviderKind, Result,
};

use crate::config::LlmConfig;
use crate::http::{check_status, endpoint, plain_client};

#[derive(Debug, Default, Serialize)]
struct GenerateOptions<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<&'a [String]>,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions<'a>,
}

impl<'a> GenerateRequest<'a> {
    fn single_turn(prompt: &'a str, config: &'a GenerationConfig) -> Self {
        Self {
            model: &config.model_id,
            prompt,
            stream: false,
            options: GenerateOptions {
                temperature: config.temperature,
                top_p: config.top_p,
                num_predict: config.max_tokens,
                stop: (!config.stop_sequences.is_empty()).then_some(config.stop_sequences.as_slice()),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
    prompt_eval_count: Option<u32>,
    eval_count: Option<u32>,
}

/// Ollama client for a local or self-hosted model server
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaClient {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        Ok(Self {
            client: plain_client(config)?,
            base_url: config.ollama_base_url.clone(),
            model: config.ollama_model.clone(),
        })
    }
}

#[async_trait]
impl LLMProvider for OllamaClient {
    async fn generate_with_config(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<GenerationResult> {
        let request = GenerateRequest::single_turn(prompt, config);
        let url = endpoint(&self.base_url, "api/generate");

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;
        let response = check_status(response, "Ollama").await?;

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| Error::Serialization(e.to_string()))?;

        if body.response.trim().is_empty() {
            return Err(Error::LLMProvider("Empty response from Ollama".to_string()));
        }

        let tokens_used = match (body.prompt_eval_count, body.eval_count) {
            (None, None) => None,
            (prompt, eval) => Some(prompt.unwrap_or(0) + eval.unwrap_or(0)),
        };

        Ok(GenerationResult {
            text: body.response,
            model_id: config.model_id.clone(),
            tokens_used,
        })
    }

    fn provider(&self) -> ProviderKind {
        ProviderKind::Ollama
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_is_non_streaming() {
        let config = GenerationConfig {
            temperature: Some(0.5),
            ..GenerationConfig::for_model("llama3.2:latest")
        };
        let request = GenerateRequest::single_turn("why is the sky blue?", &config);

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "model": "llama3.2:latest",
                "prompt": "why is the sky blue?",
                "stream": false,
                "options": {"temperature": 0.5}
            })
        );
    }
}
