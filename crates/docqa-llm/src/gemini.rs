//! Gemini client (`generateContent`)

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use docqa_core::{
    Error, GenerationConfig, GenerationResult, LLMProvider, ProviderKind, Result,
};

use crate::config::LlmConfig;
use crate::http::{check_status, endpoint};

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop_sequences: Option<&'a [String]>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GeminiGenerationConfig<'a>,
}

impl<'a> GenerateContentRequest<'a> {
    fn single_turn(prompt: &'a str, config: &'a GenerationConfig) -> Self {
        Self {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GeminiGenerationConfig {
                temperature: config.temperature,
                top_p: config.top_p,
                max_output_tokens: config.max_tokens,
                stop_sequences: (!config.stop_sequences.is_empty())
                    .then_some(config.stop_sequences.as_slice()),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    total_token_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
}

impl GenerateContentResponse {
    fn into_text(self) -> Result<(String, Option<u32>)> {
        let tokens = self.usage_metadata.and_then(|u| u.total_token_count);
        let text: String = self
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect()
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(Error::LLMProvider("Empty response from Gemini".to_string()));
        }

        Ok((text, tokens))
    }
}

/// Gemini client
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let mut key = HeaderValue::from_str(&config.gemini_api_key)
            .map_err(|e| Error::Configuration(format!("Invalid API key: {}", e)))?;
        key.set_sensitive(true);
        headers.insert("x-goog-api-key", key);

        let client = Client::builder()
            .timeout(config.timeout())
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.gemini_base_url.clone(),
            model: config.gemini_model.clone(),
        })
    }

    /// Model names are accepted with or without the `models/` prefix
    fn model_path(model_id: &str) -> String {
        if model_id.starts_with("models/") {
            model_id.to_string()
        } else {
            format!("models/{}", model_id)
        }
    }
}

#[async_trait]
impl LLMProvider for GeminiClient {
    async fn generate_with_config(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<GenerationResult> {
        let request = GenerateContentRequest::single_turn(prompt, config);
        let url = endpoint(
            &self.base_url,
            &format!("v1beta/{}:generateContent", Self::model_path(&config.model_id)),
        );

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;
        let response = check_status(response, "Gemini").await?;

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| Error::Serialization(e.to_string()))?;
        let (text, tokens_used) = body.into_text()?;

        Ok(GenerationResult {
            text,
            model_id: config.model_id.clone(),
            tokens_used,
        })
    }

    fn retrieval_config(&self) -> GenerationConfig {
        GenerationConfig {
            temperature: Some(0.1),
            max_tokens: Some(1024),
            ..GenerationConfig::for_model(&self.model)
        }
    }

    fn provider(&self) -> ProviderKind {
        ProviderKind::Gemini
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
    fn test_request_shape() {
        let config = GenerationConfig {
            max_tokens: Some(256),
            ..GenerationConfig::for_model("models/gemini-1.5-flash")
        };
        let request = GenerateContentRequest::single_turn("hello", &config);

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "contents": [{"role": "user", "parts": [{"text": "hello"}]}],
                "generationConfig": {"maxOutputTokens": 256}
            })
        );
    }

    #[test]
    fn test_response_parts_are_joined() {
        let body: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "Hello, "}, {"text": "world"}]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 3, "candidatesTokenCount": 2, "totalTokenCount": 5}
        }))
        .unwrap();

        let (text, tokens) = body.into_text().unwrap();
        assert_eq!(text, "Hello, world");
        assert_eq!(tokens, Some(5));
    }

    #[test]
    fn test_blocked_response_is_error() {
        let body: GenerateContentResponse = serde_json::from_value(json!({
            "promptFeedback": {"blockReason": "SAFETY"}
        }))
        .unwrap();
        assert!(body.into_text().is_err());
    }

    #[test]
    fn test_model_path() {
        assert_eq!(GeminiClient::model_path("models/gemini-1.5-flash"), "models/gemini-1.5-flash");
        assert_eq!(GeminiClient::model_path("gemini-1.5-pro"), "models/gemini-1.5-pro");
    }
}
