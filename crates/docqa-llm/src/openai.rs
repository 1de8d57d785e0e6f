//! OpenAI client and the chat-completions wire format shared with Groq

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use docqa_core::{
    Error, GenerationConfig, GenerationResult, LLMProvider, ProviderKind, Result,
};

use crate::config::LlmConfig;
use crate::http::{bearer_client, check_status, endpoint};

#[derive(Debug, Serialize)]
pub(crate) struct ChatMessage<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "no_stop_sequences")]
    pub stop: &'a [String],
}

fn no_stop_sequences(stop: &&[String]) -> bool {
    stop.is_empty()
}

impl<'a> ChatCompletionRequest<'a> {
    pub fn single_turn(prompt: &'a str, config: &'a GenerationConfig) -> Self {
        Self {
            model: &config.model_id,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: config.temperature,
            top_p: config.top_p,
            max_tokens: config.max_tokens,
            stop: &config.stop_sequences,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    total_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

impl ChatCompletionResponse {
    /// First choice's text and the reported token usage
    pub fn into_text(self, vendor: &str) -> Result<(String, Option<u32>)> {
        let tokens = self.usage.and_then(|u| u.total_tokens);
        let text = self
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(Error::LLMProvider(format!("Empty response from {}", vendor)));
        }

        Ok((text, tokens))
    }
}

/// Client for any endpoint speaking the OpenAI chat-completions protocol
#[derive(Debug, Clone)]
pub(crate) struct ChatCompletionsClient {
    client: Client,
    base_url: String,
    vendor: &'static str,
}

impl ChatCompletionsClient {
    pub fn new(client: Client, base_url: &str, vendor: &'static str) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
            vendor,
        }
    }

    pub async fn create(&self, prompt: &str, config: &GenerationConfig) -> Result<GenerationResult> {
        let request = ChatCompletionRequest::single_turn(prompt, config);
        let url = endpoint(&self.base_url, "chat/completions");

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;
        let response = check_status(response, self.vendor).await?;

        let body: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| Error::Serialization(e.to_string()))?;
        let (text, tokens_used) = body.into_text(self.vendor)?;

        Ok(GenerationResult {
            text,
            model_id: config.model_id.clone(),
            tokens_used,
        })
    }
}

/// OpenAI chat-completions client
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    inner: ChatCompletionsClient,
    model: String,
}

impl OpenAiClient {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let client = bearer_client(&config.openai_api_key, config)?;
        Ok(Self {
            inner: ChatCompletionsClient::new(client, &config.openai_base_url, "OpenAI"),
            model: config.openai_model.clone(),
        })
    }
}

#[async_trait]
impl LLMProvider for OpenAiClient {
    async fn generate_with_config(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<GenerationResult> {
        self.inner.create(prompt, config).await
    }

    fn provider(&self) -> ProviderKind {
        ProviderKind::OpenAi
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}
