//! Ollama embeddings (`/api/embed`)

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use docqa_core::{EmbeddingModel, Error, Result};

use crate::config::LlmConfig;
use crate::http::{check_status, endpoint, plain_client};

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

/// Local embedding model served by Ollama
#[derive(Debug, Clone)]
pub struct OllamaEmbedding {
    client: Client,
    base_url: String,
    model: String,
    batch_size: usize,
}

impl OllamaEmbedding {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        Ok(Self {
            client: plain_client(config)?,
            base_url: config.ollama_base_url.clone(),
            model: config.embedding_model.clone(),
            batch_size: config.embedding_batch_size.max(1),
        })
    }
}

#[async_trait]
impl EmbeddingModel for OllamaEmbedding {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let url = endpoint(&self.base_url, "api/embed");
        let mut vectors = Vec::with_capacity(texts.len());

        for chunk in texts.chunks(self.batch_size) {
            let request = EmbedRequest {
                model: &self.model,
                input: chunk,
            };

            let response = self
                .client
                .post(&url)
                .json(&request)
                .send()
                .await
                .map_err(|e| Error::Network(e.to_string()))?;
            let response = check_status(response, "Ollama").await?;

            let body: EmbedResponse = response
                .json()
                .await
                .map_err(|e| Error::Serialization(e.to_string()))?;

            if body.embeddings.len() != chunk.len() {
                return Err(Error::Embedding(format!(
                    "Ollama returned {} embeddings for {} inputs",
                    body.embeddings.len(),
                    chunk.len()
                )));
            }
            vectors.extend(body.embeddings);
        }

        Ok(vectors)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
