//! OpenAI embeddings (`/embeddings`)

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use docqa_core::{EmbeddingModel, Error, Result};

use crate::config::LlmConfig;
use crate::http::{bearer_client, check_status, endpoint};

#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingData>,
}

impl EmbeddingsResponse {
    /// Vectors in input order; the API does not promise ordered `data`
    fn into_vectors(mut self, expected: usize) -> Result<Vec<Vec<f32>>> {
        if self.data.len() != expected {
            return Err(Error::Embedding(format!(
                "OpenAI returned {} embeddings for {} inputs",
                self.data.len(),
                expected
            )));
        }
        self.data.sort_by_key(|d| d.index);
        Ok(self.data.into_iter().map(|d| d.embedding).collect())
    }
}

/// Vendor-hosted OpenAI embedding model
#[derive(Debug, Clone)]
pub struct OpenAiEmbedding {
    client: Client,
    base_url: String,
    model: String,
    batch_size: usize,
}

impl OpenAiEmbedding {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        Ok(Self {
            client: bearer_client(&config.openai_api_key, config)?,
            base_url: config.openai_base_url.clone(),
            model: config.embedding_model.clone(),
            batch_size: config.embedding_batch_size.max(1),
        })
    }

    async fn embed_chunk(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let request = EmbeddingsRequest {
            model: &self.model,
            input: texts,
        };

        let response = self
            .client
            .post(endpoint(&self.base_url, "embeddings"))
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;
        let response = check_status(response, "OpenAI").await?;

        let body: EmbeddingsResponse = response
            .json()
            .await
            .map_err(|e| Error::Serialization(e.to_string()))?;
        body.into_vectors(texts.len())
    }
}

#[async_trait]
impl EmbeddingModel for OpenAiEmbedding {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(self.batch_size) {
            vectors.extend(self.embed_chunk(chunk).await?);
        }
        Ok(vectors)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_out_of_order_data_is_sorted() {
        let body: EmbeddingsResponse = serde_json::from_value(json!({
            "object": "list",
            "data": [
                {"object": "embedding", "index": 1, "embedding": [0.0, 1.0]},
                {"object": "embedding", "index": 0, "embedding": [1.0, 0.0]}
            ],
            "model": "text-embedding-3-small"
        }))
        .unwrap();

        assert_eq!(body.into_vectors(2).unwrap(), vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[test]
    fn test_count_mismatch_is_error() {
        let body: EmbeddingsResponse = serde_json::from_value(json!({
            "data": [{"index": 0, "embedding": [1.0]}]
        }))
        .unwrap();
        assert!(matches!(body.into_vectors(2), Err(Error::Embedding(_))));
    }
}
