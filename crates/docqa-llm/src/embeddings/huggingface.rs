//! Locally served Hugging Face sentence-embedding model
//!
//! Talks to a text-embeddings-inference server (`POST /embed`). The server
//! caps request size, so large batches are split and sent concurrently.

use async_trait::async_trait;
use futures::future::try_join_all;
use reqwest::Client;
use serde::Serialize;

use docqa_core::{EmbeddingModel, Error, Result};

use crate::config::LlmConfig;
use crate::http::{check_status, endpoint, plain_client};

/// Model the embedding server is expected to serve
pub const HUGGINGFACE_MODEL: &str = "BAAI/bge-small-en";

/// Default `--max-client-batch-size` of text-embeddings-inference
const MAX_CLIENT_BATCH: usize = 32;

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    inputs: &'a [String],
    truncate: bool,
}

#[derive(Debug, Clone)]
pub struct HuggingFaceEmbedding {
    client: Client,
    base_url: String,
    model: String,
}

impl HuggingFaceEmbedding {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        Ok(Self {
            client: plain_client(config)?,
            base_url: config.huggingface_base_url.clone(),
            model: HUGGINGFACE_MODEL.to_string(),
        })
    }

    async fn embed_chunk(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let request = EmbedRequest {
            inputs: texts,
            truncate: true,
        };

        let response = self
            .client
            .post(endpoint(&self.base_url, "embed"))
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;
        let response = check_status(response, "Hugging Face").await?;

        let vectors: Vec<Vec<f32>> = response
            .json()
            .await
            .map_err(|e| Error::Serialization(e.to_string()))?;

        if vectors.len() != texts.len() {
            return Err(Error::Embedding(format!(
                "Embedding server returned {} vectors for {} inputs",
                vectors.len(),
                texts.len()
            )));
        }
        Ok(vectors)
    }
}

#[async_trait]
impl EmbeddingModel for HuggingFaceEmbedding {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let chunks = try_join_all(
            texts
                .chunks(MAX_CLIENT_BATCH)
                .map(|chunk| self.embed_chunk(chunk)),
        )
        .await?;
        Ok(chunks.into_iter().flatten().collect())
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
