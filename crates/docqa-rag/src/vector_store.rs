//! In-memory vector store

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use docqa_core::{Error, Result, SearchConfig, SearchResult, VectorDocument, VectorStore};

/// Vector store held entirely in memory, searched by cosine similarity
#[derive(Debug, Default)]
pub struct InMemoryVectorStore {
    documents: RwLock<HashMap<String, VectorDocument>>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
        if a.len() != b.len() {
            return 0.0;
        }

        let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }

        dot_product / (norm_a * norm_b)
    }
}

fn lock_error<E: std::fmt::Display>(e: E) -> Error {
    Error::VectorStore(format!("Lock error: {}", e))
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn store_batch(&self, documents: Vec<VectorDocument>) -> Result<Vec<String>> {
        let mut docs = self.documents.write().map_err(lock_error)?;
        let mut ids = Vec::with_capacity(documents.len());

        for document in documents {
            ids.push(document.id.clone());
            docs.insert(document.id.clone(), document);
        }

        Ok(ids)
    }

    async fn search_by_vector(&self, vector: &[f32], config: &SearchConfig) -> Result<SearchResult> {
        let docs = self.documents.read().map_err(lock_error)?;

        let mut results: Vec<VectorDocument> = docs
            .values()
            .map(|doc| {
                let mut scored = doc.clone();
                scored.score = Some(Self::cosine_similarity(vector, &doc.embedding));
                scored
            })
            .filter(|doc| match config.score_threshold {
                Some(threshold) => doc.score.unwrap_or(0.0) >= threshold,
                None => true,
            })
            .collect();

        // Ties broken by id so results are stable across runs
        results.sort_by(|a, b| {
            b.score
                .unwrap_or(0.0)
                .total_cmp(&a.score.unwrap_or(0.0))
                .then_with(|| a.id.cmp(&b.id))
        });
        results.truncate(config.top_k);

        let total = results.len();
        Ok(SearchResult {
            documents: results,
            total,
        })
    }

    async fn get(&self, id: &str) -> Result<Option<VectorDocument>> {
        let docs = self.documents.read().map_err(lock_error)?;
        Ok(docs.get(id).cloned())
    }

    async fn count(&self) -> Result<usize> {
        let docs = self.documents.read().map_err(lock_error)?;
        Ok(docs.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(id: &str, embedding: Vec<f32>) -> VectorDocument {
        VectorDocument {
            id: id.to_string(),
            content: format!("content of {}", id),
            embedding,
            metadata: json!({}),
            score: None,
        }
    }

    #[tokio::test]
    async fn test_store_and_get() {
        let store = InMemoryVectorStore::new();
        let ids = store
            .store_batch(vec![doc("a", vec![1.0, 0.0]), doc("b", vec![0.0, 1.0])])
            .await
            .unwrap();

        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(store.count().await.unwrap(), 2);
        assert!(store.get("a").await.unwrap().is_some());
        assert!(store.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_search_orders_by_similarity() {
        let store = InMemoryVectorStore::new();
        store
            .store_batch(vec![
                doc("far", vec![0.0, 1.0]),
                doc("near", vec![1.0, 0.1]),
                doc("exact", vec![2.0, 0.0]),
            ])
            .await
            .unwrap();

        let config = SearchConfig {
            top_k: 2,
            score_threshold: None,
        };
        let result = store.search_by_vector(&[1.0, 0.0], &config).await.unwrap();

        let ids: Vec<&str> = result.documents.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["exact", "near"]);
        assert_eq!(result.total, 2);
        assert!((result.documents[0].score.unwrap() - 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_score_threshold() {
        let store = InMemoryVectorStore::new();
        store
            .store_batch(vec![doc("orthogonal", vec![0.0, 1.0]), doc("same", vec![1.0, 0.0])])
            .await
            .unwrap();

        let config = SearchConfig {
            top_k: 10,
            score_threshold: Some(0.5),
        };
        let result = store.search_by_vector(&[1.0, 0.0], &config).await.unwrap();
        assert_eq!(result.total, 1);
        assert_eq!(result.documents[0].id, "same");
    }

    #[test]
    fn test_cosine_similarity_edge_cases() {
        assert_eq!(InMemoryVectorStore::cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
        assert_eq!(InMemoryVectorStore::cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }
}
