//! Vector index over split documents

use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info};

use docqa_core::{
    Document, EmbeddingModel, Error, Result, SearchConfig, SourceNode, VectorDocument,
    VectorStore,
};

use crate::splitter::TextSplitter;
use crate::vector_store::InMemoryVectorStore;

/// An immutable, searchable index built from a set of documents.
///
/// Once built an index is never mutated; re-indexing builds a new one.
pub struct VectorIndex {
    embed_model: Arc<dyn EmbeddingModel>,
    store: InMemoryVectorStore,
    document_count: usize,
    node_count: usize,
}

impl VectorIndex {
    /// An index with no documents
    pub fn empty(embed_model: Arc<dyn EmbeddingModel>) -> Self {
        Self {
            embed_model,
            store: InMemoryVectorStore::new(),
            document_count: 0,
            node_count: 0,
        }
    }

    /// Split, embed and store `documents`, embedding `batch_size` nodes per
    /// request.
    pub async fn from_documents(
        documents: &[Document],
        embed_model: Arc<dyn EmbeddingModel>,
        splitter: &TextSplitter,
        batch_size: usize,
    ) -> Result<Self> {
        let mut nodes = Vec::new();

        for document in documents {
            let chunks = splitter.split(&document.text);
            let total_chunks = chunks.len();

            for (i, chunk) in chunks.into_iter().enumerate() {
                let mut metadata = document.metadata.clone();
                metadata["document_id"] = json!(document.id);
                metadata["chunk_index"] = json!(i);
                metadata["total_chunks"] = json!(total_chunks);

                nodes.push(VectorDocument {
                    id: format!("{}_{}", document.id, i),
                    content: chunk.to_string(),
                    embedding: Vec::new(),
                    metadata,
                    score: None,
                });
            }
        }

        for batch in nodes.chunks_mut(batch_size.max(1)) {
            let texts: Vec<String> = batch.iter().map(|node| node.content.clone()).collect();
            let vectors = embed_model.embed_batch(&texts).await?;

            if vectors.len() != batch.len() {
                return Err(Error::Embedding(format!(
                    "Expected {} embeddings, got {}",
                    batch.len(),
                    vectors.len()
                )));
            }

            for (node, vector) in batch.iter_mut().zip(vectors) {
                node.embedding = vector;
            }
            debug!("Embedded batch of {} nodes", batch.len());
        }

        let node_count = nodes.len();
        let store = InMemoryVectorStore::new();
        store.store_batch(nodes).await?;

        info!(
            "Built index with {} documents and {} nodes using {}",
            documents.len(),
            node_count,
            embed_model.model_name()
        );

        Ok(Self {
            embed_model,
            store,
            document_count: documents.len(),
            node_count,
        })
    }

    /// The `top_k` nodes most similar to `question`, best first
    pub async fn retrieve(&self, question: &str, top_k: usize) -> Result<Vec<SourceNode>> {
        if self.node_count == 0 {
            return Ok(Vec::new());
        }

        let vector = self.embed_model.embed_query(question).await?;
        let config = SearchConfig {
            top_k,
            score_threshold: None,
        };
        let result = self.store.search_by_vector(&vector, &config).await?;

        Ok(result
            .documents
            .into_iter()
            .map(|doc| SourceNode {
                text: doc.content,
                score: doc.score.unwrap_or(0.0),
                metadata: doc.metadata,
            })
            .collect())
    }

    pub fn document_count(&self) -> usize {
        self.document_count
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn is_empty(&self) -> bool {
        self.document_count == 0
    }
}

impl std::fmt::Debug for VectorIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorIndex")
            .field("embed_model", &self.embed_model.model_name())
            .field("document_count", &self.document_count)
            .field("node_count", &self.node_count)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docqa_llm::FakeEmbedding;

    fn document(id: &str, text: &str) -> Document {
        Document {
            id: id.to_string(),
            text: text.to_string(),
            metadata: json!({"file_name": id}),
        }
    }

    #[tokio::test]
    async fn test_build_and_retrieve() {
        let documents = vec![
            document("fruit.txt", "apples and pears grow on trees"),
            document("space.txt", "rockets travel to orbit around the moon"),
        ];
        let splitter = TextSplitter::new(50, 5).unwrap();

        let index = VectorIndex::from_documents(&documents, Arc::new(FakeEmbedding::default()), &splitter, 1)
            .await
            .unwrap();

        assert_eq!(index.document_count(), 2);
        assert_eq!(index.node_count(), 2);
        assert!(!index.is_empty());

        let nodes = index.retrieve("rockets to the moon", 1).await.unwrap();
        assert_eq!(nodes.len(), 1);
        assert!(nodes[0].text.contains("rockets"));
        assert_eq!(nodes[0].metadata["document_id"], "space.txt");
        assert_eq!(nodes[0].metadata["chunk_index"], 0);
        assert_eq!(nodes[0].metadata["total_chunks"], 1);
    }

    #[tokio::test]
    async fn test_chunks_become_nodes() {
        let text = (0..25).map(|i| format!("w{}", i)).collect::<Vec<_>>().join(" ");
        let splitter = TextSplitter::new(10, 0).unwrap();

        let index = VectorIndex::from_documents(
            &[document("long.txt", &text)],
            Arc::new(FakeEmbedding::default()),
            &splitter,
            2,
        )
        .await
        .unwrap();

        assert_eq!(index.document_count(), 1);
        assert_eq!(index.node_count(), 3);

        let nodes = index.retrieve("w3", 3).await.unwrap();
        assert_eq!(nodes.len(), 3);
        assert!(nodes.windows(2).all(|pair| pair[0].score >= pair[1].score));
    }

    #[tokio::test]
    async fn test_empty_index_retrieves_nothing() {
        let index = VectorIndex::empty(Arc::new(FakeEmbedding::default()));
        assert!(index.is_empty());
        assert!(index.retrieve("anything", 3).await.unwrap().is_empty());
    }
}
