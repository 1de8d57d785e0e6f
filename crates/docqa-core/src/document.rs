//! Documents, query results and indexing types

use serde::{Deserialize, Serialize};

/// A loaded source document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub text: String,
    pub metadata: serde_json::Value,
}

/// A retrieved passage with its relevance score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceNode {
    pub text: String,
    pub score: f32,
    pub metadata: serde_json::Value,
}

/// Answer to a question, with the passages that informed it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub response: String,
    pub source_nodes: Vec<SourceNode>,
}

impl QueryResult {
    /// An answer produced without retrieval
    pub fn direct(response: String) -> Self {
        Self {
            response,
            source_nodes: Vec::new(),
        }
    }
}

/// Result of an indexing operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexingResult {
    pub status: String,
    pub documents_processed: usize,
}

impl IndexingResult {
    pub fn success(documents_processed: usize) -> Self {
        Self {
            status: "success".to_string(),
            documents_processed,
        }
    }
}

/// Configuration for document indexing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexingConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub batch_size: usize,
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1024,
            chunk_overlap: 200,
            batch_size: 100,
        }
    }
}
