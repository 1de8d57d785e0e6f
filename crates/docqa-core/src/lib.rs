//! Core traits and types for docqa
//!
//! This crate defines the fundamental traits and types used across the docqa
//! system: the LLM and embedding provider interfaces, provider identities,
//! QA templates, vector store interface, documents and query results.

pub mod document;
pub mod embedding;
pub mod error;
pub mod llm;
pub mod provider;
pub mod templates;
pub mod vector_store;


pub use document::{Document, IndexingConfig, IndexingResult, QueryResult, SourceNode};
pub use embedding::EmbeddingModel;
pub use error::{Error, Result};
pub use llm::{GenerationConfig, GenerationResult, LLMProvider, RetrievalLlm};
pub use provider::{EmbeddingProviderKind, ProviderKind};
pub use templates::QaTemplate;
pub use vector_store::{SearchConfig, SearchResult, VectorDocument, VectorStore};
