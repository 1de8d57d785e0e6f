//! Document loading, vector index and query routing for docqa
//!
//! This crate provides the document loader, the word-window splitter, the
//! in-memory vector index, the retrieval query engine and the `IndexService`
//! that ties them together.

mod account;
mod engine;
mod index;
mod loader;
mod service;
mod splitter;
mod vector_store;


pub use account::{
    build_account_prompt, normalize_account_summary, render_transactions, SUMMARY_PREFIX,
    SUMMARY_WORD_LIMIT,
};
pub use engine::{build_context, RetrievalQueryEngine, EMPTY_RESPONSE};
pub use index::VectorIndex;
pub use loader::DocumentLoader;
pub use service::{IndexService, IndexStatus, QueryParams, DEFAULT_TOP_K};
pub use splitter::TextSplitter;
pub use vector_store::InMemoryVectorStore;

// Re-export core types for convenience
pub use docqa_core::{
    Document, Error, IndexingConfig, IndexingResult, QaTemplate, QueryResult, Result,
    SourceNode,
};
