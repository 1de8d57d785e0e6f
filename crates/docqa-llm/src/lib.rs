//! Language-model and embedding providers for docqa
//!
//! This crate provides the OpenAI, Groq, Gemini and Ollama implementations of
//! the `LLMProvider` trait, the registry that selects among them, and the
//! embedding backends.

mod client;
mod config;
mod embeddings;
mod gemini;
mod groq;
mod http;
mod ollama;
mod openai;


pub use client::{get_llm, LlmClient};
pub use config::{LlmConfig, DUMMY_API_KEY};
pub use embeddings::{
    build_embedding_model, embedding_model_for, FakeEmbedding, HuggingFaceEmbedding,
    OllamaEmbedding, OpenAiEmbedding,
};
pub use gemini::GeminiClient;
pub use groq::GroqClient;
pub use ollama::OllamaClient;
pub use openai::OpenAiClient;

// Re-export core types for convenience
pub use docqa_core::{
    EmbeddingModel, EmbeddingProviderKind, Error, GenerationConfig, GenerationResult,
    LLMProvider, ProviderKind, Result, RetrievalLlm,
};
