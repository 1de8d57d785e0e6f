//! docqa: document question answering over HTTP
//!
//! Upload documents, index them, and ask questions answered with
//! retrieval-augmented generation through OpenAI, Groq, Gemini or Ollama.

pub mod config;
pub mod server;

pub use config::{AppConfig, ServerConfig};
pub use server::{router, serve, AppState};

pub use docqa_core::{Error, Result};
pub use docqa_rag::IndexService;
