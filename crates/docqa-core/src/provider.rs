//! Provider identities
//!
//! Completion and embedding backends are selected independently, each by a
//! closed set of names. Parsing is the only way in, so an unregistered name
//! never reaches client construction.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Completion backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    OpenAi,
    Groq,
    Gemini,
    Ollama,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 4] = [
        ProviderKind::OpenAi,
        ProviderKind::Groq,
        ProviderKind::Gemini,
        ProviderKind::Ollama,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Groq => "groq",
            ProviderKind::Gemini => "gemini",
            ProviderKind::Ollama => "ollama",
        }
    }
}

impl FromStr for ProviderKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| Error::UnsupportedProvider(s.to_string()))
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Embedding backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProviderKind {
    /// Vendor-hosted OpenAI embeddings
    OpenAi,
    /// Local model served by Ollama
    Ollama,
    /// Locally served sentence-embedding model (text-embeddings-inference)
    HuggingFace,
    /// Deterministic test double, no network
    Fake,
}

impl EmbeddingProviderKind {
    pub const ALL: [EmbeddingProviderKind; 4] = [
        EmbeddingProviderKind::OpenAi,
        EmbeddingProviderKind::Ollama,
        EmbeddingProviderKind::HuggingFace,
        EmbeddingProviderKind::Fake,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EmbeddingProviderKind::OpenAi => "openai",
            EmbeddingProviderKind::Ollama => "ollama",
            EmbeddingProviderKind::HuggingFace => "huggingface",
            EmbeddingProviderKind::Fake => "fake",
        }
    }
}

impl FromStr for EmbeddingProviderKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| Error::UnsupportedEmbeddingProvider(s.to_string()))
    }
}

impl fmt::Display for EmbeddingProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
