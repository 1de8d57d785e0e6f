//! Provider configuration

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use url::Url;

use docqa_core::{Error, Result};

/// Placeholder key used when no real key is configured
pub const DUMMY_API_KEY: &str = "PLEASE_DO_NOT_USE_THIS_KEY";

/// Configuration for the language-model and embedding providers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmConfig {
    pub llm_provider: String,
    pub embedding_provider: String,

    pub openai_api_key: String,
    pub groq_api_key: String,
    pub gemini_api_key: String,

    pub openai_model: String,
    pub groq_model: String,
    pub gemini_model: String,
    pub ollama_model: String,

    pub embedding_model: String,
    pub embedding_batch_size: usize,

    pub openai_base_url: String,
    pub groq_base_url: String,
    pub gemini_base_url: String,
    pub ollama_base_url: String,
    pub huggingface_base_url: String,

    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            llm_provider: "ollama".to_string(),
            embedding_provider: "ollama".to_string(),
            openai_api_key: DUMMY_API_KEY.to_string(),
            groq_api_key: DUMMY_API_KEY.to_string(),
            gemini_api_key: DUMMY_API_KEY.to_string(),
            openai_model: "gpt-4o-mini".to_string(),
            groq_model: "mixtral-8x7b-32768".to_string(),
            gemini_model: "models/gemini-1.5-flash".to_string(),
            ollama_model: "llama3.2:latest".to_string(),
            embedding_model: "llama3.2:latest".to_string(),
            embedding_batch_size: 100,
            openai_base_url: "https://api.openai.com/v1".to_string(),
            groq_base_url: "https://api.groq.com/openai/v1".to_string(),
            gemini_base_url: "https://generativelanguage.googleapis.com".to_string(),
            ollama_base_url: "http://127.0.0.1:11434".to_string(),
            huggingface_base_url: "http://127.0.0.1:8080".to_string(),
            timeout_secs: 120,
        }
    }
}

impl LlmConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Create configuration from an arbitrary key lookup, falling back to
    /// defaults for missing keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let text = |key: &str, default: String| lookup(key).unwrap_or(default);

        let config = Self {
            llm_provider: text("LLM_PROVIDER", defaults.llm_provider),
            embedding_provider: text("EMBEDDING_PROVIDER", defaults.embedding_provider),
            openai_api_key: text("OPENAI_API_KEY", defaults.openai_api_key),
            groq_api_key: text("GROQ_API_KEY", defaults.groq_api_key),
            gemini_api_key: text("GEMINI_API_KEY", defaults.gemini_api_key),
            openai_model: text("OPENAI_MODEL", defaults.openai_model),
            groq_model: text("GROQ_MODEL", defaults.groq_model),
            gemini_model: text("GEMINI_MODEL", defaults.gemini_model),
            ollama_model: text("OLLAMA_MODEL", defaults.ollama_model),
            embedding_model: text("EMBEDDING_MODEL", defaults.embedding_model),
            embedding_batch_size: parse_number(
                "EMBEDDING_BATCH_SIZE",
                lookup("EMBEDDING_BATCH_SIZE"),
                defaults.embedding_batch_size,
            )?,
            openai_base_url: text("OPENAI_BASE_URL", defaults.openai_base_url),
            groq_base_url: text("GROQ_BASE_URL", defaults.groq_base_url),
            gemini_base_url: text("GEMINI_BASE_URL", defaults.gemini_base_url),
            ollama_base_url: text("OLLAMA_BASE_URL", defaults.ollama_base_url),
            huggingface_base_url: text("HUGGINGFACE_BASE_URL", defaults.huggingface_base_url),
            timeout_secs: parse_number(
                "LLM_TIMEOUT_SECS",
                lookup("LLM_TIMEOUT_SECS"),
                defaults.timeout_secs,
            )?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Check base URLs and numeric bounds
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("OPENAI_BASE_URL", &self.openai_base_url),
            ("GROQ_BASE_URL", &self.groq_base_url),
            ("GEMINI_BASE_URL", &self.gemini_base_url),
            ("OLLAMA_BASE_URL", &self.ollama_base_url),
            ("HUGGINGFACE_BASE_URL", &self.huggingface_base_url),
        ] {
            Url::parse(value).map_err(|e| {
                Error::Configuration(format!("{} is not a valid URL ({}): {}", name, value, e))
            })?;
        }

        if self.embedding_batch_size == 0 {
            return Err(Error::Configuration(
                "EMBEDDING_BATCH_SIZE must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: Option<String>, default: T) -> Result<T> {
    match raw {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| {
            Error::Configuration(format!("{} must be a positive integer, got {:?}", key, value))
        }),
    }
}
