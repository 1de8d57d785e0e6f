//! Service configuration

use serde::Serialize;
use std::env;
use std::path::PathBuf;

use docqa_core::{Error, IndexingConfig, Result};
use docqa_llm::LlmConfig;

/// Where the HTTP server listens and keeps uploads
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub upload_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5050,
            upload_dir: PathBuf::from("uploads"),
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Everything the service needs at startup
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub indexing: IndexingConfig,
}

impl AppConfig {
    /// Load from the environment, reading `.env` first when present
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let llm = LlmConfig::from_lookup(&lookup)?;
        let server_defaults = ServerConfig::default();
        let indexing_defaults = IndexingConfig::default();

        let server = ServerConfig {
            host: lookup("DOCQA_HOST").unwrap_or(server_defaults.host),
            port: parse_env(&lookup, "DOCQA_PORT", server_defaults.port)?,
            upload_dir: lookup("DOCQA_UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(server_defaults.upload_dir),
        };

        let indexing = IndexingConfig {
            chunk_size: parse_env(&lookup, "CHUNK_SIZE", indexing_defaults.chunk_size)?,
            chunk_overlap: parse_env(&lookup, "CHUNK_OVERLAP", indexing_defaults.chunk_overlap)?,
            batch_size: llm.embedding_batch_size,
        };

        if indexing.chunk_overlap >= indexing.chunk_size {
            return Err(Error::Configuration(format!(
                "CHUNK_OVERLAP ({}) must be smaller than CHUNK_SIZE ({})",
                indexing.chunk_overlap, indexing.chunk_size
            )));
        }

        Ok(Self {
            server,
            llm,
            indexing,
        })
    }
}

fn parse_env<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| {
            Error::Configuration(format!("{} must be a positive integer, got {:?}", key, value))
        }),
    }
}
