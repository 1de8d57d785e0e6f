use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use docqa::{serve, AppConfig, AppState, IndexService};
use docqa_core::{EmbeddingModel, LLMProvider};
use docqa_llm::LlmClient;

#[derive(Parser)]
#[command(name = "docqa")]
#[command(about = "Document question answering service", long_about = None)]
struct Cli {
    /// Address to bind (overrides DOCQA_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides DOCQA_PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Directory for uploaded files (overrides DOCQA_UPLOAD_DIR)
    #[arg(long)]
    upload_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = AppConfig::from_env().context("Failed to load configuration")?;

    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(upload_dir) = cli.upload_dir {
        config.server.upload_dir = upload_dir;
    }

    let llm = LlmClient::from_config(&config.llm)?;
    let embed_model = llm.embedding_model(&config.llm.embedding_provider, &config.llm)?;
    info!(
        "Using {} model {} with {} embeddings",
        llm.provider(),
        llm.model_id(),
        embed_model.model_name()
    );

    let retrieval_llm = llm.clone().into_retrieval_llm();
    let service = IndexService::new(Arc::new(llm), embed_model, &config.indexing)?
        .with_retrieval_llm(retrieval_llm);
    let state = AppState::new(Arc::new(service), config.server.upload_dir.clone());

    serve(&config.server, state)
        .await
        .context("HTTP server failed")?;

    Ok(())
}
