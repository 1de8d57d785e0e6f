//! HTTP surface of the service

mod error;
mod handlers;
mod upload;

use axum::extract::{DefaultBodyLimit, Request};
use axum::http::{Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use docqa_rag::IndexService;

use crate::config::ServerConfig;

pub use error::{ApiError, ApiResult};
pub use handlers::{AccountQueryRequest, AccountQueryResponse, QueryRequest, FILES_FIELD};
pub use upload::{sanitize_filename, UploadBatch};

/// Largest accepted request body
pub const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// State shared by all handlers
#[derive(Debug, Clone)]
pub struct AppState {
    pub service: Arc<IndexService>,
    pub upload_dir: PathBuf,
}

impl AppState {
    pub fn new(service: Arc<IndexService>, upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            service,
            upload_dir: upload_dir.into(),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index_page))
        .route("/upload", post(handlers::upload))
        .route("/query", post(handlers::query))
        .route("/query-account", post(handlers::query_account))
        .route("/templates", get(handlers::templates))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CorsLayer::permissive())
        .layer(middleware::from_fn(preflight_no_content))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Preflight requests are answered by the CORS layer; report them as 204
async fn preflight_no_content(request: Request, next: Next) -> Response {
    let is_options = request.method() == Method::OPTIONS;
    let mut response = next.run(request).await;

    if is_options && response.status() == StatusCode::OK {
        *response.status_mut() = StatusCode::NO_CONTENT;
    }
    response
}

/// Serve until Ctrl-C
pub async fn serve(config: &ServerConfig, state: AppState) -> std::io::Result<()> {
    tokio::fs::create_dir_all(&state.upload_dir).await?;

    let listener = TcpListener::bind(config.bind_address()).await?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutting down");
    }
}
