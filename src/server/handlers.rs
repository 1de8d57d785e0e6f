//! API request handlers

use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, State};
use axum::response::{Html, IntoResponse};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use docqa_core::{IndexingResult, QueryResult};

use super::error::{ApiError, ApiResult};
use super::upload::UploadBatch;
use super::AppState;

const INDEX_PAGE: &str = include_str!("../../static/index.html");

/// Multipart field carrying the uploaded files
pub const FILES_FIELD: &str = "files[]";

/// Query request body
#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub question: Option<String>,
    pub top_k: Option<usize>,
    pub template_type: Option<String>,
    pub use_rag: Option<bool>,
}

/// Account summary request body
#[derive(Debug, Deserialize)]
pub struct AccountQueryRequest {
    pub transaction_data: Option<Value>,
}

/// Account summary response body
#[derive(Debug, Serialize)]
pub struct AccountQueryResponse {
    pub response: String,
}

pub async fn index_page() -> Html<&'static str> {
    Html(INDEX_PAGE)
}

/// Save the uploaded files, index them, then remove them again
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<IndexingResult>> {
    let mut files: Vec<(Option<String>, Bytes)> = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILES_FIELD) {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let data = field.bytes().await?;
        files.push((file_name, data));
    }

    if files.is_empty() {
        return Err(ApiError::bad_request("No files provided"));
    }
    if files[0].0.as_deref().is_none_or(str::is_empty) {
        return Err(ApiError::bad_request("No files selected"));
    }

    let mut batch = UploadBatch::create(&state.upload_dir).await?;
    for (file_name, data) in &files {
        if let Some(name) = file_name.as_deref().filter(|name| !name.is_empty()) {
            batch.save(name, data).await;
        }
    }

    if batch.saved().is_empty() {
        batch.cleanup().await;
        return Err(ApiError::bad_request("No files were successfully saved"));
    }

    let result = state.service.create_index(Some(batch.dir())).await;
    batch.cleanup().await;

    let result = result?;
    info!("Index created with result: {:?}", result);
    Ok(Json(result))
}

pub async fn query(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<QueryResult>> {
    let Json(body) = body.map_err(|e| ApiError::bad_request(e.body_text()))?;
    if body.is_null() || body.as_object().is_some_and(|map| map.is_empty()) {
        return Err(ApiError::bad_request("No data provided"));
    }

    let request: QueryRequest = serde_json::from_value(body)
        .map_err(|e| ApiError::bad_request(format!("Invalid request: {}", e)))?;
    let question = request
        .question
        .ok_or_else(|| ApiError::bad_request("Missing question parameter"))?;

    debug!(
        "Using template: {}",
        request.template_type.as_deref().unwrap_or("default")
    );

    let result = state
        .service
        .query_with_template_name(
            &question,
            request.top_k,
            request.template_type.as_deref(),
            request.use_rag.unwrap_or(true),
        )
        .await?;

    Ok(Json(result))
}

pub async fn query_account(
    State(state): State<AppState>,
    body: Result<Json<AccountQueryRequest>, JsonRejection>,
) -> ApiResult<Json<AccountQueryResponse>> {
    let Json(request) = body.map_err(|e| ApiError::bad_request(e.body_text()))?;

    let transactions = match request.transaction_data {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(records)) => records,
        Some(Value::String(text)) if text.trim().is_empty() => Vec::new(),
        Some(other) => vec![other],
    };
    if transactions.is_empty() {
        return Err(ApiError::bad_request("Missing transaction_data parameter"));
    }

    let response = state.service.query_account(&transactions).await?;
    Ok(Json(AccountQueryResponse { response }))
}

pub async fn templates(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.service.templates())
}
