//! HTTP routes driven through the router without a socket

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

use docqa::{router, AppState, IndexService};
use docqa_core::{
    Error, GenerationConfig, GenerationResult, IndexingConfig, LLMProvider, ProviderKind, Result,
};
use docqa_llm::FakeEmbedding;

const BOUNDARY: &str = "docqa-test-boundary";

/// Answers every prompt with the same text, or fails every call
struct CannedLlm {
    answer: Option<String>,
}

#[async_trait]
impl LLMProvider for CannedLlm {
    async fn generate_with_config(
        &self,
        _prompt: &str,
        config: &GenerationConfig,
    ) -> Result<GenerationResult> {
        match &self.answer {
            Some(text) => Ok(GenerationResult {
                text: text.clone(),
                model_id: config.model_id.clone(),
                tokens_used: None,
            }),
            None => Err(Error::LLMProvider("upstream unavailable".to_string())),
        }
    }

    fn provider(&self) -> ProviderKind {
        ProviderKind::Ollama
    }

    fn model_id(&self) -> &str {
        "canned"
    }
}

struct TestApp {
    router: Router,
    uploads: TempDir,
}

fn app_with(answer: Option<&str>) -> TestApp {
    let llm = Arc::new(CannedLlm {
        answer: answer.map(str::to_string),
    });
    let service = IndexService::new(llm, Arc::new(FakeEmbedding::default()), &IndexingConfig::default())
        .unwrap();
    let uploads = TempDir::new().unwrap();
    let state = AppState::new(Arc::new(service), uploads.path());

    TestApp {
        router: router(state),
        uploads,
    }
}

fn app() -> TestApp {
    app_with(Some("Canned answer"))
}

fn multipart_body(parts: &[(&str, Option<&str>, &str)]) -> Body {
    let mut body = String::new();
    for (field, file_name, content) in parts {
        body.push_str(&format!("--{}\r\n", BOUNDARY));
        match file_name {
            Some(name) => body.push_str(&format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: text/plain\r\n\r\n",
                field, name
            )),
            None => body.push_str(&format!(
                "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                field
            )),
        }
        body.push_str(content);
        body.push_str("\r\n");
    }
    body.push_str(&format!("--{}--\r\n", BOUNDARY));
    Body::from(body)
}

fn upload_request(parts: &[(&str, Option<&str>, &str)]) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(multipart_body(parts))
        .unwrap()
}

fn json_request(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, body)
}

#[tokio::test]
async fn test_upload_then_query() {
    let app = app();

    let (status, body) = send(
        &app.router,
        upload_request(&[("files[]", Some("hello.txt"), "hello world")]),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "success", "documents_processed": 1}));

    // Uploaded files do not outlive the request
    assert_eq!(std::fs::read_dir(app.uploads.path()).unwrap().count(), 0);

    let (status, body) = send(
        &app.router,
        json_request("/query", json!({"question": "what does it say?", "template_type": "default"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"], "Canned answer");

    let sources = body["source_nodes"].as_array().unwrap();
    assert!(!sources.is_empty());
    assert!(sources[0]["text"].as_str().unwrap().contains("hello world"));
    assert!(sources[0]["score"].is_number());
    assert_eq!(sources[0]["metadata"]["file_name"], "hello.txt");
}

#[tokio::test]
async fn test_upload_counts_only_supported_files() {
    let app = app();

    let (status, body) = send(
        &app.router,
        upload_request(&[
            ("files[]", Some("a.txt"), "alpha"),
            ("files[]", Some("b.json"), r#"{"beta": true}"#),
            ("files[]", Some("c.exe"), "MZ"),
        ]),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["documents_processed"], 2);
}

#[tokio::test]
async fn test_upload_rejections() {
    let app = app();

    let (status, body) = send(&app.router, upload_request(&[("other", None, "x")])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "No files provided"}));

    let (status, body) = send(&app.router, upload_request(&[("files[]", Some(""), "")])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "No files selected"}));

    let (status, body) = send(&app.router, upload_request(&[("files[]", Some("../"), "x")])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "No files were successfully saved"}));

    assert_eq!(std::fs::read_dir(app.uploads.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_query_before_upload() {
    let app = app();

    let (status, body) = send(&app.router, json_request("/query", json!({"question": "hi?"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "No documents have been indexed yet"}));
}

#[tokio::test]
async fn test_query_without_rag() {
    let app = app();

    let (status, body) = send(
        &app.router,
        json_request("/query", json!({"question": "hi?", "use_rag": false, "template_type": "concise"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"response": "Canned answer", "source_nodes": []}));
}

#[tokio::test]
async fn test_query_rejections() {
    let app = app();

    let (status, body) = send(
        &app.router,
        json_request("/query", json!({"question": "hi?", "template_type": "haiku"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "Invalid template type. Choose from: default, professional, concise, step_by_step, bank_teller"
    );

    let (status, body) = send(&app.router, json_request("/query", json!({"top_k": 2}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing question parameter");

    let (status, body) = send(&app.router, json_request("/query", json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No data provided");

    let (status, body) = send(
        &app.router,
        json_request("/query", json!({"question": "hi?", "top_k": 0})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "top_k must be at least 1");

    let malformed = Request::builder()
        .method(Method::POST)
        .uri("/query")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&app.router, malformed).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_upstream_failure_is_internal_error() {
    let app = app_with(None);

    let (status, body) = send(
        &app.router,
        json_request("/query", json!({"question": "hi?", "use_rag": false})),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "LLM provider error: upstream unavailable");
}

#[tokio::test]
async fn test_query_preflight() {
    let app = app();

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/query")
        .header(header::ORIGIN, "http://localhost:3000")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
}

#[tokio::test]
async fn test_query_account() {
    let app = app_with(Some("Groceries were 70% of spending, roughly $350. Dining was 30%."));

    let (status, body) = send(
        &app.router,
        json_request(
            "/query-account",
            json!({"transaction_data": [
                {"type": "debit", "amount": 350, "category": "groceries"},
                {"type": "credit", "amount": 1200, "category": "salary"}
            ]}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let response = body["response"].as_str().unwrap();
    assert!(response.starts_with("Here is a summary of your spending habits."));
    assert!(!response.contains('$'));
    assert!(response.contains("70%"));

    let (status, _) = send(
        &app.router,
        json_request("/query-account", json!({"transaction_data": "2024-05-01 debit rent"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_query_account_rejections() {
    let app = app();

    for body in [json!({}), json!({"transaction_data": []}), json!({"transaction_data": "  "})] {
        let (status, body) = send(&app.router, json_request("/query-account", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing transaction_data parameter");
    }
}

#[tokio::test]
async fn test_templates_and_index_page() {
    let app = app();

    let request = Request::builder().uri("/templates").body(Body::empty()).unwrap();
    let (status, body) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!(["default", "professional", "concise", "step_by_step", "bank_teller"])
    );

    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let (status, body) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_str().unwrap().contains("<title>docqa</title>"));
}
