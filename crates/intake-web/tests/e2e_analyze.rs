//! End-to-end tests for the classification HTTP API.
//!
//! These tests spin up the **real** Axum router on an OS-assigned ephemeral
//! port, make actual HTTP requests via `reqwest`, and verify status codes and
//! JSON bodies.  Embedders are in-process fakes so no model server is needed.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::net::TcpListener;

use intake_embed::{EmbedError, Embedder, EmbedderHandle, Embedding};
use intake_intent::IntentResolver;
use intake_web::{AppState, WebConfig, router};

// ── helpers ──────────────────────────────────────────────────────────────────

/// Retrieve phrases on x, other actions on y, processes on z.  Known queries
/// come from a table; anything else embeds to the zero vector, which never
/// clears the threshold.
struct Axes {
    queries: HashMap<&'static str, Embedding>,
}

impl Axes {
    fn new() -> Self {
        let mut queries = HashMap::new();
        queries.insert("what is my balance", vec![1.0, 0.1, 0.0]);
        queries.insert("kick off the billing run", vec![0.0, 0.6, 1.0]);
        queries.insert("queue up the billing run", vec![0.0, 0.2, 1.0]);
        Self { queries }
    }
}

#[async_trait]
impl Embedder for Axes {
    fn model(&self) -> &str {
        "axes"
    }

    async fn embed(&self, text: &str) -> intake_embed::Result<Embedding> {
        if let Some(v) = self.queries.get(text) {
            return Ok(v.clone());
        }
        Ok(match text {
            "view" | "search" | "show" | "see" => vec![1.0, 0.0, 0.0],
            t if t.starts_with("process ") => vec![0.0, 0.0, 1.0],
            "create" | "add new" | "make" | "modify" | "update" | "edit" | "make changes"
            | "delete" | "remove" | "query" | "ask" | "analyze" => vec![0.0, 1.0, 0.0],
            _ => vec![0.0, 0.0, 0.0],
        })
    }
}

/// Fails every embedding request.
struct Unreachable;

#[async_trait]
impl Embedder for Unreachable {
    fn model(&self) -> &str {
        "unreachable"
    }

    async fn embed(&self, _text: &str) -> intake_embed::Result<Embedding> {
        Err(EmbedError::RequestFailed {
            reason: "connection reset".into(),
        })
    }
}

fn state_with(handle: EmbedderHandle, model: &str) -> Arc<AppState> {
    Arc::new(
        AppState::new(
            Arc::new(IntentResolver::default()),
            model,
            WebConfig::default(),
        )
        .with_embedder(handle),
    )
}

/// Bind to 127.0.0.1:0, start the router, return (base_url, server task).
async fn start_test_server(state: Arc<AppState>) -> (String, tokio::task::JoinHandle<()>) {
    let app = router(state);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind to port 0");
    let addr: SocketAddr = listener.local_addr().expect("get local addr");
    let base = format!("http://127.0.0.1:{}", addr.port());

    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    tokio::time::sleep(std::time::Duration::from_millis(10)).await;

    (base, handle)
}

async fn ready_server() -> String {
    let handle = EmbedderHandle::ready(Arc::new(Axes::new()));
    let (base, _srv) = start_test_server(state_with(handle, "axes")).await;
    base
}

async fn post_analyze(base: &str, body: Value) -> (u16, Value) {
    let resp = reqwest::Client::new()
        .post(format!("{base}/analyze"))
        .json(&body)
        .send()
        .await
        .expect("request failed");
    let status = resp.status().as_u16();
    let json: Value = resp.json().await.expect("invalid JSON");
    (status, json)
}

// ── POST /analyze: success ───────────────────────────────────────────────────

#[tokio::test]
async fn exact_action_and_process() {
    let base = ready_server().await;
    let (status, body) = post_analyze(
        &base,
        json!({ "text": "Please update process 3 for customer 42" }),
    )
    .await;

    assert_eq!(status, 200);
    assert_eq!(
        body,
        json!({ "action": "Update", "process": "process 3", "requestType": "Process Centric" })
    );
}

#[tokio::test]
async fn action_only_with_customer_is_complex() {
    let base = ready_server().await;
    let (status, body) =
        post_analyze(&base, json!({ "text": "show customer 42 orders" })).await;

    assert_eq!(status, 200);
    assert_eq!(body["action"], "Retrieve");
    assert_eq!(body["process"], "Not Found");
    assert_eq!(body["requestType"], "Complex");
}

#[tokio::test]
async fn action_only_without_customer_is_not_clear() {
    let base = ready_server().await;
    let (status, body) =
        post_analyze(&base, json!({ "text": "I'd like to view my account details" })).await;

    assert_eq!(status, 200);
    assert_eq!(
        body,
        json!({ "action": "Retrieve", "process": "Not Found", "requestType": "Not Clear" })
    );
}

#[tokio::test]
async fn semantic_fallback_fills_both_fields() {
    let base = ready_server().await;

    let (status, body) = post_analyze(&base, json!({ "text": "What is my balance" })).await;
    assert_eq!(status, 200);
    assert_eq!(body["action"], "Retrieve");
    assert_eq!(body["process"], "Not Found");

    // y scores 0.6 / sqrt(1.36) ~= 0.51 against every non-retrieve phrase;
    // the tie goes to "create", the first of them.
    let (status, body) =
        post_analyze(&base, json!({ "text": "Kick off the billing run" })).await;
    assert_eq!(status, 200);
    assert_eq!(
        body,
        json!({ "action": "Create", "process": "process 1", "requestType": "Process Centric" })
    );
}

#[tokio::test]
async fn weak_action_signal_is_not_clear() {
    let base = ready_server().await;
    // 0.2 / sqrt(1.04) ~= 0.196 against the action phrases: below the gate.
    let (status, body) =
        post_analyze(&base, json!({ "text": "queue up the billing run" })).await;

    assert_eq!(status, 200);
    assert_eq!(
        body,
        json!({ "action": "Not Found", "process": "process 1", "requestType": "Not Clear" })
    );
}

#[tokio::test]
async fn nothing_matches() {
    let base = ready_server().await;
    let (status, body) = post_analyze(&base, json!({ "text": "hello there" })).await;

    assert_eq!(status, 200);
    assert_eq!(
        body,
        json!({ "action": "Not Found", "process": "Not Found", "requestType": "Not Clear" })
    );
}

// ── POST /analyze: errors ────────────────────────────────────────────────────

#[tokio::test]
async fn empty_text_is_bad_request() {
    let base = ready_server().await;

    for text in ["", "   "] {
        let (status, body) = post_analyze(&base, json!({ "text": text })).await;
        assert_eq!(status, 400, "text {text:?}");
        assert!(body["error"].is_string());
    }
}

#[tokio::test]
async fn missing_or_non_string_text_is_bad_request() {
    let base = ready_server().await;

    let (status, body) = post_analyze(&base, json!({})).await;
    assert_eq!(status, 400);
    assert!(body["error"].is_string());

    let (status, _) = post_analyze(&base, json!({ "text": 42 })).await;
    assert_eq!(status, 400);

    let (status, _) = post_analyze(&base, json!({ "text": null })).await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let base = ready_server().await;
    let resp = reqwest::Client::new()
        .post(format!("{base}/analyze"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .expect("request failed");

    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.expect("invalid JSON");
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn pending_model_is_service_unavailable() {
    let (base, _srv) = start_test_server(state_with(EmbedderHandle::pending(), "axes")).await;
    let (status, body) = post_analyze(&base, json!({ "text": "delete process 2" })).await;

    assert_eq!(status, 503);
    assert_eq!(
        body["error"],
        "Model not loaded yet. Please wait and try again."
    );
}

#[tokio::test]
async fn pending_model_still_validates_input() {
    let (base, _srv) = start_test_server(state_with(EmbedderHandle::pending(), "axes")).await;
    let (status, _) = post_analyze(&base, json!({ "text": "" })).await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn embedder_failure_is_internal_error() {
    let handle = EmbedderHandle::ready(Arc::new(Unreachable));
    let (base, _srv) = start_test_server(state_with(handle, "unreachable")).await;
    let (status, body) = post_analyze(&base, json!({ "text": "hello there" })).await;

    assert_eq!(status, 500);
    assert_eq!(body, json!({ "error": "Internal server error" }));
}

#[tokio::test]
async fn exact_matches_skip_a_failing_embedder() {
    let handle = EmbedderHandle::ready(Arc::new(Unreachable));
    let (base, _srv) = start_test_server(state_with(handle, "unreachable")).await;
    let (status, body) = post_analyze(&base, json!({ "text": "remove process 7" })).await;

    assert_eq!(status, 200);
    assert_eq!(body["action"], "Delete");
    assert_eq!(body["process"], "process 7");
}

// ── GET /api/status ──────────────────────────────────────────────────────────

#[tokio::test]
async fn status_reports_loading_then_ready() {
    let handle = EmbedderHandle::pending();
    let (base, _srv) = start_test_server(state_with(handle.clone(), "axes")).await;
    let client = reqwest::Client::new();

    let json: Value = client
        .get(format!("{base}/api/status"))
        .send()
        .await
        .expect("request failed")
        .json()
        .await
        .expect("invalid JSON");
    assert_eq!(json["status"], "loading");
    assert_eq!(json["model"], "axes");
    assert_eq!(json["actions"], 5);
    assert_eq!(json["processes"], 10);
    assert!(json["version"].is_string());
    assert!(json["cache"]["hits"].is_u64());

    handle.publish(Arc::new(Axes::new()));

    let json: Value = client
        .get(format!("{base}/api/status"))
        .send()
        .await
        .expect("request failed")
        .json()
        .await
        .expect("invalid JSON");
    assert_eq!(json["status"], "ready");
}

// ── GET / and CORS ───────────────────────────────────────────────────────────

#[tokio::test]
async fn index_serves_the_form() {
    let base = ready_server().await;
    let resp = reqwest::get(format!("{base}/"))
        .await
        .expect("request failed");

    assert_eq!(resp.status(), 200);
    let html = resp.text().await.expect("body");
    assert!(html.contains("<textarea"));
    assert!(html.contains("'/analyze'"));
    assert!(html.contains("Request Type"));
}

#[tokio::test]
async fn cross_origin_requests_are_allowed() {
    let base = ready_server().await;
    let resp = reqwest::Client::new()
        .post(format!("{base}/analyze"))
        .header("origin", "http://localhost:3000")
        .json(&json!({ "text": "create process 1" }))
        .send()
        .await
        .expect("request failed");

    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
}
