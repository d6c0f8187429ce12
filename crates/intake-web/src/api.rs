//! REST API route handlers.
//!
//! Provides the classification endpoint and a status endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use serde::Serialize;
use serde_json::{Value, json};

use intake_intent::{ErrorKind, IntentError};

use crate::state::AppState;

/// Message returned while the embedding model is still warming up.
pub const NOT_READY_MESSAGE: &str = "Model not loaded yet. Please wait and try again.";

/// Message returned for unexpected resolution failures.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

// ---------------------------------------------------------------------------
// POST /analyze
// ---------------------------------------------------------------------------

/// Classify `{ "text": string }` into `{ action, process, requestType }`.
///
/// Errors are answered as `{ "error": string }`: `400` for a missing, empty
/// or non-string `text` (or a body that is not JSON), `503` while the model
/// is loading, and `500` for anything else.
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> (StatusCode, Json<Value>) {
    let body = match payload {
        Ok(Json(body)) => body,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "rejected analyze body");
            return error_body(StatusCode::BAD_REQUEST, rejection.body_text());
        }
    };

    let text = match body.get("text") {
        Some(Value::String(text)) => text,
        Some(_) => {
            return error_body(StatusCode::BAD_REQUEST, "`text` must be a string".into());
        }
        None => {
            return error_body(StatusCode::BAD_REQUEST, "missing field `text`".into());
        }
    };

    match state.resolver.resolve(text, &state.embedder).await {
        Ok(resolution) => match serde_json::to_value(&resolution.classification) {
            Ok(value) => (StatusCode::OK, Json(value)),
            Err(e) => {
                tracing::error!(error = %e, "failed to serialize classification");
                error_body(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE.into())
            }
        },
        Err(e) => error_response(&e),
    }
}

/// Map a resolver error onto a status code and `{ "error" }` body.
pub fn error_response(err: &IntentError) -> (StatusCode, Json<Value>) {
    match err.kind() {
        ErrorKind::InvalidInput => error_body(StatusCode::BAD_REQUEST, err.to_string()),
        ErrorKind::NotReady => {
            tracing::debug!("analyze called before the model is ready");
            error_body(StatusCode::SERVICE_UNAVAILABLE, NOT_READY_MESSAGE.into())
        }
        ErrorKind::ResolutionFailure => {
            tracing::error!(error = %err, "error analyzing intent");
            error_body(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE.into())
        }
    }
}

fn error_body(status: StatusCode, message: String) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "error": message })))
}

// ---------------------------------------------------------------------------
// GET /api/status
// ---------------------------------------------------------------------------

/// Response payload for the `/api/status` endpoint.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub model: String,
    pub actions: usize,
    pub processes: usize,
    pub cache: CacheStatus,
}

/// Candidate cache statistics.
#[derive(Debug, Serialize)]
pub struct CacheStatus {
    pub entries: u64,
    pub hits: u64,
    pub misses: u64,
}

/// Report readiness, catalog size and cache statistics.
pub async fn status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let catalog = state.resolver.catalog();
    let cache = state.resolver.cache();

    Json(StatusResponse {
        status: if state.embedder.is_ready() {
            "ready"
        } else {
            "loading"
        },
        version: env!("CARGO_PKG_VERSION"),
        model: state.model.clone(),
        actions: catalog.categories().count(),
        processes: catalog.processes().len(),
        cache: CacheStatus {
            entries: cache.entry_count(),
            hits: cache.stats().hits(),
            misses: cache.stats().misses(),
        },
    })
}
