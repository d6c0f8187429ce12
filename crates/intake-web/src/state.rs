//! Shared application state for the web server.
//!
//! [`AppState`] is wrapped in an `Arc` and shared across all request
//! handlers.  The resolver is immutable apart from its candidate cache, and
//! the embedder handle flips from pending to ready exactly once.

use std::sync::Arc;

use intake_embed::EmbedderHandle;
use intake_intent::IntentResolver;

use crate::WebConfig;

/// Shared state accessible from every Axum handler.
#[derive(Clone)]
pub struct AppState {
    /// The resolver, including its candidate embedding cache.
    pub resolver: Arc<IntentResolver>,

    /// Readiness slot for the embedding model.
    pub embedder: EmbedderHandle,

    /// Identifier of the configured embedding model, reported by
    /// `/api/status` even before the model is ready.
    pub model: String,

    /// Web server configuration.
    pub config: WebConfig,
}

impl AppState {
    /// Create state with a pending embedder.
    pub fn new(resolver: Arc<IntentResolver>, model: impl Into<String>, config: WebConfig) -> Self {
        Self {
            resolver,
            embedder: EmbedderHandle::pending(),
            model: model.into(),
            config,
        }
    }

    /// Replace the readiness slot (e.g. with one that is already ready).
    pub fn with_embedder(mut self, embedder: EmbedderHandle) -> Self {
        self.embedder = embedder;
        self
    }
}
