//! Main web server setup and startup.
//!
//! [`WebServer`] composes the Axum router, registers all routes, and starts
//! the HTTP listener.  It also spawns a background task that warms up the
//! embedding model and publishes it once every candidate has been embedded.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::response::Html;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};

use intake_embed::{Embedder, EmbedderHandle};
use intake_intent::IntentResolver;

use crate::WebConfig;
use crate::api;
use crate::frontend::INDEX_HTML;
use crate::state::AppState;

/// First retry delay after a failed warm-up.
const WARM_UP_INITIAL_BACKOFF: Duration = Duration::from_secs(1);

/// Longest delay between warm-up attempts.
const WARM_UP_MAX_BACKOFF: Duration = Duration::from_secs(30);

/// The Intake web server.
pub struct WebServer {
    config: WebConfig,
    state: Arc<AppState>,
    embedder: Arc<dyn Embedder>,
}

impl WebServer {
    /// Create a new web server.
    ///
    /// # Arguments
    ///
    /// * `config` - Bind address and port configuration.
    /// * `resolver` - The intent resolver shared across all requests.
    /// * `embedder` - The embedding model, published once warm-up succeeds.
    pub fn new(config: WebConfig, resolver: IntentResolver, embedder: Arc<dyn Embedder>) -> Self {
        let state = Arc::new(AppState::new(
            Arc::new(resolver),
            embedder.model(),
            config.clone(),
        ));
        Self {
            config,
            state,
            embedder,
        }
    }

    /// Return the `host:port` string this server will bind to.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.config.bind_addr, self.config.port)
    }

    /// Shared handler state.
    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    /// Start the server and block until Ctrl-C.
    ///
    /// Requests are accepted right away.  Warm-up runs in the background and
    /// `/analyze` answers `503` until it has finished.
    ///
    /// # Errors
    ///
    /// Returns an error if the TCP listener cannot be bound.
    pub async fn start(self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let addr = self.addr();
        let router = router(Arc::clone(&self.state));

        let listener = tokio::net::TcpListener::bind(&addr).await?;
        tracing::info!(addr = %addr, model = %self.state.model, "starting web server");

        let warm = tokio::spawn(warm_up(
            Arc::clone(&self.state.resolver),
            Arc::clone(&self.embedder),
            self.state.embedder.clone(),
        ));

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        warm.abort();
        tracing::info!("web server stopped");
        Ok(())
    }
}

/// Build the Axum router with all routes registered.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Embedded frontend.
        .route("/", get(|| async { Html(INDEX_HTML) }))
        // REST API.
        .route("/analyze", post(api::analyze))
        .route("/api/status", get(api::status))
        .layer(cors)
        .with_state(state)
}

// ── warm-up ─────────────────────────────────────────────────────────

/// Embed every candidate phrase, then publish `embedder` through `handle`.
///
/// Failed attempts are retried with exponential backoff starting at one
/// second and capped at thirty.  Returns once the embedder is published.
pub async fn warm_up(
    resolver: Arc<IntentResolver>,
    embedder: Arc<dyn Embedder>,
    handle: EmbedderHandle,
) {
    let mut backoff = WARM_UP_INITIAL_BACKOFF;
    let mut attempt: u32 = 1;

    loop {
        tracing::info!(model = embedder.model(), attempt, "warming up embedding model");
        match resolver.warm(embedder.as_ref()).await {
            Ok(_) => {
                handle.publish(embedder);
                return;
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    attempt,
                    retry_in_secs = backoff.as_secs(),
                    "embedding model warm-up failed"
                );
            }
        }

        tokio::time::sleep(backoff).await;
        backoff = (backoff * 2).min(WARM_UP_MAX_BACKOFF);
        attempt += 1;
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
