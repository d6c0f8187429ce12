//! HTTP service for Intake.
//!
//! This crate exposes the intent resolver over HTTP:
//!
//! - `POST /analyze` -- classify a request text.
//! - `GET /api/status` -- readiness, catalog size, and cache statistics.
//! - `GET /` -- an embedded single-page form for trying the classifier.
//!
//! The server starts answering immediately.  Until the embedding model has
//! been warmed up, `/analyze` answers `503` and `/api/status` reports
//! `"loading"`.

pub mod api;
pub mod frontend;
pub mod server;
pub mod state;

pub use server::{WebServer, router, warm_up};
pub use state::AppState;

/// Web server configuration.
#[derive(Debug, Clone)]
pub struct WebConfig {
    /// The address to bind the HTTP server to.
    pub bind_addr: String,
    /// The port to listen on.
    pub port: u16,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1".into(),
            port: 5000,
        }
    }
}
