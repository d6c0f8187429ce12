//! Embedding collaborator for Intake.
//!
//! The intent resolver needs exactly one capability from the outside world:
//! turning text into a fixed-length vector.  This crate provides:
//!
//! - [`Embedder`] -- the trait every embedding backend implements.
//! - [`EmbeddingClient`] -- an HTTP backend for OpenAI-compatible
//!   `/embeddings` endpoints (OpenAI, Ollama, vLLM, ...).
//! - [`EmbedderHandle`] -- an explicit readiness slot that stays `Pending`
//!   until the backend has been warmed up and published.

pub mod client;
pub mod error;
pub mod readiness;
pub mod traits;

pub use client::{EmbeddingClient, EmbeddingClientConfig};
pub use error::{EmbedError, Result};
pub use readiness::{EmbedderHandle, Readiness};
pub use traits::{Embedder, Embedding};
