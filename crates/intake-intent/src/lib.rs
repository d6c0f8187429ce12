//! Intent resolution for Intake.
//!
//! This crate classifies short free-text requests into an action, a process
//! reference, and a coarse request type:
//!
//! - **Catalog**: the immutable action taxonomy and process registry, with
//!   compiled exact-match automata, via [`catalog::Catalog`].
//! - **Resolver**: two-tier resolution (exact substring match, then
//!   embedding-similarity fallback behind a threshold gate) via
//!   [`resolver::IntentResolver`].
//! - **Cache**: compute-once storage of candidate embeddings via
//!   [`cache::EmbeddingCache`].

pub mod cache;
pub mod catalog;
pub mod error;
pub mod matcher;
pub mod resolver;
pub mod similarity;

pub use cache::{CacheStats, EmbeddingCache};
pub use catalog::{Action, Catalog};
pub use error::{ErrorKind, IntentError, Result};
pub use resolver::{
    ACTION_THRESHOLD, Classification, FieldMatch, IntentResolver, NOT_FOUND, PROCESS_THRESHOLD,
    RequestType, Resolution, compose_request_type, normalize,
};
pub use similarity::cosine_similarity;
