//! Intent resolution error types.
//!
//! All resolver subsystems surface errors through [`IntentError`].  Callers
//! that only need to pick a response (HTTP status, retry hint) should match
//! on [`IntentError::kind`] instead of individual variants.

use std::sync::Arc;

use intake_embed::EmbedError;

/// Coarse grouping of [`IntentError`] variants as seen by a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request itself is unusable (missing or empty text).
    InvalidInput,
    /// The embedding collaborator is not ready yet; try again later.
    NotReady,
    /// Anything else that went wrong while computing embeddings or scores.
    ResolutionFailure,
}

/// Unified error type for the intent resolver.
#[derive(Debug, thiserror::Error)]
pub enum IntentError {
    // -- Request errors ------------------------------------------------------
    /// The request text is missing, empty, or not a string.
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    // -- Readiness -----------------------------------------------------------
    /// The embedding model has not finished initializing.
    #[error("embedding model is not ready yet")]
    EmbeddingUnavailable,

    // -- Scoring errors ------------------------------------------------------
    /// A candidate embedding and the request embedding differ in length.
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// The embedding collaborator failed while a field was being scored.
    ///
    /// Shared because cached lookups hand the same failure to every waiter.
    #[error("embedding failed: {0}")]
    Embedding(#[source] Arc<EmbedError>),

    // -- Catalog errors ------------------------------------------------------
    /// The action taxonomy or process registry is malformed.
    #[error("invalid catalog: {reason}")]
    InvalidCatalog { reason: String },

    // -- Generic -------------------------------------------------------------
    /// Catch-all for unexpected internal errors.
    #[error("internal intent error: {0}")]
    Internal(String),
}

impl IntentError {
    /// Classify this error for the caller.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput { .. } => ErrorKind::InvalidInput,
            Self::EmbeddingUnavailable => ErrorKind::NotReady,
            Self::DimensionMismatch { .. }
            | Self::Embedding(_)
            | Self::InvalidCatalog { .. }
            | Self::Internal(_) => ErrorKind::ResolutionFailure,
        }
    }

    /// Whether the same request may succeed if retried later.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::NotReady
    }
}

impl From<EmbedError> for IntentError {
    fn from(err: EmbedError) -> Self {
        Self::Embedding(Arc::new(err))
    }
}

impl From<Arc<EmbedError>> for IntentError {
    fn from(err: Arc<EmbedError>) -> Self {
        Self::Embedding(err)
    }
}

/// Convenience alias used throughout the intent crate.
pub type Result<T> = std::result::Result<T, IntentError>;
