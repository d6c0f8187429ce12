//! Embedding collaborator error types.
//!
//! Every failure talking to the embedding model surfaces as an [`EmbedError`].
//! Callers in the intent crate treat all of them as resolution failures.

/// Unified error type for the embedding layer.
#[derive(Debug, thiserror::Error)]
pub enum EmbedError {
    // -- Transport errors ----------------------------------------------------
    /// The HTTP request to the embedding endpoint failed or returned a
    /// non-success status.
    #[error("embedding request failed: {reason}")]
    RequestFailed { reason: String },

    /// The embedding endpoint answered with a body we could not interpret.
    #[error("embedding response parse error: {reason}")]
    ParseFailed { reason: String },

    // -- Model output --------------------------------------------------------
    /// The model returned a zero-length vector for `text`.
    #[error("embedding model returned an empty vector for {text:?}")]
    EmptyEmbedding { text: String },

    // -- Configuration -------------------------------------------------------
    /// The client configuration is unusable.
    #[error("embedding config error: {reason}")]
    Config { reason: String },

    // -- Serialization -------------------------------------------------------
    /// JSON serialization or deserialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used throughout the embedding crate.
pub type Result<T> = std::result::Result<T, EmbedError>;

impl From<reqwest::Error> for EmbedError {
    fn from(err: reqwest::Error) -> Self {
        Self::RequestFailed {
            reason: err.to_string(),
        }
    }
}
