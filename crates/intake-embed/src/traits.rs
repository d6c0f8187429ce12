//! Core embedder trait.
//!
//! The intent resolver never talks to a model directly.  It goes through
//! [`Embedder`], which any backend (HTTP service, local model, test table)
//! can implement.

use async_trait::async_trait;

use crate::error::Result;

/// A fixed-length vector representing the meaning of a piece of text.
pub type Embedding = Vec<f32>;

/// A text-embedding capability.
///
/// Implementations must be deterministic for a given text and model, and
/// must return vectors of the same length for every call.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Identifier of the underlying model.  Cached embeddings are keyed by
    /// this value, so two embedders with the same model id must agree.
    fn model(&self) -> &str;

    /// Embed a single text.
    async fn embed(&self, text: &str) -> Result<Embedding>;

    /// Embed several texts, preserving input order.
    ///
    /// The default implementation calls [`Embedder::embed`] once per text.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }
}
