//! Embedder readiness.
//!
//! The service starts before its embedding model is reachable.  An
//! [`EmbedderHandle`] is the one place that knows whether an embedder has
//! been published yet; resolvers ask it instead of consulting a global flag.

use std::fmt;
use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::traits::Embedder;

/// Snapshot of an [`EmbedderHandle`].
#[derive(Clone)]
pub enum Readiness {
    /// No embedder has been published yet.
    Pending,
    /// The embedder is available for use.
    Ready(Arc<dyn Embedder>),
}

impl Readiness {
    /// Whether this snapshot carries an embedder.
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}

impl fmt::Debug for Readiness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "Pending"),
            Self::Ready(embedder) => write!(f, "Ready({})", embedder.model()),
        }
    }
}

/// A cloneable, write-once slot holding the embedder once it is ready.
///
/// Clones share the same slot, so publishing through one clone makes every
/// other clone ready.
#[derive(Clone, Default)]
pub struct EmbedderHandle {
    slot: Arc<OnceCell<Arc<dyn Embedder>>>,
}

impl EmbedderHandle {
    /// Create a handle with no embedder published.
    pub fn pending() -> Self {
        Self::default()
    }

    /// Create a handle that is already ready.
    pub fn ready(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            slot: Arc::new(OnceCell::new_with(Some(embedder))),
        }
    }

    /// Publish `embedder`.
    ///
    /// Returns `false` if an embedder had already been published; the
    /// existing one is kept.
    pub fn publish(&self, embedder: Arc<dyn Embedder>) -> bool {
        let model = embedder.model().to_owned();
        match self.slot.set(embedder) {
            Ok(()) => {
                tracing::info!(model = %model, "embedder ready");
                true
            }
            Err(_) => {
                tracing::warn!(model = %model, "embedder already published, ignoring");
                false
            }
        }
    }

    /// Current readiness snapshot.
    pub fn state(&self) -> Readiness {
        match self.slot.get() {
            Some(embedder) => Readiness::Ready(Arc::clone(embedder)),
            None => Readiness::Pending,
        }
    }

    /// Whether an embedder has been published.
    pub fn is_ready(&self) -> bool {
        self.slot.initialized()
    }
}

impl fmt::Debug for EmbedderHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbedderHandle")
            .field("state", &self.state())
            .finish()
    }
}
