//! Intent resolver: turns raw request text into a [`Classification`].
//!
//! Each of the two classified fields (action and process) goes through the
//! same two tiers:
//!
//! 1. **Exact match**: the first catalog phrase, in catalog order, that is a
//!    substring of the lowercased text wins outright.
//! 2. **Semantic fallback**: otherwise the text is embedded once and compared
//!    by cosine similarity against every candidate phrase.  The best
//!    candidate is kept only if it scores at least the field's threshold.
//!
//! The request type is then derived from the two fields and the text.

use std::sync::Arc;

use serde::Serialize;
use serde::ser::{SerializeStruct, Serializer};
use tracing::{debug, info};

use intake_embed::{Embedder, EmbedderHandle, Readiness};

use crate::cache::EmbeddingCache;
use crate::catalog::{Action, Catalog};
use crate::error::{IntentError, Result};
use crate::similarity::{cosine_similarity, pick_best};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Minimum similarity for a semantic action match.
pub const ACTION_THRESHOLD: f32 = 0.35;

/// Minimum similarity for a semantic process match.
pub const PROCESS_THRESHOLD: f32 = 0.35;

/// Wire value for a field that could not be classified.
pub const NOT_FOUND: &str = "Not Found";

/// Substring that promotes an action-only request to [`RequestType::Complex`].
const CUSTOMER_MARKER: &str = "customer";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Coarse request category derived from the classified fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RequestType {
    #[serde(rename = "Process Centric")]
    ProcessCentric,
    Complex,
    #[serde(rename = "Not Clear")]
    NotClear,
}

impl RequestType {
    /// The display name used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProcessCentric => "Process Centric",
            Self::Complex => "Complex",
            Self::NotClear => "Not Clear",
        }
    }
}

impl std::fmt::Display for RequestType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a single field was resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldMatch<T> {
    /// A catalog phrase occurred verbatim in the text.
    Exact { value: T, phrase: String },
    /// The closest candidate by embedding similarity, at or above threshold.
    Semantic { value: T, phrase: String, score: f32 },
    /// Nothing matched.  `best_score` is the rejected fallback score, if a
    /// fallback ran and produced one.
    NotFound { best_score: Option<f32> },
}

impl<T> FieldMatch<T> {
    /// The resolved value, if any.
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Exact { value, .. } | Self::Semantic { value, .. } => Some(value),
            Self::NotFound { .. } => None,
        }
    }

    /// Short label of the tier that produced this result, for logs.
    pub fn source(&self) -> &'static str {
        match self {
            Self::Exact { .. } => "exact",
            Self::Semantic { .. } => "semantic",
            Self::NotFound { .. } => "none",
        }
    }
}

/// The structured result of resolving one request.
///
/// Serializes as `{ "action", "process", "requestType" }` with `"Not Found"`
/// standing in for unresolved fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub action: Option<Action>,
    pub process: Option<String>,
    pub request_type: RequestType,
}

impl Classification {
    /// Wire label of the action field.
    pub fn action_label(&self) -> &str {
        self.action.as_ref().map_or(NOT_FOUND, Action::as_str)
    }

    /// Wire label of the process field.
    pub fn process_label(&self) -> &str {
        self.process.as_deref().unwrap_or(NOT_FOUND)
    }
}

impl Serialize for Classification {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Classification", 3)?;
        s.serialize_field("action", self.action_label())?;
        s.serialize_field("process", self.process_label())?;
        s.serialize_field("requestType", self.request_type.as_str())?;
        s.end()
    }
}

/// A classification together with how each field was reached.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub classification: Classification,
    pub action: FieldMatch<Action>,
    pub process: FieldMatch<String>,
}

// ---------------------------------------------------------------------------
// Pure helpers
// ---------------------------------------------------------------------------

/// Validate and lowercase request text.
///
/// Text that is empty or whitespace-only is rejected.  Nothing else is
/// altered: punctuation and accents stay as they are.
pub fn normalize(text: &str) -> Result<String> {
    if text.trim().is_empty() {
        return Err(IntentError::InvalidInput {
            reason: "request text is empty".into(),
        });
    }
    Ok(text.to_lowercase())
}

/// Derive the request type.  Rules are checked in order; the first that
/// holds wins.
pub fn compose_request_type(
    action: Option<Action>,
    process: Option<&str>,
    normalized: &str,
) -> RequestType {
    if action.is_some() && process.is_some() {
        RequestType::ProcessCentric
    } else if action.is_some() && normalized.contains(CUSTOMER_MARKER) {
        RequestType::Complex
    } else {
        RequestType::NotClear
    }
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

/// Classifies request text against a [`Catalog`].
///
/// The resolver itself is immutable; the only shared state is the candidate
/// [`EmbeddingCache`], so one instance can serve any number of concurrent
/// requests behind an `Arc`.
#[derive(Debug, Clone)]
pub struct IntentResolver {
    catalog: Arc<Catalog>,
    cache: EmbeddingCache,
}

impl Default for IntentResolver {
    fn default() -> Self {
        Self::new(Catalog::standard())
    }
}

impl IntentResolver {
    /// Create a resolver over `catalog` with an empty cache.
    pub fn new(catalog: Catalog) -> Self {
        Self::with_cache(catalog, EmbeddingCache::default())
    }

    /// Create a resolver that shares an existing cache.
    pub fn with_cache(catalog: Catalog, cache: EmbeddingCache) -> Self {
        Self {
            catalog: Arc::new(catalog),
            cache,
        }
    }

    /// The classification tables.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The candidate embedding cache.
    pub fn cache(&self) -> &EmbeddingCache {
        &self.cache
    }

    /// Precompute the embedding of every candidate phrase.
    ///
    /// After this returns, the fallback path costs one embedding call for the
    /// request text plus vector math.  Returns how many embeddings were
    /// computed (0 if already warm).
    pub async fn warm(&self, embedder: &dyn Embedder) -> Result<usize> {
        let texts = self.catalog.candidate_texts();
        let computed = self.cache.warm(embedder, &texts).await?;
        info!(
            model = embedder.model(),
            candidates = texts.len(),
            computed,
            "candidate embeddings ready"
        );
        Ok(computed)
    }

    /// Resolve `text` using whatever embedder `handle` currently holds.
    ///
    /// Fails with [`IntentError::InvalidInput`] for empty text and with
    /// [`IntentError::EmbeddingUnavailable`] while the handle is pending.
    pub async fn resolve(&self, text: &str, handle: &EmbedderHandle) -> Result<Resolution> {
        normalize(text)?;
        match handle.state() {
            Readiness::Ready(embedder) => self.resolve_with(text, embedder.as_ref()).await,
            Readiness::Pending => {
                debug!("resolution requested before embedder is ready");
                Err(IntentError::EmbeddingUnavailable)
            }
        }
    }

    /// Resolve `text` with an explicit embedder.
    pub async fn resolve_with(&self, text: &str, embedder: &dyn Embedder) -> Result<Resolution> {
        let normalized = normalize(text)?;

        // Tier 1: exact substring matches.
        let exact_action = self
            .catalog
            .match_action(&normalized)
            .map(|(value, phrase)| FieldMatch::Exact {
                value,
                phrase: phrase.to_owned(),
            });
        let exact_process = self
            .catalog
            .match_process(&normalized)
            .map(|label| FieldMatch::Exact {
                value: label.to_owned(),
                phrase: label.to_owned(),
            });

        // Tier 2: semantic fallback for whichever fields are still open.  The
        // request text is embedded at most once and shared by both fields.
        let query = if exact_action.is_none() || exact_process.is_none() {
            Some(embedder.embed(&normalized).await?)
        } else {
            None
        };

        let action = match (exact_action, &query) {
            (Some(found), _) => found,
            (None, Some(query)) => self.fallback_action(embedder, query).await?,
            (None, None) => FieldMatch::NotFound { best_score: None },
        };
        let process = match (exact_process, &query) {
            (Some(found), _) => found,
            (None, Some(query)) => self.fallback_process(embedder, query).await?,
            (None, None) => FieldMatch::NotFound { best_score: None },
        };

        let request_type = compose_request_type(
            action.value().copied(),
            process.value().map(String::as_str),
            &normalized,
        );

        let classification = Classification {
            action: action.value().copied(),
            process: process.value().cloned(),
            request_type,
        };

        info!(
            action = classification.action_label(),
            action_source = action.source(),
            process = classification.process_label(),
            process_source = process.source(),
            request_type = %request_type,
            "request classified"
        );

        Ok(Resolution {
            classification,
            action,
            process,
        })
    }

    /// Best semantic action match over every trigger phrase.
    async fn fallback_action(
        &self,
        embedder: &dyn Embedder,
        query: &[f32],
    ) -> Result<FieldMatch<Action>> {
        let phrases = self.catalog.action_phrases();
        let best = self.best_candidate(embedder, query, phrases).await?;

        Ok(match best {
            Some((index, score)) if score >= ACTION_THRESHOLD => {
                let value = self.catalog.action_at(index).ok_or_else(|| {
                    IntentError::Internal(format!("no action for phrase index {index}"))
                })?;
                debug!(action = %value, phrase = %phrases[index], score, "semantic action match");
                FieldMatch::Semantic {
                    value,
                    phrase: phrases[index].clone(),
                    score,
                }
            }
            other => {
                debug!(best_score = ?other.map(|(_, s)| s), "semantic action match below threshold");
                FieldMatch::NotFound {
                    best_score: other.map(|(_, s)| s),
                }
            }
        })
    }

    /// Best semantic process match over every registry label.
    async fn fallback_process(
        &self,
        embedder: &dyn Embedder,
        query: &[f32],
    ) -> Result<FieldMatch<String>> {
        let labels = self.catalog.processes();
        let best = self.best_candidate(embedder, query, labels).await?;

        Ok(match best {
            Some((index, score)) if score >= PROCESS_THRESHOLD => {
                let label = labels[index].clone();
                debug!(process = %label, score, "semantic process match");
                FieldMatch::Semantic {
                    value: label.clone(),
                    phrase: label,
                    score,
                }
            }
            other => {
                debug!(best_score = ?other.map(|(_, s)| s), "semantic process match below threshold");
                FieldMatch::NotFound {
                    best_score: other.map(|(_, s)| s),
                }
            }
        })
    }

    /// Score every candidate against `query` and keep the best one.
    async fn best_candidate(
        &self,
        embedder: &dyn Embedder,
        query: &[f32],
        candidates: &[String],
    ) -> Result<Option<(usize, f32)>> {
        let mut scores = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let vector = self.cache.get_or_embed(embedder, candidate).await?;
            scores.push(cosine_similarity(query, &vector)?);
        }
        Ok(pick_best(scores))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
