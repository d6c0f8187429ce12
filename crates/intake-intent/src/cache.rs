//! Candidate embedding cache backed by [`moka`].
//!
//! Trigger phrases and process labels never change at runtime, so their
//! embeddings are computed once per model and then served from memory.
//! Concurrent first lookups of the same candidate are coalesced: one caller
//! runs the embedding request and the others wait for its result.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use moka::future::Cache;
use tracing::debug;

use intake_embed::{Embedder, Embedding};

use crate::error::{IntentError, Result};

/// Upper bound on cached candidates.  Catalogs are far smaller than this.
const DEFAULT_MAX_CAPACITY: u64 = 10_000;

// ── cache stats ──────────────────────────────────────────────────────

/// Counters tracking cache effectiveness.
#[derive(Debug, Default)]
pub struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
}

impl CacheStats {
    fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Lookups answered from the cache.
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Lookups that had to call the embedder.
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Hit rate between 0.0 and 1.0 (0.0 before any lookup).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits() + self.misses();
        if total == 0 {
            return 0.0;
        }
        self.hits() as f64 / total as f64
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hits={} misses={} rate={:.2}%",
            self.hits(),
            self.misses(),
            self.hit_rate() * 100.0,
        )
    }
}

// ── cache ────────────────────────────────────────────────────────────

/// Cache key: the same text embeds differently under different models.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    model: String,
    text: String,
}

impl CacheKey {
    fn new(embedder: &dyn Embedder, text: &str) -> Self {
        Self {
            model: embedder.model().to_owned(),
            text: text.to_owned(),
        }
    }
}

/// Process-wide store of candidate embeddings.
///
/// Cloning is cheap and clones share entries and statistics.
#[derive(Clone)]
pub struct EmbeddingCache {
    inner: Cache<CacheKey, Arc<Embedding>>,
    stats: Arc<CacheStats>,
}

impl Default for EmbeddingCache {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CAPACITY)
    }
}

impl EmbeddingCache {
    /// Create a cache holding at most `max_capacity` embeddings.
    pub fn new(max_capacity: u64) -> Self {
        Self {
            inner: Cache::builder().max_capacity(max_capacity).build(),
            stats: Arc::new(CacheStats::default()),
        }
    }

    /// Return the cached embedding of `text`, computing it on first use.
    ///
    /// Failures are not cached; the next lookup tries again.
    pub async fn get_or_embed(&self, embedder: &dyn Embedder, text: &str) -> Result<Arc<Embedding>> {
        let entry = self
            .inner
            .entry(CacheKey::new(embedder, text))
            .or_try_insert_with(async { embedder.embed(text).await.map(Arc::new) })
            .await?;

        if entry.is_fresh() {
            self.stats.record_miss();
            debug!(model = embedder.model(), text, "candidate embedding computed");
        } else {
            self.stats.record_hit();
            debug!(model = embedder.model(), text, "candidate embedding cache hit");
        }

        Ok(entry.into_value())
    }

    /// Embed every text in `texts` that is not cached yet, in one batch.
    ///
    /// Returns how many embeddings were computed.  Racing with
    /// [`EmbeddingCache::get_or_embed`] is harmless: both write the same
    /// deterministic vector.
    pub async fn warm(&self, embedder: &dyn Embedder, texts: &[String]) -> Result<usize> {
        let missing: Vec<String> = texts
            .iter()
            .filter(|text| !self.inner.contains_key(&CacheKey::new(embedder, text)))
            .cloned()
            .collect();

        if missing.is_empty() {
            return Ok(0);
        }

        let vectors = embedder.embed_batch(&missing).await?;
        if vectors.len() != missing.len() {
            return Err(IntentError::Internal(format!(
                "embedder returned {} vectors for {} texts",
                vectors.len(),
                missing.len()
            )));
        }
        for (text, vector) in missing.iter().zip(vectors) {
            self.inner
                .insert(CacheKey::new(embedder, text), Arc::new(vector))
                .await;
        }

        debug!(model = embedder.model(), count = missing.len(), "candidate embeddings warmed");
        Ok(missing.len())
    }

    /// Whether `text` is cached for `embedder`'s model.
    pub fn contains(&self, embedder: &dyn Embedder, text: &str) -> bool {
        self.inner.contains_key(&CacheKey::new(embedder, text))
    }

    /// Approximate number of cached embeddings.
    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }

    /// Hit/miss counters.
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }
}

impl fmt::Debug for EmbeddingCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbeddingCache")
            .field("entries", &self.entry_count())
            .field("stats", &self.stats.to_string())
            .finish()
    }
}

// ── tests ────────────────────────────────────────────────────────────
