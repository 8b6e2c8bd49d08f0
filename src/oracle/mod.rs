//! Similarity oracle boundary.
//!
//! The matcher consumes semantic similarity as an external signal: it asks
//! for pairwise token similarity and per-token "richness" magnitude, and
//! imposes nothing on how those numbers are produced beyond determinism.
//! Deployments back this trait with an embedding model; [`CharGramOracle`]
//! is a self-contained fallback so the crate works out of the box.
//!
//! Global ranking queries the same (candidate, utterance-token) pairs over
//! and over across the candidate pool, so the matcher always wraps its
//! oracle in a [`CachedOracle`].

pub mod chargram;

use dashmap::DashMap;

pub use chargram::CharGramOracle;

/// External semantic-similarity provider.
///
/// Implementations must be deterministic for fixed inputs; ranking is only
/// reproducible if the oracle is.
pub trait SimilarityOracle: Send + Sync {
    /// Similarity between two surface tokens, in a bounded range
    /// (conventionally `[0, 1]`, with 1 for identical tokens).
    fn similarity(&self, a: &str, b: &str) -> f64;

    /// Information-density magnitude of a single token. Raw similarity is
    /// weighted up for token pairs the oracle considers information-dense.
    fn magnitude(&self, token: &str) -> f64;
}

/// Memoizing decorator around a possibly-expensive oracle.
///
/// Similarity is assumed symmetric, so pair results are keyed on the
/// unordered token pair. Safe for concurrent scoring workers.
pub struct CachedOracle<O> {
    inner: O,
    pairs: DashMap<(String, String), f64>,
    magnitudes: DashMap<String, f64>,
}

impl<O: SimilarityOracle> CachedOracle<O> {
    pub fn new(inner: O) -> Self {
        Self {
            inner,
            pairs: DashMap::new(),
            magnitudes: DashMap::new(),
        }
    }

    /// Access the wrapped oracle.
    pub fn inner(&self) -> &O {
        &self.inner
    }

    /// Number of distinct token pairs memoized so far.
    pub fn cached_pairs(&self) -> usize {
        self.pairs.len()
    }
}

impl<O: SimilarityOracle> SimilarityOracle for CachedOracle<O> {
    fn similarity(&self, a: &str, b: &str) -> f64 {
        let key = if a <= b {
            (a.to_string(), b.to_string())
        } else {
            (b.to_string(), a.to_string())
        };
        if let Some(hit) = self.pairs.get(&key) {
            return *hit;
        }
        let value = self.inner.similarity(a, b);
        self.pairs.insert(key, value);
        value
    }

    fn magnitude(&self, token: &str) -> f64 {
        if let Some(hit) = self.magnitudes.get(token) {
            return *hit;
        }
        let value = self.inner.magnitude(token);
        self.magnitudes.insert(token.to_string(), value);
        value
    }
}
