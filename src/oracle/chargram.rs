//! Embedded fallback oracle: character-trigram hypervectors.
//!
//! Each word maps to a dense vector by hashing its padded character trigrams
//! into deterministic seeded random directions; multi-word tokens sum their
//! word vectors. Similarity is cosine (clamped to `[0, 1]`), and magnitude
//! grows with the number of distinct trigrams, so longer, more specific
//! tokens weigh more than function words.
//!
//! This is a stand-in for a real embedding model, not a replacement: it
//! captures surface-form overlap, not meaning. It exists so the CLI, tests,
//! and benches run with zero external dependencies.

use std::collections::HashSet;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use dashmap::DashMap;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::SimilarityOracle;

/// Default vector dimension. High enough that unrelated trigrams are
/// near-orthogonal in expectation, low enough to stay cheap.
const DEFAULT_DIM: usize = 512;

/// Deterministic character-trigram similarity oracle.
pub struct CharGramOracle {
    dim: usize,
    vectors: DashMap<String, Vec<f32>>,
}

impl CharGramOracle {
    pub fn new() -> Self {
        Self::with_dimension(DEFAULT_DIM)
    }

    pub fn with_dimension(dim: usize) -> Self {
        Self {
            dim: dim.max(8),
            vectors: DashMap::new(),
        }
    }

    /// Padded character trigrams of a single word, e.g. "of" → {"#of", "of#"}.
    fn word_grams(word: &str) -> Vec<String> {
        let padded: Vec<char> = std::iter::once('#')
            .chain(word.chars())
            .chain(std::iter::once('#'))
            .collect();
        padded.windows(3).map(|w| w.iter().collect()).collect()
    }

    fn grams(token: &str) -> Vec<String> {
        token
            .split_whitespace()
            .flat_map(Self::word_grams)
            .collect()
    }

    /// Deterministic random direction for a trigram, seeded from its hash.
    ///
    /// The same gram always produces the same direction, regardless of when
    /// or where it is computed.
    fn gram_direction(&self, gram: &str) -> Vec<f32> {
        let mut hasher = DefaultHasher::new();
        gram.hash(&mut hasher);
        let mut rng = StdRng::seed_from_u64(hasher.finish());
        (0..self.dim)
            .map(|_| if rng.gen_range(0..2) == 0 { 1.0 } else { -1.0 })
            .collect()
    }

    fn vector(&self, token: &str) -> Vec<f32> {
        if let Some(hit) = self.vectors.get(token) {
            return hit.value().clone();
        }
        let mut acc = vec![0.0f32; self.dim];
        for gram in Self::grams(token) {
            for (slot, component) in acc.iter_mut().zip(self.gram_direction(&gram)) {
                *slot += component;
            }
        }
        self.vectors.insert(token.to_string(), acc.clone());
        acc
    }
}

impl Default for CharGramOracle {
    fn default() -> Self {
        Self::new()
    }
}

impl SimilarityOracle for CharGramOracle {
    fn similarity(&self, a: &str, b: &str) -> f64 {
        let va = self.vector(a);
        let vb = self.vector(b);
        let dot: f32 = va.iter().zip(&vb).map(|(x, y)| x * y).sum();
        let norm_a: f32 = va.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = vb.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }
        (f64::from(dot) / (f64::from(norm_a) * f64::from(norm_b))).clamp(0.0, 1.0)
    }

    fn magnitude(&self, token: &str) -> f64 {
        let distinct: HashSet<String> = Self::grams(token).into_iter().collect();
        (1.0 + distinct.len() as f64).ln()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_tokens_score_one() {
        let oracle = CharGramOracle::new();
        let sim = oracle.similarity("the bookcase", "the bookcase");
        assert!((sim - 1.0).abs() < 1e-6);
    }

    #[test]
    fn similarity_is_deterministic_and_symmetric() {
        let a = CharGramOracle::new();
        let b = CharGramOracle::new();
        assert_eq!(a.similarity("behind", "beside"), b.similarity("behind", "beside"));
        assert_eq!(a.similarity("behind", "beside"), a.similarity("beside", "behind"));
    }

    #[test]
    fn overlapping_surface_forms_beat_disjoint_ones() {
        let oracle = CharGramOracle::new();
        let close = oracle.similarity("the bookcase", "the bookshelf");
        let far = oracle.similarity("the bookcase", "quickly");
        assert!(close > far);
    }

    #[test]
    fn magnitude_grows_with_specificity() {
        let oracle = CharGramOracle::new();
        assert!(oracle.magnitude("the filing cabinet") > oracle.magnitude("is"));
        assert!(oracle.magnitude("is") > 0.0);
    }

    #[test]
    fn empty_token_has_zero_similarity() {
        let oracle = CharGramOracle::new();
        assert_eq!(oracle.similarity("", "bookcase"), 0.0);
    }
}
