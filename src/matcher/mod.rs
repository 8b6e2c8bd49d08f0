//! The scoring engine.
//!
//! Two modes:
//! - **Global ranking** ([`Matcher::rank`]): score a labeled utterance
//!   against the full enumerated statement pool and return a normalized,
//!   descending probability distribution.
//! - **Direct lookup** ([`Matcher::resolve`]): an utterance already
//!   classified into a statement kind has each of its labels resolved
//!   independently against that label's candidate list.
//!
//! Scoring a candidate is a pure function of (statement, utterance, grammar,
//! slot graph, oracle); candidates are independent, so ranking fans out
//! across a rayon pool and merges with a single normalize step.

mod rank;
mod resolve;
pub mod rules;
pub mod score;

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::catalog::Catalogue;
use crate::error::MatchResult;
use crate::grammar::{Statement, StatementGrammar};
use crate::oracle::{CachedOracle, SimilarityOracle};
use crate::slots::{SlotGraph, SlotLabel};

pub use rules::DisambiguationRules;

/// A partially-labeled utterance: slot label → surface token, in utterance
/// order. Supplied by the caller; the matcher only reads it.
#[derive(Debug, Clone, Default)]
pub struct LabeledUtterance {
    entries: IndexMap<SlotLabel, String>,
}

impl LabeledUtterance {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from (label, token) pairs, keeping pair order.
    pub fn from_pairs<I, L, T>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (L, T)>,
        L: AsRef<str>,
        T: Into<String>,
    {
        let entries = pairs
            .into_iter()
            .map(|(label, token)| (SlotLabel::parse(label.as_ref()), token.into()))
            .collect();
        Self { entries }
    }

    pub fn insert(&mut self, label: SlotLabel, token: impl Into<String>) {
        self.entries.insert(label, token.into());
    }

    /// The token supplied for a label, if any.
    pub fn token_for(&self, label: &SlotLabel) -> Option<&str> {
        self.entries.get(label).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SlotLabel, &str)> {
        self.entries.iter().map(|(l, t)| (l, t.as_str()))
    }

    /// Whether any supplied label appears in the slot structure at all.
    pub(crate) fn recognizes_any(&self, slots: &SlotGraph) -> bool {
        self.entries.keys().any(|label| slots.knows_label(label))
    }
}

impl std::fmt::Display for LabeledUtterance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "I")?;
        for (_, token) in self.iter() {
            write!(f, " {token}")?;
        }
        write!(f, ".")
    }
}

/// An utterance already classified into a statement kind, awaiting
/// per-label resolution.
#[derive(Debug, Clone)]
pub struct FilledTemplate {
    kind: String,
    values: IndexMap<SlotLabel, String>,
}

impl FilledTemplate {
    pub fn new<I, L, T>(kind: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = (L, T)>,
        L: AsRef<str>,
        T: Into<String>,
    {
        Self {
            kind: kind.into(),
            values: values
                .into_iter()
                .map(|(label, token)| (SlotLabel::parse(label.as_ref()), token.into()))
                .collect(),
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn values(&self) -> impl Iterator<Item = (&SlotLabel, &str)> {
        self.values.iter().map(|(l, t)| (l, t.as_str()))
    }
}

/// One entry of a ranked interpretation.
#[derive(Debug, Clone)]
pub struct Ranked {
    /// Normalized probability in `[0, 1]`; the full ranking sums to 1.
    pub probability: f64,
    pub statement: Statement,
}

/// Matcher tuning knobs.
#[derive(Debug, Clone)]
pub struct MatcherConfig {
    /// Fan candidate scoring out across the rayon pool.
    pub parallel: bool,
    /// Tolerance for the sum-to-one sanity check on normalized rankings.
    pub tolerance: f64,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            tolerance: 1e-6,
        }
    }
}

/// The probabilistic utterance-to-statement matcher.
///
/// Holds shared read-only handles to the grammar and slot graph, a memoizing
/// wrapper around the similarity oracle, and the per-label transition
/// denominators precomputed at construction. No state persists between
/// calls.
pub struct Matcher<O: SimilarityOracle> {
    grammar: Arc<StatementGrammar>,
    slots: Arc<SlotGraph>,
    rules: Arc<DisambiguationRules>,
    oracle: CachedOracle<O>,
    /// Merged candidate-list size per slot label, fixing the uniform
    /// transition prior `1 / |comparables|` once up front.
    transition_sizes: HashMap<SlotLabel, usize>,
    /// The enumerated candidate pool, materialized once.
    pool: Vec<Statement>,
    config: MatcherConfig,
}

impl<O: SimilarityOracle> Matcher<O> {
    /// Build a matcher over a loaded catalogue.
    pub fn new(catalogue: &Catalogue, oracle: O) -> MatchResult<Self> {
        Self::with_config(catalogue, oracle, MatcherConfig::default())
    }

    pub fn with_config(
        catalogue: &Catalogue,
        oracle: O,
        config: MatcherConfig,
    ) -> MatchResult<Self> {
        let slots = Arc::clone(&catalogue.slots);

        let mut transition_sizes = HashMap::new();
        for level in slots.levels() {
            for label in level {
                if !transition_sizes.contains_key(label) {
                    let size = slots.comparables_for(label, true)?.len();
                    transition_sizes.insert(label.clone(), size);
                }
            }
        }

        let pool = catalogue.grammar.pool()?;
        tracing::debug!(
            candidates = pool.len(),
            labels = transition_sizes.len(),
            "matcher ready"
        );

        Ok(Self {
            grammar: Arc::clone(&catalogue.grammar),
            slots,
            rules: Arc::clone(&catalogue.rules),
            oracle: CachedOracle::new(oracle),
            transition_sizes,
            pool,
            config,
        })
    }

    /// The grammar this matcher scores against.
    pub fn grammar(&self) -> &StatementGrammar {
        &self.grammar
    }

    /// The slot dependency graph this matcher walks.
    pub fn slots(&self) -> &SlotGraph {
        &self.slots
    }

    /// Size of the pooled candidate set.
    pub fn pool_size(&self) -> usize {
        self.pool.len()
    }
}
