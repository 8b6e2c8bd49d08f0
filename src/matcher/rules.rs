//! Hand-written disambiguation overrides.
//!
//! Semantic similarity alone confuses a few pairs the domain cannot afford
//! to confuse: "is" and "is not" embed almost identically, and proper names
//! carry more identity than any embedding distance. These overrides run
//! after the base observation probability and replace it outright.

use regex::Regex;

/// Matches an explicit negation marker: a contracted `n't` or the
/// standalone word "not". Applied to separator-normalized tokens.
const NEGATION_PATTERN: &str = r"n't\b|\bnot\b";

/// Override vocabulary, loaded from the catalogue's `[rules]` section.
#[derive(Debug, Clone)]
pub struct DisambiguationRules {
    affirmative: Vec<String>,
    negated: Vec<String>,
    entities: Vec<String>,
    negation: Regex,
}

impl DisambiguationRules {
    pub fn new(affirmative: Vec<String>, negated: Vec<String>, entities: Vec<String>) -> Self {
        Self {
            affirmative,
            negated,
            entities,
            negation: Regex::new(NEGATION_PATTERN).expect("static pattern compiles"),
        }
    }

    /// Known entity names, matched case-sensitively.
    pub fn entities(&self) -> &[String] {
        &self.entities
    }

    /// Whether the utterance token carries an explicit negation marker.
    pub fn is_negated(&self, utterance_token: &str) -> bool {
        self.negation.is_match(utterance_token)
    }

    /// Apply the overrides to a base observation probability.
    ///
    /// An affirmative statement token against a negated utterance token is
    /// impossible; a negated statement token against an unnegated utterance
    /// token is impossible; a proper name shared by both tokens is certain
    /// regardless of what the oracle thought.
    pub fn apply(&self, statement_token: &str, utterance_token: &str, base: f64) -> f64 {
        let mut probability = base;

        if self.affirmative.iter().any(|t| t == statement_token) && self.is_negated(utterance_token)
        {
            probability = 0.0;
        }
        if self.negated.iter().any(|t| t == statement_token) && !self.is_negated(utterance_token) {
            probability = 0.0;
        }

        for name in &self.entities {
            if statement_token.contains(name.as_str()) && utterance_token.contains(name.as_str()) {
                probability = 1.0;
            }
        }

        probability
    }
}

impl Default for DisambiguationRules {
    fn default() -> Self {
        Self::new(
            vec!["is".into()],
            vec!["is not".into()],
            vec!["Roy".into(), "Pris".into(), "Zhora".into(), "Deckard".into()],
        )
    }
}
