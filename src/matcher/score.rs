//! Token-pair scoring: normalization plus the observation probability.

use unicode_normalization::UnicodeNormalization;

use crate::oracle::SimilarityOracle;

use super::rules::DisambiguationRules;

/// Canonicalize a surface token before it reaches the oracle or the rules:
/// NFC-normalize, treat underscores as word separators, and collapse runs
/// of whitespace.
pub fn normalize_token(raw: &str) -> String {
    let composed: String = raw.nfc().collect();
    composed
        .replace('_', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Observation probability that the utterance token expresses the statement
/// token at a slot.
///
/// Either token empty means no observation (0). Otherwise the oracle's
/// similarity is scaled by both tokens' richness magnitudes, then the
/// disambiguation overrides get the final word.
pub fn observation_probability<O: SimilarityOracle>(
    oracle: &O,
    rules: &DisambiguationRules,
    statement_token: &str,
    utterance_token: &str,
) -> f64 {
    let statement = normalize_token(statement_token);
    let utterance = normalize_token(utterance_token);

    let base = if statement.is_empty() || utterance.is_empty() {
        0.0
    } else {
        oracle.similarity(&statement, &utterance)
            * oracle.magnitude(&statement)
            * oracle.magnitude(&utterance)
    };

    rules.apply(&statement, &utterance, base)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ExactOracle;

    impl SimilarityOracle for ExactOracle {
        fn similarity(&self, a: &str, b: &str) -> f64 {
            if a == b { 1.0 } else { 0.2 }
        }

        fn magnitude(&self, _token: &str) -> f64 {
            2.0
        }
    }

    #[test]
    fn underscores_and_spaces_are_interchangeable() {
        assert_eq!(normalize_token("right_of"), "right of");
        assert_eq!(normalize_token("  right   of "), "right of");
    }

    #[test]
    fn empty_tokens_observe_nothing() {
        let rules = DisambiguationRules::default();
        assert_eq!(observation_probability(&ExactOracle, &rules, "", "near"), 0.0);
        assert_eq!(observation_probability(&ExactOracle, &rules, "near", ""), 0.0);
    }

    #[test]
    fn similarity_is_scaled_by_both_magnitudes() {
        let rules = DisambiguationRules::default();
        let p = observation_probability(&ExactOracle, &rules, "right_of", "right of");
        assert_eq!(p, 1.0 * 2.0 * 2.0);
    }

    #[test]
    fn overrides_outrank_the_oracle() {
        let rules = DisambiguationRules::default();
        // "is" vs "isn't" would score 0.2 * 4 by similarity, but the
        // polarity override zeroes it.
        assert_eq!(observation_probability(&ExactOracle, &rules, "is", "isn't"), 0.0);
        assert_eq!(
            observation_probability(&ExactOracle, &rules, "Roy", "Roy"),
            1.0
        );
    }
}
