//! Global ranking mode: score an utterance against the whole statement pool.

use rayon::prelude::*;

use crate::error::{MatchError, MatchResult};
use crate::grammar::Statement;
use crate::oracle::SimilarityOracle;
use crate::slots::SlotLabel;

use super::score::observation_probability;
use super::{LabeledUtterance, Matcher, Ranked};

impl<O: SimilarityOracle> Matcher<O> {
    /// Rank every enumerated statement against the utterance.
    ///
    /// Returns the full candidate pool as (probability, statement) pairs,
    /// probabilities normalized to sum to 1, sorted descending with ties
    /// kept in enumeration order. An utterance with no recognized labels
    /// ranks the pool uniformly.
    pub fn rank(&self, utterance: &LabeledUtterance) -> MatchResult<Vec<Ranked>> {
        tracing::debug!(phrase = %utterance, candidates = self.pool.len(), "ranking utterance");

        let scores: Vec<f64> = if !utterance.recognizes_any(&self.slots) {
            // Every level would be skipped; the joint stays at 1 for each
            // candidate and normalization makes the distribution uniform.
            vec![1.0; self.pool.len()]
        } else if self.config.parallel {
            self.pool
                .par_iter()
                .map(|statement| self.score_candidate(statement, utterance))
                .collect()
        } else {
            self.pool
                .iter()
                .map(|statement| self.score_candidate(statement, utterance))
                .collect()
        };

        let total: f64 = scores.iter().sum();
        if !(total > 0.0) {
            tracing::warn!(phrase = %utterance, "all candidate scores are zero");
            return Err(MatchError::DegenerateDistribution {
                candidate_count: self.pool.len(),
            });
        }

        let mut ranked: Vec<Ranked> = scores
            .into_iter()
            .zip(self.pool.iter().cloned())
            .map(|(score, statement)| Ranked {
                probability: score / total,
                statement,
            })
            .collect();

        // Stable sort: equal probabilities keep enumeration order.
        ranked.sort_by(|a, b| {
            b.probability
                .partial_cmp(&a.probability)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        debug_assert!(
            (ranked.iter().map(|r| r.probability).sum::<f64>() - 1.0).abs()
                < self.config.tolerance
        );
        Ok(ranked)
    }

    /// Rank and keep only the `n` most probable interpretations.
    pub fn rank_top(&self, utterance: &LabeledUtterance, n: usize) -> MatchResult<Vec<Ranked>> {
        let mut ranked = self.rank(utterance)?;
        ranked.truncate(n);
        Ok(ranked)
    }

    /// Joint (unnormalized) probability that the statement expresses the
    /// utterance: a walk over the slot levels multiplying observation and
    /// transition factors.
    fn score_candidate(&self, statement: &Statement, utterance: &LabeledUtterance) -> f64 {
        let mut prev_label: Option<&SlotLabel> = None;
        let mut consumed: Vec<&SlotLabel> = Vec::new();
        let mut joint = 1.0;

        for level in self.slots.levels() {
            // Which label (if any) does the statement activate here: the
            // first eligible label, in declaration order, that it carries an
            // informative token for.
            let mut activated: Option<(&SlotLabel, &str)> = None;
            for label in level {
                if self.slots.is_eligible(label, prev_label)
                    && statement.has_informative_value(label)
                {
                    activated = Some((label, statement.value_for(label).unwrap_or_default()));
                    break;
                }
            }

            let (label, statement_token) = match activated {
                Some((label, token)) => {
                    prev_label = Some(label);
                    consumed.push(label);
                    (label, token)
                }
                None => {
                    // The statement is silent at this level; if the
                    // utterance still carries an unconsumed token for one of
                    // its labels, the statement must pay for it.
                    let probe = level.iter().find(|label| {
                        !consumed.contains(label) && utterance.token_for(label).is_some()
                    });
                    match probe {
                        Some(label) => {
                            consumed.push(label);
                            (label, "")
                        }
                        None => continue,
                    }
                }
            };

            let utterance_token = utterance.token_for(label).unwrap_or("");
            if statement_token.is_empty() && utterance_token.is_empty() {
                continue;
            }

            // Uniform transition prior over the merged candidate set for
            // this slot; zero when the utterance has no token here. The
            // observation factor is still computed in the zero case to keep
            // the multiplicative structure intact.
            let transition = if utterance_token.is_empty() {
                0.0
            } else {
                let size = self
                    .transition_sizes
                    .get(label)
                    .copied()
                    .expect("level labels precomputed at construction");
                1.0 / size as f64
            };

            let observation = observation_probability(
                &self.oracle,
                &self.rules,
                statement_token,
                utterance_token,
            );

            joint *= observation * transition;
        }

        joint
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalogue;
    use crate::grammar::{SpatialAxis, Statement};
    use crate::matcher::MatcherConfig;

    /// Word-overlap oracle: exact tokens score 1, tokens sharing a word
    /// score 0.5, anything else a floor. Deterministic by construction.
    struct OverlapOracle;

    impl SimilarityOracle for OverlapOracle {
        fn similarity(&self, a: &str, b: &str) -> f64 {
            if a == b {
                return 1.0;
            }
            let shared = a
                .split_whitespace()
                .any(|w| b.split_whitespace().any(|v| v == w));
            if shared { 0.5 } else { 0.05 }
        }

        fn magnitude(&self, _token: &str) -> f64 {
            1.0
        }
    }

    fn matcher() -> Matcher<OverlapOracle> {
        let catalogue = Catalogue::builtin().unwrap();
        Matcher::new(&catalogue, OverlapOracle).unwrap()
    }

    fn spatial_utterance() -> LabeledUtterance {
        LabeledUtterance::from_pairs([
            ("certainty", "know"),
            ("target", "a robot"),
            ("positivity", "is"),
            ("spatial_relation:object", "right of"),
            ("grounding:object", "the bookcase"),
        ])
    }

    #[test]
    fn probabilities_sum_to_one() {
        let ranked = matcher().rank(&spatial_utterance()).unwrap();
        let total: f64 = ranked.iter().map(|r| r.probability).sum();
        assert!((total - 1.0).abs() < 1e-6);
    }

    #[test]
    fn exact_spatial_utterance_ranks_its_statement_first() {
        let ranked = matcher().rank(&spatial_utterance()).unwrap();
        match &ranked[0].statement {
            Statement::SpatialRelation(s) => {
                assert_eq!(s.certainty, "know");
                assert_eq!(s.target, "a robot");
                assert_eq!(s.positivity, "is");
                assert_eq!(s.relation, "right of");
                assert_eq!(s.grounding, "the bookcase");
                assert_eq!(s.axis, SpatialAxis::Object);
            }
            other => panic!("expected a spatial statement on top, got {other}"),
        }
        assert!(ranked[0].probability > ranked[1].probability);
    }

    #[test]
    fn ranking_is_deterministic() {
        let m = matcher();
        let first = m.rank(&spatial_utterance()).unwrap();
        let second = m.rank(&spatial_utterance()).unwrap();
        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.probability, b.probability);
            assert_eq!(a.statement, b.statement);
        }
    }

    #[test]
    fn serial_and_parallel_scoring_agree() {
        let catalogue = Catalogue::builtin().unwrap();
        let serial = Matcher::with_config(
            &catalogue,
            OverlapOracle,
            MatcherConfig {
                parallel: false,
                ..Default::default()
            },
        )
        .unwrap();
        let parallel = matcher();

        let a = serial.rank(&spatial_utterance()).unwrap();
        let b = parallel.rank(&spatial_utterance()).unwrap();
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.probability, y.probability);
        }
    }

    #[test]
    fn empty_utterance_is_uniform() {
        let ranked = matcher().rank(&LabeledUtterance::new()).unwrap();
        let expected = 1.0 / ranked.len() as f64;
        for entry in &ranked {
            assert!((entry.probability - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn unrecognized_labels_rank_uniformly() {
        let utterance = LabeledUtterance::from_pairs([("sentiment", "annoyed")]);
        let ranked = matcher().rank(&utterance).unwrap();
        let expected = 1.0 / ranked.len() as f64;
        assert!((ranked[0].probability - expected).abs() < 1e-9);
    }

    #[test]
    fn negated_utterance_rules_out_affirmative_statements() {
        let utterance = LabeledUtterance::from_pairs([
            ("certainty", "know"),
            ("target", "a robot"),
            ("positivity", "isn't"),
            ("spatial_relation:object", "near"),
            ("grounding:object", "the desk"),
        ]);
        let ranked = matcher().rank(&utterance).unwrap();
        for entry in &ranked {
            let positivity = entry
                .statement
                .value_for(&SlotLabel::parse("positivity"))
                .unwrap();
            if positivity == "is" {
                assert_eq!(entry.probability, 0.0);
            }
        }
        let top_positivity = ranked[0]
            .statement
            .value_for(&SlotLabel::parse("positivity"))
            .unwrap();
        assert_eq!(top_positivity, "is not");
    }

    #[test]
    fn shared_entity_name_dominates_the_target_slot() {
        let utterance = LabeledUtterance::from_pairs([
            ("certainty", "know"),
            ("target", "Pris"),
            ("positivity", "is"),
            ("spatial_relation:area", "inside"),
            ("grounding:area", "the kitchen"),
        ]);
        let ranked = matcher().rank(&utterance).unwrap();
        let top_target = ranked[0]
            .statement
            .value_for(&SlotLabel::parse("target"))
            .unwrap();
        assert_eq!(top_target, "Pris");
    }

    #[test]
    fn rank_top_caps_the_result() {
        let ranked = matcher().rank_top(&spatial_utterance(), 5).unwrap();
        assert_eq!(ranked.len(), 5);
    }

    #[test]
    fn statements_missing_an_uttered_slot_score_zero() {
        // The utterance names a grounding; a bare action statement has none
        // and must not absorb probability mass.
        let utterance = LabeledUtterance::from_pairs([
            ("certainty", "know"),
            ("target", "a robot"),
            ("positivity", "is"),
            ("spatial_relation:object", "right of"),
            ("grounding:object", "the bookcase"),
        ]);
        let m = matcher();
        let ranked = m.rank(&utterance).unwrap();
        for entry in &ranked {
            if let Statement::Action(s) = &entry.statement {
                if s.grounding.is_none() {
                    assert_eq!(entry.probability, 0.0, "bare action scored: {}", s.action);
                }
            }
        }
    }
}
