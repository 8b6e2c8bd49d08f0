//! Direct lookup mode: per-label resolution of pre-classified templates.

use indexmap::IndexMap;

use crate::error::{GrammarError, MatchError, MatchResult};
use crate::grammar::{
    ActionStatement, SpatialAxis, SpatialRelationStatement, Statement, StatementKind,
};
use crate::oracle::SimilarityOracle;

use super::score::normalize_token;
use super::{FilledTemplate, Matcher};

impl<O: SimilarityOracle> Matcher<O> {
    /// Resolve each filled template to a statement of its declared kind.
    ///
    /// Every (label, token) pair is rated independently against the label's
    /// merged candidate list using raw similarity — no transition term, no
    /// structural constraints — and the top candidate wins. An empty token
    /// rates all candidates equally, selecting the first in declaration
    /// order.
    pub fn resolve(&self, templates: &[FilledTemplate]) -> MatchResult<Vec<Statement>> {
        templates
            .iter()
            .map(|template| self.resolve_one(template))
            .collect()
    }

    fn resolve_one(&self, template: &FilledTemplate) -> MatchResult<Statement> {
        let kind = StatementKind::parse(template.kind())?;

        let mut resolved: IndexMap<String, String> = IndexMap::new();
        for (label, token) in template.values() {
            let comparables = self.slots.comparables_for(label, true)?;
            if comparables.is_empty() {
                return Err(GrammarError::EmptyCandidateSet {
                    label: label.to_string(),
                }
                .into());
            }
            let rated = self.rate_comparables(token, &comparables)?;
            // Subcategory stripped: the constructor keys on base categories.
            resolved.insert(label.category().to_string(), rated[0].0.to_string());
        }

        tracing::debug!(kind = %kind, slots = resolved.len(), "resolved template");
        Ok(self.build_statement(kind, &resolved))
    }

    /// Normalized similarity of every candidate to the token, sorted
    /// descending with declaration order breaking ties.
    fn rate_comparables<'c>(
        &self,
        token: &str,
        comparables: &[&'c str],
    ) -> MatchResult<Vec<(&'c str, f64)>> {
        let token = normalize_token(token);
        let similarities: Vec<f64> = if token.is_empty() {
            vec![1.0; comparables.len()]
        } else {
            comparables
                .iter()
                .map(|candidate| {
                    self.oracle.similarity(&normalize_token(candidate), &token)
                })
                .collect()
        };

        let total: f64 = similarities.iter().sum();
        if !(total > 0.0) {
            return Err(MatchError::DegenerateDistribution {
                candidate_count: comparables.len(),
            });
        }

        let mut rated: Vec<(&str, f64)> = comparables
            .iter()
            .zip(similarities)
            .map(|(candidate, similarity)| (*candidate, similarity / total))
            .collect();
        rated.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        Ok(rated)
    }

    fn build_statement(&self, kind: StatementKind, resolved: &IndexMap<String, String>) -> Statement {
        let value = |category: &str| resolved.get(category).cloned().unwrap_or_default();
        let components = self.grammar.components();

        match kind {
            StatementKind::SpatialRelation => {
                let relation = value("spatial_relation");
                let grounding = value("grounding");
                // The merged candidate list loses the subgroup; recover the
                // axis from whichever subgroup contributed the winning
                // token, preferring the grounding (its subgroups are
                // disjoint, relation subgroups are not).
                let axis = components
                    .subgroup_of("grounding", &grounding)
                    .or_else(|| components.subgroup_of("spatial_relation", &relation))
                    .and_then(SpatialAxis::from_subcategory)
                    .unwrap_or(SpatialAxis::Object);
                Statement::SpatialRelation(SpatialRelationStatement {
                    certainty: value("certainty"),
                    target: value("target"),
                    positivity: value("positivity"),
                    relation,
                    grounding,
                    axis,
                })
            }
            StatementKind::Action => {
                let grounding = resolved.get("grounding").map(|token| {
                    let axis = components
                        .subgroup_of("grounding", token)
                        .and_then(SpatialAxis::from_subcategory)
                        .unwrap_or(SpatialAxis::Object);
                    (axis, token.clone())
                });
                Statement::Action(ActionStatement {
                    certainty: value("certainty"),
                    target: value("target"),
                    positivity: value("positivity"),
                    action: value("action"),
                    modifier: resolved.get("modifier").cloned(),
                    movement: resolved.get("spatial_relation").cloned(),
                    grounding,
                })
            }
        }
    }
}
