//! Combinatorial statement enumeration.
//!
//! Produces every statement instance the catalogue can express, as a lazy,
//! restartable iterator — the full pool is a Cartesian product of candidate
//! lists per kind and can be large, so nothing is materialized unless the
//! caller collects. Dependency-violating combinations are never generated:
//! each shape pairs relation and grounding subgroups on the same axis, and
//! groundings only appear behind a relation that licenses them.

use crate::error::GrammarResult;
use crate::grammar::components::ComponentTree;
use crate::grammar::statement::{
    ActionStatement, SpatialAxis, SpatialRelationStatement, Statement, StatementKind,
};

/// Mixed-radix counter over a list of candidate-list sizes. The rightmost
/// digit varies fastest, so combinations come out in declaration order.
struct Odometer {
    sizes: Vec<usize>,
    digits: Vec<usize>,
    exhausted: bool,
}

impl Odometer {
    fn new(sizes: Vec<usize>) -> Self {
        let exhausted = sizes.is_empty() || sizes.iter().any(|&s| s == 0);
        let digits = vec![0; sizes.len()];
        Self {
            sizes,
            digits,
            exhausted,
        }
    }
}

impl Iterator for Odometer {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        if self.exhausted {
            return None;
        }
        let out = self.digits.clone();
        let mut position = self.sizes.len();
        loop {
            if position == 0 {
                self.exhausted = true;
                break;
            }
            position -= 1;
            self.digits[position] += 1;
            if self.digits[position] < self.sizes[position] {
                break;
            }
            self.digits[position] = 0;
        }
        Some(out)
    }
}

/// One enumerable statement shape: which variant to build, and which
/// candidate lists feed its attribute positions.
enum Shape {
    Spatial(SpatialAxis),
    ActionBare,
    ActionModifier,
    ActionMovement(SpatialAxis),
}

struct ShapeRun {
    shape: Shape,
    lists: Vec<Vec<String>>,
    odometer: Odometer,
}

impl ShapeRun {
    fn new(shape: Shape, lists: Vec<Vec<String>>) -> Self {
        let odometer = Odometer::new(lists.iter().map(Vec::len).collect());
        Self {
            shape,
            lists,
            odometer,
        }
    }

    fn token(&self, digits: &[usize], position: usize) -> String {
        self.lists[position][digits[position]].clone()
    }

    fn build(&self, digits: &[usize]) -> Statement {
        match self.shape {
            Shape::Spatial(axis) => Statement::SpatialRelation(SpatialRelationStatement {
                certainty: self.token(digits, 0),
                target: self.token(digits, 1),
                positivity: self.token(digits, 2),
                relation: self.token(digits, 3),
                grounding: self.token(digits, 4),
                axis,
            }),
            Shape::ActionBare => Statement::Action(ActionStatement {
                certainty: self.token(digits, 0),
                target: self.token(digits, 1),
                positivity: self.token(digits, 2),
                action: self.token(digits, 3),
                modifier: None,
                movement: None,
                grounding: None,
            }),
            Shape::ActionModifier => Statement::Action(ActionStatement {
                certainty: self.token(digits, 0),
                target: self.token(digits, 1),
                positivity: self.token(digits, 2),
                action: self.token(digits, 3),
                modifier: Some(self.token(digits, 4)),
                movement: None,
                grounding: None,
            }),
            Shape::ActionMovement(axis) => Statement::Action(ActionStatement {
                certainty: self.token(digits, 0),
                target: self.token(digits, 1),
                positivity: self.token(digits, 2),
                action: self.token(digits, 3),
                modifier: None,
                movement: Some(self.token(digits, 4)),
                grounding: Some((axis, self.token(digits, 5))),
            }),
        }
    }
}

/// Lazy statement enumeration. Restartable: ask the grammar for a fresh
/// iterator to start over.
pub struct Statements {
    runs: std::vec::IntoIter<ShapeRun>,
    current: Option<ShapeRun>,
}

impl Statements {
    pub(crate) fn new(tree: &ComponentTree, kinds: &[StatementKind]) -> GrammarResult<Self> {
        let owned = |tokens: &[String]| tokens.to_vec();
        let certainty = owned(tree.leaf_tokens("certainty")?);
        let target = owned(tree.leaf_tokens("target")?);
        let positivity = owned(tree.leaf_tokens("positivity")?);

        let mut runs = Vec::new();
        for kind in kinds {
            match kind {
                StatementKind::SpatialRelation => {
                    for axis in [SpatialAxis::Object, SpatialAxis::Area] {
                        let relation =
                            owned(tree.leaf_tokens(&format!("spatial_relation:{}", axis.subcategory()))?);
                        let grounding =
                            owned(tree.leaf_tokens(&format!("grounding:{}", axis.subcategory()))?);
                        runs.push(ShapeRun::new(
                            Shape::Spatial(axis),
                            vec![
                                certainty.clone(),
                                target.clone(),
                                positivity.clone(),
                                relation,
                                grounding,
                            ],
                        ));
                    }
                }
                StatementKind::Action => {
                    let action = owned(tree.leaf_tokens("action")?);
                    let modifier = owned(tree.leaf_tokens("modifier")?);
                    let movement = owned(tree.leaf_tokens("spatial_relation:movement")?);

                    runs.push(ShapeRun::new(
                        Shape::ActionBare,
                        vec![
                            certainty.clone(),
                            target.clone(),
                            positivity.clone(),
                            action.clone(),
                        ],
                    ));
                    runs.push(ShapeRun::new(
                        Shape::ActionModifier,
                        vec![
                            certainty.clone(),
                            target.clone(),
                            positivity.clone(),
                            action.clone(),
                            modifier,
                        ],
                    ));
                    for axis in [SpatialAxis::Object, SpatialAxis::Area] {
                        let grounding =
                            owned(tree.leaf_tokens(&format!("grounding:{}", axis.subcategory()))?);
                        runs.push(ShapeRun::new(
                            Shape::ActionMovement(axis),
                            vec![
                                certainty.clone(),
                                target.clone(),
                                positivity.clone(),
                                action.clone(),
                                movement.clone(),
                                grounding,
                            ],
                        ));
                    }
                }
            }
        }

        Ok(Self {
            runs: runs.into_iter(),
            current: None,
        })
    }
}

impl Iterator for Statements {
    type Item = Statement;

    fn next(&mut self) -> Option<Statement> {
        loop {
            if let Some(run) = &mut self.current {
                if let Some(digits) = run.odometer.next() {
                    return Some(run.build(&digits));
                }
            }
            self.current = Some(self.runs.next()?);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::StatementGrammar;
    use crate::slots::SlotLabel;

    fn grammar() -> StatementGrammar {
        crate::catalog::Catalogue::builtin().unwrap().grammar.as_ref().clone()
    }

    #[test]
    fn odometer_counts_in_declaration_order() {
        let combos: Vec<Vec<usize>> = Odometer::new(vec![2, 3]).collect();
        assert_eq!(
            combos,
            vec![
                vec![0, 0],
                vec![0, 1],
                vec![0, 2],
                vec![1, 0],
                vec![1, 1],
                vec![1, 2]
            ]
        );
    }

    #[test]
    fn odometer_with_empty_list_is_empty() {
        assert_eq!(Odometer::new(vec![2, 0]).count(), 0);
        assert_eq!(Odometer::new(vec![]).count(), 0);
    }

    #[test]
    fn pool_size_matches_the_product_of_candidate_lists() {
        let g = grammar();
        // spatial: 2*6*2 * (5*6 + 3*6); action: 2*6*2 * (2 + 2*3 + 2*3*12)
        let spatial = g
            .enumerate_all(&[StatementKind::SpatialRelation])
            .unwrap()
            .count();
        let action = g.enumerate_all(&[StatementKind::Action]).unwrap().count();
        assert_eq!(spatial, 24 * (30 + 18));
        assert_eq!(action, 24 * (2 + 6 + 72));
    }

    #[test]
    fn enumeration_is_deterministic_and_restartable() {
        let g = grammar();
        let first: Vec<String> = g
            .enumerate_all(&StatementKind::all())
            .unwrap()
            .take(10)
            .map(|s| s.to_string())
            .collect();
        let second: Vec<String> = g
            .enumerate_all(&StatementKind::all())
            .unwrap()
            .take(10)
            .map(|s| s.to_string())
            .collect();
        assert_eq!(first, second);
    }

    #[test]
    fn relation_and_grounding_always_share_an_axis() {
        let g = grammar();
        for statement in g.enumerate_all(&StatementKind::all()).unwrap() {
            match &statement {
                Statement::SpatialRelation(s) => {
                    let axis_label =
                        SlotLabel::parse(&format!("grounding:{}", s.axis.subcategory()));
                    assert_eq!(statement.value_for(&axis_label), Some(s.grounding.as_str()));
                }
                Statement::Action(s) => {
                    // A grounding never appears without a licensing movement
                    // relation.
                    if s.grounding.is_some() {
                        assert!(s.movement.is_some());
                    }
                }
            }
        }
    }
}
