//! Slot dependency graph: ordered levels, parent map, eligibility.
//!
//! Levels encode left-to-right utterance structure (certainty before target
//! before positivity, and so on). Each level offers alternative slot labels;
//! a statement activates at most one label per level, and a label is only
//! eligible if one of its declared parents was activated at the previous
//! level. Root labels (empty parent set) are always eligible. The structure
//! is a layered DAG, validated at construction and immutable afterwards.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::{GrammarResult, SlotError, SlotResult};
use crate::grammar::components::ComponentTree;

/// A slot label: a category plus optional subcategory, written
/// `"grounding:object"` in catalogue files and utterance keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SlotLabel {
    category: String,
    subcategory: Option<String>,
}

impl SlotLabel {
    pub fn new(category: impl Into<String>, subcategory: Option<&str>) -> Self {
        Self {
            category: category.into(),
            subcategory: subcategory.map(str::to_string),
        }
    }

    /// Parse `"category"` or `"category:subcategory"` syntax.
    pub fn parse(raw: &str) -> Self {
        match raw.split_once(':') {
            Some((category, subcategory)) => Self {
                category: category.to_string(),
                subcategory: Some(subcategory.to_string()),
            },
            None => Self {
                category: raw.to_string(),
                subcategory: None,
            },
        }
    }

    /// The base category, with any subcategory suffix stripped.
    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn subcategory(&self) -> Option<&str> {
        self.subcategory.as_deref()
    }

    /// The full `category:subcategory` path into the component tree.
    pub fn path(&self) -> String {
        match &self.subcategory {
            Some(sub) => format!("{}:{sub}", self.category),
            None => self.category.clone(),
        }
    }
}

impl std::fmt::Display for SlotLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.subcategory {
            Some(sub) => write!(f, "{}:{sub}", self.category),
            None => write!(f, "{}", self.category),
        }
    }
}

/// The slot dependency graph: ordered levels plus the parent map, sharing
/// the grammar's component tree for candidate lookups.
#[derive(Debug)]
pub struct SlotGraph {
    levels: Vec<Vec<SlotLabel>>,
    parents: IndexMap<SlotLabel, Vec<SlotLabel>>,
    components: Arc<ComponentTree>,
}

impl SlotGraph {
    /// Build and validate the graph.
    ///
    /// Rejects labels without a parent entry, parents that the preceding
    /// level never offers, root labels outside the first level, and level
    /// labels whose candidate set is empty or unknown — all catalogue
    /// defects that must never surface during scoring.
    pub fn new(
        levels: Vec<Vec<SlotLabel>>,
        parents: IndexMap<SlotLabel, Vec<SlotLabel>>,
        components: Arc<ComponentTree>,
    ) -> SlotResult<Self> {
        let graph = Self {
            levels,
            parents,
            components,
        };
        graph.validate()?;
        Ok(graph)
    }

    fn validate(&self) -> SlotResult<()> {
        for (index, level) in self.levels.iter().enumerate() {
            for label in level {
                let declared =
                    self.parents
                        .get(label)
                        .ok_or_else(|| SlotError::MissingParents {
                            label: label.to_string(),
                        })?;

                if declared.is_empty() {
                    if index != 0 {
                        // A root label offered past the first level can never
                        // be reached through the sentinel.
                        return Err(SlotError::InvalidParent {
                            label: label.to_string(),
                            parent: "<root>".to_string(),
                        });
                    }
                } else if index == 0 {
                    return Err(SlotError::InvalidParent {
                        label: label.to_string(),
                        parent: declared[0].to_string(),
                    });
                }

                // Candidate sets must be resolvable and non-empty up front;
                // a zero-length list would make the uniform transition
                // probability undefined at scoring time.
                let comparables = self.comparables_for(label, true)?;
                if comparables.is_empty() {
                    return Err(crate::error::GrammarError::EmptyCandidateSet {
                        label: label.to_string(),
                    }
                    .into());
                }
                self.components.leaf_tokens(&label.path())?;
            }
        }

        // Every declared parent must be offered by the level immediately
        // before some occurrence of the label (layered DAG, not a general
        // graph).
        for (label, declared) in &self.parents {
            for parent in declared {
                let reachable = self.levels.iter().enumerate().any(|(index, level)| {
                    index > 0
                        && level.contains(label)
                        && self.levels[index - 1].contains(parent)
                });
                if !reachable {
                    return Err(SlotError::InvalidParent {
                        label: label.to_string(),
                        parent: parent.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Ordered slot levels.
    pub fn levels(&self) -> &[Vec<SlotLabel>] {
        &self.levels
    }

    /// The shared component tree.
    pub fn components(&self) -> &ComponentTree {
        &self.components
    }

    /// Whether a label appears anywhere in the level structure.
    pub fn knows_label(&self, label: &SlotLabel) -> bool {
        self.levels.iter().any(|level| level.contains(label))
    }

    /// Candidate tokens for a label.
    ///
    /// With `merge_subgroups`, a label whose category has subcategories
    /// yields the concatenation of all subcategory lists (declaration
    /// order, then token order) instead of resolving to one of them.
    pub fn comparables_for(
        &self,
        label: &SlotLabel,
        merge_subgroups: bool,
    ) -> GrammarResult<Vec<&str>> {
        if merge_subgroups {
            self.components.merged_tokens(label.category())
        } else {
            Ok(self
                .components
                .leaf_tokens(&label.path())?
                .iter()
                .map(String::as_str)
                .collect())
        }
    }

    /// Whether `label` may be activated after `activated_parent`.
    ///
    /// Root labels are always eligible; any other label requires the
    /// previously activated label to be in its parent set.
    pub fn is_eligible(&self, label: &SlotLabel, activated_parent: Option<&SlotLabel>) -> bool {
        match self.parents.get(label) {
            Some(declared) if declared.is_empty() => true,
            Some(declared) => match activated_parent {
                Some(parent) => declared.contains(parent),
                None => false,
            },
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::components::ComponentNode;

    fn tree() -> Arc<ComponentTree> {
        let mut grounding = IndexMap::new();
        grounding.insert(
            "object".to_string(),
            ComponentNode::Leaf(vec!["the bookcase".into(), "the desk".into()]),
        );
        grounding.insert(
            "area".to_string(),
            ComponentNode::Leaf(vec!["the hallway".into()]),
        );

        let mut root = IndexMap::new();
        root.insert(
            "certainty".to_string(),
            ComponentNode::Leaf(vec!["know".into(), "think".into()]),
        );
        root.insert("grounding".to_string(), ComponentNode::Branch(grounding));
        Arc::new(ComponentTree::new(root).unwrap())
    }

    fn label(raw: &str) -> SlotLabel {
        SlotLabel::parse(raw)
    }

    fn sample_graph() -> SlotGraph {
        let levels = vec![
            vec![label("certainty")],
            vec![label("grounding:object"), label("grounding:area")],
        ];
        let mut parents = IndexMap::new();
        parents.insert(label("certainty"), vec![]);
        parents.insert(label("grounding:object"), vec![label("certainty")]);
        parents.insert(label("grounding:area"), vec![label("certainty")]);
        SlotGraph::new(levels, parents, tree()).unwrap()
    }

    #[test]
    fn label_parsing_round_trips() {
        let l = label("grounding:object");
        assert_eq!(l.category(), "grounding");
        assert_eq!(l.subcategory(), Some("object"));
        assert_eq!(l.to_string(), "grounding:object");
        assert_eq!(label("certainty").subcategory(), None);
    }

    #[test]
    fn eligibility_respects_parent_map() {
        let graph = sample_graph();
        let certainty = label("certainty");
        let object = label("grounding:object");

        assert!(graph.is_eligible(&certainty, None));
        assert!(graph.is_eligible(&object, Some(&certainty)));
        assert!(!graph.is_eligible(&object, None));
        assert!(!graph.is_eligible(&object, Some(&label("grounding:area"))));
    }

    #[test]
    fn merged_comparables_concatenate_subgroups() {
        let graph = sample_graph();
        let merged = graph
            .comparables_for(&label("grounding:area"), true)
            .unwrap();
        assert_eq!(merged, vec!["the bookcase", "the desk", "the hallway"]);

        let narrow = graph
            .comparables_for(&label("grounding:area"), false)
            .unwrap();
        assert_eq!(narrow, vec!["the hallway"]);
    }

    #[test]
    fn unknown_label_surfaces() {
        let graph = sample_graph();
        assert!(graph.comparables_for(&label("groundling:object"), true).is_err());
    }

    #[test]
    fn missing_parent_entry_is_rejected() {
        let levels = vec![vec![label("certainty")], vec![label("grounding:object")]];
        let mut parents = IndexMap::new();
        parents.insert(label("certainty"), vec![]);
        let err = SlotGraph::new(levels, parents, tree()).unwrap_err();
        assert!(matches!(err, SlotError::MissingParents { .. }));
    }

    #[test]
    fn parent_outside_preceding_level_is_rejected() {
        let levels = vec![
            vec![label("certainty")],
            vec![label("grounding:object"), label("grounding:area")],
        ];
        let mut parents = IndexMap::new();
        parents.insert(label("certainty"), vec![]);
        // grounding:object claims grounding:area as parent, but area is a
        // sibling on the same level, never the preceding one.
        parents.insert(label("grounding:object"), vec![label("grounding:area")]);
        parents.insert(label("grounding:area"), vec![label("certainty")]);
        let err = SlotGraph::new(levels, parents, tree()).unwrap_err();
        assert!(matches!(err, SlotError::InvalidParent { .. }));
    }
}
