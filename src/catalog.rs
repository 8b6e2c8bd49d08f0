//! Catalogue loading: TOML grammar definitions, validated eagerly.
//!
//! A catalogue bundles everything the matcher needs: the component tree,
//! the slot levels and parent map, and the disambiguation vocabulary. One
//! catalogue ships inside the binary; others load from disk. All structural
//! validation happens here, at load time — scoring never encounters a
//! malformed grammar.

use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::{GrammarError, ParlanceResult};
use crate::grammar::{ComponentNode, ComponentTree, StatementGrammar};
use crate::matcher::DisambiguationRules;
use crate::slots::{SlotGraph, SlotLabel};

/// The default statement catalogue, bundled into the binary.
pub const DEFAULT_CATALOGUE: &str = include_str!("../data/grammar/default.toml");

// ---------------------------------------------------------------------------
// TOML schema
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct CatalogueToml {
    grammar: MetaToml,
    components: IndexMap<String, ComponentToml>,
    levels: LevelsToml,
    parents: IndexMap<String, Vec<String>>,
    #[serde(default)]
    rules: RulesToml,
}

#[derive(Debug, Deserialize)]
struct MetaToml {
    name: String,
    version: u32,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ComponentToml {
    Leaf(Vec<String>),
    Branch(IndexMap<String, ComponentToml>),
}

#[derive(Debug, Deserialize)]
struct LevelsToml {
    order: Vec<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct RulesToml {
    affirmative: Vec<String>,
    negated: Vec<String>,
    entities: Vec<String>,
}

impl Default for RulesToml {
    fn default() -> Self {
        let defaults = DisambiguationRules::default();
        Self {
            affirmative: vec!["is".into()],
            negated: vec!["is not".into()],
            entities: defaults.entities().to_vec(),
        }
    }
}

fn component_node(raw: ComponentToml) -> ComponentNode {
    match raw {
        ComponentToml::Leaf(tokens) => ComponentNode::Leaf(tokens),
        ComponentToml::Branch(children) => ComponentNode::Branch(
            children
                .into_iter()
                .map(|(name, child)| (name, component_node(child)))
                .collect(),
        ),
    }
}

// ---------------------------------------------------------------------------
// Catalogue
// ---------------------------------------------------------------------------

/// A loaded, validated grammar catalogue: everything the matcher consumes,
/// immutable and shareable across scoring workers.
#[derive(Debug, Clone)]
pub struct Catalogue {
    pub name: String,
    pub version: u32,
    pub grammar: Arc<StatementGrammar>,
    pub slots: Arc<SlotGraph>,
    pub rules: Arc<DisambiguationRules>,
}

impl Catalogue {
    /// The catalogue bundled into the binary.
    pub fn builtin() -> ParlanceResult<Self> {
        Self::from_toml_str(DEFAULT_CATALOGUE)
    }

    /// Load a catalogue from a TOML file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> ParlanceResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| GrammarError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate a catalogue definition.
    pub fn from_toml_str(content: &str) -> ParlanceResult<Self> {
        let parsed: CatalogueToml =
            toml::from_str(content).map_err(|e| GrammarError::Parse {
                message: e.to_string(),
            })?;

        let root: IndexMap<String, ComponentNode> = parsed
            .components
            .into_iter()
            .map(|(name, node)| (name, component_node(node)))
            .collect();
        let components = Arc::new(ComponentTree::new(root)?);
        let grammar = Arc::new(StatementGrammar::new(Arc::clone(&components))?);

        let levels: Vec<Vec<SlotLabel>> = parsed
            .levels
            .order
            .iter()
            .map(|level| level.iter().map(|raw| SlotLabel::parse(raw)).collect())
            .collect();
        let parents: IndexMap<SlotLabel, Vec<SlotLabel>> = parsed
            .parents
            .iter()
            .map(|(label, declared)| {
                (
                    SlotLabel::parse(label),
                    declared.iter().map(|raw| SlotLabel::parse(raw)).collect(),
                )
            })
            .collect();
        let slots = Arc::new(SlotGraph::new(levels, parents, components)?);

        let rules = Arc::new(DisambiguationRules::new(
            parsed.rules.affirmative,
            parsed.rules.negated,
            parsed.rules.entities,
        ));

        tracing::info!(
            name = %parsed.grammar.name,
            version = parsed.grammar.version,
            levels = slots.levels().len(),
            "loaded grammar catalogue"
        );

        Ok(Self {
            name: parsed.grammar.name,
            version: parsed.grammar.version,
            grammar,
            slots,
            rules,
        })
    }
}
