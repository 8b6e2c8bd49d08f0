//! Component tree: the catalogue of candidate tokens per slot category.
//!
//! Categories either hold a flat token list ("certainty") or split into
//! subcategories ("grounding" into "object"/"area"). The tree is built once
//! from a catalogue definition, validated eagerly, and never mutated —
//! navigation is explicit path resolution, with absence reported as a value,
//! not an exception.

use indexmap::IndexMap;

use crate::error::{GrammarError, GrammarResult};

/// A node in the component tree.
#[derive(Debug, Clone)]
pub enum ComponentNode {
    /// Candidate surface tokens, in declaration order.
    Leaf(Vec<String>),
    /// Subcategories, in declaration order.
    Branch(IndexMap<String, ComponentNode>),
}

/// Immutable catalogue of slot categories and their candidate tokens.
#[derive(Debug, Clone)]
pub struct ComponentTree {
    root: IndexMap<String, ComponentNode>,
}

impl ComponentTree {
    /// Build a tree, rejecting malformed leaves up front: every leaf must
    /// hold at least one token, and tokens must be unique and non-empty.
    pub fn new(root: IndexMap<String, ComponentNode>) -> GrammarResult<Self> {
        for (name, node) in &root {
            validate_node(name, node)?;
        }
        Ok(Self { root })
    }

    /// Top-level category names, in declaration order.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.root.keys().map(String::as_str)
    }

    /// Resolve a `category:subcategory` path to its node.
    pub fn resolve(&self, path: &str) -> GrammarResult<&ComponentNode> {
        let mut segments = path.split(':');
        let head = segments.next().unwrap_or_default();
        let mut node = self.root.get(head).ok_or_else(|| GrammarError::UnknownLabel {
            label: path.to_string(),
        })?;
        for segment in segments {
            match node {
                ComponentNode::Branch(children) => {
                    node = children
                        .get(segment)
                        .ok_or_else(|| GrammarError::UnknownLabel {
                            label: path.to_string(),
                        })?;
                }
                ComponentNode::Leaf(_) => {
                    return Err(GrammarError::UnknownLabel {
                        label: path.to_string(),
                    });
                }
            }
        }
        Ok(node)
    }

    /// Candidate tokens for a fully-resolved leaf path.
    pub fn leaf_tokens(&self, path: &str) -> GrammarResult<&[String]> {
        match self.resolve(path)? {
            ComponentNode::Leaf(tokens) => Ok(tokens),
            ComponentNode::Branch(_) => Err(GrammarError::UnknownLabel {
                label: path.to_string(),
            }),
        }
    }

    /// Candidate tokens for a category with subgroups merged.
    ///
    /// A leaf category returns its own list; a branch concatenates its
    /// subcategory lists in declaration order, then token order.
    pub fn merged_tokens(&self, category: &str) -> GrammarResult<Vec<&str>> {
        match self.resolve(category)? {
            ComponentNode::Leaf(tokens) => Ok(tokens.iter().map(String::as_str).collect()),
            ComponentNode::Branch(children) => {
                let mut merged = Vec::new();
                for child in children.values() {
                    collect_tokens(child, &mut merged);
                }
                Ok(merged)
            }
        }
    }

    /// Which immediate subgroup of `category` contains `token`, if any.
    ///
    /// Declaration order breaks ties when a token appears in several
    /// subgroups (e.g. "near" in both object and area relations).
    pub fn subgroup_of(&self, category: &str, token: &str) -> Option<&str> {
        match self.resolve(category).ok()? {
            ComponentNode::Leaf(_) => None,
            ComponentNode::Branch(children) => children
                .iter()
                .find(|(_, child)| node_contains(child, token))
                .map(|(name, _)| name.as_str()),
        }
    }
}

fn validate_node(path: &str, node: &ComponentNode) -> GrammarResult<()> {
    match node {
        ComponentNode::Leaf(tokens) => {
            if tokens.is_empty() {
                return Err(GrammarError::EmptyCandidateSet {
                    label: path.to_string(),
                });
            }
            let mut seen = std::collections::HashSet::new();
            for token in tokens {
                if token.trim().is_empty() || !seen.insert(token.as_str()) {
                    return Err(GrammarError::InvalidToken {
                        label: path.to_string(),
                        token: token.clone(),
                    });
                }
            }
            Ok(())
        }
        ComponentNode::Branch(children) => {
            if children.is_empty() {
                return Err(GrammarError::EmptyCandidateSet {
                    label: path.to_string(),
                });
            }
            for (name, child) in children {
                validate_node(&format!("{path}:{name}"), child)?;
            }
            Ok(())
        }
    }
}

fn collect_tokens<'a>(node: &'a ComponentNode, out: &mut Vec<&'a str>) {
    match node {
        ComponentNode::Leaf(tokens) => out.extend(tokens.iter().map(String::as_str)),
        ComponentNode::Branch(children) => {
            for child in children.values() {
                collect_tokens(child, out);
            }
        }
    }
}

fn node_contains(node: &ComponentNode, token: &str) -> bool {
    match node {
        ComponentNode::Leaf(tokens) => tokens.iter().any(|t| t == token),
        ComponentNode::Branch(children) => children.values().any(|c| node_contains(c, token)),
    }
}
