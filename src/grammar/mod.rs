//! Statement grammar: component catalogue plus combinatorial enumeration.
//!
//! The grammar owns the [`ComponentTree`] (slot categories and their
//! candidate tokens) and knows how to enumerate every fully-formed
//! [`Statement`] the catalogue can express. It is built once from a
//! catalogue definition and never mutated; the matcher only reads it.

pub mod components;
pub mod enumerate;
pub mod statement;

use std::sync::Arc;

use crate::error::GrammarResult;

pub use components::{ComponentNode, ComponentTree};
pub use enumerate::Statements;
pub use statement::{
    ActionStatement, SpatialAxis, SpatialRelationStatement, Statement, StatementKind,
};

/// Leaf paths the statement kinds draw their attributes from. Checked once
/// at construction so enumeration and scoring never hit a missing list.
const REQUIRED_PATHS: [&str; 10] = [
    "certainty",
    "target",
    "positivity",
    "action",
    "modifier",
    "spatial_relation:object",
    "spatial_relation:area",
    "spatial_relation:movement",
    "grounding:object",
    "grounding:area",
];

/// Static catalogue of slot categories and the statement space over them.
#[derive(Debug, Clone)]
pub struct StatementGrammar {
    components: Arc<ComponentTree>,
}

impl StatementGrammar {
    /// Wrap a validated component tree, verifying that every attribute list
    /// the statement kinds need is present.
    pub fn new(components: Arc<ComponentTree>) -> GrammarResult<Self> {
        for path in REQUIRED_PATHS {
            components.leaf_tokens(path)?;
        }
        Ok(Self { components })
    }

    /// The component tree root. Read-only after construction.
    pub fn components(&self) -> &ComponentTree {
        &self.components
    }

    /// Shared handle to the component tree, for structures that index it.
    pub fn shared_components(&self) -> Arc<ComponentTree> {
        Arc::clone(&self.components)
    }

    /// Lazily enumerate every statement the requested kinds can produce,
    /// in deterministic declaration order.
    pub fn enumerate_all(&self, kinds: &[StatementKind]) -> GrammarResult<Statements> {
        Statements::new(&self.components, kinds)
    }

    /// The full pooled candidate set: all kinds, materialized.
    pub fn pool(&self) -> GrammarResult<Vec<Statement>> {
        Ok(self.enumerate_all(&StatementKind::all())?.collect())
    }
}
