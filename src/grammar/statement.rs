//! Statement kinds: fully-typed interpretations of an utterance.
//!
//! Each kind declares, at construction, exactly which slot attributes it
//! carries; lookup is an explicit optional value per slot label, never
//! reflective probing. Statements are immutable once constructed — they are
//! produced by combinatorial enumeration (read-only thereafter) or built on
//! demand from a resolved template.

use serde::Serialize;

use crate::error::{GrammarError, GrammarResult};
use crate::slots::SlotLabel;

/// Which spatial subgroup a relation/grounding pair is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpatialAxis {
    Object,
    Area,
}

impl SpatialAxis {
    /// Subcategory name in the component tree.
    pub fn subcategory(self) -> &'static str {
        match self {
            SpatialAxis::Object => "object",
            SpatialAxis::Area => "area",
        }
    }

    pub fn from_subcategory(sub: &str) -> Option<Self> {
        match sub {
            "object" => Some(SpatialAxis::Object),
            "area" => Some(SpatialAxis::Area),
            _ => None,
        }
    }
}

/// The statement kinds the grammar can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementKind {
    SpatialRelation,
    Action,
}

impl StatementKind {
    /// All kinds, in enumeration order.
    pub fn all() -> [StatementKind; 2] {
        [StatementKind::SpatialRelation, StatementKind::Action]
    }

    /// Parse a kind identifier.
    ///
    /// Accepts underscore or space separators, and strips trailing digits
    /// from numbered template instances ("action2").
    pub fn parse(raw: &str) -> GrammarResult<Self> {
        let stripped = raw.trim().trim_end_matches(|c: char| c.is_ascii_digit());
        match stripped.replace(' ', "_").as_str() {
            "spatial_relation" => Ok(StatementKind::SpatialRelation),
            "action" => Ok(StatementKind::Action),
            _ => Err(GrammarError::UnknownStatementKind {
                kind: raw.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for StatementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatementKind::SpatialRelation => write!(f, "spatial_relation"),
            StatementKind::Action => write!(f, "action"),
        }
    }
}

/// "A robot is right of the bookcase": target located relative to a map
/// object or area.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpatialRelationStatement {
    pub certainty: String,
    pub target: String,
    pub positivity: String,
    pub relation: String,
    pub grounding: String,
    pub axis: SpatialAxis,
}

/// "A robot is moving quickly" / "Roy is moving toward the hallway": target
/// doing something, optionally qualified by a modifier or a movement
/// relation with a grounding.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionStatement {
    pub certainty: String,
    pub target: String,
    pub positivity: String,
    pub action: String,
    pub modifier: Option<String>,
    pub movement: Option<String>,
    pub grounding: Option<(SpatialAxis, String)>,
}

/// A grammar-conformant interpretation of an utterance.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Statement {
    SpatialRelation(SpatialRelationStatement),
    Action(ActionStatement),
}

impl Statement {
    pub fn kind(&self) -> StatementKind {
        match self {
            Statement::SpatialRelation(_) => StatementKind::SpatialRelation,
            Statement::Action(_) => StatementKind::Action,
        }
    }

    /// The token this statement carries for a slot label, if any.
    ///
    /// Lookup is subcategory-aware: an area statement answers for
    /// `spatial_relation:area` but not `spatial_relation:object`. A label
    /// without a subcategory matches whichever subgroup the statement
    /// carries.
    pub fn value_for(&self, label: &SlotLabel) -> Option<&str> {
        match self {
            Statement::SpatialRelation(s) => {
                match (label.category(), label.subcategory()) {
                    ("certainty", None) => Some(s.certainty.as_str()),
                    ("target", None) => Some(s.target.as_str()),
                    ("positivity", None) => Some(s.positivity.as_str()),
                    ("spatial_relation", None) => Some(s.relation.as_str()),
                    ("spatial_relation", Some(sub)) => {
                        (SpatialAxis::from_subcategory(sub) == Some(s.axis))
                            .then_some(s.relation.as_str())
                    }
                    ("grounding", None) => Some(s.grounding.as_str()),
                    ("grounding", Some(sub)) => {
                        (SpatialAxis::from_subcategory(sub) == Some(s.axis))
                            .then_some(s.grounding.as_str())
                    }
                    _ => None,
                }
            }
            Statement::Action(s) => match (label.category(), label.subcategory()) {
                ("certainty", None) => Some(s.certainty.as_str()),
                ("target", None) => Some(s.target.as_str()),
                ("positivity", None) => Some(s.positivity.as_str()),
                ("action", None) => Some(s.action.as_str()),
                ("modifier", None) => s.modifier.as_deref(),
                ("spatial_relation", None | Some("movement")) => s.movement.as_deref(),
                ("grounding", None) => s.grounding.as_ref().map(|(_, g)| g.as_str()),
                ("grounding", Some(sub)) => s.grounding.as_ref().and_then(|(axis, g)| {
                    (SpatialAxis::from_subcategory(sub) == Some(*axis)).then_some(g.as_str())
                }),
                _ => None,
            },
        }
    }

    /// Whether the statement carries an informative token for this label:
    /// present, and more than a single placeholder character.
    pub fn has_informative_value(&self, label: &SlotLabel) -> bool {
        self.value_for(label)
            .is_some_and(|token| token.chars().count() > 1)
    }
}

impl std::fmt::Display for Statement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Statement::SpatialRelation(s) => write!(
                f,
                "I {} {} {} {} {}.",
                s.certainty, s.target, s.positivity, s.relation, s.grounding
            ),
            Statement::Action(s) => {
                write!(
                    f,
                    "I {} {} {} {}",
                    s.certainty, s.target, s.positivity, s.action
                )?;
                if let Some(modifier) = &s.modifier {
                    write!(f, " {modifier}")?;
                }
                if let Some(movement) = &s.movement {
                    write!(f, " {movement}")?;
                }
                if let Some((_, grounding)) = &s.grounding {
                    write!(f, " {grounding}")?;
                }
                write!(f, ".")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spatial() -> Statement {
        Statement::SpatialRelation(SpatialRelationStatement {
            certainty: "know".into(),
            target: "a robot".into(),
            positivity: "is".into(),
            relation: "right of".into(),
            grounding: "the bookcase".into(),
            axis: SpatialAxis::Object,
        })
    }

    fn moving() -> Statement {
        Statement::Action(ActionStatement {
            certainty: "think".into(),
            target: "Roy".into(),
            positivity: "is".into(),
            action: "moving".into(),
            modifier: None,
            movement: Some("toward".into()),
            grounding: Some((SpatialAxis::Area, "the hallway".into())),
        })
    }

    #[test]
    fn kind_parsing() {
        assert_eq!(
            StatementKind::parse("spatial relation").unwrap(),
            StatementKind::SpatialRelation
        );
        assert_eq!(StatementKind::parse("action2").unwrap(), StatementKind::Action);
        assert!(StatementKind::parse("interrogative").is_err());
    }

    #[test]
    fn lookup_is_subcategory_aware() {
        let s = spatial();
        assert_eq!(
            s.value_for(&SlotLabel::parse("spatial_relation:object")),
            Some("right of")
        );
        assert_eq!(s.value_for(&SlotLabel::parse("spatial_relation:area")), None);
        assert_eq!(
            s.value_for(&SlotLabel::parse("grounding:object")),
            Some("the bookcase")
        );
        assert_eq!(s.value_for(&SlotLabel::parse("action")), None);
    }

    #[test]
    fn action_lookup_covers_optional_slots() {
        let s = moving();
        assert_eq!(
            s.value_for(&SlotLabel::parse("spatial_relation:movement")),
            Some("toward")
        );
        assert_eq!(
            s.value_for(&SlotLabel::parse("grounding:area")),
            Some("the hallway")
        );
        assert_eq!(s.value_for(&SlotLabel::parse("grounding:object")), None);
        assert_eq!(s.value_for(&SlotLabel::parse("modifier")), None);
    }

    #[test]
    fn informative_value_rejects_placeholders() {
        let mut bare = match moving() {
            Statement::Action(s) => s,
            _ => unreachable!(),
        };
        bare.modifier = Some("-".into());
        let s = Statement::Action(bare);
        assert!(!s.has_informative_value(&SlotLabel::parse("modifier")));
        assert!(s.has_informative_value(&SlotLabel::parse("action")));
    }

    #[test]
    fn display_reads_as_a_sentence() {
        assert_eq!(
            spatial().to_string(),
            "I know a robot is right of the bookcase."
        );
        assert_eq!(moving().to_string(), "I think Roy is moving toward the hallway.");
    }
}
