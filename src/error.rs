//! Diagnostic error types for the parlance matcher.
//!
//! Each subsystem defines its own error enum with miette `#[diagnostic]`
//! derives, providing error codes and help text so callers know exactly what
//! went wrong and where to fix it. All failures here are structural — a bad
//! catalogue, a bad label — and are never retried.

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for the parlance crate.
///
/// Each variant wraps a subsystem-specific error, preserving the full
/// diagnostic chain (error codes, help text) through to the caller.
#[derive(Debug, Error, Diagnostic)]
pub enum ParlanceError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Grammar(#[from] GrammarError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Slot(#[from] SlotError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Match(#[from] MatchError),
}

// ---------------------------------------------------------------------------
// Grammar errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum GrammarError {
    #[error("unknown label: \"{label}\"")]
    #[diagnostic(
        code(parlance::grammar::unknown_label),
        help(
            "The label (or a prefix of its `category:subcategory` chain) has no \
             entry in the component tree. Check the spelling against the \
             [components] section of the grammar catalogue."
        )
    )]
    UnknownLabel { label: String },

    #[error("empty candidate set for \"{label}\"")]
    #[diagnostic(
        code(parlance::grammar::empty_candidates),
        help(
            "A slot label resolved to zero comparable tokens, which would make \
             the uniform transition probability undefined. Add at least one \
             token to this component list in the catalogue."
        )
    )]
    EmptyCandidateSet { label: String },

    #[error("invalid token {token:?} in component \"{label}\"")]
    #[diagnostic(
        code(parlance::grammar::invalid_token),
        help(
            "Component leaves must be unique, non-empty strings. Remove the \
             duplicate or empty entry from the catalogue."
        )
    )]
    InvalidToken { label: String, token: String },

    #[error("unknown statement kind: \"{kind}\"")]
    #[diagnostic(
        code(parlance::grammar::unknown_kind),
        help("Known statement kinds: \"spatial_relation\", \"action\".")
    )]
    UnknownStatementKind { kind: String },

    #[error("failed to parse grammar catalogue: {message}")]
    #[diagnostic(
        code(parlance::grammar::parse),
        help(
            "Check the TOML syntax. A catalogue needs [grammar], [components], \
             [levels], and [parents] sections; see data/grammar/default.toml \
             for the format reference."
        )
    )]
    Parse { message: String },

    #[error("failed to read grammar catalogue: {path}")]
    #[diagnostic(
        code(parlance::grammar::io),
        help("Ensure the file exists and is readable.")
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// Slot graph errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum SlotError {
    #[error("label \"{label}\" declares parent \"{parent}\" outside the preceding level")]
    #[diagnostic(
        code(parlance::slots::invalid_parent),
        help(
            "Every non-root label's parents must be offered by the level \
             immediately before it — the dependency structure is a layered \
             DAG. Move the label to a later level or fix the parent entry."
        )
    )]
    InvalidParent { label: String, parent: String },

    #[error("label \"{label}\" appears in the levels but has no parent entry")]
    #[diagnostic(
        code(parlance::slots::missing_parents),
        help(
            "Add a [parents] entry for this label. Use an empty list to mark \
             it as a root label."
        )
    )]
    MissingParents { label: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Grammar(#[from] GrammarError),
}

// ---------------------------------------------------------------------------
// Matcher errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum MatchError {
    #[error("degenerate distribution: all {candidate_count} candidate scores are zero")]
    #[diagnostic(
        code(parlance::matcher::degenerate),
        help(
            "Every candidate scored zero, so the distribution cannot be \
             normalized. This usually means the similarity oracle returned \
             all-zero similarities, or the utterance contradicts every \
             candidate (e.g. a negation that rules out the whole pool)."
        )
    )]
    DegenerateDistribution { candidate_count: usize },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Grammar(#[from] GrammarError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Slot(#[from] SlotError),
}

/// Convenience alias for functions returning parlance results.
pub type ParlanceResult<T> = std::result::Result<T, ParlanceError>;

/// Result type for grammar operations.
pub type GrammarResult<T> = std::result::Result<T, GrammarError>;

/// Result type for slot graph operations.
pub type SlotResult<T> = std::result::Result<T, SlotError>;

/// Result type for matcher operations.
pub type MatchResult<T> = std::result::Result<T, MatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grammar_error_converts_to_parlance_error() {
        let err = GrammarError::UnknownLabel {
            label: "groundling".into(),
        };
        let top: ParlanceError = err.into();
        assert!(matches!(
            top,
            ParlanceError::Grammar(GrammarError::UnknownLabel { .. })
        ));
    }

    #[test]
    fn slot_error_wraps_grammar_error() {
        let err = GrammarError::EmptyCandidateSet {
            label: "modifier".into(),
        };
        let slot: SlotError = err.into();
        assert!(matches!(
            slot,
            SlotError::Grammar(GrammarError::EmptyCandidateSet { .. })
        ));
    }

    #[test]
    fn error_display_names_the_offender() {
        let err = MatchError::DegenerateDistribution {
            candidate_count: 3072,
        };
        let msg = format!("{err}");
        assert!(msg.contains("3072"));
    }
}
