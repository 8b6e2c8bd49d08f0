//! # parlance
//!
//! A probabilistic utterance-to-statement matcher: given a partially-labeled
//! natural-language fragment, find the formally-structured statement from a
//! combinatorially-generated grammar that most likely expresses it.
//!
//! ## Architecture
//!
//! ```text
//! Labeled Utterance ──→ Matcher ──→ ranked (probability, Statement) list
//!                         │ ▲
//!        ┌────────────────┤ └─ SimilarityOracle (external, cached)
//!        ▼                ▼
//!  StatementGrammar   SlotGraph
//!  (component tree,   (levels, parent map,
//!   enumeration)       eligibility)
//! ```
//!
//! - **Grammar** (`grammar`): component tree of candidate tokens and lazy
//!   enumeration of every statement the catalogue can express
//! - **Slot graph** (`slots`): ordered slot levels with a layered parent map
//! - **Matcher** (`matcher`): joint observation × transition scoring, global
//!   ranking and per-label direct lookup, disambiguation overrides
//! - **Oracle** (`oracle`): the external semantic-similarity seam, with a
//!   memoizing wrapper and an embedded deterministic fallback
//! - **Catalogue** (`catalog`): TOML-defined grammars, validated at load
//!
//! ## Library usage
//!
//! ```no_run
//! use parlance::{Catalogue, CharGramOracle, LabeledUtterance, Matcher};
//!
//! let catalogue = Catalogue::builtin().unwrap();
//! let matcher = Matcher::new(&catalogue, CharGramOracle::new()).unwrap();
//! let utterance = LabeledUtterance::from_pairs([
//!     ("certainty", "know"),
//!     ("target", "a robot"),
//!     ("positivity", "is"),
//!     ("spatial_relation:object", "right of"),
//!     ("grounding:object", "the bookcase"),
//! ]);
//! let top = matcher.rank_top(&utterance, 5).unwrap();
//! println!("{} ({:.4})", top[0].statement, top[0].probability);
//! ```

pub mod catalog;
pub mod error;
pub mod grammar;
pub mod matcher;
pub mod oracle;
pub mod slots;

pub use catalog::Catalogue;
pub use error::{GrammarError, MatchError, ParlanceError, ParlanceResult, SlotError};
pub use grammar::{Statement, StatementGrammar, StatementKind};
pub use matcher::{FilledTemplate, LabeledUtterance, Matcher, MatcherConfig, Ranked};
pub use oracle::{CachedOracle, CharGramOracle, SimilarityOracle};
pub use slots::{SlotGraph, SlotLabel};
