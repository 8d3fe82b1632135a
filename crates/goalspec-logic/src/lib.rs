//! # goalspec-logic
//!
//! Logic program types for declarative goal specifications.
//!
//! A specification is an ordered list of clauses whose head is `goal`. A
//! clause body mixes positive atoms, negated atoms, comparisons and the typed
//! atom-count literal used when sampling strictly larger models.
//!
//! ## Example
//!
//! ```rust
//! use goalspec_logic::*;
//!
//! let clause = parse_clause("goal :- at(X,Y), red(X,Y), not holding(key)").unwrap();
//! assert_eq!(clause.body.len(), 3);
//!
//! // Require models with more than two atoms without touching the text.
//! let stricter = ClauseBuilder::from_clause(&clause).with_atom_count_gt(2).build();
//! assert_eq!(stricter.body.len(), 4);
//! ```

pub mod builder;
pub mod clause;
pub mod model;
pub mod parser;
pub mod term;

pub use builder::*;
pub use clause::*;
pub use model::*;
pub use parser::{parse_atom, parse_clause, parse_clauses, parse_fact};
pub use term::*;

use sha2::{Digest, Sha256};
use thiserror::Error;

/// Name of the head predicate every specification clause must carry.
pub const GOAL_PREDICATE: &str = "goal";

/// Errors raised while reading or validating logic programs
#[derive(Debug, Error)]
pub enum LogicError {
    #[error("Parse error in '{input}': {message}")]
    Parse { input: String, message: String },

    #[error("Expected a ground atom, found '{0}'")]
    NotGround(String),

    #[error("Clause head must be 'goal', found '{0}'")]
    InvalidHead(String),

    #[error("Empty specification")]
    EmptySpecification,
}

pub type Result<T> = std::result::Result<T, LogicError>;

/// Compute a deterministic fingerprint for a specification.
///
/// Two clause lists that render identically share a fingerprint.
pub fn spec_fingerprint(clauses: &[Clause]) -> String {
    let mut hasher = Sha256::new();
    for clause in clauses {
        hasher.update(clause.to_string().as_bytes());
        hasher.update(b";");
    }
    hex::encode(hasher.finalize())
}

/// Check that every clause is headed by `goal` and the list is non-empty.
pub fn validate_spec(clauses: &[Clause]) -> Result<()> {
    if clauses.is_empty() {
        return Err(LogicError::EmptySpecification);
    }
    for clause in clauses {
        if !clause.is_goal_clause() {
            return Err(LogicError::InvalidHead(clause.head.to_string()));
        }
    }
    Ok(())
}
