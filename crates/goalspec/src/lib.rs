//! # goalspec
//!
//! Specification-guided goal search. Instead of one concrete goal state, the
//! caller gives a list of `goal :- ...` clauses; any state whose logical model
//! satisfies them is acceptable.
//!
//! ## Architecture
//!
//! ```text
//!            ┌──────────── resample (all candidates banned) ────────────┐
//!            ▼                                                          │
//! Sampling ──► Searching ──► Verifying ──► Done (solved)                │
//!    │            ▲   │           │                                     │
//!    │            │   └───────────┼─────────────────────────────────────┘
//!    │            │               ▼
//!    │            └────────── Expanding (supersets of unverified candidates)
//!    ▼
//! Done (exhausted)
//! ```
//!
//! - **Sampling** draws minimal models of the clauses, excluding banned ones.
//! - **Searching** runs one weighted A* instance per candidate from the start.
//! - **Verifying** checks each reached state's model against the full clauses.
//! - **Expanding** samples strictly larger models that extend each reached
//!   but unverified candidate.
//!
//! Candidates that cannot be reached, or are reached but fail verification,
//! are banned for the rest of the invocation.
//!
//! See `goalspec-grid` for a complete domain.

pub mod background;
pub mod config;
pub mod domain;
pub mod search;
pub mod timing;
pub mod trace;

pub use background::load_background;
pub use config::SpecGoalConfig;
pub use domain::GroundedDomain;
pub use search::{find_spec_goal, split_evenly, SpecGoalOutcome, SpecGoalSearch};
pub use timing::{Phase, Times};
pub use trace::{NullTraceSink, TraceEvent, TraceSink, VecTraceSink};

use std::path::PathBuf;

use goalspec_asp::AspError;
use goalspec_logic::LogicError;
use goalspec_search::SearchError;
use thiserror::Error;

/// Errors raised by the orchestrator.
///
/// Unreachable or unsatisfiable goals are not errors; they end in an outcome
/// with `solved == false`.
#[derive(Debug, Error)]
pub enum SpecGoalError {
    #[error("Specification error: {0}")]
    Logic(#[from] LogicError),

    #[error("Specification engine error: {0}")]
    Asp(#[from] AspError),

    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Sampler returned banned model {0}")]
    BannedModelResampled(String),

    #[error("Superset {child} does not strictly extend {parent}")]
    SupersetNotLarger { parent: String, child: String },

    #[error("{what}: expected {expected} entries, got {actual}")]
    Misaligned {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, SpecGoalError>;

pub(crate) fn check_aligned(what: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(SpecGoalError::Misaligned {
            what,
            expected,
            actual,
        });
    }
    Ok(())
}
