//! # goalspec-search
//!
//! Weighted best-first search over batched domains. Many search instances
//! share one start state and advance together in rounds, so that domain
//! expansion, goal checks and heuristic evaluation are each issued once per
//! round for every active instance.
//!
//! ## Example
//!
//! ```rust
//! use goalspec_search::{
//!     search_for_goals, get_path, Result, SearchDomain, SearchParams, Transition, ZeroHeuristic,
//! };
//!
//! /// Walk along the integers, one step at a time.
//! struct Line;
//!
//! impl SearchDomain for Line {
//!     type State = i32;
//!     type Action = i32;
//!     type Goal = i32;
//!
//!     fn expand(&self, states: &[i32]) -> Vec<Vec<Transition<i32, i32>>> {
//!         states
//!             .iter()
//!             .map(|s| vec![Transition::new(s - 1, -1, 1.0), Transition::new(s + 1, 1, 1.0)])
//!             .collect()
//!     }
//!
//!     fn is_solved(&self, states: &[i32], goals: &[i32]) -> Vec<bool> {
//!         states.iter().zip(goals).map(|(s, g)| s == g).collect()
//!     }
//! }
//!
//! # fn main() -> Result<()> {
//! let params = SearchParams { batch_size: 4, weight: 1.0, max_iters: 100 };
//! let outcome = search_for_goals(&Line, &0, &[3, -2], &params, &ZeroHeuristic)?;
//!
//! let path = get_path(outcome.goal_nodes[0].as_ref().unwrap());
//! assert_eq!(path.actions, vec![1, 1, 1]);
//! assert_eq!(path.cost, 3.0);
//! # Ok(())
//! # }
//! ```

pub mod astar;
pub mod domain;
pub mod driver;
pub mod heuristic;
pub mod node;

pub use astar::{Instance, WeightedAStar};
pub use domain::{SearchDomain, Transition};
pub use driver::{search_for_goals, SearchOutcome, SearchParams};
pub use heuristic::{BatchedHeuristic, Heuristic, ZeroHeuristic};
pub use node::{get_path, Node, NodeRef, Path};

use thiserror::Error;

/// Errors raised by the search engine and driver
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Search weight must be within [0, 1], got {0}")]
    InvalidWeight(f64),

    #[error("Batch size must be at least 1")]
    InvalidBatchSize,

    #[error("Heuristic evaluation failed: {0}")]
    Heuristic(String),

    #[error("{what}: expected {expected} entries, got {actual}")]
    Misaligned {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
}

pub type Result<T> = std::result::Result<T, SearchError>;

pub(crate) fn check_aligned(what: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(SearchError::Misaligned {
            what,
            expected,
            actual,
        });
    }
    Ok(())
}
