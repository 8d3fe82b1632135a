//! # goalspec-grid
//!
//! A small grid world for specification goal search: walls, coloured cells
//! and an optional key that is picked up on contact.
//!
//! States are described by the atoms `at(X,Y)` plus `holding(key)` or
//! `free(key)`; the layout contributes background facts `cell(X,Y)`,
//! `wall(X,Y)`, `key(X,Y)` and one `<colour>(X,Y)` per coloured cell.
//!
//! ## Example
//!
//! ```rust
//! use goalspec::{find_spec_goal, SpecGoalConfig};
//! use goalspec_grid::{GridLayout, GridState, GridWorld, ManhattanHeuristic};
//! use goalspec_logic::parse_clauses;
//!
//! let world = GridWorld::from_layout(GridLayout {
//!     width: 3,
//!     height: 3,
//!     colors: [("red".to_string(), vec![[2, 2]])].into(),
//!     ..GridLayout::default()
//! })
//! .unwrap();
//!
//! let spec = parse_clauses("goal :- at(X,Y), red(X,Y)").unwrap();
//! let outcome = find_spec_goal(
//!     &world,
//!     &GridState::new(0, 0),
//!     &spec,
//!     &ManhattanHeuristic,
//!     &SpecGoalConfig::default(),
//!     None,
//! )
//! .unwrap();
//!
//! assert!(outcome.solved);
//! assert_eq!(outcome.path_cost, Some(4.0));
//! ```

pub mod heuristic;
pub mod world;

pub use heuristic::ManhattanHeuristic;
pub use world::{GridAction, GridLayout, GridState, GridWorld};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GridError {
    #[error("Grid must be non-empty, got {width}x{height}")]
    EmptyGrid { width: i64, height: i64 },

    #[error("Cell ({x}, {y}) is outside the grid")]
    OutOfBounds { x: i64, y: i64 },

    #[error("Key cannot be placed on wall ({x}, {y})")]
    KeyOnWall { x: i64, y: i64 },

    #[error("Invalid colour name '{0}'")]
    InvalidColor(String),

    #[error("Start ({x}, {y}) is not an open cell")]
    BlockedStart { x: i64, y: i64 },

    #[error("Start holds a key but the grid has none")]
    NoKey,
}

pub type Result<T> = std::result::Result<T, GridError>;
