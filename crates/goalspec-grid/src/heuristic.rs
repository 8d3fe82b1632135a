use goalspec_logic::Model;
use goalspec_search::Heuristic;

use crate::{GridState, GridWorld};

/// Manhattan distance to the goal cell; zero when the goal names no cell.
///
/// Admissible for unit-cost moves, so weight 1 search returns shortest paths.
#[derive(Debug, Default, Clone, Copy)]
pub struct ManhattanHeuristic;

impl Heuristic<GridWorld> for ManhattanHeuristic {
    fn evaluate(&self, states: &[GridState], goals: &[Model]) -> goalspec_search::Result<Vec<f64>> {
        Ok(states
            .iter()
            .zip(goals)
            .map(|(state, goal)| match GridWorld::goal_cell(goal) {
                Some((x, y)) => ((state.x - x).abs() + (state.y - y).abs()) as f64,
                None => 0.0,
            })
            .collect())
    }
}
