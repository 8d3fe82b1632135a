use tracing::debug;

use crate::{check_aligned, Heuristic, NodeRef, Result, SearchDomain, SearchError, WeightedAStar};

/// Parameters shared by every instance of one driver call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchParams {
    /// Nodes popped per instance per round
    pub batch_size: usize,
    /// Path-cost weight in `weight * g + h`
    pub weight: f64,
    /// Maximum number of rounds
    pub max_iters: usize,
}

impl SearchParams {
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(SearchError::InvalidBatchSize);
        }
        if !(0.0..=1.0).contains(&self.weight) {
            return Err(SearchError::InvalidWeight(self.weight));
        }
        Ok(())
    }
}

/// Result of [`search_for_goals`]
#[derive(Debug)]
pub struct SearchOutcome<S, A> {
    /// Index-aligned with the input goals; `None` when the goal was not
    /// reached within the round cap or is unreachable
    pub goal_nodes: Vec<Option<NodeRef<S, A>>>,
    pub iterations: usize,
    pub nodes_generated: usize,
}

impl<S, A> SearchOutcome<S, A> {
    pub fn num_reached(&self) -> usize {
        self.goal_nodes.iter().filter(|n| n.is_some()).count()
    }
}

/// Search from `start` toward every goal at once.
///
/// Runs rounds until all instances finish or `params.max_iters` rounds have
/// been run. Results are the same as searching each goal on its own.
pub fn search_for_goals<D, H>(
    domain: &D,
    start: &D::State,
    goals: &[D::Goal],
    params: &SearchParams,
    heuristic: &H,
) -> Result<SearchOutcome<D::State, D::Action>>
where
    D: SearchDomain,
    H: Heuristic<D> + ?Sized,
{
    params.validate()?;

    let mut astar = WeightedAStar::new(domain);
    astar.add_instances(
        vec![start.clone(); goals.len()],
        goals.to_vec(),
        vec![params.weight; goals.len()],
        heuristic,
    )?;

    let mut iterations = 0;
    while !astar.all_finished() && iterations < params.max_iters {
        astar.step(heuristic, params.batch_size)?;
        iterations += 1;
    }

    let nodes_generated = astar.nodes_generated();
    let goal_nodes = astar.into_goal_nodes();
    check_aligned("goal nodes", goals.len(), goal_nodes.len())?;

    let outcome = SearchOutcome {
        goal_nodes,
        iterations,
        nodes_generated,
    };
    debug!(
        goals = goals.len(),
        reached = outcome.num_reached(),
        iterations,
        nodes_generated,
        "Search finished"
    );
    Ok(outcome)
}
