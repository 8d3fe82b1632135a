use std::cell::Cell;
use std::collections::HashSet;

use goalspec_search::{
    get_path, search_for_goals, BatchedHeuristic, Heuristic, Path, Result, SearchDomain,
    SearchError, SearchParams, Transition, ZeroHeuristic,
};
use proptest::prelude::*;

type Pos = (i32, i32);

/// Four-connected grid with blocked cells
#[derive(Debug)]
struct Maze {
    width: i32,
    height: i32,
    walls: HashSet<Pos>,
}

impl Maze {
    fn open(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            walls: HashSet::new(),
        }
    }

    fn is_open(&self, (x, y): Pos) -> bool {
        x >= 0 && y >= 0 && x < self.width && y < self.height && !self.walls.contains(&(x, y))
    }
}

impl SearchDomain for Maze {
    type State = Pos;
    type Action = char;
    type Goal = Pos;

    fn expand(&self, states: &[Pos]) -> Vec<Vec<Transition<Pos, char>>> {
        states
            .iter()
            .map(|&(x, y)| {
                [('U', (x, y - 1)), ('R', (x + 1, y)), ('D', (x, y + 1)), ('L', (x - 1, y))]
                    .into_iter()
                    .filter(|(_, p)| self.is_open(*p))
                    .map(|(a, p)| Transition::new(p, a, 1.0))
                    .collect()
            })
            .collect()
    }

    fn is_solved(&self, states: &[Pos], goals: &[Pos]) -> Vec<bool> {
        states.iter().zip(goals).map(|(s, g)| s == g).collect()
    }
}

struct Manhattan;

impl Heuristic<Maze> for Manhattan {
    fn evaluate(&self, states: &[Pos], goals: &[Pos]) -> Result<Vec<f64>> {
        Ok(states
            .iter()
            .zip(goals)
            .map(|(s, g)| ((s.0 - g.0).abs() + (s.1 - g.1).abs()) as f64)
            .collect())
    }
}

/// Records the largest batch it was asked to evaluate
#[derive(Default)]
struct Counting {
    largest: Cell<usize>,
    calls: Cell<usize>,
}

impl Heuristic<Maze> for Counting {
    fn evaluate(&self, states: &[Pos], goals: &[Pos]) -> Result<Vec<f64>> {
        self.largest.set(self.largest.get().max(states.len()));
        self.calls.set(self.calls.get() + 1);
        Manhattan.evaluate(states, goals)
    }
}

struct Truncating;

impl Heuristic<Maze> for Truncating {
    fn evaluate(&self, states: &[Pos], _goals: &[Pos]) -> Result<Vec<f64>> {
        Ok(vec![0.0; states.len().saturating_sub(1)])
    }
}

struct Failing;

impl Heuristic<Maze> for Failing {
    fn evaluate(&self, _states: &[Pos], _goals: &[Pos]) -> Result<Vec<f64>> {
        Err(SearchError::Heuristic("device lost".to_string()))
    }
}

fn params(batch_size: usize, weight: f64, max_iters: usize) -> SearchParams {
    SearchParams {
        batch_size,
        weight,
        max_iters,
    }
}

fn paths<H: Heuristic<Maze> + ?Sized>(
    maze: &Maze,
    start: Pos,
    goals: &[Pos],
    p: &SearchParams,
    heuristic: &H,
) -> Vec<Option<Path<Pos, char>>> {
    search_for_goals(maze, &start, goals, p, heuristic)
        .unwrap()
        .goal_nodes
        .iter()
        .map(|n| n.as_ref().map(get_path))
        .collect()
}

#[test]
fn weight_one_finds_shortest_paths_to_every_goal() {
    let maze = Maze::open(5, 5);
    let goals = [(4, 4), (0, 3), (2, 0), (0, 0)];
    let outcome = search_for_goals(&maze, &(0, 0), &goals, &params(1, 1.0, 1000), &Manhattan)
        .unwrap();

    assert_eq!(outcome.goal_nodes.len(), goals.len());
    for (node, goal) in outcome.goal_nodes.iter().zip(goals) {
        let path = get_path(node.as_ref().unwrap());
        assert_eq!(path.cost, (goal.0 + goal.1) as f64);
        assert_eq!(path.states.first(), Some(&(0, 0)));
        assert_eq!(path.states.last(), Some(&goal));
        assert_eq!(path.actions.len(), path.states.len() - 1);
    }
}

#[test]
fn walls_force_a_detour() {
    let mut maze = Maze::open(3, 3);
    maze.walls.extend([(1, 0), (1, 1)]);
    let found = paths(&maze, (0, 0), &[(2, 0)], &params(2, 1.0, 1000), &Manhattan);

    let path = found[0].as_ref().unwrap();
    assert_eq!(path.cost, 6.0);
    assert_eq!(path.actions, vec!['D', 'D', 'R', 'R', 'U', 'U']);
}

#[test]
fn round_cap_leaves_distant_goals_unreached() {
    let maze = Maze::open(6, 1);
    let outcome =
        search_for_goals(&maze, &(0, 0), &[(5, 0), (0, 0)], &params(1, 1.0, 1), &Manhattan)
            .unwrap();

    assert_eq!(outcome.iterations, 1);
    assert!(outcome.goal_nodes[0].is_none());
    assert!(outcome.goal_nodes[1].is_some());
    assert_eq!(outcome.num_reached(), 1);
}

#[test]
fn walled_off_goal_finishes_before_the_cap() {
    let mut maze = Maze::open(3, 1);
    maze.walls.insert((1, 0));
    let outcome =
        search_for_goals(&maze, &(0, 0), &[(2, 0)], &params(1, 1.0, 100), &ZeroHeuristic)
            .unwrap();

    assert!(outcome.goal_nodes[0].is_none());
    assert!(outcome.iterations < 100);
}

#[test]
fn no_goals_runs_no_rounds() {
    let maze = Maze::open(2, 2);
    let outcome = search_for_goals(&maze, &(0, 0), &[], &params(1, 1.0, 10), &Manhattan).unwrap();
    assert!(outcome.goal_nodes.is_empty());
    assert_eq!(outcome.iterations, 0);
}

#[test]
fn heuristic_runs_once_per_round() {
    let maze = Maze::open(4, 4);
    let counting = Counting::default();
    let outcome = search_for_goals(
        &maze,
        &(0, 0),
        &[(3, 3), (3, 0), (0, 3)],
        &params(2, 1.0, 1000),
        &counting,
    )
    .unwrap();

    // One call for the roots, at most one per round after that.
    assert!(counting.calls.get() <= outcome.iterations + 1);
}

#[test]
fn batched_heuristic_bounds_chunk_size_without_changing_results() {
    let maze = Maze::open(6, 6);
    let goals = [(5, 5), (5, 0), (0, 5), (3, 2)];
    let p = params(8, 0.5, 1000);

    let counting = Counting::default();
    let batched = BatchedHeuristic::new(&counting, 3).unwrap();
    let chunked = paths(&maze, (0, 0), &goals, &p, &batched);
    let direct = paths(&maze, (0, 0), &goals, &p, &Manhattan);

    assert_eq!(chunked, direct);
    assert!(counting.largest.get() <= 3);
    assert!(BatchedHeuristic::new(Manhattan, 0).is_err());
}

#[test]
fn misaligned_heuristic_output_is_fatal() {
    let maze = Maze::open(3, 3);
    let err = search_for_goals(&maze, &(0, 0), &[(2, 2)], &params(1, 1.0, 10), &Truncating)
        .unwrap_err();
    assert!(matches!(err, SearchError::Misaligned { .. }));
}

#[test]
fn heuristic_failure_is_fatal() {
    let maze = Maze::open(3, 3);
    let err = search_for_goals(&maze, &(0, 0), &[(2, 2)], &params(1, 1.0, 10), &Failing)
        .unwrap_err();
    assert!(matches!(err, SearchError::Heuristic(_)));
}

#[test]
fn invalid_parameters_are_rejected() {
    let maze = Maze::open(3, 3);
    for p in [params(0, 1.0, 10), params(1, -0.1, 10), params(1, 1.01, 10), params(1, f64::NAN, 10)] {
        assert!(search_for_goals(&maze, &(0, 0), &[(1, 1)], &p, &Manhattan).is_err());
    }
}

fn maze_strategy() -> impl Strategy<Value = Maze> {
    prop::collection::hash_set((0..5i32, 0..5i32), 0..8).prop_map(|mut walls| {
        walls.remove(&(0, 0));
        Maze {
            width: 5,
            height: 5,
            walls,
        }
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn batching_goals_matches_independent_searches(
        maze in maze_strategy(),
        goals in prop::collection::vec((0..5i32, 0..5i32), 1..5),
        batch_size in 1usize..4,
        weight in prop::sample::select(vec![0.0, 0.5, 1.0]),
        max_iters in 1usize..30,
    ) {
        let p = params(batch_size, weight, max_iters);
        let together = paths(&maze, (0, 0), &goals, &p, &Manhattan);
        for (goal, path) in goals.iter().zip(&together) {
            let alone = paths(&maze, (0, 0), std::slice::from_ref(goal), &p, &Manhattan);
            prop_assert_eq!(&alone[0], path);
        }
    }

    #[test]
    fn weight_one_paths_are_never_longer_than_greedy(
        maze in maze_strategy(),
        goal in (0..5i32, 0..5i32),
    ) {
        let optimal = paths(&maze, (0, 0), &[goal], &params(1, 1.0, 1000), &Manhattan);
        let greedy = paths(&maze, (0, 0), &[goal], &params(1, 0.0, 1000), &Manhattan);
        match (&optimal[0], &greedy[0]) {
            (Some(a), Some(b)) => prop_assert!(a.cost <= b.cost),
            (None, None) => {}
            _ => prop_assert!(false, "reachability must not depend on weight"),
        }
    }
}
