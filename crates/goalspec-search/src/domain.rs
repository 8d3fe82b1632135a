use std::fmt::Debug;
use std::hash::Hash;

/// One outgoing edge of a state
#[derive(Debug, Clone, PartialEq)]
pub struct Transition<S, A> {
    pub state: S,
    pub action: A,
    pub cost: f64,
}

impl<S, A> Transition<S, A> {
    pub fn new(state: S, action: A, cost: f64) -> Self {
        Self {
            state,
            action,
            cost,
        }
    }
}

/// A combinatorial domain searched in batches.
///
/// Both operations take slices so that implementations can vectorize; the
/// results must be index-aligned with the inputs.
pub trait SearchDomain {
    type State: Clone + Eq + Hash + Debug;
    type Action: Clone + Debug;
    type Goal: Clone + Debug;

    /// Successors of every state, in a fixed order
    fn expand(&self, states: &[Self::State]) -> Vec<Vec<Transition<Self::State, Self::Action>>>;

    /// Whether `states[i]` satisfies `goals[i]`
    fn is_solved(&self, states: &[Self::State], goals: &[Self::Goal]) -> Vec<bool>;
}
