use core::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::rc::Rc;

use tracing::trace;

use crate::{check_aligned, Heuristic, Node, NodeRef, Result, SearchDomain, SearchError};

struct OpenNode<S, A> {
    f: f64,
    g: f64,
    tie: u64,
    node: NodeRef<S, A>,
}

impl<S, A> OpenNode<S, A> {
    fn key_cmp(&self, other: &Self) -> Ordering {
        self.f
            .total_cmp(&other.f)
            .then_with(|| self.g.total_cmp(&other.g))
            .then_with(|| self.tie.cmp(&other.tie))
    }
}

impl<S, A> PartialEq for OpenNode<S, A> {
    fn eq(&self, other: &Self) -> bool {
        self.key_cmp(other) == Ordering::Equal
    }
}

impl<S, A> Eq for OpenNode<S, A> {}

impl<S, A> PartialOrd for OpenNode<S, A> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<S, A> Ord for OpenNode<S, A> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering to make BinaryHeap behave like a min-heap.
        other.key_cmp(self)
    }
}

/// One weighted best-first search from a start state toward one goal.
pub struct Instance<D: SearchDomain> {
    goal: D::Goal,
    weight: f64,
    open: BinaryHeap<OpenNode<D::State, D::Action>>,
    best_g: HashMap<D::State, f64>,
    tie: u64,
    finished: bool,
    goal_node: Option<NodeRef<D::State, D::Action>>,
    nodes_generated: usize,
}

impl<D: SearchDomain> Instance<D> {
    fn new(root: Node<D::State, D::Action>, goal: D::Goal, weight: f64) -> Self {
        let mut instance = Self {
            goal,
            weight,
            open: BinaryHeap::new(),
            best_g: HashMap::new(),
            tie: 0,
            finished: false,
            goal_node: None,
            nodes_generated: 0,
        };
        instance.push(Rc::new(root));
        instance
    }

    fn push(&mut self, node: NodeRef<D::State, D::Action>) {
        self.best_g.insert(node.state.clone(), node.path_cost);
        self.open.push(OpenNode {
            f: self.weight * node.path_cost + node.heuristic,
            g: node.path_cost,
            tie: self.tie,
            node,
        });
        self.tie += 1;
        self.nodes_generated += 1;
    }

    /// Pop up to `count` live nodes in priority order.
    fn pop_batch(&mut self, count: usize) -> Vec<NodeRef<D::State, D::Action>> {
        let mut out = Vec::with_capacity(count);
        while out.len() < count {
            let Some(entry) = self.open.pop() else { break };
            let best = self
                .best_g
                .get(&entry.node.state)
                .copied()
                .unwrap_or(f64::INFINITY);
            if entry.g > best {
                continue; // stale heap entry
            }
            out.push(entry.node);
        }
        out
    }

    fn improves(&self, state: &D::State, g: f64) -> bool {
        self.best_g.get(state).is_none_or(|best| g < *best)
    }

    pub fn goal(&self) -> &D::Goal {
        &self.goal
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// The node that reached the goal, once finished successfully
    pub fn goal_node(&self) -> Option<&NodeRef<D::State, D::Action>> {
        self.goal_node.as_ref()
    }

    pub fn nodes_generated(&self) -> usize {
        self.nodes_generated
    }

    pub fn open_len(&self) -> usize {
        self.open.len()
    }
}

/// Batched weighted A* over many independent instances.
///
/// Priority is `weight * g + h`, ties broken by lower `g` and then by
/// insertion order. Goal checks happen when a node is popped. Each call to
/// [`WeightedAStar::step`] pops up to `batch_size` nodes per unfinished
/// instance and issues one `is_solved`, one `expand` and one heuristic call
/// for all of them together.
pub struct WeightedAStar<'d, D: SearchDomain> {
    domain: &'d D,
    instances: Vec<Instance<D>>,
}

impl<'d, D: SearchDomain> WeightedAStar<'d, D> {
    pub fn new(domain: &'d D) -> Self {
        Self {
            domain,
            instances: Vec::new(),
        }
    }

    /// Register one instance per `(start, goal, weight)` triple.
    pub fn add_instances<H>(
        &mut self,
        starts: Vec<D::State>,
        goals: Vec<D::Goal>,
        weights: Vec<f64>,
        heuristic: &H,
    ) -> Result<()>
    where
        H: Heuristic<D> + ?Sized,
    {
        check_aligned("instance goals", starts.len(), goals.len())?;
        check_aligned("instance weights", starts.len(), weights.len())?;
        if let Some(w) = weights.iter().find(|w| !(0.0..=1.0).contains(*w)) {
            return Err(SearchError::InvalidWeight(*w));
        }

        let estimates = heuristic.evaluate(&starts, &goals)?;
        check_aligned("heuristic output", starts.len(), estimates.len())?;

        for (((start, goal), weight), h) in starts.into_iter().zip(goals).zip(weights).zip(estimates)
        {
            self.instances
                .push(Instance::new(Node::root(start, h), goal, weight));
        }
        Ok(())
    }

    /// Advance every unfinished instance by one round.
    pub fn step<H>(&mut self, heuristic: &H, batch_size: usize) -> Result<()>
    where
        H: Heuristic<D> + ?Sized,
    {
        if batch_size == 0 {
            return Err(SearchError::InvalidBatchSize);
        }

        // (instance, node) pairs in instance order, then pop order.
        let mut popped: Vec<(usize, NodeRef<D::State, D::Action>)> = Vec::new();
        for (idx, instance) in self.instances.iter_mut().enumerate() {
            if instance.finished {
                continue;
            }
            popped.extend(instance.pop_batch(batch_size).into_iter().map(|n| (idx, n)));
        }

        let states: Vec<D::State> = popped.iter().map(|(_, n)| n.state.clone()).collect();
        let goals: Vec<D::Goal> = popped
            .iter()
            .map(|(idx, _)| self.instances[*idx].goal.clone())
            .collect();
        let solved = self.domain.is_solved(&states, &goals);
        check_aligned("goal checks", states.len(), solved.len())?;

        let mut to_expand: Vec<(usize, NodeRef<D::State, D::Action>)> = Vec::new();
        for ((idx, node), is_goal) in popped.into_iter().zip(solved) {
            let instance = &mut self.instances[idx];
            if instance.finished {
                continue;
            }
            if is_goal {
                instance.finished = true;
                instance.goal_node = Some(node);
            } else {
                to_expand.push((idx, node));
            }
        }
        to_expand.retain(|(idx, _)| !self.instances[*idx].finished);

        let expand_states: Vec<D::State> = to_expand.iter().map(|(_, n)| n.state.clone()).collect();
        let transitions = self.domain.expand(&expand_states);
        check_aligned("expansions", expand_states.len(), transitions.len())?;

        let mut children: Vec<(usize, NodeRef<D::State, D::Action>, D::State, D::Action, f64)> =
            Vec::new();
        for ((idx, parent), edges) in to_expand.into_iter().zip(transitions) {
            for edge in edges {
                children.push((idx, Rc::clone(&parent), edge.state, edge.action, edge.cost));
            }
        }

        let child_states: Vec<D::State> = children.iter().map(|c| c.2.clone()).collect();
        let child_goals: Vec<D::Goal> = children
            .iter()
            .map(|c| self.instances[c.0].goal.clone())
            .collect();
        let estimates = if child_states.is_empty() {
            Vec::new()
        } else {
            heuristic.evaluate(&child_states, &child_goals)?
        };
        check_aligned("heuristic output", child_states.len(), estimates.len())?;

        for ((idx, parent, state, action, cost), h) in children.into_iter().zip(estimates) {
            let instance = &mut self.instances[idx];
            let g = parent.path_cost + cost;
            if !instance.improves(&state, g) {
                continue;
            }
            instance.push(Rc::new(Node::child(&parent, state, action, cost, h)));
        }

        for instance in &mut self.instances {
            if !instance.finished && instance.open.is_empty() {
                instance.finished = true;
            }
        }

        trace!(
            active = self.instances.iter().filter(|i| !i.finished).count(),
            "Search round complete"
        );
        Ok(())
    }

    pub fn instances(&self) -> &[Instance<D>] {
        &self.instances
    }

    pub fn all_finished(&self) -> bool {
        self.instances.iter().all(|i| i.finished)
    }

    pub fn nodes_generated(&self) -> usize {
        self.instances.iter().map(|i| i.nodes_generated).sum()
    }

    /// Goal node (if any) for every instance, in registration order
    pub fn into_goal_nodes(self) -> Vec<Option<NodeRef<D::State, D::Action>>> {
        self.instances.into_iter().map(|i| i.goal_node).collect()
    }
}
