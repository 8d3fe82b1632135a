use std::rc::Rc;

/// Search-tree node with a back-reference to its parent.
#[derive(Debug)]
pub struct Node<S, A> {
    pub state: S,
    pub path_cost: f64,
    pub heuristic: f64,
    pub parent: Option<NodeRef<S, A>>,
    /// Action that produced this node from its parent
    pub action: Option<A>,
}

pub type NodeRef<S, A> = Rc<Node<S, A>>;

impl<S, A> Node<S, A> {
    pub fn root(state: S, heuristic: f64) -> Self {
        Self {
            state,
            path_cost: 0.0,
            heuristic,
            parent: None,
            action: None,
        }
    }

    pub fn child(parent: &NodeRef<S, A>, state: S, action: A, cost: f64, heuristic: f64) -> Self {
        Self {
            state,
            path_cost: parent.path_cost + cost,
            heuristic,
            parent: Some(Rc::clone(parent)),
            action: Some(action),
        }
    }

    /// Number of actions between the root and this node
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut current = self.parent.as_deref();
        while let Some(node) = current {
            depth += 1;
            current = node.parent.as_deref();
        }
        depth
    }
}

/// States and actions from the root to a node
#[derive(Debug, Clone, PartialEq)]
pub struct Path<S, A> {
    /// `actions.len() + 1` states, root first
    pub states: Vec<S>,
    pub actions: Vec<A>,
    pub cost: f64,
}

/// Reconstruct the path ending at `node` by walking parent links.
pub fn get_path<S: Clone, A: Clone>(node: &NodeRef<S, A>) -> Path<S, A> {
    let mut states = Vec::new();
    let mut actions = Vec::new();

    let mut current = Some(node.as_ref());
    while let Some(n) = current {
        states.push(n.state.clone());
        if let Some(action) = &n.action {
            actions.push(action.clone());
        }
        current = n.parent.as_deref();
    }
    states.reverse();
    actions.reverse();

    Path {
        states,
        actions,
        cost: node.path_cost,
    }
}
