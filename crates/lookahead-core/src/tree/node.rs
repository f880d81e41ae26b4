use crate::tree::ids::{ActionId, NodeId};

#[derive(Debug, Clone)]
/// A simulated state reached by a specific action sequence from the root.
/// `V` is the per-policy payload each planner attaches to the common shape.
pub struct Node<S, V> {
    state: S,
    reward: f64,
    discounted_return: f64,
    depth: usize,
    closed: bool,
    parent: Option<(NodeId, ActionId)>,
    children: Vec<NodeId>,
    value: V,
}

impl<S, V> Node<S, V> {
    /// Create a new leaf
    pub(crate) fn new(
        state: S,
        reward: f64,
        discounted_return: f64,
        depth: usize,
        parent: Option<(NodeId, ActionId)>,
        closed: bool,
        value: V,
    ) -> Self {
        Node {
            state,
            reward,
            discounted_return,
            depth,
            closed,
            parent,
            children: Vec::new(),
            value,
        }
    }

    /// The simulated state held by this node
    pub fn state(&self) -> &S {
        &self.state
    }

    /// Reward received when entering this node
    pub fn reward(&self) -> f64 {
        self.reward
    }

    /// Discounted sum of rewards from the root down to this node
    pub fn discounted_return(&self) -> f64 {
        self.discounted_return
    }

    /// Return the depth of a specific node
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// True when nothing below this node can still be opened
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Closure is monotonic: a closed node never reopens.
    pub(crate) fn close(&mut self) {
        self.closed = true;
    }

    /// Return the parent of a given node
    pub fn parent(&self) -> Option<(NodeId, ActionId)> {
        self.parent
    }

    /// Children in action order; empty for a leaf
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Using an action id, return the corresponding child
    pub fn child(&self, action_id: ActionId) -> Option<NodeId> {
        self.children.get(action_id.index()).copied()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// The policy payload
    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn value_mut(&mut self) -> &mut V {
        &mut self.value
    }

    pub(crate) fn set_children(&mut self, children: Vec<NodeId>) {
        self.children = children;
    }

    /// Turn this node into a root: no parent, no entering reward, depth 0.
    pub(crate) fn detach(&mut self) {
        self.parent = None;
        self.reward = 0.0;
        self.depth = 0;
        self.discounted_return = 0.0;
    }

    pub(crate) fn rebase(&mut self, depth: usize, discounted_return: f64) {
        self.depth = depth;
        self.discounted_return = discounted_return;
    }
}
