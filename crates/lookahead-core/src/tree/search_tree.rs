use log::trace;

use crate::{
    model::GenerativeModel,
    tree::{
        arena::Arena,
        discount::DiscountTable,
        error::TreeError,
        ids::{ActionId, NodeId},
        node::Node,
        snapshot::{NodeSnapshot, TreeSnapshot},
    },
};

#[derive(Debug, Clone)]
/// Simulated-trajectory tree rooted at the current decision point.
///
/// Owns the arena and the root id. Every traversal here is iterative, since a
/// tree can be tens of thousands of levels deep.
pub struct SearchTree<S, V> {
    arena: Arena<Node<S, V>>,
    root: NodeId,
}

/// Iterator over the strict ancestors of a node, nearest first.
pub struct Ancestors<'a, S, V> {
    tree: &'a SearchTree<S, V>,
    current: Option<NodeId>,
}

impl<S, V> Iterator for Ancestors<'_, S, V> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.current?;
        self.current = self
            .tree
            .arena
            .get(current)
            .and_then(|node| node.parent())
            .map(|(parent, _)| parent);
        self.current
    }
}

impl<S, V> SearchTree<S, V> {
    /// Create a tree with a single open root node.
    pub fn new(root_state: S, value: V) -> Self {
        let mut arena = Arena::new();
        let root = arena.allocate(Node::new(root_state, 0.0, 0.0, 0, None, false, value));
        SearchTree { arena, root }
    }

    /// Return the root node id.
    pub fn root_id(&self) -> NodeId {
        self.root
    }

    /// Return how many nodes the tree currently holds.
    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    /// Return an immutable node handle.
    pub fn node(&self, node_id: NodeId) -> Result<&Node<S, V>, TreeError> {
        self.arena
            .get(node_id)
            .ok_or(TreeError::MissingNode { node_id })
    }

    /// Return a mutable node handle.
    pub(crate) fn node_mut(&mut self, node_id: NodeId) -> Result<&mut Node<S, V>, TreeError> {
        self.arena
            .get_mut(node_id)
            .ok_or(TreeError::MissingNode { node_id })
    }

    /// Iterate over every node of the tree, in no particular order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node<S, V>)> {
        self.arena.iter()
    }

    /// Follow `action_id` from `node_id`.
    pub fn child(&self, node_id: NodeId, action_id: ActionId) -> Result<NodeId, TreeError> {
        self.node(node_id)?
            .child(action_id)
            .ok_or(TreeError::MissingChild { node_id, action_id })
    }

    /// Walk parent pointers from `node_id` up to the root.
    pub fn ancestors(&self, node_id: NodeId) -> Ancestors<'_, S, V> {
        Ancestors {
            tree: self,
            current: Some(node_id),
        }
    }

    /// Root action whose subtree contains `node_id`; `None` for the root itself.
    pub fn first_action(&self, node_id: NodeId) -> Result<Option<ActionId>, TreeError> {
        let mut current = node_id;
        let mut first = None;
        while let Some((parent, action)) = self.node(current)?.parent() {
            first = Some(action);
            current = parent;
        }
        Ok(first)
    }

    /// Depth of the deepest node, relative to the current root.
    pub fn max_depth(&self) -> usize {
        self.arena
            .iter()
            .map(|(_, node)| node.depth())
            .max()
            .unwrap_or(0)
    }

    /// Every node id, parents before children, children in action order.
    pub fn preorder(&self) -> Result<Vec<NodeId>, TreeError> {
        let mut order = Vec::with_capacity(self.arena.len());
        let mut stack = vec![self.root];
        while let Some(node_id) = stack.pop() {
            order.push(node_id);
            stack.extend(self.node(node_id)?.children().iter().rev());
        }
        Ok(order)
    }

    /// Leaves of the tree in left-to-right order.
    pub fn leaves(&self) -> Result<Vec<NodeId>, TreeError> {
        let order = self.preorder()?;
        let mut leaves = Vec::new();
        for node_id in order {
            if self.node(node_id)?.is_leaf() {
                leaves.push(node_id);
            }
        }
        Ok(leaves)
    }

    /// Expand a leaf: one transition call per action, K children created at once.
    ///
    /// A child is closed when its transition is terminal or when it sits at
    /// `max_depth`. `value_for(depth, discounted_return)` builds each child's
    /// payload. Returns the child ids in action order.
    pub fn expand<M, F>(
        &mut self,
        leaf: NodeId,
        model: &M,
        discounts: &mut DiscountTable,
        max_depth: usize,
        mut value_for: F,
    ) -> Result<Vec<NodeId>, TreeError>
    where
        M: GenerativeModel<State = S>,
        F: FnMut(usize, f64) -> V,
    {
        let (depth, base_return, transitions) = {
            let node = self.node(leaf)?;
            if !node.is_leaf() {
                return Err(TreeError::NotALeaf { node_id: leaf });
            }
            let transitions: Vec<_> = (0..model.num_actions())
                .map(|action| model.transition(node.state(), ActionId::from(action)))
                .collect();
            (node.depth(), node.discounted_return(), transitions)
        };

        let discount = discounts.power(depth);
        let child_depth = depth + 1;

        let children: Vec<NodeId> = transitions
            .into_iter()
            .enumerate()
            .map(|(action, transition)| {
                let discounted_return = base_return + discount * transition.reward;
                let closed = transition.terminal || child_depth >= max_depth;
                let value = value_for(child_depth, discounted_return);
                self.arena.allocate(Node::new(
                    transition.next,
                    transition.reward,
                    discounted_return,
                    child_depth,
                    Some((leaf, ActionId::from(action))),
                    closed,
                    value,
                ))
            })
            .collect();

        self.node_mut(leaf)?.set_children(children.clone());
        Ok(children)
    }

    /// Free every node in `detached` and everything below them. Callers must
    /// already have dropped the only reference to each of these nodes.
    fn release_detached(&mut self, detached: Vec<NodeId>) -> usize {
        let mut released = 0;
        let mut stack = detached;
        while let Some(current) = stack.pop() {
            if let Some(node) = self.arena.release(current) {
                stack.extend_from_slice(node.children());
                released += 1;
            }
        }
        released
    }

    /// Make the root's child at `action` the new root.
    ///
    /// The old root and every sibling subtree are freed before returning. Depth
    /// and discounted return of the retained nodes are re-based on the new root.
    /// Returns the retained nodes in pre-order.
    pub fn reroot(
        &mut self,
        action: ActionId,
        discounts: &mut DiscountTable,
    ) -> Result<Vec<NodeId>, TreeError> {
        let old_root = self.root;
        let kept = self.child(old_root, action)?;
        let siblings: Vec<NodeId> = self
            .arena
            .release(old_root)
            .ok_or(TreeError::MissingNode { node_id: old_root })?
            .children()
            .iter()
            .copied()
            .filter(|child| *child != kept)
            .collect();
        let released = self.release_detached(siblings);

        self.root = kept;
        self.node_mut(kept)?.detach();
        let order = self.rebase(discounts)?;

        trace!(
            "rerooted on action {}: kept {} nodes, released {}",
            action.index(),
            order.len(),
            released + 1
        );
        Ok(order)
    }

    fn rebase(&mut self, discounts: &mut DiscountTable) -> Result<Vec<NodeId>, TreeError> {
        let order = self.preorder()?;
        for &node_id in order.iter().skip(1) {
            let Some((parent_id, _)) = self.node(node_id)?.parent() else {
                continue;
            };
            let (parent_depth, parent_return) = {
                let parent = self.node(parent_id)?;
                (parent.depth(), parent.discounted_return())
            };
            let discount = discounts.power(parent_depth);
            let node = self.node_mut(node_id)?;
            let discounted_return = parent_return + discount * node.reward();
            node.rebase(parent_depth + 1, discounted_return);
        }
        Ok(order)
    }

    /// Copy the common node fields into a serializable snapshot.
    pub fn snapshot(&self) -> Result<TreeSnapshot, TreeError> {
        let order = self.preorder()?;
        let mut nodes = Vec::with_capacity(order.len());
        for node_id in order {
            let node = self.node(node_id)?;
            nodes.push(NodeSnapshot {
                node_id: node_id.index(),
                parent_node_id: node.parent().map(|(parent, _)| parent.index()),
                parent_action_id: node.parent().map(|(_, action)| action.index()),
                depth: node.depth(),
                reward: node.reward(),
                discounted_return: node.discounted_return(),
                closed: node.is_closed(),
                children: node.children().iter().map(NodeId::index).collect(),
            });
        }
        Ok(TreeSnapshot {
            root_node_id: self.root.index(),
            node_count: nodes.len(),
            max_depth: self.max_depth(),
            nodes,
        })
    }
}
