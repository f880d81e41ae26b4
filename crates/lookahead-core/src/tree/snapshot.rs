use serde::Serialize;

/// Read-only copy of a search tree, nodes listed in pre-order.
#[derive(Debug, Clone, Serialize)]
pub struct TreeSnapshot {
    pub root_node_id: usize,
    pub node_count: usize,
    pub max_depth: usize,
    pub nodes: Vec<NodeSnapshot>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NodeSnapshot {
    pub node_id: usize,
    pub parent_node_id: Option<usize>,
    pub parent_action_id: Option<usize>,
    pub depth: usize,
    pub reward: f64,
    pub discounted_return: f64,
    pub closed: bool,
    pub children: Vec<usize>,
}
