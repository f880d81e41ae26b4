use std::fmt;

use crate::tree::ids::{ActionId, NodeId};

/// Error type for search tree bookkeeping.
///
/// Transitions are total, so none of these come from the model. They signal a
/// node id that no longer resolves, which is a bookkeeping fault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// Attempted to access a node id that does not exist in the arena.
    MissingNode { node_id: NodeId },
    /// Attempted to follow an action from a node that has no such child.
    MissingChild {
        node_id: NodeId,
        action_id: ActionId,
    },
    /// Attempted to expand a node that already has children.
    NotALeaf { node_id: NodeId },
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeError::MissingNode { node_id } => {
                write!(f, "missing node with id {}", node_id.index())
            }
            TreeError::MissingChild { node_id, action_id } => write!(
                f,
                "missing child {} on node {}",
                action_id.index(),
                node_id.index()
            ),
            TreeError::NotALeaf { node_id } => {
                write!(f, "node {} is not a leaf and cannot be expanded", node_id.index())
            }
        }
    }
}

impl std::error::Error for TreeError {}
