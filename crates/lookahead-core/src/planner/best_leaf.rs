use crate::tree::ids::{ActionId, NodeId};

/// Best discounted return among the leaves of a subtree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BestLeaf {
    /// Leaf holding `value`; `None` when the node is itself that leaf.
    pub leaf: Option<NodeId>,
    /// Child of the summarised node that leads to `leaf`.
    pub child: Option<ActionId>,
    pub value: f64,
}

impl BestLeaf {
    /// Summary of a leaf with the given discounted return.
    pub fn at_leaf(value: f64) -> Self {
        BestLeaf {
            leaf: None,
            child: None,
            value,
        }
    }

    /// Combine children summaries, given as `(action, child id, summary)`.
    /// Ties keep the lowest action.
    pub(crate) fn over_children(
        children: impl IntoIterator<Item = (ActionId, NodeId, BestLeaf)>,
    ) -> Option<Self> {
        let mut best: Option<BestLeaf> = None;
        for (action, child_id, summary) in children {
            if best.is_none_or(|current| summary.value > current.value) {
                best = Some(BestLeaf {
                    leaf: Some(summary.leaf.unwrap_or(child_id)),
                    child: Some(action),
                    value: summary.value,
                });
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ties_keep_the_first_child() {
        let best = BestLeaf::over_children([
            (ActionId::from(0), NodeId::from(4), BestLeaf::at_leaf(1.0)),
            (ActionId::from(1), NodeId::from(5), BestLeaf::at_leaf(1.0)),
        ])
        .expect("two children");
        assert_eq!(best.child, Some(ActionId::from(0)));
        assert_eq!(best.leaf, Some(NodeId::from(4)));
    }

    #[test]
    fn deeper_leaf_is_forwarded() {
        let deep = BestLeaf {
            leaf: Some(NodeId::from(9)),
            child: Some(ActionId::from(0)),
            value: 2.0,
        };
        let best = BestLeaf::over_children([
            (ActionId::from(0), NodeId::from(1), BestLeaf::at_leaf(1.5)),
            (ActionId::from(1), NodeId::from(2), deep),
        ])
        .expect("two children");
        assert_eq!(best.child, Some(ActionId::from(1)));
        assert_eq!(best.leaf, Some(NodeId::from(9)));
        assert_eq!(best.value, 2.0);
    }

    #[test]
    fn no_children_no_summary() {
        assert!(BestLeaf::over_children(Vec::new()).is_none());
    }
}
