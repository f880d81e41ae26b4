use std::collections::HashSet;

use proptest::prelude::*;

use crate::{
    config::PlannerConfig,
    planner::{OptimisticPlanner, Planner, UctPlanner, UniformPlanner},
    testing::HashedRewards,
    tree::{discount::DiscountTable, ids::NodeId, search_tree::SearchTree},
};

/// Structural checks every tree planner must keep after any operation.
fn check_tree<V>(
    tree: &SearchTree<u64, V>,
    gamma: f64,
    best_value: f64,
) -> Result<(), TestCaseError> {
    let mut discounts = DiscountTable::new(gamma);
    let root = tree.node(tree.root_id()).expect("root");
    prop_assert_eq!(root.depth(), 0);
    prop_assert_eq!(root.discounted_return(), 0.0);

    let mut best_leaf = None::<f64>;
    for node_id in tree.preorder().expect("preorder") {
        let node = tree.node(node_id).expect("node");

        if let Some((parent_id, _)) = node.parent() {
            let parent = tree.node(parent_id).expect("parent");
            prop_assert_eq!(node.depth(), parent.depth() + 1);
            let expected =
                parent.discounted_return() + discounts.power(parent.depth()) * node.reward();
            prop_assert!((node.discounted_return() - expected).abs() < 1e-9);
        }

        if node.is_leaf() {
            if node_id != tree.root_id() {
                let value = node.discounted_return();
                best_leaf = Some(best_leaf.map_or(value, |best| best.max(value)));
            }
            // No leaf can beat the optimistic bound of any of its ancestors.
            for ancestor in tree.ancestors(node_id) {
                let ancestor = tree.node(ancestor).expect("ancestor");
                let bound = ancestor.discounted_return() + discounts.tail_bound(ancestor.depth());
                prop_assert!(node.discounted_return() <= bound + 1e-9);
            }
        } else {
            let all_closed = node
                .children()
                .iter()
                .all(|&child| tree.node(child).expect("child").is_closed());
            prop_assert_eq!(node.is_closed(), all_closed);
        }
    }

    if let Some(best) = best_leaf {
        prop_assert!((best_value - best).abs() < 1e-12);
    }
    Ok(())
}

fn closed_nodes<V>(tree: &SearchTree<u64, V>) -> HashSet<NodeId> {
    tree.nodes()
        .filter(|(_, node)| node.is_closed())
        .map(|(node_id, _)| node_id)
        .collect()
}

fn model(salt: u64, actions: usize, terminal_every: u64) -> HashedRewards {
    HashedRewards {
        terminal_every,
        ..HashedRewards::new(actions, salt)
    }
}

macro_rules! tree_planner_properties {
    ($name:ident, $planner:ident) => {
        proptest! {
            #[test]
            fn $name(
                salt in any::<u64>(),
                actions in 1usize..4,
                gamma in 0.05f64..0.95,
                budget in 1usize..200,
                terminal_every in prop_oneof![Just(0u64), 2u64..6],
                max_depth in 1usize..12,
            ) {
                let config = PlannerConfig::default()
                    .with_gamma(gamma)
                    .with_max_depth(max_depth);
                let mut planner =
                    $planner::new(model(salt, actions, terminal_every), &config, salt);

                planner.plan(budget).expect("planning should succeed");
                prop_assert_eq!(planner.evaluations(), planner.tree().node_count() - 1);
                prop_assert!(planner.max_observed_depth() <= max_depth);
                check_tree(planner.tree(), gamma, planner.best_value())?;
                if !planner.last_metrics().exhausted {
                    prop_assert!(planner.evaluations() >= budget);
                    prop_assert!(planner.evaluations() < budget + actions);
                }

                let closed = closed_nodes(planner.tree());
                planner.plan(budget * 2).expect("planning should succeed");
                prop_assert!(closed.is_subset(&closed_nodes(planner.tree())));
                check_tree(planner.tree(), gamma, planner.best_value())?;

                planner.retain_subtree().expect("retain should succeed");
                prop_assert_eq!(planner.evaluations(), planner.tree().node_count() - 1);
                check_tree(planner.tree(), gamma, planner.best_value())?;

                planner.plan(budget).expect("planning should succeed");
                check_tree(planner.tree(), gamma, planner.best_value())?;
            }
        }
    };
}

tree_planner_properties!(optimistic_search_keeps_tree_invariants, OptimisticPlanner);
tree_planner_properties!(uct_search_keeps_tree_invariants, UctPlanner);
tree_planner_properties!(uniform_search_keeps_tree_invariants, UniformPlanner);
