use crate::{
    config::PlannerConfig,
    planner::{Planner, UctPlanner},
    testing::{FixedRewards, HashedRewards, init_logging},
    tree::ids::ActionId,
};

#[test]
fn visits_grow_by_the_action_count_per_expansion() {
    init_logging();
    let config = PlannerConfig::default().with_gamma(0.9);
    let mut planner = UctPlanner::new(HashedRewards::new(3, 17), &config, 17);

    planner.plan(30).expect("planning should succeed");
    assert_eq!(planner.last_metrics().expansions, 10);

    let tree = planner.tree();
    let root = tree.node(tree.root_id()).expect("root");
    assert_eq!(root.value().visits, 1 + 3 * 10);

    // A node's visits count every expansion in its subtree, itself included.
    for node_id in tree.preorder().expect("preorder") {
        let node = tree.node(node_id).expect("node");
        if node.is_leaf() {
            assert_eq!(node.value().visits, 1);
            continue;
        }
        let below: u64 = node
            .children()
            .iter()
            .map(|&child| tree.node(child).expect("child").value().visits - 1)
            .sum();
        assert_eq!(node.value().visits, 1 + 3 + below);
    }
}

#[test]
fn zero_exploration_descends_greedily() {
    let mut config = PlannerConfig::default().with_gamma(0.8);
    config.exploration = 0.0;
    let mut planner = UctPlanner::new(
        FixedRewards {
            rewards: vec![1.0, 0.0],
        },
        &config,
        0,
    );

    let action = planner.plan(20).expect("planning should succeed");
    assert_eq!(action, ActionId::from(0));
    assert_eq!(planner.max_observed_depth(), 10);

    let expected: f64 = (0..10).map(|i| 0.8_f64.powi(i)).sum();
    assert!((planner.best_value() - expected).abs() < 1e-12);
}

#[test]
fn dominant_action_wins_with_default_exploration() {
    let config = PlannerConfig::default().with_gamma(0.5);
    let mut planner = UctPlanner::new(
        FixedRewards {
            rewards: vec![0.0, 1.0],
        },
        &config,
        0,
    );
    for budget in [2, 10, 50, 200] {
        assert_eq!(
            planner.plan(budget).expect("planning should succeed"),
            ActionId::from(1)
        );
    }
}

#[test]
fn closed_subtrees_are_skipped_until_the_root_closes() {
    let config = PlannerConfig::default().with_gamma(0.9).with_max_depth(2);
    let mut planner = UctPlanner::new(HashedRewards::new(2, 3), &config, 3);

    planner.plan(1000).expect("planning should succeed");
    assert_eq!(planner.evaluations(), 6);
    assert_eq!(planner.tree().node_count(), 7);
    assert!(planner.last_metrics().exhausted);
    assert!(planner.select_leaf().expect("descent should succeed").is_none());
}

#[test]
fn best_leaf_spans_closed_leaves() {
    // Every child is terminal, so the recommendation comes from closed leaves.
    let model = HashedRewards {
        terminal_every: 1,
        ..HashedRewards::new(3, 21)
    };
    let config = PlannerConfig::default();
    let mut planner = UctPlanner::new(model, &config, 21);

    planner.plan(10).expect("planning should succeed");
    let tree = planner.tree();
    let best = tree
        .leaves()
        .expect("leaves")
        .into_iter()
        .map(|leaf| tree.node(leaf).expect("leaf").discounted_return())
        .fold(f64::NEG_INFINITY, f64::max);
    assert_eq!(planner.best_value(), best);
}
