use lookahead_core::{
    ActionId, GenerativeModel, OptimisticPlanner, Planner, PlannerConfig, PlannerKind,
    Transition, UniformPlanner, build_planner,
};

/// Never-terminal model with a constant reward per action. State is the depth.
struct ConstantRewards(Vec<f64>);

impl GenerativeModel for ConstantRewards {
    type State = u32;

    fn num_actions(&self) -> usize {
        self.0.len()
    }

    fn initial_state(&self) -> u32 {
        0
    }

    fn transition(&self, state: &u32, action: ActionId) -> Transition<u32> {
        Transition {
            next: state + 1,
            reward: self.0[action.index()],
            terminal: false,
        }
    }
}

/// A corridor: action 1 walks right, action 0 stays. Reaching `goal` pays 1
/// and ends the episode.
struct Corridor {
    goal: u32,
}

impl GenerativeModel for Corridor {
    type State = u32;

    fn num_actions(&self) -> usize {
        2
    }

    fn initial_state(&self) -> u32 {
        0
    }

    fn transition(&self, state: &u32, action: ActionId) -> Transition<u32> {
        let next = if action.index() == 1 { state + 1 } else { *state };
        let arrived = next >= self.goal;
        Transition {
            next,
            reward: if arrived { 1.0 } else { 0.0 },
            terminal: arrived,
        }
    }
}

#[test]
fn constant_rewards_never_lose_value_with_more_budget() {
    let config = PlannerConfig::default().with_gamma(0.9);
    let mut previous = f64::NEG_INFINITY;
    for budget in [2, 4, 10, 30, 100, 400, 1000] {
        let mut planner = OptimisticPlanner::new(ConstantRewards(vec![1.0, 1.0]), &config, 0);
        let action = planner.plan(budget).expect("planning should succeed");
        assert!(action.index() < 2);
        assert!(planner.best_value() >= previous);
        previous = planner.best_value();
    }
}

#[test]
fn rewarding_action_is_chosen_and_value_stays_below_the_horizon_sum() {
    let config = PlannerConfig::default().with_gamma(0.5);
    for budget in [2, 3, 16, 40, 80] {
        let mut planner = OptimisticPlanner::new(ConstantRewards(vec![1.0, 0.0]), &config, 0);
        let action = planner.plan(budget).expect("planning should succeed");
        assert_eq!(action, ActionId::from(0));
        assert!(planner.best_value() < 2.0);
    }

    let mut planner = OptimisticPlanner::new(ConstantRewards(vec![1.0, 0.0]), &config, 0);
    planner.plan(60).expect("planning should succeed");
    assert!(2.0 - planner.best_value() < 1e-8);
}

#[test]
fn uniform_budget_of_complete_layers() {
    let config = PlannerConfig::default().with_gamma(0.9);
    let mut planner = UniformPlanner::new(ConstantRewards(vec![0.3, 0.6]), &config, 0);
    planner.plan(6).expect("planning should succeed");

    let tree = planner.tree();
    let at_depth = |depth: usize| {
        tree.nodes()
            .filter(|(_, node)| node.depth() == depth)
            .collect::<Vec<_>>()
    };
    assert_eq!(at_depth(2).len(), 4);
    assert!(at_depth(1).iter().all(|(_, node)| !node.is_leaf()));
    assert!(at_depth(3).is_empty());
}

#[test]
fn zero_budget_returns_the_default_action() {
    let kinds = [
        PlannerKind::Optimistic,
        PlannerKind::Uct,
        PlannerKind::Uniform,
        PlannerKind::RandomSearch,
    ];
    for kind in kinds {
        let config = PlannerConfig::default().with_algorithm(kind).with_seed(0);
        let mut planner = build_planner(ConstantRewards(vec![0.1, 0.9]), &config, 0);
        assert_eq!(planner.plan(0).expect("planning should succeed"), ActionId::from(0));
        assert_eq!(planner.evaluations(), 0);
        assert_eq!(planner.best_value(), 0.0);
    }
}

#[test]
fn control_loop_reaches_the_goal_with_every_planner() {
    let kinds = [
        PlannerKind::Optimistic,
        PlannerKind::Uct,
        PlannerKind::Uniform,
        PlannerKind::RandomSearch,
    ];
    for kind in kinds {
        for keep_subtree in [false, true] {
            let mut config = PlannerConfig::default()
                .with_algorithm(kind)
                .with_gamma(0.9)
                .with_seed(17);
            config.keep_subtree = keep_subtree;

            let model = Corridor { goal: 4 };
            let mut state = model.initial_state();
            let mut planner = build_planner(Corridor { goal: 4 }, &config, state);

            let mut steps = 0;
            loop {
                let action = planner.plan(200).expect("planning should succeed");
                let step = model.transition(&state, action);
                state = step.next;
                steps += 1;
                if step.terminal || steps == 20 {
                    break;
                }
                if config.keep_subtree {
                    planner.retain_subtree().expect("retain should succeed");
                } else {
                    planner.reset_to(&state);
                }
            }
            assert_eq!(state, 4, "{kind:?} keep_subtree={keep_subtree}");
        }
    }
}
