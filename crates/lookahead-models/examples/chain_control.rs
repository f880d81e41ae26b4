use std::path::PathBuf;

use lookahead_core::{GenerativeModel, PlannerConfig, build_planner};
use lookahead_models::compile_yaml;

const STEPS: usize = 12;

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let model_path = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("crates/lookahead-models/examples/chain.model.yaml"));
    let config = match args.next() {
        Some(path) => PlannerConfig::from_yaml_path(path).expect("failed to load planner config"),
        None => PlannerConfig::from_default_yaml().expect("bundled planner config is valid"),
    };

    let model = compile_yaml(&model_path).expect("failed to compile model YAML");
    let mut state = model.initial_state();
    let mut planner = build_planner(model.clone(), &config, state);

    let mut total = 0.0;
    let mut discount = 1.0;
    for step in 0..STEPS {
        let action = planner.plan(config.budget).expect("planning failed");
        let transition = model.transition(&state, action);
        total += discount * transition.reward;
        discount *= config.gamma;

        println!(
            "step={step} state={} action={} reward={:.2} value={:.6} depth={}",
            model.state_id(state).unwrap_or("?"),
            model.action_name(action).unwrap_or("?"),
            transition.reward,
            planner.best_value(),
            planner.max_observed_depth()
        );

        state = transition.next;
        if transition.terminal {
            break;
        }
        if config.keep_subtree {
            planner.retain_subtree().expect("retain failed");
        } else {
            planner.reset_to(&state);
        }
    }

    println!(
        "algorithm={:?} final_state={} discounted_return={total:.6} transitions={}",
        config.algorithm,
        model.state_id(state).unwrap_or("?"),
        planner.total_evaluations()
    );
}
