//! Lookahead planners.
//!
//! Every planner follows the same control contract: build it on a state, call
//! `plan(budget)` to get an action, then either `reset_to` the next state or
//! `retain_subtree` to reuse the part of the search below the chosen action.

use serde::{Deserialize, Serialize};

use crate::{
    config::PlannerConfig,
    model::GenerativeModel,
    tree::{error::TreeError, ids::ActionId},
};

pub mod best_leaf;
pub mod optimistic;
pub mod random_search;
pub mod uct;
pub mod uniform;

pub use best_leaf::BestLeaf;
pub use optimistic::{OpenLeaf, OptimisticPlanner, OptimisticValue};
pub use random_search::RandomSearchPlanner;
pub use uct::{UctPlanner, UctValue};
pub use uniform::{UniformPlanner, UniformValue};

#[cfg(test)]
mod tests;

/// Which expansion policy drives the search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlannerKind {
    /// Expand the open leaf with the largest upper bound.
    #[default]
    Optimistic,
    /// Descend with a UCB1 rule and expand the leaf reached.
    Uct,
    /// Expand the whole frontier depth by depth.
    Uniform,
    /// Independent random rollouts, no persistent tree.
    RandomSearch,
}

/// Per-expansion metrics reported through `plan_with_hook`.
///
/// For random search one rollout counts as one expansion.
#[derive(Debug, Clone, Copy)]
pub struct ExpansionMetrics {
    /// Depth of the expanded leaf, or length of the rollout.
    pub depth: usize,
    /// Transition calls spent by this step.
    pub transitions: usize,
    /// Value of the recommendation after this step.
    pub best_value: f64,
}

/// Aggregate metrics for one `plan` call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanMetrics {
    pub budget: usize,
    /// Transition calls charged to the budget when the call returned.
    pub evaluations: usize,
    /// Transition calls made by this call alone.
    pub transitions: usize,
    pub expansions: usize,
    pub action: ActionId,
    pub best_value: f64,
    /// Search space below the root was exhausted before the budget.
    pub exhausted: bool,
}

impl PlanMetrics {
    pub(crate) fn new(budget: usize) -> Self {
        PlanMetrics {
            budget,
            ..PlanMetrics::default()
        }
    }

    pub(crate) fn record(&mut self, metrics: &ExpansionMetrics) {
        self.expansions += 1;
        self.transitions += metrics.transitions;
    }
}

/// Anytime lookahead planner over a deterministic generative model.
pub trait Planner {
    type State;

    /// Discard all search data, including the last plan's metrics, and
    /// restart from `state`.
    fn reset_to(&mut self, state: &Self::State);

    /// Search until `budget` transition calls are charged or nothing is left
    /// to open, reporting every expansion to `on_expansion`.
    ///
    /// The budget is only checked between expansions, so one call may overshoot
    /// it by up to K - 1 transitions.
    fn plan_with_hook(
        &mut self,
        budget: usize,
        on_expansion: &mut dyn FnMut(&ExpansionMetrics),
    ) -> Result<ActionId, TreeError>;

    /// Search and return the recommended action.
    fn plan(&mut self, budget: usize) -> Result<ActionId, TreeError> {
        self.plan_with_hook(budget, &mut |_| {})
    }

    /// Move the decision point to the successor of the recommended action,
    /// keeping whatever search below it can be reused.
    fn retain_subtree(&mut self) -> Result<(), TreeError>;

    /// Deepest depth the search has reached below the current root.
    fn max_observed_depth(&self) -> usize;

    /// Current recommendation.
    fn best_action(&self) -> ActionId;

    /// Discounted return backing the current recommendation.
    fn best_value(&self) -> f64;

    /// Transition calls charged to the current budget.
    fn evaluations(&self) -> usize;

    /// Transition calls made over the planner's lifetime.
    fn total_evaluations(&self) -> usize;

    /// Metrics of the last `plan` call.
    fn last_metrics(&self) -> &PlanMetrics;
}

/// Build the planner named by `config.algorithm`.
pub fn build_planner<M>(
    model: M,
    config: &PlannerConfig,
    initial_state: M::State,
) -> Box<dyn Planner<State = M::State>>
where
    M: GenerativeModel + 'static,
    M::State: 'static,
{
    match config.algorithm {
        PlannerKind::Optimistic => Box::new(OptimisticPlanner::new(model, config, initial_state)),
        PlannerKind::Uct => Box::new(UctPlanner::new(model, config, initial_state)),
        PlannerKind::Uniform => Box::new(UniformPlanner::new(model, config, initial_state)),
        PlannerKind::RandomSearch => {
            Box::new(RandomSearchPlanner::new(model, config, initial_state))
        }
    }
}
