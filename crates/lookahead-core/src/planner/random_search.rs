//! Pure random search.
//!
//! No tree is kept. Every rollout starts at the root with a uniformly random
//! first action and continues with up to `L` uniformly random actions, so it
//! stops at depth `L + 1` or on a terminal transition. After each rollout the
//! limit is re-derived from the evaluations spent so far:
//! `L = clamp(floor(ln(evaluations) / ln(1 / gamma)), 1, max_depth - 1)`.
//! The `max_depth - 1` ceiling keeps the deepest rollout at `max_depth`, the
//! same ceiling the tree planners close nodes at.

use log::{debug, trace};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::{
    config::PlannerConfig,
    model::GenerativeModel,
    planner::{ExpansionMetrics, PlanMetrics, Planner},
    tree::{discount::DiscountTable, error::TreeError, ids::ActionId},
};

pub struct RandomSearchPlanner<M: GenerativeModel> {
    model: M,
    discounts: DiscountTable,
    max_depth: usize,
    rng: ChaCha8Rng,
    root: M::State,
    /// Best rollout return seen per first action.
    best_returns: Vec<Option<f64>>,
    /// Successor of the root under each first action, once sampled.
    successors: Vec<Option<M::State>>,
    depth_limit: usize,
    deepest: usize,
    evaluations: usize,
    total_evaluations: usize,
    metrics: PlanMetrics,
}

impl<M: GenerativeModel> RandomSearchPlanner<M> {
    pub fn new(model: M, config: &PlannerConfig, initial_state: M::State) -> Self {
        let rng = config
            .seed
            .map_or_else(ChaCha8Rng::from_entropy, ChaCha8Rng::seed_from_u64);
        let num_actions = model.num_actions();
        RandomSearchPlanner {
            model,
            discounts: DiscountTable::new(config.gamma),
            max_depth: config.max_depth,
            rng,
            root: initial_state,
            best_returns: vec![None; num_actions],
            successors: vec![None; num_actions],
            depth_limit: 1,
            deepest: 0,
            evaluations: 0,
            total_evaluations: 0,
            metrics: PlanMetrics::default(),
        }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn into_model(self) -> M {
        self.model
    }

    /// Current decision point.
    pub fn root(&self) -> &M::State {
        &self.root
    }

    /// Current limit `L` on the random actions taken after the first one.
    pub fn depth_limit(&self) -> usize {
        self.depth_limit
    }

    /// Best return recorded per first action; `None` when never sampled.
    pub fn best_returns(&self) -> &[Option<f64>] {
        &self.best_returns
    }

    /// Limit `L` once `evaluations` transitions have been spent.
    pub fn depth_limit_for(&self, evaluations: usize) -> usize {
        let ceiling = self.max_depth.saturating_sub(1).max(1);
        let gamma = self.discounts.gamma();
        let raw = ((evaluations as f64).ln() / (1.0 / gamma).ln()).floor();
        if !raw.is_finite() || raw < 1.0 {
            return 1;
        }
        (raw as usize).clamp(1, ceiling)
    }

    fn rollout(&mut self) -> Option<ExpansionMetrics> {
        let num_actions = self.model.num_actions();
        if num_actions == 0 {
            return None;
        }

        let first = self.rng.gen_range(0..num_actions);
        let step = self.model.transition(&self.root, ActionId::from(first));
        if self.successors[first].is_none() {
            self.successors[first] = Some(step.next.clone());
        }

        let mut discounted_return = step.reward;
        let mut terminal = step.terminal;
        let mut state = step.next;
        let mut depth = 1;
        while !terminal && depth <= self.depth_limit {
            let action = ActionId::from(self.rng.gen_range(0..num_actions));
            let step = self.model.transition(&state, action);
            discounted_return += self.discounts.power(depth) * step.reward;
            terminal = step.terminal;
            state = step.next;
            depth += 1;
        }

        self.evaluations += depth;
        self.total_evaluations += depth;
        self.deepest = self.deepest.max(depth);

        let best = &mut self.best_returns[first];
        if best.is_none_or(|value| discounted_return > value) {
            *best = Some(discounted_return);
        }

        let limit = self.depth_limit_for(self.evaluations);
        if limit != self.depth_limit {
            trace!("random search: depth limit {} -> {limit}", self.depth_limit);
            self.depth_limit = limit;
        }

        Some(ExpansionMetrics {
            depth,
            transitions: depth,
            best_value: self.best_value(),
        })
    }

    fn restart(&mut self, state: M::State) {
        self.root = state;
        self.best_returns.fill(None);
        self.successors.fill(None);
        self.depth_limit = 1;
        self.deepest = 0;
        self.evaluations = 0;
    }

    fn best(&self) -> Option<(ActionId, f64)> {
        let mut best: Option<(ActionId, f64)> = None;
        for (action, value) in self.best_returns.iter().enumerate() {
            let Some(value) = *value else {
                continue;
            };
            if best.is_none_or(|(_, current)| value > current) {
                best = Some((ActionId::from(action), value));
            }
        }
        best
    }
}

impl<M: GenerativeModel> Planner for RandomSearchPlanner<M> {
    type State = M::State;

    fn reset_to(&mut self, state: &M::State) {
        self.restart(state.clone());
        self.metrics = PlanMetrics::default();
    }

    fn plan_with_hook(
        &mut self,
        budget: usize,
        on_expansion: &mut dyn FnMut(&ExpansionMetrics),
    ) -> Result<ActionId, TreeError> {
        let mut metrics = PlanMetrics::new(budget);

        while self.evaluations < budget {
            let Some(step) = self.rollout() else {
                metrics.exhausted = true;
                break;
            };
            on_expansion(&step);
            metrics.record(&step);
        }

        metrics.evaluations = self.evaluations;
        metrics.action = self.best_action();
        metrics.best_value = self.best_value();

        debug!(
            "random search: budget {} used {} ({} rollouts, limit {}), action {} value {:.6}",
            budget,
            metrics.evaluations,
            metrics.expansions,
            self.depth_limit,
            metrics.action.index(),
            metrics.best_value
        );

        let action = metrics.action;
        self.metrics = metrics;
        Ok(action)
    }

    /// Restart from the successor of the recommended action. Rollout results
    /// cannot be reused, so nothing is credited to the next budget.
    fn retain_subtree(&mut self) -> Result<(), TreeError> {
        let action = self.best_action();
        let Some(next) = self
            .successors
            .get_mut(action.index())
            .and_then(Option::take)
        else {
            return Ok(());
        };

        self.restart(next);
        debug!("random search: moved root along action {}", action.index());
        Ok(())
    }

    fn max_observed_depth(&self) -> usize {
        self.deepest
    }

    fn best_action(&self) -> ActionId {
        self.best().map(|(action, _)| action).unwrap_or_default()
    }

    fn best_value(&self) -> f64 {
        self.best().map_or(0.0, |(_, value)| value)
    }

    fn evaluations(&self) -> usize {
        self.evaluations
    }

    fn total_evaluations(&self) -> usize {
        self.total_evaluations
    }

    fn last_metrics(&self) -> &PlanMetrics {
        &self.metrics
    }
}
