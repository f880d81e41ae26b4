//! Optimistic planning for deterministic systems.
//!
//! Every leaf carries the bound `discounted_return + gamma^depth / (1 - gamma)`,
//! an upper limit on any return reachable through it when rewards lie in
//! `[0, 1]`. Each step opens the open leaf with the largest bound in the whole
//! tree. Internal nodes cache which leaf holds their subtree's maximum, so one
//! expansion only refreshes the path back to the root.
//!
//! The recommendation comes from a separate incumbent: the leaf with the best
//! discounted return seen so far.

use log::{debug, trace};

use crate::{
    config::PlannerConfig,
    model::GenerativeModel,
    planner::{ExpansionMetrics, PlanMetrics, Planner},
    tree::{
        discount::DiscountTable,
        error::TreeError,
        ids::{ActionId, NodeId},
        search_tree::SearchTree,
    },
};

/// The open leaf holding a subtree's largest bound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpenLeaf {
    /// Child of the caching node that leads to the leaf.
    pub action: ActionId,
    pub leaf: NodeId,
    pub bound: f64,
}

/// Optimistic payload: leaves hold their bound, internal nodes point at the
/// best open leaf below them (`None` once the subtree is closed).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OptimisticValue {
    Leaf { bound: f64 },
    Internal { best: Option<OpenLeaf> },
}

impl OptimisticValue {
    /// Largest bound still open at or below this node.
    pub fn bound(&self) -> Option<f64> {
        match self {
            OptimisticValue::Leaf { bound } => Some(*bound),
            OptimisticValue::Internal { best } => best.map(|open| open.bound),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Incumbent {
    leaf: NodeId,
    action: ActionId,
    value: f64,
}

/// Expands the globally most optimistic leaf until the budget is spent or the
/// root closes.
pub struct OptimisticPlanner<M: GenerativeModel> {
    model: M,
    discounts: DiscountTable,
    max_depth: usize,
    tree: SearchTree<M::State, OptimisticValue>,
    incumbent: Option<Incumbent>,
    evaluations: usize,
    total_evaluations: usize,
    metrics: PlanMetrics,
}

impl<M: GenerativeModel> OptimisticPlanner<M> {
    pub fn new(model: M, config: &PlannerConfig, initial_state: M::State) -> Self {
        let mut discounts = DiscountTable::new(config.gamma);
        let tree = Self::fresh_tree(initial_state, &mut discounts);
        OptimisticPlanner {
            model,
            discounts,
            max_depth: config.max_depth,
            tree,
            incumbent: None,
            evaluations: 0,
            total_evaluations: 0,
            metrics: PlanMetrics::default(),
        }
    }

    fn fresh_tree(
        state: M::State,
        discounts: &mut DiscountTable,
    ) -> SearchTree<M::State, OptimisticValue> {
        SearchTree::new(
            state,
            OptimisticValue::Leaf {
                bound: discounts.tail_bound(0),
            },
        )
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn tree(&self) -> &SearchTree<M::State, OptimisticValue> {
        &self.tree
    }

    pub fn into_model(self) -> M {
        self.model
    }

    /// The open leaf with the largest bound, if the root is still open.
    pub fn next_leaf(&self) -> Result<Option<NodeId>, TreeError> {
        let root_id = self.tree.root_id();
        let root = self.tree.node(root_id)?;
        if root.is_closed() {
            return Ok(None);
        }
        Ok(match root.value() {
            OptimisticValue::Leaf { .. } => Some(root_id),
            OptimisticValue::Internal { best } => best.map(|open| open.leaf),
        })
    }

    fn expand_next(&mut self) -> Result<Option<ExpansionMetrics>, TreeError> {
        let Some(leaf) = self.next_leaf()? else {
            return Ok(None);
        };

        let depth = self.tree.node(leaf)?.depth();
        let tail = self.discounts.tail_bound(depth + 1);
        let children = self.tree.expand(
            leaf,
            &self.model,
            &mut self.discounts,
            self.max_depth,
            |_, discounted_return| OptimisticValue::Leaf {
                bound: discounted_return + tail,
            },
        )?;
        self.evaluations += children.len();
        self.total_evaluations += children.len();

        // The expanded leaf is no longer a candidate; its children compete.
        if self.incumbent.is_some_and(|incumbent| incumbent.leaf == leaf) {
            self.incumbent = None;
        }
        let first = self.tree.first_action(leaf)?;
        for (action, &child) in children.iter().enumerate() {
            let value = self.tree.node(child)?.discounted_return();
            if self.incumbent.is_none_or(|incumbent| value > incumbent.value) {
                self.incumbent = Some(Incumbent {
                    leaf: child,
                    action: first.unwrap_or(ActionId::from(action)),
                    value,
                });
            }
        }

        let path: Vec<NodeId> = std::iter::once(leaf)
            .chain(self.tree.ancestors(leaf))
            .collect();
        for node_id in path {
            self.refresh(node_id)?;
        }

        trace!("optimistic: expanded node {} at depth {depth}", leaf.index());
        Ok(Some(ExpansionMetrics {
            depth,
            transitions: children.len(),
            best_value: self.best_value(),
        }))
    }

    /// Recompute an internal node's cached max-bound leaf and closed flag from
    /// its children.
    fn refresh(&mut self, node_id: NodeId) -> Result<(), TreeError> {
        let mut best: Option<OpenLeaf> = None;
        for (action, &child_id) in self.tree.node(node_id)?.children().iter().enumerate() {
            let child = self.tree.node(child_id)?;
            if child.is_closed() {
                continue;
            }
            let candidate = match *child.value() {
                OptimisticValue::Leaf { bound } => OpenLeaf {
                    action: ActionId::from(action),
                    leaf: child_id,
                    bound,
                },
                OptimisticValue::Internal { best: Some(open) } => OpenLeaf {
                    action: ActionId::from(action),
                    leaf: open.leaf,
                    bound: open.bound,
                },
                OptimisticValue::Internal { best: None } => continue,
            };
            if best.is_none_or(|current| candidate.bound > current.bound) {
                best = Some(candidate);
            }
        }

        let node = self.tree.node_mut(node_id)?;
        *node.value_mut() = OptimisticValue::Internal { best };
        if best.is_none() {
            node.close();
        }
        Ok(())
    }

    /// Recompute bounds, cached leaves and the incumbent for a re-based tree.
    fn rebuild(&mut self, order: &[NodeId]) -> Result<(), TreeError> {
        let root_id = self.tree.root_id();
        let mut best: Option<(NodeId, f64)> = None;

        for &node_id in order.iter().rev() {
            let (is_leaf, depth, discounted_return) = {
                let node = self.tree.node(node_id)?;
                (node.is_leaf(), node.depth(), node.discounted_return())
            };
            if !is_leaf {
                self.refresh(node_id)?;
                continue;
            }

            let bound = discounted_return + self.discounts.tail_bound(depth);
            *self.tree.node_mut(node_id)?.value_mut() = OptimisticValue::Leaf { bound };
            // Reverse pre-order: `>=` lets the leftmost leaf win ties.
            if node_id != root_id && best.is_none_or(|(_, value)| discounted_return >= value) {
                best = Some((node_id, discounted_return));
            }
        }

        self.incumbent = match best {
            Some((leaf, value)) => Some(Incumbent {
                leaf,
                action: self.tree.first_action(leaf)?.unwrap_or_default(),
                value,
            }),
            None => None,
        };
        Ok(())
    }
}

impl<M: GenerativeModel> Planner for OptimisticPlanner<M> {
    type State = M::State;

    fn reset_to(&mut self, state: &M::State) {
        self.tree = Self::fresh_tree(state.clone(), &mut self.discounts);
        self.incumbent = None;
        self.evaluations = 0;
        self.metrics = PlanMetrics::default();
    }

    fn plan_with_hook(
        &mut self,
        budget: usize,
        on_expansion: &mut dyn FnMut(&ExpansionMetrics),
    ) -> Result<ActionId, TreeError> {
        let mut metrics = PlanMetrics::new(budget);

        while self.evaluations < budget {
            let Some(step) = self.expand_next()? else {
                break;
            };
            on_expansion(&step);
            metrics.record(&step);
        }

        metrics.evaluations = self.evaluations;
        metrics.action = self.best_action();
        metrics.best_value = self.best_value();
        metrics.exhausted = self.tree.node(self.tree.root_id())?.is_closed();

        debug!(
            "optimistic: budget {} used {} ({} expansions), action {} value {:.6}",
            budget,
            metrics.evaluations,
            metrics.expansions,
            metrics.action.index(),
            metrics.best_value
        );

        let action = metrics.action;
        self.metrics = metrics;
        Ok(action)
    }

    fn retain_subtree(&mut self) -> Result<(), TreeError> {
        if self.tree.node(self.tree.root_id())?.is_leaf() {
            return Ok(());
        }

        let action = self.best_action();
        let order = self.tree.reroot(action, &mut self.discounts)?;
        self.evaluations = order.len() - 1;
        self.rebuild(&order)?;

        debug!(
            "optimistic: retained {} nodes below action {}",
            self.evaluations,
            action.index()
        );
        Ok(())
    }

    fn max_observed_depth(&self) -> usize {
        self.tree.max_depth()
    }

    fn best_action(&self) -> ActionId {
        self.incumbent
            .map(|incumbent| incumbent.action)
            .unwrap_or_default()
    }

    fn best_value(&self) -> f64 {
        self.incumbent.map_or(0.0, |incumbent| incumbent.value)
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
