//! Breadth-first expansion: every open leaf at depth d is expanded before any
//! leaf at depth d + 1.

use std::collections::VecDeque;

use log::{debug, trace};

use crate::{
    config::PlannerConfig,
    model::GenerativeModel,
    planner::{ExpansionMetrics, PlanMetrics, Planner, best_leaf::BestLeaf},
    tree::{
        discount::DiscountTable,
        error::TreeError,
        ids::{ActionId, NodeId},
        search_tree::SearchTree,
    },
};

/// Uniform payload: best leaf of the subtree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformValue {
    pub best: BestLeaf,
}

/// Expands whole layers of the tree in creation order.
///
/// Terminal children and children at the depth ceiling are closed at creation
/// and never expanded, so layers are complete only over open nodes: with a
/// terminal-free model a budget of `K + K^2 + ... + K^d` builds exactly the
/// full K-ary tree of depth `d`, while terminal states leave closed leaves in
/// the shallower layers.
pub struct UniformPlanner<M: GenerativeModel> {
    model: M,
    discounts: DiscountTable,
    max_depth: usize,
    tree: SearchTree<M::State, UniformValue>,
    /// Open leaves of the shallowest unexpanded depth, in creation order.
    frontier: VecDeque<NodeId>,
    /// Open leaves one level deeper, created while draining `frontier`.
    next_frontier: Vec<NodeId>,
    evaluations: usize,
    total_evaluations: usize,
    metrics: PlanMetrics,
}

fn leaf_value(discounted_return: f64) -> UniformValue {
    UniformValue {
        best: BestLeaf::at_leaf(discounted_return),
    }
}

impl<M: GenerativeModel> UniformPlanner<M> {
    pub fn new(model: M, config: &PlannerConfig, initial_state: M::State) -> Self {
        let tree = SearchTree::new(initial_state, leaf_value(0.0));
        let frontier = VecDeque::from([tree.root_id()]);
        UniformPlanner {
            model,
            discounts: DiscountTable::new(config.gamma),
            max_depth: config.max_depth,
            tree,
            frontier,
            next_frontier: Vec::new(),
            evaluations: 0,
            total_evaluations: 0,
            metrics: PlanMetrics::default(),
        }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn tree(&self) -> &SearchTree<M::State, UniformValue> {
        &self.tree
    }

    pub fn into_model(self) -> M {
        self.model
    }

    /// Number of open leaves still waiting for expansion.
    pub fn pending(&self) -> usize {
        self.frontier.len() + self.next_frontier.len()
    }

    fn pop_frontier(&mut self) -> Option<NodeId> {
        if self.frontier.is_empty() {
            self.frontier.extend(self.next_frontier.drain(..));
        }
        self.frontier.pop_front()
    }

    fn expand_next(&mut self) -> Result<Option<ExpansionMetrics>, TreeError> {
        let Some(leaf) = self.pop_frontier() else {
            return Ok(None);
        };

        let depth = self.tree.node(leaf)?.depth();
        let children = self.tree.expand(
            leaf,
            &self.model,
            &mut self.discounts,
            self.max_depth,
            |_, discounted_return| leaf_value(discounted_return),
        )?;
        self.evaluations += children.len();
        self.total_evaluations += children.len();

        for &child in &children {
            if !self.tree.node(child)?.is_closed() {
                self.next_frontier.push(child);
            }
        }

        let path: Vec<NodeId> = std::iter::once(leaf)
            .chain(self.tree.ancestors(leaf))
            .collect();
        for node_id in path {
            self.refresh(node_id)?;
        }

        trace!("uniform: expanded node {} at depth {depth}", leaf.index());
        Ok(Some(ExpansionMetrics {
            depth,
            transitions: children.len(),
            best_value: self.best_value(),
        }))
    }

    fn refresh(&mut self, node_id: NodeId) -> Result<(), TreeError> {
        let mut summaries = Vec::new();
        let mut open = false;
        for (action, &child_id) in self.tree.node(node_id)?.children().iter().enumerate() {
            let child = self.tree.node(child_id)?;
            open |= !child.is_closed();
            summaries.push((ActionId::from(action), child_id, child.value().best));
        }

        let node = self.tree.node_mut(node_id)?;
        if let Some(best) = BestLeaf::over_children(summaries) {
            node.value_mut().best = best;
        }
        if !open {
            node.close();
        }
        Ok(())
    }

    /// Recompute summaries and the frontier for a re-based tree.
    fn rebuild(&mut self, order: &[NodeId]) -> Result<(), TreeError> {
        let mut open_leaves = Vec::new();
        for &node_id in order.iter().rev() {
            let node = self.tree.node_mut(node_id)?;
            if node.is_leaf() {
                let discounted_return = node.discounted_return();
                node.value_mut().best = BestLeaf::at_leaf(discounted_return);
                if !node.is_closed() {
                    open_leaves.push((node.depth(), node_id));
                }
            } else {
                self.refresh(node_id)?;
            }
        }

        // Reverse pre-order collected; restore left-to-right order per depth.
        open_leaves.reverse();
        open_leaves.sort_by_key(|&(depth, _)| depth);

        self.frontier.clear();
        self.next_frontier.clear();
        let shallowest = open_leaves.first().map(|&(depth, _)| depth);
        for (depth, node_id) in open_leaves {
            if Some(depth) == shallowest {
                self.frontier.push_back(node_id);
            } else {
                self.next_frontier.push(node_id);
            }
        }
        Ok(())
    }

    fn root_best(&self) -> Option<BestLeaf> {
        self.tree
            .node(self.tree.root_id())
            .ok()
            .map(|root| root.value().best)
    }
}

impl<M: GenerativeModel> Planner for UniformPlanner<M> {
    type State = M::State;

    fn reset_to(&mut self, state: &M::State) {
        self.tree = SearchTree::new(state.clone(), leaf_value(0.0));
        self.frontier = VecDeque::from([self.tree.root_id()]);
        self.next_frontier.clear();
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
        metrics.exhausted = self.pending() == 0;

        debug!(
            "uniform: budget {} used {} ({} expansions, {} pending), action {} value {:.6}",
            budget,
            metrics.evaluations,
            metrics.expansions,
            self.pending(),
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
            "uniform: retained {} nodes below action {}, {} leaves pending",
            self.evaluations,
            action.index(),
            self.pending()
        );
        Ok(())
    }

    fn max_observed_depth(&self) -> usize {
        self.tree.max_depth()
    }

    fn best_action(&self) -> ActionId {
        self.root_best()
            .and_then(|best| best.child)
            .unwrap_or_default()
    }

    fn best_value(&self) -> f64 {
        self.root_best().map_or(0.0, |best| best.value)
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
