//! UCB1-driven tree expansion.
//!
//! Each step descends from the root, picking at every internal node the open
//! child maximising
//! `best_return(child) + C(depth) * sqrt(ln(visits(node)) / visits(child))`
//! with `C(depth) = exploration * gamma^depth / (1 - gamma)`, then expands
//! the leaf it reaches.

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

/// UCT payload: visitation count and best leaf of the subtree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UctValue {
    /// Starts at 1; every expansion at or below the node adds K.
    pub visits: u64,
    pub best: BestLeaf,
}

pub struct UctPlanner<M: GenerativeModel> {
    model: M,
    discounts: DiscountTable,
    max_depth: usize,
    exploration: f64,
    tree: SearchTree<M::State, UctValue>,
    evaluations: usize,
    total_evaluations: usize,
    metrics: PlanMetrics,
}

fn leaf_value(discounted_return: f64) -> UctValue {
    UctValue {
        visits: 1,
        best: BestLeaf::at_leaf(discounted_return),
    }
}

impl<M: GenerativeModel> UctPlanner<M> {
    pub fn new(model: M, config: &PlannerConfig, initial_state: M::State) -> Self {
        UctPlanner {
            model,
            discounts: DiscountTable::new(config.gamma),
            max_depth: config.max_depth,
            exploration: config.exploration,
            tree: SearchTree::new(initial_state, leaf_value(0.0)),
            evaluations: 0,
            total_evaluations: 0,
            metrics: PlanMetrics::default(),
        }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn tree(&self) -> &SearchTree<M::State, UctValue> {
        &self.tree
    }

    pub fn into_model(self) -> M {
        self.model
    }

    /// Descend from the root with the UCB1 rule; `None` once the root is closed.
    pub fn select_leaf(&mut self) -> Result<Option<NodeId>, TreeError> {
        let mut current = self.tree.root_id();
        loop {
            let (depth, visits) = {
                let node = self.tree.node(current)?;
                if node.is_closed() {
                    return Ok(None);
                }
                if node.is_leaf() {
                    return Ok(Some(current));
                }
                (node.depth(), node.value().visits)
            };

            let c = self.exploration * self.discounts.tail_bound(depth);
            let log_visits = (visits as f64).ln();

            let mut selected: Option<(NodeId, f64)> = None;
            for &child_id in self.tree.node(current)?.children() {
                let child = self.tree.node(child_id)?;
                if child.is_closed() {
                    continue;
                }
                let value = child.value();
                let score = value.best.value + c * (log_visits / value.visits as f64).sqrt();
                if selected.is_none_or(|(_, best_score)| score > best_score) {
                    selected = Some((child_id, score));
                }
            }

            match selected {
                Some((child_id, _)) => current = child_id,
                None => return Ok(None),
            }
        }
    }

    fn expand_next(&mut self) -> Result<Option<ExpansionMetrics>, TreeError> {
        let Some(leaf) = self.select_leaf()? else {
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
        let added = children.len();
        self.evaluations += added;
        self.total_evaluations += added;

        let path: Vec<NodeId> = std::iter::once(leaf)
            .chain(self.tree.ancestors(leaf))
            .collect();
        for node_id in path {
            self.refresh(node_id, added as u64)?;
        }

        trace!("uct: expanded node {} at depth {depth}", leaf.index());
        Ok(Some(ExpansionMetrics {
            depth,
            transitions: added,
            best_value: self.best_value(),
        }))
    }

    /// Add `added_visits` and recompute best leaf and closure from the children.
    fn refresh(&mut self, node_id: NodeId, added_visits: u64) -> Result<(), TreeError> {
        let mut summaries = Vec::new();
        let mut open = false;
        for (action, &child_id) in self.tree.node(node_id)?.children().iter().enumerate() {
            let child = self.tree.node(child_id)?;
            open |= !child.is_closed();
            summaries.push((ActionId::from(action), child_id, child.value().best));
        }

        let node = self.tree.node_mut(node_id)?;
        let value = node.value_mut();
        value.visits += added_visits;
        if let Some(best) = BestLeaf::over_children(summaries) {
            value.best = best;
        }
        if !open {
            node.close();
        }
        Ok(())
    }

    fn rebuild(&mut self, order: &[NodeId]) -> Result<(), TreeError> {
        for &node_id in order.iter().rev() {
            let node = self.tree.node_mut(node_id)?;
            if node.is_leaf() {
                let discounted_return = node.discounted_return();
                node.value_mut().best = BestLeaf::at_leaf(discounted_return);
            } else {
                self.refresh(node_id, 0)?;
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

impl<M: GenerativeModel> Planner for UctPlanner<M> {
    type State = M::State;

    fn reset_to(&mut self, state: &M::State) {
        self.tree = SearchTree::new(state.clone(), leaf_value(0.0));
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
            "uct: budget {} used {} ({} expansions), action {} value {:.6}",
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
            "uct: retained {} nodes below action {}",
            self.evaluations,
            action.index()
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
