//! Anytime lookahead planning for deterministic, discrete-action control
//! problems with discounted rewards in `[0, 1]`.
//!
//! A [`GenerativeModel`] supplies transitions. A [`Planner`] spends a budget of
//! transition calls building a search below the current state and recommends
//! one action. Four expansion policies are provided: [`OptimisticPlanner`],
//! [`UctPlanner`], [`UniformPlanner`] and [`RandomSearchPlanner`].

mod config;
mod model;
mod planner;
mod tree;

#[cfg(test)]
mod testing;

pub use config::{ConfigError, PlannerConfig};
pub use model::{GenerativeModel, Transition};
pub use planner::{
    BestLeaf, ExpansionMetrics, OpenLeaf, OptimisticPlanner, OptimisticValue, PlanMetrics,
    Planner, PlannerKind, RandomSearchPlanner, UctPlanner, UctValue, UniformPlanner, UniformValue,
    build_planner,
};
pub use tree::discount::DiscountTable;
pub use tree::error::TreeError;
pub use tree::ids::{ActionId, NodeId};
pub use tree::node::Node;
pub use tree::search_tree::{Ancestors, SearchTree};
pub use tree::snapshot::{NodeSnapshot, TreeSnapshot};
