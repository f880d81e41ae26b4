//! The generative model every planner consumes.
//!
//! A model owns the problem definition: the fixed action count, the initial
//! state and a deterministic transition function. Planners receive it by value
//! at construction instead of reading process-wide globals.

use crate::tree::ids::ActionId;

/// Result of applying one action to one state.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition<S> {
    pub next: S,
    /// Reward for entering `next`, expected in `[0, 1]`.
    pub reward: f64,
    pub terminal: bool,
}

/// Deterministic simulator of a discrete-action control problem.
///
/// Copying a state is `Clone`, releasing it is `Drop`.
pub trait GenerativeModel {
    type State: Clone;

    /// Number of actions K available in every state. Fixed for the session.
    fn num_actions(&self) -> usize;

    /// Return the initial state of the problem.
    fn initial_state(&self) -> Self::State;

    /// Apply `action` to `state`. Must be total and deterministic.
    fn transition(&self, state: &Self::State, action: ActionId) -> Transition<Self::State>;
}

impl<M: GenerativeModel + ?Sized> GenerativeModel for &M {
    type State = M::State;

    fn num_actions(&self) -> usize {
        (**self).num_actions()
    }

    fn initial_state(&self) -> Self::State {
        (**self).initial_state()
    }

    fn transition(&self, state: &Self::State, action: ActionId) -> Transition<Self::State> {
        (**self).transition(state, action)
    }
}
