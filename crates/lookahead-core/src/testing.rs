//! Small deterministic models shared by the unit tests.

use std::cell::Cell;

use crate::{
    model::{GenerativeModel, Transition},
    tree::ids::ActionId,
};

pub(crate) fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Never terminates; action `a` always pays `rewards[a]`. State is the depth.
pub(crate) struct FixedRewards {
    pub rewards: Vec<f64>,
}

impl GenerativeModel for FixedRewards {
    type State = usize;

    fn num_actions(&self) -> usize {
        self.rewards.len()
    }

    fn initial_state(&self) -> usize {
        0
    }

    fn transition(&self, state: &usize, action: ActionId) -> Transition<usize> {
        Transition {
            next: state + 1,
            reward: self.rewards[action.index()],
            terminal: false,
        }
    }
}

/// Pseudo-random but deterministic rewards keyed by the whole action path.
pub(crate) struct HashedRewards {
    pub actions: usize,
    pub salt: u64,
    /// A successor is terminal when its key is divisible by this; 0 disables.
    pub terminal_every: u64,
}

impl HashedRewards {
    pub fn new(actions: usize, salt: u64) -> Self {
        HashedRewards {
            actions,
            salt,
            terminal_every: 0,
        }
    }
}

impl GenerativeModel for HashedRewards {
    type State = u64;

    fn num_actions(&self) -> usize {
        self.actions
    }

    fn initial_state(&self) -> u64 {
        self.salt
    }

    fn transition(&self, state: &u64, action: ActionId) -> Transition<u64> {
        let next = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(action.index() as u64 + 1442695040888963407);
        let reward = ((next >> 33) % 1000) as f64 / 999.0;
        let terminal = self.terminal_every != 0 && (next >> 17) % self.terminal_every == 0;
        Transition {
            next,
            reward,
            terminal,
        }
    }
}

/// Counts every transition call made through it.
pub(crate) struct Counting<M> {
    pub inner: M,
    pub calls: Cell<usize>,
}

impl<M> Counting<M> {
    pub fn new(inner: M) -> Self {
        Counting {
            inner,
            calls: Cell::new(0),
        }
    }
}

impl<M: GenerativeModel> GenerativeModel for Counting<M> {
    type State = M::State;

    fn num_actions(&self) -> usize {
        self.inner.num_actions()
    }

    fn initial_state(&self) -> M::State {
        self.inner.initial_state()
    }

    fn transition(&self, state: &M::State, action: ActionId) -> Transition<M::State> {
        self.calls.set(self.calls.get() + 1);
        self.inner.transition(state, action)
    }
}
