use std::collections::HashMap;

use log::debug;
use lookahead_core::{ActionId, GenerativeModel, Transition};

use crate::{ModelError, ModelSpec};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Dense index for states in a compiled model.
pub struct StateKey(usize);

impl StateKey {
    /// Return the underlying state index.
    pub fn index(self) -> usize {
        self.0
    }
}

impl From<usize> for StateKey {
    fn from(value: usize) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone)]
/// Runtime form of a deterministic model with resolved state and action ids.
pub struct CompiledModel {
    start: StateKey,
    states: Vec<StateRec>,
    state_ids: Vec<String>,
    state_id_to_key: HashMap<String, StateKey>,
    action_names: Vec<String>,
}

#[derive(Debug, Clone)]
struct StateRec {
    terminal: bool,
    /// Indexed by action id; empty for terminal states.
    transitions: Vec<TransitionRec>,
}

#[derive(Debug, Clone, Copy)]
struct TransitionRec {
    next: StateKey,
    reward: f64,
}

impl CompiledModel {
    /// Compile and validate a spec into a dense runtime representation.
    pub(crate) fn from_spec(spec: &ModelSpec) -> Result<Self, ModelError> {
        spec.validate()?;

        let mut state_id_to_key = HashMap::with_capacity(spec.states.len());
        let mut state_ids = Vec::with_capacity(spec.states.len());
        for (idx, state) in spec.states.iter().enumerate() {
            state_id_to_key.insert(state.id.clone(), StateKey::from(idx));
            state_ids.push(state.id.clone());
        }

        let start = state_id_to_key.get(&spec.start).copied().ok_or_else(|| {
            ModelError::UnknownStartState {
                start: spec.start.clone(),
            }
        })?;

        let mut states = Vec::with_capacity(spec.states.len());
        for state in &spec.states {
            let terminal = state.terminal.unwrap_or(false);
            let declared = state.transitions.as_deref().unwrap_or(&[]);

            let mut transitions = Vec::with_capacity(if terminal { 0 } else { spec.actions.len() });
            if !terminal {
                for action in &spec.actions {
                    let transition = declared
                        .iter()
                        .find(|transition| &transition.action == action)
                        .ok_or_else(|| ModelError::MissingTransition {
                            state: state.id.clone(),
                            action: action.clone(),
                        })?;
                    let next = state_id_to_key.get(&transition.next).copied().ok_or_else(|| {
                        ModelError::UnknownNextState {
                            state: state.id.clone(),
                            action: action.clone(),
                            next: transition.next.clone(),
                        }
                    })?;
                    transitions.push(TransitionRec {
                        next,
                        reward: transition.reward,
                    });
                }
            }

            states.push(StateRec {
                terminal,
                transitions,
            });
        }

        debug!(
            "compiled model: {} states, {} actions, start '{}'",
            states.len(),
            spec.actions.len(),
            spec.start
        );

        Ok(Self {
            start,
            states,
            state_ids,
            state_id_to_key,
            action_names: spec.actions.clone(),
        })
    }

    /// Return the start state key.
    pub fn start(&self) -> StateKey {
        self.start
    }

    /// Return the number of compiled states.
    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// Return the number of actions, shared by every state.
    pub fn action_count(&self) -> usize {
        self.action_names.len()
    }

    /// Check whether a state is terminal.
    pub fn is_terminal(&self, key: StateKey) -> Option<bool> {
        self.states.get(key.index()).map(|state| state.terminal)
    }

    /// Convert a state key back to its original string id.
    pub fn state_id(&self, key: StateKey) -> Option<&str> {
        self.state_ids.get(key.index()).map(String::as_str)
    }

    /// Convert a string id into a compiled state key.
    pub fn state_key(&self, id: &str) -> Option<StateKey> {
        self.state_id_to_key.get(id).copied()
    }

    /// Name of an action id.
    pub fn action_name(&self, action: ActionId) -> Option<&str> {
        self.action_names.get(action.index()).map(String::as_str)
    }

    /// Action id of a named action.
    pub fn action_id(&self, name: &str) -> Option<ActionId> {
        self.action_names
            .iter()
            .position(|action| action == name)
            .map(ActionId::from)
    }

    /// Look up one transition. Terminal states loop on themselves with reward 0.
    /// `None` when the state or action is out of range.
    pub fn step(&self, key: StateKey, action: ActionId) -> Option<Transition<StateKey>> {
        let state = self.states.get(key.index())?;
        if action.index() >= self.action_names.len() {
            return None;
        }
        if state.terminal {
            return Some(Transition {
                next: key,
                reward: 0.0,
                terminal: true,
            });
        }

        let transition = state.transitions.get(action.index())?;
        let terminal = self.states.get(transition.next.index())?.terminal;
        Some(Transition {
            next: transition.next,
            reward: transition.reward,
            terminal,
        })
    }
}

impl GenerativeModel for CompiledModel {
    type State = StateKey;

    fn num_actions(&self) -> usize {
        self.action_count()
    }

    fn initial_state(&self) -> StateKey {
        self.start
    }

    /// Keys not produced by this model behave like terminal states.
    fn transition(&self, state: &StateKey, action: ActionId) -> Transition<StateKey> {
        self.step(*state, action).unwrap_or(Transition {
            next: *state,
            reward: 0.0,
            terminal: true,
        })
    }
}
