use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{CompiledModel, ModelError};

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Serializable deterministic model used for YAML IO and validation.
pub struct ModelSpec {
    /// Schema version for future compatibility checks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    /// String id of the start state.
    pub start: String,
    /// Action names, shared by every state. Their order fixes the action ids.
    pub actions: Vec<String>,
    /// All state declarations in the model.
    pub states: Vec<StateSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// A single state declaration.
pub struct StateSpec {
    /// Unique state id.
    pub id: String,
    /// Whether this state is terminal (defaults to `false` if omitted).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terminal: Option<bool>,
    /// One transition per action; must be empty for terminal states.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transitions: Option<Vec<TransitionSpec>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// The deterministic effect of one action in one state.
pub struct TransitionSpec {
    pub action: String,
    pub next: String,
    pub reward: f64,
}

impl ModelSpec {
    /// Validate ids, action coverage, and reward range.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.start.trim().is_empty() {
            return Err(ModelError::MissingStart);
        }

        if self.actions.is_empty() {
            return Err(ModelError::NoActions);
        }
        let mut action_names = HashSet::with_capacity(self.actions.len());
        for action in &self.actions {
            if !action_names.insert(action.as_str()) {
                return Err(ModelError::DuplicateActionName {
                    action: action.clone(),
                });
            }
        }

        let mut state_ids = HashSet::with_capacity(self.states.len());
        for state in &self.states {
            if !state_ids.insert(state.id.as_str()) {
                return Err(ModelError::DuplicateStateId {
                    id: state.id.clone(),
                });
            }
        }

        if !state_ids.contains(self.start.as_str()) {
            return Err(ModelError::UnknownStartState {
                start: self.start.clone(),
            });
        }

        for state in &self.states {
            let terminal = state.terminal.unwrap_or(false);
            let transitions = state.transitions.as_deref().unwrap_or(&[]);

            if terminal {
                if !transitions.is_empty() {
                    return Err(ModelError::TerminalStateHasTransitions {
                        state: state.id.clone(),
                    });
                }
                continue;
            }

            let mut covered = HashSet::with_capacity(transitions.len());
            for transition in transitions {
                if !action_names.contains(transition.action.as_str()) {
                    return Err(ModelError::UnknownAction {
                        state: state.id.clone(),
                        action: transition.action.clone(),
                    });
                }

                if !covered.insert(transition.action.as_str()) {
                    return Err(ModelError::DuplicateTransition {
                        state: state.id.clone(),
                        action: transition.action.clone(),
                    });
                }

                if !state_ids.contains(transition.next.as_str()) {
                    return Err(ModelError::UnknownNextState {
                        state: state.id.clone(),
                        action: transition.action.clone(),
                        next: transition.next.clone(),
                    });
                }

                if !transition.reward.is_finite() || !(0.0..=1.0).contains(&transition.reward) {
                    return Err(ModelError::InvalidReward {
                        state: state.id.clone(),
                        action: transition.action.clone(),
                        value: transition.reward,
                    });
                }
            }

            // Transitions must be total: every action is defined in every live state.
            if let Some(missing) = self
                .actions
                .iter()
                .find(|action| !covered.contains(action.as_str()))
            {
                return Err(ModelError::MissingTransition {
                    state: state.id.clone(),
                    action: missing.clone(),
                });
            }
        }

        Ok(())
    }

    /// Compile this spec into the runtime representation.
    pub fn compile(&self) -> Result<CompiledModel, ModelError> {
        CompiledModel::from_spec(self)
    }
}
