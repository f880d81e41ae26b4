use thiserror::Error;

#[derive(Debug, Error)]
/// Error type for model loading, validation, compilation, and builder operations.
pub enum ModelError {
    #[error("failed to read YAML file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("missing start state")]
    MissingStart,

    #[error("start state '{start}' does not exist")]
    UnknownStartState { start: String },

    #[error("model declares no actions")]
    NoActions,

    #[error("duplicate action name '{action}'")]
    DuplicateActionName { action: String },

    #[error("duplicate state id '{id}'")]
    DuplicateStateId { id: String },

    #[error("state '{state}' is terminal and cannot declare transitions")]
    TerminalStateHasTransitions { state: String },

    #[error("state '{state}' declares a transition for unknown action '{action}'")]
    UnknownAction { state: String, action: String },

    #[error("state '{state}' declares action '{action}' more than once")]
    DuplicateTransition { state: String, action: String },

    #[error("state '{state}' has no transition for action '{action}'")]
    MissingTransition { state: String, action: String },

    #[error("transition from state '{state}' under action '{action}' references unknown next state '{next}'")]
    UnknownNextState {
        state: String,
        action: String,
        next: String,
    },

    #[error("reward in state '{state}', action '{action}' must lie in [0, 1], got {value}")]
    InvalidReward {
        state: String,
        action: String,
        value: f64,
    },

    #[error("builder referenced unknown state '{state}'")]
    BuilderUnknownState { state: String },

    #[error("builder referenced unknown action '{action}'")]
    BuilderUnknownAction { action: String },
}
