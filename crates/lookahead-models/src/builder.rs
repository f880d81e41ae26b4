use crate::{CompiledModel, ModelError, ModelSpec, StateSpec, TransitionSpec};

#[derive(Debug, Clone, Default)]
/// Struct to build deterministic models in code
pub struct ModelBuilder {
    start: Option<String>,
    actions: Vec<String>,
    states: Vec<StateSpec>,
}

impl ModelBuilder {
    /// Create a new ModelBuilder
    pub fn new() -> Self {
        Self::default()
    }

    /// Define the start state of the model
    pub fn set_start(&mut self, state: impl Into<String>) -> &mut Self {
        self.start = Some(state.into());
        self
    }

    /// Declare the next action; ids follow declaration order
    pub fn add_action(&mut self, name: impl Into<String>) -> &mut Self {
        self.actions.push(name.into());
        self
    }

    /// Add a new state
    pub fn add_state(&mut self, id: impl Into<String>, terminal: bool) -> &mut Self {
        self.states.push(StateSpec {
            id: id.into(),
            terminal: Some(terminal),
            transitions: Some(Vec::new()),
        });
        self
    }

    /// Define what `action` does in `state_id`
    pub fn add_transition(
        &mut self,
        state_id: impl AsRef<str>,
        action: impl AsRef<str>,
        next: impl Into<String>,
        reward: f64,
    ) -> Result<&mut Self, ModelError> {
        let state_id = state_id.as_ref();
        let action = action.as_ref();

        if !self.actions.iter().any(|name| name == action) {
            return Err(ModelError::BuilderUnknownAction {
                action: action.to_string(),
            });
        }

        let state = self
            .states
            .iter_mut()
            .find(|s| s.id == state_id)
            .ok_or_else(|| ModelError::BuilderUnknownState {
                state: state_id.to_string(),
            })?;

        state
            .transitions
            .get_or_insert_with(Vec::new)
            .push(TransitionSpec {
                action: action.to_string(),
                next: next.into(),
                reward,
            });

        Ok(self)
    }

    pub fn build_spec(self) -> Result<ModelSpec, ModelError> {
        let start = self.start.ok_or(ModelError::MissingStart)?;
        let spec = ModelSpec {
            version: Some(1),
            start,
            actions: self.actions,
            states: self.states,
        };
        spec.validate()?;
        Ok(spec)
    }

    pub fn compile(self) -> Result<CompiledModel, ModelError> {
        let spec = self.build_spec()?;
        spec.compile()
    }
}
