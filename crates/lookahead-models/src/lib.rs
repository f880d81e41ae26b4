//! Deterministic tabular models for `lookahead-core`, declared in YAML or
//! built in code, validated, and compiled into a [`GenerativeModel`].
//!
//! [`GenerativeModel`]: lookahead_core::GenerativeModel

mod builder;
mod compiled;
mod error;
mod io;
mod spec;

pub use builder::ModelBuilder;
pub use compiled::{CompiledModel, StateKey};
pub use error::ModelError;
pub use io::{compile_yaml, load_yaml, save_yaml};
pub use spec::{ModelSpec, StateSpec, TransitionSpec};
