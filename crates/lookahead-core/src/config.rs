use std::{fmt, fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::planner::PlannerKind;

const DEFAULT_PLANNER_CONFIG_YAML: &str = include_str!("../config/planner.default.yaml");

/// Planner configuration shared by every algorithm.
///
/// Planners take the values as given; only the YAML loaders validate them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub algorithm: PlannerKind,
    pub gamma: f64,
    /// Transition calls per decision, for drivers that call `plan(config.budget)`.
    pub budget: usize,
    /// Children created at this depth are closed.
    pub max_depth: usize,
    /// Scale of the UCT exploration term.
    pub exploration: f64,
    /// Drivers retain the chosen subtree instead of resetting between decisions.
    pub keep_subtree: bool,
    /// Random search seed; fresh entropy when absent.
    pub seed: Option<u64>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        PlannerConfig {
            algorithm: PlannerKind::Optimistic,
            gamma: 0.95,
            budget: 1000,
            max_depth: 32768,
            exploration: 1.0,
            keep_subtree: false,
            seed: None,
        }
    }
}

impl PlannerConfig {
    /// Parse a planner config from YAML text.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: PlannerConfig = serde_yaml::from_str(yaml).map_err(ConfigError::Yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a planner config from a YAML file path.
    pub fn from_yaml_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let yaml = fs::read_to_string(path).map_err(ConfigError::Io)?;
        Self::from_yaml_str(&yaml)
    }

    /// Return the default YAML config included with this crate.
    pub fn default_yaml() -> &'static str {
        DEFAULT_PLANNER_CONFIG_YAML
    }

    /// Parse the default YAML config included with this crate.
    pub fn from_default_yaml() -> Result<Self, ConfigError> {
        Self::from_yaml_str(Self::default_yaml())
    }

    pub fn with_algorithm(mut self, algorithm: PlannerKind) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.gamma = gamma;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !self.gamma.is_finite() || !(0.0..1.0).contains(&self.gamma) {
            return Err(ConfigError::Invalid(
                "gamma must be within [0, 1)".to_string(),
            ));
        }
        if self.budget == 0 {
            return Err(ConfigError::Invalid(
                "budget must be greater than 0".to_string(),
            ));
        }
        if self.max_depth == 0 {
            return Err(ConfigError::Invalid(
                "max_depth must be greater than 0".to_string(),
            ));
        }
        if !self.exploration.is_finite() || self.exploration < 0.0 {
            return Err(ConfigError::Invalid(
                "exploration must be finite and >= 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Error type for loading and validating `PlannerConfig`.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Yaml(serde_yaml::Error),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "failed to read config file: {err}"),
            ConfigError::Yaml(err) => write!(f, "failed to parse config YAML: {err}"),
            ConfigError::Invalid(err) => write!(f, "invalid planner config: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {}
