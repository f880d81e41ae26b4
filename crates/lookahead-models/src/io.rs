use std::{fs, path::Path};

use log::debug;

use crate::{CompiledModel, ModelError, ModelSpec};

/// Load a model spec from YAML on disk.
pub fn load_yaml(path: impl AsRef<Path>) -> Result<ModelSpec, ModelError> {
    let path = path.as_ref();
    let yaml = fs::read_to_string(path)?;
    let spec: ModelSpec = serde_yaml::from_str(&yaml)?;
    debug!("loaded model spec from {}", path.display());
    Ok(spec)
}

/// Load and compile a model from a YAML file.
pub fn compile_yaml(path: impl AsRef<Path>) -> Result<CompiledModel, ModelError> {
    let spec = load_yaml(path)?;
    spec.compile()
}

/// Serialize and write a model spec to YAML.
pub fn save_yaml(path: impl AsRef<Path>, spec: &ModelSpec) -> Result<(), ModelError> {
    let yaml = serde_yaml::to_string(spec)?;
    fs::write(path, yaml)?;
    Ok(())
}
