//! Declarative configuration: the pile forest and workflow bindings.
//!
//! Loaded from a TOML file; the reconciler re-reads it on every tick so pile
//! additions and removals take effect without a restart. Workflow bindings
//! are read once at startup.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::PileConfig;
use crate::workflow::WorkflowBinding;

/// The whole declarative configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HearthConfig {
    #[serde(default)]
    pub piles: Vec<PileConfig>,
    #[serde(default)]
    pub workflows: Vec<WorkflowBinding>,
}

/// Load and parse the configuration file.
pub fn load_config(path: &Path) -> Result<HearthConfig> {
    let data = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&data)?)
}
