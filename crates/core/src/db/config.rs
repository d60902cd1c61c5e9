use serde::{Deserialize, Serialize};

use crate::bc::filter::IgnoreRule;

/// File name of the per-project configuration, stored in the project root.
pub const PROJECT_CONFIG_FILE: &str = ".code-insight.json";

/// Serializable per-project configuration.
///
/// This lives at `.code-insight.json` in the analyzed project's root and
/// travels with the project (e.g. under version control), unlike the
/// knowledge bases which live in the working directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Config format version, not the analyzed project's version.
    pub config_version: String,
    /// Reflection dump consumed by `sync`, relative to the project root.
    #[serde(default = "default_reflection_dump")]
    pub reflection_dump: String,
    /// Compatibility checkers to run, by registry name.
    #[serde(default = "default_bc_checkers")]
    pub bc_checkers: Vec<String>,
    /// Known incidents to drop from future reports.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bc_ignore: Vec<IgnoreRule>,
}

impl ProjectConfig {
    pub fn new() -> Self {
        Self {
            config_version: "1.0".to_string(),
            reflection_dump: default_reflection_dump(),
            bc_checkers: default_bc_checkers(),
            bc_ignore: Vec::new(),
        }
    }
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn default_reflection_dump() -> String {
    "reflection.json".to_string()
}

fn default_bc_checkers() -> Vec<String> {
    vec!["class".to_string(), "function".to_string(), "constant".to_string()]
}
