use std::path::Path;

use anyhow::{bail, Result};
use insight_core::db::{save_project_config, ProjectConfig, PROJECT_CONFIG_FILE};

use crate::canonicalize_or_current;
use crate::commands::resolve_layout;

/// Write a starter project config at `path`.
pub fn init_command(working_dir: Option<&Path>, path: &str) -> Result<()> {
    let root_path = canonicalize_or_current(path)?;
    let config_path = root_path.join(PROJECT_CONFIG_FILE);
    if config_path.exists() {
        bail!("Project config already exists at {}", config_path.display());
    }

    let config = ProjectConfig::new();
    save_project_config(&root_path, &config)?;
    let layout = resolve_layout(working_dir, path)?;

    println!("Initialized Code Insight project:");
    println!("  Root: {}", root_path.display());
    println!("  Config: {}", config_path.display());
    println!("  Reflection dump: {}", config.reflection_dump);
    println!("  Checkers: {}", config.bc_checkers.join(", "));
    println!("  Knowledge base: {}", layout.db_path.display());

    Ok(())
}
