use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use insight_core::bc::IgnoreRule;
use insight_core::db::DatabaseLayout;

use crate::canonicalize_or_current;

/// Compute the database layout for a project path, honoring an explicit
/// working directory when one was given on the command line.
pub fn resolve_layout(working_dir: Option<&Path>, root: &str) -> Result<DatabaseLayout> {
    let root_path = canonicalize_or_current(root)?;
    Ok(match working_dir {
        Some(dir) => DatabaseLayout::new(dir, &root_path),
        None => DatabaseLayout::for_project(&root_path),
    })
}

/// Load extra ignore rules from a JSON or YAML file (decided by extension).
pub fn read_ignore_file(path: &Path) -> Result<Vec<IgnoreRule>> {
    let body = fs::read_to_string(path)
        .with_context(|| format!("Failed to read ignore rules at {}", path.display()))?;
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
    let rules = if matches!(ext, "yaml" | "yml") {
        serde_yaml::from_str(&body)
            .with_context(|| format!("Failed to parse YAML ignore rules at {}", path.display()))?
    } else {
        serde_json::from_str(&body)
            .with_context(|| format!("Failed to parse JSON ignore rules at {}", path.display()))?
    };
    Ok(rules)
}
