use std::path::Path;

use anyhow::Result;
use insight_core::db::list_forks;

use crate::commands::resolve_layout;

/// List fork knowledge bases of a project.
pub fn forks_command(working_dir: Option<&Path>, path: &str) -> Result<()> {
    let layout = resolve_layout(working_dir, path)?;
    let forks = list_forks(&layout)?;

    println!("Forks ({}):", forks.len());
    if forks.is_empty() {
        println!("  (none)");
        return Ok(());
    }
    for fork in forks {
        println!("  - {fork}");
    }

    Ok(())
}
