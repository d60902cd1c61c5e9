use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::db::{DatabaseLayout, KnowledgeBaseDb, ProjectConfig, PROJECT_CONFIG_FILE};

/// Load the project config JSON from the project root.
pub fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
    let config_path = project_root.join(PROJECT_CONFIG_FILE);
    let config_json = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read project config at {}", config_path.display()))?;
    let config: ProjectConfig =
        serde_json::from_str(&config_json).context("Failed to parse project config JSON")?;
    Ok(config)
}

/// Write the project config JSON to the project root.
pub fn save_project_config(project_root: &Path, config: &ProjectConfig) -> Result<()> {
    let config_path = project_root.join(PROJECT_CONFIG_FILE);
    let config_json =
        serde_json::to_string_pretty(config).context("Failed to serialize project config")?;
    fs::write(&config_path, config_json)
        .with_context(|| format!("Failed to write project config at {}", config_path.display()))?;
    Ok(())
}

/// Open (creating directories as needed) the project's main knowledge base.
pub fn open_knowledge_base(layout: &DatabaseLayout) -> Result<KnowledgeBaseDb> {
    fs::create_dir_all(&layout.project_dir).with_context(|| {
        format!("Failed to create database directory {}", layout.project_dir.display())
    })?;
    let db = KnowledgeBaseDb::open(&layout.db_path).with_context(|| {
        format!("Failed to open knowledge base at {}", layout.db_path.display())
    })?;
    Ok(db)
}

/// Open a named fork of the project's knowledge base.
///
/// On first use the fork is seeded with a copy of the main knowledge base,
/// so it starts out identical and diverges from there.
pub fn open_fork_knowledge_base(layout: &DatabaseLayout, fork: &str) -> Result<KnowledgeBaseDb> {
    validate_fork_name(fork)?;
    let fork_path = layout.fork_db_path(fork);
    if !fork_path.exists() {
        if !layout.db_path.exists() {
            bail!(
                "No knowledge base to fork from; run `sync` first (expected {})",
                layout.db_path.display()
            );
        }
        fs::copy(&layout.db_path, &fork_path).with_context(|| {
            format!("Failed to seed fork {} from {}", fork_path.display(), layout.db_path.display())
        })?;
    }
    let db = KnowledgeBaseDb::open(&fork_path)
        .with_context(|| format!("Failed to open fork knowledge base at {}", fork_path.display()))?;
    Ok(db)
}

/// Open the main knowledge base or a named fork, failing when the project
/// has never been synced. Forks are still seeded from the main database on
/// first use; only the main database itself has to exist already.
pub fn open_existing_knowledge_base(
    layout: &DatabaseLayout,
    fork: Option<&str>,
) -> Result<KnowledgeBaseDb> {
    match fork {
        Some(fork) => open_fork_knowledge_base(layout, fork),
        None => {
            if !layout.db_path.exists() {
                bail!(
                    "No knowledge base at {}; run `sync` first",
                    layout.db_path.display()
                );
            }
            open_knowledge_base(layout)
        }
    }
}

/// List the fork names present in the project's database folder.
pub fn list_forks(layout: &DatabaseLayout) -> Result<Vec<String>> {
    let mut forks = Vec::new();
    if !layout.project_dir.exists() {
        return Ok(forks);
    }
    for entry in fs::read_dir(&layout.project_dir).with_context(|| {
        format!("Failed to read database directory {}", layout.project_dir.display())
    })? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_string();
        if let Some(fork) = name
            .strip_prefix("code_insight-")
            .and_then(|rest| rest.strip_suffix(".sqlite"))
        {
            forks.push(fork.to_string());
        }
    }
    forks.sort();
    Ok(forks)
}

/// Resolve the knowledge base path for an optional fork name.
pub fn knowledge_base_path(layout: &DatabaseLayout, fork: Option<&str>) -> Result<PathBuf> {
    match fork {
        None => Ok(layout.db_path.clone()),
        Some(fork) => {
            validate_fork_name(fork)?;
            Ok(layout.fork_db_path(fork))
        }
    }
}

/// Fork names become file names, so keep them to a safe character set.
fn validate_fork_name(fork: &str) -> Result<()> {
    let valid = !fork.is_empty()
        && fork.chars().all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.'));
    if !valid {
        bail!("Invalid fork name {fork:?}; use letters, digits, '-', '_' or '.'");
    }
    Ok(())
}
