use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::db::{
    knowledge_base_path, load_project_config, open_existing_knowledge_base,
    open_fork_knowledge_base, open_knowledge_base, DatabaseLayout, KnowledgeBaseDb, ProjectConfig,
};

/// Convenience wrapper bundling layout, config, db path, and an open
/// knowledge base for one project (main or fork).
#[derive(Debug)]
pub struct ProjectContext {
    pub layout: DatabaseLayout,
    pub config: ProjectConfig,
    pub db_path: PathBuf,
    pub db: KnowledgeBaseDb,
}

impl ProjectContext {
    /// Load project config and open the main knowledge base for a given
    /// project root.
    pub fn from_root(root: impl AsRef<Path>) -> Result<Self> {
        Self::from_root_fork(root, None)
    }

    /// Load project config and open the knowledge base for a given project
    /// root, targeting a fork when one is named.
    pub fn from_root_fork(root: impl AsRef<Path>, fork: Option<&str>) -> Result<Self> {
        Self::from_layout(DatabaseLayout::for_project(root.as_ref()), fork)
    }

    /// Like [`Self::from_root_fork`] but for an already-computed layout,
    /// creating the knowledge base when it does not exist yet.
    pub fn from_layout(layout: DatabaseLayout, fork: Option<&str>) -> Result<Self> {
        let config = load_project_config(&layout.project_root)?;
        let db_path = knowledge_base_path(&layout, fork)?;
        let db = match fork {
            None => open_knowledge_base(&layout)?,
            Some(fork) => open_fork_knowledge_base(&layout, fork)?,
        };
        Ok(Self { layout, config, db_path, db })
    }

    /// Like [`Self::from_layout`] but failing when the project has never
    /// been synced, for commands that only read.
    pub fn open_existing(layout: DatabaseLayout, fork: Option<&str>) -> Result<Self> {
        let config = load_project_config(&layout.project_root)?;
        let db_path = knowledge_base_path(&layout, fork)?;
        let db = open_existing_knowledge_base(&layout, fork)?;
        Ok(Self { layout, config, db_path, db })
    }
}
