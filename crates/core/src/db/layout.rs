use std::env;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

/// Environment variable overriding where knowledge bases are kept.
pub const WORKING_DIR_ENV: &str = "CODE_INSIGHT_HOME";

/// File name of the main knowledge base inside a project's database folder.
pub const DB_FILE_NAME: &str = "code_insight.sqlite";

/// Logical layout of the knowledge bases belonging to one project.
///
/// All paths are derived from the working directory and the project root.
/// It does *not* perform any IO itself; the CLI and the helpers in
/// [`crate::db::util`] are responsible for creating directories and copying
/// fork files based on this layout.
#[derive(Debug, Clone)]
pub struct DatabaseLayout {
    /// Tool-wide working directory (`$CODE_INSIGHT_HOME` or `~/.code-insight`).
    pub working_dir: PathBuf,
    /// Root directory of the analyzed project.
    pub project_root: PathBuf,
    /// Per-project folder under `<working_dir>/databases`.
    pub project_dir: PathBuf,
    /// Path of the main knowledge base file.
    pub db_path: PathBuf,
}

impl DatabaseLayout {
    /// Compute the layout for `project_root` under an explicit working
    /// directory.
    ///
    /// The per-project folder name combines a sanitized project name with a
    /// digest of the full root path, so two projects with the same directory
    /// name never share a knowledge base.
    pub fn new(working_dir: impl AsRef<Path>, project_root: impl AsRef<Path>) -> Self {
        let working_dir = working_dir.as_ref().to_path_buf();
        let project_root = project_root.as_ref().to_path_buf();
        let folder = format!("{}-{}", sanitized_name(&project_root), path_digest(&project_root));
        let project_dir = working_dir.join("databases").join(folder);
        let db_path = project_dir.join(DB_FILE_NAME);

        Self { working_dir, project_root, project_dir, db_path }
    }

    /// Compute the layout for `project_root` under the default working
    /// directory.
    pub fn for_project(project_root: impl AsRef<Path>) -> Self {
        Self::new(default_working_dir(), project_root)
    }

    /// Path of a named fork of the main knowledge base.
    pub fn fork_db_path(&self, fork: &str) -> PathBuf {
        self.project_dir.join(format!("code_insight-{fork}.sqlite"))
    }
}

/// Resolve the working directory: `$CODE_INSIGHT_HOME` when set and
/// non-empty, otherwise `.code-insight` under the user's home directory.
pub fn default_working_dir() -> PathBuf {
    if let Ok(dir) = env::var(WORKING_DIR_ENV) {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }
    dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".code-insight")
}

fn sanitized_name(root: &Path) -> String {
    let name = match root.file_name() {
        Some(name) => name.to_string_lossy().to_string(),
        None => String::from("project"),
    };
    let slug: String = name
        .chars()
        .map(|ch| if ch.is_ascii_alphanumeric() { ch.to_ascii_lowercase() } else { '-' })
        .collect();
    let slug = slug.trim_matches('-').to_string();
    if slug.is_empty() {
        String::from("project")
    } else {
        slug
    }
}

fn path_digest(root: &Path) -> String {
    let digest = Sha256::digest(root.to_string_lossy().as_bytes());
    let hex = format!("{digest:x}");
    hex[..12].to_string()
}
