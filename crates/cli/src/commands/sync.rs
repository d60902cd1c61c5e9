use std::path::Path;

use anyhow::Result;
use insight_core::db::ProjectContext;
use insight_core::sync::{read_dump_file, refresh};

use crate::commands::resolve_layout;

/// Load the project's reflection dump into its knowledge base.
pub fn sync_command(
    working_dir: Option<&Path>,
    path: &str,
    fork: Option<&str>,
    dump: Option<&Path>,
) -> Result<()> {
    let layout = resolve_layout(working_dir, path)?;
    let context = ProjectContext::from_layout(layout, fork)?;

    let dump_path = match dump {
        Some(path) => path.to_path_buf(),
        None => {
            // The configured dump location is relative to the project root.
            let configured = Path::new(&context.config.reflection_dump);
            if configured.is_absolute() {
                configured.to_path_buf()
            } else {
                context.layout.project_root.join(configured)
            }
        }
    };

    let dump = read_dump_file(&dump_path)?;
    let summary = refresh(&context.db, &dump)?;

    println!("Synchronized {}", dump_path.display());
    println!("  Knowledge base: {}", context.db_path.display());
    println!("  Files seen:     {}", summary.files_seen);
    println!("  Files changed:  {}", summary.files_changed);
    println!("  Files removed:  {}", summary.files_removed);

    Ok(())
}
