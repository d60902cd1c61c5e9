use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use insight_core::bc::{
    default_checker_registry, detect_breaks, remove_matching, LookupCache, MemoryCache,
};
use insight_core::db::ProjectContext;
use insight_core::report::default_reporter_registry;

use crate::commands::{read_ignore_file, resolve_layout};

/// Detect backwards compatibility breaks between two synced projects.
///
/// The target project's config decides which checkers run and which
/// incidents are ignored; an extra rules file can extend the ignore list for
/// one run. The rendered report goes to stdout and the exit code stays zero
/// whether or not breaks were found.
#[allow(clippy::too_many_arguments)]
pub fn bc_command(
    working_dir: Option<&Path>,
    source_path: &str,
    target_path: &str,
    source_fork: Option<&str>,
    target_fork: Option<&str>,
    format: &str,
    ignore_file: Option<&Path>,
) -> Result<()> {
    let source_layout = resolve_layout(working_dir, source_path)?;
    let target_layout = resolve_layout(working_dir, target_path)?;
    let source = ProjectContext::open_existing(source_layout, source_fork)?;
    let target = ProjectContext::open_existing(target_layout, target_fork)?;

    let cache: Arc<dyn LookupCache> = Arc::new(MemoryCache::new());
    let registry = default_checker_registry(cache)?;
    let incidents = detect_breaks(&registry, &target.config.bc_checkers, &source.db, &target.db)?;

    let mut rules = target.config.bc_ignore.clone();
    if let Some(path) = ignore_file {
        rules.extend(read_ignore_file(path)?);
    }
    let incidents = remove_matching(incidents, &rules);

    let reporters = default_reporter_registry()?;
    let report = reporters.get(format)?.generate(&incidents)?;
    println!("{report}");

    Ok(())
}
