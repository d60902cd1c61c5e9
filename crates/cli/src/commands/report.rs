use std::path::Path;

use anyhow::Result;
use insight_core::db::{ProjectContext, StatisticEntry, SyncRunRecord};
use serde::Serialize;

use crate::commands::resolve_layout;

#[derive(Serialize)]
pub struct ReportSnapshot {
    pub knowledge_base: String,
    pub statistics: Vec<StatisticEntry>,
    pub last_sync: Option<SyncRunRecord>,
}

/// Show knowledge-base statistics for a synced project.
pub fn report_command(
    working_dir: Option<&Path>,
    path: &str,
    fork: Option<&str>,
    json: bool,
) -> Result<()> {
    let layout = resolve_layout(working_dir, path)?;
    let context = ProjectContext::open_existing(layout, fork)?;

    let statistics = context.db.statistics()?;
    let last_sync = context.db.latest_sync_run()?;

    if json {
        let snapshot = ReportSnapshot {
            knowledge_base: context.db_path.display().to_string(),
            statistics,
            last_sync,
        };
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    println!("Knowledge base: {}", context.db_path.display());
    println!();
    for entry in &statistics {
        println!("{:<22}{}", format!("{}:", entry.name), entry.count);
    }
    if let Some(run) = last_sync {
        println!();
        println!(
            "Last sync: {} .. {} ({} seen, {} changed, {} removed)",
            run.started_at, run.finished_at, run.files_seen, run.files_changed, run.files_removed
        );
    }

    Ok(())
}
