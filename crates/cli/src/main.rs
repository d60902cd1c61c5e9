use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use code_insight::commands;

/// Knowledge-base-driven backwards-compatibility analyzer CLI.
///
/// This CLI is a thin wrapper around `insight-core` (exposed in code as
/// `insight_core`). All substantive logic lives in the library so it can be
/// tested thoroughly and reused from other frontends.
#[derive(Parser, Debug)]
#[command(
    name = "code-insight",
    version,
    about = "Knowledge-base-driven backwards-compatibility analyzer",
    long_about = None
)]
struct Cli {
    /// Directory holding the knowledge bases. Defaults to $CODE_INSIGHT_HOME,
    /// then ~/.code-insight.
    #[arg(long, global = true)]
    working_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a starter `.code-insight.json` for a project.
    Init {
        /// Project root directory.
        #[arg(default_value = ".")]
        path: String,
    },

    /// Load a project's reflection dump into its knowledge base.
    Sync {
        /// Project root directory (where `.code-insight.json` is located).
        #[arg(default_value = ".")]
        path: String,

        /// Sync into a named fork of the knowledge base instead of the main
        /// one. The fork is seeded from the main database on first use.
        #[arg(long)]
        fork: Option<String>,

        /// Reflection dump to load; defaults to the configured location
        /// inside the project root.
        #[arg(long)]
        dump: Option<PathBuf>,
    },

    /// Detect backwards compatibility breaks between two project versions.
    Bc {
        /// Source project root (the older version).
        source_path: String,

        /// Target project root (the newer version).
        #[arg(default_value = ".")]
        target_path: String,

        /// Source project fork name.
        #[arg(long)]
        source_fork: Option<String>,

        /// Target project fork name.
        #[arg(long)]
        target_fork: Option<String>,

        /// Report format: text, html or json.
        #[arg(long, default_value = "text")]
        format: String,

        /// Extra ignore rules file (JSON, or YAML by extension).
        #[arg(long)]
        ignore_file: Option<PathBuf>,
    },

    /// Show knowledge-base statistics for a project.
    Report {
        /// Project root directory.
        #[arg(default_value = ".")]
        path: String,

        /// Read a named fork instead of the main knowledge base.
        #[arg(long)]
        fork: Option<String>,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// List fork knowledge bases of a project.
    Forks {
        /// Project root directory.
        #[arg(default_value = ".")]
        path: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let working_dir = cli.working_dir.as_deref();

    match cli.command {
        Command::Init { path } => commands::init_command(working_dir, &path)?,
        Command::Sync { path, fork, dump } => {
            commands::sync_command(working_dir, &path, fork.as_deref(), dump.as_deref())?
        }
        Command::Bc {
            source_path,
            target_path,
            source_fork,
            target_fork,
            format,
            ignore_file,
        } => commands::bc_command(
            working_dir,
            &source_path,
            &target_path,
            source_fork.as_deref(),
            target_fork.as_deref(),
            &format,
            ignore_file.as_deref(),
        )?,
        Command::Report { path, fork, json } => {
            commands::report_command(working_dir, &path, fork.as_deref(), json)?
        }
        Command::Forks { path } => commands::forks_command(working_dir, &path)?,
    }

    Ok(())
}
