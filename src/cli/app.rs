//! Main CLI application structure

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use super::output::{Output, OutputFormat};
use super::{cache_cmd, dep, note, task, view};
use crate::storage::{Config, Project};

#[derive(Parser)]
#[command(name = "taskflow")]
#[command(author, version, about = "Local-first kanban board with dependency conflict reports")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the global config, then text)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Project root (defaults to the nearest directory containing .taskflow)
    #[arg(long, short = 'p', global = true, env = "TASKFLOW_PROJECT")]
    pub project: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new taskflow project
    Init {
        /// Path to initialize (defaults to --project, then the current directory)
        path: Option<PathBuf>,
    },

    /// Manage tasks
    #[command(subcommand)]
    Task(task::TaskCommands),

    /// Manage task notes
    #[command(subcommand)]
    Note(note::NoteCommands),

    /// Manage dependencies between tasks
    #[command(subcommand)]
    Dep(dep::DepCommands),

    /// Show tasks grouped by status column
    Board,

    /// Show recent activity, newest first
    Activity {
        /// Maximum number of entries (defaults to the project setting)
        #[arg(long, short = 'n')]
        limit: Option<usize>,
    },

    /// Report blocking and overload conflicts
    Conflicts {
        /// Analyze a JSON snapshot of tasks and dependencies instead of a project
        #[arg(long)]
        snapshot: Option<PathBuf>,
    },

    /// Show board statistics
    Stats,

    /// Manage the SQLite cache
    #[command(subcommand)]
    Cache(cache_cmd::CacheCommands),
}

/// Run the CLI application
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let output = Output::new(resolve_format(cli.format));
    let project = cli.project.as_deref();

    match cli.command {
        Commands::Init { path } => {
            let path = path
                .or_else(|| project.map(PathBuf::from))
                .unwrap_or_else(|| PathBuf::from("."));
            let project = Project::init(&path)?;
            output.success(&format!(
                "Initialized taskflow project at {}",
                project.root().display()
            ));
        }

        Commands::Task(cmd) => task::run(cmd, project, &output)?,
        Commands::Note(cmd) => note::run(cmd, project, &output)?,
        Commands::Dep(cmd) => dep::run(cmd, project, &output)?,

        Commands::Board => view::board(project, &output)?,
        Commands::Activity { limit } => view::activity(project, limit, &output)?,
        Commands::Conflicts { snapshot } => match snapshot {
            Some(path) => view::snapshot_conflicts(&path, &output)?,
            None => view::conflicts(project, &output)?,
        },
        Commands::Stats => view::stats(project, &output)?,

        Commands::Cache(cmd) => cache_cmd::run(cmd, project, &output)?,
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

/// An explicit `--format` wins over the global config
fn resolve_format(flag: Option<OutputFormat>) -> OutputFormat {
    if let Some(format) = flag {
        return format;
    }

    match Config::load_global() {
        Ok(global) => global.default_format.into(),
        Err(e) => {
            log::warn!("Ignoring global config: {:#}", e);
            OutputFormat::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn explicit_format_wins() {
        assert_eq!(resolve_format(Some(OutputFormat::Json)), OutputFormat::Json);
    }

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "taskflow", "conflicts", "--format", "json", "--project", "/tmp/board",
        ])
        .unwrap();

        assert_eq!(cli.format, Some(OutputFormat::Json));
        assert_eq!(cli.project, Some(PathBuf::from("/tmp/board")));
        assert!(matches!(cli.command, Commands::Conflicts { snapshot: None }));
    }

    #[test]
    fn parses_task_add_fields() {
        let cli = Cli::try_parse_from([
            "taskflow", "task", "add", "Write docs", "--priority", "high", "--due", "2026-03-01",
        ])
        .unwrap();

        assert!(matches!(cli.command, Commands::Task(_)));
    }

    #[test]
    fn rejects_unknown_status() {
        let result = Cli::try_parse_from(["taskflow", "task", "move", "t-1234567", "blocked"]);
        assert!(result.is_err());
    }
}
