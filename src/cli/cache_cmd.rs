//! Cache CLI commands

use std::collections::HashMap;
use std::path::Path;

use anyhow::Result;
use clap::Subcommand;

use super::output::Output;
use crate::domain::TaskStatus;
use crate::storage::Project;

#[derive(Subcommand)]
pub enum CacheCommands {
    /// Rebuild the cache from source files
    Rebuild,

    /// Show cache status
    Status,
}

pub fn run(cmd: CacheCommands, root: Option<&Path>, output: &Output) -> Result<()> {
    let project = Project::discover(root)?;

    match cmd {
        CacheCommands::Rebuild => rebuild(&project, output),
        CacheCommands::Status => status(&project, output),
    }
}

fn rebuild(project: &Project, output: &Output) -> Result<()> {
    log::debug!("Rebuilding cache from source files");

    let start = std::time::Instant::now();
    let cache = project.rebuild_cache()?;
    let duration = start.elapsed();

    let rows: HashMap<&str, usize> = cache.row_counts()?.into_iter().collect();
    let count = |table: &str| rows.get(table).copied().unwrap_or(0);

    if output.is_json() {
        output.data(&serde_json::json!({
            "rebuilt": true,
            "duration_ms": duration.as_millis(),
            "tables": rows,
        }));
    } else {
        output.success(&format!(
            "Cache rebuilt in {:?} ({} tasks, {} notes, {} dependencies, {} activity entries)",
            duration,
            count("tasks"),
            count("notes"),
            count("dependencies"),
            count("activity_log")
        ));
    }

    Ok(())
}

fn status(project: &Project, output: &Output) -> Result<()> {
    let cache = project.cache()?;

    let is_stale = cache.is_stale()?;
    let cache_path = cache.path().to_path_buf();
    let counts = cache.task_counts()?;
    let total: usize = counts.values().sum();
    let rows = cache.row_counts()?;

    if output.is_json() {
        let by_status: HashMap<&str, usize> = TaskStatus::ALL
            .iter()
            .map(|s| (s.as_str(), counts.get(s).copied().unwrap_or(0)))
            .collect();
        let tables: HashMap<&str, usize> = rows.into_iter().collect();

        output.data(&serde_json::json!({
            "path": cache_path.display().to_string(),
            "stale": is_stale,
            "tasks": {
                "total": total,
                "by_status": by_status,
            },
            "tables": tables,
        }));
    } else {
        println!("Cache Status");
        println!("{}", "=".repeat(40));
        println!("Path: {}", cache_path.display());
        println!(
            "Status: {}",
            if is_stale {
                "STALE (needs rebuild)"
            } else {
                "fresh"
            }
        );
        println!();
        println!("Cached Tasks: {}", total);
        for status in TaskStatus::ALL {
            println!(
                "  {:<12} {}",
                status.label(),
                counts.get(&status).copied().unwrap_or(0)
            );
        }
        println!();
        println!("Rows:");
        for (table, count) in rows {
            println!("  {:<12} {}", table, count);
        }

        if is_stale {
            println!();
            println!("Run 'taskflow cache rebuild' to update the cache.");
        }
    }

    Ok(())
}
