//! Board views: columns, activity, conflicts and stats
//!
//! Activity and conflict views read dependency edges through the SQLite
//! cache, rebuilding it when the JSONL files have changed.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use super::output::Output;
use crate::domain::{ConflictReport, Priority, Snapshot, TaskStatus};
use crate::storage::{Board, Project};

/// Show tasks grouped by status column
pub fn board(root: Option<&Path>, output: &Output) -> Result<()> {
    let project = Project::discover(root)?;
    let columns = Board::new(&project).columns()?;

    if output.is_json() {
        output.data(&columns);
        return Ok(());
    }

    for (i, column) in columns.iter().enumerate() {
        if i > 0 {
            output.blank();
        }
        println!("{} ({})", column.label, column.tasks.len());
        println!("{}", "-".repeat(40));
        for task in &column.tasks {
            let id = task.id.to_string();
            let assignee = task.assignee().map(|a| format!("@{}", a)).unwrap_or_default();
            output.row(&[&id, task.priority.as_str(), &task.title, &assignee]);
        }
    }

    Ok(())
}

/// Show recent activity, newest first
pub fn activity(root: Option<&Path>, limit: Option<usize>, output: &Output) -> Result<()> {
    let project = Project::discover(root)?;
    let entries = Board::new(&project).activity(limit)?;

    if output.is_json() {
        output.data(&entries);
    } else if entries.is_empty() {
        println!("No activity yet.");
    } else {
        for view in entries {
            let entry = &view.entry;
            let task = match (&entry.task_id, &view.task_title) {
                (Some(id), Some(title)) => format!(" [{} {}]", id, title),
                (Some(id), None) => format!(" [{}]", id),
                (None, _) => String::new(),
            };
            println!(
                "{} {:<16} {}{} ({})",
                entry.created_at.format("%Y-%m-%d %H:%M:%S"),
                entry.action,
                entry.details,
                task,
                view.user
            );
        }
    }

    Ok(())
}

/// Report conflicts on the current project
pub fn conflicts(root: Option<&Path>, output: &Output) -> Result<()> {
    let project = Project::discover(root)?;
    let report = Board::new(&project).conflicts()?;

    print_report(&report, output);
    Ok(())
}

/// Report conflicts on a JSON snapshot file, no project needed
pub fn snapshot_conflicts(path: &Path, output: &Output) -> Result<()> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot: {}", path.display()))?;
    let snapshot: Snapshot = serde_json::from_str(&content)
        .with_context(|| format!("Invalid snapshot: {}", path.display()))?;
    log::debug!(
        "Snapshot has {} tasks and {} dependencies",
        snapshot.tasks.len(),
        snapshot.dependencies.len()
    );

    print_report(&snapshot.analyze(), output);
    Ok(())
}

fn print_report(report: &ConflictReport, output: &Output) {
    if output.is_json() {
        output.data(report);
        return;
    }

    if report.is_empty() {
        println!("No conflicts found.");
        return;
    }

    if !report.blocking.is_empty() {
        println!("Blocking conflicts ({}):", report.blocking.len());
        for c in &report.blocking {
            println!(
                "  {} \"{}\" [{}] depends on {} \"{}\" [{}]",
                c.dependent_id,
                c.dependent_title,
                c.dependent_status,
                c.blocker_id,
                c.blocker_title,
                c.blocker_status
            );
        }
    }

    if !report.overload.is_empty() {
        if !report.blocking.is_empty() {
            output.blank();
        }
        println!("Overloaded assignees ({}):", report.overload.len());
        for c in &report.overload {
            let ids: Vec<String> = c.tasks.iter().map(ToString::to_string).collect();
            println!("  {}: {} open tasks ({})", c.assignee, c.count, ids.join(", "));
        }
    }
}

/// Show board statistics
pub fn stats(root: Option<&Path>, output: &Output) -> Result<()> {
    let project = Project::discover(root)?;
    let stats = Board::new(&project).stats()?;

    if output.is_json() {
        output.data(&stats);
        return Ok(());
    }

    println!("Board Statistics");
    println!("{}", "=".repeat(40));
    println!("Tasks: {}", stats.total);
    println!("Completion: {:.1}%", stats.completion_rate);
    println!("Average progress: {:.1}%", stats.avg_progress);
    output.blank();
    println!("By status:");
    for status in TaskStatus::ALL {
        println!("  {:<12} {}", status.label(), stats.status_count(status));
    }
    output.blank();
    println!("By priority:");
    for priority in Priority::ALL {
        println!("  {:<12} {}", priority, stats.priority_count(priority));
    }

    Ok(())
}
