//! Task CLI commands

use std::path::Path;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Subcommand};

use super::output::Output;
use crate::domain::{Priority, Task, TaskFields, TaskId, TaskStatus};
use crate::storage::{Board, Project, TaskDetails, TaskFilter};

#[derive(Subcommand)]
pub enum TaskCommands {
    /// Add a task
    ///
    /// Examples:
    ///   taskflow task add "Fix typo"
    ///   taskflow task add "Build API" --priority high --assignee alice
    Add {
        /// Task title
        title: String,

        #[command(flatten)]
        fields: FieldArgs,
    },

    /// List tasks, newest first
    List {
        /// Only tasks with this status
        #[arg(long)]
        status: Option<TaskStatus>,

        /// Only tasks assigned to this person
        #[arg(long)]
        assignee: Option<String>,
    },

    /// Show task details with notes and dependencies
    Show {
        /// Task ID
        id: String,
    },

    /// Update task fields; omitted fields keep their value
    Update {
        /// Task ID
        id: String,

        /// New title
        #[arg(long)]
        title: Option<String>,

        #[command(flatten)]
        fields: FieldArgs,
    },

    /// Move a task to another status column
    Move {
        /// Task ID
        id: String,

        /// Target status (todo, in_progress, review, done)
        status: TaskStatus,
    },

    /// Delete a task with its notes and dependencies
    Delete {
        /// Task ID
        id: String,
    },
}

/// Optional task fields shared by `add` and `update`
#[derive(Args, Debug)]
pub struct FieldArgs {
    /// Longer description
    #[arg(long)]
    description: Option<String>,

    /// Status (todo, in_progress, review, done)
    #[arg(long)]
    status: Option<TaskStatus>,

    /// Priority (low, medium, high, urgent)
    #[arg(long)]
    priority: Option<Priority>,

    /// Person working on the task
    #[arg(long)]
    assignee: Option<String>,

    /// Progress percentage (0-100)
    #[arg(long)]
    progress: Option<u8>,

    /// Due date (YYYY-MM-DD)
    #[arg(long = "due")]
    due_date: Option<NaiveDate>,

    /// Estimated effort in hours
    #[arg(long)]
    estimated_hours: Option<f64>,

    /// Hours spent so far
    #[arg(long)]
    actual_hours: Option<f64>,
}

impl FieldArgs {
    fn into_fields(self, title: Option<String>) -> TaskFields {
        TaskFields {
            title,
            description: self.description,
            status: self.status,
            priority: self.priority,
            assignee: self.assignee,
            progress: self.progress,
            due_date: self.due_date,
            estimated_hours: self.estimated_hours,
            actual_hours: self.actual_hours,
        }
    }
}

pub fn run(cmd: TaskCommands, root: Option<&Path>, output: &Output) -> Result<()> {
    let project = Project::discover(root)?;
    let board = Board::new(&project);

    match cmd {
        TaskCommands::Add { title, fields } => {
            add_task(&board, output, fields.into_fields(Some(title)))
        }
        TaskCommands::List { status, assignee } => {
            list_tasks(&board, output, &TaskFilter { status, assignee })
        }
        TaskCommands::Show { id } => show_task(&board, output, &id.parse::<TaskId>()?),
        TaskCommands::Update { id, title, fields } => {
            update_task(&board, output, &id.parse::<TaskId>()?, fields.into_fields(title))
        }
        TaskCommands::Move { id, status } => {
            move_task(&board, output, &id.parse::<TaskId>()?, status)
        }
        TaskCommands::Delete { id } => delete_task(&board, output, &id.parse::<TaskId>()?),
    }
}

fn add_task(board: &Board, output: &Output, fields: TaskFields) -> Result<()> {
    let task = board.create_task(fields)?;

    if output.is_json() {
        output.data(&task);
    } else {
        output.success(&format!("Created task {}: {}", task.id, task.title));
    }

    Ok(())
}

fn list_tasks(board: &Board, output: &Output, filter: &TaskFilter) -> Result<()> {
    let tasks = board.list_tasks(filter)?;

    if output.is_json() {
        output.data(&tasks);
        return Ok(());
    }

    if tasks.is_empty() {
        println!("No tasks found.");
        return Ok(());
    }

    print_task_table(&tasks);
    Ok(())
}

fn print_task_table(tasks: &[Task]) {
    println!(
        "{:<10} {:<12} {:<8} {:<4} {:<14} TITLE",
        "ID", "STATUS", "PRIORITY", "%", "ASSIGNEE"
    );
    println!("{}", "-".repeat(80));
    for task in tasks {
        println!(
            "{:<10} {:<12} {:<8} {:<4} {:<14} {}",
            task.id,
            task.status,
            task.priority,
            task.progress,
            task.assignee().unwrap_or("-"),
            task.title
        );
    }
}

fn show_task(board: &Board, output: &Output, id: &TaskId) -> Result<()> {
    let details = board.task_details(id)?;

    if output.is_json() {
        output.data(&details);
    } else {
        print_details(&details, output);
    }

    Ok(())
}

fn print_details(details: &TaskDetails, output: &Output) {
    let task = &details.task;

    println!("Task: {}", task.id);
    println!("Title: {}", task.title);
    println!("Status: {}", task.status);
    println!("Priority: {}", task.priority);
    println!("Assignee: {}", task.assignee().unwrap_or("-"));
    println!("Progress: {}%", task.progress);
    if let Some(due) = task.due_date {
        println!("Due: {}", due);
    }
    if let Some(hours) = task.estimated_hours {
        println!("Estimated: {}h", hours);
    }
    if let Some(hours) = task.actual_hours {
        println!("Actual: {}h", hours);
    }
    println!("Created: {}", task.created_at.format("%Y-%m-%d %H:%M"));
    println!("Updated: {}", task.updated_at.format("%Y-%m-%d %H:%M"));

    if !task.description.is_empty() {
        output.blank();
        println!("{}", task.description);
    }

    if !details.dependencies.is_empty() {
        output.blank();
        println!("Depends on:");
        for link in &details.dependencies {
            println!(
                "  {} {} ({}) [{}]",
                link.dependency.depends_on_task_id,
                link.depends_on_title.as_deref().unwrap_or("<deleted>"),
                link.dependency.dep_type,
                link.dependency.id
            );
        }
    }

    if !details.blockers.is_empty() {
        output.blank();
        println!("Blocks:");
        for link in &details.blockers {
            println!(
                "  {} {}",
                link.dependency.task_id,
                link.blocking_title.as_deref().unwrap_or("<deleted>")
            );
        }
    }

    if !details.notes.is_empty() {
        output.blank();
        println!("Notes:");
        for note in &details.notes {
            println!(
                "  [{}] {}: {}",
                note.created_at.format("%Y-%m-%d %H:%M"),
                note.author,
                note.content
            );
        }
    }
}

fn update_task(board: &Board, output: &Output, id: &TaskId, fields: TaskFields) -> Result<()> {
    let task = board.update_task(id, fields)?;

    if output.is_json() {
        output.data(&task);
    } else {
        output.success(&format!("Updated task {}", task.id));
    }

    Ok(())
}

fn move_task(board: &Board, output: &Output, id: &TaskId, status: TaskStatus) -> Result<()> {
    let task = board.move_task(id, status)?;

    if output.is_json() {
        output.data(&task);
    } else {
        output.success(&format!("Moved task {} to {}", task.id, task.status.label()));
    }

    Ok(())
}

fn delete_task(board: &Board, output: &Output, id: &TaskId) -> Result<()> {
    let deleted = board.delete_task(id)?;

    if output.is_json() {
        output.data(&deleted);
    } else {
        output.success(&format!(
            "Deleted task {} ({} notes, {} dependencies removed)",
            deleted.task.id, deleted.notes_removed, deleted.dependencies_removed
        ));
    }

    Ok(())
}
