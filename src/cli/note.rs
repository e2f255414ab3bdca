//! Note CLI commands

use std::path::Path;

use anyhow::Result;
use clap::Subcommand;

use super::output::Output;
use crate::domain::TaskId;
use crate::storage::{Board, Project};

#[derive(Subcommand)]
pub enum NoteCommands {
    /// Add a note to a task
    Add {
        /// Task ID
        task: String,

        /// Note text
        content: String,

        /// Note author (defaults to TASKFLOW_AUTHOR or the configured author)
        #[arg(long)]
        author: Option<String>,
    },

    /// List a task's notes, oldest first
    List {
        /// Task ID
        task: String,
    },
}

pub fn run(cmd: NoteCommands, root: Option<&Path>, output: &Output) -> Result<()> {
    let project = Project::discover(root)?;
    let board = Board::new(&project);

    match cmd {
        NoteCommands::Add {
            task,
            content,
            author,
        } => {
            let task_id: TaskId = task.parse()?;
            let note = board.add_note(&task_id, &content, author.as_deref())?;

            if output.is_json() {
                output.data(&note);
            } else {
                output.success(&format!("Added note {} to task {}", note.id, note.task_id));
            }
        }
        NoteCommands::List { task } => {
            let task_id: TaskId = task.parse()?;
            board.get_task(&task_id)?;
            let notes = board.notes_for(&task_id)?;

            if output.is_json() {
                output.data(&notes);
            } else if notes.is_empty() {
                println!("No notes for {}.", task_id);
            } else {
                for note in notes {
                    println!(
                        "{} [{}] {}: {}",
                        note.id,
                        note.created_at.format("%Y-%m-%d %H:%M"),
                        note.author,
                        note.content
                    );
                }
            }
        }
    }

    Ok(())
}
