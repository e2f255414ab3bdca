//! Dependency CLI commands

use std::path::Path;

use anyhow::Result;
use clap::Subcommand;

use super::output::Output;
use crate::domain::{DependencyId, DependencyType, TaskId};
use crate::storage::{Board, Project};

#[derive(Subcommand)]
pub enum DepCommands {
    /// Record that a task depends on another
    ///
    /// Examples:
    ///   taskflow dep add t-1a2b3c4 t-5d6e7f8
    ///   taskflow dep add t-1a2b3c4 t-5d6e7f8 --type related
    Add {
        /// Dependent task
        task: String,

        /// Task it depends on
        depends_on: String,

        /// Relationship (blocks, related, duplicates)
        #[arg(long = "type", default_value = "blocks")]
        dep_type: DependencyType,
    },

    /// Remove a dependency by its ID
    Remove {
        /// Dependency ID
        id: String,
    },
}

pub fn run(cmd: DepCommands, root: Option<&Path>, output: &Output) -> Result<()> {
    let project = Project::discover(root)?;
    let board = Board::new(&project);

    match cmd {
        DepCommands::Add {
            task,
            depends_on,
            dep_type,
        } => {
            let task_id: TaskId = task.parse()?;
            let depends_on: TaskId = depends_on.parse()?;
            let linked = board.add_dependency(&task_id, &depends_on, dep_type)?;

            if output.is_json() {
                output.data(&linked);
            } else {
                output.success(&format!(
                    "Added dependency {}: {} -> {} ({})",
                    linked.dependency.id, task_id, depends_on, dep_type
                ));
            }
        }
        DepCommands::Remove { id } => {
            let id: DependencyId = id.parse()?;
            let removed = board.remove_dependency(&id)?;

            if output.is_json() {
                output.data(&removed);
            } else {
                output.success(&format!(
                    "Removed dependency {}: {} -> {}",
                    removed.id, removed.task_id, removed.depends_on_task_id
                ));
            }
        }
    }

    Ok(())
}
