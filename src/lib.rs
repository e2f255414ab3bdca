//! TaskFlow - A local-first kanban task board
//!
//! Tasks live in a `.taskflow/` directory as JSONL files, with notes,
//! dependency edges and an append-only activity log next to them. On top of
//! the board sits a conflict report: `blocks` edges in a conflicting state
//! and assignees holding too much open work.

pub mod domain;
pub mod storage;
pub mod cli;

pub use domain::{ConflictReport, Dependency, DependencyType, Note, Task, TaskId, TaskStatus};
