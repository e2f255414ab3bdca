//! Domain models for TaskFlow
//!
//! Contains the core business logic without any I/O concerns.

mod activity;
mod conflict;
mod dependency;
mod graph;
mod id;
mod note;
mod stats;
mod task;

pub use activity::{ActivityAction, ActivityEntry, ActivityView, UnknownAction};
pub use conflict::{
    analyze, find_blocking_conflicts, find_overload_conflicts, BlockingConflict, ConflictReport,
    DependencyEdge, OverloadConflict, Snapshot, TaskRef, OVERLOAD_THRESHOLD,
};
pub use dependency::{Dependency, DependencyType, InvalidDependencyType};
pub use graph::{DependencyGraph, GraphError};
pub use id::{ActivityId, DependencyId, IdError, NoteId, TaskId};
pub use note::Note;
pub use stats::{BoardStats, Bucket};
pub use task::{Priority, StatusChange, Task, TaskError, TaskFields, TaskStatus};
