//! # Storage Layer
//!
//! Persistence layer for TaskFlow with git-friendly file formats.
//!
//! ## Storage Formats
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Tasks | JSONL (one JSON per line) | `.taskflow/tasks.jsonl` |
//! | Notes | JSONL | `.taskflow/notes.jsonl` |
//! | Dependencies | JSONL | `.taskflow/dependencies.jsonl` |
//! | Activity | JSONL (append-only) | `.taskflow/activity.jsonl` |
//! | Config | TOML | `.taskflow/config.toml` |
//! | Cache | SQLite (auto-regenerated) | `.taskflow/.cache/taskflow.db` |
//!
//! ## Concurrency Safety
//!
//! - [`JsonlStore`] uses file locking (`fs2`) for concurrent access
//! - [`Cache`] uses mtime-based invalidation
//! - All rewrites are atomic (temp file + rename)
//!
//! ## Key Types
//!
//! - [`Project`] - Entry point for accessing a TaskFlow project
//! - [`Board`] - Task, note and dependency operations with activity logging
//! - [`JsonlStore`] - Read/write one record kind as JSONL
//! - [`Config`] - Project and global configuration

mod board;
mod cache;
mod config;
mod jsonl;
mod project;

pub use board::{
    BlockingLink, Board, BoardColumn, BoardError, DeletedTask, LinkedDependency, TaskDetails,
    TaskFilter,
};
pub use cache::{Cache, CacheError, CacheSource};
pub use config::{Config, ConfigError, GlobalConfig, OutputFormat, ProjectConfig, PROJECT_DIR};
pub use jsonl::{ActivityStore, DependencyStore, JsonlStore, NoteStore, Record, TaskStore};
pub use project::{Project, ProjectError};
