//! Dependency edges between tasks
//!
//! An edge reads "`task_id` depends on `depends_on_task_id`". For `blocks`
//! edges the second task is the blocker.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::id::{DependencyId, TaskId};

#[derive(Debug, Error, PartialEq)]
#[error("Invalid dependency type: '{0}' (expected blocks, related or duplicates)")]
pub struct InvalidDependencyType(pub String);

/// Type of dependency between tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DependencyType {
    /// The depended-on task blocks the dependent one
    #[default]
    Blocks,
    /// Tasks are related but don't block each other (informational)
    Related,
    /// The dependent task duplicates the other one (informational)
    Duplicates,
}

impl DependencyType {
    /// Returns true if this dependency type takes part in blocking checks
    pub fn is_blocking(&self) -> bool {
        matches!(self, DependencyType::Blocks)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DependencyType::Blocks => "blocks",
            DependencyType::Related => "related",
            DependencyType::Duplicates => "duplicates",
        }
    }
}

impl fmt::Display for DependencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for DependencyType {
    type Err = InvalidDependencyType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "blocks" => Ok(DependencyType::Blocks),
            "related" => Ok(DependencyType::Related),
            "duplicates" => Ok(DependencyType::Duplicates),
            _ => Err(InvalidDependencyType(s.to_string())),
        }
    }
}

/// A stored dependency edge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub id: DependencyId,

    /// The dependent task
    pub task_id: TaskId,

    /// The task depended on (the blocker, for `blocks` edges)
    pub depends_on_task_id: TaskId,

    #[serde(rename = "type", default)]
    pub dep_type: DependencyType,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Dependency {
    /// Creates a new edge; self-loops are rejected by the caller before this point
    pub fn new(task_id: TaskId, depends_on_task_id: TaskId, dep_type: DependencyType) -> Self {
        Self::new_unique(task_id, depends_on_task_id, dep_type, |_| false)
    }

    /// Creates an edge whose id avoids every id `taken` reports
    pub fn new_unique(
        task_id: TaskId,
        depends_on_task_id: TaskId,
        dep_type: DependencyType,
        taken: impl Fn(&DependencyId) -> bool,
    ) -> Self {
        let now = Utc::now();
        let seed = format!("{}>{}:{}", task_id, depends_on_task_id, dep_type);
        Self {
            id: DependencyId::unique(&seed, now, taken),
            task_id,
            depends_on_task_id,
            dep_type,
            created_at: now,
        }
    }

    /// Returns true if the edge touches the given task on either side
    pub fn involves(&self, task_id: &TaskId) -> bool {
        &self.task_id == task_id || &self.depends_on_task_id == task_id
    }

    /// Returns true if this edge duplicates another (same endpoints and type)
    pub fn same_edge(&self, other: &Dependency) -> bool {
        self.task_id == other.task_id
            && self.depends_on_task_id == other.depends_on_task_id
            && self.dep_type == other.dep_type
    }
}
