//! Conflict detection over a task/dependency snapshot
//!
//! Two reports are derived, both pure and single-pass:
//!
//! - **Blocking conflicts**: `blocks` edges whose blocker is `in_progress` or
//!   `done` while the dependent task is not yet `done`.
//! - **Overload conflicts**: assignees holding more than
//!   [`OVERLOAD_THRESHOLD`] open tasks.
//!
//! Nothing here fails. Records that can't be evaluated (an edge whose
//! endpoint is missing, a task without an assignee) are left out.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::dependency::{Dependency, DependencyType};
use super::id::TaskId;
use super::task::{Task, TaskStatus};

/// An assignee is overloaded above this many open tasks
pub const OVERLOAD_THRESHOLD: usize = 3;

/// The parts of a task the blocking check looks at
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRef {
    pub id: TaskId,
    pub title: String,
    pub status: TaskStatus,
}

impl From<&Task> for TaskRef {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.clone(),
            title: task.title.clone(),
            status: task.status,
        }
    }
}

/// A dependency edge joined with both of its endpoints
///
/// Either side is `None` when the referenced task no longer exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyEdge {
    pub dependent: Option<TaskRef>,
    pub blocker: Option<TaskRef>,
    #[serde(rename = "type", default)]
    pub dep_type: DependencyType,
}

/// A `blocks` edge in a conflicting state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockingConflict {
    pub dependent_id: TaskId,
    pub dependent_title: String,
    pub dependent_status: TaskStatus,
    pub blocker_id: TaskId,
    pub blocker_title: String,
    pub blocker_status: TaskStatus,
    #[serde(rename = "type")]
    pub dep_type: DependencyType,
}

/// An assignee with too many open tasks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverloadConflict {
    pub assignee: String,
    pub count: usize,
    pub tasks: Vec<TaskId>,
}

/// Both conflict lists for one snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictReport {
    pub blocking: Vec<BlockingConflict>,
    pub overload: Vec<OverloadConflict>,
}

impl ConflictReport {
    /// Total number of findings
    pub fn len(&self) -> usize {
        self.blocking.len() + self.overload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocking.is_empty() && self.overload.is_empty()
    }
}

/// Tasks and stored dependency edges read at one point in time
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
}

impl Snapshot {
    /// Joins every `blocks` edge with its endpoints, in edge order
    pub fn blocking_edges(&self) -> Vec<DependencyEdge> {
        let by_id: HashMap<&TaskId, &Task> = self.tasks.iter().map(|t| (&t.id, t)).collect();
        let lookup = |id: &TaskId| by_id.get(id).map(|task| TaskRef::from(*task));

        self.dependencies
            .iter()
            .filter(|dep| dep.dep_type.is_blocking())
            .map(|dep| DependencyEdge {
                dependent: lookup(&dep.task_id),
                blocker: lookup(&dep.depends_on_task_id),
                dep_type: dep.dep_type,
            })
            .collect()
    }

    /// Runs both checks on this snapshot
    pub fn analyze(&self) -> ConflictReport {
        analyze(&self.blocking_edges(), &self.tasks)
    }
}

/// Runs both checks
pub fn analyze(edges: &[DependencyEdge], tasks: &[Task]) -> ConflictReport {
    ConflictReport {
        blocking: find_blocking_conflicts(edges),
        overload: find_overload_conflicts(tasks),
    }
}

/// Returns one record per `blocks` edge whose blocker is in progress or done
/// while the dependent is not done
///
/// Output keeps the order of `edges`.
pub fn find_blocking_conflicts(edges: &[DependencyEdge]) -> Vec<BlockingConflict> {
    edges
        .iter()
        .filter(|edge| edge.dep_type.is_blocking())
        .filter_map(|edge| {
            let dependent = edge.dependent.as_ref()?;
            let blocker = edge.blocker.as_ref()?;
            is_conflicting(dependent.status, blocker.status).then(|| BlockingConflict {
                dependent_id: dependent.id.clone(),
                dependent_title: dependent.title.clone(),
                dependent_status: dependent.status,
                blocker_id: blocker.id.clone(),
                blocker_title: blocker.title.clone(),
                blocker_status: blocker.status,
                dep_type: edge.dep_type,
            })
        })
        .collect()
}

fn is_conflicting(dependent: TaskStatus, blocker: TaskStatus) -> bool {
    matches!(blocker, TaskStatus::InProgress | TaskStatus::Done) && dependent != TaskStatus::Done
}

/// Returns one record per assignee with more than [`OVERLOAD_THRESHOLD`]
/// open tasks
///
/// Assignees appear in order of first appearance in `tasks`; task ids keep
/// input order.
pub fn find_overload_conflicts(tasks: &[Task]) -> Vec<OverloadConflict> {
    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, Vec<TaskId>> = HashMap::new();

    for task in tasks.iter().filter(|t| t.is_open()) {
        let Some(assignee) = task.assignee() else {
            continue;
        };
        groups
            .entry(assignee)
            .or_insert_with(|| {
                order.push(assignee);
                Vec::new()
            })
            .push(task.id.clone());
    }

    order
        .into_iter()
        .filter_map(|assignee| {
            let ids = groups.remove(assignee)?;
            (ids.len() > OVERLOAD_THRESHOLD).then(|| OverloadConflict {
                assignee: assignee.to_string(),
                count: ids.len(),
                tasks: ids,
            })
        })
        .collect()
}
