//! Activity log entries
//!
//! Every mutation on the board appends one entry. Entries are never edited
//! or deleted, and they outlive the task they mention.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::dependency::Dependency;
use super::id::{ActivityId, TaskId};
use super::note::Note;
use super::task::{StatusChange, Task};

#[derive(Debug, Error, PartialEq)]
#[error("Unknown activity action: '{0}'")]
pub struct UnknownAction(pub String);

/// What happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityAction {
    Created,
    StatusChanged,
    NoteAdded,
    DependencyAdded,
}

impl ActivityAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityAction::Created => "created",
            ActivityAction::StatusChanged => "status_changed",
            ActivityAction::NoteAdded => "note_added",
            ActivityAction::DependencyAdded => "dependency_added",
        }
    }
}

impl fmt::Display for ActivityAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for ActivityAction {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(ActivityAction::Created),
            "status_changed" => Ok(ActivityAction::StatusChanged),
            "note_added" => Ok(ActivityAction::NoteAdded),
            "dependency_added" => Ok(ActivityAction::DependencyAdded),
            _ => Err(UnknownAction(s.to_string())),
        }
    }
}

/// One line of the activity log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub id: ActivityId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<TaskId>,

    pub action: ActivityAction,

    /// Human-readable description
    pub details: String,

    /// Who performed the action
    pub user_name: String,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl ActivityEntry {
    pub fn new(
        task_id: Option<TaskId>,
        action: ActivityAction,
        details: impl Into<String>,
        user_name: impl Into<String>,
    ) -> Self {
        let details = details.into();
        let now = Utc::now();
        let seed = format!(
            "{}:{}:{}",
            task_id.as_ref().map(|id| id.to_string()).unwrap_or_default(),
            action,
            details
        );
        Self {
            id: ActivityId::new(&seed, now),
            task_id,
            action,
            details,
            user_name: user_name.into(),
            created_at: now,
        }
    }

    pub fn task_created(task: &Task, user_name: &str) -> Self {
        Self::new(
            Some(task.id.clone()),
            ActivityAction::Created,
            format!("Task \"{}\" created", task.title),
            user_name,
        )
    }

    pub fn status_changed(task_id: &TaskId, change: StatusChange, user_name: &str) -> Self {
        Self::new(
            Some(task_id.clone()),
            ActivityAction::StatusChanged,
            format!("Status changed from {} to {}", change.from, change.to),
            user_name,
        )
    }

    /// The details always end in an ellipsis, whether or not the preview was cut
    pub fn note_added(note: &Note, preview_chars: usize) -> Self {
        Self::new(
            Some(note.task_id.clone()),
            ActivityAction::NoteAdded,
            format!("Note added: {}...", note.preview(preview_chars)),
            note.author.as_str(),
        )
    }

    pub fn dependency_added(dependency: &Dependency, user_name: &str) -> Self {
        Self::new(
            Some(dependency.task_id.clone()),
            ActivityAction::DependencyAdded,
            "Dependency added",
            user_name,
        )
    }
}

/// An activity entry joined with its task's current title
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityView {
    #[serde(flatten)]
    pub entry: ActivityEntry,

    /// None once the task has been deleted
    pub task_title: Option<String>,

    /// Same as `entry.user_name`
    pub user: String,
}

impl ActivityView {
    pub fn new(entry: ActivityEntry, task_title: Option<String>) -> Self {
        let user = entry.user_name.clone();
        Self {
            entry,
            task_title,
            user,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DependencyType, TaskStatus};

    fn make_task(title: &str) -> Task {
        Task::new(TaskId::new(title, Utc::now()), title)
    }

    #[test]
    fn created_details() {
        let task = make_task("Write docs");
        let entry = ActivityEntry::task_created(&task, "alice");

        assert_eq!(entry.action, ActivityAction::Created);
        assert_eq!(entry.details, "Task \"Write docs\" created");
        assert_eq!(entry.user_name, "alice");
        assert_eq!(entry.task_id, Some(task.id));
    }

    #[test]
    fn status_changed_details() {
        let task = make_task("Ship");
        let change = StatusChange {
            from: TaskStatus::Todo,
            to: TaskStatus::InProgress,
        };
        let entry = ActivityEntry::status_changed(&task.id, change, "Manager");

        assert_eq!(entry.details, "Status changed from todo to in_progress");
    }

    #[test]
    fn note_added_previews_content() {
        let task = make_task("Review");
        let note = Note::new(task.id.clone(), "a".repeat(60), "bob");
        let entry = ActivityEntry::note_added(&note, 50);

        assert_eq!(entry.details, format!("Note added: {}...", "a".repeat(50)));
        assert_eq!(entry.user_name, "bob");
    }

    #[test]
    fn note_added_short_content_still_has_ellipsis() {
        let task = make_task("Review");
        let note = Note::new(task.id.clone(), "ok", "bob");
        let entry = ActivityEntry::note_added(&note, 50);

        assert_eq!(entry.details, "Note added: ok...");
    }

    #[test]
    fn dependency_added_is_logged_on_dependent() {
        let a = make_task("A");
        let b = make_task("B");
        let dep = Dependency::new(a.id.clone(), b.id.clone(), DependencyType::Blocks);
        let entry = ActivityEntry::dependency_added(&dep, "Manager");

        assert_eq!(entry.task_id, Some(a.id));
        assert_eq!(entry.details, "Dependency added");
    }

    #[test]
    fn action_parses_wire_names() {
        assert_eq!("note_added".parse::<ActivityAction>(), Ok(ActivityAction::NoteAdded));
        assert_eq!(
            "deleted".parse::<ActivityAction>(),
            Err(UnknownAction("deleted".to_string()))
        );
    }

    #[test]
    fn view_exposes_user_and_title() {
        let task = make_task("Feed");
        let entry = ActivityEntry::task_created(&task, "carol");
        let view = ActivityView::new(entry, Some("Feed".to_string()));

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["user"], "carol");
        assert_eq!(json["user_name"], "carol");
        assert_eq!(json["task_title"], "Feed");
        assert_eq!(json["action"], "created");
    }
}
