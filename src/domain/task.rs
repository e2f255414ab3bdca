//! Task domain model
//!
//! Tasks are the cards on the board. Each has a status column, a priority,
//! an optional assignee and some planning fields (progress, due date, hours).

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::id::TaskId;

#[derive(Debug, Error, PartialEq)]
pub enum TaskError {
    #[error("Invalid status: '{0}' (expected todo, in_progress, review or done)")]
    InvalidStatus(String),

    #[error("Invalid priority: '{0}' (expected low, medium, high or urgent)")]
    InvalidPriority(String),

    #[error("Task title must not be empty")]
    EmptyTitle,

    #[error("Progress must be between 0 and 100, got {0}")]
    InvalidProgress(u8),

    #[error("Hours must be a non-negative number, got {0}")]
    InvalidHours(f64),
}

/// Status of a task, one per board column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Review,
    Done,
}

impl TaskStatus {
    /// All statuses in board column order
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::Todo,
        TaskStatus::InProgress,
        TaskStatus::Review,
        TaskStatus::Done,
    ];

    /// Returns the wire name of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Review => "review",
            TaskStatus::Done => "done",
        }
    }

    /// Returns the board column heading
    pub fn label(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "To Do",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Review => "Review",
            TaskStatus::Done => "Done",
        }
    }

    /// Returns true if this status represents completion
    pub fn is_complete(&self) -> bool {
        matches!(self, TaskStatus::Done)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "todo" => Ok(TaskStatus::Todo),
            "in_progress" => Ok(TaskStatus::InProgress),
            "review" => Ok(TaskStatus::Review),
            "done" => Ok(TaskStatus::Done),
            _ => Err(TaskError::InvalidStatus(s.to_string())),
        }
    }
}

/// Priority of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    /// All priorities, most pressing first
    pub const ALL: [Priority; 4] = [
        Priority::Urgent,
        Priority::High,
        Priority::Medium,
        Priority::Low,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            "urgent" => Ok(Priority::Urgent),
            _ => Err(TaskError::InvalidPriority(s.to_string())),
        }
    }
}

/// A status transition produced by [`Task::apply`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    pub from: TaskStatus,
    pub to: TaskStatus,
}

/// Field values supplied when creating or updating a task
///
/// `None` keeps the current value (or the default, on creation).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskFields {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    /// An empty string clears the assignee
    pub assignee: Option<String>,
    pub progress: Option<u8>,
    pub due_date: Option<NaiveDate>,
    pub estimated_hours: Option<f64>,
    pub actual_hours: Option<f64>,
}

impl TaskFields {
    /// Checks the supplied values without touching any task
    pub fn validate(&self) -> Result<(), TaskError> {
        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                return Err(TaskError::EmptyTitle);
            }
        }

        if let Some(progress) = self.progress {
            if progress > 100 {
                return Err(TaskError::InvalidProgress(progress));
            }
        }

        for hours in [self.estimated_hours, self.actual_hours].into_iter().flatten() {
            if !hours.is_finite() || hours < 0.0 {
                return Err(TaskError::InvalidHours(hours));
            }
        }

        Ok(())
    }
}

/// A task on the board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier
    pub id: TaskId,

    /// Human-readable title
    pub title: String,

    #[serde(default)]
    pub description: String,

    /// Current status (board column)
    #[serde(default)]
    pub status: TaskStatus,

    #[serde(default)]
    pub priority: Priority,

    /// Free-text name of the person working on it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,

    /// Completion percentage, 0 to 100
    #[serde(default)]
    pub progress: u8,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_hours: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_hours: Option<f64>,

    /// When the task was created
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a new `todo` task with the given ID and title
    pub fn new(id: TaskId, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            title: title.into(),
            description: String::new(),
            status: TaskStatus::Todo,
            priority: Priority::Medium,
            assignee: None,
            progress: 0,
            due_date: None,
            estimated_hours: None,
            actual_hours: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns the assignee, or None if unassigned or blank
    pub fn assignee(&self) -> Option<&str> {
        self.assignee
            .as_deref()
            .filter(|name| !name.trim().is_empty())
    }

    /// Returns true if the task is not done
    pub fn is_open(&self) -> bool {
        !self.status.is_complete()
    }

    /// Applies the supplied fields, keeping the current value for every `None`
    ///
    /// Returns the status transition if the status actually changed.
    pub fn apply(&mut self, fields: TaskFields) -> Result<Option<StatusChange>, TaskError> {
        fields.validate()?;

        let mut change = None;

        if let Some(title) = fields.title {
            self.title = title.trim().to_string();
        }
        if let Some(description) = fields.description {
            self.description = description;
        }
        if let Some(status) = fields.status {
            if status != self.status {
                change = Some(StatusChange {
                    from: self.status,
                    to: status,
                });
                self.status = status;
            }
        }
        if let Some(priority) = fields.priority {
            self.priority = priority;
        }
        if let Some(assignee) = fields.assignee {
            let assignee = assignee.trim();
            self.assignee = (!assignee.is_empty()).then(|| assignee.to_string());
        }
        if let Some(progress) = fields.progress {
            self.progress = progress;
        }
        if let Some(due_date) = fields.due_date {
            self.due_date = Some(due_date);
        }
        if let Some(hours) = fields.estimated_hours {
            self.estimated_hours = Some(hours);
        }
        if let Some(hours) = fields.actual_hours {
            self.actual_hours = Some(hours);
        }

        self.updated_at = Utc::now();
        Ok(change)
    }
}
