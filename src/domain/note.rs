//! Notes attached to tasks

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{NoteId, TaskId};

/// A free-text note on a task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub task_id: TaskId,
    pub content: String,
    pub author: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Note {
    pub fn new(task_id: TaskId, content: impl Into<String>, author: impl Into<String>) -> Self {
        Self::new_unique(task_id, content, author, |_| false)
    }

    /// Creates a note whose id avoids every id `taken` reports
    pub fn new_unique(
        task_id: TaskId,
        content: impl Into<String>,
        author: impl Into<String>,
        taken: impl Fn(&NoteId) -> bool,
    ) -> Self {
        let content = content.into();
        let now = Utc::now();
        Self {
            id: NoteId::unique(&format!("{}{}", task_id, content), now, taken),
            task_id,
            content,
            author: author.into(),
            created_at: now,
        }
    }

    /// Returns the first `max_chars` characters of the content
    pub fn preview(&self, max_chars: usize) -> &str {
        match self.content.char_indices().nth(max_chars) {
            Some((end, _)) => &self.content[..end],
            None => &self.content,
        }
    }
}
