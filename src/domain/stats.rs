//! Board statistics

use serde::Serialize;

use super::task::{Priority, Task, TaskStatus};

/// Count of tasks for one status or priority
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucket<K> {
    pub key: K,
    pub count: usize,
}

/// Aggregate numbers for a board
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardStats {
    pub total: usize,
    /// Every status in column order, including empty ones
    pub by_status: Vec<Bucket<TaskStatus>>,
    /// Every priority, most pressing first
    pub by_priority: Vec<Bucket<Priority>>,
    /// Percentage of done tasks, one decimal
    pub completion_rate: f64,
    /// Mean progress across all tasks, one decimal
    pub avg_progress: f64,
}

impl BoardStats {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let total = tasks.len();

        let by_status = TaskStatus::ALL
            .iter()
            .map(|&key| Bucket {
                key,
                count: tasks.iter().filter(|t| t.status == key).count(),
            })
            .collect();

        let by_priority = Priority::ALL
            .iter()
            .map(|&key| Bucket {
                key,
                count: tasks.iter().filter(|t| t.priority == key).count(),
            })
            .collect();

        let done = tasks.iter().filter(|t| t.status.is_complete()).count();
        let progress_sum: u64 = tasks.iter().map(|t| u64::from(t.progress)).sum();

        let (completion_rate, avg_progress) = if total == 0 {
            (0.0, 0.0)
        } else {
            (
                round1(done as f64 / total as f64 * 100.0),
                round1(progress_sum as f64 / total as f64),
            )
        };

        Self {
            total,
            by_status,
            by_priority,
            completion_rate,
            avg_progress,
        }
    }

    /// Count for one status
    pub fn status_count(&self, status: TaskStatus) -> usize {
        self.by_status
            .iter()
            .find(|b| b.key == status)
            .map_or(0, |b| b.count)
    }

    /// Count for one priority
    pub fn priority_count(&self, priority: Priority) -> usize {
        self.by_priority
            .iter()
            .find(|b| b.key == priority)
            .map_or(0, |b| b.count)
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
