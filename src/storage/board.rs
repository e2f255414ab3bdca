//! Board operations
//!
//! [`Board`] is the write path for a project: every create, update and link
//! goes through here so the matching activity entry is appended alongside.
//! Derived views (activity feed, conflicts, columns, stats) are read here
//! too, going through the SQLite cache where a join is needed.

use std::collections::HashSet;

use anyhow::Result;
use chrono::Utc;
use serde::Serialize;
use thiserror::Error;

use crate::domain::{
    analyze, ActivityEntry, ActivityView, BoardStats, ConflictReport, Dependency, DependencyGraph,
    DependencyId, DependencyType, GraphError, Note, NoteId, Task, TaskError, TaskFields, TaskId,
    TaskStatus,
};

use super::config::ProjectConfig;
use super::Project;

#[derive(Debug, Error)]
pub enum BoardError {
    #[error("Task not found: {0}")]
    TaskNotFound(TaskId),

    #[error("Dependency not found: {0}")]
    DependencyNotFound(DependencyId),

    #[error("Title is required")]
    MissingTitle,

    #[error("Note content must not be empty")]
    EmptyNote,

    #[error("Dependency already exists: {task} -> {depends_on} ({dep_type})")]
    DuplicateDependency {
        task: TaskId,
        depends_on: TaskId,
        dep_type: DependencyType,
    },

    #[error(transparent)]
    Task(#[from] TaskError),

    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Filters for listing tasks
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub assignee: Option<String>,
}

impl TaskFilter {
    fn matches(&self, task: &Task) -> bool {
        self.status.map_or(true, |s| task.status == s)
            && self
                .assignee
                .as_deref()
                .map_or(true, |a| task.assignee() == Some(a.trim()))
    }
}

/// A dependency this task declares, with the other task's title
#[derive(Debug, Clone, Serialize)]
pub struct LinkedDependency {
    #[serde(flatten)]
    pub dependency: Dependency,
    pub depends_on_title: Option<String>,
}

/// A `blocks` edge in which this task is the blocker, with the blocked task's title
#[derive(Debug, Clone, Serialize)]
pub struct BlockingLink {
    #[serde(flatten)]
    pub dependency: Dependency,
    pub blocking_title: Option<String>,
}

/// A task with everything attached to it
#[derive(Debug, Clone, Serialize)]
pub struct TaskDetails {
    #[serde(flatten)]
    pub task: Task,
    /// Newest first
    pub notes: Vec<Note>,
    pub dependencies: Vec<LinkedDependency>,
    pub blockers: Vec<BlockingLink>,
}

/// What a delete took with it
#[derive(Debug, Clone, Serialize)]
pub struct DeletedTask {
    pub task: Task,
    pub notes_removed: usize,
    pub dependencies_removed: usize,
}

/// One kanban column
#[derive(Debug, Clone, Serialize)]
pub struct BoardColumn {
    pub status: TaskStatus,
    pub label: &'static str,
    pub tasks: Vec<Task>,
}

/// Board operations over one project
pub struct Board<'a> {
    project: &'a Project,
    author: String,
}

impl<'a> Board<'a> {
    pub fn new(project: &'a Project) -> Self {
        Self {
            author: project.config().author(),
            project,
        }
    }

    /// The author used when no one else is named
    pub fn author(&self) -> &str {
        &self.author
    }

    fn settings(&self) -> &ProjectConfig {
        &self.project.config().project
    }

    fn record(&self, entry: ActivityEntry) -> Result<()> {
        log::debug!("Activity: {} {}", entry.action, entry.details);
        self.project.activity_store().append(&entry)
    }

    /// Returns the given name if it isn't blank, else the default author
    fn user_or_author(&self, name: Option<&str>) -> String {
        name.map(str::trim)
            .filter(|n| !n.is_empty())
            .map_or_else(|| self.author.clone(), str::to_string)
    }

    // Tasks

    /// Creates a task; `fields.title` is required
    pub fn create_task(&self, fields: TaskFields) -> Result<Task> {
        let title = fields
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(BoardError::MissingTitle)?
            .to_string();
        fields.validate().map_err(BoardError::from)?;

        let store = self.project.task_store();
        let existing: HashSet<TaskId> = store.read_all()?.into_iter().map(|t| t.id).collect();

        let id = TaskId::unique(&title, Utc::now(), |id| existing.contains(id));

        let mut task = Task::new(id, title);
        task.apply(fields).map_err(BoardError::from)?;
        task.updated_at = task.created_at;

        store.append(&task)?;
        log::info!("Created task {}", task.id);

        let user = self.user_or_author(task.assignee());
        self.record(ActivityEntry::task_created(&task, &user))?;

        Ok(task)
    }

    /// Lists tasks newest first
    pub fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        let mut tasks: Vec<Task> = self
            .project
            .task_store()
            .read_all()?
            .into_iter()
            .rev()
            .filter(|t| filter.matches(t))
            .collect();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tasks)
    }

    pub fn get_task(&self, id: &TaskId) -> Result<Task> {
        self.project
            .task_store()
            .get(id)?
            .ok_or_else(|| BoardError::TaskNotFound(id.clone()).into())
    }

    /// Returns a task with its notes, dependencies and the edges it blocks
    pub fn task_details(&self, id: &TaskId) -> Result<TaskDetails> {
        let task = self.get_task(id)?;
        let tasks = self.project.task_store().read_all()?;
        let title_of = |id: &TaskId| {
            tasks
                .iter()
                .find(|t| &t.id == id)
                .map(|t| t.title.clone())
        };

        let mut notes = self.notes_for(id)?;
        notes.reverse();

        let deps = self.project.dependency_store().read_all()?;
        let dependencies = deps
            .iter()
            .filter(|d| &d.task_id == id)
            .map(|d| LinkedDependency {
                dependency: d.clone(),
                depends_on_title: title_of(&d.depends_on_task_id),
            })
            .collect();
        let blockers = deps
            .iter()
            .filter(|d| &d.depends_on_task_id == id && d.dep_type.is_blocking())
            .map(|d| BlockingLink {
                dependency: d.clone(),
                blocking_title: title_of(&d.task_id),
            })
            .collect();

        Ok(TaskDetails {
            task,
            notes,
            dependencies,
            blockers,
        })
    }

    /// Applies the given fields; omitted fields keep their stored value
    pub fn update_task(&self, id: &TaskId, fields: TaskFields) -> Result<Task> {
        let store = self.project.task_store();
        let mut task = store
            .get(id)?
            .ok_or_else(|| BoardError::TaskNotFound(id.clone()))?;

        let user = self.user_or_author(fields.assignee.as_deref());
        let change = task.apply(fields).map_err(BoardError::from)?;

        store.upsert(task.clone())?;
        log::info!("Updated task {}", task.id);

        if let Some(change) = change {
            self.record(ActivityEntry::status_changed(&task.id, change, &user))?;
        }

        Ok(task)
    }

    /// Moves a task to another column
    pub fn move_task(&self, id: &TaskId, status: TaskStatus) -> Result<Task> {
        self.update_task(
            id,
            TaskFields {
                status: Some(status),
                ..Default::default()
            },
        )
    }

    /// Deletes a task with its notes and every edge touching it
    ///
    /// Activity entries are kept.
    pub fn delete_task(&self, id: &TaskId) -> Result<DeletedTask> {
        let task = self.get_task(id)?;

        self.project.task_store().remove(id)?;
        let notes = self.project.note_store().remove_where(|n| &n.task_id == id)?;
        let deps = self
            .project
            .dependency_store()
            .remove_where(|d| d.involves(id))?;

        log::info!(
            "Deleted task {} ({} notes, {} dependencies)",
            id,
            notes.len(),
            deps.len()
        );

        Ok(DeletedTask {
            task,
            notes_removed: notes.len(),
            dependencies_removed: deps.len(),
        })
    }

    // Notes

    /// Adds a note; the author defaults to the board author
    pub fn add_note(&self, task_id: &TaskId, content: &str, author: Option<&str>) -> Result<Note> {
        let content = content.trim();
        if content.is_empty() {
            return Err(BoardError::EmptyNote.into());
        }
        self.get_task(task_id)?;

        let store = self.project.note_store();
        let existing: HashSet<NoteId> = store.read_all()?.into_iter().map(|n| n.id).collect();

        let note = Note::new_unique(task_id.clone(), content, self.user_or_author(author), |id| {
            existing.contains(id)
        });
        store.append(&note)?;
        log::info!("Added note {} to {}", note.id, task_id);

        self.record(ActivityEntry::note_added(
            &note,
            self.settings().note_preview_chars,
        ))?;

        Ok(note)
    }

    /// Notes on a task, oldest first
    pub fn notes_for(&self, task_id: &TaskId) -> Result<Vec<Note>> {
        let mut notes: Vec<Note> = self
            .project
            .note_store()
            .read_all()?
            .into_iter()
            .filter(|n| &n.task_id == task_id)
            .collect();
        notes.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(notes)
    }

    // Dependencies

    /// Declares that `task_id` depends on `depends_on`
    pub fn add_dependency(
        &self,
        task_id: &TaskId,
        depends_on: &TaskId,
        dep_type: DependencyType,
    ) -> Result<LinkedDependency> {
        if task_id == depends_on {
            return Err(BoardError::from(GraphError::SelfDependency(task_id.clone())).into());
        }

        let tasks = self.project.task_store().read_all()?;
        let find = |id: &TaskId| {
            tasks
                .iter()
                .find(|t| &t.id == id)
                .ok_or_else(|| BoardError::TaskNotFound(id.clone()))
        };
        find(task_id)?;
        let target = find(depends_on)?;

        let store = self.project.dependency_store();
        let existing = store.read_all()?;
        let dependency =
            Dependency::new_unique(task_id.clone(), depends_on.clone(), dep_type, |id| {
                existing.iter().any(|d| &d.id == id)
            });

        if existing.iter().any(|d| d.same_edge(&dependency)) {
            return Err(BoardError::DuplicateDependency {
                task: task_id.clone(),
                depends_on: depends_on.clone(),
                dep_type,
            }
            .into());
        }

        if dep_type.is_blocking() {
            let mut graph =
                DependencyGraph::from_dependencies(tasks.iter().map(|t| &t.id), &existing)
                    .map_err(BoardError::from)?;
            graph
                .add_dependency(task_id, depends_on)
                .map_err(BoardError::from)?;
        }

        store.append(&dependency)?;
        log::info!("Added dependency {}", dependency.id);

        self.record(ActivityEntry::dependency_added(&dependency, &self.author))?;

        Ok(LinkedDependency {
            depends_on_title: Some(target.title.clone()),
            dependency,
        })
    }

    /// Removes one dependency edge by id
    pub fn remove_dependency(&self, id: &DependencyId) -> Result<Dependency> {
        let removed = self
            .project
            .dependency_store()
            .remove_where(|d| &d.id == id)?;

        let dependency = removed
            .into_iter()
            .next()
            .ok_or_else(|| BoardError::DependencyNotFound(id.clone()))?;
        log::info!("Removed dependency {}", id);

        Ok(dependency)
    }

    // Views

    /// Newest activity first; `limit` defaults to the project setting
    pub fn activity(&self, limit: Option<usize>) -> Result<Vec<ActivityView>> {
        let limit = limit.unwrap_or(self.settings().activity_limit);
        let cache = self.project.get_or_rebuild_cache()?;
        cache.recent_activity(limit)
    }

    /// Runs the conflict checks on the current board
    pub fn conflicts(&self) -> Result<ConflictReport> {
        let cache = self.project.get_or_rebuild_cache()?;
        let edges = cache.blocking_edges()?;
        let tasks = self.project.task_store().read_all()?;

        let report = analyze(&edges, &tasks);
        log::debug!(
            "Conflicts: {} blocking, {} overload",
            report.blocking.len(),
            report.overload.len()
        );
        Ok(report)
    }

    /// Tasks grouped into the four status columns, newest first in each
    pub fn columns(&self) -> Result<Vec<BoardColumn>> {
        let tasks = self.list_tasks(&TaskFilter::default())?;

        Ok(TaskStatus::ALL
            .iter()
            .map(|&status| BoardColumn {
                status,
                label: status.label(),
                tasks: tasks.iter().filter(|t| t.status == status).cloned().collect(),
            })
            .collect())
    }

    pub fn stats(&self) -> Result<BoardStats> {
        let tasks = self.project.task_store().read_all()?;
        Ok(BoardStats::from_tasks(&tasks))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ActivityAction, Priority};
    use tempfile::TempDir;

    fn setup() -> (TempDir, Project) {
        let dir = TempDir::new().unwrap();
        let project = Project::init(dir.path()).unwrap();
        (dir, project)
    }

    fn titled(title: &str) -> TaskFields {
        TaskFields {
            title: Some(title.to_string()),
            ..Default::default()
        }
    }

    fn assigned(title: &str, assignee: &str) -> TaskFields {
        TaskFields {
            assignee: Some(assignee.to_string()),
            ..titled(title)
        }
    }

    fn board_error(err: anyhow::Error) -> BoardError {
        err.downcast::<BoardError>().unwrap()
    }

    #[test]
    fn create_task_defaults_and_logs() {
        let (_dir, project) = setup();
        let board = Board::new(&project);

        let task = board.create_task(titled("  Write docs ")).unwrap();

        assert_eq!(task.title, "Write docs");
        assert_eq!(task.status, TaskStatus::Todo);
        assert_eq!(task.priority, Priority::Medium);

        let log = project.activity_store().read_all().unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].action, ActivityAction::Created);
        assert_eq!(log[0].details, "Task \"Write docs\" created");
        assert_eq!(log[0].user_name, board.author());
    }

    #[test]
    fn create_task_logs_assignee_as_user() {
        let (_dir, project) = setup();
        let board = Board::new(&project);

        board.create_task(assigned("Ship", "alice")).unwrap();

        let log = project.activity_store().read_all().unwrap();
        assert_eq!(log[0].user_name, "alice");
    }

    #[test]
    fn create_task_requires_title() {
        let (_dir, project) = setup();
        let board = Board::new(&project);

        let err = board.create_task(TaskFields::default()).unwrap_err();
        assert!(matches!(board_error(err), BoardError::MissingTitle));

        let err = board.create_task(titled("   ")).unwrap_err();
        assert!(matches!(board_error(err), BoardError::MissingTitle));

        assert!(project.task_store().read_all().unwrap().is_empty());
    }

    #[test]
    fn list_newest_first_with_filters() {
        let (_dir, project) = setup();
        let board = Board::new(&project);

        let first = board.create_task(assigned("First", "alice")).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));
        let second = board.create_task(titled("Second")).unwrap();
        board.move_task(&second.id, TaskStatus::Done).unwrap();

        let all = board.list_tasks(&TaskFilter::default()).unwrap();
        let ids: Vec<_> = all.iter().map(|t| t.id.clone()).collect();
        assert_eq!(ids, vec![second.id.clone(), first.id.clone()]);

        let done = board
            .list_tasks(&TaskFilter {
                status: Some(TaskStatus::Done),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].id, second.id);

        let alice = board
            .list_tasks(&TaskFilter {
                assignee: Some("alice".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(alice.len(), 1);
        assert_eq!(alice[0].id, first.id);
    }

    #[test]
    fn update_keeps_omitted_fields_and_logs_status_change() {
        let (_dir, project) = setup();
        let board = Board::new(&project);

        let task = board
            .create_task(TaskFields {
                description: Some("details".to_string()),
                priority: Some(Priority::High),
                ..titled("Refactor")
            })
            .unwrap();

        let updated = board
            .update_task(
                &task.id,
                TaskFields {
                    status: Some(TaskStatus::InProgress),
                    assignee: Some("bob".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.description, "details");
        assert_eq!(updated.priority, Priority::High);
        assert_eq!(updated.assignee(), Some("bob"));
        assert_eq!(board.get_task(&task.id).unwrap(), updated);

        let log = project.activity_store().read_all().unwrap();
        let last = log.last().unwrap();
        assert_eq!(last.action, ActivityAction::StatusChanged);
        assert_eq!(last.details, "Status changed from todo to in_progress");
        assert_eq!(last.user_name, "bob");
    }

    #[test]
    fn update_without_status_change_logs_nothing() {
        let (_dir, project) = setup();
        let board = Board::new(&project);

        let task = board.create_task(titled("Quiet")).unwrap();
        board
            .update_task(
                &task.id,
                TaskFields {
                    progress: Some(30),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(project.activity_store().read_all().unwrap().len(), 1);
    }

    #[test]
    fn update_unknown_task_fails() {
        let (_dir, project) = setup();
        let board = Board::new(&project);
        let missing: TaskId = "t-0000000".parse().unwrap();

        let err = board.move_task(&missing, TaskStatus::Done).unwrap_err();
        assert!(matches!(board_error(err), BoardError::TaskNotFound(_)));
    }

    #[test]
    fn delete_cascades_but_keeps_activity() {
        let (_dir, project) = setup();
        let board = Board::new(&project);

        let a = board.create_task(titled("A")).unwrap();
        let b = board.create_task(titled("B")).unwrap();
        let c = board.create_task(titled("C")).unwrap();
        board.add_note(&a.id, "note on a", None).unwrap();
        board.add_note(&b.id, "note on b", None).unwrap();
        board.add_dependency(&b.id, &a.id, DependencyType::Blocks).unwrap();
        board.add_dependency(&c.id, &b.id, DependencyType::Blocks).unwrap();

        let deleted = board.delete_task(&a.id).unwrap();

        assert_eq!(deleted.notes_removed, 1);
        assert_eq!(deleted.dependencies_removed, 1);
        assert_eq!(project.task_store().read_all().unwrap().len(), 2);
        assert_eq!(project.note_store().read_all().unwrap().len(), 1);
        assert_eq!(project.dependency_store().read_all().unwrap().len(), 1);

        let feed = board.activity(None).unwrap();
        let created_a = feed
            .iter()
            .find(|v| v.entry.task_id.as_ref() == Some(&a.id) && v.entry.action == ActivityAction::Created)
            .unwrap();
        assert_eq!(created_a.task_title, None);

        let err = board.delete_task(&a.id).unwrap_err();
        assert!(matches!(board_error(err), BoardError::TaskNotFound(_)));
    }

    #[test]
    fn add_note_validates_and_logs_preview() {
        let (_dir, project) = setup();
        let board = Board::new(&project);
        let task = board.create_task(titled("Notes")).unwrap();

        let err = board.add_note(&task.id, "  ", None).unwrap_err();
        assert!(matches!(board_error(err), BoardError::EmptyNote));

        let missing: TaskId = "t-0000000".parse().unwrap();
        let err = board.add_note(&missing, "hello", None).unwrap_err();
        assert!(matches!(board_error(err), BoardError::TaskNotFound(_)));

        let content = "x".repeat(70);
        let note = board.add_note(&task.id, &content, Some("carol")).unwrap();
        assert_eq!(note.author, "carol");

        let log = project.activity_store().read_all().unwrap();
        let last = log.last().unwrap();
        assert_eq!(last.action, ActivityAction::NoteAdded);
        assert_eq!(last.details, format!("Note added: {}...", "x".repeat(50)));
        assert_eq!(last.user_name, "carol");
    }

    #[test]
    fn repeated_notes_get_distinct_ids() {
        let (_dir, project) = setup();
        let board = Board::new(&project);
        let task = board.create_task(titled("Chatty")).unwrap();

        for _ in 0..30 {
            board.add_note(&task.id, "same text", None).unwrap();
        }

        let ids: HashSet<NoteId> = project
            .note_store()
            .read_all()
            .unwrap()
            .into_iter()
            .map(|n| n.id)
            .collect();
        assert_eq!(ids.len(), 30);
    }

    #[test]
    fn relinked_dependency_gets_fresh_id() {
        let (_dir, project) = setup();
        let board = Board::new(&project);
        let a = board.create_task(titled("A")).unwrap();
        let b = board.create_task(titled("B")).unwrap();
        let c = board.create_task(titled("C")).unwrap();

        let kept = board.add_dependency(&c.id, &a.id, DependencyType::Blocks).unwrap();
        for _ in 0..10 {
            let linked = board.add_dependency(&b.id, &a.id, DependencyType::Blocks).unwrap();
            assert_ne!(linked.dependency.id, kept.dependency.id);
            board.remove_dependency(&linked.dependency.id).unwrap();
        }

        let deps = project.dependency_store().read_all().unwrap();
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].id, kept.dependency.id);
    }

    #[test]
    fn add_dependency_rules() {
        let (_dir, project) = setup();
        let board = Board::new(&project);
        let a = board.create_task(titled("A")).unwrap();
        let b = board.create_task(titled("B")).unwrap();

        let err = board.add_dependency(&a.id, &a.id, DependencyType::Blocks).unwrap_err();
        assert!(err.to_string().contains("Task cannot depend on itself"));

        let missing: TaskId = "t-0000000".parse().unwrap();
        let err = board.add_dependency(&a.id, &missing, DependencyType::Blocks).unwrap_err();
        assert!(matches!(board_error(err), BoardError::TaskNotFound(_)));

        let linked = board.add_dependency(&b.id, &a.id, DependencyType::Blocks).unwrap();
        assert_eq!(linked.depends_on_title.as_deref(), Some("A"));

        let err = board.add_dependency(&b.id, &a.id, DependencyType::Blocks).unwrap_err();
        assert!(matches!(board_error(err), BoardError::DuplicateDependency { .. }));

        // The reverse blocking edge would be a cycle
        let err = board.add_dependency(&a.id, &b.id, DependencyType::Blocks).unwrap_err();
        assert!(matches!(
            board_error(err),
            BoardError::Graph(GraphError::CycleDetected(_, _))
        ));

        // Informational edges are not cycle-checked
        board.add_dependency(&a.id, &b.id, DependencyType::Related).unwrap();

        let log = project.activity_store().read_all().unwrap();
        let added = log
            .iter()
            .filter(|e| e.action == ActivityAction::DependencyAdded)
            .count();
        assert_eq!(added, 2);
    }

    #[test]
    fn remove_dependency_by_id() {
        let (_dir, project) = setup();
        let board = Board::new(&project);
        let a = board.create_task(titled("A")).unwrap();
        let b = board.create_task(titled("B")).unwrap();

        let linked = board.add_dependency(&b.id, &a.id, DependencyType::Blocks).unwrap();
        let removed = board.remove_dependency(&linked.dependency.id).unwrap();
        assert_eq!(removed.id, linked.dependency.id);

        let err = board.remove_dependency(&linked.dependency.id).unwrap_err();
        assert!(matches!(board_error(err), BoardError::DependencyNotFound(_)));
    }

    #[test]
    fn task_details_include_links() {
        let (_dir, project) = setup();
        let board = Board::new(&project);
        let schema = board.create_task(titled("Schema")).unwrap();
        let api = board.create_task(titled("API")).unwrap();
        let ui = board.create_task(titled("UI")).unwrap();

        board.add_dependency(&api.id, &schema.id, DependencyType::Blocks).unwrap();
        board.add_dependency(&ui.id, &api.id, DependencyType::Blocks).unwrap();
        board.add_note(&api.id, "first", None).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));
        board.add_note(&api.id, "second", None).unwrap();

        let details = board.task_details(&api.id).unwrap();

        assert_eq!(details.task.title, "API");
        assert_eq!(details.notes[0].content, "second");
        assert_eq!(details.dependencies.len(), 1);
        assert_eq!(details.dependencies[0].depends_on_title.as_deref(), Some("Schema"));
        assert_eq!(details.blockers.len(), 1);
        assert_eq!(details.blockers[0].blocking_title.as_deref(), Some("UI"));
    }

    #[test]
    fn conflicts_from_board() {
        let (_dir, project) = setup();
        let board = Board::new(&project);

        let blocker = board.create_task(titled("Blocker")).unwrap();
        let dependent = board.create_task(titled("Dependent")).unwrap();
        board
            .add_dependency(&dependent.id, &blocker.id, DependencyType::Blocks)
            .unwrap();

        assert!(board.conflicts().unwrap().blocking.is_empty());

        board.move_task(&blocker.id, TaskStatus::InProgress).unwrap();
        let report = board.conflicts().unwrap();
        assert_eq!(report.blocking.len(), 1);
        assert_eq!(report.blocking[0].dependent_id, dependent.id);
        assert_eq!(report.blocking[0].blocker_status, TaskStatus::InProgress);

        for n in 0..4 {
            board.create_task(assigned(&format!("Load {}", n), "alice")).unwrap();
        }
        let report = board.conflicts().unwrap();
        assert_eq!(report.overload.len(), 1);
        assert_eq!(report.overload[0].assignee, "alice");
        assert_eq!(report.overload[0].count, 4);
    }

    #[test]
    fn activity_respects_limit() {
        let (_dir, project) = setup();
        let board = Board::new(&project);

        for n in 0..5 {
            board.create_task(titled(&format!("Task {}", n))).unwrap();
        }

        assert_eq!(board.activity(Some(3)).unwrap().len(), 3);
        assert_eq!(board.activity(None).unwrap().len(), 5);
    }

    #[test]
    fn columns_and_stats() {
        let (_dir, project) = setup();
        let board = Board::new(&project);

        let a = board.create_task(titled("A")).unwrap();
        board.create_task(titled("B")).unwrap();
        board.move_task(&a.id, TaskStatus::Review).unwrap();

        let columns = board.columns().unwrap();
        assert_eq!(columns.len(), 4);
        assert_eq!(columns[0].label, "To Do");
        assert_eq!(columns[0].tasks.len(), 1);
        assert_eq!(columns[2].status, TaskStatus::Review);
        assert_eq!(columns[2].tasks[0].id, a.id);

        let stats = board.stats().unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.completion_rate, 0.0);
    }
}
