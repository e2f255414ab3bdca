//! Project management
//!
//! Handles project initialization and provides access to stores.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{Context, Result};
use thiserror::Error;

use super::cache::CacheSource;
use super::config::PROJECT_DIR;
use super::{ActivityStore, Cache, Config, DependencyStore, NoteStore, TaskStore};

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Not in a taskflow project. Run 'taskflow init' first.")]
    NotInProject,

    #[error("No taskflow project at {0}")]
    NotAProject(PathBuf),
}

const GITIGNORE: &str = "# SQLite cache (regenerated from the JSONL files)
.cache/

# Store lock and rewrite files
*.jsonl.lock
*.jsonl.tmp
";

/// A TaskFlow project
pub struct Project {
    root: PathBuf,
    config: Config,
}

impl Project {
    /// Opens an existing project at the given path
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();

        if !root.join(PROJECT_DIR).is_dir() {
            return Err(ProjectError::NotAProject(root).into());
        }

        let config = Config::for_project(&root)?;
        log::debug!("Opened project at {}", root.display());

        Ok(Self { root, config })
    }

    /// Opens the project at the current directory or a parent
    pub fn open_current() -> Result<Self> {
        let root = Config::find_project_root().ok_or(ProjectError::NotInProject)?;

        Self::open(root)
    }

    /// Opens the given project root, or discovers one from the current directory
    pub fn discover(root: Option<&Path>) -> Result<Self> {
        match root {
            Some(root) => Self::open(root),
            None => Self::open_current(),
        }
    }

    /// Initializes a new project at the given path
    ///
    /// Existing files are left alone, so running it twice is harmless.
    pub fn init(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let data_dir = root.join(PROJECT_DIR);

        fs::create_dir_all(&data_dir).with_context(|| {
            format!("Failed to create {} directory: {}", PROJECT_DIR, data_dir.display())
        })?;

        let config_path = data_dir.join("config.toml");
        if !config_path.exists() {
            let config = Config {
                project: Default::default(),
                global: Default::default(),
                project_root: Some(root.clone()),
            };
            config.save_project()?;
        }

        let gitignore_path = data_dir.join(".gitignore");
        if !gitignore_path.exists() {
            fs::write(&gitignore_path, GITIGNORE).with_context(|| {
                format!("Failed to write .gitignore: {}", gitignore_path.display())
            })?;
        }

        log::info!("Initialized project at {}", root.display());
        Self::open(root)
    }

    /// Returns the project root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the .taskflow directory path
    pub fn data_dir(&self) -> PathBuf {
        self.root.join(PROJECT_DIR)
    }

    /// Returns the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn task_store(&self) -> TaskStore {
        TaskStore::new(self.data_dir().join("tasks.jsonl"))
    }

    pub fn note_store(&self) -> NoteStore {
        NoteStore::new(self.data_dir().join("notes.jsonl"))
    }

    pub fn dependency_store(&self) -> DependencyStore {
        DependencyStore::new(self.data_dir().join("dependencies.jsonl"))
    }

    pub fn activity_store(&self) -> ActivityStore {
        ActivityStore::new(self.data_dir().join("activity.jsonl"))
    }

    /// Opens the SQLite cache for this project
    pub fn cache(&self) -> Result<Cache> {
        Cache::open(&self.root)
    }

    /// Rebuilds the cache from source files
    pub fn rebuild_cache(&self) -> Result<Cache> {
        let mut cache = self.cache()?;
        self.refill(&mut cache)?;
        Ok(cache)
    }

    /// Gets the cache if it's fresh, or rebuilds it if stale
    pub fn get_or_rebuild_cache(&self) -> Result<Cache> {
        let mut cache = self.cache()?;

        if cache.is_stale()? {
            self.refill(&mut cache)?;
        }

        Ok(cache)
    }

    fn refill(&self, cache: &mut Cache) -> Result<()> {
        let read_at = SystemTime::now();
        let tasks = self.task_store().read_all()?;
        let notes = self.note_store().read_all()?;
        let dependencies = self.dependency_store().read_all()?;
        let activity = self.activity_store().read_all()?;

        cache
            .rebuild(CacheSource {
                tasks: &tasks,
                notes: &notes,
                dependencies: &dependencies,
                activity: &activity,
                read_at,
            })
            .context("Failed to rebuild cache")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Task, TaskId};
    use chrono::Utc;
    use tempfile::TempDir;

    #[test]
    fn init_creates_structure() {
        let dir = TempDir::new().unwrap();
        let project = Project::init(dir.path()).unwrap();

        assert!(project.data_dir().is_dir());
        assert!(project.data_dir().join("config.toml").is_file());

        let gitignore = fs::read_to_string(project.data_dir().join(".gitignore")).unwrap();
        assert!(gitignore.contains(".cache/"));
        assert!(gitignore.contains("*.jsonl.lock"));
    }

    #[test]
    fn init_writes_default_config() {
        let dir = TempDir::new().unwrap();
        let project = Project::init(dir.path()).unwrap();

        assert_eq!(project.config().project.default_author, "Manager");
        let content = fs::read_to_string(project.data_dir().join("config.toml")).unwrap();
        assert!(content.contains("default_author"));
    }

    #[test]
    fn init_is_idempotent() {
        let dir = TempDir::new().unwrap();

        Project::init(dir.path()).unwrap();
        Project::init(dir.path()).unwrap();

        assert!(dir.path().join(PROJECT_DIR).is_dir());
    }

    #[test]
    fn open_existing_project() {
        let dir = TempDir::new().unwrap();
        Project::init(dir.path()).unwrap();

        let project = Project::open(dir.path()).unwrap();
        assert_eq!(project.root(), dir.path());
    }

    #[test]
    fn open_non_project_fails() {
        let dir = TempDir::new().unwrap();
        let err = Project::open(dir.path()).err().unwrap();

        assert!(err.to_string().contains("No taskflow project"));
    }

    #[test]
    fn discover_with_explicit_root() {
        let dir = TempDir::new().unwrap();
        Project::init(dir.path()).unwrap();

        let project = Project::discover(Some(dir.path())).unwrap();
        assert_eq!(project.root(), dir.path());
    }

    #[test]
    fn stores_live_in_data_dir() {
        let dir = TempDir::new().unwrap();
        let project = Project::init(dir.path()).unwrap();

        assert!(project.task_store().path().ends_with(".taskflow/tasks.jsonl"));
        assert!(project.note_store().path().ends_with("notes.jsonl"));
        assert!(project.dependency_store().path().ends_with("dependencies.jsonl"));
        assert!(project.activity_store().path().ends_with("activity.jsonl"));
    }

    #[test]
    fn cache_rebuilds_from_stores() {
        let dir = TempDir::new().unwrap();
        let project = Project::init(dir.path()).unwrap();

        let task = Task::new(TaskId::new("Cached", Utc::now()), "Cached");
        project.task_store().append(&task).unwrap();

        let cache = project.get_or_rebuild_cache().unwrap();
        let counts: std::collections::HashMap<_, _> =
            cache.row_counts().unwrap().into_iter().collect();
        assert_eq!(counts["tasks"], 1);
    }
}
