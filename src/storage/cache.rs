//! SQLite cache for joined queries
//!
//! The cache sits in `.taskflow/.cache/taskflow.db` and mirrors data from
//! the source-of-truth JSONL files. Cache invalidation is based on file
//! modification times.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::{Duration, SystemTime};

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use thiserror::Error;

use crate::domain::{
    ActivityEntry, ActivityView, Dependency, DependencyEdge, DependencyType, Note, Task, TaskRef,
    TaskStatus,
};

use super::config::PROJECT_DIR;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Invalid value in cache column {column}: {value}")]
    InvalidValue { column: &'static str, value: String },

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Everything the cache mirrors
pub struct CacheSource<'a> {
    pub tasks: &'a [Task],
    pub notes: &'a [Note],
    pub dependencies: &'a [Dependency],
    pub activity: &'a [ActivityEntry],
    /// Taken before the first source was read; recorded as the rebuild time
    pub read_at: SystemTime,
}

/// SQLite cache for joined queries
pub struct Cache {
    /// Path to the SQLite database
    db_path: PathBuf,

    /// Source files whose mtimes decide staleness
    sources: Vec<PathBuf>,

    conn: Connection,
}

impl Cache {
    /// Schema version - bump when schema changes to force rebuild
    const SCHEMA_VERSION: i32 = 1;

    /// Creates or opens the cache for a project
    pub fn open(project_root: &Path) -> Result<Self> {
        let data_dir = project_root.join(PROJECT_DIR);
        let cache_dir = data_dir.join(".cache");
        let db_path = cache_dir.join("taskflow.db");
        let sources = ["tasks.jsonl", "notes.jsonl", "dependencies.jsonl", "activity.jsonl"]
            .iter()
            .map(|name| data_dir.join(name))
            .collect();

        fs::create_dir_all(&cache_dir).with_context(|| {
            format!("Failed to create cache directory: {}", cache_dir.display())
        })?;

        let conn = Connection::open(&db_path)
            .with_context(|| format!("Failed to open cache database: {}", db_path.display()))?;

        // Enable WAL mode for better concurrent access
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        let mut cache = Self {
            db_path,
            sources,
            conn,
        };

        cache.ensure_schema()?;

        Ok(cache)
    }

    /// Ensures the schema is up to date
    fn ensure_schema(&mut self) -> Result<()> {
        let current_version = self.schema_version()?;

        if current_version != Self::SCHEMA_VERSION {
            log::debug!(
                "Cache schema version {} != {}, recreating",
                current_version,
                Self::SCHEMA_VERSION
            );
            self.create_schema()?;
        }

        Ok(())
    }

    /// Gets the current schema version
    fn schema_version(&self) -> Result<i32> {
        let result: Option<i32> = self
            .conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))
            .optional()?;

        Ok(result.unwrap_or(0))
    }

    /// Creates the schema from scratch
    fn create_schema(&mut self) -> Result<()> {
        self.conn
            .execute_batch(
                "
            DROP TABLE IF EXISTS activity_log;
            DROP TABLE IF EXISTS dependencies;
            DROP TABLE IF EXISTS notes;
            DROP TABLE IF EXISTS tasks;
            DROP TABLE IF EXISTS cache_meta;

            CREATE TABLE tasks (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                status TEXT NOT NULL,
                priority TEXT NOT NULL,
                assignee TEXT,
                progress INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE notes (
                id TEXT PRIMARY KEY,
                task_id TEXT NOT NULL,
                author TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            -- seq keeps the JSONL order for edge queries
            CREATE TABLE dependencies (
                seq INTEGER PRIMARY KEY,
                id TEXT NOT NULL UNIQUE,
                task_id TEXT NOT NULL,
                depends_on_task_id TEXT NOT NULL,
                type TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE TABLE activity_log (
                seq INTEGER PRIMARY KEY,
                id TEXT NOT NULL UNIQUE,
                task_id TEXT,
                action TEXT NOT NULL,
                details TEXT NOT NULL,
                user_name TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE TABLE cache_meta (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE INDEX idx_tasks_status ON tasks(status);
            CREATE INDEX idx_notes_task ON notes(task_id);
            CREATE INDEX idx_deps_type ON dependencies(type);
            CREATE INDEX idx_activity_created ON activity_log(created_at);
            ",
            )?;

        self.conn
            .execute(&format!("PRAGMA user_version = {}", Self::SCHEMA_VERSION), [])?;

        Ok(())
    }

    /// Checks if the cache needs to be rebuilt
    ///
    /// The rebuild time is stored with second precision, so a source written
    /// within the same second as the rebuild counts as newer.
    pub fn is_stale(&self) -> Result<bool> {
        let Some(last_rebuild) = self.last_rebuild()? else {
            return Ok(true);
        };

        for path in &self.sources {
            if !path.exists() {
                continue;
            }
            let mtime = fs::metadata(path)
                .and_then(|m| m.modified())?;
            if mtime >= last_rebuild {
                log::debug!("Cache is stale: {} changed", path.display());
                return Ok(true);
            }
        }

        Ok(false)
    }

    /// Returns when the cache was last rebuilt, if ever
    pub fn last_rebuild(&self) -> Result<Option<SystemTime>> {
        let value: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM cache_meta WHERE key = 'last_rebuild'",
                [],
                |row| row.get(0),
            )
            .optional()?;

        Ok(value
            .and_then(|s| s.parse::<u64>().ok())
            .map(|secs| SystemTime::UNIX_EPOCH + Duration::from_secs(secs)))
    }

    fn record_rebuild(&self, read_at: SystemTime) -> Result<()> {
        let secs = read_at
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        self.conn
            .execute(
                "INSERT OR REPLACE INTO cache_meta (key, value) VALUES ('last_rebuild', ?1)",
                params![secs.to_string()],
            )?;

        Ok(())
    }

    /// Rebuilds the cache from source records
    pub fn rebuild(&mut self, source: CacheSource<'_>) -> Result<()> {
        let tx = self.conn.transaction()?;

        tx.execute_batch(
            "
            DELETE FROM activity_log;
            DELETE FROM dependencies;
            DELETE FROM notes;
            DELETE FROM tasks;
            ",
        )?;

        {
            let mut stmt = tx
                .prepare(
                    "INSERT OR REPLACE INTO tasks (id, title, status, priority, assignee, progress, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                )?;

            for task in source.tasks {
                stmt.execute(params![
                    task.id.to_string(),
                    task.title,
                    task.status.as_str(),
                    task.priority.as_str(),
                    task.assignee(),
                    task.progress,
                    timestamp(&task.created_at),
                    timestamp(&task.updated_at),
                ])?;
            }
        }

        {
            let mut stmt = tx
                .prepare(
                    "INSERT OR REPLACE INTO notes (id, task_id, author, created_at)
                     VALUES (?1, ?2, ?3, ?4)",
                )?;

            for note in source.notes {
                stmt.execute(params![
                    note.id.to_string(),
                    note.task_id.to_string(),
                    note.author,
                    timestamp(&note.created_at),
                ])?;
            }
        }

        {
            let mut stmt = tx
                .prepare(
                    "INSERT OR REPLACE INTO dependencies (id, task_id, depends_on_task_id, type, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                )?;

            for dep in source.dependencies {
                stmt.execute(params![
                    dep.id.to_string(),
                    dep.task_id.to_string(),
                    dep.depends_on_task_id.to_string(),
                    dep.dep_type.as_str(),
                    timestamp(&dep.created_at),
                ])?;
            }
        }

        {
            let mut stmt = tx
                .prepare(
                    "INSERT OR REPLACE INTO activity_log (id, task_id, action, details, user_name, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                )?;

            for entry in source.activity {
                stmt.execute(params![
                    entry.id.to_string(),
                    entry.task_id.as_ref().map(|id| id.to_string()),
                    entry.action.as_str(),
                    entry.details,
                    entry.user_name,
                    timestamp(&entry.created_at),
                ])?;
            }
        }

        tx.commit()?;

        self.record_rebuild(source.read_at)?;

        log::info!(
            "Rebuilt cache: {} tasks, {} notes, {} dependencies, {} activity entries",
            source.tasks.len(),
            source.notes.len(),
            source.dependencies.len(),
            source.activity.len()
        );

        Ok(())
    }

    /// Query: every `blocks` edge joined with both endpoints, in edge order
    ///
    /// LEFT JOINs keep edges whose endpoint is gone; that side comes back as `None`.
    pub fn blocking_edges(&self) -> Result<Vec<DependencyEdge>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT t.id, t.title, t.status, b.id, b.title, b.status
                 FROM dependencies d
                 LEFT JOIN tasks t ON d.task_id = t.id
                 LEFT JOIN tasks b ON d.depends_on_task_id = b.id
                 WHERE d.type = 'blocks'
                 ORDER BY d.seq",
            )?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row_task_ref(row, 0)?,
                    row_task_ref(row, 3)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(dependent, blocker)| -> Result<DependencyEdge> {
                Ok(DependencyEdge {
                    dependent: dependent.map(parse_task_ref).transpose()?,
                    blocker: blocker.map(parse_task_ref).transpose()?,
                    dep_type: DependencyType::Blocks,
                })
            })
            .collect()
    }

    /// Query: newest activity entries first, each with its task's current title
    pub fn recent_activity(&self, limit: usize) -> Result<Vec<ActivityView>> {
        let mut stmt = self.conn.prepare(
            "SELECT a.id, a.task_id, a.action, a.details, a.user_name, a.created_at, t.title
             FROM activity_log a
             LEFT JOIN tasks t ON a.task_id = t.id
             ORDER BY a.created_at DESC, a.seq DESC
             LIMIT ?1",
        )?;

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = stmt
            .query_map(params![limit], |row| {
                Ok(RawActivity {
                    id: row.get(0)?,
                    task_id: row.get(1)?,
                    action: row.get(2)?,
                    details: row.get(3)?,
                    user_name: row.get(4)?,
                    created_at: row.get(5)?,
                    task_title: row.get(6)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|raw| raw.into_view().map_err(Into::into))
            .collect()
    }

    /// Query: task counts by status (every status present, possibly zero)
    pub fn task_counts(&self) -> Result<HashMap<TaskStatus, usize>> {
        let mut counts: HashMap<TaskStatus, usize> =
            TaskStatus::ALL.iter().map(|&s| (s, 0)).collect();

        let mut stmt = self
            .conn
            .prepare("SELECT status, COUNT(*) FROM tasks GROUP BY status")?;

        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?;

        for row in rows {
            let (status, count) = row?;
            let status = parse_status(&status)?;
            counts.insert(status, count as usize);
        }

        Ok(counts)
    }

    /// Query: number of rows per table
    pub fn row_counts(&self) -> Result<Vec<(&'static str, usize)>> {
        ["tasks", "notes", "dependencies", "activity_log"]
            .into_iter()
            .map(|table| -> Result<(&'static str, usize)> {
                let count: i64 = self
                    .conn
                    .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))?;
                Ok((table, count as usize))
            })
            .collect()
    }

    /// Returns the path to the cache database
    pub fn path(&self) -> &Path {
        &self.db_path
    }
}

/// Cached timestamps use a fixed-width UTC format so they sort as text
fn timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn invalid(column: &'static str, value: &str) -> CacheError {
    CacheError::InvalidValue {
        column,
        value: value.to_string(),
    }
}

struct RawActivity {
    id: String,
    task_id: Option<String>,
    action: String,
    details: String,
    user_name: String,
    created_at: String,
    task_title: Option<String>,
}

impl RawActivity {
    fn into_view(self) -> Result<ActivityView, CacheError> {
        let entry = ActivityEntry {
            id: self.id.parse().map_err(|_| invalid("activity_log.id", &self.id))?,
            task_id: self
                .task_id
                .as_deref()
                .map(|id| id.parse().map_err(|_| invalid("activity_log.task_id", id)))
                .transpose()?,
            action: self
                .action
                .parse()
                .map_err(|_| invalid("activity_log.action", &self.action))?,
            details: self.details,
            user_name: self.user_name,
            created_at: DateTime::parse_from_rfc3339(&self.created_at)
                .map_err(|_| invalid("activity_log.created_at", &self.created_at))?
                .with_timezone(&Utc),
        };
        Ok(ActivityView::new(entry, self.task_title))
    }
}

type RawTaskRef = (String, String, String);

fn row_task_ref(row: &Row<'_>, start: usize) -> rusqlite::Result<Option<RawTaskRef>> {
    let id: Option<String> = row.get(start)?;
    let title: Option<String> = row.get(start + 1)?;
    let status: Option<String> = row.get(start + 2)?;
    Ok(match (id, title, status) {
        (Some(id), Some(title), Some(status)) => Some((id, title, status)),
        _ => None,
    })
}

fn parse_task_ref((id, title, status): RawTaskRef) -> Result<TaskRef, CacheError> {
    Ok(TaskRef {
        id: id.parse().map_err(|_| invalid("tasks.id", &id))?,
        title,
        status: parse_status(&status)?,
    })
}

fn parse_status(value: &str) -> Result<TaskStatus, CacheError> {
    TaskStatus::from_str(value).map_err(|_| invalid("tasks.status", value))
}
