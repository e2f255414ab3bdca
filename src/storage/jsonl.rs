//! JSONL storage for board records
//!
//! Each record kind lives in its own `.taskflow/<name>.jsonl` file with one
//! JSON object per line. Every operation holds an `fs2` lock on a sidecar
//! `<name>.jsonl.lock` file, shared for reads and exclusive for anything that
//! writes, so a read-modify-rewrite never loses a concurrent append.

use std::collections::HashMap;
use std::fmt::Display;
use std::fs::{self, File, OpenOptions};
use std::hash::Hash;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::domain::{
    ActivityEntry, ActivityId, Dependency, DependencyId, Note, NoteId, Task, TaskId,
};

/// A record that can be kept in a JSONL store
pub trait Record: Serialize + DeserializeOwned {
    type Id: Clone + Eq + Hash + Display;

    /// Human-readable name used in error messages
    const KIND: &'static str;

    fn id(&self) -> &Self::Id;
}

impl Record for Task {
    type Id = TaskId;
    const KIND: &'static str = "task";

    fn id(&self) -> &TaskId {
        &self.id
    }
}

impl Record for Note {
    type Id = NoteId;
    const KIND: &'static str = "note";

    fn id(&self) -> &NoteId {
        &self.id
    }
}

impl Record for Dependency {
    type Id = DependencyId;
    const KIND: &'static str = "dependency";

    fn id(&self) -> &DependencyId {
        &self.id
    }
}

impl Record for ActivityEntry {
    type Id = ActivityId;
    const KIND: &'static str = "activity";

    fn id(&self) -> &ActivityId {
        &self.id
    }
}

enum LockMode {
    Shared,
    Exclusive,
}

/// Store for one record kind in JSONL format
pub struct JsonlStore<R> {
    path: PathBuf,
    _record: PhantomData<R>,
}

pub type TaskStore = JsonlStore<Task>;
pub type NoteStore = JsonlStore<Note>;
pub type DependencyStore = JsonlStore<Dependency>;
pub type ActivityStore = JsonlStore<ActivityEntry>;

impl<R: Record> JsonlStore<R> {
    /// Creates a new store at the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _record: PhantomData,
        }
    }

    /// Returns the path to the store file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads all records in file order
    ///
    /// A record id seen twice keeps its first position and its last value,
    /// so appended updates win. Lines that fail to parse are skipped.
    pub fn read_all(&self) -> Result<Vec<R>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let _lock = self.lock(LockMode::Shared)?;
        self.read_locked()
    }

    /// Finds one record by id
    pub fn get(&self, id: &R::Id) -> Result<Option<R>> {
        Ok(self.read_all()?.into_iter().find(|r| r.id() == id))
    }

    /// Writes all records to the store (full rewrite, order kept)
    pub fn write_all(&self, records: &[R]) -> Result<()> {
        let _lock = self.lock(LockMode::Exclusive)?;
        self.write_locked(records)
    }

    /// Appends a single record without a full rewrite
    pub fn append(&self, record: &R) -> Result<()> {
        let _lock = self.lock(LockMode::Exclusive)?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open {} store: {}", R::KIND, self.path.display()))?;

        let mut writer = BufWriter::new(&file);
        let line = serde_json::to_string(record)
            .with_context(|| format!("Failed to serialize {}", R::KIND))?;
        writeln!(writer, "{}", line).with_context(|| format!("Failed to write {}", R::KIND))?;

        writer
            .flush()
            .with_context(|| format!("Failed to flush {} store", R::KIND))?;

        Ok(())
    }

    /// Replaces a record in place, or appends it if it's new
    pub fn upsert(&self, record: R) -> Result<()> {
        let _lock = self.lock(LockMode::Exclusive)?;

        let mut records = self.read_locked()?;
        match records.iter().position(|r| r.id() == record.id()) {
            Some(pos) => records[pos] = record,
            None => records.push(record),
        }
        self.write_locked(&records)
    }

    /// Removes every record matching the predicate, returning them
    pub fn remove_where(&self, mut predicate: impl FnMut(&R) -> bool) -> Result<Vec<R>> {
        let _lock = self.lock(LockMode::Exclusive)?;

        let records = self.read_locked()?;
        let (removed, kept): (Vec<R>, Vec<R>) = records.into_iter().partition(|r| predicate(r));

        if !removed.is_empty() {
            self.write_locked(&kept)?;
        }
        Ok(removed)
    }

    /// Removes a record by id
    pub fn remove(&self, id: &R::Id) -> Result<bool> {
        Ok(!self.remove_where(|r| r.id() == id)?.is_empty())
    }

    /// Path of the sidecar file every operation locks
    ///
    /// Rewrites replace the store file by rename, so the store file itself
    /// can't carry the lock.
    fn lock_path(&self) -> PathBuf {
        self.path.with_extension("jsonl.lock")
    }

    /// Locks the store until the returned file is dropped
    fn lock(&self, mode: LockMode) -> Result<File> {
        self.ensure_parent()?;

        let lock_path = self.lock_path();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .with_context(|| format!("Failed to open lock file: {}", lock_path.display()))?;

        match mode {
            LockMode::Shared => file
                .lock_shared()
                .with_context(|| format!("Failed to acquire read lock on {} store", R::KIND))?,
            LockMode::Exclusive => file
                .lock_exclusive()
                .with_context(|| format!("Failed to acquire write lock on {} store", R::KIND))?,
        }

        Ok(file)
    }

    fn read_locked(&self) -> Result<Vec<R>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)
            .with_context(|| format!("Failed to open {} store: {}", R::KIND, self.path.display()))?;

        let reader = BufReader::new(file);
        let mut records: Vec<R> = Vec::new();
        let mut positions: HashMap<R::Id, usize> = HashMap::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.with_context(|| format!("Failed to read line {}", line_num + 1))?;

            if line.trim().is_empty() {
                continue;
            }

            let record: R = match serde_json::from_str(&line) {
                Ok(record) => record,
                Err(e) => {
                    log::warn!(
                        "Skipping malformed {} at {}:{}: {}",
                        R::KIND,
                        self.path.display(),
                        line_num + 1,
                        e
                    );
                    continue;
                }
            };

            match positions.get(record.id()) {
                Some(&pos) => records[pos] = record,
                None => {
                    positions.insert(record.id().clone(), records.len());
                    records.push(record);
                }
            }
        }

        Ok(records)
    }

    fn write_locked(&self, records: &[R]) -> Result<()> {
        // Write to temp file first
        let temp_path = self.path.with_extension("jsonl.tmp");

        {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;

            let mut writer = BufWriter::new(&file);

            for record in records {
                let line = serde_json::to_string(record)
                    .with_context(|| format!("Failed to serialize {}", R::KIND))?;
                writeln!(writer, "{}", line)
                    .with_context(|| format!("Failed to write {}", R::KIND))?;
            }

            writer
                .flush()
                .with_context(|| format!("Failed to flush {} store", R::KIND))?;
        }

        // Atomic rename
        fs::rename(&temp_path, &self.path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                temp_path.display(),
                self.path.display()
            )
        })?;

        log::debug!("Wrote {} {} record(s) to {}", records.len(), R::KIND, self.path.display());
        Ok(())
    }

    fn ensure_parent(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TaskStatus;
    use chrono::Utc;
    use tempfile::TempDir;

    fn make_task(seq: u32) -> Task {
        let task_id = TaskId::new(&format!("Task {}", seq), Utc::now());
        Task::new(task_id, format!("Task {}", seq))
    }

    fn store(dir: &TempDir) -> TaskStore {
        TaskStore::new(dir.path().join("tasks.jsonl"))
    }

    #[test]
    fn read_empty_store() {
        let dir = TempDir::new().unwrap();
        assert!(store(&dir).read_all().unwrap().is_empty());
    }

    #[test]
    fn write_and_read_keeps_order() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        let tasks = vec![make_task(1), make_task(2), make_task(3)];
        store.write_all(&tasks).unwrap();

        let loaded = store.read_all().unwrap();
        let titles: Vec<_> = loaded.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["Task 1", "Task 2", "Task 3"]);
    }

    #[test]
    fn append_and_get() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        let task1 = make_task(1);
        let task2 = make_task(2);
        store.append(&task1).unwrap();
        store.append(&task2).unwrap();

        assert_eq!(store.read_all().unwrap().len(), 2);
        assert_eq!(store.get(&task2.id).unwrap().unwrap().title, "Task 2");
    }

    #[test]
    fn appended_update_wins_in_place() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        let mut task1 = make_task(1);
        let task2 = make_task(2);
        store.append(&task1).unwrap();
        store.append(&task2).unwrap();

        task1.status = TaskStatus::Done;
        store.append(&task1).unwrap();

        let loaded = store.read_all().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].id, task1.id);
        assert_eq!(loaded[0].status, TaskStatus::Done);
    }

    #[test]
    fn upsert_replaces_existing() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        let mut task = make_task(1);
        store.upsert(task.clone()).unwrap();

        task.status = TaskStatus::InProgress;
        store.upsert(task.clone()).unwrap();

        let loaded = store.read_all().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].status, TaskStatus::InProgress);
    }

    #[test]
    fn remove_task() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        let task1 = make_task(1);
        let task2 = make_task(2);
        store.write_all(&[task1.clone(), task2.clone()]).unwrap();

        assert!(store.remove(&task1.id).unwrap());
        assert!(!store.remove(&task1.id).unwrap());

        let loaded = store.read_all().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, task2.id);
    }

    #[test]
    fn remove_where_returns_removed() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        let mut done = make_task(1);
        done.status = TaskStatus::Done;
        store.write_all(&[done.clone(), make_task(2)]).unwrap();

        let removed = store.remove_where(|t| t.status == TaskStatus::Done).unwrap();

        assert_eq!(removed, vec![done]);
        assert_eq!(store.read_all().unwrap().len(), 1);
    }

    #[test]
    fn concurrent_appends_survive_rewrites() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tasks.jsonl");

        let mut existing = make_task(0);
        TaskStore::new(&path).append(&existing).unwrap();

        let appender = {
            let path = path.clone();
            std::thread::spawn(move || {
                let store = TaskStore::new(path);
                for seq in 1..=200 {
                    store.append(&make_task(seq)).unwrap();
                }
            })
        };

        let store = TaskStore::new(&path);
        for round in 0..200u32 {
            existing.progress = (round % 101) as u8;
            store.upsert(existing.clone()).unwrap();
        }
        appender.join().unwrap();

        let loaded = store.read_all().unwrap();
        assert_eq!(loaded.len(), 201);
        assert_eq!(loaded[0].id, existing.id);
    }

    #[test]
    fn lock_file_sits_next_to_store() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        store.append(&make_task(1)).unwrap();

        assert!(dir.path().join("tasks.jsonl.lock").is_file());
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        let task = make_task(1);
        store.append(&task).unwrap();
        let mut content = fs::read_to_string(store.path()).unwrap();
        content.push_str("{not json}\n");
        content.push_str("{\"id\":\"t-0000001\",\"title\":\"Bad\",\"status\":\"blocked\"}\n");
        fs::write(store.path(), content).unwrap();

        let loaded = store.read_all().unwrap();
        assert_eq!(loaded, vec![task]);
    }

    #[test]
    fn creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let store = TaskStore::new(dir.path().join("nested").join("dir").join("tasks.jsonl"));

        store.append(&make_task(1)).unwrap();

        assert!(store.path().exists());
    }

    #[test]
    fn atomic_write() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        store.write_all(&[make_task(1)]).unwrap();

        // Temp file should not exist after write
        let temp_path = store.path().with_extension("jsonl.tmp");
        assert!(!temp_path.exists());
    }
}
