//! File-based task store: one markdown file per task under a data
//! directory, plus `store.toml` carrying the id counter. The store owns
//! creation, mutation, and deletion; readers get a full snapshot via
//! [`TaskStore::all`].

pub mod parser;

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::models::due::parse_stamp;
use crate::models::{DEFAULT_PRIORITY, Task, parse_due_date};
use parser::{generate_task_file, parse_task_file};

const META_FILE: &str = "store.toml";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("task {id} not found")]
    NotFound { id: u32 },

    #[error("task content must not be empty")]
    EmptyContent,

    #[error("malformed task file {path}: {reason}")]
    Malformed { path: PathBuf, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("store metadata: {0}")]
    MetaRead(#[from] toml::de::Error),

    #[error("store metadata: {0}")]
    MetaWrite(#[from] toml::ser::Error),
}

/// Fields supplied when creating a task. The caller stamps `created_date`
/// so the store never reads a clock.
#[derive(Debug, Clone)]
pub struct TaskDraft {
    pub content: String,
    pub priority: Option<String>,
    pub due_date: Option<NaiveDateTime>,
    pub created_date: NaiveDateTime,
}

/// A partial update. `None` leaves a field untouched; the nested option on
/// `due_date` distinguishes "clear the deadline" from "keep it".
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub content: Option<String>,
    pub completed: Option<bool>,
    pub priority: Option<String>,
    pub due_date: Option<Option<NaiveDateTime>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoreMeta {
    next_id: u32,
}

pub struct TaskStore {
    root: PathBuf,
    next_id: u32,
}

impl TaskStore {
    /// Open (or initialize) a store rooted at `root`. The persisted id
    /// counter is raised past any task already on disk, so ids stay unique
    /// even when the meta file is lost.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root)?;

        let meta_path = root.join(META_FILE);
        let next_id = if meta_path.exists() {
            let meta: StoreMeta = toml::from_str(&fs::read_to_string(&meta_path)?)?;
            meta.next_id
        } else {
            1
        };

        let mut store = Self { root, next_id };
        let highest = store.all()?.last().map(|task| task.id).unwrap_or(0);
        if store.next_id <= highest {
            store.next_id = highest + 1;
        }
        store.save_meta()?;

        Ok(store)
    }

    /// Read-all snapshot in the store's natural order (ascending id).
    /// Unreadable files are skipped with a warning rather than failing the
    /// whole listing.
    pub fn all(&self) -> Result<Vec<Task>, StoreError> {
        let mut tasks = Vec::new();

        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("md") {
                continue;
            }
            match load_task(&path) {
                Ok(task) => tasks.push(task),
                Err(err) => warn!("skipping task file {}: {err}", path.display()),
            }
        }

        tasks.sort_by_key(|task| task.id);
        Ok(tasks)
    }

    pub fn get(&self, id: u32) -> Result<Task, StoreError> {
        let path = self.task_path(id);
        if !path.exists() {
            return Err(StoreError::NotFound { id });
        }
        load_task(&path)
    }

    /// Create a task. Content is trimmed; empty-after-trim is rejected.
    pub fn add(&mut self, draft: TaskDraft) -> Result<Task, StoreError> {
        let content = normalize_content(&draft.content);
        if content.is_empty() {
            return Err(StoreError::EmptyContent);
        }

        let task = Task {
            id: self.next_id,
            content,
            completed: false,
            priority: draft
                .priority
                .filter(|p| !p.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_PRIORITY.to_string()),
            due_date: draft.due_date,
            created_date: draft.created_date,
        };
        self.write_task(&task)?;

        self.next_id += 1;
        self.save_meta()?;

        Ok(task)
    }

    /// Apply a partial update. Content that trims to empty keeps the
    /// previous value; `created_date` is never touched.
    pub fn update(&mut self, id: u32, patch: TaskPatch) -> Result<Task, StoreError> {
        let mut task = self.get(id)?;

        if let Some(content) = patch.content {
            let normalized = normalize_content(&content);
            if !normalized.is_empty() {
                task.content = normalized;
            }
        }
        if let Some(completed) = patch.completed {
            task.completed = completed;
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
        }
        if let Some(due_date) = patch.due_date {
            task.due_date = due_date;
        }

        self.write_task(&task)?;
        Ok(task)
    }

    pub fn toggle(&mut self, id: u32) -> Result<Task, StoreError> {
        let mut task = self.get(id)?;
        task.completed = !task.completed;
        self.write_task(&task)?;
        Ok(task)
    }

    pub fn delete(&mut self, id: u32) -> Result<(), StoreError> {
        let path = self.task_path(id);
        if !path.exists() {
            return Err(StoreError::NotFound { id });
        }
        fs::remove_file(path)?;
        Ok(())
    }

    fn task_path(&self, id: u32) -> PathBuf {
        self.root.join(format!("{id}.md"))
    }

    fn write_task(&self, task: &Task) -> Result<(), StoreError> {
        fs::write(self.task_path(task.id), generate_task_file(task))?;
        Ok(())
    }

    fn save_meta(&self) -> Result<(), StoreError> {
        let meta = StoreMeta {
            next_id: self.next_id,
        };
        fs::write(self.root.join(META_FILE), toml::to_string_pretty(&meta)?)?;
        Ok(())
    }
}

/// Content lives on the heading line of the task file, so it must stay
/// single-line: trim and collapse all internal whitespace runs.
fn normalize_content(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn load_task(path: &Path) -> Result<Task, StoreError> {
    let text = fs::read_to_string(path)?;
    let parsed = parse_task_file(&text).map_err(|reason| StoreError::Malformed {
        path: path.to_path_buf(),
        reason,
    })?;

    let id = parsed
        .metadata
        .get("id")
        .and_then(|raw| raw.parse::<u32>().ok())
        .or_else(|| {
            // Fall back to a numeric filename for hand-created files.
            path.file_stem()
                .and_then(|stem| stem.to_str())
                .and_then(|stem| stem.parse::<u32>().ok())
        })
        .ok_or_else(|| StoreError::Malformed {
            path: path.to_path_buf(),
            reason: "missing id".to_string(),
        })?;

    let created_date = parsed
        .metadata
        .get("created")
        .and_then(|raw| parse_stamp(raw))
        .ok_or_else(|| StoreError::Malformed {
            path: path.to_path_buf(),
            reason: "missing or malformed created timestamp".to_string(),
        })?;

    let completed = parsed
        .metadata
        .get("completed")
        .is_some_and(|raw| raw == "true");

    let priority = parsed
        .metadata
        .get("priority")
        .cloned()
        .unwrap_or_else(|| DEFAULT_PRIORITY.to_string());

    // A deadline that no longer parses is dropped, not fatal.
    let due_date = parsed
        .metadata
        .get("due")
        .and_then(|raw| parse_due_date(raw).ok());

    Ok(Task {
        id,
        content: parsed.heading,
        completed,
        priority,
        due_date,
        created_date,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::parse_due_date;
    use tempfile::TempDir;

    fn now() -> NaiveDateTime {
        parse_due_date("2024-01-08 12:00").unwrap()
    }

    fn draft(content: &str) -> TaskDraft {
        TaskDraft {
            content: content.to_string(),
            priority: None,
            due_date: None,
            created_date: now(),
        }
    }

    fn open_store(dir: &TempDir) -> TaskStore {
        TaskStore::open(dir.path()).unwrap()
    }

    #[test]
    fn add_assigns_sequential_ids_and_defaults() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir);

        let first = store.add(draft("first")).unwrap();
        let second = store.add(draft("second")).unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert!(!first.completed);
        assert_eq!(first.priority, DEFAULT_PRIORITY);
        assert_eq!(first.due_date, None);
    }

    #[test]
    fn add_trims_content() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir);

        let task = store.add(draft("  tidy desk  ")).unwrap();
        assert_eq!(task.content, "tidy desk");
    }

    #[test]
    fn add_flattens_multiline_content() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir);

        let task = store.add(draft("first line\nsecond line")).unwrap();
        assert_eq!(task.content, "first line second line");
        assert_eq!(store.get(task.id).unwrap().content, task.content);
    }

    #[test]
    fn add_rejects_whitespace_only_content() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir);

        assert!(matches!(
            store.add(draft("   ")),
            Err(StoreError::EmptyContent)
        ));
        assert!(store.all().unwrap().is_empty());
    }

    #[test]
    fn add_keeps_unrecognized_priority_verbatim() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir);

        let task = store
            .add(TaskDraft {
                priority: Some("someday".to_string()),
                ..draft("stretch goal")
            })
            .unwrap();
        assert_eq!(task.priority, "someday");
        assert_eq!(store.get(task.id).unwrap().priority, "someday");
    }

    #[test]
    fn all_returns_tasks_in_id_order() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir);

        for content in ["a", "b", "c"] {
            store.add(draft(content)).unwrap();
        }

        let ids: Vec<u32> = store.all().unwrap().iter().map(|t| t.id).collect();
        assert_eq!(ids, [1, 2, 3]);
    }

    #[test]
    fn tasks_survive_reopen() {
        let dir = TempDir::new().unwrap();
        {
            let mut store = open_store(&dir);
            let mut task_draft = draft("persisted");
            task_draft.due_date = Some(parse_due_date("2024-02-01").unwrap());
            store.add(task_draft).unwrap();
        }

        let store = open_store(&dir);
        let tasks = store.all().unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].content, "persisted");
        assert_eq!(tasks[0].due_date, Some(parse_due_date("2024-02-01").unwrap()));
        assert_eq!(tasks[0].created_date, now());
    }

    #[test]
    fn ids_are_never_reused_after_delete() {
        let dir = TempDir::new().unwrap();
        {
            let mut store = open_store(&dir);
            store.add(draft("a")).unwrap();
            let latest = store.add(draft("b")).unwrap();
            store.delete(latest.id).unwrap();
        }

        // Even across a reopen, the deleted id 2 must not come back.
        let mut store = open_store(&dir);
        let task = store.add(draft("c")).unwrap();
        assert_eq!(task.id, 3);
    }

    #[test]
    fn counter_recovers_when_meta_file_is_lost() {
        let dir = TempDir::new().unwrap();
        {
            let mut store = open_store(&dir);
            store.add(draft("a")).unwrap();
            store.add(draft("b")).unwrap();
        }
        fs::remove_file(dir.path().join(META_FILE)).unwrap();

        let mut store = open_store(&dir);
        assert_eq!(store.add(draft("c")).unwrap().id, 3);
    }

    #[test]
    fn update_edits_content_and_retains_on_empty() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir);
        let task = store.add(draft("original")).unwrap();

        let edited = store
            .update(
                task.id,
                TaskPatch {
                    content: Some("  revised  ".to_string()),
                    ..TaskPatch::default()
                },
            )
            .unwrap();
        assert_eq!(edited.content, "revised");

        let unchanged = store
            .update(
                task.id,
                TaskPatch {
                    content: Some("   ".to_string()),
                    ..TaskPatch::default()
                },
            )
            .unwrap();
        assert_eq!(unchanged.content, "revised");
    }

    #[test]
    fn update_sets_and_clears_due_date() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir);
        let task = store.add(draft("dated")).unwrap();
        let due = parse_due_date("2024-03-01 09:00").unwrap();

        let dated = store
            .update(
                task.id,
                TaskPatch {
                    due_date: Some(Some(due)),
                    ..TaskPatch::default()
                },
            )
            .unwrap();
        assert_eq!(dated.due_date, Some(due));

        let cleared = store
            .update(
                task.id,
                TaskPatch {
                    due_date: Some(None),
                    ..TaskPatch::default()
                },
            )
            .unwrap();
        assert_eq!(cleared.due_date, None);
    }

    #[test]
    fn update_never_touches_created_date() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir);
        let task = store.add(draft("fixed birth")).unwrap();

        let edited = store
            .update(
                task.id,
                TaskPatch {
                    content: Some("renamed".to_string()),
                    completed: Some(true),
                    ..TaskPatch::default()
                },
            )
            .unwrap();
        assert_eq!(edited.created_date, task.created_date);
    }

    #[test]
    fn toggle_flips_completion_both_ways() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir);
        let task = store.add(draft("flip me")).unwrap();

        assert!(store.toggle(task.id).unwrap().completed);
        assert!(!store.toggle(task.id).unwrap().completed);
    }

    #[test]
    fn missing_ids_report_not_found() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir);

        assert!(matches!(store.get(99), Err(StoreError::NotFound { id: 99 })));
        assert!(matches!(
            store.toggle(99),
            Err(StoreError::NotFound { id: 99 })
        ));
        assert!(matches!(
            store.delete(99),
            Err(StoreError::NotFound { id: 99 })
        ));
        assert!(matches!(
            store.update(99, TaskPatch::default()),
            Err(StoreError::NotFound { id: 99 })
        ));
    }

    #[test]
    fn unreadable_files_are_skipped_not_fatal() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir);
        store.add(draft("good")).unwrap();
        fs::write(dir.path().join("999.md"), "no heading here\n").unwrap();

        let tasks = store.all().unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].content, "good");
    }

    #[test]
    fn malformed_stored_due_date_is_dropped() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);
        fs::write(
            dir.path().join("5.md"),
            "# Hand edited\n\nid: 5\ncreated: 2024-01-01T09:00:00\ndue: sometime soon\n",
        )
        .unwrap();

        let task = store.get(5).unwrap();
        assert_eq!(task.due_date, None);
    }

    #[test]
    fn numeric_filename_supplies_a_missing_id() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);
        fs::write(
            dir.path().join("12.md"),
            "# Filename id\n\ncreated: 2024-01-01T09:00:00\n",
        )
        .unwrap();

        assert_eq!(store.get(12).unwrap().id, 12);
    }
}
