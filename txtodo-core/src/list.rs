//! Ordered task list backed by a todo.txt file
//!
//! Ids are process-local: they are handed out by a counter owned by the
//! list and restart at 1 whenever the file is reloaded.

use std::collections::BTreeSet;
use std::fmt;
use std::ops::Index;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::error::{CoreError, Result};
use crate::filter::{self, SortMode};
use crate::storage::TodoFile;
use crate::task::{Task, TaskId};
use crate::watch::{ChangeSignal, FileWatch, ListChange, ListListener};

/// Outcome of [`TaskList::complete`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Task was already done
    Unchanged,
    /// Task is now done
    Done,
    /// A done copy was appended and the original rescheduled
    Recurred { done: TaskId, next_due: NaiveDate },
}

/// Counts shown in a list header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Summary {
    pub pending: usize,
    pub due: usize,
}

/// The tasks of one todo file, in file order
#[derive(Default)]
pub struct TaskList {
    items: Vec<Task>,
    next_id: u32,
    file: Option<TodoFile>,
    listeners: Vec<Box<dyn ListListener>>,
}

impl TaskList {
    /// Build an in-memory list from raw lines; blank lines are skipped
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list = Self::default();
        list.load_lines(lines);
        list
    }

    /// Open a todo file; the archive defaults to `done.txt` beside it
    pub fn open(path: impl Into<PathBuf>, archive_path: Option<PathBuf>) -> Result<Self> {
        let mut list = Self {
            file: Some(TodoFile::new(path, archive_path)),
            ..Self::default()
        };
        list.reload()?;
        info!(path = %list.path()?.display(), count = list.len(), "opened todo file");
        Ok(list)
    }

    fn load_lines<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.next_id = 1;
        self.items.clear();
        for line in lines {
            let line = line.as_ref();
            if line.trim().is_empty() {
                continue;
            }
            let id = self.allocate_id();
            self.items.push(Task::new(id, line));
        }
    }

    fn allocate_id(&mut self) -> TaskId {
        // Default leaves the counter at 0
        self.next_id = self.next_id.max(1);
        let id = TaskId(self.next_id);
        self.next_id += 1;
        id
    }

    fn file(&self) -> Result<&TodoFile> {
        self.file.as_ref().ok_or(CoreError::NotFileBacked)
    }

    fn file_mut(&mut self) -> Result<&mut TodoFile> {
        self.file.as_mut().ok_or(CoreError::NotFileBacked)
    }

    /// Path of the todo file
    pub fn path(&self) -> Result<&Path> {
        Ok(self.file()?.path())
    }

    /// Path of the archive file
    pub fn archive_path(&self) -> Result<&Path> {
        Ok(self.file()?.archive_path())
    }

    /// Register a listener for structural changes
    pub fn add_listener(&mut self, listener: impl ListListener + 'static) {
        self.listeners.push(Box::new(listener));
    }

    fn notify(&mut self, change: ListChange) {
        for listener in &mut self.listeners {
            listener.list_changed(change);
        }
    }

    /// Whether the todo file was modified since we last read or wrote it
    pub fn has_file_changed(&self) -> Result<bool> {
        self.file()?.has_changed()
    }

    /// Re-read the file, discarding unsaved edits and reassigning ids from 1
    pub fn reload(&mut self) -> Result<()> {
        let lines = self.file_mut()?.read_lines()?;
        self.load_lines(lines);
        self.notify(ListChange::Reloaded);
        Ok(())
    }

    /// Reload if the file changed on disk; returns whether it did
    pub fn check_for_changes(&mut self) -> Result<bool> {
        if !self.has_file_changed()? {
            return Ok(false);
        }
        info!("todo file changed on disk, reloading");
        self.reload()?;
        Ok(true)
    }

    /// Start `watch` on the todo file
    pub fn watch(&self, watch: &mut dyn FileWatch, signal: ChangeSignal) -> Result<()> {
        watch.start(self.path()?, signal)
    }

    /// Write every task, in list order, one line each
    ///
    /// Tasks whose text was cleared are skipped so the file never holds
    /// blank lines.
    pub fn save(&mut self) -> Result<()> {
        let Self { items, file, .. } = self;
        let file = file.as_mut().ok_or(CoreError::NotFileBacked)?;
        file.write_lines(items.iter().map(Task::raw).filter(|line| !line.is_empty()))
    }

    /// Move matching tasks to the archive, then save
    ///
    /// Returns how many tasks were archived.
    pub fn archive_tasks(&mut self, predicate: impl Fn(&Task) -> bool) -> Result<usize> {
        let archived = {
            let file = self.file()?;
            file.append_archive(self.items.iter().filter(|t| predicate(t)).map(Task::raw))?
        };
        self.items.retain(|t| !predicate(t));
        self.save()?;
        info!(count = archived, "archived tasks");
        self.notify(ListChange::Archived(archived));
        Ok(archived)
    }

    /// Restore the most recently archived line as a new task
    ///
    /// Each call undoes exactly one archived line, newest first. Returns
    /// `None` when the archive has nothing left to restore. The archive is
    /// only truncated once the todo file holds the restored line; if saving
    /// fails the list and archive are left as they were.
    pub fn undo_archive(&mut self) -> Result<Option<&Task>> {
        let Some((offset, text)) = self.file()?.last_archive_line()? else {
            return Ok(None);
        };
        let id = self.append(&text).id();
        if let Err(e) = self.save() {
            self.delete_by_id(id);
            return Err(e);
        }
        self.file()?.truncate_archive(offset)?;
        info!(%id, "restored task from archive");
        self.notify(ListChange::Unarchived(id));
        Ok(self.get(id))
    }

    /// Insert a new task at `index`, or append when `index` is past the end
    pub fn insert_at(&mut self, index: usize, text: &str) -> &mut Task {
        let id = self.allocate_id();
        let index = index.min(self.items.len());
        self.items.insert(index, Task::new(id, text));
        debug!(%id, index, "inserted task");
        self.notify(ListChange::Inserted(id));
        &mut self.items[index]
    }

    /// Append a new task at the end of the list
    pub fn append(&mut self, text: &str) -> &mut Task {
        self.insert_at(self.items.len(), text)
    }

    /// Remove the task with `id`, if present
    pub fn delete_by_id(&mut self, id: TaskId) -> Option<Task> {
        let index = self.index_of(id)?;
        let task = self.items.remove(index);
        debug!(%id, "removed task");
        self.notify(ListChange::Removed(id));
        Some(task)
    }

    pub fn index_of(&self, id: TaskId) -> Option<usize> {
        self.items.iter().position(|t| t.id() == id)
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.items.iter().find(|t| t.id() == id)
    }

    pub fn get_mut(&mut self, id: TaskId) -> Option<&mut Task> {
        self.items.iter_mut().find(|t| t.id() == id)
    }

    /// Get mutable or return error if task not found
    pub fn get_mut_or_err(&mut self, id: TaskId) -> Result<&mut Task> {
        self.get_mut(id).ok_or(CoreError::TaskNotFound(id.0))
    }

    /// Complete a task, spawning the next instance of recurring tasks
    ///
    /// For a recurring task the done line is appended as a copy, while the
    /// original stays pending with the next due date and today's creation
    /// date.
    pub fn complete(&mut self, id: TaskId, today: NaiveDate) -> Result<Completion> {
        let task = self.get_mut_or_err(id)?;
        if task.is_done() {
            return Ok(Completion::Unchanged);
        }
        let before = task.raw().to_string();
        let Some(next_due) = task.set_done(true, today) else {
            return Ok(Completion::Done);
        };

        let done_line = task.raw().to_string();
        task.update(&before);
        task.set_due(next_due);
        task.set_creation_date(today);
        let done = self.append(&done_line).id();
        Ok(Completion::Recurred { done, next_due })
    }

    pub fn items(&self) -> &[Task] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Task> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sorted, deduplicated contexts across all tasks
    pub fn all_contexts(&self) -> Vec<String> {
        self.items
            .iter()
            .flat_map(|t| t.contexts().iter().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Sorted, deduplicated projects across all tasks
    pub fn all_projects(&self) -> Vec<String> {
        self.items
            .iter()
            .flat_map(|t| t.projects().iter().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Tasks in a transient sorted order; the list itself is not reordered
    pub fn sorted(&self, mode: SortMode) -> Vec<&Task> {
        filter::sorted(&self.items, mode)
    }

    /// Pending and due-today counts
    pub fn summary(&self, today: NaiveDate) -> Summary {
        Summary {
            pending: filter::filter_pending(&self.items).len(),
            due: filter::filter_due(&self.items, today).len(),
        }
    }
}

impl fmt::Debug for TaskList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskList")
            .field("items", &self.items)
            .field("next_id", &self.next_id)
            .field("file", &self.file)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Index<usize> for TaskList {
    type Output = Task;

    fn index(&self, index: usize) -> &Task {
        &self.items[index]
    }
}

impl<'a> IntoIterator for &'a TaskList {
    type Item = &'a Task;
    type IntoIter = std::slice::Iter<'a, Task>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
