//! Change notification seams between the list engine and a UI
//!
//! The core never watches the file system itself. A [`FileWatch`]
//! implementation observes the todo file and fires a [`ChangeSignal`]; the
//! thread owning the [`TaskList`](crate::TaskList) then calls
//! [`TaskList::check_for_changes`](crate::TaskList::check_for_changes).
//! Structural changes to the list are reported to [`ListListener`]s.

use std::path::Path;

use crate::error::Result;
use crate::task::TaskId;

/// Structural change to a task list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListChange {
    Inserted(TaskId),
    Removed(TaskId),
    /// Tasks were re-read from disk and ids reassigned
    Reloaded,
    /// Number of tasks moved to the archive
    Archived(usize),
    /// A task was restored from the archive
    Unarchived(TaskId),
}

/// Receives list change notifications
pub trait ListListener {
    fn list_changed(&mut self, change: ListChange);
}

impl<F> ListListener for F
where
    F: FnMut(ListChange),
{
    fn list_changed(&mut self, change: ListChange) {
        self(change)
    }
}

/// Callback fired by a watcher when the watched file may have changed
///
/// Runs on the watcher's thread; it should only hand the signal over to
/// the thread that owns the list.
pub type ChangeSignal = Box<dyn Fn() + Send + 'static>;

/// A file watching service
pub trait FileWatch {
    /// Begin watching `path`, firing `signal` on modification
    fn start(&mut self, path: &Path, signal: ChangeSignal) -> Result<()>;

    /// Stop watching and release the signal
    fn stop(&mut self);
}
