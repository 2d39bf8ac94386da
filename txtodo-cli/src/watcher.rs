//! File system event watcher for the todo file

use std::fs;
use std::path::{Path, PathBuf};

use notify::event::{EventKind, ModifyKind};
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, warn};
use txtodo_core::{ChangeSignal, CoreError, FileWatch};

/// Forwards OS change events for one file to a [`ChangeSignal`]
///
/// The parent directory is watched rather than the file, so editors that
/// save by writing a new file and renaming it over the old one are still
/// seen.
#[derive(Default)]
pub struct EventWatch {
    watcher: Option<RecommendedWatcher>,
}

impl EventWatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.watcher.is_some()
    }
}

/// Whether `event` may have changed the contents at `target`
fn touches(event: &Event, target: &Path) -> bool {
    let relevant = matches!(
        event.kind,
        EventKind::Create(_)
            | EventKind::Modify(ModifyKind::Data(_) | ModifyKind::Name(_) | ModifyKind::Any)
    );
    relevant && event.paths.iter().any(|p| p == target)
}

impl FileWatch for EventWatch {
    fn start(&mut self, path: &Path, signal: ChangeSignal) -> txtodo_core::Result<()> {
        if self.is_running() {
            return Err(CoreError::validation("watch", "watcher is already running"));
        }
        let target = fs::canonicalize(path)
            .map_err(|e| CoreError::io("Failed to watch todo file", path, e))?;
        let dir = target
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        let watched = target.clone();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) if touches(&event, &watched) => {
                debug!(kind = ?event.kind, "todo file changed");
                signal();
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, "file watch error"),
        })
        .map_err(|e| CoreError::watch(&target, e))?;
        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .map_err(|e| CoreError::watch(&target, e))?;

        debug!(path = %target.display(), "starting file watch");
        self.watcher = Some(watcher);
        Ok(())
    }

    fn stop(&mut self) {
        if self.watcher.take().is_some() {
            debug!("stopped file watch");
        }
    }
}

impl Drop for EventWatch {
    fn drop(&mut self) {
        self.stop();
    }
}
