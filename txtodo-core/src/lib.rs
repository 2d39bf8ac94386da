//! txtodo Core - todo.txt task model and list engine
//!
//! Parsing and mutation of task lines is pure. File access is confined to
//! [`storage`], which [`TaskList`] uses when it is opened from a path.

pub mod date;
pub mod error;
pub mod filter;
pub mod list;
pub mod search;
pub mod storage;
pub mod task;
pub mod watch;

pub use error::{CoreError, Result};
pub use filter::{SortMode, TaskView};
pub use list::{Completion, Summary, TaskList};
pub use search::{Search, Segment};
pub use storage::TodoFile;
pub use task::{Recurrence, Status, StatusCategory, Task, TaskId};
pub use watch::{ChangeSignal, FileWatch, ListChange, ListListener};
