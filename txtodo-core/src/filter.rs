//! Task filtering and sorting logic
//!
//! The primitives are plain functions over task slices so they can be
//! chained freely. [`TaskView`] chains them the way a list view does.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::date::{self, ISO_FORMAT};
use crate::error::CoreError;
use crate::list::TaskList;
use crate::search::{self, Search};
use crate::task::{Task, TaskId};

/// Sort order for tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    /// Due date, undated after dated
    #[default]
    Due,
    /// Raw line order, which puts `(A)`..`(Z)` first
    #[serde(rename = "prio", alias = "priority")]
    Priority,
}

impl FromStr for SortMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "due" => Ok(Self::Due),
            "prio" | "priority" => Ok(Self::Priority),
            other => Err(CoreError::validation(
                "sort",
                format!("unknown sort mode '{}', expected 'due' or 'prio'", other),
            )),
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Due => "due",
            Self::Priority => "prio",
        })
    }
}

/// Comparison key; done and deleted tasks always sort last
pub fn sort_key(task: &Task, mode: SortMode) -> String {
    let demote = if task.is_done() || task.is_deleted() {
        "z"
    } else {
        ""
    };
    match mode {
        SortMode::Due => {
            let due = task
                .due_date()
                .map_or_else(|| "9999".to_string(), |d| d.format(ISO_FORMAT).to_string());
            format!("{}{}{}", demote, due, task.raw())
        }
        SortMode::Priority => format!("{}{}", demote, task.raw()),
    }
}

/// Stable sort by [`sort_key`]
pub fn sorted<'a>(items: impl IntoIterator<Item = &'a Task>, mode: SortMode) -> Vec<&'a Task> {
    let mut tasks: Vec<&Task> = items.into_iter().collect();
    tasks.sort_by_cached_key(|t| sort_key(t, mode));
    tasks
}

/// Pending tasks due on or before `date`
pub fn filter_due<'a>(items: impl IntoIterator<Item = &'a Task>, date: NaiveDate) -> Vec<&'a Task> {
    items.into_iter().filter(|t| t.is_due(date)).collect()
}

pub fn filter_pending<'a>(items: impl IntoIterator<Item = &'a Task>) -> Vec<&'a Task> {
    items.into_iter().filter(|t| !t.is_done()).collect()
}

pub fn filter_done_or_deleted<'a>(items: impl IntoIterator<Item = &'a Task>) -> Vec<&'a Task> {
    items
        .into_iter()
        .filter(|t| t.is_done() || t.is_deleted())
        .collect()
}

/// Tasks carrying `context`, with or without the leading `@`
pub fn filter_by_context<'a>(
    items: impl IntoIterator<Item = &'a Task>,
    context: &str,
) -> Vec<&'a Task> {
    let wanted = if context.starts_with('@') {
        context.to_string()
    } else {
        format!("@{}", context)
    };
    items
        .into_iter()
        .filter(|t| t.contexts().iter().any(|c| *c == wanted))
        .collect()
}

/// Tasks due within `days` of `today`, plus undated ones
///
/// A negative window disables filtering.
pub fn filter_by_days<'a>(
    items: impl IntoIterator<Item = &'a Task>,
    days: i64,
    today: NaiveDate,
) -> Vec<&'a Task> {
    let items = items.into_iter();
    if days < 0 {
        return items.collect();
    }
    let Some(limit) = date::offset(today, days) else {
        return items.collect();
    };
    items
        .filter(|t| t.due_date().is_none_or(|due| due <= limit))
        .collect()
}

/// Builder for a filtered, sorted view of a list
#[derive(Debug, Clone)]
pub struct TaskView {
    pub sort: SortMode,
    /// Window in days; negative shows everything
    pub days: i64,
    pub context: Option<String>,
    pub search: Option<Search>,
    /// Task to keep even when filtered out, e.g. the one just edited
    pub keep: Option<TaskId>,
}

impl Default for TaskView {
    fn default() -> Self {
        Self {
            sort: SortMode::default(),
            days: -1,
            context: None,
            search: None,
            keep: None,
        }
    }
}

impl TaskView {
    /// Create a view with default settings
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sort_by(mut self, sort: SortMode) -> Self {
        self.sort = sort;
        self
    }

    pub fn within_days(mut self, days: i64) -> Self {
        self.days = days;
        self
    }

    pub fn in_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Set context filter
    pub fn with_context(mut self, context: Option<String>) -> Self {
        self.context = context;
        self
    }

    /// Filter by a search query; blank queries are ignored
    pub fn search(mut self, query: &str) -> Self {
        self.search = Search::new(query);
        self
    }

    pub fn keeping(mut self, id: TaskId) -> Self {
        self.keep = Some(id);
        self
    }

    /// Sort, window, then filter by context and search
    pub fn apply<'a>(&self, list: &'a TaskList, today: NaiveDate) -> Vec<&'a Task> {
        let mut tasks = sorted(list, self.sort);
        tasks = filter_by_days(tasks, self.days, today);
        if let Some(context) = &self.context {
            tasks = filter_by_context(tasks, context);
        }
        tasks = search::search(self.search.as_ref(), tasks);

        if let Some(id) = self.keep {
            if !tasks.iter().any(|t| t.id() == id) {
                if let Some(task) = list.get(id) {
                    tasks.push(task);
                    tasks = sorted(tasks, self.sort);
                }
            }
        }
        tasks
    }
}
