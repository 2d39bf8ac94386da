//! Task display formatting module
//!
//! Handles colored output for task rows and the list summary

use chrono::NaiveDate;
use colored::*;

use txtodo_core::date::humanize_date;
use txtodo_core::{Search, Segment, StatusCategory, Summary, Task};

/// How task rows are rendered
#[derive(Debug, Clone, Copy)]
pub struct RowStyle<'s> {
    pub today: NaiveDate,
    /// Start of next week, for the "due soon" status
    pub next_week: NaiveDate,
    /// Print the full line instead of the condensed description
    pub raw: bool,
    pub use_color: bool,
    pub search: Option<&'s Search>,
}

/// Check if terminal supports colors
pub fn supports_color() -> bool {
    atty::is(atty::Stream::Stdout)
}

/// Format a task for display
pub fn format_task(task: &Task, style: &RowStyle<'_>) -> String {
    let status = task.status(style.today, style.next_week);
    let text = if style.raw {
        task.raw().to_string()
    } else {
        task.description()
    };
    let text = highlight(&text, style);

    let id = format!("{:>3}", task.id().0);
    let due = task
        .due_date()
        .map(|d| format!("({})", humanize_date(Some(d), style.today)));

    if !style.use_color {
        return match due {
            Some(due) => format!("{} {} {}", id, text, due),
            None => format!("{} {}", id, text),
        };
    }

    let id = id.cyan().to_string();
    let due = due.map(|due| match status.category {
        StatusCategory::Overdue => due.red().bold().to_string(),
        StatusCategory::Due => due.yellow().bold().to_string(),
        StatusCategory::Todo if status.rank == 1 => due.yellow().to_string(),
        StatusCategory::Todo => due.normal().to_string(),
        StatusCategory::Done => due.dimmed().to_string(),
    });
    let text = match status.category {
        StatusCategory::Done => text.green().dimmed().to_string(),
        _ => text,
    };
    match due {
        Some(due) => format!("{} {} {}", id, text, due),
        None => format!("{} {}", id, text),
    }
}

fn highlight(text: &str, style: &RowStyle<'_>) -> String {
    let (Some(search), true) = (style.search, style.use_color) else {
        return text.to_string();
    };
    search
        .highlight(text)
        .into_iter()
        .map(|segment| match segment {
            Segment::Match(s) => s.bold().underline().to_string(),
            plain => plain.text().to_string(),
        })
        .collect()
}

/// Format a summary line for task list
pub fn format_summary(shown: usize, summary: Summary, use_color: bool) -> String {
    let due = if summary.due > 0 {
        let due = format!("{} due", summary.due);
        if use_color {
            due.yellow().to_string()
        } else {
            due
        }
    } else {
        String::new()
    };
    let parts = [
        format!("{} shown", shown),
        format!("{} pending", summary.pending),
        due,
    ];

    let summary: Vec<&str> = parts.iter().filter(|s| !s.is_empty()).map(|s| s.as_str()).collect();

    format!("[{}]", summary.join(" | "))
}
