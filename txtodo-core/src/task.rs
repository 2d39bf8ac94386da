//! todo.txt task record
//!
//! A task is one line of a todo.txt file:
//!
//! ```text
//! x 2000-01-02 (A) 2000-01-01 Description +project @context due:2000-01-09 rec:+1w
//! ```
//!
//! The raw line is the single source of truth. Every derived field is
//! recomputed from it after each mutation, and malformed tags simply leave
//! the corresponding field empty.

use std::fmt;
use std::ops::Range;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::date::{self, ISO_FORMAT, IntervalUnit};

/// Positional prefix: done marker, priority, creation date
static LAYOUT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:(x(?: (\d{4}-\d{2}-\d{2}))?)(?:\s+|$))?(?:\(([A-Z])\)(?:\s+|$))?(?:(\d{4}-\d{2}-\d{2})(?:\s+|$))?",
    )
    .expect("Invalid layout regex pattern")
});

static CONTEXT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\s)(@\S+)").expect("Invalid context regex pattern"));

static PROJECT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\s)(\+\S+)").expect("Invalid project regex pattern"));

static DUE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\s)due:(\d{4}-\d{2}-\d{2})(?:\s|$)").expect("Invalid due regex pattern")
});

// Any due tag, including relative expressions like `due:tomorrow`
static ANY_DUE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\s)(due:(\S+))").expect("Invalid due regex pattern"));

static REC_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\s)rec:(\+?)(\d+)([dwmy])(?:\s|$)").expect("Invalid rec regex pattern")
});

static DEL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\s)(del:(\S+))").expect("Invalid del regex pattern"));

/// Stands in for hidden tags in condensed descriptions
pub const PLACEHOLDER: &str = "\u{2026}";

/// Priority order used when cycling; the last entry means "no priority"
const PRIORITY_CYCLE: [Option<char>; 7] = [
    Some('A'),
    Some('B'),
    Some('C'),
    Some('D'),
    Some('E'),
    Some('F'),
    None,
];

/// Newtype wrapper for task IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TaskId(pub u32);

impl From<u32> for TaskId {
    fn from(id: u32) -> Self {
        TaskId(id)
    }
}

impl From<TaskId> for u32 {
    fn from(id: TaskId) -> Self {
        id.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A `rec:` tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Recurrence {
    /// `rec:+1w` recurs from the due date, `rec:1w` from completion
    pub from_due: bool,
    pub amount: u32,
    pub unit: IntervalUnit,
}

impl Recurrence {
    /// Due date of the next instance
    pub fn next_due(&self, due: Option<NaiveDate>, today: NaiveDate) -> Option<NaiveDate> {
        let base = if self.from_due {
            due.unwrap_or(today)
        } else {
            today
        };
        date::date_add_interval(base, self.unit, i64::from(self.amount))
    }

    fn scan(text: &str) -> Option<Self> {
        let caps = REC_REGEX.captures(text)?;
        Some(Self {
            from_due: !caps.get(1)?.as_str().is_empty(),
            amount: caps.get(2)?.as_str().parse().ok()?,
            unit: caps
                .get(3)
                .and_then(|m| m.as_str().chars().next())
                .and_then(IntervalUnit::from_char)?,
        })
    }
}

impl fmt::Display for Recurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = if self.from_due { "+" } else { "" };
        write!(f, "{}{}{}", prefix, self.amount, self.unit.as_char())
    }
}

/// Semantic status of a task, ordered by urgency through `rank`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusCategory {
    Done,
    Overdue,
    Due,
    Todo,
}

impl StatusCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Done => "done",
            Self::Overdue => "overdue",
            Self::Due => "due",
            Self::Todo => "todo",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Status {
    pub category: StatusCategory,
    pub rank: i32,
}

impl Status {
    const fn new(category: StatusCategory, rank: i32) -> Self {
        Self { category, rank }
    }
}

/// Fields derived from a raw line
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Fields {
    pub done: bool,
    pub done_date: Option<NaiveDate>,
    pub priority: Option<char>,
    pub creation_date: Option<NaiveDate>,
    pub contexts: Vec<String>,
    pub projects: Vec<String>,
    pub due_date: Option<NaiveDate>,
    pub recurrence: Option<Recurrence>,
    pub deleted: bool,
}

impl Fields {
    /// Run every scanner over `raw`
    pub fn scan(raw: &str) -> Self {
        let layout = Layout::parse(raw);
        Self {
            done: layout.done.is_some(),
            done_date: layout.done.as_deref().and_then(|m| parse_date(m.trim_start_matches("x "))),
            priority: layout.priority,
            creation_date: layout.created.as_deref().and_then(parse_date),
            contexts: scan_tokens(&CONTEXT_REGEX, raw),
            projects: scan_tokens(&PROJECT_REGEX, raw),
            due_date: DUE_REGEX
                .captures(raw)
                .and_then(|caps| caps.get(1))
                .and_then(|m| parse_date(m.as_str())),
            recurrence: Recurrence::scan(raw),
            deleted: DEL_REGEX
                .captures(raw)
                .and_then(|caps| caps.get(2))
                .is_some_and(|m| m.as_str() == "true"),
        }
    }
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, ISO_FORMAT).ok()
}

fn scan_tokens(regex: &Regex, raw: &str) -> Vec<String> {
    let mut tokens: Vec<String> = regex
        .captures_iter(raw)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .collect();
    tokens.sort();
    tokens.dedup();
    tokens
}

/// Remove `range` from `text`, leaving a single space between the neighbours
fn splice_out(text: &str, range: Range<usize>) -> String {
    let before = text[..range.start].trim_end();
    let after = text[range.end..].trim_start();
    match (before.is_empty(), after.is_empty()) {
        (true, _) => after.to_string(),
        (_, true) => before.to_string(),
        _ => format!("{} {}", before, after),
    }
}

/// The positional prefix of a line and everything after it
struct Layout {
    /// `x` or `x YYYY-MM-DD`
    done: Option<String>,
    priority: Option<char>,
    created: Option<String>,
    rest: String,
}

impl Layout {
    fn parse(raw: &str) -> Self {
        // All groups are optional, so the pattern always matches at 0
        let Some(caps) = LAYOUT_REGEX.captures(raw) else {
            return Self {
                done: None,
                priority: None,
                created: None,
                rest: raw.to_string(),
            };
        };
        let end = caps.get(0).map_or(0, |m| m.end());
        Self {
            done: caps.get(1).map(|m| m.as_str().to_string()),
            priority: caps.get(3).and_then(|m| m.as_str().chars().next()),
            created: caps.get(4).map(|m| m.as_str().to_string()),
            rest: raw[end..].to_string(),
        }
    }

    fn render(&self) -> String {
        let priority = self.priority.map(|p| format!("({})", p));
        [
            self.done.as_deref(),
            priority.as_deref(),
            self.created.as_deref(),
            Some(self.rest.as_str()),
        ]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
    }
}

/// A single todo.txt line
#[derive(Debug, Clone, Serialize)]
pub struct Task {
    id: TaskId,
    raw: String,
    #[serde(flatten)]
    fields: Fields,
}

impl Task {
    /// Parse `text` into a task with the given id
    pub fn new(id: TaskId, text: &str) -> Self {
        let mut task = Self {
            id,
            raw: String::new(),
            fields: Fields::default(),
        };
        task.update(text);
        task
    }

    /// Replace the raw line and re-derive every field
    pub fn update(&mut self, text: &str) {
        self.raw = text.trim().to_string();
        self.fields = Fields::scan(&self.raw);
    }

    fn rewrite_layout(&mut self, edit: impl FnOnce(&mut Layout)) {
        let mut layout = Layout::parse(&self.raw);
        edit(&mut layout);
        let text = layout.render();
        self.update(&text);
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// All derived fields
    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn priority(&self) -> Option<char> {
        self.fields.priority
    }

    pub fn contexts(&self) -> &[String] {
        &self.fields.contexts
    }

    pub fn projects(&self) -> &[String] {
        &self.fields.projects
    }

    pub fn creation_date(&self) -> Option<NaiveDate> {
        self.fields.creation_date
    }

    pub fn done_date(&self) -> Option<NaiveDate> {
        self.fields.done_date
    }

    pub fn due_date(&self) -> Option<NaiveDate> {
        self.fields.due_date
    }

    pub fn recurrence(&self) -> Option<Recurrence> {
        self.fields.recurrence
    }

    pub fn is_done(&self) -> bool {
        self.fields.done
    }

    pub fn is_deleted(&self) -> bool {
        self.fields.deleted
    }

    /// Set or clear the `(X)` priority block
    ///
    /// Lowercase letters are uppercased; anything outside `A`-`Z` is ignored.
    pub fn set_priority(&mut self, priority: Option<char>) {
        let priority = match priority {
            Some(c) if c.is_ascii_alphabetic() => Some(c.to_ascii_uppercase()),
            Some(_) => return,
            None => None,
        };
        if self.priority() == priority {
            return;
        }
        self.rewrite_layout(|layout| layout.priority = priority);
    }

    /// Step through `A`..`F` and "no priority", wrapping around
    pub fn cycle_priority(&mut self, step: i32) {
        let len = PRIORITY_CYCLE.len() as i64;
        let current = PRIORITY_CYCLE
            .iter()
            .position(|p| *p == self.priority())
            .map_or(len - 1, |i| i as i64);
        let next = (current + i64::from(step)).rem_euclid(len) as usize;
        self.set_priority(PRIORITY_CYCLE[next]);
    }

    /// Mark the task done or pending
    ///
    /// Completing drops the priority and prepends `x TODAY`. When the task
    /// carries a `rec:` tag, the due date of the next instance is returned.
    pub fn set_done(&mut self, done: bool, today: NaiveDate) -> Option<NaiveDate> {
        if self.is_done() == done {
            return None;
        }
        if done {
            let marker = format!("x {}", today.format(ISO_FORMAT));
            self.rewrite_layout(|layout| {
                layout.priority = None;
                layout.done = Some(marker);
            });
            self.recurrence()
                .and_then(|rec| rec.next_due(self.due_date(), today))
        } else {
            self.rewrite_layout(|layout| layout.done = None);
            None
        }
    }

    /// Add or remove the `del:true` tag
    pub fn set_deleted(&mut self, deleted: bool) {
        if self.is_deleted() == deleted {
            return;
        }
        let tag = DEL_REGEX
            .captures(&self.raw)
            .and_then(|caps| caps.get(1))
            .map(|m| m.range());
        let text = match (tag, deleted) {
            (Some(range), true) => {
                let mut text = self.raw.clone();
                text.replace_range(range, "del:true");
                text
            }
            (Some(range), false) => splice_out(&self.raw, range),
            (None, true) => format!("{} del:true", self.raw),
            (None, false) => return,
        };
        self.update(&text);
    }

    /// Status relative to `today` and the start of next week
    pub fn status(&self, today: NaiveDate, next_week: NaiveDate) -> Status {
        if self.is_done() || self.is_deleted() {
            return Status::new(StatusCategory::Done, 99999);
        }
        match self.due_date() {
            Some(due) if due < today => Status::new(StatusCategory::Overdue, -1),
            Some(due) if due == today => Status::new(StatusCategory::Due, 0),
            Some(due) if due < next_week => Status::new(StatusCategory::Todo, 1),
            Some(_) => Status::new(StatusCategory::Todo, 2),
            None => Status::new(StatusCategory::Todo, 9999),
        }
    }

    /// Pending and due on or before `date`
    pub fn is_due(&self, date: NaiveDate) -> bool {
        !self.is_done() && self.due_date().is_some_and(|due| due <= date)
    }

    /// Overwrite the `due:` tag in place, or append one
    pub fn set_due(&mut self, date: NaiveDate) {
        let value = date.format(ISO_FORMAT).to_string();
        let existing = DUE_REGEX
            .captures(&self.raw)
            .and_then(|caps| caps.get(1))
            .map(|m| m.range());
        let text = match existing {
            Some(range) => {
                let mut text = self.raw.clone();
                text.replace_range(range, &value);
                text
            }
            None => format!("{} due:{}", self.raw, value),
        };
        self.update(&text);
    }

    /// Shift the due date (or today, when there is none) by an expression
    ///
    /// Returns the new due date, or `None` when the expression is invalid.
    pub fn shift_due(&mut self, expression: &str, today: NaiveDate) -> Option<NaiveDate> {
        let base = self.due_date().unwrap_or(today);
        let date = date::modify_date(base, expression, today)?;
        self.set_due(date);
        Some(date)
    }

    /// Resolve `due:tomorrow` style tags into ISO dates
    pub fn update_relative_due_date(&mut self, today: NaiveDate) {
        if DUE_REGEX.is_match(&self.raw) {
            return;
        }
        let Some(caps) = ANY_DUE_REGEX.captures(&self.raw) else {
            return;
        };
        let (Some(tag), Some(value)) = (caps.get(1), caps.get(2)) else {
            return;
        };
        if let Some(date) = date::resolve_relative_date(value.as_str(), today) {
            let text = splice_out(&self.raw, tag.range());
            self.update(&text);
            self.set_due(date);
        }
    }

    /// Insert or overwrite the creation date after done marker and priority
    pub fn set_creation_date(&mut self, date: NaiveDate) {
        let value = date.format(ISO_FORMAT).to_string();
        self.rewrite_layout(|layout| layout.created = Some(value));
    }

    /// Normalise a line after free-text editing
    pub fn finish_edit(&mut self, today: NaiveDate) {
        if self.raw.is_empty() {
            return;
        }
        self.update_relative_due_date(today);
        if self.creation_date().is_none() {
            self.set_creation_date(today);
        }
    }

    /// Condensed description for list rows
    ///
    /// Drops the creation date and replaces due, recurrence and context tags
    /// with a single placeholder per run. Not used for persistence.
    pub fn description(&self) -> String {
        let mut layout = Layout::parse(&self.raw);
        layout.created = None;
        let text = layout.render();

        let mut words: Vec<&str> = Vec::new();
        for word in text.split_whitespace() {
            let hidden =
                CONTEXT_REGEX.is_match(word) || DUE_REGEX.is_match(word) || REC_REGEX.is_match(word);
            if !hidden {
                words.push(word);
            } else if words.last() != Some(&PLACEHOLDER) {
                words.push(PLACEHOLDER);
            }
        }
        while words.last() == Some(&PLACEHOLDER) {
            words.pop();
        }
        while words.first() == Some(&PLACEHOLDER) {
            words.remove(0);
        }
        words.join(" ")
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COWS: &str = "Buy some cows +project-x @farm";
    const FLUX_TEXT: &str = "Build a flux capacitor +future @weekend";
    const FLUX: &str = "(A) Build a flux capacitor +future @weekend";
    const TRASH_TEXT: &str = "Take out the trash @home due:2018-02-21";
    const TRASH: &str = "(F) 2000-01-01 Take out the trash @home due:2018-02-21";
    const DONE: &str = "x 1999-01-07 Book a ticket to mars +project-x +future";
    const PLAN: &str = "2001-02-03 Plan our summer vacation +family @weekend";

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn task(text: &str) -> Task {
        Task::new(TaskId(1), text)
    }

    #[test]
    fn test_parse_fields() {
        let t = task(COWS);
        assert_eq!(t.raw(), COWS);
        assert_eq!(t.contexts(), ["@farm"]);
        assert_eq!(t.projects(), ["+project-x"]);
        assert_eq!(t.priority(), None);

        let t = task(TRASH);
        assert_eq!(t.contexts(), ["@home"]);
        assert!(t.projects().is_empty());
        assert_eq!(t.due_date(), Some(d(2018, 2, 21)));
        assert_eq!(t.creation_date(), Some(d(2000, 1, 1)));
        assert_eq!(t.priority(), Some('F'));

        let t = task(DONE);
        assert!(t.is_done());
        assert_eq!(t.done_date(), Some(d(1999, 1, 7)));
        assert_eq!(t.creation_date(), None);
        assert_eq!(t.projects(), ["+future", "+project-x"]);
    }

    #[test]
    fn test_update_trims_and_is_idempotent() {
        let t = task("  (B) 2020-01-01 Call mom @phone due:2020-02-01 rec:+1m  ");
        assert_eq!(t.raw(), "(B) 2020-01-01 Call mom @phone due:2020-02-01 rec:+1m");

        let again = task(t.raw());
        assert_eq!(again.raw(), t.raw());
        assert_eq!(again.fields(), t.fields());
    }

    #[test]
    fn test_priority_only_at_line_start() {
        assert_eq!(task("(A) Priority A").priority(), Some('A'));
        assert_eq!(task("(Z) Priority Z").priority(), Some('Z'));
        assert_eq!(task("(a) No Priority").priority(), None);
        assert_eq!(task("No Priority (A)").priority(), None);
        assert_eq!(task("(A)No Priority").priority(), None);
        assert_eq!(task("(A)->No Priority").priority(), None);
        assert_eq!(task("x 2020-01-01 (C) done with prio").priority(), Some('C'));
    }

    #[test]
    fn test_contexts_and_projects_need_leading_space() {
        let t = task("Buy some cows +project-x @farm foo@email.com @email NotA+Project +y");
        assert_eq!(t.contexts(), ["@email", "@farm"]);
        assert_eq!(t.projects(), ["+project-x", "+y"]);
    }

    #[test]
    fn test_malformed_tags_leave_fields_empty() {
        let t = task("Fix it due:2020-13-45 rec:7x del:maybe overdue:2020-01-01");
        assert_eq!(t.due_date(), None);
        assert_eq!(t.recurrence(), None);
        assert!(!t.is_deleted());
        assert_eq!(t.raw(), "Fix it due:2020-13-45 rec:7x del:maybe overdue:2020-01-01");
    }

    #[test]
    fn test_recurrence_tag() {
        let rec = task("Water plants rec:+2w").recurrence().unwrap();
        assert!(rec.from_due);
        assert_eq!(rec.amount, 2);
        assert_eq!(rec.unit, IntervalUnit::Week);
        assert_eq!(rec.to_string(), "+2w");

        let rec = task("Pay rent rec:1m").recurrence().unwrap();
        assert!(!rec.from_due);
        assert_eq!(rec.to_string(), "1m");
    }

    #[test]
    fn test_set_priority_layouts() {
        let mut t = task(COWS);
        t.set_priority(Some('F'));
        assert_eq!(t.raw(), format!("(F) {}", COWS));
        t.set_priority(None);
        assert_eq!(t.raw(), COWS);

        let mut t = task(FLUX);
        t.set_priority(Some('c'));
        assert_eq!(t.raw(), format!("(C) {}", FLUX_TEXT));
        t.set_priority(None);
        assert_eq!(t.raw(), FLUX_TEXT);

        let mut t = task(DONE);
        t.set_priority(Some('B'));
        assert_eq!(t.raw(), "x 1999-01-07 (B) Book a ticket to mars +project-x +future");
        assert_eq!(t.priority(), Some('B'));
        assert!(t.is_done());

        let mut t = task(TRASH);
        t.set_priority(Some('1'));
        assert_eq!(t.raw(), TRASH);
    }

    #[test]
    fn test_cycle_priority() {
        let mut t = task("Plan");
        t.cycle_priority(1);
        assert_eq!(t.priority(), Some('A'));
        t.cycle_priority(-1);
        assert_eq!(t.priority(), None);
        t.cycle_priority(-1);
        assert_eq!(t.priority(), Some('F'));
        t.cycle_priority(1);
        assert_eq!(t.priority(), None);
        assert_eq!(t.raw(), "Plan");
    }

    #[test]
    fn test_cycle_priority_extreme_steps() {
        let mut t = task("Plan");
        t.cycle_priority(i32::MAX);
        assert_eq!(t.priority(), Some('A'));

        let mut t = task("Plan");
        t.cycle_priority(i32::MIN);
        assert_eq!(t.priority(), Some('E'));
    }

    #[test]
    fn test_set_done_drops_priority() {
        let today = d(2024, 5, 15);
        let mut t = task(FLUX);
        assert_eq!(t.set_done(true, today), None);
        assert_eq!(t.raw(), format!("x 2024-05-15 {}", FLUX_TEXT));
        assert!(t.is_done());
        assert_eq!(t.done_date(), Some(today));

        t.set_done(false, today);
        assert_eq!(t.raw(), FLUX_TEXT);
        assert_eq!(t.done_date(), None);
        assert_eq!(t.priority(), None);
    }

    #[test]
    fn test_set_done_round_trip_keeps_creation_date() {
        let today = d(2024, 5, 15);
        let mut t = task(PLAN);
        t.set_done(true, today);
        assert_eq!(t.raw(), format!("x 2024-05-15 {}", PLAN));
        assert_eq!(t.creation_date(), Some(d(2001, 2, 3)));
        t.set_done(false, today);
        assert_eq!(t.raw(), PLAN);
    }

    #[test]
    fn test_set_done_is_noop_when_unchanged() {
        let today = d(2024, 5, 15);
        let mut t = task(DONE);
        assert_eq!(t.set_done(true, today), None);
        assert_eq!(t.raw(), DONE);

        t.set_done(false, today);
        assert_eq!(t.raw(), "Book a ticket to mars +project-x +future");
        assert_eq!(t.creation_date(), None);
        assert_eq!(t.done_date(), None);
    }

    #[test]
    fn test_undated_done_marker() {
        let mut t = task("x done without date");
        assert!(t.is_done());
        assert_eq!(t.done_date(), None);
        t.set_done(false, d(2024, 5, 15));
        assert_eq!(t.raw(), "done without date");
    }

    #[test]
    fn test_recurring_from_completion() {
        let today = d(2020, 6, 1);
        let mut t = task("Write report due:2020-06-01 rec:7d");
        assert_eq!(t.set_done(true, today), Some(d(2020, 6, 8)));

        let mut t = task("Write report due:2020-05-01 rec:7d");
        assert_eq!(t.set_done(true, today), Some(d(2020, 6, 8)));
    }

    #[test]
    fn test_recurring_from_due_date() {
        let today = d(2020, 6, 1);
        let mut t = task("Pay rent due:2020-01-31 rec:+1m");
        assert_eq!(t.set_done(true, today), Some(d(2020, 2, 29)));

        let mut t = task("Stretch rec:+1d");
        assert_eq!(t.set_done(true, today), Some(d(2020, 6, 2)));
    }

    #[test]
    fn test_set_deleted() {
        let mut t = task(COWS);
        t.set_deleted(true);
        assert!(t.is_deleted());
        assert_eq!(t.raw(), format!("{} del:true", COWS));
        t.set_deleted(true);
        assert_eq!(t.raw(), format!("{} del:true", COWS));
        t.set_deleted(false);
        assert!(!t.is_deleted());
        assert_eq!(t.raw(), COWS);

        let mut t = task("Sweep del:false @home");
        assert!(!t.is_deleted());
        t.set_deleted(true);
        assert_eq!(t.raw(), "Sweep del:true @home");
        t.set_deleted(false);
        assert_eq!(t.raw(), "Sweep @home");
    }

    #[test]
    fn test_status() {
        let today = d(2024, 5, 15);
        let next_week = d(2024, 5, 20);
        let status = |text: &str| {
            let s = task(text).status(today, next_week);
            (s.category, s.rank)
        };
        assert_eq!(status("a due:2024-05-14"), (StatusCategory::Overdue, -1));
        assert_eq!(status("a due:2024-05-15"), (StatusCategory::Due, 0));
        assert_eq!(status("a due:2024-05-19"), (StatusCategory::Todo, 1));
        assert_eq!(status("a due:2024-05-20"), (StatusCategory::Todo, 2));
        assert_eq!(status("a"), (StatusCategory::Todo, 9999));
        assert_eq!(status("x 2024-05-01 a due:2024-05-01"), (StatusCategory::Done, 99999));
        assert_eq!(status("a due:2024-05-01 del:true"), (StatusCategory::Done, 99999));
    }

    #[test]
    fn test_is_due_never_true_when_done() {
        let date = d(2024, 5, 15);
        assert!(task("a due:2024-05-15").is_due(date));
        assert!(task("a due:2024-01-01").is_due(date));
        assert!(!task("a due:2024-05-16").is_due(date));
        assert!(!task("a").is_due(date));
        assert!(!task("x 2024-05-01 a due:2024-01-01").is_due(date));
    }

    #[test]
    fn test_set_due() {
        let mut t = task(TRASH);
        t.set_due(d(2024, 1, 2));
        assert_eq!(t.raw(), "(F) 2000-01-01 Take out the trash @home due:2024-01-02");

        let mut t = task("Call due:2020-01-01 @phone");
        t.set_due(d(2024, 1, 2));
        assert_eq!(t.raw(), "Call due:2024-01-02 @phone");

        let mut t = task(COWS);
        t.set_due(d(2024, 1, 2));
        assert_eq!(t.raw(), format!("{} due:2024-01-02", COWS));
        assert_eq!(t.due_date(), Some(d(2024, 1, 2)));
    }

    #[test]
    fn test_shift_due() {
        let today = d(2024, 5, 15);
        let mut t = task("Renew passport due:2024-06-01");
        assert_eq!(t.shift_due("1w", today), Some(d(2024, 6, 8)));
        assert_eq!(t.shift_due("-1m", today), Some(d(2024, 5, 8)));
        assert_eq!(t.shift_due("fr", today), Some(d(2024, 5, 17)));
        assert_eq!(t.shift_due("soon", today), None);
        assert_eq!(t.due_date(), Some(d(2024, 5, 17)));

        let mut t = task("No due yet");
        assert_eq!(t.shift_due("2d", today), Some(d(2024, 5, 17)));
    }

    #[test]
    fn test_update_relative_due_date() {
        let today = d(2024, 5, 15);
        let mut t = task("Call mom due:tomorrow @phone");
        t.update_relative_due_date(today);
        assert_eq!(t.raw(), "Call mom @phone due:2024-05-16");

        let mut t = task("Call mom due:2024-01-01");
        t.update_relative_due_date(today);
        assert_eq!(t.raw(), "Call mom due:2024-01-01");

        let mut t = task("Call mom due:someday");
        t.update_relative_due_date(today);
        assert_eq!(t.raw(), "Call mom due:someday");
        assert_eq!(t.due_date(), None);

        let mut t = task("Call mom");
        t.update_relative_due_date(today);
        assert_eq!(t.raw(), "Call mom");
    }

    #[test]
    fn test_set_creation_date() {
        let today = d(2024, 5, 15);

        let mut t = task(COWS);
        t.set_creation_date(today);
        assert_eq!(t.raw(), format!("2024-05-15 {}", COWS));
        assert_eq!(t.creation_date(), Some(today));

        let mut t = task(FLUX);
        t.set_creation_date(today);
        assert_eq!(t.raw(), format!("(A) 2024-05-15 {}", FLUX_TEXT));

        let mut t = task(TRASH);
        t.set_creation_date(today);
        assert_eq!(t.raw(), format!("(F) 2024-05-15 {}", TRASH_TEXT));

        let mut t = task(PLAN);
        t.set_creation_date(today);
        assert_eq!(t.raw(), "2024-05-15 Plan our summer vacation +family @weekend");

        let mut t = task(DONE);
        t.set_creation_date(today);
        assert_eq!(t.raw(), "x 1999-01-07 2024-05-15 Book a ticket to mars +project-x +future");
        assert_eq!(t.done_date(), Some(d(1999, 1, 7)));
    }

    #[test]
    fn test_finish_edit() {
        let today = d(2024, 5, 15);
        let mut t = task("Buy milk due:to");
        t.finish_edit(today);
        assert_eq!(t.raw(), "2024-05-15 Buy milk due:2024-05-16");

        let mut t = task(PLAN);
        t.finish_edit(today);
        assert_eq!(t.raw(), PLAN);

        let mut t = task("");
        t.finish_edit(today);
        assert_eq!(t.raw(), "");
    }

    #[test]
    fn test_description() {
        assert_eq!(task(TRASH).description(), "(F) Take out the trash");
        assert_eq!(task(COWS).description(), "Buy some cows +project-x");
        assert_eq!(
            task("Call @home @phone mom due:2024-01-01 rec:1w about dinner").description(),
            format!("Call {} mom {} about dinner", PLACEHOLDER, PLACEHOLDER)
        );
        assert_eq!(task("@home Sweep").description(), "Sweep");
    }
}
