//! Calendar arithmetic for todo.txt dates
//!
//! Supports the expressions accepted wherever a due date is typed:
//! - Intervals: "3d", "+2w", "-1m", "1y", "5" (days when no unit)
//! - Relative: "today"/"tod", "tomorrow"/"to", "yesterday"/"ye"
//! - Weekdays: "monday", "fr", ... (next occurrence, never today)
//! - Offsets: "+3", "-2" (days from today)

use std::sync::LazyLock;

use chrono::{Datelike, Days, Local, Months, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

static INTERVAL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([+-])?(\d+)([dwmy])?$").expect("Invalid interval regex pattern")
});

/// Weekday names, Monday first
pub const WEEKDAYS: [&str; 7] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

/// ISO date format used throughout todo.txt
pub const ISO_FORMAT: &str = "%Y-%m-%d";

/// Unit of an interval expression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntervalUnit {
    Day,
    Week,
    Month,
    Year,
}

impl IntervalUnit {
    /// Parse a unit letter (`d`, `w`, `m`, `y`)
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'd' => Some(Self::Day),
            'w' => Some(Self::Week),
            'm' => Some(Self::Month),
            'y' => Some(Self::Year),
            _ => None,
        }
    }

    /// The unit letter as written in todo.txt
    pub fn as_char(self) -> char {
        match self {
            Self::Day => 'd',
            Self::Week => 'w',
            Self::Month => 'm',
            Self::Year => 'y',
        }
    }
}

/// A signed amount of calendar units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub amount: i64,
    pub unit: IntervalUnit,
}

impl Interval {
    pub fn new(amount: i64, unit: IntervalUnit) -> Self {
        Self { amount, unit }
    }

    /// Add this interval to `date`
    pub fn apply(&self, date: NaiveDate) -> Option<NaiveDate> {
        date_add_interval(date, self.unit, self.amount)
    }
}

/// Local calendar date
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// `today` shifted by a signed number of days
pub fn offset(today: NaiveDate, days: i64) -> Option<NaiveDate> {
    add_days(today, days)
}

/// The Monday after `today` (a week later when `today` is a Monday)
///
/// Used as the default "next week" boundary for task status.
pub fn next_monday(today: NaiveDate) -> NaiveDate {
    let days = 7 - u64::from(today.weekday().num_days_from_monday());
    today.checked_add_days(Days::new(days)).unwrap_or(today)
}

/// Parse an ISO `YYYY-MM-DD` date
pub fn parse_iso(text: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), ISO_FORMAT)
        .map_err(|e| CoreError::parse_with_source(format!("Invalid date '{}'", text.trim()), e))
}

/// Add `amount` units to `date`
///
/// Month and year arithmetic clamps to the last day of the target month,
/// so Jan 31 + 1m is Feb 28 (or 29), never a day in March.
pub fn date_add_interval(date: NaiveDate, unit: IntervalUnit, amount: i64) -> Option<NaiveDate> {
    match unit {
        IntervalUnit::Day => add_days(date, amount),
        IntervalUnit::Week => add_days(date, amount.checked_mul(7)?),
        IntervalUnit::Month => add_months(date, amount),
        IntervalUnit::Year => add_months(date, amount.checked_mul(12)?),
    }
}

fn add_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    let delta = Days::new(days.unsigned_abs());
    if days >= 0 {
        date.checked_add_days(delta)
    } else {
        date.checked_sub_days(delta)
    }
}

fn add_months(date: NaiveDate, months: i64) -> Option<NaiveDate> {
    let delta = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
    if months >= 0 {
        date.checked_add_months(delta)
    } else {
        date.checked_sub_months(delta)
    }
}

/// Parse `[+-]?\d+[dwmy]?`; the unit defaults to days
pub fn parse_interval(text: &str) -> Option<Interval> {
    let caps = INTERVAL_REGEX.captures(text.trim())?;
    let amount: i64 = caps.get(2)?.as_str().parse().ok()?;
    let amount = match caps.get(1).map(|m| m.as_str()) {
        Some("-") => -amount,
        _ => amount,
    };
    let unit = caps
        .get(3)
        .and_then(|m| m.as_str().chars().next())
        .and_then(IntervalUnit::from_char)
        .unwrap_or(IntervalUnit::Day);
    Some(Interval::new(amount, unit))
}

/// Resolve a relative date expression against `today`
pub fn resolve_relative_date(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    modify_date(today, text, today)
}

/// Apply a date expression to `base`
///
/// Named days, weekdays and bare integers are always relative to `today`;
/// only interval expressions with a unit (e.g. "2w") shift `base`.
pub fn modify_date(base: NaiveDate, text: &str, today: NaiveDate) -> Option<NaiveDate> {
    let text = text.trim().to_lowercase();
    if let Some(date) = parse_named_day(&text, today) {
        return Some(date);
    }
    if let Ok(days) = text.parse::<i64>() {
        return add_days(today, days);
    }
    parse_interval(&text)?.apply(base)
}

fn parse_named_day(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    let prefix: String = text.chars().take(2).collect();
    if prefix.chars().count() == 2 {
        if let Some(index) = WEEKDAYS.iter().position(|day| day.starts_with(&prefix)) {
            return Some(next_weekday(index as u32, today));
        }
    }

    if text.starts_with("tod") {
        Some(today)
    } else if text == "to" || text.starts_with("tom") {
        add_days(today, 1)
    } else if prefix == "ye" {
        add_days(today, -1)
    } else {
        None
    }
}

/// Next occurrence of a weekday (0 = Monday), strictly after `today`
fn next_weekday(weekday: u32, today: NaiveDate) -> NaiveDate {
    let current = today.weekday().num_days_from_monday();
    let delta = (weekday + 7 - current) % 7;
    let delta = if delta == 0 { 7 } else { delta };
    today
        .checked_add_days(Days::new(u64::from(delta)))
        .unwrap_or(today)
}

/// Describe `date` relative to `today`
///
/// Returns strings like "yesterday", "friday", "last mon", "in 12 days",
/// "3 days ago" or the ISO date when further than a month away.
/// A missing date reads as "later".
pub fn humanize_date(date: Option<NaiveDate>, today: NaiveDate) -> String {
    let Some(date) = date else {
        return "later".to_string();
    };
    let diff = date.signed_duration_since(today).num_days();
    let weekday = WEEKDAYS[date.weekday().num_days_from_monday() as usize];

    match diff {
        0 => "today".to_string(),
        1 => "tomorrow".to_string(),
        -1 => "yesterday".to_string(),
        2..=7 => weekday.to_string(),
        8..=30 => format!("in {} days", diff),
        -7..=-2 => format!("last {}", &weekday[..3]),
        -30..=-8 => format!("{} days ago", -diff),
        _ => date.format(ISO_FORMAT).to_string(),
    }
}
