//! Free-text search over task lines
//!
//! A query is split on whitespace into terms. A task matches when every
//! term occurs somewhere in its raw line, in any order and ignoring case.

use std::collections::HashSet;

use regex::{Regex, RegexSet, RegexSetBuilder};
use tracing::warn;

use crate::task::Task;

/// A compiled search query
#[derive(Debug, Clone)]
pub struct Search {
    terms: Vec<String>,
    /// One pattern per term; a line matches when all of them do
    all: RegexSet,
    /// Alternation of every term, for locating spans to highlight
    any: Regex,
}

/// Part of a highlighted line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'t> {
    Plain(&'t str),
    Match(&'t str),
}

impl<'t> Segment<'t> {
    pub fn text(&self) -> &'t str {
        match self {
            Segment::Plain(s) | Segment::Match(s) => s,
        }
    }
}

impl Search {
    /// Compile `query`; `None` when it has no terms
    pub fn new(query: &str) -> Option<Self> {
        let mut terms: Vec<String> = query.split_whitespace().map(str::to_string).collect();
        if terms.is_empty() {
            return None;
        }
        let escaped: Vec<String> = terms.iter().map(|t| regex::escape(t)).collect();
        let all = match RegexSetBuilder::new(&escaped).case_insensitive(true).build() {
            Ok(set) => set,
            Err(e) => {
                warn!(error = %e, "failed to compile search");
                return None;
            }
        };

        // Longer terms first so overlapping terms highlight the widest span
        let mut alternatives = escaped;
        alternatives.sort_by_key(|t| std::cmp::Reverse(t.len()));
        let any = match Regex::new(&format!("(?i){}", alternatives.join("|"))) {
            Ok(re) => re,
            Err(e) => {
                warn!(error = %e, "failed to compile search highlight");
                return None;
            }
        };

        let mut seen = HashSet::new();
        terms.retain(|t| seen.insert(t.clone()));
        Some(Self { terms, all, any })
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Whether every term occurs in `text`
    pub fn matches(&self, text: &str) -> bool {
        self.all.matches(text).matched_all()
    }

    /// Tasks whose raw line matches, in input order
    pub fn filter<'a>(&self, items: impl IntoIterator<Item = &'a Task>) -> Vec<&'a Task> {
        items.into_iter().filter(|t| self.matches(t.raw())).collect()
    }

    /// Split `text` into plain and matched segments
    ///
    /// Text without any match comes back as one plain segment.
    pub fn highlight<'t>(&self, text: &'t str) -> Vec<Segment<'t>> {
        let mut segments = Vec::new();
        let mut last = 0;
        for m in self.any.find_iter(text) {
            if m.start() > last {
                segments.push(Segment::Plain(&text[last..m.start()]));
            }
            segments.push(Segment::Match(m.as_str()));
            last = m.end();
        }
        if last < text.len() || segments.is_empty() {
            segments.push(Segment::Plain(&text[last..]));
        }
        segments
    }
}

/// Filter by an optional search; no search keeps everything
pub fn search<'a>(query: Option<&Search>, items: Vec<&'a Task>) -> Vec<&'a Task> {
    match query {
        Some(query) => query.filter(items),
        None => items,
    }
}
