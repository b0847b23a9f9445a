//! Line classification for markdown task lists
//!
//! Only two kinds of lines carry meaning: checkbox tasks (`- [ ] ...`,
//! `- [x] ...`) and ATX headers (`## ...`). Everything else is plain text
//! that is kept verbatim but ignored by navigation and statistics.
//!
//! The current task is tracked by prefixing its line with [`MARKER`]. The
//! marker only ever counts on task lines.

use once_cell::sync::Lazy;
use regex::Regex;

/// Glyph (plus trailing space) prefixed to the current task line
pub const MARKER: &str = "👉 ";

static TASK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\s*-\s+)\[\s*([xX]?)\s*\](.*)$").expect("valid task regex")
});

static HEADER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(#{1,6}) (.*\S.*)$").expect("valid header regex")
});

/// Classification of a single raw line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    Task { checked: bool, has_marker: bool },
    Header { level: u8, text: String },
    Plain,
}

impl LineKind {
    pub fn is_task(&self) -> bool {
        matches!(self, LineKind::Task { .. })
    }

    pub fn is_unchecked_task(&self) -> bool {
        matches!(self, LineKind::Task { checked: false, .. })
    }

    /// Returns the header level, if this is a header
    pub fn header_level(&self) -> Option<u8> {
        match self {
            LineKind::Header { level, .. } => Some(*level),
            _ => None,
        }
    }
}

/// Pieces of a task line, borrowed from the original text
struct TaskParts<'a> {
    marked: bool,
    lead: &'a str,
    checked: bool,
    rest: &'a str,
}

impl TaskParts<'_> {
    fn render(&self, marked: bool, checked: bool) -> String {
        format!(
            "{}{}[{}]{}",
            if marked { MARKER } else { "" },
            self.lead,
            if checked { "x" } else { " " },
            self.rest
        )
    }
}

fn task_parts(line: &str) -> Option<TaskParts<'_>> {
    let (marked, body) = match line.strip_prefix(MARKER) {
        Some(body) => (true, body),
        None => (false, line),
    };

    let caps = TASK_RE.captures(body)?;
    Some(TaskParts {
        marked,
        lead: caps.get(1).map_or("", |m| m.as_str()),
        checked: caps.get(2).is_some_and(|m| !m.as_str().is_empty()),
        rest: caps.get(3).map_or("", |m| m.as_str()),
    })
}

/// Classifies a raw line
pub fn parse_line(line: &str) -> LineKind {
    if let Some(parts) = task_parts(line) {
        return LineKind::Task {
            checked: parts.checked,
            has_marker: parts.marked,
        };
    }

    match HEADER_RE.captures(line) {
        Some(caps) => LineKind::Header {
            level: caps[1].len() as u8,
            text: caps[2].trim().to_string(),
        },
        None => LineKind::Plain,
    }
}

pub fn is_task(line: &str) -> bool {
    task_parts(line).is_some()
}

pub fn is_checked_task(line: &str) -> bool {
    task_parts(line).is_some_and(|p| p.checked)
}

pub fn is_unchecked_task(line: &str) -> bool {
    task_parts(line).is_some_and(|p| !p.checked)
}

/// Returns true if the line is a task carrying the marker
pub fn has_marker(line: &str) -> bool {
    task_parts(line).is_some_and(|p| p.marked)
}

/// Prefixes a task line with the marker. Other lines are returned unchanged.
pub fn add_marker(line: &str) -> String {
    match task_parts(line) {
        Some(parts) if !parts.marked => format!("{MARKER}{line}"),
        _ => line.to_string(),
    }
}

/// Strips the marker from a task line. Other lines are returned unchanged.
pub fn remove_marker(line: &str) -> String {
    match task_parts(line) {
        Some(parts) if parts.marked => line[MARKER.len()..].to_string(),
        _ => line.to_string(),
    }
}

/// Marks a task line as done, keeping indentation, marker and text
pub fn check_task(line: &str) -> String {
    match task_parts(line) {
        Some(parts) => parts.render(parts.marked, true),
        None => line.to_string(),
    }
}

/// Marks a task line as not done, keeping indentation, marker and text
pub fn uncheck_task(line: &str) -> String {
    match task_parts(line) {
        Some(parts) => parts.render(parts.marked, false),
        None => line.to_string(),
    }
}

/// Returns the task's text (everything after the checkbox), trimmed
pub fn task_text(line: &str) -> Option<String> {
    task_parts(line).map(|p| p.rest.trim().to_string())
}

/// Flips every checked task to unchecked in place.
///
/// Returns how many lines changed. A zero count means the caller has nothing
/// to write back.
pub fn uncheck_tasks_in_lines(lines: &mut [String]) -> usize {
    let mut count = 0;

    for line in lines.iter_mut() {
        if is_checked_task(line) {
            *line = uncheck_task(line);
            count += 1;
        }
    }

    count
}
