//! In-memory task file
//!
//! A [`TaskFile`] is the ordered lines of one file plus its path. Edits mark
//! the file dirty so callers know which files need writing back.

use std::path::{Path, PathBuf};

use super::line::{self, parse_line};
use super::stats::TaskStats;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFile {
    path: PathBuf,
    lines: Vec<String>,
    dirty: bool,
}

impl TaskFile {
    pub fn new(path: impl Into<PathBuf>, lines: Vec<String>) -> Self {
        Self {
            path: path.into(),
            lines,
            dirty: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Returns true if any edit changed the lines since loading
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn stats(&self) -> TaskStats {
        TaskStats::from_lines(&self.lines)
    }

    /// Returns the index of the first unchecked task in `start..end`
    pub fn first_unchecked(&self, start: usize, end: usize) -> Option<usize> {
        let end = end.min(self.lines.len());
        if start >= end {
            return None;
        }

        self.lines[start..end]
            .iter()
            .position(|l| parse_line(l).is_unchecked_task())
            .map(|offset| start + offset)
    }

    /// Returns the indices of every task line carrying the marker
    pub fn marker_lines(&self) -> Vec<usize> {
        self.lines
            .iter()
            .enumerate()
            .filter(|(_, l)| line::has_marker(l))
            .map(|(i, _)| i)
            .collect()
    }

    pub fn task_text(&self, index: usize) -> String {
        self.lines
            .get(index)
            .and_then(|l| line::task_text(l))
            .unwrap_or_default()
    }

    pub fn add_marker(&mut self, index: usize) {
        self.edit(index, line::add_marker);
    }

    pub fn remove_marker(&mut self, index: usize) {
        self.edit(index, line::remove_marker);
    }

    /// Checks the task at `index` and takes the marker off it
    pub fn complete(&mut self, index: usize) {
        self.edit(index, |l| line::remove_marker(&line::check_task(l)));
    }

    /// Unchecks every checked task, returning how many changed
    pub fn reset(&mut self) -> usize {
        let count = line::uncheck_tasks_in_lines(&mut self.lines);
        if count > 0 {
            self.dirty = true;
        }
        count
    }

    /// Appends a new unchecked task, keeping a trailing empty line last
    pub fn append_task(&mut self, text: &str) {
        let task = format!("- [ ] {}", text.trim());

        match self.lines.last() {
            Some(last) if last.is_empty() => {
                let at = self.lines.len() - 1;
                self.lines.insert(at, task);
            }
            _ => {
                self.lines.push(task);
                self.lines.push(String::new());
            }
        }

        self.dirty = true;
    }

    fn edit(&mut self, index: usize, f: impl FnOnce(&str) -> String) {
        if let Some(current) = self.lines.get_mut(index) {
            let updated = f(current.as_str());
            if updated != *current {
                *current = updated;
                self.dirty = true;
            }
        }
    }
}
