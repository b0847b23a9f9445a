//! Task statistics

use std::fmt;
use std::ops::AddAssign;

use serde::Serialize;

use super::line::{parse_line, LineKind};

/// Completion counts for a set of lines
///
/// `total == completed + remaining` always holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub remaining: usize,
}

impl TaskStats {
    /// Tallies checked and unchecked tasks; other lines are ignored
    pub fn from_lines<S: AsRef<str>>(lines: &[S]) -> Self {
        let mut stats = Self::default();

        for line in lines {
            if let LineKind::Task { checked, .. } = parse_line(line.as_ref()) {
                stats.total += 1;
                if checked {
                    stats.completed += 1;
                } else {
                    stats.remaining += 1;
                }
            }
        }

        stats
    }

    /// Percentage of completed tasks, `0.0` when there are none
    pub fn percent_complete(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.completed as f64 * 100.0 / self.total as f64
        }
    }

    /// One-line summary, e.g. `Total: 2 task(s) | Completed: 1 (50.0%) | Remaining: 1`
    pub fn summary(&self) -> String {
        format!(
            "Total: {} task(s) | Completed: {} ({:.1}%) | Remaining: {}",
            self.total,
            self.completed,
            self.percent_complete(),
            self.remaining
        )
    }
}

impl AddAssign for TaskStats {
    fn add_assign(&mut self, other: Self) {
        self.total += other.total;
        self.completed += other.completed;
        self.remaining += other.remaining;
    }
}

impl fmt::Display for TaskStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

/// Computes statistics for a file's lines
pub fn calculate_stats<S: AsRef<str>>(lines: &[S]) -> TaskStats {
    TaskStats::from_lines(lines)
}
