//! Cross-file task advancement
//!
//! [`process_next_task_state`] moves the single marker through an ordered
//! list of task files:
//!
//! | Situation | Action | Result |
//! |-----------|--------|--------|
//! | no tasks anywhere | nothing | `NoTasks` |
//! | nothing left unchecked | drop any marker | `AllComplete` |
//! | no marker | mark the first unchecked task | `NextTaskFound` |
//! | marker on another line | move it to the first unchecked task | `NextTaskFound` |
//! | marker on the first unchecked task | check it, mark the next one | `NextTaskFound` or `AllComplete` |
//!
//! After a completion the search continues forward in the same file, then
//! through the other files in order starting after the current one and
//! wrapping around.
//!
//! Files that fail to read are skipped with a warning. If that leaves the
//! outcome undecidable, the result is `Error` and nothing is written.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::{display_lines, find_context_headers, TaskFile, TaskStats};
use crate::storage::{RepositoryError, TaskRepository};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Failed to save task file: {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: RepositoryError,
    },
}

/// A task that was just checked off
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Completion {
    pub path: PathBuf,
    pub line: usize,
    pub text: String,
}

/// Everything needed to show the current task
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskView {
    pub path: PathBuf,
    pub line: usize,
    pub text: String,

    /// Statistics of the file containing the task
    pub stats: TaskStats,

    /// The two nearest headers above the task, as `"outer - inner"`
    pub context: Option<String>,

    /// The task's block, trailing blank lines trimmed
    pub display: Vec<String>,
}

impl TaskView {
    fn of(file: &TaskFile, line: usize) -> Self {
        Self {
            path: file.path().to_path_buf(),
            line,
            text: file.task_text(line),
            stats: file.stats(),
            context: find_context_headers(file.lines(), line),
            display: display_lines(file.lines(), line),
        }
    }
}

/// Outcome of one advance
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskState {
    NoTasks,
    AllComplete {
        completed: Option<Completion>,
        stats: TaskStats,
    },
    NextTaskFound {
        completed: Option<Completion>,
        task: TaskView,
    },
    Error {
        message: String,
    },
}

impl TaskState {
    pub fn status(&self) -> &'static str {
        match self {
            TaskState::NoTasks => "NO_TASKS",
            TaskState::AllComplete { .. } => "ALL_COMPLETE",
            TaskState::NextTaskFound { .. } => "NEXT_TASK_FOUND",
            TaskState::Error { .. } => "ERROR",
        }
    }

    pub fn completed(&self) -> Option<&Completion> {
        match self {
            TaskState::AllComplete { completed, .. } | TaskState::NextTaskFound { completed, .. } => {
                completed.as_ref()
            }
            _ => None,
        }
    }
}

/// A line in one of the loaded files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Position {
    file: usize,
    line: usize,
}

/// Indices of every file except `current`, starting right after it and wrapping
pub fn wrap_order(len: usize, current: usize) -> impl Iterator<Item = usize> {
    (1..len).map(move |offset| (current + offset) % len)
}

/// Finds the next unchecked task after completing the one at `from`
fn find_next_unchecked(files: &[TaskFile], from: Position) -> Option<Position> {
    let current = &files[from.file];

    if let Some(line) = current.first_unchecked(from.line + 1, usize::MAX) {
        return Some(Position { file: from.file, line });
    }

    for file in wrap_order(files.len(), from.file) {
        if let Some(line) = files[file].first_unchecked(0, usize::MAX) {
            return Some(Position { file, line });
        }
    }

    current
        .first_unchecked(0, from.line)
        .map(|line| Position { file: from.file, line })
}

fn describe(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn load(repo: &TaskRepository<'_>, paths: &[PathBuf]) -> (Vec<TaskFile>, Vec<PathBuf>) {
    let mut files = Vec::with_capacity(paths.len());
    let mut failed = Vec::new();

    for path in paths {
        if files.iter().any(|f: &TaskFile| f.path() == path.as_path()) || failed.contains(path) {
            warn!(path = %path.display(), "Ignoring duplicate task file");
            continue;
        }

        match repo.read_lines(path) {
            Ok(lines) => files.push(TaskFile::new(path.clone(), lines)),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Skipping unreadable task file");
                failed.push(path.clone());
            }
        }
    }

    (files, failed)
}

fn persist(repo: &TaskRepository<'_>, files: &[TaskFile]) -> Result<(), EngineError> {
    for file in files.iter().filter(|f| f.is_dirty()) {
        repo.write_lines(file.path(), file.lines())
            .map_err(|source| EngineError::Write {
                path: file.path().to_path_buf(),
                source,
            })?;
        debug!(path = %file.path().display(), "Saved task file");
    }
    Ok(())
}

/// Runs one advance over `paths`, in order, writing back changed files
pub fn process_next_task_state(
    repo: &TaskRepository<'_>,
    paths: &[PathBuf],
) -> Result<TaskState, EngineError> {
    let (mut files, failed) = load(repo, paths);

    if files.is_empty() {
        return Ok(TaskState::Error {
            message: format!("Could not read any task file: {}", describe(&failed)),
        });
    }

    let mut total = TaskStats::default();
    let mut target = None;
    let mut markers = Vec::new();

    for (index, file) in files.iter().enumerate() {
        total += file.stats();
        if target.is_none() {
            target = file
                .first_unchecked(0, usize::MAX)
                .map(|line| Position { file: index, line });
        }
        markers.extend(
            file.marker_lines()
                .into_iter()
                .map(|line| Position { file: index, line }),
        );
    }

    debug!(
        files = files.len(),
        total = total.total,
        remaining = total.remaining,
        markers = markers.len(),
        "Scanned task files"
    );

    if total.total == 0 {
        if !failed.is_empty() {
            return Ok(TaskState::Error {
                message: format!(
                    "No tasks found in readable files; could not read: {}",
                    describe(&failed)
                ),
            });
        }
        return Ok(TaskState::NoTasks);
    }

    let Some(target) = target else {
        if !failed.is_empty() {
            return Ok(TaskState::Error {
                message: format!(
                    "All readable tasks are complete; could not read: {}",
                    describe(&failed)
                ),
            });
        }

        for marker in &markers {
            files[marker.file].remove_marker(marker.line);
        }
        persist(repo, &files)?;
        return Ok(TaskState::AllComplete {
            completed: None,
            stats: total,
        });
    };

    // First marker wins; strip any others
    let current = markers.first().copied();
    for extra in markers.iter().skip(1) {
        warn!(
            path = %files[extra.file].path().display(),
            line = extra.line + 1,
            "Removing extra task marker"
        );
        files[extra.file].remove_marker(extra.line);
    }

    let (completed, shown) = match current {
        None => {
            files[target.file].add_marker(target.line);
            (None, Some(target))
        }
        Some(marker) if marker != target => {
            files[marker.file].remove_marker(marker.line);
            files[target.file].add_marker(target.line);
            (None, Some(target))
        }
        Some(_) => {
            let completion = Completion {
                path: files[target.file].path().to_path_buf(),
                line: target.line,
                text: files[target.file].task_text(target.line),
            };
            files[target.file].complete(target.line);

            let next = find_next_unchecked(&files, target);
            if let Some(next) = next {
                files[next.file].add_marker(next.line);
            }
            (Some(completion), next)
        }
    };

    persist(repo, &files)?;

    Ok(match shown {
        Some(position) => TaskState::NextTaskFound {
            completed,
            task: TaskView::of(&files[position.file], position.line),
        },
        // The completion is saved, but a skipped file may still hold tasks
        None if !failed.is_empty() => TaskState::Error {
            message: format!(
                "Completed \"{}\" but could not read: {}",
                completed.map(|c| c.text).unwrap_or_default(),
                describe(&failed)
            ),
        },
        None => TaskState::AllComplete {
            completed,
            stats: files[target.file].stats(),
        },
    })
}
