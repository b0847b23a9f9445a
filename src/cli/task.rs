//! Task commands: next, reset, stats, add

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use super::output::Output;
use crate::domain::{TaskFile, TaskStats};
use crate::engine::{process_next_task_state, Completion, TaskState};
use crate::storage::{ConfigResolver, RepositoryError, TaskRepository};

/// Advances the marker once and prints where it landed
pub fn next(
    output: &Output,
    resolver: &ConfigResolver<'_>,
    repo: &TaskRepository<'_>,
    global: bool,
) -> Result<()> {
    let paths = resolver.task_file_paths(global);
    debug!(
        scope = %resolver.effective_scope(global),
        files = paths.len(),
        "Advancing to the next task"
    );

    let state = process_next_task_state(repo, &paths)?;

    if output.is_json() {
        output.data(&state);
    } else {
        print_state(&state, &paths);
    }

    if let TaskState::Error { message } = state {
        anyhow::bail!(message);
    }

    Ok(())
}

fn print_completion(completed: Option<&Completion>) {
    if let Some(done) = completed {
        println!("Completed: {} ({})", done.text, done.path.display());
        println!();
    }
}

fn print_state(state: &TaskState, paths: &[PathBuf]) {
    match state {
        TaskState::NoTasks => {
            println!("No tasks found in:");
            for path in paths {
                println!("  {}", path.display());
            }
        }
        TaskState::AllComplete { completed, stats } => {
            print_completion(completed.as_ref());
            println!("All tasks complete!");
            println!("{}", stats.summary());
        }
        TaskState::NextTaskFound { completed, task } => {
            print_completion(completed.as_ref());
            if let Some(context) = &task.context {
                println!("[{}]", context);
            }
            for line in &task.display {
                println!("{}", line);
            }
            println!();
            println!("{}", task.stats.summary());
            println!("File: {}:{}", task.path.display(), task.line + 1);
        }
        // Printed by main as the command's error
        TaskState::Error { .. } => {}
    }
}

/// Per-file result of a reset
#[derive(Debug, serde::Serialize)]
struct ResetReport {
    path: PathBuf,
    reset_count: usize,
}

/// Unchecks tasks in the selected files, rewriting only files that changed
pub fn reset(
    output: &Output,
    resolver: &ConfigResolver<'_>,
    repo: &TaskRepository<'_>,
    files: &[PathBuf],
    all: bool,
    global: bool,
) -> Result<()> {
    let targets: Vec<PathBuf> = if all {
        resolver.task_file_paths(global)
    } else if files.is_empty() {
        vec![resolver.primary_task_path(global)]
    } else {
        let cwd = &resolver.environment().cwd;
        files.iter().map(|f| cwd.join(f)).collect()
    };

    let mut reports = Vec::with_capacity(targets.len());
    for path in targets {
        let lines = repo.read_lines(&path)?;
        let mut file = TaskFile::new(path.clone(), lines);
        let reset_count = file.reset();

        if file.is_dirty() {
            repo.write_lines(file.path(), file.lines())
                .with_context(|| format!("Failed to reset {}", path.display()))?;
        }
        debug!(path = %path.display(), reset_count, "Reset task file");

        reports.push(ResetReport { path, reset_count });
    }

    if output.is_json() {
        output.data(&reports);
    } else {
        for report in &reports {
            if report.reset_count == 0 {
                println!("No checked tasks in {}", report.path.display());
            } else {
                println!(
                    "Reset {} task(s) in {}",
                    report.reset_count,
                    report.path.display()
                );
            }
        }
    }

    Ok(())
}

/// Per-file statistics row
#[derive(Debug, serde::Serialize)]
struct FileStats {
    path: PathBuf,
    exists: bool,
    #[serde(flatten)]
    stats: TaskStats,
}

/// Shows statistics for every configured file and the overall total
pub fn stats(
    output: &Output,
    resolver: &ConfigResolver<'_>,
    repo: &TaskRepository<'_>,
    global: bool,
) -> Result<()> {
    let mut rows = Vec::new();
    let mut total = TaskStats::default();

    for path in resolver.task_file_paths(global) {
        match repo.read_lines(&path) {
            Ok(lines) => {
                let stats = TaskStats::from_lines(&lines);
                total += stats;
                rows.push(FileStats {
                    path,
                    exists: true,
                    stats,
                });
            }
            Err(RepositoryError::NotFound(_)) => {
                warn!(path = %path.display(), "Configured task file does not exist");
                rows.push(FileStats {
                    path,
                    exists: false,
                    stats: TaskStats::default(),
                });
            }
            Err(e) => return Err(e.into()),
        }
    }

    if output.is_json() {
        output.data(&serde_json::json!({
            "files": rows,
            "total": total,
        }));
    } else {
        println!("{:<8} {:<8} {:<8} FILE", "TOTAL", "DONE", "LEFT");
        println!("{}", "-".repeat(60));
        for row in &rows {
            if row.exists {
                println!(
                    "{:<8} {:<8} {:<8} {}",
                    row.stats.total,
                    row.stats.completed,
                    row.stats.remaining,
                    row.path.display()
                );
            } else {
                println!("{:<8} {:<8} {:<8} {} (missing)", "-", "-", "-", row.path.display());
            }
        }
        println!();
        println!("{}", total.summary());
    }

    Ok(())
}

/// Appends a new unchecked task to the paste target
pub fn add(
    output: &Output,
    resolver: &ConfigResolver<'_>,
    repo: &TaskRepository<'_>,
    words: &[String],
    global: bool,
) -> Result<()> {
    let text = words.join(" ");
    if text.trim().is_empty() {
        anyhow::bail!("Task text must not be empty");
    }

    let path = resolver.paste_target_path(global);
    let lines = read_or_empty(repo, &path)?;

    let mut file = TaskFile::new(path.clone(), lines);
    file.append_task(&text);
    repo.write_lines(file.path(), file.lines())
        .with_context(|| format!("Failed to add task to {}", path.display()))?;

    output.data(&serde_json::json!({
        "path": path,
        "task": text.trim(),
    }));
    output.success(&format!("Added task to {}: {}", path.display(), text.trim()));

    Ok(())
}

fn read_or_empty(repo: &TaskRepository<'_>, path: &Path) -> Result<Vec<String>> {
    match repo.read_lines(path) {
        Ok(lines) => Ok(lines),
        Err(RepositoryError::NotFound(_)) => {
            debug!(path = %path.display(), "Creating new task file");
            Ok(Vec::new())
        }
        Err(e) => Err(e.into()),
    }
}
