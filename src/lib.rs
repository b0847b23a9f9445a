//! Tick - work through markdown checklists one task at a time
//!
//! Task files are plain markdown with `- [ ]` / `- [x]` items. A single
//! marker points at the current task across an ordered list of files;
//! advancing checks it off and moves the marker to the next unchecked task,
//! wrapping around the file list.

pub mod cli;
pub mod domain;
pub mod engine;
pub mod storage;

pub use domain::{LineKind, TaskFile, TaskStats, MARKER};
pub use engine::{process_next_task_state, TaskState};
pub use storage::{ConfigResolver, Environment, TaskRepository};
