//! Domain models for tick
//!
//! Pure logic over task-file lines, without any I/O concerns.

mod file;
pub mod line;
mod stats;
pub mod view;

pub use file::TaskFile;
pub use line::{parse_line, uncheck_tasks_in_lines, LineKind, MARKER};
pub use stats::{calculate_stats, TaskStats};
pub use view::{display_lines, find_context_headers, find_display_range};
