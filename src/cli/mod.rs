//! # Command-Line Interface
//!
//! User-facing CLI commands and output formatting.
//!
//! ## Commands
//!
//! | Command | Purpose |
//! |---------|---------|
//! | `next` | Complete the marked task and mark the next one |
//! | `reset` | Uncheck completed tasks in one or more files |
//! | `stats` | Per-file and total task counts |
//! | `add` | Append a task to the paste target |
//! | `path set`, `path show` | Manage the ordered task file list |
//! | `config get`, `config set` | Read and write `[updates]` values |
//!
//! Commands that touch task files accept `--global` to skip the project
//! configuration.
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for debug logging on stderr:
//! ```bash
//! tick --verbose next
//! ```
//! `RUST_LOG` takes precedence when set.
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod config_cmd;
mod output;
mod path;
mod task;

pub use app::{Cli, Commands, run};
pub use output::{Output, OutputFormat};
