//! # Storage Layer
//!
//! Persistence for tick: plain-text task files and TOML configuration.
//!
//! ## Storage Formats
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Tasks | Markdown checkbox lines | paths listed in `[tasks].all` |
//! | Local config | TOML | `<project>/.tick/config.toml` |
//! | Global config | TOML | `~/.config/tick/config.toml` (platform config dir) |
//!
//! ## Concurrency
//!
//! Single process, no locking: the last writer wins. Writes on the real file
//! system go through a temp file and a rename.
//!
//! ## Key Types
//!
//! - [`FileSystem`] - read/write/exists seam, with [`OsFileSystem`] and [`MemoryFileSystem`]
//! - [`TaskRepository`] - task files as ordered lines
//! - [`ConfigResolver`] - local/global configuration lookup and persistence

mod config;
mod fs;
mod repository;

pub use config::{
    local_config_path, ConfigError, ConfigResolver, Configuration, Environment, Scope,
    TaskSettings, UpdateSettings, CONFIG_DIR, CONFIG_FILE, DEFAULT_TASK_FILE, LAST_UPDATE_CHECK,
    MAX_SEARCH_DEPTH,
};
pub use fs::{FileSystem, MemoryFileSystem, OsFileSystem};
pub use repository::{RepositoryError, TaskRepository};
