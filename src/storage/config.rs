//! Configuration handling for tick
//!
//! Configuration lives in two independent documents, one per [`Scope`]:
//!
//! - local: `<project>/.tick/config.toml`, found by walking up from the cwd
//! - global: `<user config dir>/config.toml` (e.g. `~/.config/tick/config.toml`)
//!
//! When a local document exists it decides which task files are used, and
//! relative paths in it resolve against the project root. Otherwise the
//! global document applies and its paths resolve against the home directory.
//!
//! ```toml
//! [tasks]
//! all = ["TODO.md", "docs/later.md"]
//! primary = "TODO.md"
//! paste = "TODO.md"
//!
//! [updates]
//! last_update_check_timestamp = 0
//! ```
//!
//! Bad input never fails a load: a malformed document or a field of the
//! wrong shape is logged and replaced by its default. Keys this module does
//! not manage are kept when a document is rewritten.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::{BaseDirs, ProjectDirs};
use once_cell::unsync::OnceCell;
use serde::Serialize;
use thiserror::Error;
use toml::{Table, Value};
use tracing::{debug, warn};

use super::fs::FileSystem;

/// Directory holding the local document, relative to the project root
pub const CONFIG_DIR: &str = ".tick";

pub const CONFIG_FILE: &str = "config.toml";

/// Task file used when no valid path list is configured
pub const DEFAULT_TASK_FILE: &str = "TODO.md";

/// How many directories [`ConfigResolver::find_local_root`] inspects
pub const MAX_SEARCH_DEPTH: usize = 10;

/// Key of the update-check timestamp in the `[updates]` table
pub const LAST_UPDATE_CHECK: &str = "last_update_check_timestamp";

const TASKS: &str = "tasks";
const UPDATES: &str = "updates";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("At least one task file path is required")]
    EmptyPathList,

    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Failed to write configuration: {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Which configuration document an operation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    Local,
    Global,
}

impl Scope {
    pub fn from_global_flag(global: bool) -> Self {
        if global {
            Scope::Global
        } else {
            Scope::Local
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Local => "local",
            Scope::Global => "global",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Process-level inputs to configuration resolution
///
/// Built once at startup and handed to the resolver, so tests can point it
/// anywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    /// Directory the local search starts from
    pub cwd: PathBuf,

    /// Base directory for paths in the global document
    pub home: PathBuf,

    /// Directory holding the global document
    pub global_config_dir: PathBuf,
}

impl Environment {
    pub fn new(cwd: impl Into<PathBuf>, home: impl Into<PathBuf>) -> Self {
        let home = home.into();
        let global_config_dir = home.join(".config").join("tick");

        Self {
            cwd: cwd.into(),
            home,
            global_config_dir,
        }
    }

    /// Detects the environment of the running process
    pub fn detect() -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to read current directory")?;
        let home = BaseDirs::new()
            .map(|dirs| dirs.home_dir().to_path_buf())
            .context("Could not determine home directory")?;

        let mut env = Self::new(cwd, home);
        if let Some(dirs) = ProjectDirs::from("dev", "tick", "tick") {
            env.global_config_dir = dirs.config_dir().to_path_buf();
        }

        Ok(env)
    }

    pub fn global_config_path(&self) -> PathBuf {
        self.global_config_dir.join(CONFIG_FILE)
    }
}

/// Returns the local document path for a project root
pub fn local_config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_DIR).join(CONFIG_FILE)
}

/// The `[tasks]` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskSettings {
    /// Ordered task file paths, never empty
    pub all: Vec<String>,
    pub primary: Option<String>,
    pub paste: Option<String>,
}

impl Default for TaskSettings {
    fn default() -> Self {
        Self {
            all: vec![DEFAULT_TASK_FILE.to_string()],
            primary: None,
            paste: None,
        }
    }
}

impl TaskSettings {
    /// Explicit primary path, else the first listed path
    pub fn primary_path(&self) -> &str {
        self.primary
            .as_deref()
            .or_else(|| self.all.first().map(String::as_str))
            .unwrap_or(DEFAULT_TASK_FILE)
    }

    /// Explicit paste path, else the primary path
    pub fn paste_path(&self) -> &str {
        self.paste.as_deref().unwrap_or_else(|| self.primary_path())
    }
}

/// The `[updates]` table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdateSettings {
    /// Epoch milliseconds of the last update check
    pub last_update_check_timestamp: i64,
}

/// Validated view of one configuration document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Configuration {
    pub tasks: TaskSettings,
    pub updates: UpdateSettings,
}

impl Configuration {
    /// Validates a raw document field by field, falling back to defaults
    pub fn from_table(table: &Table, origin: &Path) -> Self {
        let mut config = Self::default();

        if let Some(tasks) = section(table, TASKS, origin) {
            if let Some(value) = tasks.get("all") {
                match path_list(value) {
                    Some(all) => config.tasks.all = all,
                    None => warn!(
                        path = %origin.display(),
                        "tasks.all must be a non-empty list of paths; using default"
                    ),
                }
            }
            config.tasks.primary = string_field(tasks, "primary", origin);
            config.tasks.paste = string_field(tasks, "paste", origin);
        }

        if let Some(updates) = section(table, UPDATES, origin) {
            match updates.get(LAST_UPDATE_CHECK) {
                None => {}
                Some(Value::Integer(ms)) if *ms >= 0 => {
                    config.updates.last_update_check_timestamp = *ms;
                }
                Some(_) => warn!(
                    path = %origin.display(),
                    "updates.{} must be a non-negative integer; using 0",
                    LAST_UPDATE_CHECK
                ),
            }
        }

        config
    }
}

fn section<'a>(table: &'a Table, key: &str, origin: &Path) -> Option<&'a Table> {
    match table.get(key) {
        None => None,
        Some(Value::Table(inner)) => Some(inner),
        Some(_) => {
            warn!(path = %origin.display(), "[{}] must be a table; using defaults", key);
            None
        }
    }
}

fn path_list(value: &Value) -> Option<Vec<String>> {
    let items = value.as_array()?;
    let paths: Vec<String> = items
        .iter()
        .map(|item| item.as_str().map(str::to_string))
        .collect::<Option<_>>()?;

    if paths.is_empty() || paths.iter().any(|p| p.trim().is_empty()) {
        return None;
    }

    Some(paths)
}

fn string_field(tasks: &Table, key: &str, origin: &Path) -> Option<String> {
    match tasks.get(key) {
        None => None,
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
        Some(_) => {
            warn!(path = %origin.display(), "tasks.{} must be a path; ignoring it", key);
            None
        }
    }
}

/// Returns the named table inside `raw`, replacing a non-table value
fn section_mut<'a>(raw: &'a mut Table, key: &str) -> &'a mut Table {
    if !matches!(raw.get(key), Some(Value::Table(_))) {
        raw.insert(key.to_string(), Value::Table(Table::new()));
    }

    match raw.get_mut(key) {
        Some(Value::Table(inner)) => inner,
        _ => unreachable!("[{key}] was just set to a table"),
    }
}

/// One loaded document: its raw contents and the validated view
#[derive(Debug, Clone)]
struct ScopeDocument {
    path: PathBuf,
    base_dir: PathBuf,
    exists: bool,
    raw: Table,
    config: Configuration,
}

impl ScopeDocument {
    fn empty(path: PathBuf, base_dir: PathBuf) -> Self {
        Self {
            path,
            base_dir,
            exists: false,
            raw: Table::new(),
            config: Configuration::default(),
        }
    }
}

/// Resolves task file paths and settings from the local and global documents
///
/// Documents are loaded on first use and cached for the resolver's lifetime.
/// Setters write through to disk and refresh the cache.
pub struct ConfigResolver<'fs> {
    fs: &'fs dyn FileSystem,
    env: Environment,
    local: OnceCell<Option<ScopeDocument>>,
    global: OnceCell<ScopeDocument>,
}

impl<'fs> ConfigResolver<'fs> {
    pub fn new(fs: &'fs dyn FileSystem, env: Environment) -> Self {
        Self {
            fs,
            env,
            local: OnceCell::new(),
            global: OnceCell::new(),
        }
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    /// Walks up from `start` to the first directory holding a local document
    pub fn find_local_root(&self, start: &Path) -> Option<PathBuf> {
        let mut current = Some(start);

        for _ in 0..MAX_SEARCH_DEPTH {
            let dir = current?;
            if self.fs.exists(&local_config_path(dir)) {
                return Some(dir.to_path_buf());
            }
            current = dir.parent();
        }

        None
    }

    fn read_document(&self, path: PathBuf, base_dir: PathBuf) -> ScopeDocument {
        if !self.fs.exists(&path) {
            debug!(path = %path.display(), "No configuration document; using defaults");
            return ScopeDocument::empty(path, base_dir);
        }

        let raw = match self.fs.read_to_string(&path) {
            Ok(text) => match toml::from_str::<Table>(&text) {
                Ok(table) => table,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Malformed configuration; using defaults");
                    Table::new()
                }
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Unreadable configuration; using defaults");
                Table::new()
            }
        };

        debug!(path = %path.display(), "Loaded configuration");
        let config = Configuration::from_table(&raw, &path);
        ScopeDocument {
            path,
            base_dir,
            exists: true,
            raw,
            config,
        }
    }

    fn local(&self) -> Option<&ScopeDocument> {
        self.local
            .get_or_init(|| {
                self.find_local_root(&self.env.cwd)
                    .map(|root| self.read_document(local_config_path(&root), root))
            })
            .as_ref()
    }

    fn global(&self) -> &ScopeDocument {
        self.global.get_or_init(|| {
            self.read_document(self.env.global_config_path(), self.env.home.clone())
        })
    }

    /// The document in effect: local unless `global` is set or none exists
    fn effective(&self, global: bool) -> (Scope, &ScopeDocument) {
        if !global {
            if let Some(doc) = self.local() {
                return (Scope::Local, doc);
            }
        }
        (Scope::Global, self.global())
    }

    /// Returns which scope supplies task paths
    pub fn effective_scope(&self, global: bool) -> Scope {
        self.effective(global).0
    }

    /// Returns true if the scope's document exists on disk
    pub fn has_document(&self, scope: Scope) -> bool {
        match scope {
            Scope::Local => self.local().is_some_and(|doc| doc.exists),
            Scope::Global => self.global().exists,
        }
    }

    /// Loads the validated configuration for a scope (defaults if absent)
    pub fn load(&self, scope: Scope) -> Configuration {
        match scope {
            Scope::Local => self.local().map(|doc| doc.config.clone()).unwrap_or_default(),
            Scope::Global => self.global().config.clone(),
        }
    }

    /// Path of the scope's document; for a missing local document, where it would be created
    pub fn config_path(&self, scope: Scope) -> PathBuf {
        match scope {
            Scope::Local => self
                .local()
                .map(|doc| doc.path.clone())
                .unwrap_or_else(|| local_config_path(&self.env.cwd)),
            Scope::Global => self.env.global_config_path(),
        }
    }

    /// Directory that relative paths in the scope's document resolve against
    pub fn base_dir(&self, scope: Scope) -> PathBuf {
        match scope {
            Scope::Local => self
                .local()
                .map(|doc| doc.base_dir.clone())
                .unwrap_or_else(|| self.env.cwd.clone()),
            Scope::Global => self.env.home.clone(),
        }
    }

    fn resolve(&self, base_dir: &Path, raw: &str) -> PathBuf {
        if raw == "~" {
            return self.env.home.clone();
        }
        match raw.strip_prefix("~/") {
            Some(rest) => self.env.home.join(rest),
            None => base_dir.join(raw),
        }
    }

    /// Ordered, absolute task file paths. Never empty.
    ///
    /// A file listed more than once keeps only its first position.
    pub fn task_file_paths(&self, global: bool) -> Vec<PathBuf> {
        let (_, doc) = self.effective(global);
        let mut paths: Vec<PathBuf> = Vec::with_capacity(doc.config.tasks.all.len());

        for raw in &doc.config.tasks.all {
            let path = self.resolve(&doc.base_dir, raw);
            if paths.contains(&path) {
                warn!(path = %path.display(), "Task file listed more than once; ignoring repeat");
                continue;
            }
            paths.push(path);
        }

        paths
    }

    pub fn primary_task_path(&self, global: bool) -> PathBuf {
        let (_, doc) = self.effective(global);
        self.resolve(&doc.base_dir, doc.config.tasks.primary_path())
    }

    /// Where new tasks go: the paste path, else the primary path, else the default
    pub fn paste_target_path(&self, global: bool) -> PathBuf {
        let (_, doc) = self.effective(global);
        self.resolve(&doc.base_dir, doc.config.tasks.paste_path())
    }

    /// Document to modify for `scope`, creating a local one under the cwd if needed
    fn writable_document(&self, scope: Scope) -> ScopeDocument {
        match scope {
            Scope::Global => self.global().clone(),
            Scope::Local => self.local().cloned().unwrap_or_else(|| {
                let root = self.env.cwd.clone();
                ScopeDocument::empty(local_config_path(&root), root)
            }),
        }
    }

    fn persist(&mut self, scope: Scope, mut doc: ScopeDocument) -> Result<(), ConfigError> {
        let text = toml::to_string_pretty(&doc.raw)?;

        self.fs
            .write(&doc.path, &text)
            .map_err(|source| ConfigError::Write {
                path: doc.path.clone(),
                source,
            })?;
        debug!(scope = %scope, path = %doc.path.display(), "Wrote configuration");

        doc.exists = true;
        doc.config = Configuration::from_table(&doc.raw, &doc.path);
        match scope {
            Scope::Local => self.local = OnceCell::with_value(Some(doc)),
            Scope::Global => self.global = OnceCell::with_value(doc),
        }

        Ok(())
    }

    /// Replaces the ordered task file list of a scope.
    ///
    /// `primary` becomes the first path and `paste` the override or the
    /// primary. Other keys in the document are kept.
    pub fn set_task_file_paths(
        &mut self,
        paths: &[String],
        global: bool,
        paste_override: Option<&str>,
    ) -> Result<(), ConfigError> {
        let Some(primary) = paths.first() else {
            return Err(ConfigError::EmptyPathList);
        };
        if let Some(blank) = paths.iter().find(|p| p.trim().is_empty()) {
            return Err(ConfigError::InvalidValue {
                key: "tasks.all".to_string(),
                reason: format!("blank path {:?}", blank),
            });
        }

        let scope = Scope::from_global_flag(global);
        let base_dir = self.base_dir(scope);
        let mut seen: Vec<PathBuf> = Vec::with_capacity(paths.len());
        for raw in paths {
            let path = self.resolve(&base_dir, raw);
            if seen.contains(&path) {
                return Err(ConfigError::InvalidValue {
                    key: "tasks.all".to_string(),
                    reason: format!("{:?} is listed more than once", raw),
                });
            }
            seen.push(path);
        }

        let mut doc = self.writable_document(scope);

        let tasks = section_mut(&mut doc.raw, TASKS);
        tasks.insert(
            "all".to_string(),
            Value::Array(paths.iter().cloned().map(Value::String).collect()),
        );
        tasks.insert("primary".to_string(), Value::String(primary.clone()));
        tasks.insert(
            "paste".to_string(),
            Value::String(paste_override.unwrap_or(primary.as_str()).to_string()),
        );

        self.persist(scope, doc)
    }

    /// Reads a value from the scope's `[updates]` table
    pub fn update_value(&self, scope: Scope, key: &str) -> Option<Value> {
        let doc = match scope {
            Scope::Local => self.local(),
            Scope::Global => Some(self.global()),
        };

        if key == LAST_UPDATE_CHECK {
            let ms = doc.map_or(0, |d| d.config.updates.last_update_check_timestamp);
            return Some(Value::Integer(ms));
        }

        doc.and_then(|d| d.raw.get(UPDATES))
            .and_then(Value::as_table)
            .and_then(|updates| updates.get(key))
            .cloned()
    }

    /// Writes a value into the scope's `[updates]` table
    pub fn set_update_value(
        &mut self,
        scope: Scope,
        key: &str,
        value: Value,
    ) -> Result<(), ConfigError> {
        if key == LAST_UPDATE_CHECK && !matches!(value, Value::Integer(ms) if ms >= 0) {
            return Err(ConfigError::InvalidValue {
                key: format!("{UPDATES}.{key}"),
                reason: "expected a non-negative integer".to_string(),
            });
        }

        let mut doc = self.writable_document(scope);
        section_mut(&mut doc.raw, UPDATES).insert(key.to_string(), value);
        self.persist(scope, doc)
    }

    /// Epoch milliseconds of the last update check, `0` if never checked
    pub fn last_update_check(&self, scope: Scope) -> i64 {
        self.update_value(scope, LAST_UPDATE_CHECK)
            .and_then(|v| v.as_integer())
            .unwrap_or(0)
    }
}
