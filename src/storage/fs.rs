//! File system access
//!
//! Everything that touches disk goes through [`FileSystem`], so the resolver
//! and repository can run against [`MemoryFileSystem`] in tests.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Narrow read/write/exists interface over a file system
pub trait FileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Writes `contents`, creating parent directories as needed
    fn write(&self, path: &Path, contents: &str) -> io::Result<()>;

    /// Returns true if a file or directory exists at `path`
    fn exists(&self, path: &Path) -> bool;
}

/// The real file system
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        // Replace what a symlink points to, not the link itself
        let target = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        let existing = fs::metadata(&target).ok();

        if let Some(parent) = target.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        // Write to a sibling temp file, then rename over the target
        let file_name = target
            .file_name()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"))?;
        let mut temp_name = std::ffi::OsString::from(".");
        temp_name.push(file_name);
        temp_name.push(".tmp");
        let temp_path = target.with_file_name(temp_name);

        {
            let mut file = fs::File::create(&temp_path)?;
            file.write_all(contents.as_bytes())?;
            file.flush()?;
        }
        if let Some(meta) = existing {
            fs::set_permissions(&temp_path, meta.permissions())?;
        }

        fs::rename(&temp_path, &target)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

/// In-memory file system for tests
///
/// Directories exist implicitly as ancestors of stored files. Individual
/// paths can be made to fail on read or write.
#[derive(Debug, Default)]
pub struct MemoryFileSystem {
    files: RefCell<BTreeMap<PathBuf, String>>,
    failing_reads: RefCell<BTreeSet<PathBuf>>,
    failing_writes: RefCell<BTreeSet<PathBuf>>,
    writes: Cell<usize>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with_file(self, path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        self.insert(path, contents);
        self
    }

    /// Stores a file without counting it as a write
    pub fn insert(&self, path: impl Into<PathBuf>, contents: impl Into<String>) {
        self.files.borrow_mut().insert(path.into(), contents.into());
    }

    pub fn contents(&self, path: impl AsRef<Path>) -> Option<String> {
        self.files.borrow().get(path.as_ref()).cloned()
    }

    /// Makes reads of `path` fail with a permission error
    pub fn fail_reads(&self, path: impl Into<PathBuf>) {
        self.failing_reads.borrow_mut().insert(path.into());
    }

    /// Makes writes to `path` fail with a permission error
    pub fn fail_writes(&self, path: impl Into<PathBuf>) {
        self.failing_writes.borrow_mut().insert(path.into());
    }

    /// Number of successful writes so far
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }
}

fn permission_denied(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::PermissionDenied,
        format!("permission denied: {}", path.display()),
    )
}

impl FileSystem for MemoryFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        if self.failing_reads.borrow().contains(path) {
            return Err(permission_denied(path));
        }

        self.files.borrow().get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such file: {}", path.display()),
            )
        })
    }

    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        if self.failing_writes.borrow().contains(path) {
            return Err(permission_denied(path));
        }

        self.files
            .borrow_mut()
            .insert(path.to_path_buf(), contents.to_string());
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.borrow().keys().any(|p| p.starts_with(path))
    }
}
