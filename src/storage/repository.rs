//! Plain-text storage for task files
//!
//! Task files are read as lines and written back verbatim. Splitting on `\n`
//! keeps a trailing empty segment, so a read followed by a write reproduces
//! the original content.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::fs::FileSystem;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Task file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to access task file: {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Reads and writes task files as ordered lines
#[derive(Clone, Copy)]
pub struct TaskRepository<'fs> {
    fs: &'fs dyn FileSystem,
}

impl<'fs> TaskRepository<'fs> {
    pub fn new(fs: &'fs dyn FileSystem) -> Self {
        Self { fs }
    }

    pub fn exists(&self, path: &Path) -> bool {
        self.fs.exists(path)
    }

    /// Reads a file into lines; fails with [`RepositoryError::NotFound`] if missing
    pub fn read_lines(&self, path: &Path) -> Result<Vec<String>, RepositoryError> {
        if !self.fs.exists(path) {
            return Err(RepositoryError::NotFound(path.to_path_buf()));
        }

        let content = self
            .fs
            .read_to_string(path)
            .map_err(|source| RepositoryError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(content.split('\n').map(str::to_string).collect())
    }

    /// Joins lines with `\n` and overwrites the file, creating parent directories
    pub fn write_lines(&self, path: &Path, lines: &[String]) -> Result<(), RepositoryError> {
        self.fs
            .write(path, &lines.join("\n"))
            .map_err(|source| RepositoryError::Io {
                path: path.to_path_buf(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryFileSystem, OsFileSystem};
    use tempfile::TempDir;

    #[test]
    fn read_missing_file_is_not_found() {
        let fs = MemoryFileSystem::new();
        let repo = TaskRepository::new(&fs);
        assert!(!repo.exists(Path::new("/nope.md")));

        let err = repo.read_lines(Path::new("/nope.md")).unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound(p) if p == Path::new("/nope.md")));
    }

    #[test]
    fn read_keeps_trailing_empty_segment() {
        let fs = MemoryFileSystem::new().with_file("/t.md", "# H\n- [ ] A\n");
        let repo = TaskRepository::new(&fs);

        assert!(repo.exists(Path::new("/t.md")));
        let lines = repo.read_lines(Path::new("/t.md")).unwrap();
        assert_eq!(lines, vec!["# H", "- [ ] A", ""]);
    }

    #[test]
    fn write_then_read_is_identity() {
        let dir = TempDir::new().unwrap();
        let fs = OsFileSystem;
        let repo = TaskRepository::new(&fs);
        let path = dir.path().join("sub").join("TODO.md");

        let original = "# H\n\n- [ ] A\n  - [x] nested\n";
        fs.write(&path, original).unwrap();

        let lines = repo.read_lines(&path).unwrap();
        repo.write_lines(&path, &lines).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), original);
    }

    #[test]
    fn read_error_carries_path() {
        let fs = MemoryFileSystem::new().with_file("/locked.md", "- [ ] A");
        fs.fail_reads("/locked.md");
        let repo = TaskRepository::new(&fs);

        let err = repo.read_lines(Path::new("/locked.md")).unwrap_err();
        assert!(matches!(err, RepositoryError::Io { .. }));
        assert!(err.to_string().contains("/locked.md"));
    }
}
