use std::{
    io,
    path::{Path, PathBuf},
};

use thiserror::Error;

/// A file could not be read back or written by the write guard.
#[derive(Debug, Error)]
#[error("failed to {action} '{}'", path.display())]
pub struct FileError {
    pub action: &'static str,
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// Result of a write operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteResult {
    /// File was created or its content replaced
    Written,
    /// File already held identical bytes and was left untouched
    Unchanged,
}

impl WriteResult {
    pub fn is_written(&self) -> bool {
        matches!(self, WriteResult::Written)
    }
}

/// Write `content` to `path` only when the bytes on disk differ.
///
/// Parent directories are created on demand. A missing file counts as
/// changed; any other read failure is reported.
pub fn write_if_changed(path: &Path, content: &str) -> Result<WriteResult, FileError> {
    match std::fs::read(path) {
        Ok(existing) if existing == content.as_bytes() => {
            tracing::debug!(path = %path.display(), "unchanged");
            return Ok(WriteResult::Unchanged);
        }
        Ok(_) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(source) => {
            return Err(FileError {
                action: "read",
                path: path.to_path_buf(),
                source,
            });
        }
    }

    write_file(path, content)?;
    tracing::debug!(path = %path.display(), "written");
    Ok(WriteResult::Written)
}

fn write_file(path: &Path, content: &str) -> Result<(), FileError> {
    let fail = |source| FileError {
        action: "write",
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(fail)?;
    }
    std::fs::write(path, content).map_err(fail)
}

/// A file to be generated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    path: PathBuf,
    content: String,
}

impl File {
    /// Create a new file with the given path and content
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }

    /// Get the file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the file content
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Check if the file exists
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Write the file through the content-diff guard
    pub fn write(&self) -> Result<WriteResult, FileError> {
        write_if_changed(&self.path, &self.content)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_write_file_creates_parent_dirs() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("a").join("b").join("c").join("test.h");

        let result = write_if_changed(&path, "nested").unwrap();

        assert_eq!(result, WriteResult::Written);
        assert_eq!(fs::read_to_string(&path).unwrap(), "nested");
    }

    #[test]
    fn test_identical_content_is_not_rewritten() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("test.cc");
        fs::write(&path, "same").unwrap();
        let before = fs::metadata(&path).unwrap().modified().unwrap();

        let result = write_if_changed(&path, "same").unwrap();

        assert_eq!(result, WriteResult::Unchanged);
        assert_eq!(fs::metadata(&path).unwrap().modified().unwrap(), before);
    }

    #[test]
    fn test_changed_content_is_replaced() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("test.cc");
        fs::write(&path, "first").unwrap();

        let result = write_if_changed(&path, "second").unwrap();

        assert!(result.is_written());
        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
    }

    #[test]
    fn test_file_write_twice() {
        let temp = TempDir::new().unwrap();
        let file = File::new(temp.path().join("out.h"), "content");
        assert!(!file.exists());

        assert_eq!(file.write().unwrap(), WriteResult::Written);
        assert_eq!(file.write().unwrap(), WriteResult::Unchanged);
        assert!(file.exists());
    }

    #[test]
    fn test_unwritable_target_reports_path() {
        let temp = TempDir::new().unwrap();
        // a directory in place of the file makes both read and write fail
        let path = temp.path().join("dir.h");
        fs::create_dir(&path).unwrap();

        let err = write_if_changed(&path, "x").unwrap_err();
        assert_eq!(err.path, path);
    }
}
