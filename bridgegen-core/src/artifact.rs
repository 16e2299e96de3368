use std::path::{Path, PathBuf};

use crate::file::{File, FileError, WriteResult};

/// A generated header/source pair.
///
/// This is the only unit handed to the write guard: every generator ends by
/// producing one of these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedArtifact {
    /// Directory the pair is written into.
    pub dir: PathBuf,
    /// File stem shared by the `.h` and `.cc` files.
    pub base_name: String,
    pub header: String,
    pub source: String,
}

impl GeneratedArtifact {
    pub fn new(
        dir: impl Into<PathBuf>,
        base_name: impl Into<String>,
        header: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            dir: dir.into(),
            base_name: base_name.into(),
            header: header.into(),
            source: source.into(),
        }
    }

    pub fn header_path(&self) -> PathBuf {
        self.dir.join(format!("{}.h", self.base_name))
    }

    pub fn source_path(&self) -> PathBuf {
        self.dir.join(format!("{}.cc", self.base_name))
    }

    /// The two files of this artifact, header first.
    pub fn files(&self) -> [File; 2] {
        [
            File::new(self.header_path(), self.header.clone()),
            File::new(self.source_path(), self.source.clone()),
        ]
    }

    /// Write both files through the content-diff guard.
    pub fn write(&self) -> Result<[(PathBuf, WriteResult); 2], FileError> {
        let [header, source] = self.files();
        let header_result = header.write()?;
        let source_result = source.write()?;
        Ok([
            (header.path().to_path_buf(), header_result),
            (source.path().to_path_buf(), source_result),
        ])
    }

    /// Path of the header relative to `root`, used for display.
    pub fn display_path(&self, root: &Path) -> String {
        let path = self.header_path();
        path.strip_prefix(root)
            .unwrap_or(&path)
            .with_extension("")
            .display()
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_artifact_paths() {
        let artifact = GeneratedArtifact::new("/dist/dom", "qjs_node", "h", "cc");
        assert_eq!(artifact.header_path(), PathBuf::from("/dist/dom/qjs_node.h"));
        assert_eq!(artifact.source_path(), PathBuf::from("/dist/dom/qjs_node.cc"));
        assert_eq!(artifact.display_path(Path::new("/dist")), "dom/qjs_node");
    }

    #[test]
    fn test_artifact_write_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let artifact = GeneratedArtifact::new(temp.path(), "qjs_window", "// h\n", "// cc\n");

        let first = artifact.write().unwrap();
        assert!(first.iter().all(|(_, r)| r.is_written()));

        let second = artifact.write().unwrap();
        assert!(second.iter().all(|(_, r)| *r == WriteResult::Unchanged));
    }
}
