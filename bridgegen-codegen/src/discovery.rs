//! Input discovery under the source root.

use std::path::{Path, PathBuf};

use bridgegen_core::FileError;
use walkdir::WalkDir;

use crate::error::Result;

/// Every input file of a run, in sorted traversal order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceSet {
    pub idl: Vec<PathBuf>,
    pub data: Vec<PathBuf>,
}

impl SourceSet {
    pub fn is_empty(&self) -> bool {
        self.idl.is_empty() && self.data.is_empty()
    }
}

/// Walk `root` collecting files ending in `idl_suffix` or `data_suffix`.
///
/// `exclude` (typically the output directory) is skipped when it lies inside
/// `root`, so a previous run's output is never read back as input.
pub fn discover(
    root: &Path,
    exclude: Option<&Path>,
    idl_suffix: &str,
    data_suffix: &str,
) -> Result<SourceSet> {
    let mut set = SourceSet::default();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| match exclude {
            Some(excluded) => entry.depth() == 0 || entry.path() != excluded,
            None => true,
        });

    for entry in walker {
        let entry = entry.map_err(|e| {
            let path = e
                .path()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| root.to_path_buf());
            FileError {
                action: "read",
                path,
                source: e.into(),
            }
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if name.ends_with(idl_suffix) {
            set.idl.push(entry.into_path());
        } else if name.ends_with(data_suffix) {
            set.data.push(entry.into_path());
        }
    }

    tracing::info!(
        root = %root.display(),
        idl = set.idl.len(),
        data = set.data.len(),
        "discovered inputs"
    );
    Ok(set)
}
