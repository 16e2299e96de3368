//! Generate command report data structures.

use std::path::PathBuf;

use super::output::{Output, Report};

/// What happened to one output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Written,
    Unchanged,
    /// Dry run: would be written if changed.
    Planned,
}

#[derive(Debug)]
pub struct GeneratedFile {
    /// Path relative to the output directory.
    pub path: PathBuf,
    pub status: FileStatus,
}

/// Report data from a generation run.
#[derive(Debug)]
pub struct GenerateReport {
    /// Output directory.
    pub dist: PathBuf,
    pub dry_run: bool,
    /// Declaration files analyzed.
    pub interfaces: usize,
    /// Distinct union wrappers.
    pub unions: usize,
    /// Data tables rendered.
    pub data: usize,
    pub files: Vec<GeneratedFile>,
}

impl GenerateReport {
    fn count(&self, status: FileStatus) -> usize {
        self.files.iter().filter(|f| f.status == status).count()
    }
}

impl Report for GenerateReport {
    fn render(&self, out: &mut dyn Output) {
        if self.dry_run {
            out.section("Would generate");
            for file in &self.files {
                out.list_item(&file.path.display().to_string());
            }
        } else {
            let written: Vec<&GeneratedFile> = self
                .files
                .iter()
                .filter(|f| f.status == FileStatus::Written)
                .collect();
            if !written.is_empty() {
                out.section("Written");
                for file in written {
                    out.added_item(&file.path.display().to_string());
                }
            }
        }
        out.newline();

        out.preformatted(&format!(
            "{} declaration file{}, {} union{}, {} data table{}",
            self.interfaces,
            plural(self.interfaces),
            self.unions,
            plural(self.unions),
            self.data,
            plural(self.data),
        ));
        if self.dry_run {
            out.preformatted(&format!(
                "{} files would be generated in {}",
                self.files.len(),
                self.dist.display()
            ));
        } else {
            out.preformatted(&format!(
                "{} written, {} unchanged in {}",
                self.count(FileStatus::Written),
                self.count(FileStatus::Unchanged),
                self.dist.display()
            ));
        }
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}
