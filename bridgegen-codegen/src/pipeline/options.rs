use std::path::{Path, PathBuf};

/// Default suffix of IDL inputs.
pub const IDL_SUFFIX: &str = ".d.ts";
/// Default suffix of data table inputs.
pub const DATA_SUFFIX: &str = ".json5";

/// Paths and switches of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Root walked for inputs.
    pub source: PathBuf,
    /// Root mirrored for outputs.
    pub dist: PathBuf,
    /// Directory holding `<name>.h.tpl` / `<name>.cc.tpl` pairs.
    pub templates: PathBuf,
    pub idl_suffix: String,
    pub data_suffix: String,
    /// Render everything but write nothing.
    pub dry_run: bool,
}

impl PipelineOptions {
    /// Options with templates under `<source>/templates` and default suffixes.
    pub fn new(source: impl Into<PathBuf>, dist: impl Into<PathBuf>) -> Self {
        let source = source.into();
        Self {
            templates: source.join("templates"),
            source,
            dist: dist.into(),
            idl_suffix: IDL_SUFFIX.to_string(),
            data_suffix: DATA_SUFFIX.to_string(),
            dry_run: false,
        }
    }

    pub fn templates(mut self, templates: impl Into<PathBuf>) -> Self {
        self.templates = templates.into();
        self
    }

    pub fn idl_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.idl_suffix = suffix.into();
        self
    }

    pub fn data_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.data_suffix = suffix.into();
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// The output directory when it must be excluded from discovery.
    pub(crate) fn excluded_dist(&self) -> Option<&Path> {
        (self.dist != self.source && self.dist.starts_with(&self.source)).then_some(self.dist.as_path())
    }
}
