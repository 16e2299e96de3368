//! Core operations.
//!
//! This module contains the business logic for bridgegen commands,
//! separated from CLI argument parsing and output rendering.

use std::path::{Path, PathBuf};

use bridgegen_codegen::PipelineOptions;

use crate::config::Config;

pub mod check;
pub mod generate;

pub use check::check;
pub use generate::{GenerateOptions, generate};

/// Pipeline options from flags, then the configuration file, then defaults.
fn pipeline_options(
    source: &Path,
    dist: Option<&Path>,
    templates: Option<&Path>,
    config: &Config,
) -> PipelineOptions {
    let dist = dist
        .map(Path::to_path_buf)
        .or_else(|| config.dist())
        .unwrap_or_else(|| source.join("dist"));
    let mut options = PipelineOptions::new(source, dist);
    if let Some(templates) = templates
        .map(Path::to_path_buf)
        .or_else(|| config.templates())
    {
        options = options.templates(templates);
    }
    if let Some(idl) = &config.patterns.idl {
        options = options.idl_suffix(idl);
    }
    if let Some(data) = &config.patterns.data {
        options = options.data_suffix(data);
    }
    options
}

/// `path` relative to `root` for display.
fn relative(path: &Path, root: &Path) -> PathBuf {
    path.strip_prefix(root).unwrap_or(path).to_path_buf()
}
