//! Check operation - analysis without generation.

use std::path::Path;

use bridgegen_codegen::Pipeline;
use eyre::Result;

use super::pipeline_options;
use crate::{config::Config, reports::CheckReport};

/// Execute the check operation.
///
/// Analyzes every declaration file and reports what a run would collect.
pub fn check(source: &Path, config: Option<&Path>) -> Result<CheckReport> {
    let config = Config::locate(config, source)?;
    let options = pipeline_options(source, None, None, &config);
    let summary = Pipeline::new(options).check()?;

    Ok(CheckReport {
        source: source.to_path_buf(),
        idl_files: summary.idl_files,
        declarations: summary.declarations,
        properties: summary.properties,
        data_files: summary.data_files,
        unions: summary.unions,
    })
}
