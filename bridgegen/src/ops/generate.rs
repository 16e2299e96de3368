//! Generate operation - the full two-phase run.

use std::path::Path;

use bridgegen_codegen::{Pipeline, ProcessHashTable};
use eyre::Result;

use super::{pipeline_options, relative};
use crate::{
    config::{Config, HashTableConfig},
    reports::{FileStatus, GenerateReport, GeneratedFile},
};

/// Options for the generate operation.
pub struct GenerateOptions<'a> {
    pub source: &'a Path,
    pub dist: Option<&'a Path>,
    pub templates: Option<&'a Path>,
    /// Hash-table program, overriding the configuration file.
    pub hash_tool: Option<&'a str>,
    pub config: Option<&'a Path>,
    /// Render everything without writing.
    pub dry_run: bool,
}

/// Execute the generate operation.
pub fn generate(opts: GenerateOptions) -> Result<GenerateReport> {
    let config = Config::locate(opts.config, opts.source)?;
    let options = pipeline_options(opts.source, opts.dist, opts.templates, &config)
        .dry_run(opts.dry_run);
    let dist = options.dist.clone();

    let pipeline = Pipeline::new(options).hash_table(hash_table(opts.hash_tool, &config.hash_table));
    let summary = pipeline.run()?;

    let files = summary
        .files
        .iter()
        .map(|(path, result)| GeneratedFile {
            path: relative(path, &dist),
            status: match result {
                None => FileStatus::Planned,
                Some(r) if r.is_written() => FileStatus::Written,
                Some(_) => FileStatus::Unchanged,
            },
        })
        .collect();

    Ok(GenerateReport {
        dist,
        dry_run: summary.dry_run,
        interfaces: summary.interfaces,
        unions: summary.unions,
        data: summary.data,
        files,
    })
}

/// The configured hash-table process, or `gperf` when nothing is set.
fn hash_table(program: Option<&str>, config: &HashTableConfig) -> ProcessHashTable {
    let default = ProcessHashTable::default();
    match (program.or(config.program.as_deref()), &config.args) {
        (None, None) => default,
        (program, args) => ProcessHashTable::new(
            program.unwrap_or(default.program()),
            args.clone().unwrap_or_default(),
        ),
    }
}
