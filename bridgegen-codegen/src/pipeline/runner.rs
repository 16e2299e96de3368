//! Pipeline orchestrator.

use std::path::PathBuf;

use bridgegen_core::{GeneratedArtifact, WriteResult};
use bridgegen_ir::CollectionContext;

use super::{
    PipelineOptions,
    phases::{CollectPhase, EmitPhase},
};
use crate::{
    discovery::{SourceSet, discover},
    error::Result,
    hash_table::{HashTableGenerator, ProcessHashTable},
};

/// The generation pipeline orchestrator.
///
/// Discovers inputs, runs the collect phase over all of them, then the emit
/// phase, and finally hands each artifact to the write guard.
///
/// # Example
///
/// ```ignore
/// let pipeline = Pipeline::new(PipelineOptions::new("src", "dist"))
///     .hash_table(ProcessHashTable::new("gperf", vec![]));
///
/// let summary = pipeline.run()?;
/// ```
pub struct Pipeline {
    options: PipelineOptions,
    hash_table: Box<dyn HashTableGenerator>,
}

impl Pipeline {
    /// Create a pipeline that invokes `gperf` for hash tables.
    pub fn new(options: PipelineOptions) -> Self {
        Self {
            options,
            hash_table: Box::new(ProcessHashTable::default()),
        }
    }

    /// Replace the hash-table generator.
    pub fn hash_table(mut self, generator: impl HashTableGenerator + 'static) -> Self {
        self.hash_table = Box::new(generator);
        self
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Run both phases and write every artifact.
    ///
    /// # Errors
    ///
    /// The first failure aborts the run. Failures before the write step
    /// leave the output tree untouched.
    pub fn run(&self) -> Result<RunSummary> {
        let sources = self.discover()?;
        let collected = CollectPhase::new(&self.options).run(&sources)?;
        let artifacts = EmitPhase::new(&self.options, self.hash_table.as_ref()).run(&collected)?;

        let mut summary = RunSummary {
            dry_run: self.options.dry_run,
            interfaces: collected.interfaces.len(),
            unions: collected.collections.union_signatures().count(),
            data: collected.data.len(),
            files: Vec::with_capacity(artifacts.len() * 2),
        };
        for artifact in &artifacts {
            summary.record(artifact, self.options.dry_run)?;
        }

        tracing::info!(
            written = summary.written(),
            unchanged = summary.unchanged(),
            dry_run = summary.dry_run,
            "generation finished"
        );
        Ok(summary)
    }

    /// Analyze every IDL file and report what a run would collect, without
    /// rendering or writing anything.
    pub fn check(&self) -> Result<CheckSummary> {
        let sources = self.discover()?;
        let mut ctx = CollectionContext::new();
        let blobs = CollectPhase::new(&self.options).analyze(&sources, &mut ctx)?;
        let collections = ctx.finalize();

        Ok(CheckSummary {
            idl_files: blobs.len(),
            declarations: blobs.iter().map(|b| b.declarations.len()).sum(),
            unions: collections
                .union_signatures()
                .map(|s| s.class_name())
                .collect(),
            properties: collections.properties().count(),
            data_files: sources.data.len(),
        })
    }

    fn discover(&self) -> Result<SourceSet> {
        let sources = discover(
            &self.options.source,
            self.options.excluded_dist(),
            &self.options.idl_suffix,
            &self.options.data_suffix,
        )?;
        if sources.is_empty() {
            tracing::warn!(source = %self.options.source.display(), "no input files found");
        }
        Ok(sources)
    }
}

/// Outcome of [`Pipeline::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub dry_run: bool,
    /// IDL files analyzed.
    pub interfaces: usize,
    /// Distinct union wrappers generated.
    pub unions: usize,
    /// Data tables rendered.
    pub data: usize,
    /// Every output file, with `None` on a dry run.
    pub files: Vec<(PathBuf, Option<WriteResult>)>,
}

impl RunSummary {
    fn record(&mut self, artifact: &GeneratedArtifact, dry_run: bool) -> Result<()> {
        if dry_run {
            self.files.push((artifact.header_path(), None));
            self.files.push((artifact.source_path(), None));
        } else {
            for (path, result) in artifact.write()? {
                tracing::debug!(path = %path.display(), written = result.is_written(), "wrote file");
                self.files.push((path, Some(result)));
            }
        }
        Ok(())
    }

    pub fn written(&self) -> usize {
        self.count(WriteResult::Written)
    }

    pub fn unchanged(&self) -> usize {
        self.count(WriteResult::Unchanged)
    }

    fn count(&self, wanted: WriteResult) -> usize {
        self.files
            .iter()
            .filter(|(_, result)| *result == Some(wanted))
            .count()
    }
}

/// Outcome of [`Pipeline::check`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckSummary {
    pub idl_files: usize,
    pub declarations: usize,
    /// Class names of the distinct unions, in canonical order.
    pub unions: Vec<String>,
    pub properties: usize,
    pub data_files: usize,
}
