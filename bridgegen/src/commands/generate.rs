use std::path::PathBuf;

use clap::Args;
use eyre::Result;

use super::UnwrapOrExit;
use crate::{
    ops::{self, GenerateOptions},
    reports::{Report, TerminalOutput},
};

#[derive(Args)]
pub struct GenerateCommand {
    /// Directory searched for declaration files and data tables
    #[arg(short, long, default_value = ".")]
    pub source: PathBuf,

    /// Output directory (defaults to <source>/dist)
    #[arg(short, long)]
    pub dist: Option<PathBuf>,

    /// Directory holding <name>.h.tpl and <name>.cc.tpl templates
    #[arg(short, long)]
    pub templates: Option<PathBuf>,

    /// Program used to generate perfect hash tables (defaults to gperf)
    #[arg(long)]
    pub hash_tool: Option<String>,

    /// Path to bridgegen.toml (defaults to <source>/bridgegen.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Render everything without writing to disk
    #[arg(long)]
    pub dry_run: bool,
}

impl GenerateCommand {
    pub fn run(&self) -> Result<()> {
        let report = ops::generate(GenerateOptions {
            source: &self.source,
            dist: self.dist.as_deref(),
            templates: self.templates.as_deref(),
            hash_tool: self.hash_tool.as_deref(),
            config: self.config.as_deref(),
            dry_run: self.dry_run,
        })
        .unwrap_or_exit()?;

        report.render(&mut TerminalOutput::new());
        Ok(())
    }
}
