use std::path::PathBuf;

use clap::Args;
use eyre::Result;

use super::UnwrapOrExit;
use crate::{
    ops,
    reports::{Report, TerminalOutput},
};

#[derive(Args)]
pub struct CheckCommand {
    /// Directory searched for declaration files
    #[arg(short, long, default_value = ".")]
    pub source: PathBuf,

    /// Path to bridgegen.toml (defaults to <source>/bridgegen.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

impl CheckCommand {
    pub fn run(&self) -> Result<()> {
        let report = ops::check(&self.source, self.config.as_deref()).unwrap_or_exit()?;
        report.render(&mut TerminalOutput::new());
        Ok(())
    }
}
