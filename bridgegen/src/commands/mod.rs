mod check;
mod completions;
mod generate;

use bridgegen_codegen::CodegenError;
use check::CheckCommand;
use clap::{ArgAction, Parser, Subcommand};
use completions::CompletionsCommand;
use eyre::Result;
use generate::GenerateCommand;

/// Extension trait for exiting on analysis errors with pretty formatting
pub(crate) trait UnwrapOrExit<T> {
    fn unwrap_or_exit(self) -> Result<T>;
}

impl<T> UnwrapOrExit<T> for Result<T> {
    fn unwrap_or_exit(self) -> Result<T> {
        let report = match self {
            Ok(v) => return Ok(v),
            Err(report) => report,
        };
        match report.downcast::<CodegenError>() {
            Ok(CodegenError::Analysis { source, .. }) => {
                eprintln!("{:?}", miette::Report::new(*source));
                std::process::exit(1);
            }
            Ok(other) => Err(other.into()),
            Err(report) => Err(report),
        }
    }
}

#[derive(Parser)]
#[command(name = "bridgegen")]
#[command(version)]
#[command(about = "Generate QuickJS C++ bindings from TypeScript declarations")]
pub(crate) struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    pub fn run(&self) -> Result<()> {
        match &self.command {
            Commands::Generate(cmd) => cmd.run(),
            Commands::Check(cmd) => cmd.run(),
            Commands::Completions(cmd) => cmd.run(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Generate bindings, union wrappers and template outputs
    Generate(GenerateCommand),

    /// Analyze declaration files without generating code
    Check(CheckCommand),

    /// Generate shell completions
    Completions(CompletionsCommand),
}
