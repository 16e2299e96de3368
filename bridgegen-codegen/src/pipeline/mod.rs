//! Two-phase generation pipeline.
//!
//! A run walks the source tree and then proceeds in two phases:
//!
//! - [`CollectPhase`](phases::CollectPhase) - analyzes every IDL file, loads
//!   every data table and its templates, and finalizes the run-wide
//!   collectors
//! - [`EmitPhase`](phases::EmitPhase) - renders every artifact from the
//!   finalized collectors
//!
//! Rendering happens entirely in memory. Files are only touched once every
//! artifact rendered, and then only when their content changed.
//!
//! # Example
//!
//! ```ignore
//! use bridgegen_codegen::pipeline::{Pipeline, PipelineOptions};
//!
//! let options = PipelineOptions::new("bindings", "bindings/dist");
//! let summary = Pipeline::new(options).run()?;
//! println!("{} written, {} unchanged", summary.written(), summary.unchanged());
//! ```

mod options;
pub mod phases;
mod runner;

pub use options::PipelineOptions;
pub use runner::{CheckSummary, Pipeline, RunSummary};
