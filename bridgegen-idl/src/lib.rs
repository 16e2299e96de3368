//! Declaration file front end.
//!
//! Parses the TypeScript-flavoured IDL subset into the type model and records
//! unions and names into the run's [`bridgegen_ir::CollectionContext`].

// Miette's derive macro generates code that triggers these warnings
#![allow(unused_assignments)]

mod analyzer;
mod error;
mod lexer;
mod parser;
mod syntax;

pub use analyzer::{analyze, analyze_source};
pub use error::{AnalysisError, Result, SourceContext};
