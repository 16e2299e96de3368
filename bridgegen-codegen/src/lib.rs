//! Generators turning analyzed IDL files and JSON5 tables into C++ bindings.
//!
//! # Module Organization
//!
//! - [`builder`] - Code generation building blocks (CodeBuilder, CodeFragment, etc.)
//! - [`cpp`] - Interface and union wrapper generators
//! - [`json`] - Data tables rendered through template pairs
//! - [`hash_table`] - External perfect-hash generation
//! - [`discovery`] - Input discovery
//! - [`pipeline`] - The collect-then-emit orchestrator

pub mod builder;
pub mod cpp;
pub mod discovery;
mod error;
pub mod hash_table;
pub mod json;
pub mod pipeline;

pub use error::{CodegenError, Result};
pub use hash_table::{HashTableGenerator, ProcessHashTable};
pub use pipeline::{CheckSummary, Pipeline, PipelineOptions, RunSummary};
