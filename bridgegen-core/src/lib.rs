//! Core utilities and types for the bridgegen binding generator.
//!
//! This crate provides the write guard every emitter goes through and the
//! string helpers shared by the naming logic.

mod artifact;
mod file;
mod utils;

// Generated output
pub use artifact::GeneratedArtifact;
// File operations
pub use file::{File, FileError, WriteResult, write_if_changed};
// String utilities
pub use utils::{to_camel_case, to_pascal_case, to_snake_case};
