//! Built-in pipeline phases.
//!
//! - [`CollectPhase`] - reads every input and finalizes the collectors
//! - [`EmitPhase`] - renders every artifact from the finalized collectors

mod collect;
mod emit;

pub use collect::{CollectPhase, Collected};
pub use emit::EmitPhase;
