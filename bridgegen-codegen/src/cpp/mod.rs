//! C++ binding generators.

mod fragments;
mod interface;
mod types;
mod union;

pub use fragments::{ConfigTable, HeaderGuard, Includes, Namespace};
pub use interface::InterfaceGenerator;
pub use types::{Storage, TypeMapper, Unmapped};
pub use union::UnionGenerator;

/// Namespace every generated declaration lives in.
pub const NAMESPACE: &str = "webf";

/// First line of every generated file.
pub(crate) fn banner(attribution: &str) -> String {
    format!("Generated from {}. Do not edit.", attribution)
}
