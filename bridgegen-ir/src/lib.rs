//! Type model and run-wide collectors shared by the analyzer and generators.

mod collect;
mod interface;
mod naming;
mod types;

pub use collect::{
    CollectionContext, DefinedPropertyCollector, FinalizedCollections, NamesInstallSet,
    UnionCollector, UnionNameClash,
};
pub use interface::{
    Argument, Declaration, DeclarationKind, IndexKey, IndexedProperty, Interface, InterfaceBlob,
    Method, Property, TypeMode,
};
pub use naming::{CLASS_PREFIX, FILE_PREFIX};
pub use types::{Normalized, Primitive, TypeDescriptor, TypeKind, UnionSignature};
