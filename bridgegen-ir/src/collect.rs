//! Run-wide collectors.
//!
//! Phase 1 writes through [`CollectionContext`]. Calling
//! [`CollectionContext::finalize`] consumes it and hands back
//! [`FinalizedCollections`], which offers read access only. Every Phase 2
//! generator takes `&FinalizedCollections`, so nothing can register late.

use std::collections::{BTreeMap, BTreeSet};

use indexmap::IndexSet;
use thiserror::Error;

use crate::{
    interface::Interface,
    naming::CLASS_PREFIX,
    types::{TypeDescriptor, TypeKind, UnionSignature},
};

/// Two different union signatures would be emitted under one class name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("union types '{first}' and '{second}' would both generate '{class}'")]
pub struct UnionNameClash {
    pub class: String,
    pub first: String,
    pub second: String,
}

/// Distinct union signatures, indexed by their generated file name.
///
/// Identity is the signature itself; the name index only orders output and
/// catches signatures whose derived names collide.
#[derive(Debug, Default)]
pub struct UnionCollector {
    signatures: BTreeMap<String, UnionSignature>,
}

impl UnionCollector {
    /// Returns `Ok(true)` when the signature was not seen before.
    pub fn register(&mut self, signature: &UnionSignature) -> Result<bool, UnionNameClash> {
        let key = signature.file_name();
        match self.signatures.get(&key) {
            Some(existing) if existing == signature => Ok(false),
            Some(existing) => Err(UnionNameClash {
                class: signature.class_name(),
                first: existing.display_name(),
                second: signature.display_name(),
            }),
            None => {
                self.signatures.insert(key, signature.clone());
                Ok(true)
            }
        }
    }

    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }
}

/// Property, file and interface names seen across the run.
#[derive(Debug, Default)]
pub struct DefinedPropertyCollector {
    properties: BTreeSet<String>,
    files: IndexSet<String>,
    interfaces: IndexSet<String>,
}

impl DefinedPropertyCollector {
    pub fn record_property(&mut self, name: &str) {
        if !self.properties.contains(name) {
            self.properties.insert(name.to_string());
        }
    }

    pub fn record_interface(&mut self, file: &str, interface: &str) {
        self.files.insert(file.to_string());
        self.interfaces.insert(format!("{}{}", CLASS_PREFIX, interface));
    }
}

/// Mutable collector state for Phase 1.
#[derive(Debug, Default)]
pub struct CollectionContext {
    unions: UnionCollector,
    properties: DefinedPropertyCollector,
    dictionaries: BTreeSet<String>,
    mixins: BTreeMap<String, Interface>,
}

impl CollectionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every union reachable from `ty`, nested ones included.
    pub fn register_unions(&mut self, ty: &TypeDescriptor) -> Result<(), UnionNameClash> {
        let mut clash = None;
        ty.visit_unions(&mut |signature| {
            if clash.is_none() {
                clash = self.unions.register(signature).err();
            }
        });
        clash.map_or(Ok(()), Err)
    }

    pub fn register_union(&mut self, signature: &UnionSignature) -> Result<bool, UnionNameClash> {
        self.unions.register(signature)
    }

    pub fn record_property(&mut self, name: &str) {
        self.properties.record_property(name);
    }

    /// Record that `file` (a generated base name) declares `interface`.
    pub fn record_interface(&mut self, file: &str, interface: &str) {
        self.properties.record_interface(file, interface);
        self.properties.record_property(interface);
    }

    pub fn record_dictionary(&mut self, name: &str) {
        self.dictionaries.insert(name.to_string());
    }

    /// Keep a mixin's members so interfaces in other files can fold them in.
    pub fn record_mixin(&mut self, mixin: Interface) {
        self.mixins.insert(mixin.name.clone(), mixin);
    }

    pub fn union_count(&self) -> usize {
        self.unions.len()
    }

    /// End Phase 1.
    ///
    /// Union members that name a dictionary are rewritten to dictionary
    /// references here, once every declaration is known.
    pub fn finalize(self) -> FinalizedCollections {
        let mut unions = BTreeMap::new();
        for signature in self.unions.signatures.into_values() {
            let mut ty = TypeDescriptor::new(TypeKind::Union(signature));
            ty.resolve_dictionaries(&self.dictionaries);
            if let Some(resolved) = ty.as_union() {
                unions.insert(resolved.file_name(), resolved.clone());
            }
        }

        let mut mixins = self.mixins;
        for mixin in mixins.values_mut() {
            mixin.resolve_dictionaries(&self.dictionaries);
        }

        FinalizedCollections {
            unions,
            properties: self.properties.properties,
            files: self.properties.files,
            interfaces: self.properties.interfaces,
            dictionaries: self.dictionaries,
            mixins,
        }
    }
}

/// Read-only collector state for Phase 2.
#[derive(Debug, Default)]
pub struct FinalizedCollections {
    unions: BTreeMap<String, UnionSignature>,
    properties: BTreeSet<String>,
    files: IndexSet<String>,
    interfaces: IndexSet<String>,
    dictionaries: BTreeSet<String>,
    mixins: BTreeMap<String, Interface>,
}

impl FinalizedCollections {
    /// Every distinct union signature, in file-name order.
    pub fn union_signatures(&self) -> impl Iterator<Item = &UnionSignature> {
        self.unions.values()
    }

    /// Find the registered signature equal to `signature`.
    pub fn lookup_union(&self, signature: &UnionSignature) -> Option<&UnionSignature> {
        self.unions
            .get(&signature.file_name())
            .filter(|registered| *registered == signature)
    }

    /// Sorted, unique property names.
    pub fn properties(&self) -> impl Iterator<Item = &str> {
        self.properties.iter().map(String::as_str)
    }

    /// Generated base names that declared at least one interface.
    pub fn files(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(String::as_str)
    }

    /// Binding class names, e.g. `QJSNode`.
    pub fn interfaces(&self) -> impl Iterator<Item = &str> {
        self.interfaces.iter().map(String::as_str)
    }

    pub fn dictionaries(&self) -> &BTreeSet<String> {
        &self.dictionaries
    }

    pub fn is_dictionary(&self, name: &str) -> bool {
        self.dictionaries.contains(name)
    }

    pub fn mixin(&self, name: &str) -> Option<&Interface> {
        self.mixins.get(name)
    }
}

/// Output base names rendered with the name-table template.
#[derive(Debug, Default)]
pub struct NamesInstallSet {
    names: IndexSet<String>,
}

impl NamesInstallSet {
    pub fn register(&mut self, name: &str) {
        self.names.insert(name.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Consume the set; the aggregate installer is emitted exactly once.
    pub fn into_names(self) -> Vec<String> {
        self.names.into_iter().collect()
    }
}
