//! Parsed declarations of one IDL file.

use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};

use bridgegen_core::{to_pascal_case, to_snake_case};

use crate::{naming::FILE_PREFIX, types::TypeDescriptor};

/// Which template a declaration is generated with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeclarationKind {
    /// A script-wrappable class with a constructor.
    #[default]
    Interface,
    /// `@Dictionary()`: a plain value struct converted member-wise.
    Dictionary,
    /// `@Mixin()`: members folded into the interfaces that extend it.
    Mixin,
}

/// Modifiers carried by type wrappers such as `StaticMember<T>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeMode {
    pub is_static: bool,
    /// `DartImpl<T>`: the call is forwarded to the native side.
    pub native_impl: bool,
    /// `DartImpl<DependentsOnLayout<T>>`
    pub layout_dependent: bool,
    /// `NewObject<T>`
    pub new_object: bool,
    /// `ImplementedAs<T, "name">`
    pub secondary_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub name: String,
    pub ty: TypeDescriptor,
    pub readonly: bool,
    pub optional: bool,
    /// Declared through a computed key like `[Symbol.iterator]`.
    pub is_symbol: bool,
    pub mode: TypeMode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    pub name: String,
    pub ty: TypeDescriptor,
    pub required: bool,
    pub variadic: bool,
    pub mode: TypeMode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Method {
    pub name: String,
    pub args: Vec<Argument>,
    pub return_type: TypeDescriptor,
    pub return_mode: TypeMode,
}

impl Method {
    pub fn required_args(&self) -> usize {
        self.args.iter().filter(|a| a.required).count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKey {
    Number,
    String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedProperty {
    pub key: IndexKey,
    pub ty: TypeDescriptor,
    pub readonly: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Interface {
    pub name: String,
    pub kind: DeclarationKind,
    pub parent: Option<String>,
    pub mixins: Vec<String>,
    pub properties: Vec<Property>,
    pub methods: Vec<Method>,
    pub constructor: Option<Method>,
    pub indexed: Option<IndexedProperty>,
}

impl Interface {
    /// Every type descriptor reachable from this declaration.
    pub fn types(&self) -> impl Iterator<Item = &TypeDescriptor> {
        let props = self.properties.iter().map(|p| &p.ty);
        let methods = self
            .methods
            .iter()
            .chain(self.constructor.iter())
            .flat_map(|m| m.args.iter().map(|a| &a.ty).chain(std::iter::once(&m.return_type)));
        let indexed = self.indexed.iter().map(|i| &i.ty);
        props.chain(methods).chain(indexed)
    }

    /// Rewrite references to dictionary declarations in every member.
    pub fn resolve_dictionaries(&mut self, dictionaries: &BTreeSet<String>) {
        for ty in self.types_mut() {
            ty.resolve_dictionaries(dictionaries);
        }
    }

    fn types_mut(&mut self) -> Vec<&mut TypeDescriptor> {
        let mut out: Vec<&mut TypeDescriptor> =
            self.properties.iter_mut().map(|p| &mut p.ty).collect();
        for method in self.methods.iter_mut().chain(self.constructor.iter_mut()) {
            out.extend(method.args.iter_mut().map(|a| &mut a.ty));
            out.push(&mut method.return_type);
        }
        out.extend(self.indexed.iter_mut().map(|i| &mut i.ty));
        out
    }
}

/// One top-level statement of an IDL file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    Interface(Interface),
    /// `declare const name: (args) => R;`
    Function(Method),
}

/// One declaration file and everything parsed out of it.
///
/// Created at discovery, filled in by the analyzer, read-only afterwards.
#[derive(Debug, Clone)]
pub struct InterfaceBlob {
    /// Absolute path of the `.d.ts` file.
    pub source: PathBuf,
    /// Directory the generated pair is written into.
    pub dist_dir: PathBuf,
    /// Generated file stem, e.g. `qjs_node`.
    pub name: String,
    /// Path relative to the source root, used for traceability comments.
    pub attribution: String,
    pub declarations: Vec<Declaration>,
}

impl InterfaceBlob {
    /// Create a blob for `source`, mirroring its location under `source_root`
    /// into `dist_root`.
    pub fn new(source: &Path, source_root: &Path, dist_root: &Path, suffix: &str) -> Self {
        let relative = source.strip_prefix(source_root).unwrap_or(source);
        let file_name = relative
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_default();
        let stem = file_name.strip_suffix(suffix).unwrap_or(&file_name);
        let dist_dir = match relative.parent() {
            Some(parent) => dist_root.join(parent),
            None => dist_root.to_path_buf(),
        };

        Self {
            source: source.to_path_buf(),
            dist_dir,
            name: format!("{}{}", FILE_PREFIX, to_snake_case(stem)),
            attribution: relative.to_string_lossy().replace('\\', "/"),
            declarations: Vec::new(),
        }
    }

    /// PascalCase class name derived from the file, used for global functions.
    pub fn class_name(&self) -> String {
        let stem = self.name.strip_prefix(FILE_PREFIX).unwrap_or(&self.name);
        to_pascal_case(stem)
    }

    pub fn interfaces(&self) -> impl Iterator<Item = &Interface> {
        self.declarations.iter().filter_map(|d| match d {
            Declaration::Interface(i) => Some(i),
            Declaration::Function(_) => None,
        })
    }

    pub fn functions(&self) -> impl Iterator<Item = &Method> {
        self.declarations.iter().filter_map(|d| match d {
            Declaration::Function(f) => Some(f),
            Declaration::Interface(_) => None,
        })
    }

    /// Every type descriptor in the file.
    pub fn types(&self) -> impl Iterator<Item = &TypeDescriptor> {
        self.declarations.iter().flat_map(declaration_types)
    }

    /// Rewrite references to dictionary declarations across the file.
    pub fn resolve_dictionaries(&mut self, dictionaries: &BTreeSet<String>) {
        for declaration in &mut self.declarations {
            match declaration {
                Declaration::Interface(interface) => interface.resolve_dictionaries(dictionaries),
                Declaration::Function(function) => {
                    for arg in &mut function.args {
                        arg.ty.resolve_dictionaries(dictionaries);
                    }
                    function.return_type.resolve_dictionaries(dictionaries);
                }
            }
        }
    }
}

fn declaration_types(declaration: &Declaration) -> Box<dyn Iterator<Item = &TypeDescriptor> + '_> {
    match declaration {
        Declaration::Interface(i) => Box::new(i.types()),
        Declaration::Function(f) => Box::new(
            f.args
                .iter()
                .map(|a| &a.ty)
                .chain(std::iter::once(&f.return_type)),
        ),
    }
}
