//! Type descriptor to C++ spelling.
//!
//! Every function here matches exhaustively on the closed type model, so a
//! new variant fails to compile until each mapping handles it.

use bridgegen_ir::{FinalizedCollections, Primitive, TypeDescriptor, TypeKind, UnionSignature};

/// Why a descriptor has no C++ spelling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unmapped {
    NoNativeType { ty: String, reason: &'static str },
    /// A union reached Phase 2 without being collected in Phase 1.
    UnregisteredUnion { name: String },
}

impl Unmapped {
    fn no_native(ty: &TypeDescriptor, reason: &'static str) -> Self {
        Self::NoNativeType {
            ty: ty.display_name(),
            reason,
        }
    }
}

/// How a value is held and passed in generated code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Storage {
    /// Numbers and booleans, passed by value.
    Scalar,
    /// Script-wrappable objects, passed as raw pointers.
    Pointer,
    /// Strings, sequences and shared objects, moved or copied.
    Value,
}

/// Maps descriptors to converter and storage types.
///
/// Union class names are looked up in the finalized collections rather than
/// derived here.
#[derive(Debug, Clone, Copy)]
pub struct TypeMapper<'a> {
    collections: &'a FinalizedCollections,
}

impl<'a> TypeMapper<'a> {
    pub fn new(collections: &'a FinalizedCollections) -> Self {
        Self { collections }
    }

    pub fn collections(&self) -> &'a FinalizedCollections {
        self.collections
    }

    /// Class name assigned to `signature` during collection.
    pub fn union_class(&self, signature: &UnionSignature) -> Result<String, Unmapped> {
        self.collections
            .lookup_union(signature)
            .map(UnionSignature::class_name)
            .ok_or_else(|| Unmapped::UnregisteredUnion {
                name: signature.display_name(),
            })
    }

    /// Converter type, e.g. `IDLNullable<IDLDOMString>`.
    pub fn converter(&self, ty: &TypeDescriptor) -> Result<String, Unmapped> {
        self.converter_with(ty, false)
    }

    /// Converter type for an optional argument or dictionary member.
    pub fn optional_converter(&self, ty: &TypeDescriptor) -> Result<String, Unmapped> {
        self.converter_with(ty, true)
    }

    fn converter_with(&self, ty: &TypeDescriptor, optional: bool) -> Result<String, Unmapped> {
        let base = match &ty.kind {
            TypeKind::Primitive(primitive) => primitive_converter(ty, *primitive)?.to_string(),
            TypeKind::Dictionary(name) | TypeKind::Pointer(name) => name.clone(),
            TypeKind::Sequence(inner) => format!("IDLSequence<{}>", self.converter(inner)?),
            TypeKind::Union(signature) => self.union_class(signature)?,
        };
        Ok(if ty.nullable {
            format!("IDLNullable<{}>", base)
        } else if optional {
            format!("IDLOptional<{}>", base)
        } else {
            base
        })
    }

    /// Storage type of a value, e.g. `AtomicString` or `Node*`.
    pub fn native(&self, ty: &TypeDescriptor) -> Result<String, Unmapped> {
        Ok(match &ty.kind {
            TypeKind::Primitive(primitive) => match primitive {
                Primitive::Int32 => "int32_t".to_string(),
                Primitive::Int64 => "int64_t".to_string(),
                Primitive::Uint32 => "uint32_t".to_string(),
                Primitive::Uint64 => "uint64_t".to_string(),
                Primitive::Double => "double".to_string(),
                Primitive::Boolean => "bool".to_string(),
                Primitive::DomString | Primitive::LegacyDomString => "AtomicString".to_string(),
                Primitive::Object | Primitive::Any => "ScriptValue".to_string(),
                Primitive::Function => "std::shared_ptr<QJSFunction>".to_string(),
                Primitive::Null => {
                    return Err(Unmapped::no_native(ty, "null only exists as a nullable flag"));
                }
                Primitive::Void => {
                    return Err(Unmapped::no_native(ty, "void cannot be stored"));
                }
            },
            TypeKind::Dictionary(name) => format!("std::shared_ptr<{}>", name),
            TypeKind::Pointer(name) => format!("{}*", name),
            TypeKind::Sequence(inner) => format!("std::vector<{}>", self.native(inner)?),
            TypeKind::Union(signature) => {
                format!("std::shared_ptr<{}>", self.union_class(signature)?)
            }
        })
    }

    /// Converter used when forwarding a value to the native side.
    pub fn native_value(&self, ty: &TypeDescriptor) -> Result<String, Unmapped> {
        let reason = "cannot be forwarded to the native side";
        Ok(match &ty.kind {
            TypeKind::Primitive(primitive) => match primitive {
                Primitive::Int32 | Primitive::Int64 | Primitive::Uint32 | Primitive::Uint64 => {
                    "NativeTypeInt64".to_string()
                }
                Primitive::Double => "NativeTypeDouble".to_string(),
                Primitive::Boolean => "NativeTypeBool".to_string(),
                Primitive::DomString | Primitive::LegacyDomString => "NativeTypeString".to_string(),
                Primitive::Object
                | Primitive::Any
                | Primitive::Function
                | Primitive::Null
                | Primitive::Void => return Err(Unmapped::no_native(ty, reason)),
            },
            TypeKind::Pointer(name) => format!("NativeTypePointer<{}>", name),
            TypeKind::Dictionary(_) | TypeKind::Sequence(_) | TypeKind::Union(_) => {
                return Err(Unmapped::no_native(ty, reason));
            }
        })
    }

    pub fn storage(ty: &TypeDescriptor) -> Storage {
        match &ty.kind {
            TypeKind::Primitive(primitive) => match primitive {
                Primitive::Int32
                | Primitive::Int64
                | Primitive::Uint32
                | Primitive::Uint64
                | Primitive::Double
                | Primitive::Boolean => Storage::Scalar,
                Primitive::DomString
                | Primitive::LegacyDomString
                | Primitive::Object
                | Primitive::Any
                | Primitive::Function
                | Primitive::Null
                | Primitive::Void => Storage::Value,
            },
            TypeKind::Pointer(_) => Storage::Pointer,
            TypeKind::Dictionary(_) | TypeKind::Sequence(_) | TypeKind::Union(_) => Storage::Value,
        }
    }
}

fn primitive_converter(ty: &TypeDescriptor, primitive: Primitive) -> Result<&'static str, Unmapped> {
    Ok(match primitive {
        Primitive::Int32 => "IDLInt32",
        Primitive::Int64 => "IDLInt64",
        Primitive::Uint32 => "IDLUint32",
        Primitive::Uint64 => "IDLUint64",
        Primitive::Double => "IDLDouble",
        Primitive::Boolean => "IDLBoolean",
        Primitive::DomString => "IDLDOMString",
        Primitive::LegacyDomString => "IDLLegacyDOMString",
        Primitive::Object => "IDLObject",
        Primitive::Function => "IDLCallback",
        Primitive::Any => "IDLAny",
        Primitive::Null => {
            return Err(Unmapped::no_native(ty, "null only exists as a nullable flag"));
        }
        Primitive::Void => return Err(Unmapped::no_native(ty, "void has no value converter")),
    })
}
