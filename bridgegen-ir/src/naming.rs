//! Identifier derivation for generated types and files.
//!
//! Every call site that must agree on a union's class or file name goes
//! through [`TypeDescriptor::fragment`]; nothing else builds these names.

use bridgegen_core::to_snake_case;

use crate::types::{Primitive, TypeDescriptor, TypeKind, UnionSignature};

/// Prefix of generated binding classes.
pub const CLASS_PREFIX: &str = "QJS";

/// Prefix of generated binding files.
pub const FILE_PREFIX: &str = "qjs_";

impl Primitive {
    /// PascalCase identifier fragment for this primitive.
    pub fn fragment(self) -> &'static str {
        match self {
            Primitive::DomString => "DomString",
            Primitive::LegacyDomString => "LegacyDomString",
            Primitive::Object => "Object",
            Primitive::Int64 => "Int64",
            Primitive::Int32 => "Int32",
            Primitive::Uint64 => "Uint64",
            Primitive::Uint32 => "Uint32",
            Primitive::Double => "Double",
            Primitive::Boolean => "Boolean",
            Primitive::Function => "Function",
            Primitive::Any => "Any",
            Primitive::Null => "Null",
            Primitive::Void => "Void",
        }
    }

    /// Name used in user-facing messages, matching the IDL spelling.
    pub fn idl_name(self) -> &'static str {
        match self {
            Primitive::DomString | Primitive::LegacyDomString => "DOMString",
            Primitive::Object => "object",
            Primitive::Int64 => "int64",
            Primitive::Int32 => "int32",
            Primitive::Uint64 => "uint64",
            Primitive::Uint32 => "uint32",
            Primitive::Double => "double",
            Primitive::Boolean => "boolean",
            Primitive::Function => "Function",
            Primitive::Any => "any",
            Primitive::Null => "null",
            Primitive::Void => "void",
        }
    }
}

impl TypeDescriptor {
    /// Deterministic PascalCase identifier fragment for this type.
    ///
    /// A nullable type nested inside a sequence keeps a `Nullable` prefix so
    /// that `(string | null)[]` and `string[]` never share a name.
    pub fn fragment(&self) -> String {
        let base = match &self.kind {
            TypeKind::Primitive(p) => p.fragment().to_string(),
            TypeKind::Dictionary(name) | TypeKind::Pointer(name) => name.clone(),
            TypeKind::Sequence(inner) => format!("Sequence{}", inner.fragment()),
            TypeKind::Union(signature) => signature.fragment(),
        };
        if self.nullable {
            format!("Nullable{}", base)
        } else {
            base
        }
    }

    /// Human readable spelling, e.g. `(double or DOMString)`.
    pub fn display_name(&self) -> String {
        let base = match &self.kind {
            TypeKind::Primitive(p) => p.idl_name().to_string(),
            TypeKind::Dictionary(name) | TypeKind::Pointer(name) => name.clone(),
            TypeKind::Sequence(inner) => format!("sequence<{}>", inner.display_name()),
            TypeKind::Union(signature) => signature.display_name(),
        };
        if self.nullable { format!("{}?", base) } else { base }
    }
}

impl UnionSignature {
    /// Concatenated member fragments, the identity of this signature.
    pub fn fragment(&self) -> String {
        self.members().iter().map(TypeDescriptor::fragment).collect()
    }

    /// Wrapper class name, e.g. `QJSUnionDoubleDomString`.
    pub fn class_name(&self) -> String {
        format!("{}Union{}", CLASS_PREFIX, self.fragment())
    }

    /// Output file stem, e.g. `qjs_union_double_dom_string`.
    pub fn file_name(&self) -> String {
        let parts: Vec<String> = self
            .members()
            .iter()
            .map(|member| to_snake_case(&member.fragment()))
            .collect();
        format!("{}union_{}", FILE_PREFIX, parts.join("_"))
    }

    pub fn display_name(&self) -> String {
        let names: Vec<String> = self
            .members()
            .iter()
            .map(TypeDescriptor::display_name)
            .collect();
        format!("({})", names.join(" or "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Normalized;

    fn signature(alternatives: Vec<TypeDescriptor>) -> UnionSignature {
        match UnionSignature::normalize(alternatives).0 {
            Normalized::Union(signature) => signature,
            other => panic!("expected union, got {:?}", other),
        }
    }

    #[test]
    fn test_union_names() {
        let sig = signature(vec![
            TypeDescriptor::primitive(Primitive::DomString),
            TypeDescriptor::primitive(Primitive::Double),
        ]);
        assert_eq!(sig.class_name(), "QJSUnionDoubleDomString");
        assert_eq!(sig.file_name(), "qjs_union_double_dom_string");
        assert_eq!(sig.display_name(), "(double or DOMString)");
    }

    #[test]
    fn test_sequence_and_reference_names() {
        let sig = signature(vec![
            TypeDescriptor::pointer("DOMMatrixInit"),
            TypeDescriptor::sequence(TypeDescriptor::primitive(Primitive::Double)),
        ]);
        assert_eq!(sig.class_name(), "QJSUnionSequenceDoubleDOMMatrixInit");
        assert_eq!(sig.file_name(), "qjs_union_sequence_double_dom_matrix_init");
    }

    #[test]
    fn test_nullable_sequence_element_changes_name() {
        let plain = TypeDescriptor::sequence(TypeDescriptor::primitive(Primitive::DomString));
        let nullable = TypeDescriptor::sequence(
            TypeDescriptor::primitive(Primitive::DomString).nullable(true),
        );
        assert_ne!(plain.fragment(), nullable.fragment());
    }
}
