//! The closed type model every generator consumes.

use std::{cmp::Reverse, collections::BTreeSet};

/// Scalar and keyword types.
///
/// The discriminant is the numeric tag used for canonical union ordering:
/// members are sorted by descending tag, so strings (tag 0) land after every
/// numeric member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Primitive {
    DomString = 0,
    LegacyDomString = 1,
    Object = 2,
    Int64 = 3,
    Int32 = 4,
    Uint64 = 5,
    Uint32 = 6,
    Double = 7,
    Boolean = 8,
    Function = 9,
    Any = 10,
    Null = 11,
    Void = 12,
}

impl Primitive {
    pub fn tag(self) -> u8 {
        self as u8
    }

    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            Primitive::Int64
                | Primitive::Int32
                | Primitive::Uint64
                | Primitive::Uint32
                | Primitive::Double
        )
    }

    pub fn is_string(self) -> bool {
        matches!(self, Primitive::DomString | Primitive::LegacyDomString)
    }
}

/// Shape of a [`TypeDescriptor`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Primitive(Primitive),
    /// Reference to a `@Dictionary()` declaration, passed by shared value.
    Dictionary(String),
    /// Reference to a script-wrappable interface, passed by pointer.
    Pointer(String),
    /// `T[]`
    Sequence(Box<TypeDescriptor>),
    Union(UnionSignature),
}

/// A normalized type expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeDescriptor {
    pub kind: TypeKind,
    /// Set when the source type admitted `null`.
    pub nullable: bool,
}

impl TypeDescriptor {
    pub fn new(kind: TypeKind) -> Self {
        Self {
            kind,
            nullable: false,
        }
    }

    pub fn primitive(primitive: Primitive) -> Self {
        Self::new(TypeKind::Primitive(primitive))
    }

    pub fn pointer(name: impl Into<String>) -> Self {
        Self::new(TypeKind::Pointer(name.into()))
    }

    pub fn sequence(inner: TypeDescriptor) -> Self {
        Self::new(TypeKind::Sequence(Box::new(inner)))
    }

    pub fn void() -> Self {
        Self::primitive(Primitive::Void)
    }

    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn as_primitive(&self) -> Option<Primitive> {
        match self.kind {
            TypeKind::Primitive(p) => Some(p),
            _ => None,
        }
    }

    pub fn is_void(&self) -> bool {
        self.as_primitive() == Some(Primitive::Void)
    }

    pub fn is_array(&self) -> bool {
        matches!(self.kind, TypeKind::Sequence(_))
    }

    pub fn as_union(&self) -> Option<&UnionSignature> {
        match &self.kind {
            TypeKind::Union(signature) => Some(signature),
            _ => None,
        }
    }

    /// Call `f` for this descriptor and every union nested inside it.
    pub fn visit_unions<'a>(&'a self, f: &mut impl FnMut(&'a UnionSignature)) {
        match &self.kind {
            TypeKind::Union(signature) => {
                f(signature);
                for member in signature.members() {
                    member.visit_unions(f);
                }
            }
            TypeKind::Sequence(inner) => inner.visit_unions(f),
            TypeKind::Primitive(_) | TypeKind::Dictionary(_) | TypeKind::Pointer(_) => {}
        }
    }

    /// Rewrite pointer references that name a dictionary declaration.
    pub fn resolve_dictionaries(&mut self, dictionaries: &BTreeSet<String>) {
        if let TypeKind::Pointer(name) = &self.kind {
            if dictionaries.contains(name) {
                self.kind = TypeKind::Dictionary(name.clone());
            }
            return;
        }
        match &mut self.kind {
            TypeKind::Sequence(inner) => inner.resolve_dictionaries(dictionaries),
            TypeKind::Union(signature) => {
                for member in &mut signature.members {
                    member.resolve_dictionaries(dictionaries);
                }
            }
            TypeKind::Pointer(_) | TypeKind::Primitive(_) | TypeKind::Dictionary(_) => {}
        }
    }

    /// Sort key for canonical union member order.
    ///
    /// Primitives come first by descending tag, then sequences, then named
    /// references ordered by name.
    fn canonical_key(&self) -> (u8, Reverse<u8>, String) {
        match &self.kind {
            TypeKind::Primitive(p) => (0, Reverse(p.tag()), String::new()),
            TypeKind::Sequence(_) | TypeKind::Union(_) => (1, Reverse(0), self.fragment()),
            TypeKind::Dictionary(name) | TypeKind::Pointer(name) => {
                (2, Reverse(0), name.clone())
            }
        }
    }
}

/// A canonically ordered, deduplicated, null-free union member list.
///
/// Construct through [`UnionSignature::normalize`]; every value of this type
/// upholds the canonical-order invariant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UnionSignature {
    members: Vec<TypeDescriptor>,
}

/// Result of normalizing a raw `A | B | ...` expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Normalized {
    /// Two or more members remain.
    Union(UnionSignature),
    /// Flattening and null-stripping left exactly one member.
    Single(TypeDescriptor),
    /// Every alternative was `null`.
    Null,
}

impl UnionSignature {
    /// Flatten nested unions, strip `null`, order and deduplicate members.
    ///
    /// Returns the normalized shape and whether a `null` alternative (or a
    /// nullable nested union) was seen.
    pub fn normalize(alternatives: Vec<TypeDescriptor>) -> (Normalized, bool) {
        let mut nullable = false;
        let mut flat = Vec::with_capacity(alternatives.len());
        flatten_into(alternatives, &mut flat, &mut nullable);

        flat.sort_by_key(TypeDescriptor::canonical_key);
        flat.dedup_by(|a, b| a.fragment() == b.fragment());

        let normalized = match flat.len() {
            0 => Normalized::Null,
            1 => Normalized::Single(flat.remove(0)),
            _ => Normalized::Union(UnionSignature { members: flat }),
        };
        (normalized, nullable)
    }

    pub fn members(&self) -> &[TypeDescriptor] {
        &self.members
    }
}

fn flatten_into(
    alternatives: Vec<TypeDescriptor>,
    out: &mut Vec<TypeDescriptor>,
    nullable: &mut bool,
) {
    for mut alternative in alternatives {
        *nullable |= alternative.nullable;
        alternative.nullable = false;
        match alternative.kind {
            TypeKind::Primitive(Primitive::Null) => *nullable = true,
            TypeKind::Union(nested) => flatten_into(nested.members, out, nullable),
            kind => out.push(TypeDescriptor::new(kind)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prim(p: Primitive) -> TypeDescriptor {
        TypeDescriptor::primitive(p)
    }

    fn union_of(alternatives: Vec<TypeDescriptor>) -> UnionSignature {
        match UnionSignature::normalize(alternatives).0 {
            Normalized::Union(signature) => signature,
            other => panic!("expected union, got {:?}", other),
        }
    }

    #[test]
    fn test_source_order_does_not_matter() {
        let a = union_of(vec![prim(Primitive::DomString), prim(Primitive::Double)]);
        let b = union_of(vec![prim(Primitive::Double), prim(Primitive::DomString)]);
        assert_eq!(a, b);
        assert_eq!(a.members()[0], prim(Primitive::Double));
        assert_eq!(a.members()[1], prim(Primitive::DomString));
    }

    #[test]
    fn test_numeric_members_descend_by_tag() {
        let signature = union_of(vec![
            prim(Primitive::Int32),
            prim(Primitive::DomString),
            prim(Primitive::Boolean),
            prim(Primitive::Double),
        ]);
        let tags: Vec<u8> = signature
            .members()
            .iter()
            .map(|m| m.as_primitive().unwrap().tag())
            .collect();
        assert_eq!(tags, vec![8, 7, 4, 0]);
    }

    #[test]
    fn test_references_follow_primitives() {
        let signature = union_of(vec![
            TypeDescriptor::pointer("Node"),
            prim(Primitive::DomString),
            TypeDescriptor::sequence(prim(Primitive::Double)),
        ]);
        assert_eq!(signature.members()[0], prim(Primitive::DomString));
        assert!(signature.members()[1].is_array());
        assert_eq!(signature.members()[2], TypeDescriptor::pointer("Node"));
    }

    #[test]
    fn test_null_is_stripped_and_recorded() {
        let (normalized, nullable) =
            UnionSignature::normalize(vec![prim(Primitive::DomString), prim(Primitive::Null)]);
        assert!(nullable);
        assert_eq!(normalized, Normalized::Single(prim(Primitive::DomString)));
    }

    #[test]
    fn test_nested_unions_flatten() {
        let inner = union_of(vec![prim(Primitive::Boolean), prim(Primitive::Double)]);
        let nested = TypeDescriptor::new(TypeKind::Union(inner)).nullable(true);
        let (normalized, nullable) =
            UnionSignature::normalize(vec![nested, prim(Primitive::DomString)]);
        assert!(nullable);
        let Normalized::Union(signature) = normalized else {
            panic!("expected union");
        };
        assert_eq!(signature.members().len(), 3);
        assert!(signature.members().iter().all(|m| m.as_union().is_none()));
    }

    #[test]
    fn test_duplicates_collapse() {
        let (normalized, _) = UnionSignature::normalize(vec![
            prim(Primitive::Double),
            prim(Primitive::Double),
        ]);
        assert_eq!(normalized, Normalized::Single(prim(Primitive::Double)));
    }

    #[test]
    fn test_only_null() {
        let (normalized, nullable) = UnionSignature::normalize(vec![prim(Primitive::Null)]);
        assert_eq!(normalized, Normalized::Null);
        assert!(nullable);
    }

    #[test]
    fn test_resolve_dictionaries_reaches_into_unions() {
        let dictionaries = BTreeSet::from(["EventInit".to_string()]);
        let mut ty = TypeDescriptor::new(TypeKind::Union(union_of(vec![
            TypeDescriptor::pointer("EventInit"),
            prim(Primitive::Boolean),
        ])));
        ty.resolve_dictionaries(&dictionaries);

        let members = ty.as_union().unwrap().members();
        assert_eq!(members[1].kind, TypeKind::Dictionary("EventInit".into()));
    }
}
