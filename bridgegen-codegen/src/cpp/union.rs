//! Tagged wrapper classes for union types.

use std::path::Path;

use bridgegen_core::{GeneratedArtifact, to_snake_case};
use bridgegen_ir::{
    CLASS_PREFIX, FILE_PREFIX, FinalizedCollections, Primitive, TypeDescriptor, TypeKind,
    UnionSignature,
};

use super::{
    HeaderGuard, Includes, NAMESPACE, Namespace, Storage, TypeMapper, banner, fragments::lines,
};
use crate::{
    builder::{CodeBuilder, CodeFragment, Renderable},
    error::{CodegenError, Result},
};

/// One alternative of a union, with every spelling the templates need.
struct Alternative<'a> {
    ty: &'a TypeDescriptor,
    fragment: String,
    converter: String,
    native: String,
    storage: Storage,
    field: String,
    rank: u8,
    check: String,
    reset: String,
}

impl Alternative<'_> {
    fn tag(&self) -> String {
        format!("ContentType::k{}", self.fragment)
    }

    /// Parameter spelling for constructors and setters taking a copy.
    fn param(&self) -> String {
        match self.storage {
            Storage::Scalar | Storage::Pointer => self.native.clone(),
            Storage::Value => format!("const {}&", self.native),
        }
    }

    fn getter_return(&self) -> String {
        match self.storage {
            Storage::Scalar | Storage::Pointer => self.native.clone(),
            Storage::Value => format!("const {}&", self.native),
        }
    }

    fn field_decl(&self) -> String {
        let init = match (&self.ty.kind, self.storage) {
            (TypeKind::Primitive(Primitive::Boolean), _) => "{false}",
            (_, Storage::Scalar) => "{0}",
            (_, Storage::Pointer) => "{nullptr}",
            (_, Storage::Value) => "",
        };
        format!("{} {}{};", self.native, self.field, init)
    }
}

/// Statement in `Clear()` resetting `field` to its empty value.
fn clear_statement(owner: &str, ty: &TypeDescriptor, field: &str) -> Result<String> {
    let value = match &ty.kind {
        TypeKind::Sequence(_) => return Ok(format!("{}.clear();", field)),
        TypeKind::Pointer(_) | TypeKind::Dictionary(_) | TypeKind::Union(_) => "nullptr",
        TypeKind::Primitive(primitive) => match primitive {
            Primitive::Boolean => "false",
            Primitive::DomString | Primitive::LegacyDomString => "AtomicString::Empty()",
            Primitive::Object => "ScriptValue()",
            Primitive::Function => "nullptr",
            Primitive::Int32
            | Primitive::Int64
            | Primitive::Uint32
            | Primitive::Uint64
            | Primitive::Double => "0",
            Primitive::Any | Primitive::Null | Primitive::Void => {
                return Err(unheld(owner, ty, *primitive));
            }
        },
    };
    Ok(format!("{} = {};", field, value))
}

/// Runtime check selecting an alternative in `Create`, with its dispatch rank.
fn predicate(owner: &str, ty: &TypeDescriptor) -> Result<(u8, String)> {
    let check = match &ty.kind {
        TypeKind::Sequence(_) => (0, "JS_IsArray(ctx, value)".to_string()),
        TypeKind::Pointer(name) => (
            1,
            format!(
                "{}{}::HasInstance(ExecutingContext::From(ctx), value)",
                CLASS_PREFIX, name
            ),
        ),
        TypeKind::Dictionary(_) | TypeKind::Union(_) => (3, "JS_IsObject(value)".to_string()),
        TypeKind::Primitive(primitive) => match primitive {
            Primitive::Function => (2, "JS_IsFunction(ctx, value)".to_string()),
            Primitive::Object => (4, "JS_IsObject(value)".to_string()),
            Primitive::Boolean => (5, "JS_IsBool(value)".to_string()),
            Primitive::Int32
            | Primitive::Int64
            | Primitive::Uint32
            | Primitive::Uint64
            | Primitive::Double => (5, "JS_IsNumber(value)".to_string()),
            Primitive::DomString | Primitive::LegacyDomString => {
                (5, "JS_IsString(value)".to_string())
            }
            Primitive::Any | Primitive::Null | Primitive::Void => {
                return Err(unheld(owner, ty, *primitive));
            }
        },
    };
    Ok(check)
}

/// Alternatives that get a converting constructor. Members sharing a
/// parameter type (`DOMString` and its legacy variant) keep only the first.
fn constructors<'a, 'b>(alternatives: &'b [Alternative<'a>]) -> Vec<&'b Alternative<'a>> {
    let mut seen = Vec::new();
    alternatives
        .iter()
        .filter(|alt| {
            let param = alt.param();
            if seen.contains(&param) {
                false
            } else {
                seen.push(param);
                true
            }
        })
        .collect()
}

fn unheld(owner: &str, ty: &TypeDescriptor, primitive: Primitive) -> CodegenError {
    CodegenError::UnsupportedType {
        owner: owner.to_string(),
        member: ty.fragment(),
        ty: primitive.idl_name().to_string(),
        reason: "cannot be held by a union wrapper".to_string(),
    }
}

/// Generates one wrapper class per collected union signature.
///
/// The wrapper has no knowledge of which interfaces use it; output depends
/// only on the signature.
pub struct UnionGenerator<'a> {
    types: TypeMapper<'a>,
    dist_root: &'a Path,
}

impl<'a> UnionGenerator<'a> {
    pub fn new(collections: &'a FinalizedCollections, dist_root: &'a Path) -> Self {
        Self {
            types: TypeMapper::new(collections),
            dist_root,
        }
    }

    pub fn generate(&self, signature: &UnionSignature) -> Result<GeneratedArtifact> {
        let class = self
            .types
            .union_class(signature)
            .map_err(|e| CodegenError::unmapped("union", &signature.display_name(), e))?;
        let alternatives = self.alternatives(&class, signature)?;
        let file_name = signature.file_name();
        let attribution = format!("union type {}", signature.display_name());

        tracing::debug!(class = %class, members = alternatives.len(), "generating union");

        let header = self.header(&class, &file_name, &attribution, &alternatives);
        let source = self.source(&class, &file_name, &attribution, signature, &alternatives);
        Ok(GeneratedArtifact::new(self.dist_root, file_name, header, source))
    }

    fn alternatives<'s>(
        &self,
        class: &str,
        signature: &'s UnionSignature,
    ) -> Result<Vec<Alternative<'s>>> {
        signature
            .members()
            .iter()
            .map(|ty| {
                let fragment = ty.fragment();
                let field = format!("member_{}_", to_snake_case(&fragment));
                let (rank, check) = predicate(class, ty)?;
                let reset = clear_statement(class, ty, &field)?;
                let unmapped = |e| CodegenError::unmapped(class, &fragment, e);
                Ok(Alternative {
                    ty,
                    converter: self.types.converter(ty).map_err(unmapped)?,
                    native: self.types.native(ty).map_err(unmapped)?,
                    storage: TypeMapper::storage(ty),
                    field,
                    rank,
                    check,
                    reset,
                    fragment,
                })
            })
            .collect()
    }

    fn header(
        &self,
        class: &str,
        file_name: &str,
        attribution: &str,
        alternatives: &[Alternative<'_>],
    ) -> String {
        let mut includes = Includes::default();
        includes
            .system("cassert")
            .system("memory")
            .local("bindings/qjs/union_base.h")
            .local("bindings/qjs/exception_state.h");
        let mut forward = Vec::new();
        for alt in alternatives {
            match &alt.ty.kind {
                TypeKind::Sequence(inner) => {
                    includes.system("vector");
                    inner.visit_unions(&mut |nested| {
                        includes.local(format!("{}.h", nested.file_name()));
                    });
                }
                TypeKind::Pointer(name) | TypeKind::Dictionary(name) => {
                    forward.push(format!("class {};", name));
                }
                TypeKind::Primitive(p) if p.is_string() => {
                    includes.local("foundation/atomic_string.h");
                }
                TypeKind::Primitive(Primitive::Object) => {
                    includes.local("bindings/qjs/script_value.h");
                }
                TypeKind::Primitive(Primitive::Function) => {
                    includes.local("bindings/qjs/qjs_function.h");
                }
                TypeKind::Primitive(_) | TypeKind::Union(_) => {}
            }
        }

        let mut b = CodeBuilder::cpp();
        for line in &forward {
            b.push_line(line);
        }
        if !forward.is_empty() {
            b.push_blank();
        }

        b.push_line(&format!("class {} final : public UnionBase {{", class));
        b.push_line(" public:");
        b.push_indent();
        let tags: Vec<String> = alternatives
            .iter()
            .map(|alt| format!("k{}", alt.fragment))
            .collect();
        b.push_line(&format!(
            "enum class ContentType {{ kNone, {} }};",
            tags.join(", ")
        ));
        b.push_blank();
        b.push_line(&format!(
            "static std::shared_ptr<{}> Create(JSContext* ctx, JSValue value, ExceptionState& exception_state);",
            class
        ));
        b.push_blank();
        b.push_line(&format!("{}() = default;", class));
        for alt in constructors(alternatives) {
            b.push_line(&format!("explicit {}({} value);", class, alt.param()));
        }
        b.push_blank();
        b.push_line(
            "JSValue ToQuickJSValue(JSContext* ctx, ExceptionState& exception_state) const override;",
        );
        b.push_line("ContentType GetContentType() const { return content_type_; }");
        b.push_line("bool IsNull() const { return content_type_ == ContentType::kNone; }");

        for alt in alternatives {
            b.push_blank();
            b.push_line(&format!(
                "bool Is{}() const {{ return content_type_ == {}; }}",
                alt.fragment,
                alt.tag()
            ));
            b.push_block(
                &format!("{} GetAs{}() const {{", alt.getter_return(), alt.fragment),
                "}",
                |b| {
                    b.push_line(&format!("assert(Is{}());", alt.fragment));
                    b.push_line(&format!("return {};", alt.field));
                },
            );
            match alt.storage {
                Storage::Scalar | Storage::Pointer => {
                    b.push_line(&format!("void Set{}({} value);", alt.fragment, alt.native));
                }
                Storage::Value => {
                    b.push_line(&format!("void Set{}({}&& value);", alt.fragment, alt.native));
                    b.push_line(&format!(
                        "void Set{}(const {}& value);",
                        alt.fragment, alt.native
                    ));
                }
            }
        }
        b.push_dedent();
        b.push_blank();
        b.push_line(" private:");
        b.push_indent();
        b.push_line("void Clear();");
        b.push_blank();
        b.push_line("ContentType content_type_{ContentType::kNone};");
        for alt in alternatives {
            b.push_line(&alt.field_decl());
        }
        b.push_dedent();
        b.push_line("};");

        let mut body = includes.to_fragments();
        body.push(CodeFragment::blank());
        body.extend(Namespace::new(NAMESPACE, lines(&b.build())).to_fragments());

        let mut out = CodeBuilder::cpp();
        out.push_comment(&banner(attribution));
        out.push_blank();
        out.emit(&HeaderGuard::new(file_name, body));
        out.build()
    }

    fn source(
        &self,
        class: &str,
        file_name: &str,
        attribution: &str,
        signature: &UnionSignature,
        alternatives: &[Alternative<'_>],
    ) -> String {
        let mut includes = Includes::default();
        includes
            .local(format!("{}.h", file_name))
            .local("bindings/qjs/converter_impl.h")
            .local("core/executing_context.h");
        for alt in alternatives {
            if let TypeKind::Pointer(name) = &alt.ty.kind {
                includes.local(format!("{}{}.h", FILE_PREFIX, to_snake_case(name)));
            }
        }

        let mut b = CodeBuilder::cpp();
        self.create(&mut b, class, signature, alternatives);

        for alt in constructors(alternatives) {
            b.push_blank();
            b.push_line(&format!(
                "{class}::{class}({} value) : content_type_({}), {}(value) {{}}",
                alt.param(),
                alt.tag(),
                alt.field
            ));
        }

        b.push_blank();
        b.push_block(
            &format!(
                "JSValue {}::ToQuickJSValue(JSContext* ctx, ExceptionState& exception_state) const {{",
                class
            ),
            "}",
            |b| {
                b.push_block("switch (content_type_) {", "}", |b| {
                    b.push_line("case ContentType::kNone:");
                    b.push_line("  return JS_NULL;");
                    for alt in alternatives {
                        b.push_line(&format!("case {}:", alt.tag()));
                        b.push_line(&format!(
                            "  return Converter<{}>::ToValue(ctx, {});",
                            alt.converter, alt.field
                        ));
                    }
                });
                b.push_line("return JS_NULL;");
            },
        );

        for alt in alternatives {
            let variants: Vec<(String, String)> = match alt.storage {
                Storage::Scalar | Storage::Pointer => {
                    vec![(format!("{} value", alt.native), "value".to_string())]
                }
                Storage::Value => vec![
                    (format!("{}&& value", alt.native), "std::move(value)".to_string()),
                    (format!("const {}& value", alt.native), "value".to_string()),
                ],
            };
            for (param, assign) in variants {
                b.push_blank();
                b.push_block(
                    &format!("void {}::Set{}({}) {{", class, alt.fragment, param),
                    "}",
                    |b| {
                        b.push_line("Clear();");
                        b.push_line(&format!("{} = {};", alt.field, assign));
                        b.push_line(&format!("content_type_ = {};", alt.tag()));
                    },
                );
            }
        }

        b.push_blank();
        b.push_block(&format!("void {}::Clear() {{", class), "}", |b| {
            for alt in alternatives {
                b.push_line(&alt.reset);
            }
            b.push_line("content_type_ = ContentType::kNone;");
        });

        let mut out = CodeBuilder::cpp();
        out.push_comment(&banner(attribution));
        out.push_blank();
        out.emit(&includes);
        out.push_blank();
        out.emit(&Namespace::new(NAMESPACE, lines(&b.build())));
        out.build()
    }

    /// `Create`: try each alternative's runtime check in dispatch order.
    fn create(
        &self,
        b: &mut CodeBuilder,
        class: &str,
        signature: &UnionSignature,
        alternatives: &[Alternative<'_>],
    ) {
        let mut ordered: Vec<&Alternative<'_>> = alternatives.iter().collect();
        // Stable: alternatives with the same rank keep canonical order.
        ordered.sort_by_key(|alt| alt.rank);

        b.push_block(
            &format!(
                "std::shared_ptr<{class}> {class}::Create(JSContext* ctx, JSValue value, ExceptionState& exception_state) {{"
            ),
            "}",
            |b| {
                let mut emitted: Vec<&str> = Vec::new();
                for alt in &ordered {
                    if emitted.contains(&alt.check.as_str()) {
                        continue;
                    }
                    emitted.push(&alt.check);
                    b.push_block(&format!("if ({}) {{", alt.check), "}", |b| {
                        b.push_line(&format!(
                            "auto&& converted = Converter<{}>::FromValue(ctx, value, exception_state);",
                            alt.converter
                        ));
                        b.push_block("if (UNLIKELY(exception_state.HasException())) {", "}", |b| {
                            b.push_line("return nullptr;");
                        });
                        b.push_line(&format!("return std::make_shared<{}>(converted);", class));
                    });
                }
                b.push_line(&format!(
                    "exception_state.ThrowException(ctx, ErrorType::TypeError, \"The provided value is not of type '{}'.\");",
                    signature.display_name()
                ));
                b.push_line("return nullptr;");
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use bridgegen_ir::{CollectionContext, Normalized};

    use super::*;

    fn signature(alternatives: Vec<TypeDescriptor>) -> UnionSignature {
        match UnionSignature::normalize(alternatives).0 {
            Normalized::Union(signature) => signature,
            other => panic!("expected union, got {:?}", other),
        }
    }

    fn generate(sig: &UnionSignature) -> Result<GeneratedArtifact> {
        let mut ctx = CollectionContext::new();
        ctx.register_union(sig).unwrap();
        let collections = ctx.finalize();
        UnionGenerator::new(&collections, Path::new("/dist")).generate(sig)
    }

    #[test]
    fn test_string_or_number() {
        let sig = signature(vec![
            TypeDescriptor::primitive(Primitive::DomString),
            TypeDescriptor::primitive(Primitive::Double),
        ]);
        let artifact = generate(&sig).unwrap();

        assert_eq!(artifact.base_name, "qjs_union_double_dom_string");
        assert_eq!(artifact.dir, Path::new("/dist"));
        assert!(
            artifact
                .header
                .contains("enum class ContentType { kNone, kDouble, kDomString };")
        );
        assert!(artifact.header.contains("void SetDouble(double value);"));
        assert!(artifact.header.contains("void SetDomString(AtomicString&& value);"));
        assert!(
            artifact
                .header
                .contains("void SetDomString(const AtomicString& value);")
        );
        assert!(artifact.header.contains("double member_double_{0};"));
        assert!(artifact.header.contains("#ifndef BRIDGE_QJS_UNION_DOUBLE_DOM_STRING_H_"));

        let number = artifact.source.find("JS_IsNumber(value)").unwrap();
        let string = artifact.source.find("JS_IsString(value)").unwrap();
        assert!(number < string);
        assert!(
            artifact
                .source
                .contains("The provided value is not of type '(double or DOMString)'.")
        );
        assert!(artifact.source.contains("member_dom_string_ = AtomicString::Empty();"));
    }

    #[test]
    fn test_pointer_and_sequence_dispatch() {
        let sig = signature(vec![
            TypeDescriptor::pointer("Node"),
            TypeDescriptor::sequence(TypeDescriptor::primitive(Primitive::DomString)),
        ]);
        let artifact = generate(&sig).unwrap();

        assert!(artifact.header.contains("class Node;"));
        assert!(artifact.header.contains("void SetNode(Node* value);"));
        assert!(artifact.header.contains("Node* member_node_{nullptr};"));
        assert!(artifact.header.contains("#include <vector>"));

        let array = artifact.source.find("JS_IsArray(ctx, value)").unwrap();
        let node = artifact
            .source
            .find("QJSNode::HasInstance(ExecutingContext::From(ctx), value)")
            .unwrap();
        assert!(array < node);
        assert!(artifact.source.contains("#include \"qjs_node.h\""));
        assert!(artifact.source.contains("member_sequence_dom_string_.clear();"));
    }

    #[test]
    fn test_duplicate_checks_collapse() {
        let sig = signature(vec![
            TypeDescriptor::primitive(Primitive::Int32),
            TypeDescriptor::primitive(Primitive::Double),
        ]);
        let artifact = generate(&sig).unwrap();
        assert_eq!(artifact.source.matches("JS_IsNumber(value)").count(), 1);
    }

    #[test]
    fn test_any_member_is_rejected() {
        let sig = signature(vec![
            TypeDescriptor::primitive(Primitive::Any),
            TypeDescriptor::primitive(Primitive::DomString),
        ]);
        let err = generate(&sig).unwrap_err();
        assert!(matches!(
            err,
            CodegenError::UnsupportedType { ref ty, .. } if ty == "any"
        ));
    }

    #[test]
    fn test_predicate_and_clear_reject_unheld_primitives() {
        for primitive in [Primitive::Any, Primitive::Null, Primitive::Void] {
            let ty = TypeDescriptor::primitive(primitive);
            let err = predicate("QJSUnionX", &ty).unwrap_err();
            assert!(matches!(
                err,
                CodegenError::UnsupportedType { ref owner, ref ty, .. }
                    if owner == "QJSUnionX" && ty == primitive.idl_name()
            ));
            assert!(matches!(
                clear_statement("QJSUnionX", &ty, "member_x_").unwrap_err(),
                CodegenError::UnsupportedType { .. }
            ));
        }

        let object = TypeDescriptor::primitive(Primitive::Object);
        assert_eq!(predicate("QJSUnionX", &object).unwrap().1, "JS_IsObject(value)");
        assert_eq!(
            clear_statement("QJSUnionX", &object, "member_object_").unwrap(),
            "member_object_ = ScriptValue();"
        );
    }

    #[test]
    fn test_string_variants_share_one_constructor() {
        let sig = signature(vec![
            TypeDescriptor::primitive(Primitive::DomString),
            TypeDescriptor::primitive(Primitive::LegacyDomString),
        ]);
        let artifact = generate(&sig).unwrap();

        let class = sig.class_name();
        let declaration = format!("explicit {}(const AtomicString& value);", class);
        assert_eq!(artifact.header.matches(&declaration).count(), 1);
        let definition = format!("{class}::{class}(const AtomicString& value)");
        assert_eq!(artifact.source.matches(&definition).count(), 1);
        // both setters survive
        assert!(artifact.header.contains("void SetDomString(const AtomicString& value);"));
        assert!(
            artifact
                .header
                .contains("void SetLegacyDomString(const AtomicString& value);")
        );
    }

    #[test]
    fn test_unregistered_signature() {
        let sig = signature(vec![
            TypeDescriptor::primitive(Primitive::Boolean),
            TypeDescriptor::primitive(Primitive::DomString),
        ]);
        let collections = CollectionContext::new().finalize();
        let err = UnionGenerator::new(&collections, Path::new("/dist"))
            .generate(&sig)
            .unwrap_err();
        assert!(matches!(err, CodegenError::UnregisteredUnion { .. }));
    }
}
