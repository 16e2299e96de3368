//! Turns parsed declarations into the type model and feeds the collectors.

use bridgegen_ir::{
    Argument, CollectionContext, Declaration, DeclarationKind, IndexKey, IndexedProperty,
    Interface, InterfaceBlob, Method, Normalized, Primitive, Property, TypeDescriptor, TypeKind,
    TypeMode, UnionSignature,
};
use miette::SourceSpan;

use crate::{
    error::{AnalysisError, Result, SourceContext},
    parser::parse,
    syntax::{InterfaceDecl, Item, Member, MemberName, Param, TypeExpr, TypeExprKind},
};

/// Read `blob.source`, parse it and fill `blob.declarations`.
///
/// Every union reachable from a member is registered with `ctx`, and every
/// property signature and interface name is recorded.
pub fn analyze(blob: &mut InterfaceBlob, ctx: &mut CollectionContext) -> Result<()> {
    let src = std::fs::read_to_string(&blob.source).map_err(|source| {
        Box::new(AnalysisError::Io {
            path: blob.source.clone(),
            source,
        })
    })?;
    analyze_source(&src, blob, ctx)
}

/// Analyze `src` as the content of `blob`.
pub fn analyze_source(
    src: &str,
    blob: &mut InterfaceBlob,
    ctx: &mut CollectionContext,
) -> Result<()> {
    let source = SourceContext::new(src, blob.attribution.clone());
    let items = parse(&source)?;

    let mut analyzer = Analyzer {
        source: &source,
        file: &blob.name,
        ctx,
    };
    let mut declarations = Vec::with_capacity(items.len());
    for item in items {
        declarations.push(analyzer.item(item)?);
    }

    tracing::debug!(
        file = %blob.attribution,
        declarations = declarations.len(),
        "analyzed declaration file"
    );
    blob.declarations = declarations;
    Ok(())
}

struct Analyzer<'a> {
    source: &'a SourceContext,
    file: &'a str,
    ctx: &'a mut CollectionContext,
}

impl Analyzer<'_> {
    fn item(&mut self, item: Item) -> Result<Declaration> {
        match item {
            Item::Interface(decl) => Ok(Declaration::Interface(self.interface(decl)?)),
            Item::Const { name, ty, span } => {
                let TypeExprKind::Function { params, ret } = ty.kind else {
                    return Err(self.source.unsupported_error(
                        format!("'{}' must be declared with a function type", name),
                        span,
                    ));
                };
                Ok(Declaration::Function(self.method(name, params, *ret)?))
            }
        }
    }

    fn interface(&mut self, decl: InterfaceDecl) -> Result<Interface> {
        let kind = match decl.decorators.first().map(String::as_str) {
            Some("Dictionary") => DeclarationKind::Dictionary,
            Some("Mixin") => DeclarationKind::Mixin,
            _ => DeclarationKind::Interface,
        };

        let mut heritage = decl.heritage.into_iter();
        let mut parent = None;
        let mut mixins = Vec::new();
        if let Some(first) = heritage.next() {
            if first.to_lowercase().contains("mixin") {
                mixins.push(first);
            } else {
                parent = Some(first);
            }
        }
        mixins.extend(heritage);

        match kind {
            DeclarationKind::Interface => self.ctx.record_interface(self.file, &decl.name),
            DeclarationKind::Dictionary => self.ctx.record_dictionary(&decl.name),
            DeclarationKind::Mixin => {}
        }

        let mut interface = Interface {
            name: decl.name,
            kind,
            parent,
            mixins,
            ..Default::default()
        };

        for member in decl.members {
            self.member(&mut interface, member)?;
        }

        if kind == DeclarationKind::Interface && interface.constructor.is_none() {
            return Err(self
                .source
                .missing_constructor_error(interface.name, decl.span));
        }
        if kind == DeclarationKind::Mixin {
            self.ctx.record_mixin(interface.clone());
        }

        Ok(interface)
    }

    fn member(&mut self, interface: &mut Interface, member: Member) -> Result<()> {
        match member {
            Member::Property {
                name,
                ty,
                readonly,
                optional,
                ..
            } => {
                let is_symbol = matches!(name, MemberName::Computed { .. });
                let name = name.flatten();
                self.ctx.record_property(&name);

                if let TypeExprKind::Function { params, ret } = ty.kind {
                    let method = self.method(name, params, *ret)?;
                    interface.methods.push(method);
                    return Ok(());
                }

                let (ty, mode) = self.member_type(&ty)?;
                interface.properties.push(Property {
                    name,
                    ty,
                    readonly,
                    optional,
                    is_symbol,
                    mode,
                });
            }
            Member::Method {
                name, params, ret, ..
            } => {
                let name = name.flatten();
                let method = self.method(name, params, ret)?;
                interface.methods.push(method);
            }
            Member::Index {
                key, ty, readonly, ..
            } => {
                let key = match &key.kind {
                    TypeExprKind::Named { name, .. } if name == "number" => IndexKey::Number,
                    _ => IndexKey::String,
                };
                let (ty, _) = self.member_type(&ty)?;
                interface.indexed = Some(IndexedProperty { key, ty, readonly });
            }
            Member::Construct { params, ret, .. } => {
                interface.constructor = Some(self.method("constructor".to_string(), params, ret)?);
            }
        }
        Ok(())
    }

    fn method(&mut self, name: String, params: Vec<Param>, ret: TypeExpr) -> Result<Method> {
        let mut args = Vec::with_capacity(params.len());
        for param in params {
            let (ty, mode) = self.member_type(&param.ty)?;
            args.push(Argument {
                name: param.name,
                ty,
                required: !param.optional,
                variadic: param.variadic,
                mode,
            });
        }
        let (return_type, return_mode) = self.member_type(&ret)?;
        Ok(Method {
            name,
            args,
            return_type,
            return_mode,
        })
    }

    /// Resolve a member's type and register the unions it contains.
    fn member_type(&mut self, expr: &TypeExpr) -> Result<(TypeDescriptor, TypeMode)> {
        let mut mode = TypeMode::default();
        let ty = self.resolve(expr, &mut mode)?;
        self.ctx
            .register_unions(&ty)
            .map_err(|clash| self.source.union_name_clash_error(clash, expr.span))?;
        Ok((ty, mode))
    }

    fn resolve(&self, expr: &TypeExpr, mode: &mut TypeMode) -> Result<TypeDescriptor> {
        match &expr.kind {
            TypeExprKind::Named { name, args } => self.resolve_named(name, args, expr.span, mode),
            TypeExprKind::Array(inner) => {
                let element = self.resolve(inner, &mut TypeMode::default())?;
                Ok(TypeDescriptor::sequence(element))
            }
            TypeExprKind::Union(alternatives) => {
                let mut resolved = Vec::with_capacity(alternatives.len());
                for alternative in alternatives {
                    resolved.push(self.resolve(alternative, mode)?);
                }
                Ok(match UnionSignature::normalize(resolved) {
                    (Normalized::Union(signature), nullable) => {
                        TypeDescriptor::new(TypeKind::Union(signature)).nullable(nullable)
                    }
                    (Normalized::Single(single), nullable) => {
                        let nullable = nullable || single.nullable;
                        single.nullable(nullable)
                    }
                    (Normalized::Null, _) => TypeDescriptor::primitive(Primitive::Null),
                })
            }
            TypeExprKind::Function { .. } => Ok(TypeDescriptor::primitive(Primitive::Function)),
            TypeExprKind::StringLiteral(value) => Err(self.source.unsupported_error(
                format!(
                    "string literal type \"{}\" is only accepted as an ImplementedAs name",
                    value
                ),
                expr.span,
            )),
            TypeExprKind::Unsupported(what) => Err(self
                .source
                .unsupported_error(format!("{} is not supported", what), expr.span)),
        }
    }

    fn resolve_named(
        &self,
        name: &str,
        args: &[TypeExpr],
        span: SourceSpan,
        mode: &mut TypeMode,
    ) -> Result<TypeDescriptor> {
        match name {
            "StaticMember" => {
                mode.is_static = true;
                self.resolve(self.single_arg(name, args, span)?, mode)
            }
            "DartImpl" => {
                mode.native_impl = true;
                self.resolve(self.single_arg(name, args, span)?, mode)
            }
            "DependentsOnLayout" => {
                mode.layout_dependent = true;
                self.resolve(self.single_arg(name, args, span)?, mode)
            }
            "NewObject" => {
                mode.new_object = true;
                self.resolve(self.single_arg(name, args, span)?, mode)
            }
            "ImplementedAs" => match args {
                [
                    inner,
                    TypeExpr {
                        kind: TypeExprKind::StringLiteral(secondary),
                        ..
                    },
                ] => {
                    mode.secondary_name = Some(secondary.clone());
                    self.resolve(inner, mode)
                }
                _ => Err(self.source.unsupported_error(
                    "ImplementedAs expects a type and a string literal name",
                    span,
                )),
            },
            "Array" => {
                let element = self.resolve(self.single_arg(name, args, span)?, &mut TypeMode::default())?;
                Ok(TypeDescriptor::sequence(element))
            }
            _ if !args.is_empty() => Err(self.source.unsupported_error(
                format!("generic type '{}' is not supported", name),
                span,
            )),
            "LegacyNullToEmptyString" => Ok(TypeDescriptor::primitive(Primitive::LegacyDomString)),
            "string" | "DOMString" => Ok(TypeDescriptor::primitive(Primitive::DomString)),
            "number" | "double" => Ok(TypeDescriptor::primitive(Primitive::Double)),
            "boolean" => Ok(TypeDescriptor::primitive(Primitive::Boolean)),
            "any" => Ok(TypeDescriptor::primitive(Primitive::Any)),
            "object" => Ok(TypeDescriptor::primitive(Primitive::Object)),
            "void" => Ok(TypeDescriptor::void()),
            "null" | "undefined" => Ok(TypeDescriptor::primitive(Primitive::Null)),
            "Function" => Ok(TypeDescriptor::primitive(Primitive::Function)),
            "int32" => Ok(TypeDescriptor::primitive(Primitive::Int32)),
            "int64" => Ok(TypeDescriptor::primitive(Primitive::Int64)),
            "uint32" => Ok(TypeDescriptor::primitive(Primitive::Uint32)),
            "uint64" => Ok(TypeDescriptor::primitive(Primitive::Uint64)),
            _ if is_interface_name(name) => Ok(TypeDescriptor::pointer(name)),
            _ => Err(self.source.unknown_type_error(name, span)),
        }
    }

    fn single_arg<'t>(
        &self,
        wrapper: &str,
        args: &'t [TypeExpr],
        span: SourceSpan,
    ) -> Result<&'t TypeExpr> {
        match args {
            [arg] => Ok(arg),
            _ => Err(self.source.unsupported_error(
                format!("{} expects exactly one type argument", wrapper),
                span,
            )),
        }
    }
}

fn is_interface_name(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_ascii_uppercase())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}
