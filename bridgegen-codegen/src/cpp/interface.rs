//! Binding classes for one declaration file.
//!
//! Each file produces one header/source pair holding a wrapper class per
//! interface, a value class per dictionary and an installer for global
//! functions. Mixins produce nothing on their own; their members are folded
//! into every interface that extends them.

use std::path::Path;

use bridgegen_core::{GeneratedArtifact, to_pascal_case, to_snake_case};
use bridgegen_ir::{
    Argument, CLASS_PREFIX, DeclarationKind, FILE_PREFIX, FinalizedCollections, IndexKey,
    IndexedProperty, Interface, InterfaceBlob, Method, Primitive, Property, TypeDescriptor,
    TypeKind, TypeMode,
};

use super::{
    ConfigTable, HeaderGuard, Includes, NAMESPACE, Namespace, Storage, TypeMapper, banner,
    fragments::lines,
};
use crate::{
    builder::{CodeBuilder, CodeFragment, Renderable},
    error::{CodegenError, Result},
};

const ILLEGAL_CONSTRUCTOR: &str = "return JS_ThrowTypeError(ctx, \"Illegal constructor\");\n";

/// How a function body reaches its implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CallKind {
    Constructor,
    Instance,
    Static,
    Global,
}

/// An interface with its mixin members folded in.
struct Members<'a> {
    properties: Vec<&'a Property>,
    methods: Vec<&'a Method>,
}

/// Generates the binding pair for one [`InterfaceBlob`].
pub struct InterfaceGenerator<'a> {
    blob: &'a InterfaceBlob,
    types: TypeMapper<'a>,
}

impl<'a> InterfaceGenerator<'a> {
    pub fn new(blob: &'a InterfaceBlob, collections: &'a FinalizedCollections) -> Self {
        Self {
            blob,
            types: TypeMapper::new(collections),
        }
    }

    /// Render the header/source pair. Nothing is written here.
    pub fn generate(&self) -> Result<GeneratedArtifact> {
        let mut header = CodeBuilder::cpp();
        let mut source = CodeBuilder::cpp();
        let mut header_includes = Includes::default();
        let mut source_includes = Includes::default();

        header_includes
            .system("quickjs/quickjs.h")
            .local("bindings/qjs/wrapper_type_info.h")
            .local("bindings/qjs/qjs_interface_bridge.h");
        source_includes
            .local(format!("{}.h", self.blob.name))
            .local(self.implementation_header())
            .local("bindings/qjs/member_installer.h")
            .local("bindings/qjs/converter_impl.h")
            .local("core/executing_context.h");

        for ty in self.blob.types() {
            ty.visit_unions(&mut |signature| {
                header_includes.local(format!("{}.h", signature.file_name()));
            });
        }

        let globals_owner = self.blob.class_name();
        let mut globals_emitted = false;
        for interface in self.blob.interfaces() {
            match interface.kind {
                DeclarationKind::Interface => {
                    let with_globals = interface.name == globals_owner;
                    globals_emitted |= with_globals;
                    self.interface(&mut header, &mut source, interface, with_globals)?;
                }
                DeclarationKind::Dictionary => {
                    header_includes
                        .system("memory")
                        .local("bindings/qjs/dictionary_base.h");
                    self.dictionary(&mut header, &mut source, interface)?;
                }
                DeclarationKind::Mixin => {}
            }
        }
        if !globals_emitted && self.blob.functions().next().is_some() {
            self.global_installer(&mut header, &mut source, &globals_owner)?;
        }

        tracing::debug!(file = %self.blob.name, "generated interface bindings");

        Ok(GeneratedArtifact::new(
            &self.blob.dist_dir,
            &self.blob.name,
            self.wrap_header(&header_includes, header.build()),
            self.wrap_source(&source_includes, source.build()),
        ))
    }

    /// Include path of the hand-written implementation, next to the IDL file.
    fn implementation_header(&self) -> String {
        let stem = self
            .blob
            .name
            .strip_prefix(FILE_PREFIX)
            .unwrap_or(&self.blob.name);
        match Path::new(&self.blob.attribution).parent() {
            Some(dir) if !dir.as_os_str().is_empty() => {
                format!("{}/{}.h", dir.to_string_lossy().replace('\\', "/"), stem)
            }
            _ => format!("{}.h", stem),
        }
    }

    fn wrap_header(&self, includes: &Includes, body: String) -> String {
        let mut guarded = includes.to_fragments();
        guarded.push(CodeFragment::blank());
        guarded.extend(Namespace::new(NAMESPACE, lines(body.trim_end())).to_fragments());

        let mut out = CodeBuilder::cpp();
        out.push_comment(&banner(&self.blob.attribution));
        out.push_blank();
        out.emit(&HeaderGuard::new(&self.blob.name, guarded));
        out.build()
    }

    fn wrap_source(&self, includes: &Includes, body: String) -> String {
        let mut out = CodeBuilder::cpp();
        out.push_comment(&banner(&self.blob.attribution));
        out.push_blank();
        out.emit(includes);
        out.push_blank();
        out.emit(&Namespace::new(NAMESPACE, lines(body.trim_end())));
        out.build()
    }

    /// Own members followed by those of every mixin in heritage order.
    fn members(&self, interface: &'a Interface) -> Members<'a> {
        let mut members = Members {
            properties: interface.properties.iter().collect(),
            methods: interface.methods.iter().collect(),
        };
        for name in &interface.mixins {
            match self.types.collections().mixin(name) {
                Some(mixin) => {
                    members.properties.extend(mixin.properties.iter());
                    members.methods.extend(mixin.methods.iter());
                }
                None => tracing::warn!(
                    interface = %interface.name,
                    mixin = %name,
                    "mixin is not declared in any analyzed file"
                ),
            }
        }
        members
    }

    fn converter(&self, owner: &str, member: &str, ty: &TypeDescriptor) -> Result<String> {
        self.types
            .converter(ty)
            .map_err(|e| CodegenError::unmapped(owner, member, e))
    }

    fn interface(
        &self,
        header: &mut CodeBuilder,
        source: &mut CodeBuilder,
        interface: &'a Interface,
        with_globals: bool,
    ) -> Result<()> {
        let owner = interface.name.as_str();
        let class = format!("{}{}", CLASS_PREFIX, owner);
        let members = self.members(interface);
        let has_statics = members.methods.iter().any(|m| m.return_mode.is_static)
            || members.properties.iter().any(|p| p.mode.is_static);

        // Source: callbacks first so the install tables can reference them.
        for property in &members.properties {
            self.property_callbacks(source, owner, property)?;
        }
        for group in overload_groups(&members.methods) {
            self.method_callback(source, owner, &group)?;
        }
        if with_globals {
            self.global_callbacks(source)?;
        }
        if let Some(indexed) = &interface.indexed {
            self.indexed_callbacks(source, owner, &class, indexed)?;
        }
        self.constructor_callback(source, owner, &class, interface)?;
        self.wrapper_type_info(source, owner, &class, interface);
        self.installers(source, owner, &class, &members, has_statics, with_globals);

        // Header
        header.push_line(&format!(
            "class {class} : public QJSInterfaceBridge<{class}, {owner}> {{"
        ));
        header.push_line(" public:");
        header.push_indent();
        header.push_line("static void Install(ExecutingContext* context);");
        header.push_block("static WrapperTypeInfo* GetWrapperTypeInfo() {", "}", |b| {
            b.push_line("return const_cast<WrapperTypeInfo*>(&wrapper_type_info_);");
        });
        header.push_line(
            "static JSValue ConstructorCallback(JSContext* ctx, JSValue func_obj, JSValue this_val, int argc, JSValue* argv, int flags);",
        );
        header.push_line("static const WrapperTypeInfo wrapper_type_info_;");
        if let Some(indexed) = &interface.indexed {
            header.push_blank();
            for decl in indexed_declarations(indexed) {
                header.push_line(&decl);
            }
        }
        header.push_dedent();
        header.push_blank();
        header.push_line(" private:");
        header.push_indent();
        header.push_line("static void InstallConstructor(ExecutingContext* context);");
        header.push_line("static void InstallPrototypeMethods(ExecutingContext* context);");
        header.push_line("static void InstallPrototypeProperties(ExecutingContext* context);");
        if has_statics {
            header.push_line("static void InstallStaticMembers(ExecutingContext* context);");
        }
        if with_globals {
            header.push_line("static void InstallGlobalFunctions(ExecutingContext* context);");
        }
        header.push_dedent();
        header.push_line("};");
        header.push_blank();
        Ok(())
    }

    fn property_callbacks(
        &self,
        b: &mut CodeBuilder,
        owner: &str,
        property: &Property,
    ) -> Result<()> {
        let name = &property.name;
        let converter = self.converter(owner, name, &property.ty)?;
        let native_value = if property.mode.native_impl {
            Some(
                self.types
                    .native_value(&property.ty)
                    .map_err(|e| CodegenError::unmapped(owner, name, e))?,
            )
        } else {
            None
        };
        let target = property.mode.secondary_name.as_deref().unwrap_or(name);

        b.push_block(
            &format!(
                "static JSValue {}AttributeGetCallback(JSContext* ctx, JSValueConst this_val, int argc, JSValueConst* argv) {{",
                name
            ),
            "}",
            |b| {
                if property.mode.is_static {
                    b.push_line("ExecutingContext* context = ExecutingContext::From(ctx);");
                    b.push_line(&format!(
                        "return Converter<{converter}>::ToValue(ctx, {owner}::{target}(context));"
                    ));
                    return;
                }
                push_self(b, owner, "this_val");
                match &native_value {
                    Some(native) => {
                        b.push_line("ExceptionState exception_state;");
                        b.push_line(&format!(
                            "auto&& native_value = self->GetBindingProperty(binding_call_methods::k{}, {}, exception_state);",
                            name,
                            flush_reason(&property.mode)
                        ));
                        push_exception_check(b);
                        b.push_line(&format!(
                            "return Converter<{converter}>::ToValue(ctx, NativeValueConverter<{native}>::FromNativeValue(native_value));"
                        ));
                    }
                    None => {
                        b.push_line(&format!(
                            "return Converter<{converter}>::ToValue(ctx, self->{target}());"
                        ));
                    }
                }
            },
        );
        b.push_blank();

        if property.readonly {
            return Ok(());
        }

        b.push_block(
            &format!(
                "static JSValue {}AttributeSetCallback(JSContext* ctx, JSValueConst this_val, int argc, JSValueConst* argv) {{",
                name
            ),
            "}",
            |b| {
                b.push_line("ExceptionState exception_state;");
                b.push_line(&format!(
                    "auto&& v = Converter<{converter}>::FromValue(ctx, argv[0], exception_state);"
                ));
                push_exception_check(b);
                if property.mode.is_static {
                    b.push_line("ExecutingContext* context = ExecutingContext::From(ctx);");
                    b.push_line(&format!(
                        "{owner}::set{}(context, v, exception_state);",
                        to_pascal_case(target)
                    ));
                } else {
                    push_self(b, owner, "this_val");
                    match &native_value {
                        Some(native) => {
                            let ctx_arg = if is_string(&property.ty) { "ctx, " } else { "" };
                            b.push_line(&format!(
                                "self->SetBindingProperty(binding_call_methods::k{name}, NativeValueConverter<{native}>::ToNativeValue({ctx_arg}v), exception_state);"
                            ));
                        }
                        None => {
                            b.push_line(&format!(
                                "self->set{}(v, exception_state);",
                                to_pascal_case(target)
                            ));
                        }
                    }
                }
                push_exception_check(b);
                b.push_line("return JS_DupValue(ctx, argv[0]);");
            },
        );
        b.push_blank();
        Ok(())
    }

    /// One callback per method name; overloads dispatch on `argc`.
    fn method_callback(&self, b: &mut CodeBuilder, owner: &str, group: &[&Method]) -> Result<()> {
        let Some(first) = group.first() else {
            return Ok(());
        };
        let kind = if first.return_mode.is_static {
            CallKind::Static
        } else {
            CallKind::Instance
        };

        if group.len() == 1 {
            let body = self.function_body(owner, first, kind)?;
            push_function(b, &format!("qjs_{}", first.name), &body);
            return Ok(());
        }

        for (i, method) in group.iter().enumerate() {
            let body = self.function_body(owner, method, kind)?;
            push_function(b, &format!("{}_overload_{}", method.name, i), &body);
        }
        let mut dispatch = CodeBuilder::cpp();
        for (i, method) in group.iter().enumerate().skip(1) {
            dispatch.push_block(
                &format!("if ({} == argc) {{", method.args.len()),
                "}",
                |d| {
                    d.push_line(&format!(
                        "return {}_overload_{}(ctx, this_val, argc, argv);",
                        method.name, i
                    ));
                },
            );
            dispatch.push_blank();
        }
        dispatch.push_line(&format!(
            "return {}_overload_0(ctx, this_val, argc, argv);",
            first.name
        ));
        push_function(b, &format!("qjs_{}", first.name), &dispatch.build());
        Ok(())
    }

    fn global_callbacks(&self, b: &mut CodeBuilder) -> Result<()> {
        let owner = self.blob.class_name();
        for function in self.blob.functions() {
            let body = self.function_body(&owner, function, CallKind::Global)?;
            push_function(b, &format!("qjs_{}", function.name), &body);
        }
        Ok(())
    }

    /// Standalone installer for files that declare only global functions.
    fn global_installer(
        &self,
        header: &mut CodeBuilder,
        source: &mut CodeBuilder,
        owner: &str,
    ) -> Result<()> {
        let class = format!("{}{}", CLASS_PREFIX, owner);
        self.global_callbacks(source)?;

        source.push_block(
            &format!("void {class}::Install(ExecutingContext* context) {{"),
            "}",
            |b| {
                b.push_line("InstallGlobalFunctions(context);");
            },
        );
        source.push_blank();
        self.install_globals(source, &class);

        header.push_line(&format!("class {class} final {{"));
        header.push_line(" public:");
        header.push_line("  static void Install(ExecutingContext* context);");
        header.push_blank();
        header.push_line(" private:");
        header.push_line("  static void InstallGlobalFunctions(ExecutingContext* context);");
        header.push_line("};");
        header.push_blank();
        Ok(())
    }

    fn install_globals(&self, b: &mut CodeBuilder, class: &str) {
        let entries: Vec<String> = self
            .blob
            .functions()
            .map(|f| function_entry(&f.name, f.args.len()))
            .collect();
        b.push_block(
            &format!("void {class}::InstallGlobalFunctions(ExecutingContext* context) {{"),
            "}",
            |b| {
                b.emit(&ConfigTable::new(
                    "MemberInstaller::FunctionConfig",
                    "functionConfig",
                    entries,
                ));
                b.push_line(
                    "MemberInstaller::InstallFunctions(context, context->Global(), functionConfig);",
                );
            },
        );
        b.push_blank();
    }

    fn constructor_callback(
        &self,
        b: &mut CodeBuilder,
        owner: &str,
        class: &str,
        interface: &Interface,
    ) -> Result<()> {
        let body = match &interface.constructor {
            Some(constructor) => self.function_body(owner, constructor, CallKind::Constructor)?,
            None => ILLEGAL_CONSTRUCTOR.to_string(),
        };
        b.push_block(
            &format!(
                "JSValue {class}::ConstructorCallback(JSContext* ctx, JSValue func_obj, JSValue this_val, int argc, JSValue* argv, int flags) {{"
            ),
            "}",
            |b| {
                b.push_lines(&body);
            },
        );
        b.push_blank();
        Ok(())
    }

    fn indexed_callbacks(
        &self,
        b: &mut CodeBuilder,
        owner: &str,
        class: &str,
        indexed: &IndexedProperty,
    ) -> Result<()> {
        let converter = self.converter(owner, "[index]", &indexed.ty)?;
        let (key_param, key_value, getter, setter) = match indexed.key {
            IndexKey::Number => (
                "uint32_t index",
                "index",
                "IndexedPropertyGetterCallback",
                "IndexedPropertySetterCallback",
            ),
            IndexKey::String => (
                "JSAtom key",
                "AtomicString(ctx, key)",
                "StringPropertyGetterCallback",
                "StringPropertySetterCallback",
            ),
        };

        b.push_block(
            &format!("JSValue {class}::{getter}(JSContext* ctx, JSValue obj, {key_param}) {{"),
            "}",
            |b| {
                b.push_line("ExceptionState exception_state;");
                b.push_line("MemberMutationScope scope{ExecutingContext::From(ctx)};");
                b.push_line(&format!("auto* self = toScriptWrappable<{owner}>(obj);"));
                b.push_line(&format!(
                    "auto&& result = self->item({key_value}, exception_state);"
                ));
                push_exception_check(b);
                b.push_line(&format!("return Converter<{converter}>::ToValue(ctx, result);"));
            },
        );
        b.push_blank();

        if !indexed.readonly {
            b.push_block(
                &format!(
                    "bool {class}::{setter}(JSContext* ctx, JSValueConst obj, {key_param}, JSValueConst value) {{"
                ),
                "}",
                |b| {
                    b.push_line("ExceptionState exception_state;");
                    b.push_line("MemberMutationScope scope{ExecutingContext::From(ctx)};");
                    b.push_line(&format!("auto* self = toScriptWrappable<{owner}>(obj);"));
                    b.push_line(&format!(
                        "auto&& v = Converter<{converter}>::FromValue(ctx, value, exception_state);"
                    ));
                    b.push_block("if (UNLIKELY(exception_state.HasException())) {", "}", |b| {
                        b.push_line("return false;");
                    });
                    b.push_line(&format!(
                        "self->SetItem({key_value}, v, exception_state);"
                    ));
                    b.push_line("return !exception_state.HasException();");
                },
            );
            b.push_blank();
        }

        b.push_block(
            &format!(
                "bool {class}::PropertyCheckerCallback(JSContext* ctx, JSValueConst obj, JSAtom key) {{"
            ),
            "}",
            |b| {
                b.push_line("ExceptionState exception_state;");
                b.push_line(&format!("auto* self = toScriptWrappable<{owner}>(obj);"));
                b.push_line("return self->NamedPropertyQuery(AtomicString(ctx, key), exception_state);");
            },
        );
        b.push_blank();

        b.push_block(
            &format!(
                "int {class}::PropertyEnumerateCallback(JSContext* ctx, JSPropertyEnum** ptab, uint32_t* plen, JSValueConst obj) {{"
            ),
            "}",
            |b| {
                b.push_line(&format!("auto* self = toScriptWrappable<{owner}>(obj);"));
                b.push_line("std::vector<AtomicString> props;");
                b.push_line("self->NamedPropertyEnumerator(props, ASSERT_NO_EXCEPTION());");
                b.push_line("auto size = props.size() == 0 ? 1 : props.size();");
                b.push_line("auto tabs = (JSPropertyEnum*)js_malloc(ctx, sizeof(JSValue) * size);");
                b.push_block("for (int i = 0; i < props.size(); i++) {", "}", |b| {
                    b.push_line("tabs[i].atom = JS_DupAtom(ctx, props[i].Impl());");
                    b.push_line("tabs[i].is_enumerable = true;");
                });
                b.push_line("*plen = props.size();");
                b.push_line("*ptab = tabs;");
                b.push_line("return 0;");
            },
        );
        b.push_blank();

        if !indexed.readonly {
            b.push_block(
                &format!(
                    "bool {class}::StringPropertyDeleterCallback(JSContext* ctx, JSValueConst obj, JSAtom key) {{"
                ),
                "}",
                |b| {
                    b.push_line("ExceptionState exception_state;");
                    b.push_line(&format!("auto* self = toScriptWrappable<{owner}>(obj);"));
                    b.push_line("return self->DeleteItem(AtomicString(ctx, key), exception_state);");
                },
            );
            b.push_blank();
        }
        Ok(())
    }

    fn wrapper_type_info(
        &self,
        b: &mut CodeBuilder,
        owner: &str,
        class: &str,
        interface: &Interface,
    ) {
        let mut fields = vec![
            format!("JS_CLASS_{}", to_snake_case(owner).to_uppercase()),
            format!("\"{}\"", owner),
            match &interface.parent {
                Some(parent) => format!("{}::GetStaticWrapperTypeInfo()", parent),
                None => "nullptr".to_string(),
            },
            format!("{class}::ConstructorCallback"),
        ];
        if let Some(indexed) = &interface.indexed {
            let qualified = |name: &str| format!("{class}::{name}");
            let setter_or_null = |name: &str| {
                if indexed.readonly {
                    "nullptr".to_string()
                } else {
                    qualified(name)
                }
            };
            match indexed.key {
                IndexKey::Number => fields.extend([
                    qualified("IndexedPropertyGetterCallback"),
                    setter_or_null("IndexedPropertySetterCallback"),
                    "nullptr".to_string(),
                    "nullptr".to_string(),
                ]),
                IndexKey::String => fields.extend([
                    "nullptr".to_string(),
                    "nullptr".to_string(),
                    qualified("StringPropertyGetterCallback"),
                    setter_or_null("StringPropertySetterCallback"),
                ]),
            }
            fields.extend([
                qualified("PropertyCheckerCallback"),
                qualified("PropertyEnumerateCallback"),
                setter_or_null("StringPropertyDeleterCallback"),
            ]);
        }

        b.push_line(&format!(
            "const WrapperTypeInfo {class}::wrapper_type_info_{{{}}};",
            fields.join(", ")
        ));
        b.push_line(&format!(
            "const WrapperTypeInfo& {owner}::wrapper_type_info_ = {class}::wrapper_type_info_;"
        ));
        b.push_blank();
    }

    fn installers(
        &self,
        b: &mut CodeBuilder,
        owner: &str,
        class: &str,
        members: &Members<'_>,
        has_statics: bool,
        with_globals: bool,
    ) {
        let (static_props, props): (Vec<&Property>, Vec<&Property>) =
            members.properties.iter().copied().partition(|p| p.mode.is_static);
        let mut seen = Vec::new();
        let mut methods = Vec::new();
        let mut static_methods = Vec::new();
        for method in &members.methods {
            if seen.contains(&method.name.as_str()) {
                continue;
            }
            seen.push(method.name.as_str());
            let entry = function_entry(&method.name, method.args.len());
            if method.return_mode.is_static {
                static_methods.push(entry);
            } else {
                methods.push(entry);
            }
        }

        b.push_block(
            &format!("void {class}::Install(ExecutingContext* context) {{"),
            "}",
            |b| {
                b.push_line("InstallConstructor(context);");
                b.push_line("InstallPrototypeMethods(context);");
                b.push_line("InstallPrototypeProperties(context);");
                if has_statics {
                    b.push_line("InstallStaticMembers(context);");
                }
                if with_globals {
                    b.push_line("InstallGlobalFunctions(context);");
                }
            },
        );
        b.push_blank();

        b.push_block(
            &format!("void {class}::InstallConstructor(ExecutingContext* context) {{"),
            "}",
            |b| {
                b.push_line("const WrapperTypeInfo* wrapper_type_info = GetWrapperTypeInfo();");
                b.push_line(
                    "JSValue constructor = context->contextData()->constructorForType(wrapper_type_info);",
                );
                b.emit(&ConfigTable::new(
                    "MemberInstaller::AttributeConfig",
                    "attributeConfig",
                    vec![format!(
                        "{{defined_properties::k{owner}.Impl(), nullptr, nullptr, constructor}}"
                    )],
                ));
                b.push_line(
                    "MemberInstaller::InstallAttributes(context, context->Global(), attributeConfig);",
                );
            },
        );
        b.push_blank();

        b.push_block(
            &format!("void {class}::InstallPrototypeMethods(ExecutingContext* context) {{"),
            "}",
            |b| {
                b.push_line("const WrapperTypeInfo* wrapper_type_info = GetWrapperTypeInfo();");
                b.push_line(
                    "JSValue prototype = context->contextData()->prototypeForType(wrapper_type_info);",
                );
                b.emit(&ConfigTable::new(
                    "MemberInstaller::FunctionConfig",
                    "functionConfig",
                    methods,
                ));
                b.push_line("MemberInstaller::InstallFunctions(context, prototype, functionConfig);");
            },
        );
        b.push_blank();

        b.push_block(
            &format!("void {class}::InstallPrototypeProperties(ExecutingContext* context) {{"),
            "}",
            |b| {
                b.push_line("const WrapperTypeInfo* wrapper_type_info = GetWrapperTypeInfo();");
                b.push_line(
                    "JSValue prototype = context->contextData()->prototypeForType(wrapper_type_info);",
                );
                b.emit(&ConfigTable::new(
                    "MemberInstaller::AttributeConfig",
                    "attributesConfig",
                    props.iter().map(|p| attribute_entry(p)).collect(),
                ));
                b.push_line(
                    "MemberInstaller::InstallAttributes(context, prototype, attributesConfig);",
                );
            },
        );
        b.push_blank();

        if has_statics {
            b.push_block(
                &format!("void {class}::InstallStaticMembers(ExecutingContext* context) {{"),
                "}",
                |b| {
                    b.push_line("const WrapperTypeInfo* wrapper_type_info = GetWrapperTypeInfo();");
                    b.push_line(
                        "JSValue constructor = context->contextData()->constructorForType(wrapper_type_info);",
                    );
                    b.emit(&ConfigTable::new(
                        "MemberInstaller::FunctionConfig",
                        "functionConfig",
                        static_methods,
                    ));
                    b.push_line(
                        "MemberInstaller::InstallFunctions(context, constructor, functionConfig);",
                    );
                    b.emit(&ConfigTable::new(
                        "MemberInstaller::AttributeConfig",
                        "attributesConfig",
                        static_props.iter().map(|p| attribute_entry(p)).collect(),
                    ));
                    b.push_line(
                        "MemberInstaller::InstallAttributes(context, constructor, attributesConfig);",
                    );
                },
            );
            b.push_blank();
        }

        if with_globals {
            self.install_globals(b, class);
        }
    }

    /// Body shared by methods, constructors and global functions.
    ///
    /// Required arguments are converted up front; each optional argument is
    /// converted only when present, with the call made as soon as `argc` is
    /// exhausted.
    fn function_body(&self, owner: &str, method: &Method, kind: CallKind) -> Result<String> {
        if kind == CallKind::Constructor && method.return_type.is_void() {
            return Ok(ILLEGAL_CONSTRUCTOR.to_string());
        }

        let required = method.required_args();
        let first_variadic = method.args.first().is_some_and(|a| a.variadic);
        let converters = method
            .args
            .iter()
            .map(|arg| {
                let member = format!("{}({})", method.name, arg.name);
                let converted = if arg.required {
                    self.types.converter(&arg.ty)
                } else {
                    self.types.optional_converter(&arg.ty)
                };
                converted.map_err(|e| CodegenError::unmapped(owner, &member, e))
            })
            .collect::<Result<Vec<_>>>()?;
        let calls = (required..=method.args.len())
            .map(|count| self.call(owner, method, kind, count))
            .collect::<Result<Vec<_>>>()?;
        let return_value = self.return_value(owner, method, kind)?;

        let mut builder = CodeBuilder::cpp();
        let b = &mut builder;
        if required > 0 && !first_variadic {
            b.push_block(&format!("if (argc < {}) {{", required), "}", |b| {
                b.push_line(&format!(
                    "return JS_ThrowTypeError(ctx, \"Failed to execute '{}' : {} argument required, but %d present.\", argc);",
                    method.name, required
                ));
            });
            b.push_blank();
        }

        b.push_line("ExceptionState exception_state;");
        b.push_line("ExecutingContext* context = ExecutingContext::From(ctx);");
        b.push_line("if (!context->IsContextValid()) return JS_NULL;");
        b.push_line("MemberMutationScope scope{context};");
        if let Some((declaration, _)) = &return_value {
            b.push_line(declaration);
        }
        b.push_blank();

        b.push_line("do {  // Dummy loop for use of 'break'.");
        b.push_indent();
        for (index, arg) in method.args.iter().enumerate().take(required) {
            push_argument(b, &arg.name, index, &converters[index], arg.variadic);
        }

        let optional = method.args.len() - required;
        if optional == 0 {
            b.push_lines(&calls[0]);
        } else {
            b.push_block(&format!("if (argc <= {}) {{", required), "}", |b| {
                b.push_lines(&calls[0]);
                b.push_line("break;");
            });
            for index in required..method.args.len() {
                let arg = &method.args[index];
                let call = &calls[index - required + 1];
                b.push_blank();
                push_argument(b, &arg.name, index, &converters[index], arg.variadic);
                if index + 1 == method.args.len() {
                    b.push_lines(call);
                } else {
                    b.push_block(&format!("if (argc <= {}) {{", index + 1), "}", |b| {
                        b.push_lines(call);
                        b.push_line("break;");
                    });
                }
            }
        }
        b.push_dedent();
        b.push_line("} while (false);");
        b.push_blank();

        push_exception_check(b);
        match &return_value {
            None => b.push_line("return JS_NULL;"),
            Some((_, result)) => {
                if kind == CallKind::Constructor {
                    b.push_line("JSValue prototype = JS_GetPropertyStr(ctx, this_val, \"prototype\");");
                    b.push_line("JS_SetPrototype(ctx, return_value->ToQuickJSUnsafe(), prototype);");
                    b.push_line("JS_FreeValue(ctx, prototype);");
                }
                b.push_line(&format!("return {};", result))
            }
        };
        Ok(builder.build())
    }

    /// Declaration of `return_value` and the expression returned to script.
    fn return_value(
        &self,
        owner: &str,
        method: &Method,
        kind: CallKind,
    ) -> Result<Option<(String, String)>> {
        let ty = &method.return_type;
        if ty.is_void() {
            return Ok(None);
        }
        if kind == CallKind::Constructor {
            return Ok(Some((
                format!("{owner}* return_value = nullptr;"),
                "return_value->ToQuickJS()".to_string(),
            )));
        }

        let converter = self.converter(owner, &method.name, ty)?;
        let declaration = match &ty.kind {
            TypeKind::Union(_) | TypeKind::Pointer(_) => {
                let native = self
                    .types
                    .native(ty)
                    .map_err(|e| CodegenError::unmapped(owner, &method.name, e))?;
                format!("{native} return_value = nullptr;")
            }
            TypeKind::Primitive(_) | TypeKind::Dictionary(_) | TypeKind::Sequence(_) => {
                format!("typename Converter<{converter}>::ImplType return_value;")
            }
        };
        Ok(Some((
            declaration,
            format!("Converter<{converter}>::ToValue(ctx, std::move(return_value))"),
        )))
    }

    /// The statement(s) invoking the implementation with the first `count`
    /// arguments.
    fn call(&self, owner: &str, method: &Method, kind: CallKind, count: usize) -> Result<String> {
        let args: Vec<String> = method.args[..count]
            .iter()
            .map(|a| format!("args_{}", a.name))
            .collect();
        let assign = if method.return_type.is_void() {
            ""
        } else {
            "return_value = "
        };
        let target = method
            .return_mode
            .secondary_name
            .as_deref()
            .unwrap_or(&method.name);

        let with_context = |mut list: Vec<String>| {
            list.insert(0, "context".to_string());
            list.push("exception_state".to_string());
            list.join(", ")
        };

        Ok(match kind {
            CallKind::Constructor => format!("{assign}{owner}::Create({});", with_context(args)),
            CallKind::Static | CallKind::Global => {
                format!("{assign}{owner}::{target}({});", with_context(args))
            }
            CallKind::Instance if method.return_mode.native_impl => {
                self.native_call(owner, method, &method.args[..count])?
            }
            CallKind::Instance => {
                let mut list = args;
                list.push("exception_state".to_string());
                format!(
                    "auto* self = toScriptWrappable<{owner}>(JS_IsUndefined(this_val) ? context->Global() : this_val);\n{assign}self->{target}({});",
                    list.join(", ")
                )
            }
        })
    }

    /// Forward a call to the native side through `InvokeBindingMethod`.
    fn native_call(
        &self,
        owner: &str,
        method: &Method,
        args: &[Argument],
    ) -> Result<String> {
        let mut b = CodeBuilder::cpp();
        b.push_line(&format!(
            "auto* self = toScriptWrappable<{owner}>(JS_IsUndefined(this_val) ? context->Global() : this_val);"
        ));
        if args.is_empty() {
            b.push_line("NativeValue* arguments = nullptr;");
        } else {
            b.push_line("NativeValue arguments[] = {");
            b.push_indent();
            for arg in args {
                let member = format!("{}({})", method.name, arg.name);
                let native = self
                    .types
                    .native_value(&arg.ty)
                    .map_err(|e| CodegenError::unmapped(owner, &member, e))?;
                let ctx_arg = if is_string(&arg.ty) { "ctx, " } else { "" };
                b.push_line(&format!(
                    "NativeValueConverter<{native}>::ToNativeValue({ctx_arg}args_{}),",
                    arg.name
                ));
            }
            b.push_dedent();
            b.push_line("};");
        }

        let invoke = format!(
            "self->InvokeBindingMethod(binding_call_methods::k{}, {}, arguments, {}, exception_state);",
            method.name,
            args.len(),
            flush_reason(&method.return_mode)
        );
        if method.return_type.is_void() {
            b.push_line(&invoke);
        } else {
            let native = self
                .types
                .native_value(&method.return_type)
                .map_err(|e| CodegenError::unmapped(owner, &method.name, e))?;
            b.push_line(&format!("auto&& native_value = {invoke}"));
            b.push_line(&format!(
                "return_value = NativeValueConverter<{native}>::FromNativeValue(native_value);"
            ));
        }
        Ok(b.build())
    }

    fn dictionary(
        &self,
        header: &mut CodeBuilder,
        source: &mut CodeBuilder,
        dictionary: &Interface,
    ) -> Result<()> {
        let name = dictionary.name.as_str();
        let base = dictionary.parent.as_deref().unwrap_or("DictionaryBase");

        struct Field<'f> {
            property: &'f Property,
            converter: String,
            native: String,
            storage: Storage,
        }
        let fields = dictionary
            .properties
            .iter()
            .map(|property| {
                let unmapped = |e| CodegenError::unmapped(name, &property.name, e);
                Ok(Field {
                    property,
                    converter: self.types.converter(&property.ty).map_err(unmapped)?,
                    native: self.types.native(&property.ty).map_err(unmapped)?,
                    storage: TypeMapper::storage(&property.ty),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        for field in &fields {
            if let TypeKind::Dictionary(other) | TypeKind::Pointer(other) = &field.property.ty.kind
            {
                header.push_line(&format!("class {};", other));
            }
        }

        header.push_line(&format!("class {name} : public {base} {{"));
        header.push_line(" public:");
        header.push_indent();
        header.push_block(&format!("static std::shared_ptr<{name}> Create() {{"), "}", |b| {
            b.push_line(&format!("return std::make_shared<{name}>();"));
        });
        header.push_block(
            &format!(
                "static std::shared_ptr<{name}> Create(JSContext* ctx, JSValue value, ExceptionState& exception_state) {{"
            ),
            "}",
            |b| {
                b.push_line(&format!(
                    "return std::make_shared<{name}>(ctx, value, exception_state);"
                ));
            },
        );
        header.push_line(&format!("explicit {name}();"));
        header.push_line(&format!(
            "explicit {name}(JSContext* ctx, JSValue value, ExceptionState& exception_state);"
        ));
        for field in &fields {
            let member = &field.property.name;
            let snake = to_snake_case(member);
            let param = match field.storage {
                Storage::Scalar | Storage::Pointer => field.native.clone(),
                Storage::Value => format!("const {}&", field.native),
            };
            header.push_blank();
            header.push_line(&format!("{param} {member}() const {{ return {snake}_; }}"));
            header.push_line(&format!(
                "bool has{}() const {{ return has_{snake}_; }}",
                to_pascal_case(member)
            ));
            header.push_block(
                &format!("void set{}({param} value) {{", to_pascal_case(member)),
                "}",
                |b| {
                    b.push_line(&format!("{snake}_ = value;"));
                    b.push_line(&format!("has_{snake}_ = true;"));
                },
            );
        }
        header.push_blank();
        header.push_line(
            "bool FillQJSObjectWithMembers(JSContext* ctx, JSValue qjs_dictionary) const override;",
        );
        header.push_line(
            "void FillMembersWithQJSObject(JSContext* ctx, JSValue value, ExceptionState& exception_state);",
        );
        header.push_dedent();
        header.push_blank();
        header.push_line(" protected:");
        header.push_indent();
        for field in &fields {
            let snake = to_snake_case(&field.property.name);
            let init = match (&field.property.ty.kind, field.storage) {
                (TypeKind::Primitive(Primitive::Boolean), _) => "{false}",
                (_, Storage::Scalar) => "{0}",
                (_, Storage::Pointer) => "{nullptr}",
                (_, Storage::Value) => "",
            };
            header.push_line(&format!("{} {snake}_{init};", field.native));
            header.push_line(&format!("bool has_{snake}_{{false}};"));
        }
        header.push_dedent();
        header.push_line("};");
        header.push_blank();

        source.push_line(&format!("{name}::{name}() {{}}"));
        source.push_blank();
        source.push_block(
            &format!(
                "{name}::{name}(JSContext* ctx, JSValue value, ExceptionState& exception_state) {{"
            ),
            "}",
            |b| {
                b.push_line("FillMembersWithQJSObject(ctx, value, exception_state);");
            },
        );
        source.push_blank();

        source.push_block(
            &format!(
                "bool {name}::FillQJSObjectWithMembers(JSContext* ctx, JSValue qjs_dictionary) const {{"
            ),
            "}",
            |b| {
                b.push_block("if (!JS_IsObject(qjs_dictionary)) {", "}", |b| {
                    b.push_line("return false;");
                });
                if let Some(parent) = &dictionary.parent {
                    b.push_line(&format!(
                        "{parent}::FillQJSObjectWithMembers(ctx, qjs_dictionary);"
                    ));
                }
                for field in &fields {
                    let member = &field.property.name;
                    let snake = to_snake_case(member);
                    b.push_block(&format!("if (has_{snake}_) {{"), "}", |b| {
                        b.push_line(&format!(
                            "JS_SetPropertyStr(ctx, qjs_dictionary, \"{member}\", Converter<{}>::ToValue(ctx, {snake}_));",
                            field.converter
                        ));
                    });
                }
                b.push_line("return true;");
            },
        );
        source.push_blank();

        source.push_block(
            &format!(
                "void {name}::FillMembersWithQJSObject(JSContext* ctx, JSValue value, ExceptionState& exception_state) {{"
            ),
            "}",
            |b| {
                b.push_block("if (!JS_IsObject(value)) {", "}", |b| {
                    b.push_line("return;");
                });
                if let Some(parent) = &dictionary.parent {
                    b.push_line(&format!(
                        "{parent}::FillMembersWithQJSObject(ctx, value, exception_state);"
                    ));
                }
                for field in &fields {
                    let member = &field.property.name;
                    let snake = to_snake_case(member);
                    b.push_blank();
                    b.push_line(&format!(
                        "JSValue {snake} = JS_GetPropertyStr(ctx, value, \"{member}\");"
                    ));
                    if !field.property.optional {
                        b.push_block(&format!("if (JS_IsUndefined({snake})) {{"), "}", |b| {
                            b.push_line(&format!(
                                "exception_state.ThrowException(ctx, ErrorType::TypeError, \"Failed to read the '{member}' property from '{name}': Required member is undefined.\");"
                            ));
                            b.push_line("return;");
                        });
                    }
                    b.push_block(&format!("if (!JS_IsUndefined({snake})) {{"), "}", |b| {
                        b.push_line(&format!(
                            "{snake}_ = Converter<{}>::FromValue(ctx, {snake}, exception_state);",
                            field.converter
                        ));
                        b.push_line(&format!("has_{snake}_ = true;"));
                    });
                    b.push_line(&format!("JS_FreeValue(ctx, {snake});"));
                }
            },
        );
        source.push_blank();
        Ok(())
    }
}

/// Group methods by name, keeping first-declaration order.
fn overload_groups<'m>(methods: &[&'m Method]) -> Vec<Vec<&'m Method>> {
    let mut groups: Vec<Vec<&'m Method>> = Vec::new();
    for &method in methods {
        match groups.iter_mut().find(|g| g[0].name == method.name) {
            Some(group) => group.push(method),
            None => groups.push(vec![method]),
        }
    }
    groups
}

fn push_function(b: &mut CodeBuilder, name: &str, body: &str) {
    b.push_block(
        &format!(
            "static JSValue {name}(JSContext* ctx, JSValueConst this_val, int argc, JSValueConst* argv) {{"
        ),
        "}",
        |b| {
            b.push_lines(body);
        },
    );
    b.push_blank();
}

fn push_self(b: &mut CodeBuilder, owner: &str, value: &str) {
    b.push_line(&format!("auto* self = toScriptWrappable<{owner}>({value});"));
    b.push_line("assert(self != nullptr);");
    b.push_line("if (!self->GetExecutingContext()->IsContextValid()) return JS_NULL;");
    b.push_line("MemberMutationScope scope{self->GetExecutingContext()};");
}

fn push_exception_check(b: &mut CodeBuilder) {
    b.push_block("if (UNLIKELY(exception_state.HasException())) {", "}", |b| {
        b.push_line("return exception_state.ToQuickJS();");
    });
}

fn push_argument(b: &mut CodeBuilder, name: &str, index: usize, converter: &str, variadic: bool) {
    let value = if variadic {
        format!("Converter<{converter}>::FromValue(ctx, argv + {index}, argc - {index}, exception_state)")
    } else {
        format!("Converter<{converter}>::FromValue(ctx, argv[{index}], exception_state)")
    };
    b.push_line(&format!("auto&& args_{name} = {value};"));
    push_exception_check(b);
}

fn flush_reason(mode: &TypeMode) -> &'static str {
    if mode.layout_dependent {
        "FlushUICommandReason::kDependentsOnElement | FlushUICommandReason::kDependentsOnLayout"
    } else {
        "FlushUICommandReason::kDependentsOnElement"
    }
}

fn is_string(ty: &TypeDescriptor) -> bool {
    ty.as_primitive().is_some_and(Primitive::is_string)
}

fn function_entry(name: &str, argc: usize) -> String {
    format!("{{\"{name}\", qjs_{name}, {argc}}}")
}

fn attribute_entry(property: &Property) -> String {
    let key = if property.is_symbol {
        format!("JS_ATOM_{}", property.name)
    } else {
        format!("defined_properties::k{}.Impl()", property.name)
    };
    let setter = if property.readonly {
        "nullptr".to_string()
    } else {
        format!("{}AttributeSetCallback", property.name)
    };
    format!("{{{key}, {}AttributeGetCallback, {setter}}}", property.name)
}

fn indexed_declarations(indexed: &IndexedProperty) -> Vec<String> {
    let mut out = Vec::new();
    match indexed.key {
        IndexKey::Number => {
            out.push(
                "static JSValue IndexedPropertyGetterCallback(JSContext* ctx, JSValue obj, uint32_t index);"
                    .to_string(),
            );
            if !indexed.readonly {
                out.push(
                    "static bool IndexedPropertySetterCallback(JSContext* ctx, JSValueConst obj, uint32_t index, JSValueConst value);"
                        .to_string(),
                );
            }
        }
        IndexKey::String => {
            out.push(
                "static JSValue StringPropertyGetterCallback(JSContext* ctx, JSValue obj, JSAtom key);"
                    .to_string(),
            );
            if !indexed.readonly {
                out.push(
                    "static bool StringPropertySetterCallback(JSContext* ctx, JSValueConst obj, JSAtom key, JSValueConst value);"
                        .to_string(),
                );
            }
        }
    }
    out.push(
        "static bool PropertyCheckerCallback(JSContext* ctx, JSValueConst obj, JSAtom key);"
            .to_string(),
    );
    out.push(
        "static int PropertyEnumerateCallback(JSContext* ctx, JSPropertyEnum** ptab, uint32_t* plen, JSValueConst obj);"
            .to_string(),
    );
    if !indexed.readonly {
        out.push(
            "static bool StringPropertyDeleterCallback(JSContext* ctx, JSValueConst obj, JSAtom key);"
                .to_string(),
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use bridgegen_ir::{CollectionContext, Declaration, Normalized, UnionSignature};

    use super::*;

    fn blob(declarations: Vec<Declaration>) -> InterfaceBlob {
        let mut blob = InterfaceBlob::new(
            Path::new("/src/dom/node.d.ts"),
            Path::new("/src"),
            Path::new("/dist"),
            ".d.ts",
        );
        blob.declarations = declarations;
        blob
    }

    fn property(name: &str, ty: TypeDescriptor, readonly: bool) -> Property {
        Property {
            name: name.into(),
            ty,
            readonly,
            optional: false,
            is_symbol: false,
            mode: TypeMode::default(),
        }
    }

    fn argument(name: &str, ty: TypeDescriptor, required: bool) -> Argument {
        Argument {
            name: name.into(),
            ty,
            required,
            variadic: false,
            mode: TypeMode::default(),
        }
    }

    fn method(name: &str, args: Vec<Argument>, return_type: TypeDescriptor) -> Method {
        Method {
            name: name.into(),
            args,
            return_type,
            return_mode: TypeMode::default(),
        }
    }

    fn node() -> Interface {
        Interface {
            name: "Node".into(),
            parent: Some("EventTarget".into()),
            properties: vec![
                property("nodeType", TypeDescriptor::primitive(Primitive::Int32), true),
                property(
                    "textContent",
                    TypeDescriptor::primitive(Primitive::DomString).nullable(true),
                    false,
                ),
            ],
            methods: vec![method(
                "appendChild",
                vec![argument("child", TypeDescriptor::pointer("Node"), true)],
                TypeDescriptor::pointer("Node"),
            )],
            constructor: Some(method("constructor", vec![], TypeDescriptor::void())),
            ..Default::default()
        }
    }

    fn generate(blob: &InterfaceBlob, collections: &FinalizedCollections) -> GeneratedArtifact {
        InterfaceGenerator::new(blob, collections).generate().unwrap()
    }

    #[test]
    fn test_interface_layout() {
        let blob = blob(vec![Declaration::Interface(node())]);
        let collections = CollectionContext::new().finalize();
        let artifact = generate(&blob, &collections);

        assert_eq!(artifact.dir, PathBuf::from("/dist/dom"));
        assert_eq!(artifact.base_name, "qjs_node");
        assert!(artifact.header.starts_with("// Generated from dom/node.d.ts. Do not edit.\n"));
        assert!(
            artifact
                .header
                .contains("class QJSNode : public QJSInterfaceBridge<QJSNode, Node> {")
        );
        assert!(artifact.source.contains("#include \"dom/node.h\""));
        assert!(artifact.source.contains(
            "const WrapperTypeInfo QJSNode::wrapper_type_info_{JS_CLASS_NODE, \"Node\", EventTarget::GetStaticWrapperTypeInfo(), QJSNode::ConstructorCallback};"
        ));
        assert!(artifact.source.contains("return JS_ThrowTypeError(ctx, \"Illegal constructor\");"));
    }

    #[test]
    fn test_attribute_table() {
        let blob = blob(vec![Declaration::Interface(node())]);
        let collections = CollectionContext::new().finalize();
        let artifact = generate(&blob, &collections);

        assert!(artifact.source.contains(
            "{defined_properties::knodeType.Impl(), nodeTypeAttributeGetCallback, nullptr},"
        ));
        assert!(artifact.source.contains(
            "{defined_properties::ktextContent.Impl(), textContentAttributeGetCallback, textContentAttributeSetCallback},"
        ));
        assert!(!artifact.source.contains("nodeTypeAttributeSetCallback("));
        assert!(artifact.source.contains("self->setTextContent(v, exception_state);"));
        assert!(artifact.source.contains("{\"appendChild\", qjs_appendChild, 1},"));
    }

    #[test]
    fn test_method_body() {
        let blob = blob(vec![Declaration::Interface(node())]);
        let collections = CollectionContext::new().finalize();
        let artifact = generate(&blob, &collections);

        assert!(artifact.source.contains(
            "return JS_ThrowTypeError(ctx, \"Failed to execute 'appendChild' : 1 argument required, but %d present.\", argc);"
        ));
        assert!(artifact.source.contains(
            "auto&& args_child = Converter<Node>::FromValue(ctx, argv[0], exception_state);"
        ));
        assert!(artifact.source.contains("Node* return_value = nullptr;"));
        assert!(artifact.source.contains("return_value = self->appendChild(args_child, exception_state);"));
        assert!(artifact.source.contains("return Converter<Node>::ToValue(ctx, std::move(return_value));"));
        assert!(artifact.source.contains("do {  // Dummy loop for use of 'break'."));
    }

    #[test]
    fn test_optional_arguments_dispatch_on_argc() {
        let mut interface = node();
        interface.methods = vec![method(
            "scroll",
            vec![
                argument("x", TypeDescriptor::primitive(Primitive::Double), true),
                argument("y", TypeDescriptor::primitive(Primitive::Double), false),
            ],
            TypeDescriptor::void(),
        )];
        let blob = blob(vec![Declaration::Interface(interface)]);
        let collections = CollectionContext::new().finalize();
        let artifact = generate(&blob, &collections);

        assert!(artifact.source.contains("if (argc <= 1) {"));
        assert!(artifact.source.contains(
            "auto&& args_y = Converter<IDLOptional<IDLDouble>>::FromValue(ctx, argv[1], exception_state);"
        ));
        assert!(artifact.source.contains("self->scroll(args_x, exception_state);"));
        assert!(artifact.source.contains("self->scroll(args_x, args_y, exception_state);"));
        // the install table reports the declared length, optional arguments included
        assert!(artifact.source.contains("{\"scroll\", qjs_scroll, 2},"));
    }

    #[test]
    fn test_native_impl_forwards_call() {
        let mut interface = node();
        let mut click = method(
            "scrollBy",
            vec![argument("dx", TypeDescriptor::primitive(Primitive::Double), true)],
            TypeDescriptor::void(),
        );
        click.return_mode.native_impl = true;
        click.return_mode.layout_dependent = true;
        interface.methods = vec![click];
        let blob = blob(vec![Declaration::Interface(interface)]);
        let collections = CollectionContext::new().finalize();
        let artifact = generate(&blob, &collections);

        assert!(
            artifact
                .source
                .contains("NativeValueConverter<NativeTypeDouble>::ToNativeValue(args_dx),")
        );
        assert!(artifact.source.contains(
            "self->InvokeBindingMethod(binding_call_methods::kscrollBy, 1, arguments, FlushUICommandReason::kDependentsOnElement | FlushUICommandReason::kDependentsOnLayout, exception_state);"
        ));
    }

    #[test]
    fn test_void_property_names_owner_and_member() {
        let mut interface = node();
        interface
            .properties
            .push(property("broken", TypeDescriptor::void(), false));
        let blob = blob(vec![Declaration::Interface(interface)]);
        let collections = CollectionContext::new().finalize();
        let err = InterfaceGenerator::new(&blob, &collections)
            .generate()
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "unsupported type 'void' for 'Node.broken': void has no value converter"
        );
    }

    #[test]
    fn test_union_member_uses_collected_wrapper() {
        let ty = match UnionSignature::normalize(vec![
            TypeDescriptor::primitive(Primitive::DomString),
            TypeDescriptor::primitive(Primitive::Double),
        ])
        .0
        {
            Normalized::Union(signature) => TypeDescriptor::new(TypeKind::Union(signature)),
            other => panic!("expected union, got {:?}", other),
        };
        let mut interface = node();
        interface.properties.push(property("value", ty.clone(), false));

        let mut ctx = CollectionContext::new();
        ctx.register_unions(&ty).unwrap();
        let collections = ctx.finalize();
        let blob = blob(vec![Declaration::Interface(interface)]);
        let artifact = generate(&blob, &collections);

        assert!(
            artifact
                .header
                .contains("#include \"qjs_union_double_dom_string.h\"")
        );
        assert!(
            artifact
                .source
                .contains("Converter<QJSUnionDoubleDomString>::FromValue(ctx, argv[0], exception_state);")
        );
    }

    #[test]
    fn test_dictionary() {
        let dictionary = Interface {
            name: "EventInit".into(),
            kind: DeclarationKind::Dictionary,
            properties: vec![Property {
                optional: true,
                ..property("bubbles", TypeDescriptor::primitive(Primitive::Boolean), false)
            }],
            ..Default::default()
        };
        let blob = blob(vec![Declaration::Interface(dictionary)]);
        let collections = CollectionContext::new().finalize();
        let artifact = generate(&blob, &collections);

        assert!(artifact.header.contains("class EventInit : public DictionaryBase {"));
        assert!(artifact.header.contains("bool bubbles_{false};"));
        assert!(artifact.header.contains("void setBubbles(bool value) {"));
        assert!(artifact.source.contains(
            "bubbles_ = Converter<IDLBoolean>::FromValue(ctx, bubbles, exception_state);"
        ));
        assert!(!artifact.source.contains("Required member is undefined"));
        assert!(!artifact.header.contains("QJSInterfaceBridge"));
    }

    #[test]
    fn test_mixin_members_are_folded_in() {
        let mixin = Interface {
            name: "GlobalEventHandlers".into(),
            kind: DeclarationKind::Mixin,
            properties: vec![property(
                "onclick",
                TypeDescriptor::primitive(Primitive::Function).nullable(true),
                false,
            )],
            ..Default::default()
        };
        let mut ctx = CollectionContext::new();
        ctx.record_mixin(mixin.clone());
        let collections = ctx.finalize();

        let mut interface = node();
        interface.mixins = vec!["GlobalEventHandlers".into()];
        let blob = blob(vec![
            Declaration::Interface(mixin),
            Declaration::Interface(interface),
        ]);
        let artifact = generate(&blob, &collections);

        assert!(artifact.source.contains("onclickAttributeGetCallback"));
        assert!(!artifact.header.contains("QJSGlobalEventHandlers"));
    }

    #[test]
    fn test_global_functions_get_installer() {
        let mut blob = InterfaceBlob::new(
            Path::new("/src/timer.d.ts"),
            Path::new("/src"),
            Path::new("/dist"),
            ".d.ts",
        );
        blob.declarations = vec![Declaration::Function(method(
            "setTimeout",
            vec![
                argument("handler", TypeDescriptor::primitive(Primitive::Function), true),
                argument("timeout", TypeDescriptor::primitive(Primitive::Int32), false),
            ],
            TypeDescriptor::primitive(Primitive::Int32),
        ))];
        let collections = CollectionContext::new().finalize();
        let artifact = generate(&blob, &collections);

        assert!(artifact.header.contains("class QJSTimer final {"));
        assert!(artifact.source.contains("{\"setTimeout\", qjs_setTimeout, 2},"));
        assert!(artifact.source.contains(
            "return_value = Timer::setTimeout(context, args_handler, exception_state);"
        ));
        assert!(artifact.source.contains(
            "MemberInstaller::InstallFunctions(context, context->Global(), functionConfig);"
        ));
    }

    #[test]
    fn test_indexed_string_getter() {
        let mut interface = node();
        interface.indexed = Some(IndexedProperty {
            key: IndexKey::String,
            ty: TypeDescriptor::primitive(Primitive::DomString),
            readonly: true,
        });
        let blob = blob(vec![Declaration::Interface(interface)]);
        let collections = CollectionContext::new().finalize();
        let artifact = generate(&blob, &collections);

        assert!(artifact.source.contains(
            "QJSNode::ConstructorCallback, nullptr, nullptr, QJSNode::StringPropertyGetterCallback, nullptr, QJSNode::PropertyCheckerCallback, QJSNode::PropertyEnumerateCallback, nullptr};"
        ));
        assert!(!artifact.source.contains("StringPropertyDeleterCallback(JSContext"));
    }
}
