//! End-to-end runs over a temporary source tree.

use std::path::Path;

use bridgegen_codegen::{CodegenError, HashTableGenerator, Pipeline, PipelineOptions, Result};
use tempfile::TempDir;

struct Upper;

impl HashTableGenerator for Upper {
    fn generate(&self, input: &str) -> Result<String> {
        Ok(input.to_uppercase())
    }
}

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn read(root: &Path, relative: &str) -> String {
    std::fs::read_to_string(root.join(relative)).unwrap()
}

/// A source tree with its output directory nested inside.
fn tree() -> (TempDir, Pipeline) {
    let dir = tempfile::tempdir().unwrap();
    let options = PipelineOptions::new(dir.path(), dir.path().join("dist"));
    (dir, Pipeline::new(options).hash_table(Upper))
}

#[test]
fn test_second_run_writes_nothing() {
    let (dir, pipeline) = tree();
    write(
        dir.path(),
        "dom/node.d.ts",
        "interface Node { value: string | number; appendChild(child: Node): Node; new(): void; }",
    );

    let first = pipeline.run().unwrap();
    assert_eq!(first.written(), 4);
    assert_eq!(first.unchanged(), 0);

    let second = pipeline.run().unwrap();
    assert_eq!(second.written(), 0);
    assert_eq!(second.unchanged(), 4);
}

#[test]
fn test_equivalent_unions_share_one_wrapper() {
    let (dir, pipeline) = tree();
    write(dir.path(), "a.d.ts", "interface A { a: string | number; new(): void; }");
    write(
        dir.path(),
        "b.d.ts",
        "interface B { b(value: number | string): void; new(): void; }",
    );

    let summary = pipeline.run().unwrap();
    assert_eq!(summary.unions, 1);

    let header = read(dir.path(), "dist/qjs_union_double_dom_string.h");
    assert!(header.contains("class QJSUnionDoubleDomString"));
    for file in ["dist/qjs_a.h", "dist/qjs_b.h"] {
        assert!(read(dir.path(), file).contains("#include \"qjs_union_double_dom_string.h\""));
    }
}

#[test]
fn test_unsupported_union_member_writes_nothing() {
    let (dir, pipeline) = tree();
    write(dir.path(), "a.d.ts", "interface A { ok: number; new(): void; }");
    write(dir.path(), "b.d.ts", "interface B { bad: any | string; new(): void; }");

    let err = pipeline.run().unwrap_err();
    assert!(matches!(err, CodegenError::UnsupportedType { ref ty, .. } if ty == "any"));
    assert!(!dir.path().join("dist").exists());
}

#[test]
fn test_aggregate_outputs_see_every_file() {
    let (dir, pipeline) = tree();
    write(
        dir.path(),
        "dom/node.d.ts",
        "interface Node { nodeName: string; appendChild(child: Node): Node; new(): void; }",
    );
    write(
        dir.path(),
        "html/image.d.ts",
        "interface Image { src: string; new(): void; }",
    );
    write(dir.path(), "templates/defined_properties.h.tpl", "// {{source}}");
    write(
        dir.path(),
        "templates/defined_properties.cc.tpl",
        "{{#each data.properties}}{{this}};{{/each}}",
    );
    write(dir.path(), "templates/binding_initializer.h.tpl", "");
    write(
        dir.path(),
        "templates/binding_initializer.cc.tpl",
        "{{#each data.interfaces}}{{this}} {{/each}}",
    );
    write(
        dir.path(),
        "tables/aggregates.json5",
        r#"{
            metadata: {
                templates: [
                    { template: "defined_properties", filename: "defined_properties" },
                    { template: "binding_initializer", filename: "binding_initializer" },
                ],
            },
            properties: ["onload", "src"],
        }"#,
    );

    pipeline.run().unwrap();

    let properties = read(dir.path(), "dist/defined_properties.cc");
    assert_eq!(properties, "Image;Node;nodeName;onload;src;");
    assert!(!properties.contains("appendChild"));
    assert_eq!(read(dir.path(), "dist/defined_properties.h"), "// tables/aggregates.json5");

    let installer = read(dir.path(), "dist/binding_initializer.cc");
    assert!(installer.contains("QJSNode "));
    assert!(installer.contains("QJSImage "));
}

#[test]
fn test_hash_table_bodies_and_names_installer() {
    let (dir, pipeline) = tree();
    write(dir.path(), "templates/names.h.tpl", "// {{name}}");
    write(
        dir.path(),
        "templates/names.cc.tpl",
        "{{#each data.names}}{{this}}\n{{/each}}",
    );
    write(dir.path(), "templates/names_installer.h.tpl", "");
    write(
        dir.path(),
        "templates/names_installer.cc.tpl",
        "{{#each names}}{{upper_camel this}}::Init();{{/each}}",
    );
    write(
        dir.path(),
        "events/event_types.json5",
        r#"{
            metadata: {
                templates: [{ template: "names", filename: "event_type_names", options: { hashTable: true } }],
            },
            names: ["click", "load"],
        }"#,
    );

    let summary = pipeline.run().unwrap();
    assert_eq!(summary.data, 1);

    assert_eq!(read(dir.path(), "dist/events/event_type_names.h"), "// event_type_names");
    assert_eq!(read(dir.path(), "dist/events/event_type_names.cc"), "CLICK\nLOAD\n");
    assert_eq!(
        read(dir.path(), "dist/names_installer.cc"),
        "EventTypeNames::Init();"
    );
}

#[test]
fn test_missing_template_is_fatal() {
    let (dir, pipeline) = tree();
    write(
        dir.path(),
        "a.json5",
        "{ metadata: { templates: [{ template: 'absent', filename: 'a' }] } }",
    );

    let err = pipeline.run().unwrap_err();
    assert!(matches!(err, CodegenError::Template { ref name, .. } if name == "absent"));
}

#[test]
fn test_mixin_only_file_emits_nothing() {
    let (dir, pipeline) = tree();
    write(
        dir.path(),
        "global_event_handlers.d.ts",
        "@Mixin() interface GlobalEventHandlersMixin { onclick: Function; }",
    );
    write(
        dir.path(),
        "window.d.ts",
        "interface Window extends EventTarget, GlobalEventHandlersMixin { new(): void; }",
    );

    pipeline.run().unwrap();
    assert!(!dir.path().join("dist/qjs_global_event_handlers.h").exists());
    assert!(read(dir.path(), "dist/qjs_window.cc").contains("onclick"));
}
