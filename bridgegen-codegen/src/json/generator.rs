//! Renders template invocations of JSON data blobs.

use std::path::Path;

use bridgegen_core::GeneratedArtifact;
use bridgegen_ir::{FinalizedCollections, NamesInstallSet};
use serde_json::{Map, Value, json};

use super::{
    JsonDataBlob, TemplateInvocation,
    template::{TemplatePart, TemplateStore},
};
use crate::{
    error::{CodegenError, Result},
    hash_table::HashTableGenerator,
};

/// Output receiving every property name seen in the run.
pub const DEFINED_PROPERTIES: &str = "defined_properties";
/// Output receiving the contributing files and interfaces.
pub const BINDING_INITIALIZER: &str = "binding_initializer";
/// Template whose invocations feed the names installer.
pub const NAMES_TEMPLATE: &str = "names";
/// Template and output of the aggregate names installer.
pub const NAMES_INSTALLER: &str = "names_installer";

/// Renders template pairs against blob data and the finalized collectors.
pub struct JsonGenerator<'a> {
    templates: &'a TemplateStore,
    collections: &'a FinalizedCollections,
    hash_table: &'a dyn HashTableGenerator,
    dist_root: &'a Path,
}

impl<'a> JsonGenerator<'a> {
    pub fn new(
        templates: &'a TemplateStore,
        collections: &'a FinalizedCollections,
        hash_table: &'a dyn HashTableGenerator,
        dist_root: &'a Path,
    ) -> Self {
        Self {
            templates,
            collections,
            hash_table,
            dist_root,
        }
    }

    /// One artifact per template invocation of `blob`, in declaration order.
    pub fn generate(
        &self,
        blob: &JsonDataBlob,
        names: &mut NamesInstallSet,
    ) -> Result<Vec<GeneratedArtifact>> {
        let mut artifacts = Vec::with_capacity(blob.templates.len());
        for invocation in &blob.templates {
            let context = self.context(blob, invocation)?;
            artifacts.push(self.render(blob, invocation, &context)?);
            if invocation.template == NAMES_TEMPLATE {
                names.register(&invocation.filename);
            }
        }
        Ok(artifacts)
    }

    fn render(
        &self,
        blob: &JsonDataBlob,
        invocation: &TemplateInvocation,
        context: &Value,
    ) -> Result<GeneratedArtifact> {
        let name = invocation.template.as_str();
        let header = self.templates.render(name, TemplatePart::Header, context)?;
        let mut source = self.templates.render(name, TemplatePart::Source, context)?;
        if invocation.options.hash_table {
            tracing::debug!(output = %invocation.filename, "piping body through hash table generator");
            source = self.hash_table.generate(&source)?;
        }

        let dir = if is_aggregate(&invocation.filename) {
            self.dist_root
        } else {
            blob.dist_dir.as_path()
        };
        Ok(GeneratedArtifact::new(
            dir,
            &invocation.filename,
            header,
            source,
        ))
    }

    fn context(&self, blob: &JsonDataBlob, invocation: &TemplateInvocation) -> Result<Value> {
        let deps: Map<String, Value> = invocation
            .resolved_deps
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        let mut data = blob.data.clone();
        match invocation.filename.as_str() {
            DEFINED_PROPERTIES => {
                merge_list(blob, &mut data, "properties", self.collections.properties())?;
                sort_list(&mut data, "properties");
            }
            BINDING_INITIALIZER => {
                merge_list(blob, &mut data, "files", self.collections.files())?;
                merge_list(blob, &mut data, "interfaces", self.collections.interfaces())?;
            }
            _ => {}
        }

        Ok(json!({
            "name": invocation.filename,
            "source": blob.attribution,
            "data": data,
            "deps": deps,
            "options": invocation.options,
        }))
    }

    /// The aggregate installer, when any invocation used the names template.
    pub fn names_installer(&self, names: NamesInstallSet) -> Result<Option<GeneratedArtifact>> {
        if names.is_empty() {
            return Ok(None);
        }
        let context = json!({
            "name": NAMES_INSTALLER,
            "names": names.into_names(),
        });
        let header = self
            .templates
            .render(NAMES_INSTALLER, TemplatePart::Header, &context)?;
        let source = self
            .templates
            .render(NAMES_INSTALLER, TemplatePart::Source, &context)?;
        Ok(Some(GeneratedArtifact::new(
            self.dist_root,
            NAMES_INSTALLER,
            header,
            source,
        )))
    }
}

fn is_aggregate(filename: &str) -> bool {
    matches!(filename, DEFINED_PROPERTIES | BINDING_INITIALIZER)
}

/// Append `names` to the list `data.<key>`, skipping entries already present.
fn merge_list<'n>(
    blob: &JsonDataBlob,
    data: &mut Value,
    key: &str,
    names: impl Iterator<Item = &'n str>,
) -> Result<()> {
    let invalid = |message: String| CodegenError::Data {
        path: blob.source.clone(),
        message,
    };
    let Value::Object(map) = data else {
        return Err(invalid("top level must be an object".to_string()));
    };
    let Value::Array(list) = map
        .entry(key)
        .or_insert_with(|| Value::Array(Vec::new()))
    else {
        return Err(invalid(format!("'{}' must be an array", key)));
    };

    let existing = std::mem::take(list);
    let collected = names.map(|name| Value::String(name.to_string()));
    for entry in existing.into_iter().chain(collected) {
        if !list.contains(&entry) {
            list.push(entry);
        }
    }
    Ok(())
}

/// Sort a list of strings in place; lists holding anything else keep their order.
fn sort_list(data: &mut Value, key: &str) {
    if let Some(Value::Array(list)) = data.get_mut(key) {
        if list.iter().all(Value::is_string) {
            list.sort_by(|a, b| a.as_str().cmp(&b.as_str()));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use bridgegen_ir::CollectionContext;

    use super::*;

    struct Upper;

    impl HashTableGenerator for Upper {
        fn generate(&self, input: &str) -> Result<String> {
            Ok(input.to_uppercase())
        }
    }

    struct Broken;

    impl HashTableGenerator for Broken {
        fn generate(&self, _input: &str) -> Result<String> {
            Err(CodegenError::ExternalTool {
                program: "gperf".into(),
                status: "exit status: 1".into(),
                stderr: "bad input".into(),
            })
        }
    }

    fn store() -> TemplateStore {
        let mut store = TemplateStore::new("/unused");
        for (name, header, source) in [
            ("names", "// {{name}}", "{{#each data.names}}{{this}},{{/each}}"),
            ("props", "// {{name}}", "{{#each data.properties}}{{this}} {{/each}}"),
            ("installer", "", "{{#each data.interfaces}}{{this}}::Install;{{/each}}"),
            ("deps", "", "{{deps.keywords.first}}"),
            (NAMES_INSTALLER, "", "{{#each names}}{{this}} {{/each}}"),
        ] {
            store.insert(name, TemplatePart::Header, header).unwrap();
            store.insert(name, TemplatePart::Source, source).unwrap();
        }
        store
    }

    fn blob(text: &str) -> JsonDataBlob {
        JsonDataBlob::parse(
            text,
            Path::new("/src/events/table.json5"),
            Path::new("/src"),
            Path::new("/dist"),
        )
        .unwrap()
    }

    fn collections() -> FinalizedCollections {
        let mut ctx = CollectionContext::new();
        ctx.record_interface("qjs_node", "Node");
        ctx.record_property("appendChild");
        ctx.finalize()
    }

    #[test]
    fn test_hash_table_pass_through() {
        let store = store();
        let collections = collections();
        let generator = JsonGenerator::new(&store, &collections, &Upper, Path::new("/dist"));
        let blob = blob(
            "{ metadata: { templates: [{ template: 'names', filename: 'tag_names', options: { hashTable: true } }] }, names: ['div', 'span'] }",
        );

        let mut names = NamesInstallSet::default();
        let artifacts = generator.generate(&blob, &mut names).unwrap();
        assert_eq!(artifacts[0].header, "// tag_names");
        assert_eq!(artifacts[0].source, "DIV,SPAN,");
        assert_eq!(artifacts[0].dir, PathBuf::from("/dist/events"));
        assert!(!names.is_empty());
    }

    #[test]
    fn test_tool_failure_propagates() {
        let store = store();
        let collections = collections();
        let generator = JsonGenerator::new(&store, &collections, &Broken, Path::new("/dist"));
        let blob = blob(
            "{ metadata: { templates: [{ template: 'names', filename: 'x', options: { gperf: true } }] }, names: [] }",
        );
        let err = generator
            .generate(&blob, &mut NamesInstallSet::default())
            .unwrap_err();
        assert!(matches!(err, CodegenError::ExternalTool { ref stderr, .. } if stderr == "bad input"));
    }

    #[test]
    fn test_reserved_outputs_see_collectors() {
        let store = store();
        let collections = collections();
        let generator = JsonGenerator::new(&store, &collections, &Upper, Path::new("/dist"));
        let blob = blob(
            "{ metadata: { templates: [
                { template: 'props', filename: 'defined_properties' },
                { template: 'installer', filename: 'binding_initializer' },
            ] } }",
        );

        let artifacts = generator
            .generate(&blob, &mut NamesInstallSet::default())
            .unwrap();
        assert_eq!(artifacts[0].source, "Node appendChild ");
        assert_eq!(artifacts[0].dir, PathBuf::from("/dist"));
        assert_eq!(artifacts[1].source, "QJSNode::Install;");
        assert_eq!(artifacts[1].dir, PathBuf::from("/dist"));
    }

    #[test]
    fn test_reserved_outputs_merge_into_blob_data() {
        let store = store();
        let collections = collections();
        let generator = JsonGenerator::new(&store, &collections, &Upper, Path::new("/dist"));
        let blob = blob(
            "{ metadata: { templates: [
                { template: 'props', filename: 'defined_properties' },
                { template: 'installer', filename: 'binding_initializer' },
            ] },
            properties: ['textContent', 'Node', 'textContent'],
            interfaces: ['QJSWindow', 'QJSNode'] }",
        );

        let artifacts = generator
            .generate(&blob, &mut NamesInstallSet::default())
            .unwrap();
        assert_eq!(artifacts[0].source, "Node appendChild textContent ");
        assert_eq!(artifacts[1].source, "QJSWindow::Install;QJSNode::Install;");
    }

    #[test]
    fn test_reserved_output_rejects_non_list_data() {
        let store = store();
        let collections = collections();
        let generator = JsonGenerator::new(&store, &collections, &Upper, Path::new("/dist"));
        let blob = blob(
            "{ metadata: { templates: [{ template: 'props', filename: 'defined_properties' }] }, properties: 'all' }",
        );

        let err = generator
            .generate(&blob, &mut NamesInstallSet::default())
            .unwrap_err();
        assert!(matches!(err, CodegenError::Data { ref message, .. } if message.contains("properties")));
    }

    #[test]
    fn test_dependencies_are_exposed_by_stem() {
        let store = store();
        let collections = collections();
        let generator = JsonGenerator::new(&store, &collections, &Upper, Path::new("/dist"));
        let mut blob = blob("{ metadata: { templates: [{ template: 'deps', filename: 'd' }] } }");
        blob.templates[0]
            .resolved_deps
            .insert("keywords".to_string(), json!({ "first": "auto" }));

        let artifacts = generator
            .generate(&blob, &mut NamesInstallSet::default())
            .unwrap();
        assert_eq!(artifacts[0].source, "auto");
    }

    #[test]
    fn test_names_installer() {
        let store = store();
        let collections = collections();
        let generator = JsonGenerator::new(&store, &collections, &Upper, Path::new("/dist"));

        assert!(
            generator
                .names_installer(NamesInstallSet::default())
                .unwrap()
                .is_none()
        );

        let mut names = NamesInstallSet::default();
        names.register("event_type_names");
        names.register("html_names");
        let artifact = generator.names_installer(names).unwrap().unwrap();
        assert_eq!(artifact.base_name, NAMES_INSTALLER);
        assert_eq!(artifact.source, "event_type_names html_names ");
    }
}
