//! Named header/body template pairs rendered with Handlebars.

use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};

use bridgegen_core::{to_camel_case, to_pascal_case, to_snake_case};
use handlebars::{Handlebars, handlebars_helper};
use serde::Serialize;

use crate::error::{CodegenError, Result};

handlebars_helper!(upper_camel: |s: str| to_pascal_case(s));
handlebars_helper!(lower_camel: |s: str| to_camel_case(s));
handlebars_helper!(snake: |s: str| to_snake_case(s));
handlebars_helper!(upper: |s: str| s.to_uppercase());
handlebars_helper!(json: |v: Json| v.to_string());

/// Which half of a template pair to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplatePart {
    Header,
    Source,
}

impl TemplatePart {
    fn extension(self) -> &'static str {
        match self {
            TemplatePart::Header => "h",
            TemplatePart::Source => "cc",
        }
    }
}

/// Templates loaded from `<root>/<name>.h.tpl` and `<root>/<name>.cc.tpl`.
///
/// Loading happens while inputs are collected; rendering never touches the
/// filesystem.
pub struct TemplateStore {
    root: PathBuf,
    registry: Handlebars<'static>,
    loaded: BTreeSet<String>,
}

impl TemplateStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let mut registry = Handlebars::new();
        registry.register_escape_fn(handlebars::no_escape);
        registry.register_helper("upper_camel", Box::new(upper_camel));
        registry.register_helper("lower_camel", Box::new(lower_camel));
        registry.register_helper("snake", Box::new(snake));
        registry.register_helper("upper", Box::new(upper));
        registry.register_helper("json", Box::new(json));
        Self {
            root: root.into(),
            registry,
            loaded: BTreeSet::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Load both halves of `name`. Loading a name twice is a no-op.
    pub fn load(&mut self, name: &str) -> Result<()> {
        if self.loaded.contains(name) {
            return Ok(());
        }
        for part in [TemplatePart::Header, TemplatePart::Source] {
            let path = self
                .root
                .join(format!("{}.{}.tpl", name, part.extension()));
            let text = std::fs::read_to_string(&path).map_err(|e| CodegenError::Template {
                name: name.to_string(),
                message: format!("cannot read '{}': {}", path.display(), e),
            })?;
            self.insert(name, part, &text)?;
        }
        tracing::debug!(template = name, "loaded template");
        self.loaded.insert(name.to_string());
        Ok(())
    }

    /// Register one half from memory.
    pub fn insert(&mut self, name: &str, part: TemplatePart, text: &str) -> Result<()> {
        self.registry
            .register_template_string(&key(name, part), text)
            .map_err(|e| CodegenError::Template {
                name: name.to_string(),
                message: e.to_string(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.registry.has_template(&key(name, TemplatePart::Header))
            && self.registry.has_template(&key(name, TemplatePart::Source))
    }

    pub fn render(&self, name: &str, part: TemplatePart, data: &impl Serialize) -> Result<String> {
        let key = key(name, part);
        if !self.registry.has_template(&key) {
            return Err(CodegenError::Template {
                name: name.to_string(),
                message: "template was not loaded".to_string(),
            });
        }
        self.registry
            .render(&key, data)
            .map_err(|e| CodegenError::Template {
                name: name.to_string(),
                message: e.to_string(),
            })
    }
}

fn key(name: &str, part: TemplatePart) -> String {
    format!("{}.{}", name, part.extension())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_helpers() {
        let mut store = TemplateStore::new("/unused");
        store
            .insert(
                "t",
                TemplatePart::Header,
                "{{upper_camel name}} {{lower_camel name}} {{snake camel}} {{upper name}} {{json list}}",
            )
            .unwrap();
        let out = store
            .render(
                "t",
                TemplatePart::Header,
                &json!({ "name": "event_type", "camel": "EventType", "list": [1, 2] }),
            )
            .unwrap();
        assert_eq!(out, "EventType eventType event_type EVENT_TYPE [1,2]");
    }

    #[test]
    fn test_no_html_escaping() {
        let mut store = TemplateStore::new("/unused");
        store
            .insert("t", TemplatePart::Source, "#include \"{{header}}\"")
            .unwrap();
        let out = store
            .render("t", TemplatePart::Source, &json!({ "header": "<a>&.h" }))
            .unwrap();
        assert_eq!(out, "#include \"<a>&.h\"");
    }

    #[test]
    fn test_load_pair_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("names.h.tpl"), "// {{name}}").unwrap();
        std::fs::write(dir.path().join("names.cc.tpl"), "{{#each data}}{{this}};{{/each}}").unwrap();

        let mut store = TemplateStore::new(dir.path());
        store.load("names").unwrap();
        store.load("names").unwrap();
        assert!(store.contains("names"));

        let data = json!({ "name": "tags", "data": ["a", "b"] });
        assert_eq!(store.render("names", TemplatePart::Header, &data).unwrap(), "// tags");
        assert_eq!(store.render("names", TemplatePart::Source, &data).unwrap(), "a;b;");
    }

    #[test]
    fn test_missing_template_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = TemplateStore::new(dir.path());
        let err = store.load("absent").unwrap_err();
        assert!(matches!(err, CodegenError::Template { ref name, .. } if name == "absent"));
    }

    #[test]
    fn test_render_unloaded() {
        let store = TemplateStore::new("/unused");
        assert!(store.render("x", TemplatePart::Header, &json!({})).is_err());
    }
}
