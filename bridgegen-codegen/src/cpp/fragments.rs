//! Reusable C++ file shapes.

use std::collections::BTreeSet;

use bridgegen_core::to_snake_case;

use crate::builder::{CodeFragment, Renderable};

/// Split builder output back into line fragments.
pub(crate) fn lines(text: &str) -> Vec<CodeFragment> {
    text.lines().map(CodeFragment::line).collect()
}

/// `#ifndef` guard around a header body.
#[derive(Debug, Clone)]
pub struct HeaderGuard {
    symbol: String,
    body: Vec<CodeFragment>,
}

impl HeaderGuard {
    /// Guard for the header named `base_name`, e.g. `BRIDGE_QJS_NODE_H_`.
    pub fn new(base_name: &str, body: Vec<CodeFragment>) -> Self {
        Self {
            symbol: format!("BRIDGE_{}_H_", to_snake_case(base_name).to_uppercase()),
            body,
        }
    }
}

impl Renderable for HeaderGuard {
    fn to_fragments(&self) -> Vec<CodeFragment> {
        vec![
            CodeFragment::line(format!("#ifndef {}", self.symbol)),
            CodeFragment::line(format!("#define {}", self.symbol)),
            CodeFragment::blank(),
            CodeFragment::sequence(self.body.clone()),
            CodeFragment::blank(),
            CodeFragment::line(format!("#endif  // {}", self.symbol)),
        ]
    }
}

/// Sorted, deduplicated include directives.
#[derive(Debug, Clone, Default)]
pub struct Includes {
    system: BTreeSet<String>,
    local: BTreeSet<String>,
}

impl Includes {
    pub fn system(&mut self, header: impl Into<String>) -> &mut Self {
        self.system.insert(header.into());
        self
    }

    pub fn local(&mut self, header: impl Into<String>) -> &mut Self {
        self.local.insert(header.into());
        self
    }
}

impl Renderable for Includes {
    fn to_fragments(&self) -> Vec<CodeFragment> {
        let mut fragments: Vec<CodeFragment> = self
            .system
            .iter()
            .map(|h| CodeFragment::line(format!("#include <{}>", h)))
            .collect();
        if !self.system.is_empty() && !self.local.is_empty() {
            fragments.push(CodeFragment::blank());
        }
        fragments.extend(
            self.local
                .iter()
                .map(|h| CodeFragment::line(format!("#include \"{}\"", h))),
        );
        fragments
    }
}

/// `namespace name { ... }`
#[derive(Debug, Clone)]
pub struct Namespace {
    name: String,
    body: Vec<CodeFragment>,
}

impl Namespace {
    pub fn new(name: impl Into<String>, body: Vec<CodeFragment>) -> Self {
        Self {
            name: name.into(),
            body,
        }
    }
}

impl Renderable for Namespace {
    fn to_fragments(&self) -> Vec<CodeFragment> {
        vec![
            CodeFragment::line(format!("namespace {} {{", self.name)),
            CodeFragment::blank(),
            CodeFragment::sequence(self.body.clone()),
            CodeFragment::blank(),
            CodeFragment::line(format!("}}  // namespace {}", self.name)),
        ]
    }
}

/// An `std::initializer_list` of installer entries.
#[derive(Debug, Clone)]
pub struct ConfigTable {
    element: &'static str,
    variable: &'static str,
    entries: Vec<String>,
}

impl ConfigTable {
    pub fn new(element: &'static str, variable: &'static str, entries: Vec<String>) -> Self {
        Self {
            element,
            variable,
            entries,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Renderable for ConfigTable {
    fn to_fragments(&self) -> Vec<CodeFragment> {
        vec![CodeFragment::block(
            format!("std::initializer_list<{}> {}{{", self.element, self.variable),
            self.entries
                .iter()
                .map(|entry| CodeFragment::line(format!("{},", entry)))
                .collect(),
            Some("};".to_string()),
        )]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::CodeBuilder;

    fn render(node: &impl Renderable) -> String {
        let mut builder = CodeBuilder::cpp();
        builder.emit(node);
        builder.build()
    }

    #[test]
    fn test_header_guard() {
        let guard = HeaderGuard::new("qjs_node", vec![CodeFragment::line("class QJSNode;")]);
        insta::assert_snapshot!(render(&guard), @r"
        #ifndef BRIDGE_QJS_NODE_H_
        #define BRIDGE_QJS_NODE_H_

        class QJSNode;

        #endif  // BRIDGE_QJS_NODE_H_
        ");
    }

    #[test]
    fn test_includes_sorted_and_deduplicated() {
        let mut includes = Includes::default();
        includes
            .local("qjs_node.h")
            .system("memory")
            .local("bindings/qjs/converter_impl.h")
            .local("qjs_node.h");
        assert_eq!(
            render(&includes),
            "#include <memory>\n\n#include \"bindings/qjs/converter_impl.h\"\n#include \"qjs_node.h\"\n"
        );
    }

    #[test]
    fn test_config_table() {
        let table = ConfigTable::new(
            "MemberInstaller::FunctionConfig",
            "functionConfig",
            vec!["{\"appendChild\", appendChild, 1}".to_string()],
        );
        assert!(!table.is_empty());
        assert_eq!(
            render(&table),
            "std::initializer_list<MemberInstaller::FunctionConfig> functionConfig{\n  {\"appendChild\", appendChild, 1},\n};\n"
        );
    }
}
