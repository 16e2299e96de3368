//! JSON5 data tables and their template invocations.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{CodegenError, Result};

/// Generation switches of one invocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerateOptions {
    /// Pipe the rendered body through the hash-table generator.
    #[serde(rename = "hashTable", alias = "gperf", default)]
    pub hash_table: bool,
    /// Options only the template reads.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One `metadata.templates` entry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TemplateInvocation {
    pub template: String,
    /// Output base name of the rendered pair.
    pub filename: String,
    #[serde(default)]
    pub deps: Vec<String>,
    #[serde(default)]
    pub options: GenerateOptions,
    /// Parsed dependency tables keyed by file stem.
    #[serde(skip)]
    pub resolved_deps: BTreeMap<String, Value>,
}

/// One parsed data file.
#[derive(Debug, Clone)]
pub struct JsonDataBlob {
    pub source: PathBuf,
    /// Directory the rendered pairs are written into.
    pub dist_dir: PathBuf,
    /// Path relative to the source root.
    pub attribution: String,
    pub data: Value,
    pub templates: Vec<TemplateInvocation>,
}

impl JsonDataBlob {
    /// Read and parse `source`, resolving every dependency it names.
    pub fn load(source: &Path, source_root: &Path, dist_root: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(source).map_err(|e| CodegenError::Data {
            path: source.to_path_buf(),
            message: e.to_string(),
        })?;
        let mut blob = Self::parse(&text, source, source_root, dist_root)?;
        blob.resolve_deps()?;
        Ok(blob)
    }

    /// Parse `text` as the content of `source`. Dependencies are left
    /// unresolved.
    pub fn parse(text: &str, source: &Path, source_root: &Path, dist_root: &Path) -> Result<Self> {
        let data = parse_json5(text, source)?;
        let templates = data
            .get("metadata")
            .and_then(|metadata| metadata.get("templates"))
            .cloned()
            .ok_or_else(|| CodegenError::Data {
                path: source.to_path_buf(),
                message: "missing 'metadata.templates'".to_string(),
            })?;
        let templates: Vec<TemplateInvocation> =
            serde_json::from_value(templates).map_err(|e| CodegenError::Data {
                path: source.to_path_buf(),
                message: format!("invalid 'metadata.templates': {}", e),
            })?;

        let relative = source.strip_prefix(source_root).unwrap_or(source);
        let dist_dir = match relative.parent() {
            Some(parent) => dist_root.join(parent),
            None => dist_root.to_path_buf(),
        };

        Ok(Self {
            source: source.to_path_buf(),
            dist_dir,
            attribution: relative.to_string_lossy().replace('\\', "/"),
            data,
            templates,
        })
    }

    /// Load every `deps` entry relative to this file's directory.
    ///
    /// Two dependencies of one invocation may not share a file stem, since
    /// both would be exposed as the same `deps.<stem>` key.
    pub fn resolve_deps(&mut self) -> Result<()> {
        let base = self.source.parent().unwrap_or(Path::new(""));
        for invocation in &mut self.templates {
            let mut keys: BTreeMap<String, &str> = BTreeMap::new();
            for dependency in &invocation.deps {
                let key = dependency_key(dependency);
                if let Some(previous) = keys.insert(key.clone(), dependency) {
                    return Err(CodegenError::Data {
                        path: self.source.clone(),
                        message: format!(
                            "dependencies '{}' and '{}' would both be exposed as 'deps.{}'",
                            previous, dependency, key
                        ),
                    });
                }

                let path = base.join(dependency);
                let text = std::fs::read_to_string(&path).map_err(|source| {
                    CodegenError::DependencyResolution {
                        blob: self.source.clone(),
                        dependency: dependency.clone(),
                        source,
                    }
                })?;
                let value = parse_json5(&text, &path)?;
                invocation.resolved_deps.insert(key, value);
            }
        }
        Ok(())
    }
}

fn parse_json5(text: &str, path: &Path) -> Result<Value> {
    json5::from_str(text).map_err(|e| CodegenError::Data {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// `../tables/css_properties.json5` is exposed as `deps.css_properties`.
fn dependency_key(dependency: &str) -> String {
    let file_name = Path::new(dependency)
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| dependency.to_string());
    match file_name.split_once('.') {
        Some((stem, _)) => stem.to_string(),
        None => file_name,
    }
}
