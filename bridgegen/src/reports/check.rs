//! Check command report data structures.

use std::path::PathBuf;

use super::output::{Output, Report};

/// Report data from analysis-only runs.
#[derive(Debug)]
pub struct CheckReport {
    /// Source root that was checked.
    pub source: PathBuf,
    pub idl_files: usize,
    pub declarations: usize,
    /// Distinct names in the property registry.
    pub properties: usize,
    pub data_files: usize,
    /// Union wrapper class names in generation order.
    pub unions: Vec<String>,
}

impl Report for CheckReport {
    fn render(&self, out: &mut dyn Output) {
        out.preformatted(&format!("✓ {} is valid", self.source.display()));
        out.newline();
        out.key_value_indented("declaration files", &self.idl_files.to_string());
        out.key_value_indented("declarations", &self.declarations.to_string());
        out.key_value_indented("properties", &self.properties.to_string());
        out.key_value_indented("data files", &self.data_files.to_string());

        if !self.unions.is_empty() {
            out.newline();
            out.section(&format!("Unions ({})", self.unions.len()));
            for union in &self.unions {
                out.list_item(union);
            }
        }
    }
}
