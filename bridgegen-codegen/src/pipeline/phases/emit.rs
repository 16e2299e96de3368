//! Emit phase - renders artifacts from the finalized collectors.

use bridgegen_core::GeneratedArtifact;
use bridgegen_ir::{DeclarationKind, InterfaceBlob, NamesInstallSet};

use super::Collected;
use crate::{
    cpp::{InterfaceGenerator, UnionGenerator},
    error::Result,
    hash_table::HashTableGenerator,
    json::JsonGenerator,
    pipeline::PipelineOptions,
};

/// Phase that renders every artifact in memory.
///
/// Order: interface bindings, union wrappers, template outputs and finally
/// the names installer.
pub struct EmitPhase<'a> {
    options: &'a PipelineOptions,
    hash_table: &'a dyn HashTableGenerator,
}

impl<'a> EmitPhase<'a> {
    pub fn new(options: &'a PipelineOptions, hash_table: &'a dyn HashTableGenerator) -> Self {
        Self {
            options,
            hash_table,
        }
    }

    pub fn name(&self) -> &'static str {
        "emit"
    }

    pub fn run(&self, collected: &Collected) -> Result<Vec<GeneratedArtifact>> {
        let collections = &collected.collections;
        let mut artifacts = Vec::new();

        for blob in collected.interfaces.iter().filter(|b| has_bindings(b)) {
            artifacts.push(InterfaceGenerator::new(blob, collections).generate()?);
        }

        let unions = UnionGenerator::new(collections, &self.options.dist);
        for signature in collections.union_signatures() {
            artifacts.push(unions.generate(signature)?);
        }

        let json = JsonGenerator::new(
            &collected.templates,
            collections,
            self.hash_table,
            &self.options.dist,
        );
        let mut names = NamesInstallSet::default();
        for blob in &collected.data {
            artifacts.extend(json.generate(blob, &mut names)?);
        }
        if let Some(installer) = json.names_installer(names)? {
            artifacts.push(installer);
        }

        tracing::info!(phase = self.name(), artifacts = artifacts.len(), "rendered artifacts");
        Ok(artifacts)
    }
}

/// Mixin-only files contribute members elsewhere and emit nothing themselves.
fn has_bindings(blob: &InterfaceBlob) -> bool {
    blob.interfaces().any(|i| i.kind != DeclarationKind::Mixin) || blob.functions().next().is_some()
}
