//! Collect phase - reads inputs into blobs and fills the collectors.
//!
//! The collectors are only mutable here. The phase ends by finalizing them,
//! so the emit phase receives a read-only view.

use bridgegen_idl::analyze;
use bridgegen_ir::{CollectionContext, FinalizedCollections, InterfaceBlob};

use crate::{
    discovery::SourceSet,
    error::{CodegenError, Result},
    json::{JsonDataBlob, NAMES_INSTALLER, NAMES_TEMPLATE, TemplateStore},
    pipeline::PipelineOptions,
};

/// Everything the emit phase renders from.
pub struct Collected {
    pub interfaces: Vec<InterfaceBlob>,
    pub data: Vec<JsonDataBlob>,
    pub templates: TemplateStore,
    pub collections: FinalizedCollections,
}

/// Phase that analyzes IDL files, loads data tables and loads templates.
pub struct CollectPhase<'a> {
    options: &'a PipelineOptions,
}

impl<'a> CollectPhase<'a> {
    pub fn new(options: &'a PipelineOptions) -> Self {
        Self { options }
    }

    pub fn name(&self) -> &'static str {
        "collect"
    }

    pub fn run(&self, sources: &SourceSet) -> Result<Collected> {
        let mut ctx = CollectionContext::new();
        let mut interfaces = self.analyze(sources, &mut ctx)?;

        let mut templates = TemplateStore::new(&self.options.templates);
        let mut data = Vec::with_capacity(sources.data.len());
        let mut uses_names = false;
        for path in &sources.data {
            let blob = JsonDataBlob::load(path, &self.options.source, &self.options.dist)?;
            for invocation in &blob.templates {
                templates.load(&invocation.template)?;
                uses_names |= invocation.template == NAMES_TEMPLATE;
            }
            data.push(blob);
        }
        if uses_names {
            templates.load(NAMES_INSTALLER)?;
        }

        let collections = ctx.finalize();
        for blob in &mut interfaces {
            blob.resolve_dictionaries(collections.dictionaries());
        }

        tracing::info!(
            phase = self.name(),
            interfaces = interfaces.len(),
            data = data.len(),
            unions = collections.union_signatures().count(),
            "collected inputs"
        );
        Ok(Collected {
            interfaces,
            data,
            templates,
            collections,
        })
    }

    /// Analyze every IDL file in order, stopping at the first failure.
    pub fn analyze(
        &self,
        sources: &SourceSet,
        ctx: &mut CollectionContext,
    ) -> Result<Vec<InterfaceBlob>> {
        let mut blobs = Vec::with_capacity(sources.idl.len());
        for path in &sources.idl {
            let mut blob = InterfaceBlob::new(
                path,
                &self.options.source,
                &self.options.dist,
                &self.options.idl_suffix,
            );
            analyze(&mut blob, ctx).map_err(|source| CodegenError::Analysis {
                path: path.clone(),
                source,
            })?;
            tracing::debug!(file = %blob.attribution, declarations = blob.declarations.len(), "analyzed");
            blobs.push(blob);
        }
        Ok(blobs)
    }
}
