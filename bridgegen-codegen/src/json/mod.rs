//! Template-driven generation from JSON5 data tables.

mod blob;
mod generator;
mod template;

pub use blob::{GenerateOptions, JsonDataBlob, TemplateInvocation};
pub use generator::{
    BINDING_INITIALIZER, DEFINED_PROPERTIES, JsonGenerator, NAMES_INSTALLER, NAMES_TEMPLATE,
};
pub use template::{TemplatePart, TemplateStore};
