use std::path::PathBuf;

use bridgegen_ir::UnionNameClash;
use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Result type for analysis (boxed to reduce size on stack)
pub type Result<T> = std::result::Result<T, Box<AnalysisError>>;

/// Source context for error reporting.
///
/// Carries the file text and display name so error factories only need the
/// offending span.
#[derive(Debug, Clone)]
pub struct SourceContext {
    src: String,
    filename: String,
}

impl SourceContext {
    pub fn new(src: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            filename: filename.into(),
        }
    }

    pub fn src(&self) -> &str {
        &self.src
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Create a NamedSource for miette error reporting.
    pub fn named_source(&self) -> NamedSource<String> {
        NamedSource::new(&self.filename, self.src.clone())
    }

    pub fn syntax_error(&self, message: impl Into<String>, span: SourceSpan) -> Box<AnalysisError> {
        Box::new(AnalysisError::Syntax {
            src: self.named_source(),
            span,
            message: message.into(),
        })
    }

    pub fn unknown_type_error(&self, ty: impl Into<String>, span: SourceSpan) -> Box<AnalysisError> {
        Box::new(AnalysisError::UnknownType {
            src: self.named_source(),
            span,
            ty: ty.into(),
        })
    }

    pub fn unsupported_error(
        &self,
        message: impl Into<String>,
        span: SourceSpan,
    ) -> Box<AnalysisError> {
        Box::new(AnalysisError::Unsupported {
            src: self.named_source(),
            span,
            message: message.into(),
        })
    }

    pub fn union_name_clash_error(
        &self,
        clash: UnionNameClash,
        span: SourceSpan,
    ) -> Box<AnalysisError> {
        Box::new(AnalysisError::UnionNameClash {
            src: self.named_source(),
            span,
            clash,
        })
    }

    pub fn missing_constructor_error(
        &self,
        interface: impl Into<String>,
        span: SourceSpan,
    ) -> Box<AnalysisError> {
        Box::new(AnalysisError::MissingConstructor {
            src: self.named_source(),
            span,
            interface: interface.into(),
        })
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum AnalysisError {
    #[error("failed to read '{}'", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{message}")]
    #[diagnostic(code(bridgegen::syntax))]
    Syntax {
        #[source_code]
        src: NamedSource<String>,
        #[label("{message}")]
        span: SourceSpan,
        message: String,
    },

    #[error("unrecognized type '{ty}'")]
    #[diagnostic(
        code(bridgegen::unknown_type),
        help(
            "use a primitive (string, number, boolean, int32, int64, double, object, any, Function), \
             a PascalCase interface name, an array or a union"
        )
    )]
    UnknownType {
        #[source_code]
        src: NamedSource<String>,
        #[label("unknown type")]
        span: SourceSpan,
        ty: String,
    },

    #[error("{message}")]
    #[diagnostic(code(bridgegen::unsupported))]
    Unsupported {
        #[source_code]
        src: NamedSource<String>,
        #[label("not supported here")]
        span: SourceSpan,
        message: String,
    },

    #[error("interface '{interface}' has no constructor defined")]
    #[diagnostic(
        code(bridgegen::missing_constructor),
        help("declare `new(): void;` in the interface, or mark it with @Dictionary() or @Mixin()")
    )]
    MissingConstructor {
        #[source_code]
        src: NamedSource<String>,
        #[label("declared here")]
        span: SourceSpan,
        interface: String,
    },

    #[error("{clash}")]
    #[diagnostic(
        code(bridgegen::union_name_clash),
        help("rename one of the referenced interfaces so the union members stay distinguishable")
    )]
    UnionNameClash {
        #[source_code]
        src: NamedSource<String>,
        #[label("this union")]
        span: SourceSpan,
        clash: UnionNameClash,
    },
}
