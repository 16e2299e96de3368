use std::path::PathBuf;

use bridgegen_core::FileError;
use bridgegen_idl::AnalysisError;
use thiserror::Error;

use crate::cpp::Unmapped;

pub type Result<T> = std::result::Result<T, CodegenError>;

/// Every way a generation run can fail. The first error aborts the run.
#[derive(Debug, Error)]
pub enum CodegenError {
    #[error("failed to analyze '{}'", path.display())]
    Analysis {
        path: PathBuf,
        #[source]
        source: Box<AnalysisError>,
    },

    #[error("unsupported type '{ty}' for '{owner}.{member}': {reason}")]
    UnsupportedType {
        owner: String,
        member: String,
        ty: String,
        reason: String,
    },

    #[error("union '{name}' was not registered during collection")]
    UnregisteredUnion { name: String },

    #[error("cannot resolve dependency '{dependency}' of '{}'", blob.display())]
    DependencyResolution {
        blob: PathBuf,
        dependency: String,
        #[source]
        source: std::io::Error,
    },

    #[error("hash table generator '{program}' failed ({status}): {stderr}")]
    ExternalTool {
        program: String,
        status: String,
        stderr: String,
    },

    #[error(transparent)]
    Filesystem(#[from] FileError),

    #[error("template '{name}': {message}")]
    Template { name: String, message: String },

    #[error("invalid data file '{}': {message}", path.display())]
    Data { path: PathBuf, message: String },
}

impl CodegenError {
    /// Attach the owning declaration and member to a type mapping failure.
    pub(crate) fn unmapped(owner: &str, member: &str, unmapped: Unmapped) -> Self {
        match unmapped {
            Unmapped::NoNativeType { ty, reason } => Self::UnsupportedType {
                owner: owner.to_string(),
                member: member.to_string(),
                ty,
                reason: reason.to_string(),
            },
            Unmapped::UnregisteredUnion { name } => Self::UnregisteredUnion { name },
        }
    }

    /// The analysis error, when this failure came from the IDL front end.
    pub fn as_analysis(&self) -> Option<&AnalysisError> {
        match self {
            Self::Analysis { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}
