//! Build backend interface.
//!
//! The backend is the external collaborator that actually drives the
//! compiler toolchain. The lifecycle executor calls it for the build
//! and package phases and never invokes compilers itself.

pub mod cmake;

use std::path::PathBuf;

use thiserror::Error;

use crate::core::layout::Layout;
use crate::generator::GeneratedDescriptor;

pub use cmake::CMakeBackend;

/// A file produced by the build phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Artifact name (file stem, e.g. `libfuji`).
    pub name: String,

    /// Absolute path to the artifact.
    pub path: PathBuf,
}

/// Error reported by a build backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The backend tool is missing from the environment.
    #[error("`{tool}` not found: {hint}")]
    ToolNotFound { tool: String, hint: String },

    /// The backend ran and reported failure. The output is propagated
    /// verbatim as the failure cause.
    #[error("{operation} failed:\n{output}")]
    Failed { operation: String, output: String },

    /// The invocation was cancelled before completion.
    #[error("{operation} was cancelled")]
    Cancelled { operation: String },

    /// I/O error while driving the backend.
    #[error("i/o error during {operation}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },
}

/// Operations a build backend must expose.
///
/// Calls are synchronous; a long-running backend that supports
/// cancellation reports it as [`BackendError::Cancelled`], which the
/// executor turns into a terminal failure for the current phase.
pub trait BuildBackend {
    /// Configure the build tree from the layout and the generated
    /// descriptor files.
    fn configure(
        &self,
        layout: &Layout,
        descriptors: &[GeneratedDescriptor],
    ) -> Result<(), BackendError>;

    /// Run the build and report the produced artifacts.
    fn build(&self, layout: &Layout) -> Result<Vec<Artifact>, BackendError>;

    /// Install the build products into the package directory.
    fn install(&self, layout: &Layout) -> Result<(), BackendError>;
}
