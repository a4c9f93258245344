//! Lifecycle failure causes.

use thiserror::Error;

use crate::backend::BackendError;
use crate::core::options::OptionError;
use crate::resolver::ResolveError;

/// Cause of a lifecycle failure, paired with the failing phase in the
/// terminal `FAILED(phase, cause)` result. No phase swallows errors;
/// every failure surfaces here.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// Invalid option access or assignment.
    #[error(transparent)]
    Option(#[from] OptionError),

    /// The external resolver could not satisfy a declared requirement.
    #[error("unresolved dependency: {0}")]
    UnresolvedDependency(#[from] ResolveError),

    /// Descriptor serialization or write failed.
    #[error("descriptor generation failed: {0:#}")]
    Generation(anyhow::Error),

    /// The build backend reported failure; the cause is propagated
    /// verbatim.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// A recipe phase hook returned an error.
    #[error("recipe hook failed: {0:#}")]
    Recipe(anyhow::Error),
}
