//! Dependency resolution seam.
//!
//! The engine declares requirements; an external resolver satisfies
//! them. This module defines the trait that resolver implementations
//! plug into, plus a static table-backed resolver useful for tests and
//! for pre-resolved (locked) builds. No version solving happens here.

use std::collections::BTreeMap;
use std::path::PathBuf;

use semver::Version;
use thiserror::Error;

use crate::core::requirement::Requirement;

/// A requirement satisfied by the resolver: the concrete version and,
/// when the package is materialized on disk, its root directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDependency {
    pub name: String,
    pub version: Version,
    pub root: Option<PathBuf>,
}

/// Error satisfying a single requirement.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("no package satisfies `{requirement}`")]
    NotFound { requirement: String },

    #[error("`{name}` {found} does not satisfy `{requirement}`")]
    VersionMismatch {
        name: String,
        found: Version,
        requirement: String,
    },
}

/// External collaborator that satisfies declared requirements.
pub trait DependencyResolver {
    /// Resolve one requirement to a concrete dependency.
    fn resolve(&self, requirement: &Requirement) -> Result<ResolvedDependency, ResolveError>;
}

/// A declared requirement together with its resolution, if any.
///
/// When the lifecycle runs without a resolver the record carries the
/// declared constraint only, and the generated dependency descriptor
/// says so.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyRecord {
    pub requirement: Requirement,
    pub resolved: Option<ResolvedDependency>,
}

/// Resolver backed by a fixed table of known packages.
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    packages: BTreeMap<String, (Version, Option<PathBuf>)>,
}

impl StaticResolver {
    /// Create an empty resolver.
    pub fn new() -> Self {
        StaticResolver::default()
    }

    /// Register a known package version.
    pub fn with_package(mut self, name: impl Into<String>, version: Version) -> Self {
        self.packages.insert(name.into(), (version, None));
        self
    }

    /// Register a known package version with an on-disk root.
    pub fn with_package_at(
        mut self,
        name: impl Into<String>,
        version: Version,
        root: PathBuf,
    ) -> Self {
        self.packages.insert(name.into(), (version, Some(root)));
        self
    }
}

impl DependencyResolver for StaticResolver {
    fn resolve(&self, requirement: &Requirement) -> Result<ResolvedDependency, ResolveError> {
        let (version, root) =
            self.packages
                .get(requirement.name())
                .ok_or_else(|| ResolveError::NotFound {
                    requirement: requirement.to_string(),
                })?;

        if !requirement.matches_version(version) {
            return Err(ResolveError::VersionMismatch {
                name: requirement.name().to_string(),
                found: version.clone(),
                requirement: requirement.to_string(),
            });
        }

        Ok(ResolvedDependency {
            name: requirement.name().to_string(),
            version: version.clone(),
            root: root.clone(),
        })
    }
}
