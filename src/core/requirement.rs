//! Requirement declarations.
//!
//! A `Requirement` states a demand for an external dependency by name
//! and version constraint. This crate only declares demand; satisfying
//! it is the job of an external resolver.

use std::fmt;

use anyhow::{bail, Context, Result};
use semver::{Version, VersionReq};

/// A declared dependency: a name plus a version constraint.
///
/// Declaration order is preserved downstream for deterministic
/// descriptor output, but order does not encode priority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    name: String,
    version_req: VersionReq,
}

impl Requirement {
    /// Create a requirement with an explicit version constraint.
    pub fn new(name: impl Into<String>, version_req: VersionReq) -> Self {
        Requirement {
            name: name.into(),
            version_req,
        }
    }

    /// Create a requirement pinned to an exact version.
    pub fn pinned(name: impl Into<String>, version: &str) -> Result<Self> {
        let version = Version::parse(version)
            .with_context(|| format!("invalid version `{}`", version))?;
        let version_req = VersionReq::parse(&format!("={}", version))
            .expect("exact requirement from a parsed version is valid");
        Ok(Requirement::new(name, version_req))
    }

    /// Parse a `name/version` reference, e.g. `fmt/10.0.0`.
    pub fn parse(reference: &str) -> Result<Self> {
        let Some((name, version)) = reference.split_once('/') else {
            bail!("invalid requirement reference `{}` (expected `name/version`)", reference);
        };

        if name.is_empty() {
            bail!("invalid requirement reference `{}` (empty name)", reference);
        }

        Requirement::pinned(name, version)
            .with_context(|| format!("invalid requirement reference `{}`", reference))
    }

    /// The dependency name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The version constraint.
    pub fn version_req(&self) -> &VersionReq {
        &self.version_req
    }

    /// Check whether a concrete version satisfies this requirement.
    pub fn matches_version(&self, version: &Version) -> bool {
        self.version_req.matches(version)
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.version_req)
    }
}
