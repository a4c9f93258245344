//! Recipe trait and metadata.
//!
//! A recipe describes one buildable unit through a fixed set of named
//! phase hooks. The lifecycle executor calls the hooks in a strict
//! order; each hook sees only the data produced by earlier phases.
//! Default implementations cover the common declarative case, so a
//! minimal recipe only supplies metadata and option declarations.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Result;
use semver::Version;

use crate::backend::Artifact;
use crate::core::layout::Layout;
use crate::core::options::{FinalOptions, OptionDecl, OptionSet};
use crate::core::requirement::Requirement;
use crate::core::settings::Settings;
use crate::report::PackageInfo;

/// Identity and descriptive metadata for a recipe.
///
/// License, author, url, and description are opaque strings; the
/// engine records them but never interprets them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeMetadata {
    name: String,
    version: Version,
    license: Option<String>,
    author: Option<String>,
    url: Option<String>,
    description: Option<String>,
}

impl RecipeMetadata {
    /// Create metadata from the recipe identity.
    pub fn new(name: impl Into<String>, version: Version) -> Self {
        RecipeMetadata {
            name: name.into(),
            version,
            license: None,
            author: None,
            url: None,
            description: None,
        }
    }

    /// Set the license string.
    pub fn with_license(mut self, license: impl Into<String>) -> Self {
        self.license = Some(license.into());
        self
    }

    /// Set the author string.
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Set the project url.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Recipe name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Recipe version.
    pub fn version(&self) -> &Version {
        &self.version
    }

    /// License string, if declared.
    pub fn license(&self) -> Option<&str> {
        self.license.as_deref()
    }

    /// Author string, if declared.
    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    /// Project url, if declared.
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Description, if declared.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// The fixed set of phase hooks a recipe exposes to the lifecycle
/// executor.
pub trait Recipe {
    /// Recipe identity and metadata.
    fn metadata(&self) -> &RecipeMetadata;

    /// Declared options and their defaults.
    fn option_decls(&self) -> BTreeMap<String, OptionDecl>;

    /// Prune options that do not apply to the given settings. Runs
    /// before any option values can be overridden.
    fn config_options(&self, options: &mut OptionSet, settings: &Settings) -> Result<()> {
        options.prune_platform_options(settings);
        Ok(())
    }

    /// Adjust options after values are known. Runs after overrides are
    /// applied; the option set is frozen once this returns.
    fn configure(&self, options: &mut OptionSet) -> Result<()> {
        options.apply_linkage_rule();
        Ok(())
    }

    /// Declare external dependency requirements. Must be pure in the
    /// option set: identical options yield the identical sequence.
    fn requirements(&self, options: &FinalOptions) -> Result<Vec<Requirement>> {
        let _ = options;
        Ok(Vec::new())
    }

    /// Resolve the on-disk layout for this recipe.
    fn layout(&self, root: &Path, settings: &Settings, options: &FinalOptions) -> Layout {
        let _ = options;
        Layout::resolve(root, settings)
    }

    /// Report consumer-facing package metadata from the built
    /// artifacts. Pure transformation; no I/O.
    fn package_info(&self, artifacts: &[Artifact]) -> PackageInfo {
        PackageInfo::from_artifacts(artifacts)
    }
}
