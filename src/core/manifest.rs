//! Declarative recipe manifests.
//!
//! A `RecipeManifest` is a TOML description of a recipe: identity,
//! option declarations with defaults, and requirement references. It
//! implements [`Recipe`] with the default phase hooks, covering
//! recipes that are pure configuration.
//!
//! ```toml
//! [recipe]
//! name = "fuji"
//! version = "0.1.0"
//! license = "BSD-2-Clause"
//! requires = ["fmt/10.0.0", "sdl/2.26.1"]
//!
//! [options]
//! shared = true
//! fPIC = true
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use semver::Version;
use serde::Deserialize;

use crate::core::options::{FinalOptions, OptionDecl};
use crate::core::recipe::{Recipe, RecipeMetadata};
use crate::core::requirement::Requirement;

/// Raw manifest document as it appears on disk.
#[derive(Debug, Deserialize)]
struct ManifestDoc {
    recipe: RecipeSection,

    #[serde(default)]
    options: BTreeMap<String, OptionSpec>,
}

#[derive(Debug, Deserialize)]
struct RecipeSection {
    name: String,
    version: String,

    #[serde(default)]
    license: Option<String>,

    #[serde(default)]
    author: Option<String>,

    #[serde(default)]
    url: Option<String>,

    #[serde(default)]
    description: Option<String>,

    #[serde(default)]
    requires: Vec<String>,
}

/// Option declaration as written in the manifest.
///
/// Booleans use the shorthand `shared = true` (the value is the
/// default); enumerated options spell out choices and default.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OptionSpec {
    Bool(bool),
    Choice {
        choices: Vec<String>,
        default: String,
    },
}

impl OptionSpec {
    fn into_decl(self, name: &str) -> Result<OptionDecl> {
        match self {
            OptionSpec::Bool(default) => Ok(OptionDecl::Bool { default }),
            OptionSpec::Choice { choices, default } => {
                if !choices.iter().any(|c| c == &default) {
                    bail!(
                        "default `{}` for option `{}` is not one of its choices",
                        default,
                        name
                    );
                }
                Ok(OptionDecl::Choice { choices, default })
            }
        }
    }
}

/// A recipe loaded from a declarative TOML manifest.
#[derive(Debug, Clone)]
pub struct RecipeManifest {
    metadata: RecipeMetadata,
    decls: BTreeMap<String, OptionDecl>,
    requires: Vec<Requirement>,
}

impl RecipeManifest {
    /// Parse a manifest from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let doc: ManifestDoc = toml::from_str(text).context("failed to parse recipe manifest")?;

        let version = parse_version(&doc.recipe.version)
            .with_context(|| format!("invalid version for recipe `{}`", doc.recipe.name))?;

        let mut metadata = RecipeMetadata::new(&doc.recipe.name, version);
        if let Some(license) = doc.recipe.license {
            metadata = metadata.with_license(license);
        }
        if let Some(author) = doc.recipe.author {
            metadata = metadata.with_author(author);
        }
        if let Some(url) = doc.recipe.url {
            metadata = metadata.with_url(url);
        }
        if let Some(description) = doc.recipe.description {
            metadata = metadata.with_description(description);
        }

        let mut decls = BTreeMap::new();
        for (name, spec) in doc.options {
            let decl = spec.into_decl(&name)?;
            decls.insert(name, decl);
        }

        // Parsed eagerly so malformed references fail at load time, not
        // in the middle of a lifecycle run.
        let requires = doc
            .recipe
            .requires
            .iter()
            .map(|reference| Requirement::parse(reference))
            .collect::<Result<Vec<_>>>()?;

        Ok(RecipeManifest {
            metadata,
            decls,
            requires,
        })
    }

    /// Load a manifest from a file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read manifest at {}", path.display()))?;
        Self::from_toml_str(&text)
            .with_context(|| format!("failed to load manifest at {}", path.display()))
    }
}

impl Recipe for RecipeManifest {
    fn metadata(&self) -> &RecipeMetadata {
        &self.metadata
    }

    fn option_decls(&self) -> BTreeMap<String, OptionDecl> {
        self.decls.clone()
    }

    fn requirements(&self, _options: &FinalOptions) -> Result<Vec<Requirement>> {
        Ok(self.requires.clone())
    }
}

/// Parse a version, padding missing components (`0.1` -> `0.1.0`).
/// Recipe versions in the wild are frequently two-component.
fn parse_version(raw: &str) -> Result<Version> {
    if let Ok(version) = Version::parse(raw) {
        return Ok(version);
    }

    let padded = match raw.matches('.').count() {
        0 => format!("{}.0.0", raw),
        1 => format!("{}.0", raw),
        _ => raw.to_string(),
    };

    Version::parse(&padded).with_context(|| format!("invalid version `{}`", raw))
}
