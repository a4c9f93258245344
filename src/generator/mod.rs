//! Generator adapter - descriptor files for the build backend.
//!
//! Translates the finalized options, declared dependencies, and
//! settings into two descriptor files under the layout's generators
//! directory: a machine-readable dependency descriptor and a toolchain
//! descriptor the backend injects into its configure step. Generation
//! is idempotent; identical inputs produce byte-identical files.

use std::path::PathBuf;

use anyhow::Result;
use serde::Serialize;

use crate::core::layout::Layout;
use crate::core::options::{FinalOptions, OptionValue, FPIC, SHARED};
use crate::core::settings::Settings;
use crate::resolver::DependencyRecord;
use crate::util::fs::{ensure_dir, write_file};

/// File name of the dependency descriptor.
pub const DEPS_FILE: &str = "slipway-deps.json";

/// File name of the toolchain descriptor.
pub const TOOLCHAIN_FILE: &str = "slipway-toolchain.cmake";

/// Class of a generated descriptor file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorKind {
    /// Declared/resolved dependency listing for the backend.
    Dependencies,

    /// Compiler and option translation for the backend.
    Toolchain,
}

/// A descriptor file written by the generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedDescriptor {
    pub kind: DescriptorKind,
    pub path: PathBuf,
}

/// One dependency entry in the dependency descriptor.
#[derive(Debug, Serialize)]
struct DepEntry<'a> {
    name: &'a str,
    constraint: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    root: Option<&'a std::path::Path>,
}

#[derive(Debug, Serialize)]
struct DepsDescriptor<'a> {
    requirements: Vec<DepEntry<'a>>,
}

/// Descriptor generator for one finalized recipe state.
///
/// All inputs are the frozen outputs of earlier phases; the generator
/// cannot be constructed before the option set is finalized and the
/// layout resolved.
pub struct Generator<'a> {
    settings: &'a Settings,
    options: &'a FinalOptions,
    dependencies: &'a [DependencyRecord],
    layout: &'a Layout,
}

impl<'a> Generator<'a> {
    /// Create a generator over finalized phase outputs.
    pub fn new(
        settings: &'a Settings,
        options: &'a FinalOptions,
        dependencies: &'a [DependencyRecord],
        layout: &'a Layout,
    ) -> Self {
        Generator {
            settings,
            options,
            dependencies,
            layout,
        }
    }

    /// Write both descriptor files into the generators directory.
    ///
    /// Fails without leaving a partial set behind only insofar as each
    /// file is written atomically by the OS; on any error the whole
    /// generate phase is reported as failed and the build never runs.
    pub fn generate(&self) -> Result<Vec<GeneratedDescriptor>> {
        ensure_dir(self.layout.generators_dir())?;

        let deps_path = self.layout.generators_dir().join(DEPS_FILE);
        write_file(&deps_path, &self.deps_descriptor()?)?;
        tracing::debug!("wrote dependency descriptor to {}", deps_path.display());

        let toolchain_path = self.layout.generators_dir().join(TOOLCHAIN_FILE);
        write_file(&toolchain_path, &self.toolchain_descriptor())?;
        tracing::debug!("wrote toolchain descriptor to {}", toolchain_path.display());

        Ok(vec![
            GeneratedDescriptor {
                kind: DescriptorKind::Dependencies,
                path: deps_path,
            },
            GeneratedDescriptor {
                kind: DescriptorKind::Toolchain,
                path: toolchain_path,
            },
        ])
    }

    /// Render the dependency descriptor. Entries keep declaration
    /// order; resolved version and root appear when a resolver ran.
    fn deps_descriptor(&self) -> Result<String> {
        let requirements = self
            .dependencies
            .iter()
            .map(|record| DepEntry {
                name: record.requirement.name(),
                constraint: record.requirement.version_req().to_string(),
                version: record
                    .resolved
                    .as_ref()
                    .map(|resolved| resolved.version.to_string()),
                root: record
                    .resolved
                    .as_ref()
                    .and_then(|resolved| resolved.root.as_deref()),
            })
            .collect();

        let mut text = serde_json::to_string_pretty(&DepsDescriptor { requirements })?;
        text.push('\n');
        Ok(text)
    }

    /// Render the toolchain descriptor: settings and present options
    /// translated to backend cache variables, in a fixed order.
    fn toolchain_descriptor(&self) -> String {
        let mut lines = vec!["# Toolchain descriptor generated by slipway. Do not edit.".to_string()];

        lines.push(format!("# target: {}", self.settings));
        lines.push(format!(
            "set(CMAKE_SYSTEM_PROCESSOR {})",
            self.settings.arch()
        ));

        // Multi-config generators pick the configuration at build time.
        if !self.settings.is_multi_config() {
            lines.push(format!(
                "set(CMAKE_BUILD_TYPE {} CACHE STRING \"\" FORCE)",
                self.settings.build_type()
            ));
        }

        for (name, value) in self.options.present() {
            match name {
                SHARED => lines.push(format!(
                    "set(BUILD_SHARED_LIBS {} CACHE BOOL \"\" FORCE)",
                    cmake_bool(value)
                )),
                FPIC => lines.push(format!(
                    "set(CMAKE_POSITION_INDEPENDENT_CODE {} CACHE BOOL \"\" FORCE)",
                    cmake_bool(value)
                )),
                _ => lines.push(format!(
                    "set(SLIPWAY_OPTION_{} {} CACHE STRING \"\" FORCE)",
                    name.to_uppercase(),
                    value
                )),
            }
        }

        let mut text = lines.join("\n");
        text.push('\n');
        text
    }
}

fn cmake_bool(value: &OptionValue) -> &'static str {
    match value.as_bool() {
        Some(true) => "ON",
        _ => "OFF",
    }
}
