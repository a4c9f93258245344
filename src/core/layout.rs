//! Build layout resolution.
//!
//! Computes the canonical source/build/package directory structure for
//! one recipe from its root directory and settings. Pure path
//! computation; nothing here touches the filesystem.

use std::path::{Path, PathBuf};

use crate::core::settings::Settings;

/// Resolved on-disk layout for one recipe lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    source_dir: PathBuf,
    build_dir: PathBuf,
    generators_dir: PathBuf,
    package_dir: PathBuf,
}

impl Layout {
    /// Resolve the layout for a recipe rooted at `root`.
    ///
    /// Single-configuration toolchains get a per-build-type directory
    /// (`build/Release`); multi-configuration toolchains choose the
    /// configuration at build time, so they share a single `build`
    /// directory. Generated descriptor files live under the build
    /// directory so that wiping it discards them too.
    pub fn resolve(root: &Path, settings: &Settings) -> Self {
        let build_dir = if settings.is_multi_config() {
            root.join("build")
        } else {
            root.join("build").join(settings.build_type().as_str())
        };

        Layout {
            source_dir: root.to_path_buf(),
            generators_dir: build_dir.join("generators"),
            package_dir: root.join("package"),
            build_dir,
        }
    }

    /// Directory holding the recipe's sources.
    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    /// Directory the build backend works in.
    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }

    /// Directory generated descriptor files are written to.
    pub fn generators_dir(&self) -> &Path {
        &self.generators_dir
    }

    /// Install prefix for the package phase.
    pub fn package_dir(&self) -> &Path {
        &self.package_dir
    }
}
