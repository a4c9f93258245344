//! Package info reporting - consumer-facing metadata for a built package.

use std::path::PathBuf;

use serde::Serialize;

use crate::backend::Artifact;

/// Consumer-facing metadata reported after the package phase.
///
/// The library list preserves build order; directories are relative to
/// the package root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageInfo {
    /// Link names of the produced libraries, in production order.
    pub libs: Vec<String>,

    /// Header directories, relative to the package root.
    pub include_dirs: Vec<PathBuf>,

    /// Library directories, relative to the package root.
    pub lib_dirs: Vec<PathBuf>,
}

impl PackageInfo {
    /// Derive package info from the built artifacts.
    ///
    /// Pure transformation: artifact file stems become link names (a
    /// `lib` prefix is stripped), duplicates are dropped while
    /// preserving first-seen order, and the conventional `include`/
    /// `lib` directories are reported.
    pub fn from_artifacts(artifacts: &[Artifact]) -> Self {
        let mut libs: Vec<String> = Vec::new();
        for artifact in artifacts {
            let link_name = artifact
                .name
                .strip_prefix("lib")
                .filter(|rest| !rest.is_empty())
                .unwrap_or(artifact.name.as_str())
                .to_string();
            if !libs.contains(&link_name) {
                libs.push(link_name);
            }
        }

        PackageInfo {
            libs,
            include_dirs: vec![PathBuf::from("include")],
            lib_dirs: vec![PathBuf::from("lib")],
        }
    }
}
