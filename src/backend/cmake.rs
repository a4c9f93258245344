//! CMake build backend.
//!
//! Drives an external CMake installation through its command line:
//! configure with the generated toolchain descriptor injected, build,
//! and install into the package directory.

use std::path::{Path, PathBuf};

use crate::backend::{Artifact, BackendError, BuildBackend};
use crate::core::layout::Layout;
use crate::generator::{DescriptorKind, GeneratedDescriptor};
use crate::util::process::{find_tool, ProcessBuilder};

const LIB_EXTENSIONS: &[&str] = &["a", "so", "dylib", "lib", "dll"];

/// Build backend that shells out to `cmake`.
#[derive(Debug, Clone, Default)]
pub struct CMakeBackend {
    build_config: Option<String>,
    jobs: Option<usize>,
    extra_args: Vec<String>,
}

impl CMakeBackend {
    /// Create a backend with default behavior.
    pub fn new() -> Self {
        CMakeBackend::default()
    }

    /// Set the configuration for multi-config generators
    /// (`--config Release`).
    pub fn with_config(mut self, config: impl Into<String>) -> Self {
        self.build_config = Some(config.into());
        self
    }

    /// Set the parallel job count.
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = Some(jobs);
        self
    }

    /// Add extra arguments to the configure invocation.
    pub fn with_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.extra_args.extend(args.into_iter().map(|s| s.into()));
        self
    }

    fn cmake(&self) -> Result<PathBuf, BackendError> {
        find_tool("cmake").ok_or_else(|| BackendError::ToolNotFound {
            tool: "cmake".to_string(),
            hint: "install CMake and ensure it is on PATH".to_string(),
        })
    }

    fn configure_args(&self, layout: &Layout, descriptors: &[GeneratedDescriptor]) -> Vec<String> {
        let mut args = vec![
            "-S".to_string(),
            layout.source_dir().display().to_string(),
            "-B".to_string(),
            layout.build_dir().display().to_string(),
        ];

        for descriptor in descriptors {
            if descriptor.kind == DescriptorKind::Toolchain {
                args.push(format!(
                    "-DCMAKE_TOOLCHAIN_FILE={}",
                    descriptor.path.display()
                ));
            }
        }

        args.extend(self.extra_args.iter().cloned());
        args
    }

    fn build_args(&self, layout: &Layout) -> Vec<String> {
        let mut args = vec![
            "--build".to_string(),
            layout.build_dir().display().to_string(),
            "--parallel".to_string(),
        ];
        if let Some(jobs) = self.jobs {
            args.push(jobs.to_string());
        }
        if let Some(ref config) = self.build_config {
            args.push("--config".to_string());
            args.push(config.clone());
        }
        args
    }

    fn install_args(&self, layout: &Layout) -> Vec<String> {
        let mut args = vec![
            "--install".to_string(),
            layout.build_dir().display().to_string(),
            "--prefix".to_string(),
            layout.package_dir().display().to_string(),
        ];
        if let Some(ref config) = self.build_config {
            args.push("--config".to_string());
            args.push(config.clone());
        }
        args
    }

    fn run(&self, operation: &str, args: &[String]) -> Result<(), BackendError> {
        let cmake = self.cmake()?;
        tracing::info!("running cmake {}", args.join(" "));

        let output = ProcessBuilder::new(cmake)
            .args(args)
            .exec()
            .map_err(|e| BackendError::Io {
                operation: operation.to_string(),
                source: std::io::Error::other(e),
            })?;

        if !output.status.success() {
            return Err(BackendError::Failed {
                operation: operation.to_string(),
                output: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        Ok(())
    }

    /// Scan the build tree for produced libraries.
    fn find_artifacts(&self, layout: &Layout) -> Result<Vec<Artifact>, BackendError> {
        let mut search_dirs = vec![layout.build_dir().to_path_buf(), layout.build_dir().join("lib")];
        if let Some(ref config) = self.build_config {
            search_dirs.push(layout.build_dir().join(config));
        }

        let mut artifacts = Vec::new();
        for dir in &search_dirs {
            if !dir.is_dir() {
                continue;
            }
            collect_libraries(dir, &mut artifacts).map_err(|source| BackendError::Io {
                operation: "artifact scan".to_string(),
                source,
            })?;
        }

        artifacts.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(artifacts)
    }
}

fn collect_libraries(dir: &Path, artifacts: &mut Vec<Artifact>) -> std::io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();

        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            continue;
        };
        if !LIB_EXTENSIONS.contains(&ext) {
            continue;
        }

        let name = path
            .file_stem()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        artifacts.push(Artifact { name, path });
    }
    Ok(())
}

impl BuildBackend for CMakeBackend {
    fn configure(
        &self,
        layout: &Layout,
        descriptors: &[GeneratedDescriptor],
    ) -> Result<(), BackendError> {
        self.run("cmake configure", &self.configure_args(layout, descriptors))
    }

    fn build(&self, layout: &Layout) -> Result<Vec<Artifact>, BackendError> {
        self.run("cmake build", &self.build_args(layout))?;
        self.find_artifacts(layout)
    }

    fn install(&self, layout: &Layout) -> Result<(), BackendError> {
        self.run("cmake install", &self.install_args(layout))
    }
}
