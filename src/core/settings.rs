//! Settings matrix - the target build environment.
//!
//! A `Settings` value identifies the environment a recipe is built for:
//! operating system, compiler family, build type, and CPU architecture.
//! It is supplied by the invoker and is immutable for the duration of
//! one recipe lifecycle; recipes only ever read it.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Target operating system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Os {
    Windows,
    Linux,
    Macos,
    Freebsd,
    Android,
}

impl Os {
    /// Whether the platform's object format makes position-independent
    /// code an implicit property of the toolchain rather than a
    /// per-recipe knob. On such targets the `fPIC` option is meaningless.
    pub fn has_implicit_pic(&self) -> bool {
        matches!(self, Os::Windows)
    }

    /// Canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Os::Windows => "windows",
            Os::Linux => "linux",
            Os::Macos => "macos",
            Os::Freebsd => "freebsd",
            Os::Android => "android",
        }
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build type, following the usual CMake configuration names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuildType {
    Debug,
    Release,
    RelWithDebInfo,
    MinSizeRel,
}

impl BuildType {
    /// Canonical name as understood by build backends.
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildType::Debug => "Debug",
            BuildType::Release => "Release",
            BuildType::RelWithDebInfo => "RelWithDebInfo",
            BuildType::MinSizeRel => "MinSizeRel",
        }
    }
}

impl fmt::Display for BuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The settings matrix for one build invocation.
///
/// Field access goes through the read-only accessors; there are no
/// mutators, so a recipe cannot change the matrix it was given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    os: Os,
    compiler: String,
    build_type: BuildType,
    arch: String,
}

impl Settings {
    /// Create a settings matrix.
    pub fn new(os: Os, compiler: impl Into<String>, build_type: BuildType, arch: impl Into<String>) -> Self {
        Settings {
            os,
            compiler: compiler.into(),
            build_type,
            arch: arch.into(),
        }
    }

    /// Detect settings for the host machine.
    pub fn host(build_type: BuildType) -> Self {
        let (os, compiler) = match std::env::consts::OS {
            "windows" => (Os::Windows, "msvc"),
            "macos" => (Os::Macos, "apple-clang"),
            "freebsd" => (Os::Freebsd, "clang"),
            "android" => (Os::Android, "clang"),
            _ => (Os::Linux, "gcc"),
        };

        Settings::new(os, compiler, build_type, std::env::consts::ARCH)
    }

    /// Target operating system.
    pub fn os(&self) -> Os {
        self.os
    }

    /// Compiler family (gcc, clang, apple-clang, msvc).
    pub fn compiler(&self) -> &str {
        &self.compiler
    }

    /// Build type.
    pub fn build_type(&self) -> BuildType {
        self.build_type
    }

    /// CPU architecture (x86_64, aarch64, ...).
    pub fn arch(&self) -> &str {
        &self.arch
    }

    /// Whether the toolchain uses a multi-configuration generator,
    /// where the build type is chosen at build time rather than at
    /// configure time. Affects the build directory layout.
    pub fn is_multi_config(&self) -> bool {
        self.compiler == "msvc"
    }
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}-{}",
            self.os, self.arch, self.compiler, self.build_type
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_implicit_pic_platforms() {
        assert!(Os::Windows.has_implicit_pic());
        assert!(!Os::Linux.has_implicit_pic());
        assert!(!Os::Macos.has_implicit_pic());
    }

    #[test]
    fn test_multi_config_detection() {
        let msvc = Settings::new(Os::Windows, "msvc", BuildType::Release, "x86_64");
        assert!(msvc.is_multi_config());

        let gcc = Settings::new(Os::Linux, "gcc", BuildType::Release, "x86_64");
        assert!(!gcc.is_multi_config());
    }

    #[test]
    fn test_display() {
        let settings = Settings::new(Os::Linux, "gcc", BuildType::Debug, "aarch64");
        assert_eq!(settings.to_string(), "linux-aarch64-gcc-Debug");
    }

    #[test]
    fn test_host_settings() {
        let settings = Settings::host(BuildType::Release);
        assert_eq!(settings.build_type(), BuildType::Release);
        assert!(!settings.arch().is_empty());
    }

    #[test]
    fn test_serde_round_trip() {
        let settings = Settings::new(Os::Windows, "msvc", BuildType::Release, "x86_64");
        let json = serde_json::to_string(&settings).unwrap();
        let back: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(back, settings);
    }
}
