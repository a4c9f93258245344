//! Slipway - a declarative build-recipe engine for native packages.
//!
//! This crate models how one buildable unit's options, platform
//! settings, dependency requirements, and lifecycle phases combine
//! into a reproducible build: a recipe reacts to a settings matrix,
//! declares its requirements, and is driven through an explicit phase
//! state machine that ends in consumer-facing package metadata.
//! Compiler invocation, version solving, and artifact transport live
//! behind external-collaborator traits.

pub mod backend;
pub mod core;
pub mod generator;
pub mod lifecycle;
pub mod report;
pub mod resolver;
pub mod util;

pub use crate::core::{
    layout::Layout,
    manifest::RecipeManifest,
    options::{FinalOptions, OptionDecl, OptionError, OptionSet, OptionValue},
    recipe::{Recipe, RecipeMetadata},
    requirement::Requirement,
    settings::{BuildType, Os, Settings},
};

pub use crate::backend::{Artifact, BackendError, BuildBackend, CMakeBackend};
pub use crate::generator::{GeneratedDescriptor, Generator};
pub use crate::lifecycle::{
    BuildReport, LifecycleError, LifecycleExecutor, LifecycleResult, LifecycleState, Phase,
};
pub use crate::report::PackageInfo;
pub use crate::resolver::{DependencyResolver, ResolvedDependency, StaticResolver};
