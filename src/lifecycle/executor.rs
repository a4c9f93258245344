//! Lifecycle executor - drives a recipe through its phases.

use std::path::PathBuf;

use crate::backend::{Artifact, BuildBackend};
use crate::core::layout::Layout;
use crate::core::options::{FinalOptions, OptionSet, OptionValue};
use crate::core::recipe::Recipe;
use crate::core::settings::Settings;
use crate::generator::{GeneratedDescriptor, Generator};
use crate::lifecycle::{LifecycleError, LifecycleState, Phase};
use crate::report::PackageInfo;
use crate::resolver::{DependencyRecord, DependencyResolver};

/// Outputs of a completed lifecycle.
#[derive(Debug)]
pub struct BuildReport {
    /// Consumer-facing package metadata.
    pub package_info: PackageInfo,

    /// The finalized option snapshot the build used.
    pub options: FinalOptions,

    /// Artifacts produced by the build phase.
    pub artifacts: Vec<Artifact>,

    /// Descriptor files written by the generate phase.
    pub descriptors: Vec<GeneratedDescriptor>,

    /// The resolved layout the build ran in.
    pub layout: Layout,
}

/// Terminal result of one lifecycle run.
#[derive(Debug)]
pub enum LifecycleResult {
    /// All phases completed; the recipe reached `INFO_REPORTED`.
    Completed(BuildReport),

    /// A phase failed; no later phase ran.
    Failed {
        phase: Phase,
        cause: LifecycleError,
    },
}

impl LifecycleResult {
    /// The terminal lifecycle state.
    pub fn state(&self) -> LifecycleState {
        match self {
            LifecycleResult::Completed(_) => LifecycleState::InfoReported,
            LifecycleResult::Failed { phase, .. } => LifecycleState::Failed(*phase),
        }
    }

    /// Package info, if the lifecycle completed.
    pub fn package_info(&self) -> Option<&PackageInfo> {
        match self {
            LifecycleResult::Completed(report) => Some(&report.package_info),
            LifecycleResult::Failed { .. } => None,
        }
    }

    /// Whether the lifecycle completed successfully.
    pub fn is_completed(&self) -> bool {
        matches!(self, LifecycleResult::Completed(_))
    }
}

/// Drives one recipe through the phase sequence against a build
/// backend and, optionally, a dependency resolver.
///
/// Owns nothing shared: every run builds its state from scratch, so
/// independent recipes can execute on independent threads. There is no
/// retry; the caller re-runs the whole lifecycle if it wants one.
pub struct LifecycleExecutor<'a> {
    recipe: &'a dyn Recipe,
    backend: &'a dyn BuildBackend,
    resolver: Option<&'a dyn DependencyResolver>,
    root: PathBuf,
}

impl<'a> LifecycleExecutor<'a> {
    /// Create an executor for a recipe rooted at `root`.
    pub fn new(
        recipe: &'a dyn Recipe,
        backend: &'a dyn BuildBackend,
        root: impl Into<PathBuf>,
    ) -> Self {
        LifecycleExecutor {
            recipe,
            backend,
            resolver: None,
            root: root.into(),
        }
    }

    /// Attach a dependency resolver. Without one, requirements are
    /// declared in the dependency descriptor but left unresolved.
    pub fn with_resolver(mut self, resolver: &'a dyn DependencyResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Run the full lifecycle for one settings matrix and a set of
    /// option overrides, and return the terminal state.
    pub fn run(&self, settings: &Settings, overrides: &[(String, OptionValue)]) -> LifecycleResult {
        let name = self.recipe.metadata().name().to_string();
        tracing::info!("building {} for {}", name, settings);

        // INIT -> OPTIONS_CONFIGURED
        let mut options = OptionSet::from_decls(self.recipe.option_decls());
        if let Err(cause) = self.recipe.config_options(&mut options, settings) {
            return fail(Phase::ConfigureOptions, LifecycleError::Recipe(cause));
        }

        // OPTIONS_CONFIGURED -> CONFIGURED
        for (option, value) in overrides {
            if let Err(cause) = options.set(option, value.clone()) {
                return fail(Phase::Configure, cause.into());
            }
        }
        if let Err(cause) = self.recipe.configure(&mut options) {
            return fail(Phase::Configure, LifecycleError::Recipe(cause));
        }
        let options = options.finalize();

        // CONFIGURED -> LAYOUT_RESOLVED
        // Layout resolution and requirement declaration have no mutual
        // ordering; both must complete before generation.
        let layout = self.recipe.layout(&self.root, settings, &options);
        let requirements = match self.recipe.requirements(&options) {
            Ok(requirements) => requirements,
            Err(cause) => return fail(Phase::ResolveLayout, LifecycleError::Recipe(cause)),
        };

        let mut dependencies = Vec::with_capacity(requirements.len());
        for requirement in requirements {
            let resolved = match self.resolver {
                Some(resolver) => match resolver.resolve(&requirement) {
                    Ok(resolved) => Some(resolved),
                    Err(cause) => return fail(Phase::ResolveLayout, cause.into()),
                },
                None => None,
            };
            dependencies.push(DependencyRecord {
                requirement,
                resolved,
            });
        }

        // LAYOUT_RESOLVED -> GENERATED
        // The requirement set is frozen from here on.
        let generator = Generator::new(settings, &options, &dependencies, &layout);
        let descriptors = match generator.generate() {
            Ok(descriptors) => descriptors,
            Err(cause) => return fail(Phase::Generate, LifecycleError::Generation(cause)),
        };

        // GENERATED -> BUILT
        if let Err(cause) = self.backend.configure(&layout, &descriptors) {
            return fail(Phase::Build, cause.into());
        }
        let artifacts = match self.backend.build(&layout) {
            Ok(artifacts) => artifacts,
            Err(cause) => return fail(Phase::Build, cause.into()),
        };

        // BUILT -> PACKAGED
        if let Err(cause) = self.backend.install(&layout) {
            return fail(Phase::Package, cause.into());
        }

        // PACKAGED -> INFO_REPORTED
        let package_info = self.recipe.package_info(&artifacts);
        tracing::info!("{} reached {}", name, LifecycleState::InfoReported);

        LifecycleResult::Completed(BuildReport {
            package_info,
            options,
            artifacts,
            descriptors,
            layout,
        })
    }
}

fn fail(phase: Phase, cause: LifecycleError) -> LifecycleResult {
    tracing::error!("phase {} failed: {}", phase, cause);
    LifecycleResult::Failed { phase, cause }
}
