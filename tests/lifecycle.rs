//! End-to-end lifecycle scenarios against a scripted build backend.

use std::collections::BTreeMap;
use std::sync::Mutex;

use semver::Version;
use tempfile::TempDir;

use slipway::backend::{BackendError, BuildBackend};
use slipway::core::options::{OptionDecl, OptionSet, FPIC, SHARED};
use slipway::generator::{GeneratedDescriptor, DEPS_FILE, TOOLCHAIN_FILE};
use slipway::lifecycle::LifecycleState;
use slipway::resolver::StaticResolver;
use slipway::{
    Artifact, BuildType, Layout, LifecycleError, LifecycleExecutor, LifecycleResult, OptionValue,
    Os, Phase, Recipe, RecipeManifest, RecipeMetadata, Settings,
};

const FUJI: &str = r#"
    [recipe]
    name = "fuji"
    version = "0.1"
    license = "BSD-2-Clause"
    author = "karei <mail@karei.dev>"
    description = "Fuji game engine"
    requires = ["fmt/10.0.0", "sdl/2.26.1"]

    [options]
    shared = true
    fPIC = true
"#;

/// Backend double that records calls and fails on demand.
#[derive(Default)]
struct ScriptedBackend {
    calls: Mutex<Vec<&'static str>>,
    fail_configure: bool,
    fail_build: bool,
    fail_install: bool,
}

impl ScriptedBackend {
    fn new() -> Self {
        ScriptedBackend::default()
    }

    fn failing_build() -> Self {
        ScriptedBackend {
            fail_build: true,
            ..ScriptedBackend::default()
        }
    }

    fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: &'static str) {
        self.calls.lock().unwrap().push(call);
    }

    fn scripted_failure(operation: &str) -> BackendError {
        BackendError::Failed {
            operation: operation.to_string(),
            output: "scripted failure".to_string(),
        }
    }
}

impl BuildBackend for ScriptedBackend {
    fn configure(
        &self,
        _layout: &Layout,
        descriptors: &[GeneratedDescriptor],
    ) -> Result<(), BackendError> {
        self.record("configure");
        assert_eq!(descriptors.len(), 2, "both descriptors reach the backend");
        if self.fail_configure {
            return Err(Self::scripted_failure("configure"));
        }
        Ok(())
    }

    fn build(&self, layout: &Layout) -> Result<Vec<Artifact>, BackendError> {
        self.record("build");
        if self.fail_build {
            return Err(Self::scripted_failure("build"));
        }
        Ok(vec![Artifact {
            name: "libfuji".to_string(),
            path: layout.build_dir().join("libfuji.so"),
        }])
    }

    fn install(&self, _layout: &Layout) -> Result<(), BackendError> {
        self.record("install");
        if self.fail_install {
            return Err(Self::scripted_failure("install"));
        }
        Ok(())
    }
}

/// Install the log subscriber once; phase logs show up under
/// `RUST_LOG=slipway=debug` via the test writer.
fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn fuji() -> RecipeManifest {
    init_logging();
    RecipeManifest::from_toml_str(FUJI).unwrap()
}

fn linux() -> Settings {
    Settings::new(Os::Linux, "gcc", BuildType::Release, "x86_64")
}

fn windows() -> Settings {
    Settings::new(Os::Windows, "msvc", BuildType::Release, "x86_64")
}

fn full_resolver() -> StaticResolver {
    StaticResolver::new()
        .with_package("fmt", Version::new(10, 0, 0))
        .with_package("sdl", Version::new(2, 26, 1))
}

#[test]
fn test_full_lifecycle_reaches_info_reported() {
    let tmp = TempDir::new().unwrap();
    let recipe = fuji();
    let backend = ScriptedBackend::new();
    let resolver = full_resolver();

    let executor = LifecycleExecutor::new(&recipe, &backend, tmp.path()).with_resolver(&resolver);
    let result = executor.run(&linux(), &[]);

    assert_eq!(result.state(), LifecycleState::InfoReported);
    assert_eq!(backend.calls(), vec!["configure", "build", "install"]);

    let LifecycleResult::Completed(report) = result else {
        panic!("expected completion");
    };
    assert_eq!(report.package_info.libs, vec!["fuji"]);
    assert_eq!(report.artifacts.len(), 1);

    // Descriptor files landed in the generators directory.
    assert!(report.layout.generators_dir().join(DEPS_FILE).is_file());
    assert!(report.layout.generators_dir().join(TOOLCHAIN_FILE).is_file());

    let deps = std::fs::read_to_string(report.layout.generators_dir().join(DEPS_FILE)).unwrap();
    assert!(deps.find("\"fmt\"").unwrap() < deps.find("\"sdl\"").unwrap());
    assert!(deps.contains("\"version\": \"10.0.0\""));
}

#[test]
fn test_scenario_windows_defaults_drop_fpic() {
    // {os: windows, compiler: msvc, Release, x86_64} with defaults
    // {shared: true, fPIC: true}: fPIC is removed by the platform rule
    // and again, redundantly, by the linkage rule.
    let tmp = TempDir::new().unwrap();
    let recipe = fuji();
    let backend = ScriptedBackend::new();
    let resolver = full_resolver();

    let executor = LifecycleExecutor::new(&recipe, &backend, tmp.path()).with_resolver(&resolver);
    let result = executor.run(&windows(), &[]);

    let LifecycleResult::Completed(report) = result else {
        panic!("expected completion");
    };
    assert_eq!(report.options.get_bool(SHARED), Ok(true));
    assert!(!report.options.is_present(FPIC));
    assert_eq!(report.options.len(), 1);
}

#[test]
fn test_scenario_linux_static_keeps_both_options() {
    // {os: linux}, {shared: false, fPIC: true}: neither removal rule
    // fires.
    let tmp = TempDir::new().unwrap();
    let recipe = fuji();
    let backend = ScriptedBackend::new();
    let resolver = full_resolver();

    let executor = LifecycleExecutor::new(&recipe, &backend, tmp.path()).with_resolver(&resolver);
    let overrides = vec![(SHARED.to_string(), OptionValue::Bool(false))];
    let result = executor.run(&linux(), &overrides);

    let LifecycleResult::Completed(report) = result else {
        panic!("expected completion");
    };
    assert_eq!(report.options.get_bool(SHARED), Ok(false));
    assert_eq!(report.options.get_bool(FPIC), Ok(true));
}

#[test]
fn test_unresolved_dependency_fails_before_generate() {
    let tmp = TempDir::new().unwrap();
    let recipe = fuji();
    let backend = ScriptedBackend::new();
    // Knows fmt but not sdl.
    let resolver = StaticResolver::new().with_package("fmt", Version::new(10, 0, 0));

    let executor = LifecycleExecutor::new(&recipe, &backend, tmp.path()).with_resolver(&resolver);
    let result = executor.run(&linux(), &[]);

    assert_eq!(result.state(), LifecycleState::Failed(Phase::ResolveLayout));
    let LifecycleResult::Failed { cause, .. } = result else {
        panic!("expected failure");
    };
    assert!(matches!(cause, LifecycleError::UnresolvedDependency(_)));
    assert!(backend.calls().is_empty());
    // No descriptor was generated.
    let layout = Layout::resolve(tmp.path(), &linux());
    assert!(!layout.generators_dir().join(DEPS_FILE).exists());
}

#[test]
fn test_backend_failure_during_build_is_terminal() {
    let tmp = TempDir::new().unwrap();
    let recipe = fuji();
    let backend = ScriptedBackend::failing_build();

    let executor = LifecycleExecutor::new(&recipe, &backend, tmp.path());
    let result = executor.run(&linux(), &[]);

    assert_eq!(result.state(), LifecycleState::Failed(Phase::Build));
    assert!(result.package_info().is_none());
    // Install never ran.
    assert_eq!(backend.calls(), vec!["configure", "build"]);

    let LifecycleResult::Failed { cause, .. } = result else {
        panic!("expected failure");
    };
    assert!(cause.to_string().contains("scripted failure"));
}

#[test]
fn test_backend_configure_failure_is_build_phase() {
    let tmp = TempDir::new().unwrap();
    let recipe = fuji();
    let backend = ScriptedBackend {
        fail_configure: true,
        ..ScriptedBackend::default()
    };

    let executor = LifecycleExecutor::new(&recipe, &backend, tmp.path());
    let result = executor.run(&linux(), &[]);

    assert_eq!(result.state(), LifecycleState::Failed(Phase::Build));
    assert_eq!(backend.calls(), vec!["configure"]);
}

#[test]
fn test_install_failure_is_package_phase() {
    let tmp = TempDir::new().unwrap();
    let recipe = fuji();
    let backend = ScriptedBackend {
        fail_install: true,
        ..ScriptedBackend::default()
    };

    let executor = LifecycleExecutor::new(&recipe, &backend, tmp.path());
    let result = executor.run(&linux(), &[]);

    assert_eq!(result.state(), LifecycleState::Failed(Phase::Package));
    assert!(result.package_info().is_none());
    assert_eq!(backend.calls(), vec!["configure", "build", "install"]);
}

#[test]
fn test_generation_failure_blocks_backend() {
    let tmp = TempDir::new().unwrap();
    let recipe = fuji();
    let backend = ScriptedBackend::new();

    // A file where the build directory belongs makes descriptor
    // generation fail.
    std::fs::write(tmp.path().join("build"), "blocker").unwrap();

    let executor = LifecycleExecutor::new(&recipe, &backend, tmp.path());
    let result = executor.run(&linux(), &[]);

    assert_eq!(result.state(), LifecycleState::Failed(Phase::Generate));
    assert!(backend.calls().is_empty());
}

#[test]
fn test_invalid_override_fails_in_configure_phase() {
    let tmp = TempDir::new().unwrap();
    let recipe = fuji();
    let backend = ScriptedBackend::new();

    let executor = LifecycleExecutor::new(&recipe, &backend, tmp.path());
    let overrides = vec![("no_such_option".to_string(), OptionValue::Bool(true))];
    let result = executor.run(&linux(), &overrides);

    assert_eq!(result.state(), LifecycleState::Failed(Phase::Configure));
    assert!(backend.calls().is_empty());
}

#[test]
fn test_overriding_pruned_option_fails() {
    // fPIC does not exist on windows once config_options ran, and an
    // override cannot resurrect it.
    let tmp = TempDir::new().unwrap();
    let recipe = fuji();
    let backend = ScriptedBackend::new();

    let executor = LifecycleExecutor::new(&recipe, &backend, tmp.path());
    let overrides = vec![(FPIC.to_string(), OptionValue::Bool(false))];
    let result = executor.run(&windows(), &overrides);

    assert_eq!(result.state(), LifecycleState::Failed(Phase::Configure));
    let LifecycleResult::Failed { cause, .. } = result else {
        panic!("expected failure");
    };
    assert!(cause.to_string().contains("fPIC"));
}

#[test]
fn test_descriptors_identical_across_reruns() {
    let tmp = TempDir::new().unwrap();
    let recipe = fuji();
    let resolver = full_resolver();
    let settings = linux();

    let run = || {
        let backend = ScriptedBackend::new();
        let executor =
            LifecycleExecutor::new(&recipe, &backend, tmp.path()).with_resolver(&resolver);
        let result = executor.run(&settings, &[]);
        assert!(result.is_completed());
        let layout = Layout::resolve(tmp.path(), &settings);
        (
            std::fs::read(layout.generators_dir().join(DEPS_FILE)).unwrap(),
            std::fs::read(layout.generators_dir().join(TOOLCHAIN_FILE)).unwrap(),
        )
    };

    let (deps_first, toolchain_first) = run();
    let (deps_second, toolchain_second) = run();
    assert_eq!(deps_first, deps_second);
    assert_eq!(toolchain_first, toolchain_second);
}

/// Recipe double whose hooks fail on demand.
struct FailingRecipe {
    inner: RecipeManifest,
    fail_at: Phase,
}

impl FailingRecipe {
    fn new(fail_at: Phase) -> Self {
        FailingRecipe {
            inner: fuji(),
            fail_at,
        }
    }

    fn trip(&self, phase: Phase) -> anyhow::Result<()> {
        if self.fail_at == phase {
            anyhow::bail!("injected failure in {}", phase);
        }
        Ok(())
    }
}

impl Recipe for FailingRecipe {
    fn metadata(&self) -> &RecipeMetadata {
        self.inner.metadata()
    }

    fn option_decls(&self) -> BTreeMap<String, OptionDecl> {
        self.inner.option_decls()
    }

    fn config_options(
        &self,
        options: &mut OptionSet,
        settings: &Settings,
    ) -> anyhow::Result<()> {
        self.trip(Phase::ConfigureOptions)?;
        self.inner.config_options(options, settings)
    }

    fn configure(&self, options: &mut OptionSet) -> anyhow::Result<()> {
        self.trip(Phase::Configure)?;
        self.inner.configure(options)
    }

    fn requirements(
        &self,
        options: &slipway::FinalOptions,
    ) -> anyhow::Result<Vec<slipway::Requirement>> {
        self.trip(Phase::ResolveLayout)?;
        self.inner.requirements(options)
    }
}

#[test]
fn test_no_phase_runs_after_a_failed_hook() {
    for fail_at in [Phase::ConfigureOptions, Phase::Configure, Phase::ResolveLayout] {
        let tmp = TempDir::new().unwrap();
        let recipe = FailingRecipe::new(fail_at);
        let backend = ScriptedBackend::new();

        let executor = LifecycleExecutor::new(&recipe, &backend, tmp.path());
        let result = executor.run(&linux(), &[]);

        assert_eq!(result.state(), LifecycleState::Failed(fail_at));
        assert!(
            backend.calls().is_empty(),
            "backend must not run after {} failed",
            fail_at
        );
        assert!(!tmp.path().join("build").exists());
    }
}
