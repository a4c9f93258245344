//! Lifecycle state machine.
//!
//! A recipe's build runs through a fixed sequence of phases; each
//! phase's output is the next phase's input. The sequence is a
//! first-class artifact here, not a method-naming convention: states
//! and the phase order are plain data that can be inspected and
//! tested.

pub mod errors;
pub mod executor;

use std::fmt;

pub use errors::LifecycleError;
pub use executor::{BuildReport, LifecycleExecutor, LifecycleResult};

/// One phase of the recipe lifecycle, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    /// Prune options that do not apply to the settings matrix.
    ConfigureOptions,

    /// Apply overrides and cross-option rules; freeze the option set.
    Configure,

    /// Resolve the layout and declare requirements.
    ResolveLayout,

    /// Write descriptor files for the build backend.
    Generate,

    /// Backend configure + build.
    Build,

    /// Backend install into the package directory.
    Package,

    /// Report consumer-facing package metadata.
    ReportInfo,
}

impl Phase {
    /// All phases in execution order.
    pub const ORDER: [Phase; 7] = [
        Phase::ConfigureOptions,
        Phase::Configure,
        Phase::ResolveLayout,
        Phase::Generate,
        Phase::Build,
        Phase::Package,
        Phase::ReportInfo,
    ];

    /// Phase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::ConfigureOptions => "configure_options",
            Phase::Configure => "configure",
            Phase::ResolveLayout => "layout",
            Phase::Generate => "generate",
            Phase::Build => "build",
            Phase::Package => "package",
            Phase::ReportInfo => "package_info",
        }
    }

    /// The state a recipe is in once this phase completes.
    pub fn completed_state(self) -> LifecycleState {
        match self {
            Phase::ConfigureOptions => LifecycleState::OptionsConfigured,
            Phase::Configure => LifecycleState::Configured,
            Phase::ResolveLayout => LifecycleState::LayoutResolved,
            Phase::Generate => LifecycleState::Generated,
            Phase::Build => LifecycleState::Built,
            Phase::Package => LifecycleState::Packaged,
            Phase::ReportInfo => LifecycleState::InfoReported,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State of one recipe lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Init,
    OptionsConfigured,
    Configured,
    LayoutResolved,
    Generated,
    Built,
    Packaged,
    /// Terminal success state.
    InfoReported,
    /// Terminal failure state, entered from any phase. Restarting
    /// means a full re-run from `Init`; partial state is never resumed.
    Failed(Phase),
}

impl LifecycleState {
    /// The phase that runs next from this state, if any.
    pub fn next_phase(&self) -> Option<Phase> {
        match self {
            LifecycleState::Init => Some(Phase::ConfigureOptions),
            LifecycleState::OptionsConfigured => Some(Phase::Configure),
            LifecycleState::Configured => Some(Phase::ResolveLayout),
            LifecycleState::LayoutResolved => Some(Phase::Generate),
            LifecycleState::Generated => Some(Phase::Build),
            LifecycleState::Built => Some(Phase::Package),
            LifecycleState::Packaged => Some(Phase::ReportInfo),
            LifecycleState::InfoReported | LifecycleState::Failed(_) => None,
        }
    }

    /// Whether this state ends the lifecycle.
    pub fn is_terminal(&self) -> bool {
        self.next_phase().is_none()
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleState::Init => f.write_str("INIT"),
            LifecycleState::OptionsConfigured => f.write_str("OPTIONS_CONFIGURED"),
            LifecycleState::Configured => f.write_str("CONFIGURED"),
            LifecycleState::LayoutResolved => f.write_str("LAYOUT_RESOLVED"),
            LifecycleState::Generated => f.write_str("GENERATED"),
            LifecycleState::Built => f.write_str("BUILT"),
            LifecycleState::Packaged => f.write_str("PACKAGED"),
            LifecycleState::InfoReported => f.write_str("INFO_REPORTED"),
            LifecycleState::Failed(phase) => write!(f, "FAILED({})", phase),
        }
    }
}
