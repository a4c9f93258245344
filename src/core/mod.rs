//! Core data model: recipes, settings, options, requirements, layout.

pub mod layout;
pub mod manifest;
pub mod options;
pub mod recipe;
pub mod requirement;
pub mod settings;

pub use layout::Layout;
pub use manifest::RecipeManifest;
pub use options::{FinalOptions, OptionDecl, OptionError, OptionSet, OptionState, OptionValue};
pub use recipe::{Recipe, RecipeMetadata};
pub use requirement::Requirement;
pub use settings::{BuildType, Os, Settings};
