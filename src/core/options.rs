//! Option set - the recipe's configurable knobs.
//!
//! Options are declared with a type and a default, then narrowed in two
//! steps: platform pruning (`config_options` phase) and value
//! configuration (`configure` phase). An option's presence is an
//! explicit state: it is either present with a value or removed.
//! Removal is a total operation; removing an option that does not exist
//! or was already removed is a no-op, never an error, because the
//! caller cannot know which options survived a given settings matrix.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::settings::Settings;

/// Name of the linkage-mode option.
pub const SHARED: &str = "shared";

/// Name of the position-independent-code option.
pub const FPIC: &str = "fPIC";

/// Error raised on invalid option access or assignment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionError {
    #[error("unknown option `{name}`")]
    Unknown { name: String },

    #[error("option `{name}` was removed for the current settings and cannot be read")]
    Removed { name: String },

    #[error("invalid value `{value}` for option `{name}` (allowed: {allowed})")]
    InvalidValue {
        name: String,
        value: String,
        allowed: String,
    },
}

/// A declared option: its type and default value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionDecl {
    /// Boolean knob with a default.
    Bool { default: bool },

    /// Enumerated choice with allowed values and a default.
    Choice {
        choices: Vec<String>,
        default: String,
    },
}

impl OptionDecl {
    /// The default value for this declaration.
    pub fn default_value(&self) -> OptionValue {
        match self {
            OptionDecl::Bool { default } => OptionValue::Bool(*default),
            OptionDecl::Choice { default, .. } => OptionValue::Choice(default.clone()),
        }
    }

    /// Check a candidate value against this declaration.
    fn accepts(&self, value: &OptionValue) -> bool {
        match (self, value) {
            (OptionDecl::Bool { .. }, OptionValue::Bool(_)) => true,
            (OptionDecl::Choice { choices, .. }, OptionValue::Choice(v)) => {
                choices.iter().any(|c| c == v)
            }
            _ => false,
        }
    }

    /// Human-readable list of allowed values.
    fn allowed(&self) -> String {
        match self {
            OptionDecl::Bool { .. } => "true, false".to_string(),
            OptionDecl::Choice { choices, .. } => choices.join(", "),
        }
    }
}

/// A concrete option value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Choice(String),
}

impl OptionValue {
    /// The boolean payload, if this is a boolean value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Bool(b) => Some(*b),
            OptionValue::Choice(_) => None,
        }
    }

    /// The choice payload, if this is an enumerated value.
    pub fn as_choice(&self) -> Option<&str> {
        match self {
            OptionValue::Bool(_) => None,
            OptionValue::Choice(c) => Some(c),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(b: bool) -> Self {
        OptionValue::Bool(b)
    }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        OptionValue::Choice(s.to_string())
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(b) => write!(f, "{}", b),
            OptionValue::Choice(c) => f.write_str(c),
        }
    }
}

/// Presence state of an option after pruning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionState {
    /// The option applies and carries a value.
    Present(OptionValue),

    /// The option was pruned for the current settings; reading it is
    /// an error.
    Removed,
}

fn lookup<'a>(
    map: &'a BTreeMap<String, OptionState>,
    name: &str,
) -> Result<&'a OptionValue, OptionError> {
    match map.get(name) {
        Some(OptionState::Present(value)) => Ok(value),
        Some(OptionState::Removed) => Err(OptionError::Removed {
            name: name.to_string(),
        }),
        None => Err(OptionError::Unknown {
            name: name.to_string(),
        }),
    }
}

fn lookup_bool(map: &BTreeMap<String, OptionState>, name: &str) -> Result<bool, OptionError> {
    let value = lookup(map, name)?;
    value.as_bool().ok_or_else(|| OptionError::InvalidValue {
        name: name.to_string(),
        value: value.to_string(),
        allowed: "true, false".to_string(),
    })
}

/// The mutable option set used during the configuration phases.
///
/// Becomes a read-only [`FinalOptions`] snapshot via [`OptionSet::finalize`];
/// every phase after `configure` sees only the snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSet {
    decls: BTreeMap<String, OptionDecl>,
    values: BTreeMap<String, OptionState>,
}

impl OptionSet {
    /// Build the defaulted option set from a recipe's declarations.
    pub fn from_decls(decls: BTreeMap<String, OptionDecl>) -> Self {
        let values = decls
            .iter()
            .map(|(name, decl)| (name.clone(), OptionState::Present(decl.default_value())))
            .collect();
        OptionSet { decls, values }
    }

    /// Read an option's value.
    pub fn get(&self, name: &str) -> Result<&OptionValue, OptionError> {
        lookup(&self.values, name)
    }

    /// Read a boolean option's value.
    pub fn get_bool(&self, name: &str) -> Result<bool, OptionError> {
        lookup_bool(&self.values, name)
    }

    /// Whether an option is present (declared and not removed).
    pub fn is_present(&self, name: &str) -> bool {
        matches!(self.values.get(name), Some(OptionState::Present(_)))
    }

    /// Assign a value to a present option, validating it against the
    /// declaration. Assigning to an unknown or removed option is an
    /// error; pruning decisions are not silently undone.
    pub fn set(&mut self, name: &str, value: OptionValue) -> Result<(), OptionError> {
        let decl = self.decls.get(name).ok_or_else(|| OptionError::Unknown {
            name: name.to_string(),
        })?;

        if !decl.accepts(&value) {
            return Err(OptionError::InvalidValue {
                name: name.to_string(),
                value: value.to_string(),
                allowed: decl.allowed(),
            });
        }

        match self.values.get_mut(name) {
            Some(OptionState::Present(slot)) => {
                *slot = value;
                Ok(())
            }
            _ => Err(OptionError::Removed {
                name: name.to_string(),
            }),
        }
    }

    /// Remove an option if it is present. Total and idempotent: unknown
    /// names and already-removed options are a no-op.
    pub fn remove_safe(&mut self, name: &str) {
        if let Some(state) = self.values.get_mut(name) {
            *state = OptionState::Removed;
        }
    }

    /// Platform pruning rule: drop the PIC knob on targets where
    /// position independence is managed by the toolchain itself.
    pub fn prune_platform_options(&mut self, settings: &Settings) {
        if settings.os().has_implicit_pic() {
            self.remove_safe(FPIC);
        }
    }

    /// Linkage rule: building a shared library forces PIC, so the PIC
    /// knob is no longer independently controllable and is removed.
    /// Idempotent under repeated application.
    pub fn apply_linkage_rule(&mut self) {
        if self.get_bool(SHARED).unwrap_or(false) {
            self.remove_safe(FPIC);
        }
    }

    /// Freeze the set into a read-only snapshot for later phases.
    pub fn finalize(self) -> FinalOptions {
        FinalOptions {
            values: self.values,
        }
    }
}

/// The finalized, read-only option snapshot consumed by every phase
/// after `configure`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalOptions {
    values: BTreeMap<String, OptionState>,
}

impl FinalOptions {
    /// Read an option's value.
    pub fn get(&self, name: &str) -> Result<&OptionValue, OptionError> {
        lookup(&self.values, name)
    }

    /// Read a boolean option's value.
    pub fn get_bool(&self, name: &str) -> Result<bool, OptionError> {
        lookup_bool(&self.values, name)
    }

    /// Whether an option is present.
    pub fn is_present(&self, name: &str) -> bool {
        matches!(self.values.get(name), Some(OptionState::Present(_)))
    }

    /// Iterate over present options in name order.
    pub fn present(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.values.iter().filter_map(|(name, state)| match state {
            OptionState::Present(value) => Some((name.as_str(), value)),
            OptionState::Removed => None,
        })
    }

    /// Number of present options.
    pub fn len(&self) -> usize {
        self.present().count()
    }

    /// Whether no options are present.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
