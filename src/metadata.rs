//! Committed command metadata.
//!
//! [`CommandDefinition`] is what the registry stores per command: the
//! resolved names, the ordered parameter and result name lists, the
//! deprecation message, and the compiled thunk. It is immutable once built.
//! [`CommandInfo`] is the outward descriptive object handed to callers for
//! introspection and UI use; it carries editable value slots keyed by the
//! committed parameter and result names.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::command::Thunk;
use crate::cursor::ArgumentCursor;
use crate::error::{CmdResult, CommandError};
use crate::instrument::Instrument;

/// Per-type mapping from command name to committed metadata.
pub type CommandMap = HashMap<String, CommandDefinition>;

/// Immutable description of one registered command.
#[derive(Clone)]
pub struct CommandDefinition {
    name: String,
    description: String,
    dialog_name: String,
    parameter_names: Vec<String>,
    result_names: Vec<String>,
    deprecation_message: String,
    thunk: Option<Thunk>,
}

impl CommandDefinition {
    pub(crate) fn new(
        name: String,
        description: String,
        dialog_name: String,
        parameter_names: Vec<String>,
        result_names: Vec<String>,
        deprecation_message: String,
        thunk: Option<Thunk>,
    ) -> Self {
        debug_assert!(!name.is_empty());
        Self {
            name,
            description,
            dialog_name,
            parameter_names,
            result_names,
            deprecation_message,
            thunk,
        }
    }

    /// Command name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Display description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Display dialog name.
    pub fn dialog_name(&self) -> &str {
        &self.dialog_name
    }

    /// Names of the non-output parameters, in declaration order.
    pub fn parameter_names(&self) -> &[String] {
        &self.parameter_names
    }

    /// Number of non-output parameters.
    pub fn parameter_count(&self) -> usize {
        self.parameter_names.len()
    }

    /// Names of the results: return value first if present, then output
    /// parameters in declaration order.
    pub fn result_names(&self) -> &[String] {
        &self.result_names
    }

    /// Deprecation message; empty when the command is not deprecated.
    pub fn deprecation_message(&self) -> &str {
        &self.deprecation_message
    }

    /// True when every invocation fails with a deprecation error.
    pub fn is_deprecated_error(&self) -> bool {
        self.thunk.is_none()
    }

    /// Run the command against an instrument instance.
    ///
    /// Argument validation beyond what the thunk itself performs is the
    /// facade's job; this method only refuses hard-deprecated commands.
    pub(crate) fn execute(
        &self,
        instrument: &dyn Instrument,
        args: &mut dyn ArgumentCursor,
    ) -> CmdResult<String> {
        match &self.thunk {
            Some(thunk) => thunk(instrument, args),
            None => Err(CommandError::Deprecated {
                name: self.name.clone(),
                message: self.deprecation_message.clone(),
            }),
        }
    }

    /// Build a fresh descriptive object for this command.
    pub fn describe(&self) -> CommandInfo {
        CommandInfo::new(
            self.name.clone(),
            self.description.clone(),
            self.dialog_name.clone(),
            String::new(),
            self.parameter_names.iter().cloned(),
            self.result_names.iter().cloned(),
        )
    }
}

impl std::fmt::Debug for CommandDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandDefinition")
            .field("name", &self.name)
            .field("parameter_names", &self.parameter_names)
            .field("result_names", &self.result_names)
            .field("deprecation_message", &self.deprecation_message)
            .field("deprecated_error", &self.thunk.is_none())
            .finish()
    }
}

/// Outward descriptive object for one command.
///
/// Parameter and result slots start empty and may be filled in by callers
/// assembling or displaying a call; the slot keys are fixed to the names
/// committed at registration.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommandInfo {
    name: String,
    description: String,
    dialog_name: String,
    command_string: String,
    parameters: HashMap<String, String>,
    results: HashMap<String, String>,
}

impl CommandInfo {
    /// Create a descriptive object with empty value slots.
    pub fn new(
        name: String,
        description: String,
        dialog_name: String,
        command_string: String,
        parameter_names: impl IntoIterator<Item = String>,
        result_names: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            name,
            description,
            dialog_name,
            command_string,
            parameters: parameter_names
                .into_iter()
                .map(|n| (n, String::new()))
                .collect(),
            results: result_names
                .into_iter()
                .map(|n| (n, String::new()))
                .collect(),
        }
    }

    /// Command name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the command in this descriptive copy.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Display description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Replace the display description.
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// Display dialog name.
    pub fn dialog_name(&self) -> &str {
        &self.dialog_name
    }

    /// Free-form command string slot.
    pub fn command_string(&self) -> &str {
        &self.command_string
    }

    /// Replace the free-form command string slot.
    pub fn set_command_string(&mut self, command_string: impl Into<String>) {
        self.command_string = command_string.into();
    }

    /// Keys of the parameter slots.
    pub fn parameter_keys(&self) -> impl Iterator<Item = &str> {
        self.parameters.keys().map(String::as_str)
    }

    /// Current value of one parameter slot.
    pub fn parameter_value(&self, key: &str) -> Option<&str> {
        self.parameters.get(key).map(String::as_str)
    }

    /// Fill one parameter slot; the key must be a committed parameter name.
    pub fn set_parameter_value(&mut self, key: &str, value: impl Into<String>) -> CmdResult<()> {
        match self.parameters.get_mut(key) {
            Some(slot) => {
                *slot = value.into();
                Ok(())
            }
            None => Err(CommandError::UnknownInfoKey(key.to_string())),
        }
    }

    /// Keys of the result slots.
    pub fn result_keys(&self) -> impl Iterator<Item = &str> {
        self.results.keys().map(String::as_str)
    }

    /// Current value of one result slot.
    pub fn result_value(&self, key: &str) -> Option<&str> {
        self.results.get(key).map(String::as_str)
    }

    /// Fill one result slot; the key must be a committed result name.
    pub fn set_result_value(&mut self, key: &str, value: impl Into<String>) -> CmdResult<()> {
        match self.results.get_mut(key) {
            Some(slot) => {
                *slot = value.into();
                Ok(())
            }
            None => Err(CommandError::UnknownInfoKey(key.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info() -> CommandInfo {
        CommandInfo::new(
            "SetWavelength".into(),
            "Tune the laser".into(),
            "Set Wavelength".into(),
            String::new(),
            vec!["wavelength".to_string()],
            vec!["Result".to_string()],
        )
    }

    #[test]
    fn test_slots_start_empty() {
        let info = info();
        assert_eq!(info.parameter_value("wavelength"), Some(""));
        assert_eq!(info.result_value("Result"), Some(""));
    }

    #[test]
    fn test_set_known_slots() {
        let mut info = info();
        info.set_parameter_value("wavelength", "800").unwrap();
        assert_eq!(info.parameter_value("wavelength"), Some("800"));

        info.set_result_value("Result", "ok").unwrap();
        assert_eq!(info.result_value("Result"), Some("ok"));
    }

    #[test]
    fn test_unknown_slot_is_rejected() {
        let mut info = info();
        assert!(matches!(
            info.set_parameter_value("power", "1"),
            Err(CommandError::UnknownInfoKey(key)) if key == "power"
        ));
        assert!(matches!(
            info.set_result_value("status", "1"),
            Err(CommandError::UnknownInfoKey(_))
        ));
    }

    #[test]
    fn test_serializes_to_json() {
        let json = serde_json::to_value(info()).unwrap();
        assert_eq!(json["name"], "SetWavelength");
        assert_eq!(json["parameters"]["wavelength"], "");
    }
}
