//! Custom error types for the command engine.
//!
//! Failures split into two families with different lifetimes:
//!
//! - [`RegistrationError`]: raised once, while a type's declaration table is
//!   being validated and compiled into its command map. A registration error
//!   aborts only the offending command; the rest of the type's commands still
//!   register.
//! - [`CommandError`]: raised per call of `execute_command` and surfaced to
//!   the caller verbatim. This covers facade-level argument validation,
//!   marshalling failures from the codec, deprecation failures, and failures
//!   raised by the instrument's own method body (which propagate unchanged,
//!   never wrapped).
//!
//! No error in this crate triggers a retry; every call-time failure reaches
//! the original caller.

use thiserror::Error;

/// Convenience alias for results using the call-time error type.
pub type CmdResult<T> = std::result::Result<T, CommandError>;

/// Errors raised while validating and compiling one command declaration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    /// The declaration is an associated function with no instance receiver.
    #[error("instruments do not support static commands at this time. Please modify command {command} so that it is not static")]
    StaticMethod {
        /// Effective command name.
        command: String,
    },

    /// A non-output parameter is an open type parameter.
    #[error("generically typed command parameters are not supported. Please modify parameter {instrument}.{method}(... {parameter} ...) so that it is not generic")]
    GenericParameter {
        /// Instrument type name.
        instrument: String,
        /// Declared method name.
        method: String,
        /// Offending parameter name.
        parameter: String,
    },

    /// A non-output parameter is an interface kind other than the
    /// convertible capability.
    #[error("parameters of interface kinds other than the convertible capability are not supported. Please modify parameter {instrument}.{method}(... {parameter} ...) so that it is not an interface kind")]
    InterfaceParameter {
        /// Instrument type name.
        instrument: String,
        /// Declared method name.
        method: String,
        /// Offending parameter name.
        parameter: String,
    },

    /// A non-output parameter can neither be parsed nor assigned from a
    /// string.
    #[error("parameters which are not assignable from a string are not supported. Please modify parameter {instrument}.{method}(... {parameter} ...) so that it can be assigned from a string")]
    NotStringAssignable {
        /// Instrument type name.
        instrument: String,
        /// Declared method name.
        method: String,
        /// Offending parameter name.
        parameter: String,
    },

    /// A type parameter cannot be erased to the universal object kind.
    #[error("generic commands whose type parameters cannot be erased to the object kind are not supported: {instrument}.{method} type parameter {parameter}")]
    NonErasableGeneric {
        /// Instrument type name.
        instrument: String,
        /// Declared method name.
        method: String,
        /// Offending type parameter name.
        parameter: String,
    },

    /// A parameter or result name appears more than once on one command.
    #[error("command {command} on {instrument} declares the name {name} more than once")]
    DuplicateName {
        /// Instrument type name.
        instrument: String,
        /// Effective command name.
        command: String,
        /// The repeated name.
        name: String,
    },

    /// Two commands on the same type resolve to the same command name.
    #[error("instrument {instrument} defines command {command} multiple times. Commands may only be defined once")]
    DuplicateCommand {
        /// Instrument type name.
        instrument: String,
        /// The contested command name.
        command: String,
    },
}

/// Errors raised while executing a command.
#[derive(Error, Debug)]
pub enum CommandError {
    /// `execute_command` was called with an empty command name.
    #[error("commandName cannot be empty")]
    EmptyCommandName,

    /// The command name is not registered on the instrument's type.
    #[error("commandName {command} not found in {instrument}")]
    UnknownCommand {
        /// Requested command name.
        command: String,
        /// Instrument type name.
        instrument: String,
    },

    /// No argument cursor was supplied, the cursor was empty, or an argument
    /// record was missing where one was required.
    #[error("Insufficient args, or an arg was null")]
    ArgumentNull,

    /// An argument record did not match the parameter record grammar.
    #[error("One of the args was invalid Xml")]
    InvalidRecord,

    /// An argument's value text could not be parsed into the requested kind.
    #[error("One of the args was not in the correct format: {0}")]
    ArgumentBadFormat(String),

    /// A full wrap of the cursor found no record with the parameter's name.
    #[error("Parameter {0} was not found in the args list")]
    ParameterNotFound(String),

    /// The command is deprecated-as-error; every invocation fails.
    #[error("Command {name} is deprecated: {message}")]
    Deprecated {
        /// Command name.
        name: String,
        /// Deprecation message recorded at registration.
        message: String,
    },

    /// A key passed to a descriptive command object was neither one of its
    /// parameters nor one of its results.
    #[error("the specified key {0} was not a parameter or result of this command")]
    UnknownInfoKey(String),

    /// Failure raised by the instrument's own method body, propagated
    /// unchanged.
    #[error("Instrument error: {0}")]
    Instrument(String),
}
