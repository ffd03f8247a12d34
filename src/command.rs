//! Command declarations.
//!
//! A [`CommandSpec`] is the plain-data description of one remotely invokable
//! method on an instrument type: its names and display strings, its
//! parameter declarations, an optional deprecation marker, and a type-erased
//! [`MethodBody`] that performs the actual work against converted
//! [`Value`]s. How a driver produces its `CommandSpec`s (by hand, from
//! codegen, from an interop description) is the driver's business; the
//! registry only consumes the finished table.

use std::sync::Arc;

use crate::cursor::ArgumentCursor;
use crate::error::{CmdResult, CommandError};
use crate::instrument::Instrument;
use crate::value::{ParamKind, Value};

/// The type-erased callable behind one command declaration.
///
/// Receives the instrument instance, the converted non-output arguments in
/// declaration order, and zero-initialized output slots in declaration
/// order. Returns the method's return value, or `None` for a void method.
/// Bodies downcast the instrument to their concrete type via
/// [`Instrument::as_any`](crate::instrument::AsAny::as_any).
pub type MethodBody =
    Arc<dyn Fn(&dyn Instrument, &[Value], &mut [Value]) -> CmdResult<Option<Value>> + Send + Sync>;

/// The compiled, reusable dispatch unit for one command.
pub type Thunk =
    Arc<dyn Fn(&dyn Instrument, &mut dyn ArgumentCursor) -> CmdResult<String> + Send + Sync>;

/// Direction of one declared parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Supplied by the caller through the argument cursor.
    In,
    /// Produced by the method into engine-provided storage.
    Out,
}

/// One declared parameter.
#[derive(Clone, Debug, PartialEq)]
pub struct ParamDecl {
    /// Parameter name, matched ordinally against argument records.
    pub name: String,
    /// Declared kind.
    pub kind: ParamKind,
    /// In or out.
    pub direction: Direction,
}

/// One declared type parameter of a generic method.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeParam {
    /// Type parameter name.
    pub name: String,
    /// Whether the parameter can be erased to the universal object kind.
    /// Declarations where this is false fail registration.
    pub object_erasable: bool,
}

/// Deprecation marker on a command declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Deprecation {
    /// Message surfaced in warnings or failures.
    pub message: String,
    /// When true, every invocation fails instead of warning.
    pub hard: bool,
}

/// Declaration of one instrument command.
#[derive(Clone)]
pub struct CommandSpec {
    /// Name of the declared method.
    pub method_name: String,
    /// Command name override; empty means the method name is used.
    pub command_name: String,
    /// Display description.
    pub description: String,
    /// Display dialog name.
    pub dialog_name: String,
    /// Name override for an unnamed return value; empty means the
    /// configured default applies.
    pub result_name: String,
    /// True for associated functions with no instance receiver.
    pub associated: bool,
    /// Optional deprecation marker.
    pub deprecation: Option<Deprecation>,
    /// Declared type parameters.
    pub type_params: Vec<TypeParam>,
    /// Declared parameters, in declaration order, inputs and outputs mixed.
    pub params: Vec<ParamDecl>,
    /// Kind of the return value; `None` for void methods.
    pub returns: Option<ParamKind>,
    /// The method body.
    pub body: MethodBody,
}

impl CommandSpec {
    /// Start a declaration for `method_name` with the given body.
    pub fn new(method_name: impl Into<String>, body: MethodBody) -> Self {
        Self {
            method_name: method_name.into(),
            command_name: String::new(),
            description: String::new(),
            dialog_name: String::new(),
            result_name: String::new(),
            associated: false,
            deprecation: None,
            type_params: Vec::new(),
            params: Vec::new(),
            returns: None,
            body,
        }
    }

    /// Override the command name.
    pub fn with_command_name(mut self, name: impl Into<String>) -> Self {
        self.command_name = name.into();
        self
    }

    /// Set the display description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the display dialog name.
    pub fn with_dialog_name(mut self, dialog_name: impl Into<String>) -> Self {
        self.dialog_name = dialog_name.into();
        self
    }

    /// Name an otherwise unnamed return value.
    pub fn with_result_name(mut self, result_name: impl Into<String>) -> Self {
        self.result_name = result_name.into();
        self
    }

    /// Mark the declaration as an associated function.
    pub fn associated(mut self) -> Self {
        self.associated = true;
        self
    }

    /// Mark the command deprecated; calls succeed but warn.
    pub fn deprecated(mut self, message: impl Into<String>) -> Self {
        self.deprecation = Some(Deprecation {
            message: message.into(),
            hard: false,
        });
        self
    }

    /// Mark the command deprecated-as-error; every call fails.
    pub fn deprecated_error(mut self, message: impl Into<String>) -> Self {
        self.deprecation = Some(Deprecation {
            message: message.into(),
            hard: true,
        });
        self
    }

    /// Declare a type parameter.
    pub fn type_param(mut self, name: impl Into<String>, object_erasable: bool) -> Self {
        self.type_params.push(TypeParam {
            name: name.into(),
            object_erasable,
        });
        self
    }

    /// Declare an input parameter.
    pub fn in_param(mut self, name: impl Into<String>, kind: ParamKind) -> Self {
        self.params.push(ParamDecl {
            name: name.into(),
            kind,
            direction: Direction::In,
        });
        self
    }

    /// Declare an output parameter.
    pub fn out_param(mut self, name: impl Into<String>, kind: ParamKind) -> Self {
        self.params.push(ParamDecl {
            name: name.into(),
            kind,
            direction: Direction::Out,
        });
        self
    }

    /// Declare the return value kind.
    pub fn returns(mut self, kind: ParamKind) -> Self {
        self.returns = Some(kind);
        self
    }

    /// The command name this declaration registers under.
    pub fn effective_name(&self) -> &str {
        if self.command_name.is_empty() {
            &self.method_name
        } else {
            &self.command_name
        }
    }
}

/// Wrap a closure as a [`MethodBody`].
pub fn body_fn<F>(f: F) -> MethodBody
where
    F: Fn(&dyn Instrument, &[Value], &mut [Value]) -> CmdResult<Option<Value>>
        + Send
        + Sync
        + 'static,
{
    Arc::new(f)
}

/// A body that ignores its instrument and arguments and fails. Placeholder
/// for declarations that are rejected before their body could ever run.
pub fn unreachable_body() -> MethodBody {
    Arc::new(|_, _, _| {
        Err(CommandError::Instrument(
            "command body invoked before registration".to_string(),
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_name_defaults_to_method_name() {
        let spec = CommandSpec::new("read_power", unreachable_body());
        assert_eq!(spec.effective_name(), "read_power");

        let spec = spec.with_command_name("ReadPower");
        assert_eq!(spec.effective_name(), "ReadPower");
    }

    #[test]
    fn test_builder_collects_declarations() {
        let spec = CommandSpec::new("move_axis", unreachable_body())
            .with_description("Move one axis")
            .in_param("axis", ParamKind::U8)
            .in_param("position", ParamKind::F64)
            .out_param("settled", ParamKind::Bool)
            .returns(ParamKind::F64);

        assert_eq!(spec.params.len(), 3);
        assert_eq!(spec.params[0].direction, Direction::In);
        assert_eq!(spec.params[2].direction, Direction::Out);
        assert_eq!(spec.returns, Some(ParamKind::F64));
        assert!(spec.deprecation.is_none());
    }

    #[test]
    fn test_deprecation_markers() {
        let soft = CommandSpec::new("old", unreachable_body()).deprecated("use New");
        assert_eq!(
            soft.deprecation,
            Some(Deprecation {
                message: "use New".into(),
                hard: false
            })
        );

        let hard = CommandSpec::new("older", unreachable_body()).deprecated_error("gone");
        assert!(hard.deprecation.map(|d| d.hard).unwrap_or(false));
    }
}
