//! Thunk construction.
//!
//! Turns one validated [`CommandSpec`] into an immutable
//! [`CommandDefinition`] whose thunk performs the whole
//! decode → invoke → encode cycle with no per-call inspection left: name
//! resolution, parameter validation, by-reference decisions, output-slot
//! kinds, and result ordering are all fixed here, once, at registration.
//! Command dispatch is the hot path of long automated runs, so anything that
//! can be decided once must not be re-decided per call.

use once_cell::sync::Lazy;
use std::sync::{Arc, PoisonError, RwLock};

use crate::codec;
use crate::command::{CommandSpec, Direction, Thunk};
use crate::config::settings;
use crate::encode::render_results;
use crate::error::RegistrationError;
use crate::metadata::CommandDefinition;
use crate::value::{ParamKind, Value};

/// Sink for deprecation warnings emitted by soft-deprecated commands.
pub trait DeprecationSink: Send + Sync {
    /// Receive one preformatted warning line.
    fn warn(&self, message: &str);
}

/// The default sink; swallows every warning.
struct SilentSink;

impl DeprecationSink for SilentSink {
    fn warn(&self, _message: &str) {}
}

/// A sink that forwards warnings to the `log` crate at warn level.
pub struct LogSink;

impl DeprecationSink for LogSink {
    fn warn(&self, message: &str) {
        log::warn!("{message}");
    }
}

static SINK: Lazy<RwLock<Arc<dyn DeprecationSink>>> =
    Lazy::new(|| RwLock::new(Arc::new(SilentSink)));

/// Replace the process-wide deprecation warning sink.
pub fn set_deprecation_sink(sink: Arc<dyn DeprecationSink>) {
    *SINK.write().unwrap_or_else(PoisonError::into_inner) = sink;
}

fn deprecation_sink() -> Arc<dyn DeprecationSink> {
    SINK.read().unwrap_or_else(PoisonError::into_inner).clone()
}

/// Validate one declaration and compile its command definition.
pub(crate) fn compile(
    instrument: &str,
    spec: &CommandSpec,
) -> Result<CommandDefinition, RegistrationError> {
    let name = spec.effective_name().to_string();

    if spec.associated {
        return Err(RegistrationError::StaticMethod { command: name });
    }

    for type_param in &spec.type_params {
        if !type_param.object_erasable {
            return Err(RegistrationError::NonErasableGeneric {
                instrument: instrument.to_string(),
                method: spec.method_name.clone(),
                parameter: type_param.name.clone(),
            });
        }
    }

    let mut inputs: Vec<(String, ParamKind)> = Vec::new();
    let mut out_names: Vec<String> = Vec::new();
    let mut out_kinds: Vec<ParamKind> = Vec::new();
    for param in &spec.params {
        match param.direction {
            Direction::Out => {
                out_names.push(param.name.clone());
                out_kinds.push(erase(&param.kind));
            }
            Direction::In => {
                validate_input(instrument, &spec.method_name, &param.name, &param.kind)?;
                inputs.push((param.name.clone(), param.kind.clone()));
            }
        }
    }

    // The return value arrives from the body already typed; only its
    // presence and name matter from here on.
    let has_return = spec.returns.is_some();

    let result0_name = if spec.result_name.is_empty() {
        settings().results.default_result_name.clone()
    } else {
        spec.result_name.clone()
    };

    let mut result_names: Vec<String> = Vec::with_capacity(out_names.len() + 1);
    if has_return {
        result_names.push(result0_name);
    }
    result_names.extend(out_names);

    let parameter_names: Vec<String> = inputs.iter().map(|(n, _)| n.clone()).collect();
    reject_duplicates(instrument, &name, &parameter_names)?;
    reject_duplicates(instrument, &name, &result_names)?;

    let (deprecation_message, hard) = match &spec.deprecation {
        Some(marker) => (marker.message.clone(), marker.hard),
        None => (String::new(), false),
    };

    if hard {
        // Permanent-failure marker: no thunk, every call fails.
        return Ok(CommandDefinition::new(
            name,
            spec.description.clone(),
            spec.dialog_name.clone(),
            parameter_names,
            result_names,
            deprecation_message,
            None,
        ));
    }

    let warning = spec.deprecation.as_ref().map(|marker| {
        format!(
            "Warning: Command {} is Deprecated: {}",
            name, marker.message
        )
    });

    let body = spec.body.clone();
    let thunk_result_names = result_names.clone();
    let thunk: Thunk = Arc::new(move |instrument_instance, cursor| {
        if let Some(message) = &warning {
            deprecation_sink().warn(message);
        }

        let mut call_args = Vec::with_capacity(inputs.len());
        for (param_name, kind) in &inputs {
            call_args.push(codec::find_parameter(cursor, param_name, kind)?);
        }
        let mut out_slots: Vec<Value> = out_kinds.iter().map(Value::zero_of).collect();

        let returned = body(instrument_instance, &call_args, &mut out_slots)?;

        if thunk_result_names.is_empty() {
            return Ok(String::new());
        }
        let return_value = if has_return {
            returned.unwrap_or(Value::Null)
        } else {
            Value::Null
        };
        let mut pairs: Vec<(&str, &Value)> = Vec::with_capacity(thunk_result_names.len());
        let out_name_base = if has_return {
            pairs.push((thunk_result_names[0].as_str(), &return_value));
            1
        } else {
            0
        };
        for (index, slot) in out_slots.iter().enumerate() {
            pairs.push((thunk_result_names[out_name_base + index].as_str(), slot));
        }
        Ok(render_results(pairs))
    });

    Ok(CommandDefinition::new(
        name,
        spec.description.clone(),
        spec.dialog_name.clone(),
        parameter_names,
        result_names,
        deprecation_message,
        Some(thunk),
    ))
}

/// Acceptance policy for non-output parameters: primitive kinds parse from
/// text, `Str`/`Object` accept the text itself, `Convertible` converts
/// itself; arrays follow their element kind. Everything else is rejected
/// here, at registration, naming the offender.
fn validate_input(
    instrument: &str,
    method: &str,
    parameter: &str,
    kind: &ParamKind,
) -> Result<(), RegistrationError> {
    match kind {
        ParamKind::Generic(_) => Err(RegistrationError::GenericParameter {
            instrument: instrument.to_string(),
            method: method.to_string(),
            parameter: parameter.to_string(),
        }),
        ParamKind::Interface(_) => Err(RegistrationError::InterfaceParameter {
            instrument: instrument.to_string(),
            method: method.to_string(),
            parameter: parameter.to_string(),
        }),
        ParamKind::Named(_) => Err(RegistrationError::NotStringAssignable {
            instrument: instrument.to_string(),
            method: method.to_string(),
            parameter: parameter.to_string(),
        }),
        ParamKind::Array(element) => validate_input(instrument, method, parameter, element),
        _ => Ok(()),
    }
}

/// Erase open type parameters to the universal object kind.
fn erase(kind: &ParamKind) -> ParamKind {
    match kind {
        ParamKind::Generic(_) => ParamKind::Object,
        ParamKind::Array(element) => ParamKind::Array(Box::new(erase(element))),
        other => other.clone(),
    }
}

fn reject_duplicates(
    instrument: &str,
    command: &str,
    names: &[String],
) -> Result<(), RegistrationError> {
    for (index, name) in names.iter().enumerate() {
        if names[..index].contains(name) {
            return Err(RegistrationError::DuplicateName {
                instrument: instrument.to_string(),
                command: command.to_string(),
                name: name.clone(),
            });
        }
    }
    Ok(())
}
