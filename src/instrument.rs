//! Instrument facade.
//!
//! [`Instrument`] is the seam between drivers and the command engine: a
//! driver type implements it by returning its command declaration table, and
//! callers reach every registered command through `execute_command` on the
//! trait object.
//! Each concrete type declares its commands independently; there is no
//! inheritance-aware composition, and types are expected to implement this
//! trait directly rather than layering command tables through wrappers.
//!
//! Lifecycle concerns (connecting, configuring, resetting hardware) live in
//! the drivers, not here.

use std::any::Any;
use std::fmt;

use crate::command::CommandSpec;
use crate::cursor::{ArgumentCursor, ArgumentList};
use crate::error::{CmdResult, CommandError};
use crate::metadata::CommandInfo;
use crate::registry;

/// Upcast support so method bodies can downcast to their concrete type and
/// the registry can key on concrete type identity.
pub trait AsAny {
    /// View as [`Any`].
    fn as_any(&self) -> &dyn Any;

    /// Full type name, used in diagnostics.
    fn type_label(&self) -> &'static str;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_label(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// How an instrument is attached to the host.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConnectionKind {
    /// Serial line.
    Serial,
    /// GPIB bus.
    Gpib,
    /// TCP socket.
    Tcp,
    /// USB device.
    Usb,
    /// Anything else.
    #[default]
    Other,
}

impl fmt::Display for ConnectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ConnectionKind::Serial => "Serial",
            ConnectionKind::Gpib => "Gpib",
            ConnectionKind::Tcp => "Tcp",
            ConnectionKind::Usb => "Usb",
            ConnectionKind::Other => "Other",
        };
        f.write_str(text)
    }
}

/// A device-control type exposing string-addressable remote commands.
pub trait Instrument: AsAny + Send + Sync {
    /// The command declaration table for this concrete type.
    ///
    /// Consulted at most once per type, on the first command execution or
    /// introspection call; the compiled result is cached for the process
    /// lifetime.
    fn command_table(&self) -> Vec<CommandSpec>;

    /// Display name of this instance.
    fn name(&self) -> String {
        String::new()
    }

    /// Address the instance is reachable at.
    fn address(&self) -> String {
        String::new()
    }

    /// Connection kind of this instance.
    fn connection(&self) -> ConnectionKind {
        ConnectionKind::Other
    }
}

impl dyn Instrument + '_ {
    /// Execute a registered command by name.
    ///
    /// Fails on an empty name, on a name unknown to this type, and when
    /// `args` is absent but the command declares input parameters. All other
    /// failures come from the command's own thunk: marshalling errors,
    /// deprecation failures, and whatever the method body itself raises.
    pub fn execute_command(
        &self,
        command_name: &str,
        args: Option<&mut dyn ArgumentCursor>,
    ) -> CmdResult<String> {
        if command_name.is_empty() {
            return Err(CommandError::EmptyCommandName);
        }

        let map = self.commands();
        let command = map
            .get(command_name)
            .ok_or_else(|| CommandError::UnknownCommand {
                command: command_name.to_string(),
                instrument: short_type_name(self.type_label()).to_string(),
            })?;

        match args {
            Some(cursor) => command.execute(self, cursor),
            None if command.parameter_count() > 0 => Err(CommandError::ArgumentNull),
            None => {
                let mut no_args = ArgumentList::empty();
                command.execute(self, &mut no_args)
            }
        }
    }

    /// Names of every command registered on this type.
    pub fn commands_keys(&self) -> Vec<String> {
        self.commands().keys().cloned().collect()
    }

    /// Fresh descriptive object for one registered command.
    pub fn commands_value(&self, key: &str) -> Option<CommandInfo> {
        self.commands().get(key).map(|def| def.describe())
    }

    /// Fresh descriptive objects for every registered command.
    pub fn commands_values(&self) -> Vec<CommandInfo> {
        self.commands().values().map(|def| def.describe()).collect()
    }

    /// One-line XML summary of this instance.
    pub fn to_xml(&self) -> String {
        format!(
            "<Instrument Name=\"{}\" Type=\"{}\" ConnectedBy=\"{}\" Address=\"{}\"/>",
            self.name(),
            short_type_name(self.type_label()),
            self.connection(),
            self.address()
        )
    }

    /// Downcast to the concrete instrument type.
    pub fn downcast_ref<T: Instrument + Any>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    fn commands(&self) -> std::sync::Arc<crate::metadata::CommandMap> {
        registry::commands_for(
            self.as_any().type_id(),
            short_type_name(self.type_label()),
            || self.command_table(),
        )
    }
}

/// Concatenate pre-encoded records into a single packed envelope.
pub fn pack_xml(args: &[&str]) -> String {
    format!("<Packed>{}</Packed>", args.concat())
}

/// Parse an unsigned number with the conventional prefixes: `0x` for hex,
/// `0n` for explicit decimal, bare digits otherwise.
pub fn parse_hex(number: &str) -> CmdResult<u32> {
    if number.is_empty() {
        return Err(CommandError::ArgumentBadFormat(
            "number cannot be empty".to_string(),
        ));
    }

    let parsed = if let Some(hex) = strip_prefix_ignore_case(number, "0x") {
        u32::from_str_radix(hex, 16)
    } else if let Some(dec) = strip_prefix_ignore_case(number, "0n") {
        dec.parse::<u32>()
    } else {
        number.parse::<u32>()
    };
    parsed.map_err(|_| {
        CommandError::ArgumentBadFormat(format!("could not parse \"{number}\" as a number"))
    })
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let len = prefix.len();
    if text.len() >= len && text.as_bytes()[..len].eq_ignore_ascii_case(prefix.as_bytes()) {
        Some(&text[len..])
    } else {
        None
    }
}

/// Last path segment of a full type name.
pub(crate) fn short_type_name(full: &str) -> &str {
    full.rsplit("::").next().unwrap_or(full)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::body_fn;
    use crate::value::{ParamKind, Value};

    struct Shutter;

    impl Instrument for Shutter {
        fn command_table(&self) -> Vec<CommandSpec> {
            vec![
                CommandSpec::new("open_shutter", body_fn(|_, _, _| Ok(None)))
                    .with_command_name("Open"),
                CommandSpec::new(
                    "position",
                    body_fn(|_, _, _| Ok(Some(Value::Text("open".into())))),
                )
                .returns(ParamKind::Str),
            ]
        }

        fn name(&self) -> String {
            "shutter-a".to_string()
        }

        fn address(&self) -> String {
            "COM3".to_string()
        }

        fn connection(&self) -> ConnectionKind {
            ConnectionKind::Serial
        }
    }

    #[test]
    fn test_empty_command_name_is_rejected() {
        let shutter = Shutter;
        let inst: &dyn Instrument = &shutter;
        assert!(matches!(
            inst.execute_command("", None),
            Err(CommandError::EmptyCommandName)
        ));
    }

    #[test]
    fn test_unknown_command_names_the_type() {
        let shutter = Shutter;
        let inst: &dyn Instrument = &shutter;
        let err = inst.execute_command("Close", None).unwrap_err();
        match err {
            CommandError::UnknownCommand {
                command,
                instrument,
            } => {
                assert_eq!(command, "Close");
                assert_eq!(instrument, "Shutter");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parameterless_command_runs_without_args() {
        let shutter = Shutter;
        let inst: &dyn Instrument = &shutter;
        assert_eq!(inst.execute_command("Open", None).unwrap(), "");
    }

    #[test]
    fn test_commands_keys_and_values() {
        let shutter = Shutter;
        let inst: &dyn Instrument = &shutter;
        let mut keys = inst.commands_keys();
        keys.sort();
        assert_eq!(keys, ["Open", "position"]);

        let info = inst.commands_value("position").unwrap();
        assert_eq!(info.name(), "position");
        assert_eq!(info.result_keys().count(), 1);
        assert!(inst.commands_value("missing").is_none());
    }

    #[test]
    fn test_to_xml_summary() {
        let shutter = Shutter;
        let inst: &dyn Instrument = &shutter;
        assert_eq!(
            inst.to_xml(),
            "<Instrument Name=\"shutter-a\" Type=\"Shutter\" ConnectedBy=\"Serial\" Address=\"COM3\"/>"
        );
    }

    #[test]
    fn test_pack_xml_concatenates() {
        assert_eq!(
            pack_xml(&["<Parameter/>", "<Parameter/>"]),
            "<Packed><Parameter/><Parameter/></Packed>"
        );
    }

    #[test]
    fn test_parse_hex_prefixes() {
        assert_eq!(parse_hex("0x1F").unwrap(), 31);
        assert_eq!(parse_hex("0X1f").unwrap(), 31);
        assert_eq!(parse_hex("0n31").unwrap(), 31);
        assert_eq!(parse_hex("31").unwrap(), 31);
        assert!(parse_hex("").is_err());
        assert!(parse_hex("0xzz").is_err());
    }

    #[test]
    fn test_short_type_name() {
        assert_eq!(short_type_name("a::b::Widget"), "Widget");
        assert_eq!(short_type_name("Widget"), "Widget");
    }
}
