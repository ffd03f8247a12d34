//! Remote command registry and marshalling engine for instrument drivers.
//!
//! Instrument types expose a subset of their operations as
//! string-addressable, string-in/string-out commands: a caller names a
//! command, supplies its arguments as encoded text records, and receives the
//! results as one encoded text record, without either side writing any
//! marshalling code by hand.
//!
//! A driver type implements [`Instrument`] by returning a table of
//! [`CommandSpec`] declarations. On the first call for a type, the
//! [`registry`] validates the table and compiles one reusable dispatch thunk
//! per command (argument decoding, invocation, and result encoding with all
//! per-command decisions already made), then caches the result for the
//! process lifetime, so repeated command execution never pays for
//! inspection again. Concurrent first calls for the same type block until
//! the one build finishes and then share the identical map.
//!
//! ```rust,ignore
//! use instrument_commands::{ArgumentList, Instrument};
//!
//! let laser: &dyn Instrument = &MaiTai::default();
//! let mut args: ArgumentList =
//!     ["<Parameter Name=\"wavelength\" Value=\"800\" />"].into_iter().collect();
//! let result = laser.execute_command("SetWavelength", Some(&mut args))?;
//! assert_eq!(result, "<Results><Result Name='Result' Value='800'/></Results>");
//! ```

pub mod codec;
pub mod command;
pub mod config;
pub mod cursor;
pub mod dispatch;
pub mod encode;
pub mod error;
pub mod instrument;
pub mod metadata;
pub mod registry;
pub mod value;

pub use command::{body_fn, CommandSpec, Deprecation, Direction, MethodBody, ParamDecl, TypeParam};
pub use cursor::{ArgumentCursor, ArgumentList};
pub use dispatch::{set_deprecation_sink, DeprecationSink, LogSink};
pub use error::{CmdResult, CommandError, RegistrationError};
pub use instrument::{pack_xml, parse_hex, AsAny, ConnectionKind, Instrument};
pub use metadata::{CommandDefinition, CommandInfo, CommandMap};
pub use value::{ParamKind, Value};
