//! Parameter codec: locate a named argument on a cursor and convert it.
//!
//! One argument record is the textual token
//! `<Parameter Name="NAME" Value="VALUE" />` (or the open/close tag form),
//! with optional surrounding whitespace and no quote characters inside the
//! attribute text. Lookups walk the cursor by name from wherever it
//! currently points, wrapping through a reset at the exhaustion sentinel and
//! giving up after one full cycle. A record that fails to parse aborts the
//! whole lookup; conversion failures surface as distinct error kinds so a
//! caller can tell a malformed record from a missing parameter from a value
//! in the wrong format.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::cursor::ArgumentCursor;
use crate::error::{CmdResult, CommandError};
use crate::value::{ParamKind, Value};

#[allow(clippy::expect_used)]
static PARAMETER_RE: Lazy<Regex> = Lazy::new(|| {
    // Example: <Parameter Name="name" Value="value" />
    Regex::new(
        r#"\s*<\s*Parameter\s+Name\s*=\s*"([^"]*)"\s+Value\s*=\s*"([^"]*)"\s*(?:/\s*>\s*$|>\s*<\s*/\s*Parameter\s*>$)"#,
    )
    .expect("parameter record grammar")
});

/// Parse one argument record into its `(name, value)` attribute text.
pub fn parse_record(record: &str) -> CmdResult<(String, String)> {
    match PARAMETER_RE.captures(record) {
        Some(caps) => Ok((caps[1].to_string(), caps[2].to_string())),
        None => Err(CommandError::InvalidRecord),
    }
}

/// Search the cursor for the record named `parameter_name`, starting at the
/// cursor's current position, and convert its value to `kind`.
///
/// The record read first (rewinding once if the cursor is already at the
/// sentinel) marks the wrap point; the search fails once that point comes
/// around again. An empty cursor is an insufficient-arguments failure, and a
/// record that does not parse aborts the search immediately.
pub fn find_parameter(
    cursor: &mut dyn ArgumentCursor,
    parameter_name: &str,
    kind: &ParamKind,
) -> CmdResult<Value> {
    let mut record = read_wrapping(cursor).ok_or(CommandError::ArgumentNull)?;
    let wrap_position = cursor.position();

    loop {
        let (name, value_text) = parse_record(&record)?;
        if name == parameter_name {
            return convert(&value_text, kind);
        }

        record = read_wrapping(cursor).ok_or(CommandError::ArgumentNull)?;
        if cursor.position() == wrap_position {
            break;
        }
    }

    Err(CommandError::ParameterNotFound(parameter_name.to_string()))
}

/// Read the next record, rewinding once at the exhaustion sentinel.
/// `None` means the cursor holds no records at all.
fn read_wrapping(cursor: &mut dyn ArgumentCursor) -> Option<String> {
    if let Some(text) = cursor.next() {
        return Some(text.to_owned());
    }
    cursor.reset();
    cursor.next().map(str::to_owned)
}

/// Convert one value text into the declared kind.
pub fn convert(text: &str, kind: &ParamKind) -> CmdResult<Value> {
    match kind {
        ParamKind::Array(element) => convert_array(text, element),
        k if k.is_by_ref() => Ok(Value::Text(text.to_string())),
        k => convert_scalar(text, k),
    }
}

fn convert_scalar(text: &str, kind: &ParamKind) -> CmdResult<Value> {
    let trimmed = text.trim();
    match kind {
        ParamKind::Bool => {
            if trimmed.eq_ignore_ascii_case("true") {
                Ok(Value::Bool(true))
            } else if trimmed.eq_ignore_ascii_case("false") {
                Ok(Value::Bool(false))
            } else {
                Err(bad_format(text, "Bool"))
            }
        }
        ParamKind::I8 => parse_num::<i8>(trimmed, text, "Int").map(|v| Value::Int(v.into())),
        ParamKind::I16 => parse_num::<i16>(trimmed, text, "Int").map(|v| Value::Int(v.into())),
        ParamKind::I32 => parse_num::<i32>(trimmed, text, "Int").map(|v| Value::Int(v.into())),
        ParamKind::I64 => parse_num::<i64>(trimmed, text, "Int").map(Value::Int),
        ParamKind::U8 => parse_num::<u8>(trimmed, text, "UInt").map(|v| Value::UInt(v.into())),
        ParamKind::U16 => parse_num::<u16>(trimmed, text, "UInt").map(|v| Value::UInt(v.into())),
        ParamKind::U32 => parse_num::<u32>(trimmed, text, "UInt").map(|v| Value::UInt(v.into())),
        ParamKind::U64 => parse_num::<u64>(trimmed, text, "UInt").map(Value::UInt),
        ParamKind::F32 => trimmed
            .parse::<f32>()
            .map(|v| Value::Float(v.into()))
            .map_err(|_| bad_format(text, "Float")),
        ParamKind::F64 => trimmed
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| bad_format(text, "Float")),
        ParamKind::Char => {
            // Exactly one character, untrimmed.
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(Value::Char(c)),
                _ => Err(bad_format(text, "Char")),
            }
        }
        other => Err(bad_format(text, other.label())),
    }
}

/// Convert an array-kinded value.
///
/// The element count comes from splitting the bracket-trimmed text on
/// commas with empty segments dropped; every element is then filled from one
/// conversion of the whole, untrimmed text (by-reference elements replicate
/// the raw text itself). Multi-segment numeric arrays therefore fail to
/// convert, exactly as they always have; callers relying on arrays pass a
/// single unbracketed segment.
fn convert_array(text: &str, element: &ParamKind) -> CmdResult<Value> {
    let trimmed = text.trim_matches(|c| c == '[' || c == ']');
    let count = trimmed.split(',').filter(|s| !s.is_empty()).count();
    if count == 0 {
        return Ok(Value::Seq(Vec::new()));
    }

    let filler = if element.is_by_ref() || matches!(element, ParamKind::Array(_)) {
        Value::Text(text.to_string())
    } else {
        convert_scalar(text, element)?
    };
    Ok(Value::Seq(vec![filler; count]))
}

fn parse_num<T: std::str::FromStr>(trimmed: &str, original: &str, label: &str) -> CmdResult<T> {
    trimmed
        .parse::<T>()
        .map_err(|_| bad_format(original, label))
}

fn bad_format(text: &str, kind: &str) -> CommandError {
    CommandError::ArgumentBadFormat(format!("could not convert \"{text}\" to {kind}"))
}

impl ParamKind {
    fn label(&self) -> &'static str {
        match self {
            ParamKind::Bool => "Bool",
            ParamKind::I8 | ParamKind::I16 | ParamKind::I32 | ParamKind::I64 => "Int",
            ParamKind::U8 | ParamKind::U16 | ParamKind::U32 | ParamKind::U64 => "UInt",
            ParamKind::F32 | ParamKind::F64 => "Float",
            ParamKind::Char => "Char",
            ParamKind::Str => "Str",
            ParamKind::Object => "Object",
            ParamKind::Convertible => "Convertible",
            ParamKind::Generic(_) => "Generic",
            ParamKind::Interface(_) => "Interface",
            ParamKind::Named(_) => "Named",
            ParamKind::Array(_) => "Array",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::ArgumentList;

    fn record(name: &str, value: &str) -> String {
        format!("<Parameter Name=\"{name}\" Value=\"{value}\" />")
    }

    #[test]
    fn test_parse_record_forms() {
        let (name, value) = parse_record("<Parameter Name=\"x\" Value=\"5\"/>").unwrap();
        assert_eq!((name.as_str(), value.as_str()), ("x", "5"));

        let (name, value) =
            parse_record("  < Parameter  Name = \"x\"  Value = \"5\" / >  ").unwrap();
        assert_eq!((name.as_str(), value.as_str()), ("x", "5"));

        let (name, value) =
            parse_record("<Parameter Name=\"x\" Value=\"5\"></Parameter>").unwrap();
        assert_eq!((name.as_str(), value.as_str()), ("x", "5"));
    }

    #[test]
    fn test_parse_record_rejects_garbage() {
        assert!(matches!(
            parse_record("<Parameter Name=\"x\">"),
            Err(CommandError::InvalidRecord)
        ));
        assert!(matches!(
            parse_record("not xml at all"),
            Err(CommandError::InvalidRecord)
        ));
        // Trailing junk after the closed tag.
        assert!(matches!(
            parse_record("<Parameter Name=\"x\" Value=\"5\"/>junk"),
            Err(CommandError::InvalidRecord)
        ));
    }

    #[test]
    fn test_find_parameter_from_start() {
        let mut args: ArgumentList = [record("x", "5"), record("y", "7")].into_iter().collect();
        let value = find_parameter(&mut args, "x", &ParamKind::I32).unwrap();
        assert_eq!(value, Value::Int(5));
    }

    #[test]
    fn test_find_parameter_from_middle_wraps() {
        let mut args: ArgumentList = [record("x", "5"), record("y", "7")].into_iter().collect();
        // Consume one record so the search starts at "y".
        let _ = args.next();
        let value = find_parameter(&mut args, "x", &ParamKind::I32).unwrap();
        assert_eq!(value, Value::Int(5));
    }

    #[test]
    fn test_find_parameter_from_exhausted_cursor() {
        let mut args: ArgumentList = [record("x", "5")].into_iter().collect();
        while args.next().is_some() {}
        let value = find_parameter(&mut args, "x", &ParamKind::I32).unwrap();
        assert_eq!(value, Value::Int(5));
    }

    #[test]
    fn test_missing_parameter_not_found() {
        let mut args: ArgumentList = [record("x", "5")].into_iter().collect();
        assert!(matches!(
            find_parameter(&mut args, "z", &ParamKind::I32),
            Err(CommandError::ParameterNotFound(name)) if name == "z"
        ));
    }

    #[test]
    fn test_empty_cursor_is_insufficient_args() {
        let mut args = ArgumentList::empty();
        assert!(matches!(
            find_parameter(&mut args, "x", &ParamKind::I32),
            Err(CommandError::ArgumentNull)
        ));
    }

    #[test]
    fn test_malformed_record_aborts_lookup() {
        let mut args: ArgumentList = [record("x", "5"), "<Broken".to_string()]
            .into_iter()
            .collect();
        // The lookup hits the broken record before wrapping back to "x".
        let _ = args.next();
        assert!(matches!(
            find_parameter(&mut args, "x", &ParamKind::I32),
            Err(CommandError::InvalidRecord)
        ));
    }

    #[test]
    fn test_scalar_conversions() {
        assert_eq!(convert("5", &ParamKind::I32).unwrap(), Value::Int(5));
        assert_eq!(convert("-12", &ParamKind::I64).unwrap(), Value::Int(-12));
        assert_eq!(convert("250", &ParamKind::U8).unwrap(), Value::UInt(250));
        assert_eq!(convert("1.5", &ParamKind::F64).unwrap(), Value::Float(1.5));
        assert_eq!(convert("q", &ParamKind::Char).unwrap(), Value::Char('q'));
        assert_eq!(convert(" 5 ", &ParamKind::I32).unwrap(), Value::Int(5));
    }

    #[test]
    fn test_bool_accepts_invariant_capitalization() {
        assert_eq!(convert("True", &ParamKind::Bool).unwrap(), Value::Bool(true));
        assert_eq!(
            convert("false", &ParamKind::Bool).unwrap(),
            Value::Bool(false)
        );
        assert!(convert("yes", &ParamKind::Bool).is_err());
    }

    #[test]
    fn test_by_ref_kinds_take_raw_text() {
        assert_eq!(
            convert("  raw text ", &ParamKind::Str).unwrap(),
            Value::Text("  raw text ".into())
        );
        assert_eq!(
            convert("3.14", &ParamKind::Object).unwrap(),
            Value::Text("3.14".into())
        );
    }

    #[test]
    fn test_conversion_failures_are_format_errors() {
        assert!(matches!(
            convert("abc", &ParamKind::I32),
            Err(CommandError::ArgumentBadFormat(_))
        ));
        assert!(matches!(
            convert("300", &ParamKind::U8),
            Err(CommandError::ArgumentBadFormat(_))
        ));
        assert!(matches!(
            convert("ab", &ParamKind::Char),
            Err(CommandError::ArgumentBadFormat(_))
        ));
    }

    #[test]
    fn test_array_single_segment_scalar() {
        let value = convert("5", &ParamKind::Array(Box::new(ParamKind::I32))).unwrap();
        assert_eq!(value, Value::Seq(vec![Value::Int(5)]));
    }

    #[test]
    fn test_array_count_from_segments_value_from_whole_text() {
        // Three segments, every slot filled with the raw text.
        let value = convert("[a,b,c]", &ParamKind::Array(Box::new(ParamKind::Str))).unwrap();
        assert_eq!(
            value,
            Value::Seq(vec![
                Value::Text("[a,b,c]".into()),
                Value::Text("[a,b,c]".into()),
                Value::Text("[a,b,c]".into()),
            ])
        );
    }

    #[test]
    fn test_array_multi_segment_numeric_fails_whole_text_conversion() {
        assert!(matches!(
            convert("1,2", &ParamKind::Array(Box::new(ParamKind::I32))),
            Err(CommandError::ArgumentBadFormat(_))
        ));
    }

    #[test]
    fn test_array_empty_text_is_empty_sequence() {
        let value = convert("[]", &ParamKind::Array(Box::new(ParamKind::I32))).unwrap();
        assert_eq!(value, Value::Seq(Vec::new()));
        let value = convert("", &ParamKind::Array(Box::new(ParamKind::I32))).unwrap();
        assert_eq!(value, Value::Seq(Vec::new()));
    }
}
