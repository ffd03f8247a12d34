//! Result encoder.
//!
//! Renders the ordered `(name, value)` result pairs of one invocation into
//! the wire record: nothing at all for a resultless command, otherwise
//! `<Results><Result Name='N' Value='V'/>…</Results>` with no separators and
//! no surrounding whitespace.

use std::fmt::Write;

use crate::value::Value;

const RESULTS_START: &str = "<Results>";
const RESULTS_END: &str = "</Results>";
const RESULT_NAME_START: &str = "<Result Name='";
const RESULT_VALUE_START: &str = "' Value='";
const RESULT_END: &str = "'/>";

/// Render result pairs into one wire record. Empty input yields `""`.
pub fn render_results<'a, I>(pairs: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a Value)>,
{
    let mut iter = pairs.into_iter().peekable();
    if iter.peek().is_none() {
        return String::new();
    }

    // Rough guess: tag overhead plus a short name and value per entry.
    let mut out = String::with_capacity(RESULTS_START.len() * 2 + 60 * iter.size_hint().0.max(1));
    out.push_str(RESULTS_START);
    for (name, value) in iter {
        out.push_str(RESULT_NAME_START);
        out.push_str(name);
        out.push_str(RESULT_VALUE_START);
        append_value(&mut out, value);
        out.push_str(RESULT_END);
    }
    out.push_str(RESULTS_END);
    out
}

/// Append one value in its wire form.
///
/// Text is appended verbatim, primitives use their canonical decimal or
/// `True`/`False` form, sequences join their elements with commas (an absent
/// element leaves its slot empty, a nested sequence contributes only its
/// label), opaque handles use their display form, and an absent value
/// appends nothing.
pub fn append_value(out: &mut String, value: &Value) {
    match value {
        Value::Null => {}
        Value::Bool(v) => out.push_str(if *v { "True" } else { "False" }),
        Value::Int(v) => {
            let _ = write!(out, "{v}");
        }
        Value::UInt(v) => {
            let _ = write!(out, "{v}");
        }
        Value::Float(v) => {
            let _ = write!(out, "{v}");
        }
        Value::Char(v) => out.push(*v),
        Value::Text(v) => out.push_str(v),
        Value::Seq(items) => {
            for (index, item) in items.iter().enumerate() {
                if index > 0 {
                    out.push(',');
                }
                append_element(out, item);
            }
        }
        Value::Opaque(v) => {
            let _ = write!(out, "{v}");
        }
    }
}

fn append_element(out: &mut String, item: &Value) {
    match item {
        // No recursion into nested sequences.
        Value::Seq(_) => out.push_str(item.kind_label()),
        other => append_value(out, other),
    }
}
