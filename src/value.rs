//! Dynamic values exchanged between the engine and instrument method bodies.
//!
//! The engine never sees an instrument method's real signature. Declarations
//! describe each parameter with a [`ParamKind`] tag, and the marshalled call
//! itself moves [`Value`]s: the codec converts argument text into `Value`s of
//! the declared kinds, the method body reads them and fills output slots, and
//! the result encoder renders whatever comes back. `Value` is the crate's
//! replacement for an erased "object" reference: a tagged variant covering
//! the primitive kinds, text, sequences, and opaque display-only handles.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Declared kind of one command parameter, result, or return value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParamKind {
    /// Boolean primitive.
    Bool,
    /// Signed 8-bit integer.
    I8,
    /// Unsigned 8-bit integer.
    U8,
    /// Signed 16-bit integer.
    I16,
    /// Unsigned 16-bit integer.
    U16,
    /// Signed 32-bit integer.
    I32,
    /// Unsigned 32-bit integer.
    U32,
    /// Signed 64-bit integer.
    I64,
    /// Unsigned 64-bit integer.
    U64,
    /// 32-bit float.
    F32,
    /// 64-bit float.
    F64,
    /// Single character.
    Char,
    /// Text; assignable directly from the argument's value string.
    Str,
    /// The universal erased reference kind; receives the raw value string.
    Object,
    /// Capability tag for types that convert themselves from text.
    Convertible,
    /// An open type parameter. Rejected for non-output parameters.
    Generic(String),
    /// A named interface kind. Rejected unless it is the convertible
    /// capability, which has its own tag.
    Interface(String),
    /// Some other named concrete type with no string conversion. Rejected
    /// for non-output parameters.
    Named(String),
    /// Array of an element kind.
    Array(Box<ParamKind>),
}

impl ParamKind {
    /// True for the fixed-size primitive kinds that are parsed from text.
    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            ParamKind::Bool
                | ParamKind::I8
                | ParamKind::U8
                | ParamKind::I16
                | ParamKind::U16
                | ParamKind::I32
                | ParamKind::U32
                | ParamKind::I64
                | ParamKind::U64
                | ParamKind::F32
                | ParamKind::F64
                | ParamKind::Char
        )
    }

    /// True for kinds that receive the raw value text instead of a parsed
    /// scalar.
    pub fn is_by_ref(&self) -> bool {
        matches!(
            self,
            ParamKind::Str
                | ParamKind::Object
                | ParamKind::Convertible
                | ParamKind::Generic(_)
                | ParamKind::Interface(_)
        )
    }
}

/// A dynamically typed value.
#[derive(Clone)]
pub enum Value {
    /// Absent reference; renders as nothing.
    Null,
    /// Boolean.
    Bool(bool),
    /// Signed integer (all signed widths widen here).
    Int(i64),
    /// Unsigned integer (all unsigned widths widen here).
    UInt(u64),
    /// Float (both widths widen here).
    Float(f64),
    /// Single character.
    Char(char),
    /// Text.
    Text(String),
    /// Sequence of values.
    Seq(Vec<Value>),
    /// Opaque handle rendered through its display form.
    Opaque(Arc<dyn fmt::Display + Send + Sync>),
}

impl Value {
    /// Zero-initialized storage for an output slot of the given kind.
    ///
    /// Reference kinds start absent; primitives start at their zero.
    pub fn zero_of(kind: &ParamKind) -> Value {
        match kind {
            ParamKind::Bool => Value::Bool(false),
            ParamKind::I8 | ParamKind::I16 | ParamKind::I32 | ParamKind::I64 => Value::Int(0),
            ParamKind::U8 | ParamKind::U16 | ParamKind::U32 | ParamKind::U64 => Value::UInt(0),
            ParamKind::F32 | ParamKind::F64 => Value::Float(0.0),
            ParamKind::Char => Value::Char('\0'),
            _ => Value::Null,
        }
    }

    /// Short label for the variant, used where a value must be named
    /// without rendering its contents.
    pub fn kind_label(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Bool(_) => "Bool",
            Value::Int(_) => "Int",
            Value::UInt(_) => "UInt",
            Value::Float(_) => "Float",
            Value::Char(_) => "Char",
            Value::Text(_) => "Text",
            Value::Seq(_) => "Seq",
            Value::Opaque(_) => "Opaque",
        }
    }

    /// Boolean view.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Signed integer view; unsigned values convert when they fit.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            Value::UInt(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Unsigned integer view; signed values convert when non-negative.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::UInt(v) => Some(*v),
            Value::Int(v) => u64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Float view; integer values widen.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Int(v) => Some(*v as f64),
            Value::UInt(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Text view.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Sequence view.
    pub fn as_seq(&self) -> Option<&[Value]> {
        match self {
            Value::Seq(items) => Some(items),
            _ => None,
        }
    }

    /// True when the value is the absent reference.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "Null"),
            Value::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
            Value::Int(v) => f.debug_tuple("Int").field(v).finish(),
            Value::UInt(v) => f.debug_tuple("UInt").field(v).finish(),
            Value::Float(v) => f.debug_tuple("Float").field(v).finish(),
            Value::Char(v) => f.debug_tuple("Char").field(v).finish(),
            Value::Text(v) => f.debug_tuple("Text").field(v).finish(),
            Value::Seq(v) => f.debug_tuple("Seq").field(v).finish(),
            Value::Opaque(v) => write!(f, "Opaque({v})"),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::UInt(a), Value::UInt(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Seq(a), Value::Seq(b)) => a == b,
            (Value::Opaque(a), Value::Opaque(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::UInt(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_of_primitives() {
        assert_eq!(Value::zero_of(&ParamKind::Bool), Value::Bool(false));
        assert_eq!(Value::zero_of(&ParamKind::I32), Value::Int(0));
        assert_eq!(Value::zero_of(&ParamKind::U16), Value::UInt(0));
        assert_eq!(Value::zero_of(&ParamKind::F64), Value::Float(0.0));
        assert_eq!(Value::zero_of(&ParamKind::Char), Value::Char('\0'));
    }

    #[test]
    fn test_zero_of_reference_kinds_is_null() {
        assert!(Value::zero_of(&ParamKind::Str).is_null());
        assert!(Value::zero_of(&ParamKind::Object).is_null());
        assert!(Value::zero_of(&ParamKind::Array(Box::new(ParamKind::I32))).is_null());
        assert!(Value::zero_of(&ParamKind::Named("Roi".into())).is_null());
    }

    #[test]
    fn test_by_ref_policy() {
        assert!(ParamKind::Str.is_by_ref());
        assert!(ParamKind::Object.is_by_ref());
        assert!(ParamKind::Convertible.is_by_ref());
        assert!(!ParamKind::I32.is_by_ref());
        assert!(!ParamKind::Array(Box::new(ParamKind::Str)).is_by_ref());
    }

    #[test]
    fn test_numeric_views_widen() {
        assert_eq!(Value::UInt(7).as_i64(), Some(7));
        assert_eq!(Value::Int(-1).as_u64(), None);
        assert_eq!(Value::Int(3).as_f64(), Some(3.0));
    }

    #[test]
    fn test_opaque_compares_by_rendering() {
        let a = Value::Opaque(Arc::new("handle-1"));
        let b = Value::Opaque(Arc::new(String::from("handle-1")));
        assert_eq!(a, b);
    }
}
