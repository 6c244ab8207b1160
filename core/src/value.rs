//! Values bound to and read from statements.
//!
//! Every mapped record field has a [`ValueKind`] that decides its SQL type,
//! and converts to and from a [`Value`] through the [`FieldValue`] trait.
//! Conversions out of the store are lenient about SQL `NULL`: a non-optional
//! field reads `NULL` as its zero value (0, 0.0, empty string, empty bytes).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;
use crate::key::{ForeignKey, PrimaryKey};

/// Semantic kind of a mapped column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    Integer,
    Real,
    Text,
    Blob,
    /// Primary or foreign key; stored as an integer.
    Key,
}

impl ValueKind {
    /// SQL type keyword used in column definitions.
    pub fn sql_type(self) -> &'static str {
        match self {
            ValueKind::Integer | ValueKind::Key => "INTEGER",
            ValueKind::Real => "REAL",
            ValueKind::Text => "TEXT",
            ValueKind::Blob => "BLOB",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Integer => "integer",
            ValueKind::Real => "real",
            ValueKind::Text => "text",
            ValueKind::Blob => "blob",
            ValueKind::Key => "key",
        };
        f.write_str(name)
    }
}

/// A single bindable leaf.
///
/// Small and large integers are kept apart so the binder can dispatch on
/// them; keys are unwrapped to their integer id when bound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Int(i32),
    BigInt(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
    Key(i64),
    Null,
}

impl Value {
    /// Short name of the variant, used in conversion errors.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "small integer",
            Value::BigInt(_) => "integer",
            Value::Real(_) => "real",
            Value::Text(_) => "text",
            Value::Blob(_) => "blob",
            Value::Key(_) => "key",
            Value::Null => "null",
        }
    }

    /// Renders the value as a SQL literal, as used in `DEFAULT` clauses.
    ///
    /// # Examples
    ///
    /// ```
    /// use rowbind_core::Value;
    ///
    /// assert_eq!(Value::Text("it's".into()).sql_literal(), "'it''s'");
    /// assert_eq!(Value::Blob(vec![0xab, 0x01]).sql_literal(), "X'AB01'");
    /// assert_eq!(Value::Real(1.5).sql_literal(), "1.5");
    /// ```
    pub fn sql_literal(&self) -> String {
        match self {
            Value::Int(v) => v.to_string(),
            Value::BigInt(v) | Value::Key(v) => v.to_string(),
            Value::Real(v) => format!("{v:?}"),
            Value::Text(s) => format!("'{}'", s.replace('\'', "''")),
            Value::Blob(bytes) => {
                let hex: String = bytes.iter().map(|b| format!("{b:02X}")).collect();
                format!("X'{hex}'")
            }
            Value::Null => "NULL".to_string(),
        }
    }

    fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(i64::from(*v)),
            Value::BigInt(v) | Value::Key(v) => Some(*v),
            _ => None,
        }
    }
}

/// Conversion between a record field's Rust type and a [`Value`].
///
/// Implemented for the integer, floating point, text, blob, and key types
/// the mapper supports, and for `Option<T>` of any of them.
pub trait FieldValue: Sized + 'static {
    /// Semantic kind of columns holding this type.
    const KIND: ValueKind;

    fn to_value(&self) -> Value;

    fn from_value(value: Value) -> Result<Self, ValueError>;
}

fn mismatch<T>(expected: &'static str, found: &Value) -> Result<T, ValueError> {
    Err(ValueError::KindMismatch {
        expected,
        found: found.kind_name(),
    })
}

macro_rules! integer_field {
    ($ty:ty, $variant:ident, $wide:ty) => {
        impl FieldValue for $ty {
            const KIND: ValueKind = ValueKind::Integer;

            fn to_value(&self) -> Value {
                Value::$variant(<$wide>::from(*self))
            }

            fn from_value(value: Value) -> Result<Self, ValueError> {
                if value == Value::Null {
                    return Ok(0);
                }
                match value.as_integer() {
                    Some(v) => <$ty>::try_from(v).map_err(|_| ValueError::OutOfRange {
                        value: v,
                        target: stringify!($ty),
                    }),
                    None => mismatch("integer", &value),
                }
            }
        }
    };
}

integer_field!(i8, Int, i32);
integer_field!(i16, Int, i32);
integer_field!(i32, Int, i32);
integer_field!(u8, Int, i32);
integer_field!(u16, Int, i32);
integer_field!(u32, BigInt, i64);
integer_field!(i64, BigInt, i64);

impl FieldValue for bool {
    const KIND: ValueKind = ValueKind::Integer;

    fn to_value(&self) -> Value {
        Value::Int(i32::from(*self))
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Null => Ok(false),
            other => match other.as_integer() {
                Some(v) => Ok(v != 0),
                None => mismatch("integer", &other),
            },
        }
    }
}

impl FieldValue for f64 {
    const KIND: ValueKind = ValueKind::Real;

    fn to_value(&self) -> Value {
        Value::Real(*self)
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Real(v) => Ok(v),
            Value::Null => Ok(0.0),
            other => match other.as_integer() {
                Some(v) => Ok(v as f64),
                None => mismatch("real", &other),
            },
        }
    }
}

impl FieldValue for f32 {
    const KIND: ValueKind = ValueKind::Real;

    fn to_value(&self) -> Value {
        Value::Real(f64::from(*self))
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        f64::from_value(value).map(|v| v as f32)
    }
}

impl FieldValue for String {
    const KIND: ValueKind = ValueKind::Text;

    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Text(s) => Ok(s),
            Value::Null => Ok(String::new()),
            other => mismatch("text", &other),
        }
    }
}

impl FieldValue for Vec<u8> {
    const KIND: ValueKind = ValueKind::Blob;

    fn to_value(&self) -> Value {
        Value::Blob(self.clone())
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Blob(bytes) => Ok(bytes),
            Value::Null => Ok(Vec::new()),
            other => mismatch("blob", &other),
        }
    }
}

macro_rules! key_field {
    ($key:ident) => {
        impl FieldValue for $key {
            const KIND: ValueKind = ValueKind::Key;

            fn to_value(&self) -> Value {
                Value::Key(self.0)
            }

            fn from_value(value: Value) -> Result<Self, ValueError> {
                match value {
                    Value::Null => Ok($key::default()),
                    other => match other.as_integer() {
                        Some(v) => Ok($key(v)),
                        None => mismatch("key", &other),
                    },
                }
            }
        }
    };
}

key_field!(PrimaryKey);
key_field!(ForeignKey);

impl<T: FieldValue> FieldValue for Option<T> {
    const KIND: ValueKind = T::KIND;

    fn to_value(&self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::Null,
        }
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}
