//! Field references: the identity of a mapped record field.
//!
//! A [`FieldRef`] names one field of a record type and carries accessors for
//! it. Columns, comparisons, and assignments all identify their field by the
//! [`FieldToken`] inside it, so resolving a field to a column name is a
//! token comparison rather than a string lookup.
//!
//! Use the [`field!`](crate::field) macro to build one:
//!
//! ```
//! use rowbind_core::{field, FieldValue, PrimaryKey, Value};
//!
//! #[derive(Default)]
//! struct Note {
//!     id: PrimaryKey,
//!     body: String,
//! }
//!
//! let body = field!(Note, body);
//! let note = Note { id: PrimaryKey(1), body: "hello".into() };
//! assert_eq!(body.token().field(), "body");
//! assert_eq!(body.get(&note).to_value(), Value::Text("hello".into()));
//! ```

use std::any::TypeId;
use std::fmt;
use std::marker::PhantomData;

use crate::error::ValueError;
use crate::value::{FieldValue, Value, ValueKind};

/// Identity of a record field: the record type plus the field name.
#[derive(Clone, Copy)]
pub struct FieldToken {
    record: TypeId,
    record_name: &'static str,
    field: &'static str,
}

impl FieldToken {
    /// Creates the token for field `field` of record type `R`.
    pub fn of<R: 'static>(field: &'static str) -> Self {
        Self {
            record: TypeId::of::<R>(),
            record_name: std::any::type_name::<R>(),
            field,
        }
    }

    pub fn record(&self) -> TypeId {
        self.record
    }

    /// Fully qualified name of the record type.
    pub fn record_name(&self) -> &'static str {
        self.record_name
    }

    pub fn field(&self) -> &'static str {
        self.field
    }
}

impl PartialEq for FieldToken {
    fn eq(&self, other: &Self) -> bool {
        self.record == other.record && self.field == other.field
    }
}

impl Eq for FieldToken {}

impl fmt::Debug for FieldToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.record_name, self.field)
    }
}

/// Typed reference to field `F` of record `R`.
pub struct FieldRef<R, F> {
    token: FieldToken,
    get: fn(&R) -> &F,
    get_mut: fn(&mut R) -> &mut F,
    _marker: PhantomData<fn() -> (R, F)>,
}

impl<R: 'static, F: FieldValue> FieldRef<R, F> {
    /// Creates a field reference from its name and accessors.
    ///
    /// Prefer the [`field!`](crate::field) macro, which derives all three
    /// from the field path.
    pub fn new(field: &'static str, get: fn(&R) -> &F, get_mut: fn(&mut R) -> &mut F) -> Self {
        Self {
            token: FieldToken::of::<R>(field),
            get,
            get_mut,
            _marker: PhantomData,
        }
    }

    pub fn token(&self) -> FieldToken {
        self.token
    }

    pub fn kind(&self) -> ValueKind {
        F::KIND
    }

    pub fn get<'r>(&self, record: &'r R) -> &'r F {
        (self.get)(record)
    }

    pub fn get_mut<'r>(&self, record: &'r mut R) -> &'r mut F {
        (self.get_mut)(record)
    }
}

impl<R, F> Clone for FieldRef<R, F> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R, F> Copy for FieldRef<R, F> {}

impl<R, F> fmt::Debug for FieldRef<R, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FieldRef").field(&self.token).finish()
    }
}

/// Type-erased read/write access to one field of `R`.
///
/// Columns store their field through this trait so a table can hold fields
/// of different Rust types in one ordered list.
pub trait FieldAccess<R>: Send + Sync {
    fn token(&self) -> FieldToken;

    fn kind(&self) -> ValueKind;

    fn read(&self, record: &R) -> Value;

    fn write(&self, record: &mut R, value: Value) -> Result<(), ValueError>;
}

impl<R: 'static, F: FieldValue> FieldAccess<R> for FieldRef<R, F> {
    fn token(&self) -> FieldToken {
        self.token
    }

    fn kind(&self) -> ValueKind {
        F::KIND
    }

    fn read(&self, record: &R) -> Value {
        self.get(record).to_value()
    }

    fn write(&self, record: &mut R, value: Value) -> Result<(), ValueError> {
        *self.get_mut(record) = F::from_value(value)?;
        Ok(())
    }
}

/// Builds a [`FieldRef`] for `field` of `Record`.
///
/// ```
/// use rowbind_core::{field, PrimaryKey, ValueKind};
///
/// #[derive(Default)]
/// struct Point { id: PrimaryKey, x: f64 }
///
/// assert_eq!(field!(Point, x).kind(), ValueKind::Real);
/// assert_eq!(field!(Point, id).kind(), ValueKind::Key);
/// ```
#[macro_export]
macro_rules! field {
    ($record:ty, $field:ident) => {
        $crate::FieldRef::<$record, _>::new(
            stringify!($field),
            |record: &$record| &record.$field,
            |record: &mut $record| &mut record.$field,
        )
    };
}
