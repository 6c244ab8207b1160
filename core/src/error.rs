//! Error types for schema description and statement rendering.
//!
//! [`SchemaError`] covers everything that can go wrong while registering
//! tables or resolving names through a [`Registry`](crate::Registry).
//! [`ValueError`] covers conversions between stored values and record fields.

use thiserror::Error;

use crate::value::ValueKind;

/// Errors raised while building a registry or rendering statements against it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Table or column name is empty or contains characters other than
    /// alphanumerics and underscores.
    #[error("invalid identifier '{0}': must be non-empty and contain only alphanumeric characters and underscores")]
    InvalidName(String),

    /// Two tables share a name.
    #[error("duplicate table name: {0}")]
    DuplicateTable(String),

    /// Two tables were registered for the same record type.
    #[error("record type {0} is registered more than once")]
    DuplicateRecordType(&'static str),

    /// Two columns in one table share a name.
    #[error("duplicate column '{column}' in table '{table}'")]
    DuplicateColumn { table: String, column: String },

    /// A REAL column default is NaN or infinite, which has no SQL literal.
    #[error("column '{column}' of table '{table}' has a non-finite default")]
    InvalidDefault { table: String, column: String },

    /// Two columns in one table map the same record field.
    #[error("field '{field}' is mapped by more than one column in table '{table}'")]
    DuplicateField { table: String, field: &'static str },

    /// A table declares no primary-key column.
    #[error("table '{0}' has no primary key column")]
    MissingPrimaryKey(String),

    /// A table declares more than one primary-key column.
    #[error("table '{0}' has more than one primary key column")]
    MultiplePrimaryKeys(String),

    /// The primary-key column is not of kind `Key`.
    #[error("primary key '{column}' of table '{table}' must be of kind Key, found {kind}")]
    PrimaryKeyKind {
        table: String,
        column: String,
        kind: ValueKind,
    },

    /// A field reference does not resolve to a column of the expected table.
    #[error("field '{record}::{field}' is not mapped to a column")]
    UnknownField {
        record: &'static str,
        field: &'static str,
    },

    /// A foreign key points at a field that is not a registered primary key.
    #[error("foreign key '{table}.{column}' references '{record}::{field}', which is not a registered primary key")]
    DanglingForeignKey {
        table: String,
        column: String,
        record: &'static str,
        field: &'static str,
    },

    /// An Update carries no assignments.
    #[error("update of table '{0}' assigns no columns")]
    EmptySet(String),

    /// The record type has no registered table.
    #[error("record type {0} is not registered")]
    UnregisteredType(&'static str),
}

/// Errors raised while converting a stored value into a record field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    /// The value has a different kind than the field expects.
    #[error("expected a {expected} value, found {found}")]
    KindMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// An integer does not fit the field's type.
    #[error("integer {value} is out of range for {target}")]
    OutOfRange { value: i64, target: &'static str },
}

/// Convenience alias for results with [`SchemaError`].
pub type Result<T> = std::result::Result<T, SchemaError>;
