//! Parameter binding and row extraction.
//!
//! Both directions walk columns in the same order the printer emits them:
//! values are bound to `?` placeholders left to right, and a selected row is
//! read back column by column in declaration order, the order of the
//! printer's explicit select list.

use rowbind_core::{Record, Table, Value, ValueKind};
use rusqlite::types::Null;
use rusqlite::{Row, Statement};

use crate::error::{DbError, Result};

/// Binds `params` to the placeholders of `stmt`, first value to index 1.
///
/// # Errors
///
/// Returns [`DbError::ParameterCount`] if the statement has a different
/// number of placeholders, before anything is bound.
pub(crate) fn bind_params(stmt: &mut Statement<'_>, params: &[Value]) -> Result<()> {
    let expected = stmt.parameter_count();
    if expected != params.len() {
        return Err(DbError::ParameterCount {
            expected,
            bound: params.len(),
        });
    }

    for (i, value) in params.iter().enumerate() {
        let index = i + 1;
        match value {
            Value::Int(v) => stmt.raw_bind_parameter(index, *v)?,
            Value::BigInt(v) | Value::Key(v) => stmt.raw_bind_parameter(index, *v)?,
            Value::Real(v) => stmt.raw_bind_parameter(index, *v)?,
            Value::Text(v) => stmt.raw_bind_parameter(index, v.as_str())?,
            Value::Blob(v) => stmt.raw_bind_parameter(index, v.as_slice())?,
            Value::Null => stmt.raw_bind_parameter(index, Null)?,
        }
    }
    Ok(())
}

/// Reads column `index` of `row` as a value of `kind`.
fn read_value(row: &Row<'_>, index: usize, kind: ValueKind) -> Result<Value> {
    let value = match kind {
        ValueKind::Integer => row
            .get::<_, Option<i64>>(index)?
            .map_or(Value::Null, Value::BigInt),
        ValueKind::Key => row
            .get::<_, Option<i64>>(index)?
            .map_or(Value::Null, Value::Key),
        ValueKind::Real => row
            .get::<_, Option<f64>>(index)?
            .map_or(Value::Null, Value::Real),
        ValueKind::Text => row
            .get::<_, Option<String>>(index)?
            .map_or(Value::Null, Value::Text),
        ValueKind::Blob => row
            .get::<_, Option<Vec<u8>>>(index)?
            .map_or(Value::Null, Value::Blob),
    };
    Ok(value)
}

/// Builds a record from a row selected with the table's full column list.
///
/// # Errors
///
/// Returns [`DbError::Engine`] if a column holds a storage class that cannot
/// be read as the column's kind, or [`DbError::Conversion`] if the value
/// does not fit the record field.
pub(crate) fn extract_record<R: Record>(row: &Row<'_>, table: &Table<R>) -> Result<R> {
    let mut record = R::default();
    for (index, (def, access)) in table.columns().enumerate() {
        let value = read_value(row, index, def.kind())?;
        access
            .write(&mut record, value)
            .map_err(|source| DbError::Conversion {
                column: def.name().to_string(),
                source,
            })?;
    }
    Ok(record)
}
