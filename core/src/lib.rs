//! Engine-agnostic core of a typed record-to-table mapper.
//!
//! This crate describes how plain Rust structs map to relational tables and
//! turns operations on them into SQL:
//!
//! - [`Column`], [`ForeignKeyDef`], and [`Table`] describe one record type's
//!   columns and keys; [`Registry`] validates and indexes them by record type.
//! - [`Insert`], [`Select`], [`Update`], and [`Delete`] form a small
//!   statement algebra with [`Where`] and [`Set`] clauses built from typed
//!   [`FieldRef`] comparisons.
//! - The [`printer`] renders any node into SQL text together with the
//!   ordered literals for its `?` placeholders ([`CompiledStatement`]).
//! - [`diff_columns`] compares declared and live columns for additive
//!   schema migration.
//!
//! Executing statements is left to a driver crate.
//!
//! # Example
//!
//! ```
//! use rowbind_core::*;
//!
//! #[derive(Default)]
//! struct Account { id: PrimaryKey, email: String, balance: f64 }
//!
//! let registry = Registry::builder()
//!     .table(
//!         Table::<Account>::new("accounts")
//!             .column(Column::new("id", field!(Account, id)).primary_key().auto_increment())
//!             .column(Column::new("email", field!(Account, email)).not_null())
//!             .column(Column::new("balance", field!(Account, balance))),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let query = Select::<Account>::new().filter(field!(Account, balance).lt(0.0));
//! let compiled = compile(&query, &registry).unwrap();
//! assert_eq!(
//!     compiled.sql,
//!     r#"SELECT "id", "email", "balance" FROM "accounts" WHERE "balance" < ?"#
//! );
//! assert_eq!(compiled.params, vec![Value::Real(0.0)]);
//! ```

mod error;
mod field;
mod key;
mod migrate;
pub mod printer;
mod registry;
mod statement;
mod table;
mod value;

pub use error::{Result, SchemaError, ValueError};
pub use field::{FieldAccess, FieldRef, FieldToken};
pub use key::{ForeignKey, PrimaryKey};
pub use migrate::{ColumnConflict, ColumnDiff, ColumnInfo, diff_columns};
pub use printer::{CompiledStatement, Render, SqlWriter, compile, print};
pub use registry::{Registry, RegistryBuilder};
pub use statement::{
    Assignment, Comparator, Comparison, Delete, Insert, Predicate, Select, Set, Update, Where,
};
pub use table::{
    AnyTable, Column, ColumnDef, Constraint, ForeignKeyDef, ForeignKeyField, Record, Table,
    TableDef,
};
pub use value::{FieldValue, Value, ValueKind};
