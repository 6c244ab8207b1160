//! Table and column descriptors.
//!
//! A [`Table`] maps one record type to a named table: an ordered list of
//! [`Column`]s, each bound to one record field, followed by table-level
//! foreign-key constraints. The declared column order is the order used
//! everywhere else: column definitions, select lists, bound parameters,
//! and row extraction.
//!
//! # Example
//!
//! ```
//! use rowbind_core::{field, Column, ForeignKey, PrimaryKey, Table};
//!
//! #[derive(Default)]
//! struct Author { id: PrimaryKey, name: String }
//!
//! #[derive(Default)]
//! struct Book { id: PrimaryKey, author: ForeignKey, title: String }
//!
//! let books = Table::<Book>::new("books")
//!     .column(Column::new("id", field!(Book, id)).primary_key().auto_increment())
//!     .column(Column::new("author", field!(Book, author)))
//!     .column(Column::new("title", field!(Book, title)).not_null())
//!     .foreign_key(field!(Book, author), field!(Author, id));
//!
//! assert_eq!(books.def().foreign_key_count(), 1);
//! assert_eq!(books.def().primary_key().unwrap().name(), "id");
//! ```

use std::any::{Any, TypeId};
use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SchemaError};
use crate::field::{FieldAccess, FieldRef, FieldToken};
use crate::key::{ForeignKey, PrimaryKey};
use crate::migrate::ColumnInfo;
use crate::value::{FieldValue, Value, ValueKind};

/// Column constraint keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Constraint {
    PrimaryKey,
    AutoIncrement,
    NotNull,
}

impl Constraint {
    pub fn sql(self) -> &'static str {
        match self {
            Constraint::PrimaryKey => "PRIMARY KEY",
            Constraint::AutoIncrement => "AUTOINCREMENT",
            Constraint::NotNull => "NOT NULL",
        }
    }
}

/// Engine-agnostic metadata of one column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    name: String,
    token: FieldToken,
    kind: ValueKind,
    constraints: Vec<Constraint>,
    default: Option<Value>,
}

impl ColumnDef {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn token(&self) -> FieldToken {
        self.token
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    /// Constraints in declaration order.
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn has(&self, constraint: Constraint) -> bool {
        self.constraints.contains(&constraint)
    }

    pub fn is_primary_key(&self) -> bool {
        self.has(Constraint::PrimaryKey)
    }

    /// Describes the column the way table introspection reports it.
    pub fn info(&self, cid: i64) -> ColumnInfo {
        ColumnInfo {
            cid,
            name: self.name.clone(),
            sql_type: self.kind.sql_type().to_string(),
            not_null: self.has(Constraint::NotNull),
            default: self.default.as_ref().map(Value::sql_literal),
            primary_key: self.is_primary_key(),
        }
    }
}

/// A column bound to a field of record type `R`.
pub struct Column<R> {
    def: ColumnDef,
    access: Box<dyn FieldAccess<R>>,
}

impl<R: 'static> Column<R> {
    /// Maps `field` to a column called `name`.
    pub fn new<F: FieldValue>(name: impl Into<String>, field: FieldRef<R, F>) -> Self {
        Self {
            def: ColumnDef {
                name: name.into(),
                token: field.token(),
                kind: F::KIND,
                constraints: Vec::new(),
                default: None,
            },
            access: Box::new(field),
        }
    }

    /// Adds a constraint; repeated constraints are kept once.
    pub fn constraint(mut self, constraint: Constraint) -> Self {
        if !self.def.constraints.contains(&constraint) {
            self.def.constraints.push(constraint);
        }
        self
    }

    pub fn primary_key(self) -> Self {
        self.constraint(Constraint::PrimaryKey)
    }

    pub fn auto_increment(self) -> Self {
        self.constraint(Constraint::AutoIncrement)
    }

    pub fn not_null(self) -> Self {
        self.constraint(Constraint::NotNull)
    }

    /// Sets the `DEFAULT` value used when the column is created or added.
    pub fn default_value<V: FieldValue>(mut self, value: V) -> Self {
        self.def.default = Some(value.to_value());
        self
    }

    pub fn def(&self) -> &ColumnDef {
        &self.def
    }
}

impl<R> fmt::Debug for Column<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column").field("def", &self.def).finish()
    }
}

/// Marker for field types allowed on the referencing side of a foreign key.
pub trait ForeignKeyField: FieldValue {}

impl ForeignKeyField for ForeignKey {}
impl ForeignKeyField for Option<ForeignKey> {}

/// Table-level foreign-key constraint.
///
/// `column` is a field of the owning table; `references` is the primary-key
/// field of the referenced record type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignKeyDef {
    column: FieldToken,
    references: FieldToken,
}

impl ForeignKeyDef {
    pub fn new<R: 'static, F: ForeignKeyField, U: 'static>(
        column: FieldRef<R, F>,
        references: FieldRef<U, PrimaryKey>,
    ) -> Self {
        Self {
            column: column.token(),
            references: references.token(),
        }
    }

    pub fn column(&self) -> FieldToken {
        self.column
    }

    pub fn references(&self) -> FieldToken {
        self.references
    }
}

/// Engine-agnostic metadata of one table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableDef {
    name: String,
    record: TypeId,
    record_name: &'static str,
    columns: Vec<ColumnDef>,
    foreign_keys: Vec<ForeignKeyDef>,
}

impl TableDef {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Type id of the record type this table stores.
    pub fn record(&self) -> TypeId {
        self.record
    }

    pub fn record_name(&self) -> &'static str {
        self.record_name
    }

    /// Columns in declaration order.
    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    pub fn foreign_keys(&self) -> &[ForeignKeyDef] {
        &self.foreign_keys
    }

    pub fn foreign_key_count(&self) -> usize {
        self.foreign_keys.len()
    }

    /// Returns the primary-key column, if one is declared.
    pub fn primary_key(&self) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.is_primary_key())
    }

    /// Columns whose semantic kind is `kind`.
    pub fn columns_of_kind(&self, kind: ValueKind) -> impl Iterator<Item = &ColumnDef> {
        self.columns.iter().filter(move |c| c.kind == kind)
    }

    pub fn column(&self, token: FieldToken) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.token == token)
    }

    /// Resolves a field to its column name.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UnknownField`] if no column maps the field.
    pub fn column_name(&self, token: FieldToken) -> Result<&str> {
        self.column(token)
            .map(ColumnDef::name)
            .ok_or(SchemaError::UnknownField {
                record: token.record_name(),
                field: token.field(),
            })
    }

    /// Declared columns as introspection rows, numbered in declaration order.
    pub fn column_infos(&self) -> Vec<ColumnInfo> {
        self.columns
            .iter()
            .enumerate()
            .map(|(cid, c)| c.info(cid as i64))
            .collect()
    }

    /// Checks the invariants that need no other table.
    pub(crate) fn validate(&self) -> Result<()> {
        validate_identifier(&self.name)?;

        let mut names = HashSet::new();
        let mut fields = HashSet::new();
        for column in &self.columns {
            validate_identifier(&column.name)?;
            if !names.insert(column.name.as_str()) {
                return Err(SchemaError::DuplicateColumn {
                    table: self.name.clone(),
                    column: column.name.clone(),
                });
            }
            if !fields.insert(column.token.field()) {
                return Err(SchemaError::DuplicateField {
                    table: self.name.clone(),
                    field: column.token.field(),
                });
            }
            if matches!(column.default, Some(Value::Real(v)) if !v.is_finite()) {
                return Err(SchemaError::InvalidDefault {
                    table: self.name.clone(),
                    column: column.name.clone(),
                });
            }
        }

        let mut keys = self.columns.iter().filter(|c| c.is_primary_key());
        let pk = keys
            .next()
            .ok_or_else(|| SchemaError::MissingPrimaryKey(self.name.clone()))?;
        if keys.next().is_some() {
            return Err(SchemaError::MultiplePrimaryKeys(self.name.clone()));
        }
        if pk.kind != ValueKind::Key {
            return Err(SchemaError::PrimaryKeyKind {
                table: self.name.clone(),
                column: pk.name.clone(),
                kind: pk.kind,
            });
        }

        for fk in &self.foreign_keys {
            self.column_name(fk.column)?;
        }
        Ok(())
    }
}

/// Validates that an identifier contains only alphanumeric characters and underscores.
pub(crate) fn validate_identifier(name: &str) -> Result<()> {
    if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return Err(SchemaError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// A record type that can be stored in a table.
///
/// Rows are read back by filling a default-constructed record field by
/// field, so every mapped type must implement [`Default`].
pub trait Record: Default + 'static {}

impl<T: Default + 'static> Record for T {}

/// Mapping of record type `R` to a table.
pub struct Table<R> {
    def: TableDef,
    fields: Vec<Box<dyn FieldAccess<R>>>,
}

impl<R: 'static> Table<R> {
    /// Creates an empty table called `name` for record type `R`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            def: TableDef {
                name: name.into(),
                record: TypeId::of::<R>(),
                record_name: std::any::type_name::<R>(),
                columns: Vec::new(),
                foreign_keys: Vec::new(),
            },
            fields: Vec::new(),
        }
    }

    /// Appends a column.
    pub fn column(mut self, column: Column<R>) -> Self {
        self.def.columns.push(column.def);
        self.fields.push(column.access);
        self
    }

    /// Declares that `column` stores the primary key of `U` held in `references`.
    pub fn foreign_key<F: ForeignKeyField, U: 'static>(
        mut self,
        column: FieldRef<R, F>,
        references: FieldRef<U, PrimaryKey>,
    ) -> Self {
        self.def
            .foreign_keys
            .push(ForeignKeyDef::new(column, references));
        self
    }

    pub fn def(&self) -> &TableDef {
        &self.def
    }

    pub fn name(&self) -> &str {
        &self.def.name
    }

    /// Column metadata paired with field access, in declaration order.
    pub fn columns(&self) -> impl Iterator<Item = (&ColumnDef, &dyn FieldAccess<R>)> {
        self.def
            .columns
            .iter()
            .zip(self.fields.iter().map(|f| -> &dyn FieldAccess<R> { f.as_ref() }))
    }

    /// Field access for the primary-key column.
    pub fn primary_key(&self) -> Option<&dyn FieldAccess<R>> {
        self.columns()
            .find(|(def, _)| def.is_primary_key())
            .map(|(_, access)| access)
    }
}

impl<R> fmt::Debug for Table<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table").field("def", &self.def).finish()
    }
}

/// Object-safe view of a [`Table`] of any record type.
pub trait AnyTable: Send + Sync {
    fn def(&self) -> &TableDef;

    fn as_any(&self) -> &dyn Any;
}

impl<R: 'static> AnyTable for Table<R> {
    fn def(&self) -> &TableDef {
        &self.def
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
