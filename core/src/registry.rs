//! The schema registry: every mapped table, indexed by record type.
//!
//! A [`Registry`] is built once from a list of [`Table`]s and is immutable
//! afterwards. Building it validates the whole schema, so lookups by a
//! registered record type never fail and an unregistered type is reported
//! as [`SchemaError::UnregisteredType`].
//!
//! # Example
//!
//! ```
//! use rowbind_core::{field, Column, PrimaryKey, Registry, Table};
//!
//! #[derive(Default)]
//! struct Tag { id: PrimaryKey, label: String }
//!
//! let registry = Registry::builder()
//!     .table(
//!         Table::<Tag>::new("tags")
//!             .column(Column::new("id", field!(Tag, id)).primary_key())
//!             .column(Column::new("label", field!(Tag, label))),
//!     )
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(registry.table::<Tag>().unwrap().name(), "tags");
//! assert_eq!(registry.column_name(field!(Tag, label).token()).unwrap(), "label");
//! ```

use std::any::TypeId;
use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::error::{Result, SchemaError};
use crate::field::FieldToken;
use crate::table::{AnyTable, Table, TableDef};

/// Ordered, immutable collection of tables keyed by record type.
pub struct Registry {
    tables: Vec<Box<dyn AnyTable>>,
    index: HashMap<TypeId, usize>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Table definitions in registration order.
    pub fn tables(&self) -> impl Iterator<Item = &TableDef> {
        self.tables.iter().map(|t| t.def())
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Returns the typed table for record type `R`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UnregisteredType`] if `R` has no table.
    pub fn table<R: 'static>(&self) -> Result<&Table<R>> {
        self.index
            .get(&TypeId::of::<R>())
            .and_then(|&i| self.tables[i].as_any().downcast_ref::<Table<R>>())
            .ok_or(SchemaError::UnregisteredType(std::any::type_name::<R>()))
    }

    /// Returns the definition of the table storing `record`, if registered.
    pub fn table_def(&self, record: TypeId) -> Option<&TableDef> {
        self.index.get(&record).map(|&i| self.tables[i].def())
    }

    /// Resolves a field to its column name.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UnregisteredType`] if the field's record type
    /// has no table, or [`SchemaError::UnknownField`] if no column maps it.
    pub fn column_name(&self, token: FieldToken) -> Result<&str> {
        self.table_def(token.record())
            .ok_or(SchemaError::UnregisteredType(token.record_name()))?
            .column_name(token)
    }

    /// Resolves a field to the name of the table that stores it.
    pub fn table_name(&self, token: FieldToken) -> Result<&str> {
        self.table_def(token.record())
            .map(TableDef::name)
            .ok_or(SchemaError::UnregisteredType(token.record_name()))
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.tables().map(TableDef::name))
            .finish()
    }
}

/// Collects tables and validates them into a [`Registry`].
#[derive(Default)]
pub struct RegistryBuilder {
    tables: Vec<Box<dyn AnyTable>>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a table. Registration order is kept for schema creation.
    pub fn table<R: 'static>(mut self, table: Table<R>) -> Self {
        self.tables.push(Box::new(table));
        self
    }

    /// Validates every table and builds the registry.
    ///
    /// # Errors
    ///
    /// Returns the first [`SchemaError`] found: invalid or duplicate names,
    /// a record type registered twice, a missing or malformed primary key,
    /// or a foreign key that does not reference a registered primary key.
    pub fn build(self) -> Result<Registry> {
        let mut index = HashMap::new();
        let mut names = HashSet::new();

        for (i, table) in self.tables.iter().enumerate() {
            let def = table.def();
            def.validate()?;
            if !names.insert(def.name().to_string()) {
                return Err(SchemaError::DuplicateTable(def.name().to_string()));
            }
            if index.insert(def.record(), i).is_some() {
                return Err(SchemaError::DuplicateRecordType(def.record_name()));
            }
        }

        for table in &self.tables {
            let def = table.def();
            for fk in def.foreign_keys() {
                let target = fk.references();
                let resolved = index
                    .get(&target.record())
                    .and_then(|&i| self.tables[i].def().primary_key())
                    .is_some_and(|pk| pk.token() == target);
                if !resolved {
                    return Err(SchemaError::DanglingForeignKey {
                        table: def.name().to_string(),
                        column: def.column_name(fk.column())?.to_string(),
                        record: target.record_name(),
                        field: target.field(),
                    });
                }
            }
        }

        Ok(Registry {
            tables: self.tables,
            index,
        })
    }
}
