//! Typed CRUD facade.
//!
//! A [`Database`] owns one connection and one [`Registry`]. Opening it
//! reconciles the schema; afterwards every operation builds a statement
//! node, renders it together with its parameters, binds, executes, and
//! finalizes the statement before returning. A statement that fails part
//! way is dropped, which releases it on every error path as well.
//!
//! # Example
//!
//! ```
//! use rowbind_core::{field, Column, PrimaryKey, Registry, Select, Table};
//! use rowbind_sqlite::Database;
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct City { id: PrimaryKey, name: String, population: i64 }
//!
//! let registry = Registry::builder()
//!     .table(
//!         Table::<City>::new("cities")
//!             .column(Column::new("id", field!(City, id)).primary_key().auto_increment())
//!             .column(Column::new("name", field!(City, name)))
//!             .column(Column::new("population", field!(City, population))),
//!     )
//!     .build()?;
//!
//! let db = Database::open(":memory:", registry)?;
//! let id = db.insert(&City { name: "Oslo".into(), population: 709_000, ..Default::default() })?;
//!
//! let oslo = db.get::<City>(id)?.expect("inserted");
//! assert_eq!(oslo.id, id);
//!
//! let big = db.get_all(Select::new().filter(field!(City, population).gt(1_000_000)))?;
//! assert!(big.is_empty());
//! # Ok::<(), rowbind_sqlite::DbError>(())
//! ```

use std::path::PathBuf;

use rowbind_core::{
    Assignment, ColumnInfo, Comparator, Comparison, Delete, FieldRef, FieldValue, Insert,
    PrimaryKey, Record, Registry, Render, SchemaError, Select, Set, Table, Update, Value, Where,
    compile,
};
use tracing::debug;

use crate::config::DatabaseConfig;
use crate::connection::Connection;
use crate::error::Result;
use crate::migration::{MigrationReport, Migrator};
use crate::params::extract_record;

/// A migrated database bound to a registry of record types.
#[derive(Debug)]
pub struct Database {
    conn: Connection,
    registry: Registry,
    report: MigrationReport,
}

impl Database {
    /// Opens (creating if necessary) the database at `path` and migrates it.
    ///
    /// `":memory:"` opens a private in-memory database.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Open`](crate::DbError::Open) if the file cannot be
    /// opened, or [`DbError::Migration`](crate::DbError::Migration) if a
    /// table cannot be created or altered.
    pub fn open(path: impl Into<PathBuf>, registry: Registry) -> Result<Self> {
        Self::open_with(DatabaseConfig::new(path), registry)
    }

    /// Opens the database described by `config` and migrates it.
    pub fn open_with(config: DatabaseConfig, registry: Registry) -> Result<Self> {
        let conn = Connection::open(&config)?;
        let report = Migrator::new(&conn, &registry).run()?;
        Ok(Self {
            conn,
            registry,
            report,
        })
    }

    /// Report of the migration pass run when the database was opened.
    pub fn migration_report(&self) -> &MigrationReport {
        &self.report
    }

    /// Runs another reconciliation pass.
    pub fn update_schema(&self) -> Result<MigrationReport> {
        Migrator::new(&self.conn, &self.registry).run()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Name of the table storing `R`.
    pub fn table_name<R: Record>(&self) -> Result<&str> {
        Ok(self.registry.table::<R>()?.name())
    }

    /// Name of the column `field` is mapped to.
    pub fn column_name<R: Record, F: FieldValue>(&self, field: FieldRef<R, F>) -> Result<&str> {
        Ok(self.registry.column_name(field.token())?)
    }

    /// Live columns of the table storing `R`.
    pub fn table_info<R: Record>(&self) -> Result<Vec<ColumnInfo>> {
        self.conn.table_info(self.table_name::<R>()?)
    }

    /// Inserts `record` and returns the primary key the engine assigned.
    ///
    /// The record's own primary-key field is ignored.
    pub fn insert<R: Record>(&self, record: &R) -> Result<PrimaryKey> {
        let table = self.registry.table::<R>()?;
        let values = table
            .columns()
            .filter(|(def, _)| !def.is_primary_key())
            .map(|(def, access)| Assignment::<R>::from_value(def.token(), access.read(record)));
        self.execute(&Insert::<R>::new(values))?;
        Ok(self.conn.last_insert_id())
    }

    /// Fetches the record with primary key `key`.
    pub fn get<R: Record>(&self, key: impl Into<PrimaryKey>) -> Result<Option<R>> {
        let table = self.registry.table::<R>()?;
        let filter = key_filter(table, key.into())?;
        Ok(self
            .fetch(&Select::<R>::new().filter(filter), Some(1))?
            .into_iter()
            .next())
    }

    /// Writes every non-key field of `record` to the row with the record's
    /// primary key. Returns the number of rows changed.
    pub fn update<R: Record>(&self, record: &R) -> Result<usize> {
        let table = self.registry.table::<R>()?;
        let key = record_key(table, record)?;
        let assignments = table
            .columns()
            .filter(|(def, _)| !def.is_primary_key())
            .map(|(def, access)| Assignment::<R>::from_value(def.token(), access.read(record)));
        self.execute(&Update::<R>::new(Set::new(assignments)).filter(key_filter(table, key)?))
    }

    /// Returns every record matching `select`, in engine order.
    pub fn get_all<R: Record>(&self, select: Select<R>) -> Result<Vec<R>> {
        self.fetch(&select, None)
    }

    /// Applies `update` and returns the number of rows changed.
    pub fn update_all<R: Record>(&self, update: Update<R>) -> Result<usize> {
        self.execute(&update)
    }

    /// Deletes the row with `record`'s primary key. Returns the number of
    /// rows removed.
    pub fn remove<R: Record>(&self, record: &R) -> Result<usize> {
        let table = self.registry.table::<R>()?;
        let key = record_key(table, record)?;
        self.execute(&Delete::<R>::new().filter(key_filter(table, key)?))
    }

    /// Deletes every row matching `delete` and returns how many were removed.
    pub fn remove_all<R: Record>(&self, delete: Delete<R>) -> Result<usize> {
        self.execute(&delete)
    }

    /// Closes the connection.
    pub fn close(self) -> Result<()> {
        self.conn.close()
    }

    fn execute<N: Render>(&self, node: &N) -> Result<usize> {
        let compiled = compile(node, &self.registry)?;
        let mut stmt = self.conn.prepare(&compiled)?;
        let changed = stmt.raw_execute()?;
        stmt.finalize()?;
        debug!(changed, "statement executed");
        Ok(changed)
    }

    fn fetch<R: Record>(&self, select: &Select<R>, limit: Option<usize>) -> Result<Vec<R>> {
        let table = self.registry.table::<R>()?;
        let compiled = compile(select, &self.registry)?;
        let mut stmt = self.conn.prepare(&compiled)?;

        let mut records = Vec::new();
        {
            let mut rows = stmt.raw_query();
            while let Some(row) = rows.next()? {
                records.push(extract_record(row, table)?);
                if limit.is_some_and(|limit| records.len() >= limit) {
                    break;
                }
            }
        }
        stmt.finalize()?;
        debug!(rows = records.len(), "query returned");
        Ok(records)
    }
}

/// `WHERE <pk> = key` for `table`.
fn key_filter<R: Record>(table: &Table<R>, key: PrimaryKey) -> Result<Where<R>> {
    let pk = table
        .def()
        .primary_key()
        .ok_or_else(|| SchemaError::MissingPrimaryKey(table.name().to_string()))?;
    Ok(Where::new(Comparison::from_value(
        pk.token(),
        Comparator::Equal,
        Value::Key(key.get()),
    )))
}

fn record_key<R: Record>(table: &Table<R>, record: &R) -> Result<PrimaryKey> {
    let access = table
        .primary_key()
        .ok_or_else(|| SchemaError::MissingPrimaryKey(table.name().to_string()))?;
    match access.read(record) {
        Value::Key(key) => Ok(PrimaryKey(key)),
        _ => Err(SchemaError::MissingPrimaryKey(table.name().to_string()).into()),
    }
}
