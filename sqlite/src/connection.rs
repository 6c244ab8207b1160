//! Thin driver surface over a rusqlite connection.
//!
//! [`Connection`] owns the engine handle and exposes only what the migrator
//! and the [`Database`](crate::Database) facade need: opening with a
//! [`DatabaseConfig`], executing DDL, preparing bound statements, and table
//! introspection.

use std::path::{Path, PathBuf};

use rowbind_core::{ColumnInfo, CompiledStatement, PrimaryKey};
use rusqlite::{OpenFlags, Statement, params};
use tracing::debug;

use crate::config::DatabaseConfig;
use crate::error::{DbError, Result};
use crate::params::bind_params;

/// An open SQLite connection.
#[derive(Debug)]
pub struct Connection {
    conn: rusqlite::Connection,
    path: PathBuf,
}

impl Connection {
    /// Opens the database described by `config`.
    ///
    /// Foreign-key enforcement and the busy timeout are applied before the
    /// connection is returned.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Open`] if the file cannot be opened (including a
    /// missing file when `create_if_missing` is off) or configured.
    pub fn open(config: &DatabaseConfig) -> Result<Self> {
        let mut flags = OpenFlags::default();
        if !config.create_if_missing {
            flags.remove(OpenFlags::SQLITE_OPEN_CREATE);
        }

        let open_error = |source| DbError::Open {
            path: config.path.clone(),
            source,
        };

        let conn = rusqlite::Connection::open_with_flags(&config.path, flags).map_err(open_error)?;
        // The bundled library enables enforcement by default.
        let foreign_keys = if config.enforce_foreign_keys { "ON" } else { "OFF" };
        conn.execute_batch(&format!("PRAGMA foreign_keys = {foreign_keys};"))
            .map_err(open_error)?;
        if let Some(timeout) = config.busy_timeout() {
            conn.busy_timeout(timeout).map_err(open_error)?;
        }

        debug!(path = %config.path.display(), "opened database");
        Ok(Self {
            conn,
            path: config.path.clone(),
        })
    }

    /// Opens a private in-memory database with default settings.
    pub fn open_in_memory() -> Result<Self> {
        Self::open(&DatabaseConfig::new(":memory:"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Executes one or more statements that take no parameters.
    pub fn exec(&self, sql: &str) -> Result<()> {
        debug!(sql, "executing");
        self.conn.execute_batch(sql)?;
        Ok(())
    }

    /// Prepares `statement` and binds its parameters in order.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Engine`] if SQLite rejects the SQL, or
    /// [`DbError::ParameterCount`] if the placeholder count does not match
    /// the number of values.
    pub fn prepare(&self, statement: &CompiledStatement) -> Result<Statement<'_>> {
        debug!(sql = %statement.sql, params = statement.params.len(), "preparing");
        let mut stmt = self.conn.prepare(&statement.sql)?;
        bind_params(&mut stmt, &statement.params)?;
        Ok(stmt)
    }

    /// Primary key assigned by the most recent successful insert.
    pub fn last_insert_id(&self) -> PrimaryKey {
        PrimaryKey(self.conn.last_insert_rowid())
    }

    /// Returns whether a table called `table` exists.
    pub fn table_exists(&self, table: &str) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            params![table],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Lists the live columns of `table` in position order.
    ///
    /// Returns an empty list if the table does not exist.
    pub fn table_info(&self, table: &str) -> Result<Vec<ColumnInfo>> {
        let mut stmt = self.conn.prepare(
            "SELECT cid, name, type, \"notnull\", dflt_value, pk \
             FROM pragma_table_info(?1) ORDER BY cid",
        )?;
        let columns = stmt
            .query_map(params![table], |row| {
                Ok(ColumnInfo {
                    cid: row.get(0)?,
                    name: row.get(1)?,
                    sql_type: row.get(2)?,
                    not_null: row.get::<_, i64>(3)? != 0,
                    default: row.get(4)?,
                    primary_key: row.get::<_, i64>(5)? != 0,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(columns)
    }

    /// Returns a reference to the underlying rusqlite connection.
    pub fn raw(&self) -> &rusqlite::Connection {
        &self.conn
    }

    /// Closes the connection, reporting any error from the engine.
    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, e)| DbError::Engine(e))
    }
}
