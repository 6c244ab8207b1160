//! Error types for SQLite-backed database operations.
//!
//! Provides a unified error type covering connection, execution,
//! migration, schema, and conversion failures. Engine errors keep
//! rusqlite's native code and message.

use std::path::PathBuf;

use rowbind_core::{SchemaError, ValueError};
use thiserror::Error;

/// Errors that can occur while opening or using a [`Database`](crate::Database).
#[derive(Debug, Error)]
pub enum DbError {
    /// The database file could not be opened or configured.
    #[error("failed to open database at {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// SQLite rejected a statement: malformed SQL, constraint violation,
    /// or a bind/step failure.
    #[error("database error: {0}")]
    Engine(#[from] rusqlite::Error),

    /// Creating or altering a table failed while reconciling the schema.
    #[error("schema migration failed for table '{table}': {source}")]
    Migration {
        table: String,
        #[source]
        source: rusqlite::Error,
    },

    /// The declared schema is invalid, or a name could not be resolved.
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// A stored value could not be read into its record field.
    #[error("conversion error in column '{column}': {source}")]
    Conversion {
        column: String,
        #[source]
        source: ValueError,
    },

    /// The rendered SQL and the bound values disagree on the parameter count.
    #[error("statement expects {expected} parameters but {bound} were supplied")]
    ParameterCount { expected: usize, bound: usize },

    /// Configuration file could not be parsed or written.
    #[error("config error: {0}")]
    Config(String),

    /// File I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DbError {
    /// Returns SQLite's extended result code, if the error came from the engine.
    pub fn sqlite_code(&self) -> Option<i32> {
        let source = match self {
            DbError::Open { source, .. }
            | DbError::Engine(source)
            | DbError::Migration { source, .. } => source,
            _ => return None,
        };
        match source {
            rusqlite::Error::SqliteFailure(err, _) => Some(err.extended_code),
            _ => None,
        }
    }
}

/// Convenience alias for results with [`DbError`].
pub type Result<T> = std::result::Result<T, DbError>;
