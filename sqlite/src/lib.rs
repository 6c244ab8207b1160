//! SQLite backend for rowbind tables.
//!
//! This crate executes the statements built with
//! [`rowbind_core`] against an embedded SQLite database. It includes
//! additive schema migration, parameter binding and row extraction, and a
//! typed CRUD facade.
//!
//! # Architecture
//!
//! - **`config`**: YAML-loadable [`DatabaseConfig`]
//! - **`connection`**: Driver surface: open, execute, prepare, introspect
//! - **`params`**: Binds rendered parameters and reads rows back into records
//! - **`migration`**: [`Migrator`]: create missing tables, add missing columns
//! - **`database`**: [`Database`]: Insert, Get, Update, GetAll, UpdateAll,
//!   Remove, RemoveAll
//!
//! # Quick start
//!
//! ```no_run
//! use rowbind_core::{field, Column, Delete, PrimaryKey, Registry, Table};
//! use rowbind_sqlite::{Database, DatabaseConfig};
//!
//! #[derive(Default)]
//! struct Job { id: PrimaryKey, name: String, done: bool }
//!
//! let registry = Registry::builder()
//!     .table(
//!         Table::<Job>::new("jobs")
//!             .column(Column::new("id", field!(Job, id)).primary_key().auto_increment())
//!             .column(Column::new("name", field!(Job, name)).not_null())
//!             .column(Column::new("done", field!(Job, done))),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let config = DatabaseConfig::from_file("db.yaml").unwrap();
//! let db = Database::open_with(config, registry).unwrap();
//! println!("created: {:?}", db.migration_report().tables_created);
//!
//! db.insert(&Job { name: "build".into(), ..Default::default() }).unwrap();
//! let removed = db.remove_all(Delete::<Job>::new().filter(field!(Job, done).eq(true))).unwrap();
//! println!("removed {removed} finished jobs");
//! ```
//!
//! # Logging
//!
//! Rendered SQL is logged at `debug` level through [`tracing`], created
//! tables and added columns at `info`, and skipped conflicting columns at
//! `warn`. No subscriber is installed by this crate.

mod config;
mod connection;
mod database;
mod error;
mod migration;
mod params;

pub use config::DatabaseConfig;
pub use connection::Connection;
pub use database::Database;
pub use error::{DbError, Result};
pub use migration::{AddedColumn, MigrationReport, Migrator, SkippedColumn};
