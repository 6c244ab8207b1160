//! Additive schema reconciliation against a live database.
//!
//! [`Migrator`] walks the registry in registration order. For each table it
//! issues `CREATE TABLE IF NOT EXISTS`, reads the live columns back, and adds
//! every declared column the live table lacks with `ALTER TABLE ... ADD
//! COLUMN`. Nothing is ever dropped, renamed, or retyped. A declared column
//! whose name exists live with different attributes is logged and reported
//! as a conflict; the live column is left untouched.
//!
//! Running the migrator twice against an unchanged registry issues no
//! `ALTER` statements the second time.

use rowbind_core::{ColumnConflict, ColumnInfo, Registry, TableDef, diff_columns, print};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::connection::Connection;
use crate::error::{DbError, Result};

/// A column added to an existing table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddedColumn {
    pub table: String,
    pub column: ColumnInfo,
}

/// A declared column left alone because the live one differs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedColumn {
    pub table: String,
    pub conflict: ColumnConflict,
}

/// What one migration pass changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    /// Tables that did not exist before this pass.
    pub tables_created: Vec<String>,
    /// Columns added by `ALTER TABLE`, in the order they were issued.
    pub columns_added: Vec<AddedColumn>,
    pub conflicts: Vec<SkippedColumn>,
}

impl MigrationReport {
    /// Number of `ALTER TABLE` statements issued.
    pub fn alter_count(&self) -> usize {
        self.columns_added.len()
    }

    /// True if the pass created and altered nothing.
    pub fn is_unchanged(&self) -> bool {
        self.tables_created.is_empty() && self.columns_added.is_empty()
    }
}

/// Reconciles the live schema with a registry.
pub struct Migrator<'a> {
    conn: &'a Connection,
    registry: &'a Registry,
}

impl<'a> Migrator<'a> {
    pub fn new(conn: &'a Connection, registry: &'a Registry) -> Self {
        Self { conn, registry }
    }

    /// Runs one reconciliation pass over every registered table.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Migration`] naming the table whose `CREATE` or
    /// `ALTER` the engine rejected. Tables before it stay migrated.
    pub fn run(&self) -> Result<MigrationReport> {
        let mut report = MigrationReport::default();
        for table in self.registry.tables() {
            self.migrate_table(table, &mut report)?;
        }
        debug!(
            created = report.tables_created.len(),
            added = report.columns_added.len(),
            conflicts = report.conflicts.len(),
            "schema reconciled"
        );
        Ok(report)
    }

    fn migrate_table(&self, table: &TableDef, report: &mut MigrationReport) -> Result<()> {
        let name = table.name();
        let existed = self.conn.table_exists(name).map_err(in_table(name))?;

        let ddl = print(table, self.registry)?;
        self.conn.exec(&ddl).map_err(in_table(name))?;
        if !existed {
            info!(table = name, "created table");
            report.tables_created.push(name.to_string());
        }

        let live = self.conn.table_info(name).map_err(in_table(name))?;
        let diff = diff_columns(&table.column_infos(), &live);

        for conflict in diff.conflicts {
            warn!(
                table = name,
                column = %conflict.declared.name,
                declared_type = %conflict.declared.sql_type,
                live_type = %conflict.live.sql_type,
                "column differs from its declaration, leaving it unchanged"
            );
            report.conflicts.push(SkippedColumn {
                table: name.to_string(),
                conflict,
            });
        }

        for column in diff.missing {
            self.conn
                .exec(&column.add_column_sql(name))
                .map_err(in_table(name))?;
            info!(table = name, column = %column.name, "added column");
            report.columns_added.push(AddedColumn {
                table: name.to_string(),
                column,
            });
        }
        Ok(())
    }
}

/// Attributes an engine failure to the table being migrated.
fn in_table(table: &str) -> impl Fn(DbError) -> DbError + '_ {
    move |err| match err {
        DbError::Engine(source) => DbError::Migration {
            table: table.to_string(),
            source,
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowbind_core::{Column, PrimaryKey, Table, field};

    #[derive(Debug, Default)]
    struct Note {
        id: PrimaryKey,
        body: String,
        stars: i32,
    }

    fn registry(with_stars: bool) -> Registry {
        let mut table = Table::<Note>::new("notes")
            .column(Column::new("id", field!(Note, id)).primary_key().auto_increment())
            .column(Column::new("body", field!(Note, body)));
        if with_stars {
            table = table.column(Column::new("stars", field!(Note, stars)).default_value(0));
        }
        Registry::builder().table(table).build().unwrap()
    }

    #[test]
    fn test_first_run_creates_second_run_is_unchanged() {
        let conn = Connection::open_in_memory().unwrap();
        let registry = registry(true);
        let first = Migrator::new(&conn, &registry).run().unwrap();
        assert_eq!(first.tables_created, vec!["notes".to_string()]);
        assert_eq!(first.alter_count(), 0);

        let second = Migrator::new(&conn, &registry).run().unwrap();
        assert!(second.is_unchanged());
        assert!(second.conflicts.is_empty());
    }

    #[test]
    fn test_new_column_is_added_once() {
        let conn = Connection::open_in_memory().unwrap();
        Migrator::new(&conn, &registry(false)).run().unwrap();

        let grown = registry(true);
        let report = Migrator::new(&conn, &grown).run().unwrap();
        assert!(report.tables_created.is_empty());
        assert_eq!(report.alter_count(), 1);
        assert_eq!(report.columns_added[0].column.name, "stars");
        assert_eq!(report.columns_added[0].column.default.as_deref(), Some("0"));

        assert_eq!(conn.table_info("notes").unwrap().len(), 3);
        assert!(Migrator::new(&conn, &grown).run().unwrap().is_unchanged());
    }

    #[test]
    fn test_conflicting_column_is_reported_not_altered() {
        let conn = Connection::open_in_memory().unwrap();
        conn.exec(r#"CREATE TABLE "notes" ("id" INTEGER PRIMARY KEY AUTOINCREMENT, "body" BLOB);"#)
            .unwrap();
        let report = Migrator::new(&conn, &registry(false)).run().unwrap();
        assert_eq!(report.alter_count(), 0);
        assert_eq!(report.conflicts.len(), 1);
        assert_eq!(report.conflicts[0].conflict.live.sql_type, "BLOB");
        assert_eq!(conn.table_info("notes").unwrap()[1].sql_type, "BLOB");
    }

    #[test]
    fn test_rejected_alter_names_the_table() {
        let conn = Connection::open_in_memory().unwrap();
        Migrator::new(&conn, &registry(false)).run().unwrap();
        conn.exec(r#"INSERT INTO "notes" ("body") VALUES ('kept');"#)
            .unwrap();

        // SQLite cannot add a NOT NULL column without a default to a non-empty table.
        let strict = Registry::builder()
            .table(
                Table::<Note>::new("notes")
                    .column(Column::new("id", field!(Note, id)).primary_key().auto_increment())
                    .column(Column::new("body", field!(Note, body)))
                    .column(Column::new("stars", field!(Note, stars)).not_null()),
            )
            .build()
            .unwrap();
        let err = Migrator::new(&conn, &strict).run().unwrap_err();
        match err {
            DbError::Migration { table, .. } => assert_eq!(table, "notes"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(conn.table_info("notes").unwrap().len(), 2);
    }
}
