//! Additive migration across two versions of a record type.
//!
//! Version 1 of the `tasks` table has a title only. Version 2 adds a
//! `priority` column with a default. Reopening the same file with version 2
//! issues one `ALTER TABLE`, keeps the existing rows, and a third open
//! changes nothing.
//!
//! # Usage
//!
//! ```bash
//! RUST_LOG=info cargo run -p rowbind-demos --example schema_evolution
//! ```

use rowbind_core::{Column, Delete, PrimaryKey, Registry, Select, Table, field};
use rowbind_sqlite::{Database, DatabaseConfig, DbError, MigrationReport};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default)]
struct Task {
    id: PrimaryKey,
    title: String,
    priority: i32,
}

fn tasks(version: u32) -> rowbind_core::Result<Registry> {
    let mut table = Table::<Task>::new("tasks")
        .column(Column::new("id", field!(Task, id)).primary_key().auto_increment())
        .column(Column::new("title", field!(Task, title)).not_null().default_value(String::new()));
    if version >= 2 {
        table = table.column(Column::new("priority", field!(Task, priority)).default_value(3));
    }
    Registry::builder().table(table).build()
}

fn summarize(label: &str, report: &MigrationReport) {
    println!(
        "{label}: created={:?} altered={} conflicts={}",
        report.tables_created,
        report.alter_count(),
        report.conflicts.len()
    );
    for added in &report.columns_added {
        println!("  + {}.{} {}", added.table, added.column.name, added.column.sql_type);
    }
}

fn main() -> Result<(), DbError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let dir = tempfile::tempdir()?;
    let config = DatabaseConfig::new(dir.path().join("tasks.db"));

    let v1 = Database::open_with(config.clone(), tasks(1)?)?;
    summarize("v1", v1.migration_report());
    for title in ["write docs", "cut release"] {
        v1.insert(&Task {
            title: title.to_string(),
            ..Default::default()
        })?;
    }
    v1.close()?;

    let v2 = Database::open_with(config.clone(), tasks(2)?)?;
    summarize("v2", v2.migration_report());
    for task in v2.get_all(Select::<Task>::new())? {
        println!("  {} {:?} priority={}", task.id, task.title, task.priority);
    }
    let removed = v2.remove_all(Delete::new().filter(field!(Task, title).eq("cut release")))?;
    println!("Removed {removed} task(s)");
    v2.close()?;

    let again = Database::open_with(config, tasks(2)?)?;
    summarize("v2 again", again.migration_report());
    println!("Live columns:");
    for column in again.table_info::<Task>()? {
        println!("  {} {} {}", column.cid, column.name, column.sql_type);
    }
    again.close()
}
