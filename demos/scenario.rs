//! Three related tables: insert, link, update, and read back.
//!
//! `TestT` references both `TestU` and `TestV` through foreign-key columns.
//! The example inserts a `TestV` and a `TestT` that does not point anywhere
//! yet, links it with an `UpdateAll`, and reads both back.
//!
//! # Usage
//!
//! ```bash
//! RUST_LOG=rowbind_sqlite=debug cargo run -p rowbind-demos --example scenario
//! ```

use rowbind_core::{
    Column, ForeignKey, PrimaryKey, Registry, Select, Table, Update, Where, field,
};
use rowbind_sqlite::{Database, DbError};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default)]
struct TestU {
    j: PrimaryKey,
    teddy: f64,
    i_teddy: i32,
}

#[derive(Debug, Default)]
struct TestV {
    i: PrimaryKey,
    s: String,
    b: Vec<u8>,
}

#[derive(Debug, Default)]
struct TestT {
    i: PrimaryKey,
    d: ForeignKey,
    v: ForeignKey,
    s: String,
}

fn registry() -> rowbind_core::Result<Registry> {
    Registry::builder()
        .table(
            Table::<TestU>::new("TestU")
                .column(Column::new("j", field!(TestU, j)).primary_key().auto_increment())
                .column(Column::new("teddy", field!(TestU, teddy)))
                .column(Column::new("iTeddy", field!(TestU, i_teddy))),
        )
        .table(
            Table::<TestV>::new("TestV")
                .column(Column::new("i", field!(TestV, i)).primary_key().auto_increment())
                .column(Column::new("s", field!(TestV, s)))
                .column(Column::new("b", field!(TestV, b))),
        )
        .table(
            Table::<TestT>::new("TestT")
                .column(Column::new("i", field!(TestT, i)).primary_key().auto_increment())
                .column(Column::new("d", field!(TestT, d)))
                .column(Column::new("v", field!(TestT, v)))
                .column(Column::new("s", field!(TestT, s)))
                .foreign_key(field!(TestT, d), field!(TestU, j))
                .foreign_key(field!(TestT, v), field!(TestV, i)),
        )
        .build()
}

fn main() -> Result<(), DbError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("scenario.db");
    let db = Database::open(&path, registry()?)?;
    println!("=== Schema ===");
    println!("Created: {:?}", db.migration_report().tables_created);

    println!("\n=== Insert ===");
    let v = db.insert(&TestV {
        s: String::new(),
        b: b"abc".to_vec(),
        ..Default::default()
    })?;
    println!("TestV -> {v}");

    let t = db.insert(&TestT {
        s: "Test".to_string(),
        ..Default::default()
    })?;
    println!("TestT -> {t}");

    let u = db.insert(&TestU {
        teddy: 3.5,
        i_teddy: 7,
        ..Default::default()
    })?;
    println!("TestU -> {u}");

    println!("\n=== Link ===");
    let changed = db.update_all(
        Update::new(field!(TestT, d).assign(u)).filter(Where::new(field!(TestT, i).eq(t))),
    )?;
    println!("Rows updated: {changed}");

    println!("\n=== Read back ===");
    match db.get::<TestV>(v)? {
        Some(record) => println!("{record:?}"),
        None => println!("TestV {v} not found"),
    }
    for record in db.get_all(Select::<TestT>::new())? {
        let owner = db.get::<TestU>(record.d)?;
        println!("{record:?} -> {owner:?}");
    }

    db.close()?;
    Ok(())
}
