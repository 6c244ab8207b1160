//! Renders statements without a database.
//!
//! Shows the SQL text and the ordered parameters the printer produces for
//! each statement kind.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p rowbind-demos --example print_sql
//! ```

use rowbind_core::{
    Column, CompiledStatement, Delete, ForeignKey, Insert, PrimaryKey, Registry, Select, Set,
    Table, Update, Where, compile, field, print,
};

#[derive(Debug, Default)]
struct Author {
    id: PrimaryKey,
    name: String,
}

#[derive(Debug, Default)]
struct Book {
    id: PrimaryKey,
    author: ForeignKey,
    title: String,
    pages: i32,
}

fn show(label: &str, statement: &CompiledStatement) {
    println!("{label}:\n  {}\n  params: {:?}", statement.sql, statement.params);
}

fn main() -> rowbind_core::Result<()> {
    let registry = Registry::builder()
        .table(
            Table::<Author>::new("authors")
                .column(Column::new("id", field!(Author, id)).primary_key().auto_increment())
                .column(Column::new("name", field!(Author, name)).not_null()),
        )
        .table(
            Table::<Book>::new("books")
                .column(Column::new("id", field!(Book, id)).primary_key().auto_increment())
                .column(Column::new("author", field!(Book, author)))
                .column(Column::new("title", field!(Book, title)))
                .column(Column::new("pages", field!(Book, pages)).default_value(0))
                .foreign_key(field!(Book, author), field!(Author, id)),
        )
        .build()?;

    println!("=== DDL ===");
    for table in registry.tables() {
        println!("{}", print(table, &registry)?);
    }

    let title = field!(Book, title);
    let pages = field!(Book, pages);

    println!("\n=== DML ===");
    let insert = Insert::new([
        field!(Book, author).assign(PrimaryKey(1)),
        title.assign("Dune"),
        pages.assign(412),
    ]);
    show("insert", &compile(&insert, &registry)?);

    let select = Select::new().filter(
        Where::new(title.eq("Dune").or(title.eq("Emma"))).and(!pages.lt(100)),
    );
    show("select", &compile(&select, &registry)?);

    let update = Update::new(Set::new([pages.assign(420)])).filter(title.eq("Dune"));
    show("update", &compile(&update, &registry)?);

    let delete = Delete::new().filter(pages.eq(0));
    show("delete", &compile(&delete, &registry)?);

    Ok(())
}
