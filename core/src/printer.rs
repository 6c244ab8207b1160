//! SQL rendering of table definitions and statement trees.
//!
//! Each node kind implements [`Render`], writing its SQL into a
//! [`SqlWriter`]. Table, column, and field names are always resolved
//! through the [`Registry`], never taken from caller strings.
//!
//! Rendering and parameter flattening are the same traversal: every time a
//! node writes a `?` placeholder it hands its literal to
//! [`SqlWriter::placeholder`], which appends the literal to the parameter
//! list. The `n`th placeholder in the SQL therefore always corresponds to
//! the `n`th value in [`CompiledStatement::params`], and the binder binds
//! that list at positions `1..=n`.

use std::any::TypeId;

use crate::error::{Result, SchemaError};
use crate::registry::Registry;
use crate::statement::{
    Assignment, Comparison, Delete, Insert, Predicate, Select, Set, Update, Where,
};
use crate::table::{ColumnDef, Constraint, ForeignKeyDef, TableDef};
use crate::value::Value;

/// Quotes an identifier with double quotes, doubling embedded quotes.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// SQL text plus the literals bound to its placeholders, in order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompiledStatement {
    pub sql: String,
    pub params: Vec<Value>,
}

/// Accumulates SQL text and placeholder values.
#[derive(Debug, Default)]
pub struct SqlWriter {
    sql: String,
    params: Vec<Value>,
}

impl SqlWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_str(&mut self, text: &str) {
        self.sql.push_str(text);
    }

    pub fn push_ident(&mut self, name: &str) {
        self.sql.push_str(&quote_ident(name));
    }

    /// Writes one `?` placeholder bound to `value`.
    pub fn placeholder(&mut self, value: &Value) {
        self.sql.push('?');
        self.params.push(value.clone());
    }

    /// Renders `items`, writing `separator` between them.
    pub fn join<T: Render>(
        &mut self,
        items: &[T],
        separator: &str,
        registry: &Registry,
    ) -> Result<()> {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.push_str(separator);
            }
            item.render(registry, self)?;
        }
        Ok(())
    }

    pub fn finish(self) -> CompiledStatement {
        CompiledStatement {
            sql: self.sql,
            params: self.params,
        }
    }
}

/// A node that can be rendered as SQL.
pub trait Render {
    fn render(&self, registry: &Registry, out: &mut SqlWriter) -> Result<()>;
}

/// Renders `node` into SQL text and its ordered parameters.
pub fn compile<N: Render + ?Sized>(node: &N, registry: &Registry) -> Result<CompiledStatement> {
    let mut out = SqlWriter::new();
    node.render(registry, &mut out)?;
    Ok(out.finish())
}

/// Renders `node` into SQL text only.
pub fn print<N: Render + ?Sized>(node: &N, registry: &Registry) -> Result<String> {
    compile(node, registry).map(|c| c.sql)
}

fn table_of<R: 'static>(registry: &Registry) -> Result<&TableDef> {
    registry
        .table_def(TypeId::of::<R>())
        .ok_or(SchemaError::UnregisteredType(std::any::type_name::<R>()))
}

const CONSTRAINT_ORDER: [Constraint; 3] = [
    Constraint::PrimaryKey,
    Constraint::AutoIncrement,
    Constraint::NotNull,
];

impl Render for ColumnDef {
    fn render(&self, _registry: &Registry, out: &mut SqlWriter) -> Result<()> {
        out.push_ident(self.name());
        out.push_str(" ");
        out.push_str(self.kind().sql_type());
        // AUTOINCREMENT is only valid right after PRIMARY KEY.
        for constraint in CONSTRAINT_ORDER.iter().filter(|c| self.has(**c)) {
            out.push_str(" ");
            out.push_str(constraint.sql());
        }
        if let Some(default) = self.default_value() {
            out.push_str(" DEFAULT ");
            out.push_str(&default.sql_literal());
        }
        Ok(())
    }
}

impl Render for ForeignKeyDef {
    fn render(&self, registry: &Registry, out: &mut SqlWriter) -> Result<()> {
        out.push_str("FOREIGN KEY (");
        out.push_ident(registry.column_name(self.column())?);
        out.push_str(") REFERENCES ");
        out.push_ident(registry.table_name(self.references())?);
        out.push_str(" (");
        out.push_ident(registry.column_name(self.references())?);
        out.push_str(")");
        Ok(())
    }
}

impl Render for TableDef {
    fn render(&self, registry: &Registry, out: &mut SqlWriter) -> Result<()> {
        out.push_str("CREATE TABLE IF NOT EXISTS ");
        out.push_ident(self.name());
        out.push_str(" (");
        out.join(self.columns(), ", ", registry)?;
        for fk in self.foreign_keys() {
            out.push_str(", ");
            fk.render(registry, out)?;
        }
        out.push_str(");");
        Ok(())
    }
}

impl<R: 'static> Render for Comparison<R> {
    fn render(&self, registry: &Registry, out: &mut SqlWriter) -> Result<()> {
        if self.is_negated() {
            out.push_str("NOT ");
        }
        out.push_ident(registry.column_name(self.field())?);
        out.push_str(" ");
        out.push_str(self.comparator().symbol());
        out.push_str(" ");
        out.placeholder(self.value());
        Ok(())
    }
}

impl<R: 'static> Render for Predicate<R> {
    fn render(&self, registry: &Registry, out: &mut SqlWriter) -> Result<()> {
        match self {
            Predicate::Compare(c) => c.render(registry, out),
            Predicate::And(left, right) => {
                left.render(registry, out)?;
                out.push_str(" AND ");
                right.render(registry, out)
            }
            Predicate::Or(left, right) => {
                left.render(registry, out)?;
                out.push_str(" OR ");
                right.render(registry, out)
            }
        }
    }
}

impl<R: 'static> Render for Assignment<R> {
    fn render(&self, registry: &Registry, out: &mut SqlWriter) -> Result<()> {
        out.push_ident(registry.column_name(self.field())?);
        out.push_str(" = ");
        out.placeholder(self.value());
        Ok(())
    }
}

impl<R: 'static> Render for Where<R> {
    fn render(&self, registry: &Registry, out: &mut SqlWriter) -> Result<()> {
        let predicates = self.predicates();
        if predicates.is_empty() {
            return Ok(());
        }
        out.push_str(" WHERE ");
        let grouped = predicates.len() > 1;
        for (i, predicate) in predicates.iter().enumerate() {
            if i > 0 {
                out.push_str(" AND ");
            }
            // Keep an OR inside a compound conjunct from leaking into its neighbours.
            let wrap = grouped && !matches!(predicate, Predicate::Compare(_));
            if wrap {
                out.push_str("(");
            }
            predicate.render(registry, out)?;
            if wrap {
                out.push_str(")");
            }
        }
        Ok(())
    }
}

impl<R: 'static> Render for Set<R> {
    fn render(&self, registry: &Registry, out: &mut SqlWriter) -> Result<()> {
        if self.is_empty() {
            return Ok(());
        }
        out.push_str(" SET ");
        out.join(self.assignments(), ", ", registry)
    }
}

impl<R: 'static> Render for Insert<R> {
    fn render(&self, registry: &Registry, out: &mut SqlWriter) -> Result<()> {
        let table = table_of::<R>(registry)?;
        out.push_str("INSERT INTO ");
        out.push_ident(table.name());
        if self.values().is_empty() {
            out.push_str(" DEFAULT VALUES");
            return Ok(());
        }
        out.push_str(" (");
        for (i, value) in self.values().iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            out.push_ident(table.column_name(value.field())?);
        }
        out.push_str(") VALUES (");
        for (i, value) in self.values().iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            out.placeholder(value.value());
        }
        out.push_str(")");
        Ok(())
    }
}

impl<R: 'static> Render for Select<R> {
    fn render(&self, registry: &Registry, out: &mut SqlWriter) -> Result<()> {
        let table = table_of::<R>(registry)?;
        out.push_str("SELECT ");
        for (i, column) in table.columns().iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            out.push_ident(column.name());
        }
        out.push_str(" FROM ");
        out.push_ident(table.name());
        self.filter_clause().render(registry, out)
    }
}

impl<R: 'static> Render for Update<R> {
    fn render(&self, registry: &Registry, out: &mut SqlWriter) -> Result<()> {
        let table = table_of::<R>(registry)?;
        if self.set_clause().is_empty() {
            return Err(SchemaError::EmptySet(table.name().to_string()));
        }
        out.push_str("UPDATE ");
        out.push_ident(table.name());
        self.set_clause().render(registry, out)?;
        self.filter_clause().render(registry, out)
    }
}

impl<R: 'static> Render for Delete<R> {
    fn render(&self, registry: &Registry, out: &mut SqlWriter) -> Result<()> {
        let table = table_of::<R>(registry)?;
        out.push_str("DELETE FROM ");
        out.push_ident(table.name());
        self.filter_clause().render(registry, out)?;
        out.push_str(";");
        Ok(())
    }
}
