//! Additive schema reconciliation.
//!
//! Compares the columns a [`TableDef`](crate::TableDef) declares with the
//! columns the live table reports, and renders the `ALTER TABLE ... ADD
//! COLUMN` statements that bring the live table up to date. Reconciliation
//! never drops, renames, retypes, or reorders columns: a declared column
//! whose name already exists with different attributes is reported as a
//! [`ColumnConflict`] and left alone.

use serde::{Deserialize, Serialize};

use crate::printer::quote_ident;

/// One column as described by table introspection.
///
/// `cid` is the column's position; every other field is part of the
/// column's descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub cid: i64,
    pub name: String,
    pub sql_type: String,
    pub not_null: bool,
    /// Default value as a SQL literal.
    pub default: Option<String>,
    pub primary_key: bool,
}

impl ColumnInfo {
    /// Compares descriptors, ignoring the column position.
    pub fn same_descriptor(&self, other: &ColumnInfo) -> bool {
        self.name == other.name
            && self.sql_type.eq_ignore_ascii_case(&other.sql_type)
            && self.not_null == other.not_null
            && self.default == other.default
            && self.primary_key == other.primary_key
    }

    /// Renders the statement adding this column to `table`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rowbind_core::ColumnInfo;
    ///
    /// let info = ColumnInfo {
    ///     cid: 3,
    ///     name: "score".into(),
    ///     sql_type: "REAL".into(),
    ///     not_null: true,
    ///     default: Some("0.0".into()),
    ///     primary_key: false,
    /// };
    /// assert_eq!(
    ///     info.add_column_sql("players"),
    ///     r#"ALTER TABLE "players" ADD COLUMN "score" REAL NOT NULL DEFAULT 0.0"#
    /// );
    /// ```
    pub fn add_column_sql(&self, table: &str) -> String {
        let mut sql = format!(
            "ALTER TABLE {} ADD COLUMN {} {}",
            quote_ident(table),
            quote_ident(&self.name),
            self.sql_type
        );
        if self.primary_key {
            sql.push_str(" PRIMARY KEY");
        }
        if self.not_null {
            sql.push_str(" NOT NULL");
        }
        if let Some(default) = &self.default {
            sql.push_str(" DEFAULT ");
            sql.push_str(default);
        }
        sql
    }
}

/// A declared column whose name exists live with a different descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnConflict {
    pub declared: ColumnInfo,
    pub live: ColumnInfo,
}

/// Result of comparing declared and live columns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnDiff {
    /// Declared columns absent from the live table, in declaration order.
    pub missing: Vec<ColumnInfo>,
    pub conflicts: Vec<ColumnConflict>,
}

impl ColumnDiff {
    pub fn is_empty(&self) -> bool {
        self.missing.is_empty() && self.conflicts.is_empty()
    }
}

/// Computes the declared columns not present, descriptor for descriptor, in
/// the live table.
pub fn diff_columns(declared: &[ColumnInfo], live: &[ColumnInfo]) -> ColumnDiff {
    let mut diff = ColumnDiff::default();
    for column in declared {
        if live.iter().any(|l| l.same_descriptor(column)) {
            continue;
        }
        match live.iter().find(|l| l.name == column.name) {
            Some(existing) => diff.conflicts.push(ColumnConflict {
                declared: column.clone(),
                live: existing.clone(),
            }),
            None => diff.missing.push(column.clone()),
        }
    }
    diff
}
