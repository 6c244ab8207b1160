//! Statement algebra: Insert, Select, Update, and Delete trees.
//!
//! Statements are plain values built per call and rendered by the
//! [`printer`](crate::printer). Every node is typed by the record type `R`
//! it operates on, so a predicate over one table cannot be attached to a
//! statement over another.
//!
//! Predicates are built from [`FieldRef`] comparisons and combined left to
//! right with [`and`](Predicate::and) / [`or`](Predicate::or). Binary nodes
//! are rendered without parentheses, so the engine's precedence applies:
//! `a.or(b).and(c)` reads as `a OR b AND c`, which binds as `a OR (b AND c)`.
//!
//! ```
//! use rowbind_core::{field, PrimaryKey, Select, Where};
//!
//! #[derive(Default)]
//! struct Player { id: PrimaryKey, name: String, score: i64 }
//!
//! let name = field!(Player, name);
//! let score = field!(Player, score);
//! let query = Select::<Player>::new()
//!     .filter(Where::new(name.eq("ada").or(score.ge(100))));
//! assert_eq!(query.filter_clause().predicates().len(), 1);
//! ```

use std::fmt;
use std::marker::PhantomData;
use std::ops::Not;

use crate::field::{FieldRef, FieldToken};
use crate::value::{FieldValue, Value};

/// Comparison operator of a [`Comparison`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparator {
    Equal,
    Less,
    LessEq,
    Greater,
    GreaterEq,
    NotEqual,
}

impl Comparator {
    pub fn symbol(self) -> &'static str {
        match self {
            Comparator::Equal => "=",
            Comparator::Less => "<",
            Comparator::LessEq => "<=",
            Comparator::Greater => ">",
            Comparator::GreaterEq => ">=",
            Comparator::NotEqual => "<>",
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// `column <op> literal`, optionally negated.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison<R> {
    field: FieldToken,
    comparator: Comparator,
    value: Value,
    negated: bool,
    _record: PhantomData<fn() -> R>,
}

impl<R> Comparison<R> {
    /// Builds a comparison from an already converted value.
    pub fn from_value(field: FieldToken, comparator: Comparator, value: Value) -> Self {
        Self {
            field,
            comparator,
            value,
            negated: false,
            _record: PhantomData,
        }
    }

    pub fn field(&self) -> FieldToken {
        self.field
    }

    pub fn comparator(&self) -> Comparator {
        self.comparator
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn is_negated(&self) -> bool {
        self.negated
    }

    pub fn and(self, other: impl Into<Predicate<R>>) -> Predicate<R> {
        Predicate::from(self).and(other)
    }

    pub fn or(self, other: impl Into<Predicate<R>>) -> Predicate<R> {
        Predicate::from(self).or(other)
    }
}

impl<R> Not for Comparison<R> {
    type Output = Comparison<R>;

    /// Toggles negation.
    fn not(mut self) -> Self::Output {
        self.negated = !self.negated;
        self
    }
}

/// A filter expression: one comparison, or two predicates joined by AND/OR.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate<R> {
    Compare(Comparison<R>),
    And(Box<Predicate<R>>, Box<Predicate<R>>),
    Or(Box<Predicate<R>>, Box<Predicate<R>>),
}

impl<R> Predicate<R> {
    pub fn and(self, other: impl Into<Predicate<R>>) -> Predicate<R> {
        Predicate::And(Box::new(self), Box::new(other.into()))
    }

    pub fn or(self, other: impl Into<Predicate<R>>) -> Predicate<R> {
        Predicate::Or(Box::new(self), Box::new(other.into()))
    }
}

impl<R> From<Comparison<R>> for Predicate<R> {
    fn from(comparison: Comparison<R>) -> Self {
        Predicate::Compare(comparison)
    }
}

/// `column = literal` inside an Insert or a Set clause.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment<R> {
    field: FieldToken,
    value: Value,
    _record: PhantomData<fn() -> R>,
}

impl<R> Assignment<R> {
    /// Builds an assignment from an already converted value.
    pub fn from_value(field: FieldToken, value: Value) -> Self {
        Self {
            field,
            value,
            _record: PhantomData,
        }
    }

    pub fn field(&self) -> FieldToken {
        self.field
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

impl<R: 'static, F: FieldValue> FieldRef<R, F> {
    fn compare(self, comparator: Comparator, value: F) -> Comparison<R> {
        Comparison::from_value(self.token(), comparator, value.to_value())
    }

    pub fn eq(self, value: impl Into<F>) -> Comparison<R> {
        self.compare(Comparator::Equal, value.into())
    }

    pub fn ne(self, value: impl Into<F>) -> Comparison<R> {
        self.compare(Comparator::NotEqual, value.into())
    }

    pub fn lt(self, value: impl Into<F>) -> Comparison<R> {
        self.compare(Comparator::Less, value.into())
    }

    pub fn le(self, value: impl Into<F>) -> Comparison<R> {
        self.compare(Comparator::LessEq, value.into())
    }

    pub fn gt(self, value: impl Into<F>) -> Comparison<R> {
        self.compare(Comparator::Greater, value.into())
    }

    pub fn ge(self, value: impl Into<F>) -> Comparison<R> {
        self.compare(Comparator::GreaterEq, value.into())
    }

    /// Assigns `value` to this field in an Update's Set clause.
    pub fn assign(self, value: impl Into<F>) -> Assignment<R> {
        Assignment::from_value(self.token(), value.into().to_value())
    }
}

/// `WHERE` clause. Its predicates are conjoined; an empty clause matches
/// every row and renders nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct Where<R> {
    predicates: Vec<Predicate<R>>,
}

impl<R> Where<R> {
    pub fn new(predicate: impl Into<Predicate<R>>) -> Self {
        Self {
            predicates: vec![predicate.into()],
        }
    }

    /// A clause without predicates.
    pub fn all() -> Self {
        Self {
            predicates: Vec::new(),
        }
    }

    /// Adds another predicate that rows must also satisfy.
    pub fn and(mut self, predicate: impl Into<Predicate<R>>) -> Self {
        self.predicates.push(predicate.into());
        self
    }

    pub fn predicates(&self) -> &[Predicate<R>] {
        &self.predicates
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}

impl<R> Default for Where<R> {
    fn default() -> Self {
        Self::all()
    }
}

impl<R> From<Comparison<R>> for Where<R> {
    fn from(comparison: Comparison<R>) -> Self {
        Where::new(comparison)
    }
}

impl<R> From<Predicate<R>> for Where<R> {
    fn from(predicate: Predicate<R>) -> Self {
        Where::new(predicate)
    }
}

/// `SET` clause of an Update.
#[derive(Debug, Clone, PartialEq)]
pub struct Set<R> {
    assignments: Vec<Assignment<R>>,
}

impl<R> Set<R> {
    pub fn new(assignments: impl IntoIterator<Item = Assignment<R>>) -> Self {
        Self {
            assignments: assignments.into_iter().collect(),
        }
    }

    pub fn and(mut self, assignment: Assignment<R>) -> Self {
        self.assignments.push(assignment);
        self
    }

    pub fn assignments(&self) -> &[Assignment<R>] {
        &self.assignments
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }
}

impl<R> From<Assignment<R>> for Set<R> {
    fn from(assignment: Assignment<R>) -> Self {
        Set::new([assignment])
    }
}

/// Inserts one row with the given column values.
#[derive(Debug, Clone, PartialEq)]
pub struct Insert<R> {
    values: Vec<Assignment<R>>,
}

impl<R> Insert<R> {
    pub fn new(values: impl IntoIterator<Item = Assignment<R>>) -> Self {
        Self {
            values: values.into_iter().collect(),
        }
    }

    pub fn values(&self) -> &[Assignment<R>] {
        &self.values
    }
}

/// Selects every column of the rows matching the filter.
#[derive(Debug, Clone, PartialEq)]
pub struct Select<R> {
    filter: Where<R>,
}

impl<R> Select<R> {
    /// Selects all rows.
    pub fn new() -> Self {
        Self {
            filter: Where::all(),
        }
    }

    pub fn filter(mut self, filter: impl Into<Where<R>>) -> Self {
        self.filter = filter.into();
        self
    }

    pub fn filter_clause(&self) -> &Where<R> {
        &self.filter
    }
}

impl<R> Default for Select<R> {
    fn default() -> Self {
        Self::new()
    }
}

/// Updates the rows matching the filter.
#[derive(Debug, Clone, PartialEq)]
pub struct Update<R> {
    set: Set<R>,
    filter: Where<R>,
}

impl<R> Update<R> {
    pub fn new(set: impl Into<Set<R>>) -> Self {
        Self {
            set: set.into(),
            filter: Where::all(),
        }
    }

    pub fn filter(mut self, filter: impl Into<Where<R>>) -> Self {
        self.filter = filter.into();
        self
    }

    pub fn set_clause(&self) -> &Set<R> {
        &self.set
    }

    pub fn filter_clause(&self) -> &Where<R> {
        &self.filter
    }
}

/// Deletes the rows matching the filter.
#[derive(Debug, Clone, PartialEq)]
pub struct Delete<R> {
    filter: Where<R>,
}

impl<R> Delete<R> {
    /// Deletes all rows.
    pub fn new() -> Self {
        Self {
            filter: Where::all(),
        }
    }

    pub fn filter(mut self, filter: impl Into<Where<R>>) -> Self {
        self.filter = filter.into();
        self
    }

    pub fn filter_clause(&self) -> &Where<R> {
        &self.filter
    }
}

impl<R> Default for Delete<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field;
    use crate::key::{ForeignKey, PrimaryKey};

    #[derive(Debug, Default)]
    struct Row {
        id: PrimaryKey,
        owner: ForeignKey,
        name: String,
    }

    #[test]
    fn test_comparison_converts_literal_to_field_type() {
        let c = field!(Row, name).eq("x");
        assert_eq!(c.value(), &Value::Text("x".into()));
        assert_eq!(c.comparator(), Comparator::Equal);
        let c = field!(Row, owner).eq(PrimaryKey(3));
        assert_eq!(c.value(), &Value::Key(3));
    }

    #[test]
    fn test_not_toggles_negation() {
        let c = !field!(Row, id).gt(PrimaryKey(1));
        assert!(c.is_negated());
        assert!(!(!c).is_negated());
    }

    #[test]
    fn test_predicates_nest_left_to_right() {
        let p = field!(Row, id)
            .eq(PrimaryKey(1))
            .or(field!(Row, name).eq("a"))
            .and(field!(Row, name).ne("b"));
        match p {
            Predicate::And(left, _) => assert!(matches!(*left, Predicate::Or(_, _))),
            other => panic!("unexpected predicate: {other:?}"),
        }
    }

    #[test]
    fn test_where_conjoins_added_predicates() {
        let w = Where::new(field!(Row, name).eq("a")).and(field!(Row, id).lt(PrimaryKey(9)));
        assert_eq!(w.predicates().len(), 2);
        assert!(Where::<Row>::all().is_empty());
    }

    #[test]
    fn test_comparator_symbols() {
        assert_eq!(Comparator::NotEqual.to_string(), "<>");
        assert_eq!(Comparator::LessEq.symbol(), "<=");
    }
}
