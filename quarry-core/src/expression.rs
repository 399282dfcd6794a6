use crate::{AsValue, TableReference, Value};
use std::fmt::{self, Display};

/// Node of the statement expression tree.
#[derive(Debug, Clone)]
pub enum Expression {
    Column(Column),
    /// Literal bound as a positional argument.
    Value(Value),
    Predicate(Predicate),
    Raw(RawExpr),
    Aggregate(Aggregate),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    Lt,
    Not,
    And,
    Or,
}

impl Op {
    pub fn as_str(&self) -> &'static str {
        match self {
            Op::Eq => "=",
            Op::Lt => "<",
            Op::Not => "NOT",
            Op::And => "AND",
            Op::Or => "OR",
        }
    }
}

impl Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference to an entity field, optionally aliased or bound to a table of a join.
#[derive(Debug, Clone)]
pub struct Column {
    pub(crate) name: String,
    pub(crate) alias: Option<String>,
    pub(crate) table: Option<Box<TableReference>>,
}

/// Shorthand for [`Column::new`].
pub fn col(name: impl Into<String>) -> Column {
    Column::new(name)
}

impl Column {
    /// Column referring to the field `name` (the Rust field name, not the column name).
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
            table: None,
        }
    }

    pub(crate) fn of(table: TableReference, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
            table: Some(Box::new(table)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Alias used in the select list, ignored anywhere else.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn eq(self, value: impl Into<Expression>) -> Predicate {
        Predicate::binary(self.into(), Op::Eq, value.into())
    }

    pub fn lt(self, value: impl Into<Expression>) -> Predicate {
        Predicate::binary(self.into(), Op::Lt, value.into())
    }
}

/// Boolean expression.
///
/// Composition nests the receiver on the left: `a.and(b).or(c)` is `((a AND b) OR c)`, which
/// is what drives the parenthesization of the generated SQL.
#[derive(Debug, Clone)]
pub struct Predicate {
    pub(crate) left: Option<Box<Expression>>,
    pub(crate) op: Option<Op>,
    pub(crate) right: Option<Box<Expression>>,
}

impl Predicate {
    pub fn binary(left: Expression, op: Op, right: Expression) -> Self {
        Self {
            left: Some(Box::new(left)),
            op: Some(op),
            right: Some(Box::new(right)),
        }
    }

    pub fn and(self, other: Predicate) -> Predicate {
        Predicate::binary(self.into(), Op::And, other.into())
    }

    pub fn or(self, other: Predicate) -> Predicate {
        Predicate::binary(self.into(), Op::Or, other.into())
    }
}

/// Negates a predicate, the result has no left side.
pub fn not(predicate: Predicate) -> Predicate {
    Predicate {
        left: None,
        op: Some(Op::Not),
        right: Some(Box::new(predicate.into())),
    }
}

/// SQL fragment written verbatim together with its own arguments.
#[derive(Debug, Clone)]
pub struct RawExpr {
    pub(crate) sql: String,
    pub(crate) args: Vec<Value>,
}

pub fn raw(sql: impl Into<String>, args: impl IntoIterator<Item = Value>) -> RawExpr {
    RawExpr {
        sql: sql.into(),
        args: args.into_iter().collect(),
    }
}

impl RawExpr {
    /// Uses the fragment as a whole condition.
    pub fn as_predicate(self) -> Predicate {
        Predicate {
            left: Some(Box::new(self.into())),
            op: None,
            right: None,
        }
    }
}

/// Aggregate function applied to a field, only valid in the select list.
#[derive(Debug, Clone)]
pub struct Aggregate {
    pub(crate) function: &'static str,
    pub(crate) field: String,
    pub(crate) alias: Option<String>,
}

impl Aggregate {
    pub fn new(function: &'static str, field: impl Into<String>) -> Self {
        Self {
            function,
            field: field.into(),
            alias: None,
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }
}

pub fn avg(field: impl Into<String>) -> Aggregate {
    Aggregate::new("AVG", field)
}

pub fn sum(field: impl Into<String>) -> Aggregate {
    Aggregate::new("SUM", field)
}

pub fn count(field: impl Into<String>) -> Aggregate {
    Aggregate::new("COUNT", field)
}

pub fn max(field: impl Into<String>) -> Aggregate {
    Aggregate::new("MAX", field)
}

pub fn min(field: impl Into<String>) -> Aggregate {
    Aggregate::new("MIN", field)
}

/// Item of a select list.
#[derive(Debug, Clone)]
pub enum Selectable {
    Column(Column),
    Aggregate(Aggregate),
    Raw(RawExpr),
}

impl From<Column> for Selectable {
    fn from(value: Column) -> Self {
        Selectable::Column(value)
    }
}

impl From<Aggregate> for Selectable {
    fn from(value: Aggregate) -> Self {
        Selectable::Aggregate(value)
    }
}

impl From<RawExpr> for Selectable {
    fn from(value: RawExpr) -> Self {
        Selectable::Raw(value)
    }
}

impl<T: AsValue> From<T> for Expression {
    fn from(value: T) -> Self {
        Expression::Value(value.as_value())
    }
}

impl From<&'static str> for Expression {
    fn from(value: &'static str) -> Self {
        Expression::Value(value.into())
    }
}

impl From<Value> for Expression {
    fn from(value: Value) -> Self {
        Expression::Value(value)
    }
}

impl From<Column> for Expression {
    fn from(value: Column) -> Self {
        Expression::Column(value)
    }
}

impl From<Predicate> for Expression {
    fn from(value: Predicate) -> Self {
        Expression::Predicate(value)
    }
}

impl From<RawExpr> for Expression {
    fn from(value: RawExpr) -> Self {
        Expression::Raw(value)
    }
}

impl From<Aggregate> for Expression {
    fn from(value: Aggregate) -> Self {
        Expression::Aggregate(value)
    }
}
