use crate::{Result, Value};
use std::fmt::{self, Display};

/// Built statement: SQL text and the arguments of its `?` placeholders, in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub sql: String,
    pub args: Vec<Value>,
}

impl Query {
    pub fn new(sql: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            args,
        }
    }
}

impl Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)?;
        if !self.args.is_empty() {
            f.write_str(" [")?;
            for (i, arg) in self.args.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{arg}")?;
            }
            f.write_str("]")?;
        }
        Ok(())
    }
}

/// Anything that can produce a [`Query`]. Building never mutates the builder, so it can be
/// repeated (middlewares do it to observe the statement).
pub trait QueryBuilder: Send + Sync {
    fn build(&self) -> Result<Query>;
}

/// Outcome of a statement that does not return rows.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowsAffected {
    pub rows_affected: u64,
    /// Backend specific last inserted identifier, when available.
    pub last_insert_id: Option<i64>,
}
