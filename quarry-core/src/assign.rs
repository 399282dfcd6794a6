use crate::{Column, Value};

/// Right hand side of an upsert update list.
#[derive(Debug, Clone)]
pub enum Assignable {
    /// `column = ?`
    Assignment(Assignment),
    /// Reuses the value that was about to be inserted for this column.
    Column(Column),
}

#[derive(Debug, Clone)]
pub struct Assignment {
    pub(crate) field: String,
    pub(crate) value: Value,
}

/// Assigns `value` to the column of `field`.
pub fn assign(field: impl Into<String>, value: impl Into<Value>) -> Assignment {
    Assignment {
        field: field.into(),
        value: value.into(),
    }
}

impl Assignment {
    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

impl From<Assignment> for Assignable {
    fn from(value: Assignment) -> Self {
        Assignable::Assignment(value)
    }
}

impl From<Column> for Assignable {
    fn from(value: Column) -> Self {
        Assignable::Column(value)
    }
}

/// Insert-or-update clause of an [`Inserter`](crate::Inserter).
#[derive(Debug, Clone, Default)]
pub struct Upsert {
    pub assigns: Vec<Assignable>,
    /// Conflict target, for the dialects that need one.
    pub conflict_columns: Vec<String>,
}
