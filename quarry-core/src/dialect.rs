use crate::{Assignable, Builder, Column, Error, Result, Upsert};
use std::fmt::Debug;

/// SQL syntax differences between database vendors.
pub trait Dialect: Send + Sync + Debug {
    /// Character surrounding identifiers.
    fn quoter(&self) -> char;

    /// Appends the insert-or-update clause to an `INSERT` statement.
    fn build_upsert(&self, builder: &mut Builder<'_>, upsert: &Upsert) -> Result<()>;
}

fn assigned_column<'a>(builder: &Builder<'a>, column: &Column) -> Result<&'a str> {
    if column.table.is_some() {
        return Err(Error::UnsupportedAssignable(format!("{column:?}")));
    }
    builder.column_name(&column.name)
}

/// Plain SQL with double quoted identifiers. It has no upsert syntax.
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardDialect;

impl Dialect for StandardDialect {
    fn quoter(&self) -> char {
        '"'
    }

    fn build_upsert(&self, _builder: &mut Builder<'_>, _upsert: &Upsert) -> Result<()> {
        panic!("StandardDialect has no insert-or-update syntax, use a vendor specific dialect")
    }
}

/// `ON DUPLICATE KEY UPDATE` flavour.
#[derive(Debug, Default, Clone, Copy)]
pub struct MySqlDialect;

impl Dialect for MySqlDialect {
    fn quoter(&self) -> char {
        '`'
    }

    fn build_upsert(&self, builder: &mut Builder<'_>, upsert: &Upsert) -> Result<()> {
        builder.push_str(" ON DUPLICATE KEY UPDATE ");
        for (i, assign) in upsert.assigns.iter().enumerate() {
            if i > 0 {
                builder.push(',');
            }
            match assign {
                Assignable::Assignment(assignment) => {
                    let column = builder.column_name(&assignment.field)?;
                    builder.quote(column);
                    builder.push_str("=?");
                    builder.add_arg(assignment.value.clone());
                }
                Assignable::Column(column) => {
                    let column = assigned_column(builder, column)?;
                    builder.quote(column);
                    builder.push_str("=VALUES(");
                    builder.quote(column);
                    builder.push(')');
                }
            }
        }
        Ok(())
    }
}

/// `ON CONFLICT(...) DO UPDATE SET` flavour.
#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteDialect;

impl Dialect for SqliteDialect {
    fn quoter(&self) -> char {
        '`'
    }

    fn build_upsert(&self, builder: &mut Builder<'_>, upsert: &Upsert) -> Result<()> {
        builder.push_str(" ON CONFLICT");
        if !upsert.conflict_columns.is_empty() {
            builder.push('(');
            for (i, field) in upsert.conflict_columns.iter().enumerate() {
                if i > 0 {
                    builder.push(',');
                }
                let column = builder.column_name(field)?;
                builder.quote(column);
            }
            builder.push(')');
        }
        builder.push_str(" DO UPDATE SET ");
        for (i, assign) in upsert.assigns.iter().enumerate() {
            if i > 0 {
                builder.push(',');
            }
            match assign {
                Assignable::Assignment(assignment) => {
                    let column = builder.column_name(&assignment.field)?;
                    builder.quote(column);
                    builder.push_str("=?");
                    builder.add_arg(assignment.value.clone());
                }
                Assignable::Column(column) => {
                    let column = assigned_column(builder, column)?;
                    builder.quote(column);
                    builder.push_str("=excluded.");
                    builder.quote(column);
                }
            }
        }
        Ok(())
    }
}
