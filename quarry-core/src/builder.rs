use crate::{
    Aggregate, Column, Dialect, Error, Expression, Model, Predicate, Query, RawExpr, Registry,
    Result, Selectable, TableReference, Value, util::possibly_parenthesized,
};

/// Statement being written: SQL text plus positional arguments.
///
/// A fresh builder is created for every `build` call, so building is repeatable. Dialects
/// receive it to append their own clauses.
pub struct Builder<'a> {
    registry: &'a Registry,
    model: &'a Model,
    sql: String,
    args: Vec<Value>,
    quoter: char,
}

impl<'a> Builder<'a> {
    pub fn new(registry: &'a Registry, dialect: &dyn Dialect, model: &'a Model) -> Self {
        Self {
            registry,
            model,
            sql: String::with_capacity(128),
            args: Vec::new(),
            quoter: dialect.quoter(),
        }
    }

    /// Model of the entity the statement is built for.
    pub fn model(&self) -> &'a Model {
        self.model
    }

    pub fn push(&mut self, c: char) {
        self.sql.push(c);
    }

    pub fn push_str(&mut self, value: &str) {
        self.sql.push_str(value);
    }

    /// Writes an identifier surrounded by the dialect quote character.
    pub fn quote(&mut self, name: &str) {
        self.sql.push(self.quoter);
        self.sql.push_str(name);
        self.sql.push(self.quoter);
    }

    pub fn add_arg(&mut self, value: Value) {
        self.args.push(value);
    }

    pub fn add_args(&mut self, values: impl IntoIterator<Item = Value>) {
        self.args.extend(values);
    }

    /// Column name of the field `name` in the current model.
    pub fn column_name(&self, field: &str) -> Result<&'a str> {
        self.model
            .field(field)
            .map(|f| f.column.as_str())
            .ok_or_else(|| Error::UnknownField(field.to_string()))
    }

    pub fn finish(mut self) -> Query {
        self.sql.push(';');
        Query {
            sql: self.sql,
            args: self.args,
        }
    }

    pub(crate) fn build_column(&mut self, column: &Column, with_alias: bool) -> Result<()> {
        match column.table.as_deref() {
            None => {
                let name = self.column_name(&column.name)?;
                self.quote(name);
            }
            Some(TableReference::Table(table)) => {
                let model = (table.resolve)(self.registry)?;
                let field = model
                    .field(&column.name)
                    .ok_or_else(|| Error::UnknownField(column.name.clone()))?;
                if let Some(alias) = &table.alias {
                    self.quote(alias);
                    self.push('.');
                }
                self.quote(&field.column);
            }
            Some(TableReference::Join(join)) => {
                return Err(Error::UnsupportedTable(format!("{join:?}")));
            }
        }
        if with_alias && let Some(alias) = &column.alias {
            self.push_str(" AS ");
            self.quote(alias);
        }
        Ok(())
    }

    pub(crate) fn build_expression(&mut self, expression: &Expression) -> Result<()> {
        match expression {
            Expression::Predicate(predicate) => self.build_predicate(predicate)?,
            Expression::Column(column) => self.build_column(column, false)?,
            Expression::Value(value) => {
                self.push('?');
                self.add_arg(value.clone());
            }
            Expression::Raw(RawExpr { sql, args }) => {
                self.push('(');
                self.push_str(sql);
                self.push(')');
                self.add_args(args.iter().cloned());
            }
            Expression::Aggregate(aggregate) => {
                return Err(Error::UnsupportedExpression(format!("{aggregate:?}")));
            }
        }
        Ok(())
    }

    fn build_operand(&mut self, operand: &Expression) -> Result<()> {
        possibly_parenthesized!(
            self,
            matches!(operand, Expression::Predicate(..)),
            self.build_expression(operand)?
        );
        Ok(())
    }

    pub(crate) fn build_predicate(&mut self, predicate: &Predicate) -> Result<()> {
        if let Some(left) = &predicate.left {
            self.build_operand(left)?;
        }
        if let Some(op) = predicate.op {
            if predicate.left.is_some() {
                self.push(' ');
            }
            self.push_str(op.as_str());
            self.push(' ');
        }
        if let Some(right) = &predicate.right {
            self.build_operand(right)?;
        }
        Ok(())
    }

    /// Folds the predicates with `AND` and writes them after `keyword`. Nothing is written
    /// when the list is empty.
    pub(crate) fn build_condition(&mut self, keyword: &str, predicates: &[Predicate]) -> Result<()> {
        let Some(predicate) = predicates.iter().cloned().reduce(Predicate::and) else {
            return Ok(());
        };
        self.push_str(keyword);
        self.build_predicate(&predicate)
    }

    pub(crate) fn build_selectables(&mut self, columns: &[Selectable]) -> Result<()> {
        if columns.is_empty() {
            self.push('*');
            return Ok(());
        }
        for (i, column) in columns.iter().enumerate() {
            if i > 0 {
                self.push(',');
            }
            match column {
                Selectable::Column(column) => self.build_column(column, true)?,
                Selectable::Aggregate(Aggregate {
                    function,
                    field,
                    alias,
                }) => {
                    self.push_str(function);
                    self.push('(');
                    self.build_column(&Column::new(field.as_str()), false)?;
                    self.push(')');
                    if let Some(alias) = alias {
                        self.push_str(" AS ");
                        self.quote(alias);
                    }
                }
                Selectable::Raw(RawExpr { sql, args }) => {
                    self.push_str(sql);
                    self.add_args(args.iter().cloned());
                }
            }
        }
        Ok(())
    }

    pub(crate) fn build_table(&mut self, table: Option<&TableReference>) -> Result<()> {
        match table {
            None => {
                let model = self.model;
                self.quote(&model.table_name);
            }
            Some(TableReference::Table(table)) => {
                let model = (table.resolve)(self.registry)?;
                self.quote(&model.table_name);
                if let Some(alias) = &table.alias {
                    self.push_str(" AS ");
                    self.quote(alias);
                }
            }
            Some(TableReference::Join(join)) => {
                self.push('(');
                self.build_table(Some(join.left.as_ref()))?;
                self.push(' ');
                self.push_str(join.kind);
                self.push(' ');
                self.build_table(Some(join.right.as_ref()))?;
                if !join.using.is_empty() {
                    self.push_str(" USING (");
                    for (i, field) in join.using.iter().enumerate() {
                        if i > 0 {
                            self.push(',');
                        }
                        self.build_column(&Column::new(field.as_str()), false)?;
                    }
                    self.push(')');
                }
                self.build_condition(" ON ", &join.on)?;
                self.push(')');
            }
        }
        Ok(())
    }
}
