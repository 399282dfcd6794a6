use crate::{
    Builder, Db, Entity, Predicate, Query, QueryBuilder, QueryKind, Result, Selectable, Session,
    TableReference,
};
use std::{marker::PhantomData, sync::Arc};

/// `SELECT` statement returning `T`.
pub struct Selector<S, T> {
    db: Db<S>,
    columns: Vec<Selectable>,
    table: Option<TableReference>,
    wheres: Vec<Predicate>,
    _entity: PhantomData<fn() -> T>,
}

impl<S: Session, T: Entity> Selector<S, T> {
    pub fn new(db: &Db<S>) -> Self {
        Self {
            db: db.clone(),
            columns: Vec::new(),
            table: None,
            wheres: Vec::new(),
            _entity: PhantomData,
        }
    }

    /// Select list, `*` when never called.
    pub fn select(mut self, columns: impl IntoIterator<Item = impl Into<Selectable>>) -> Self {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Source of the rows, the table of `T` when never called.
    pub fn from(mut self, table: impl Into<TableReference>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Adds conditions, all of them are joined with `AND`.
    pub fn where_(mut self, predicates: impl IntoIterator<Item = Predicate>) -> Self {
        self.wheres.extend(predicates);
        self
    }

    /// Returns the first matching row, [`Error::NoRows`](crate::Error::NoRows) if none.
    pub async fn get(self) -> Result<T> {
        let db = self.db.clone();
        let model = db.model::<T>()?;
        db.dispatch(
            QueryKind::Select,
            Arc::new(self),
            model,
            db.get_handler::<T>(),
        )
        .await?
        .into_entity()
    }

    /// Returns every matching row.
    pub async fn get_multi(self) -> Result<Vec<T>> {
        let db = self.db.clone();
        let model = db.model::<T>()?;
        db.dispatch(
            QueryKind::Select,
            Arc::new(self),
            model,
            db.get_multi_handler::<T>(),
        )
        .await?
        .into_entity()
    }
}

impl<S: Session, T: Entity> QueryBuilder for Selector<S, T> {
    fn build(&self) -> Result<Query> {
        let model = self.db.model::<T>()?;
        let mut builder = Builder::new(self.db.registry(), self.db.dialect(), &model);
        builder.push_str("SELECT ");
        builder.build_selectables(&self.columns)?;
        builder.push_str(" FROM ");
        builder.build_table(self.table.as_ref())?;
        builder.build_condition(" WHERE ", &self.wheres)?;
        Ok(builder.finish())
    }
}
